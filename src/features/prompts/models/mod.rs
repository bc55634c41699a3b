mod like;
mod prompt;
mod prompt_version;

pub use like::Like;
pub use prompt::{Prompt, PromptAccess};
pub use prompt_version::PromptVersion;
