pub mod constants;
pub mod llm;
pub mod password;
pub mod template;
pub mod test_helpers;
pub mod types;
