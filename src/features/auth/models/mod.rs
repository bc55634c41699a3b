mod api_key;

pub use api_key::{ApiCaller, ApiKey};
