mod api_call_log;

pub use api_call_log::{ApiCallLog, NewApiCallLog};
