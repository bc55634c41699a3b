pub mod flow_handler;

pub use flow_handler::*;
