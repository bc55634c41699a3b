pub mod dtos;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use handlers::ExecutionState;
pub use services::{ExecutionService, FlowExecutionService};
