mod flow_executor;
mod prompt_executor;

pub use flow_executor::FlowExecutionService;
pub use prompt_executor::ExecutionService;
