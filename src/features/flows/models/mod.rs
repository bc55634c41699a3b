mod flow;
mod flow_step;

pub use flow::Flow;
pub use flow_step::{ExecutableStep, FlowStep, FlowStepWithOverride};
