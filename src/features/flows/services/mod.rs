mod flow_service;

pub use flow_service::FlowService;
