mod flow_dto;

pub use flow_dto::{
    CreateFlowDto, CreateFlowStepDto, FlowDetailResponseDto, FlowResponseDto, FlowStepResponseDto,
    UpdateFlowStepDto,
};
