mod run_dto;

pub use run_dto::{
    parse_run_flow_request, parse_run_prompt_request, FlowRunInfo, FlowRunParams, FlowStepInfo,
    PromptRunInfo, PromptRunParams, RunErrorResponse, RunFlowRequest, RunFlowResponse,
    RunPromptRequest, RunPromptResponse,
};
