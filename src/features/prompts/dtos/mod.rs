mod prompt_dto;

pub use prompt_dto::{
    CreatePromptDto, LikeResponseDto, PromptQueryParams, PromptResponseDto, PromptScope,
    PromptVersionResponseDto, SortDirection, UpdatePromptDto,
};
