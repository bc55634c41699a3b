pub mod provider;

pub use provider::{CompletionBackend, CompletionRequest, Provider, ProviderClient, ProviderError};
