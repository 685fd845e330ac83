pub mod adapter;
pub mod anthropic;
pub mod completion;
pub mod json_repair;
pub mod local;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod registry;
pub mod types;

pub use adapter::ModelAdapter;
pub use anthropic::AnthropicClient;
pub use completion::{CompletionBackend, CompletionMessage, CompletionRequest, ContentBlock};
pub use json_repair::{Coercion, coerce_array, normalize};
pub use local::LocalProvider;
pub use openai::OpenAiClient;
pub use provider::{TextProvider, VisionProvider};
pub use registry::{ProviderListing, ProviderRegistry};
pub use types::*;
