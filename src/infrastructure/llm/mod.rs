mod completion_factory;
mod llamacpp_client;
mod mock_completion_client;
mod ollama_client;
mod prompt;
mod retry;

pub use completion_factory::{CompletionClientFactory, CompletionFactoryError};
pub use llamacpp_client::LlamaCppClient;
pub use mock_completion_client::MockCompletionClient;
pub use ollama_client::OllamaClient;
pub use prompt::flatten_history;
pub use retry::{RetryPolicy, run_with_retries};
