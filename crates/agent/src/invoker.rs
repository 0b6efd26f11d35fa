//! Hard wall-clock bound around the gateway call.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::warn;

use storebot_core::InferenceError;

use crate::llm::{InferenceRequest, LlmClient};
use crate::prompt::PromptBuilder;

/// Fixed sentence returned when the provider misses the budget. The
/// dispatcher compares against this constant to detect the busy path.
pub const BUSY_REPLY: &str =
    "The server is a bit busy right now, let me recommend some of our best picks instead...";

const UNAVAILABLE_REPLY: &str =
    "I can't reach our answer service at the moment, but you can browse everything on our website.";
const ERROR_REPLY: &str =
    "Something went wrong while writing an answer, but I can still help you find products.";

pub struct BoundedInvoker {
    client: Arc<dyn LlmClient>,
    store_name: String,
    currency_prefix: String,
}

impl BoundedInvoker {
    pub fn new(
        client: Arc<dyn LlmClient>,
        store_name: impl Into<String>,
        currency_prefix: impl Into<String>,
    ) -> Self {
        Self { client, store_name: store_name.into(), currency_prefix: currency_prefix.into() }
    }

    /// Always returns a string: the provider's reply, a per-error fallback
    /// sentence, or [`BUSY_REPLY`] once `budget` elapses.
    ///
    /// The provider call runs on its own task so a hung network call cannot
    /// stall the caller past the budget. On timeout the task is aborted;
    /// cancellation of the remote call is best-effort only, and an abandoned
    /// task that completes anyway discards its result through the dropped
    /// join handle, never through shared state.
    pub async fn invoke_with_timeout(
        &self,
        request: InferenceRequest,
        budget: Duration,
    ) -> String {
        let prompt = PromptBuilder::new(&self.store_name, &self.currency_prefix).build(&request);
        let client = Arc::clone(&self.client);
        let call = tokio::spawn(async move { client.complete(&prompt).await });
        let abort = call.abort_handle();

        match time::timeout(budget, call).await {
            Ok(Ok(Ok(text))) => text,
            Ok(Ok(Err(error))) => {
                warn!(
                    event_name = "invoker.provider_failed",
                    error = %error,
                    "generation call failed; returning fallback sentence"
                );
                fallback_sentence(&error).to_string()
            }
            Ok(Err(join_error)) => {
                warn!(
                    event_name = "invoker.task_failed",
                    error = %join_error,
                    "generation task aborted or panicked; returning fallback sentence"
                );
                ERROR_REPLY.to_string()
            }
            Err(_elapsed) => {
                abort.abort();
                warn!(
                    event_name = "invoker.budget_elapsed",
                    budget_ms = budget.as_millis() as u64,
                    "generation call missed its budget; abandoning it"
                );
                BUSY_REPLY.to_string()
            }
        }
    }
}

fn fallback_sentence(error: &InferenceError) -> &'static str {
    match error {
        InferenceError::ProviderUnavailable(_) => UNAVAILABLE_REPLY,
        InferenceError::ProviderError { .. } | InferenceError::MalformedResponse => ERROR_REPLY,
        InferenceError::Timeout => BUSY_REPLY,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time;

    use storebot_core::InferenceError;

    use crate::llm::{InferenceRequest, LlmClient};

    use super::{BoundedInvoker, BUSY_REPLY};

    struct SlowClient {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            time::sleep(self.delay).await;
            Ok("a perfectly good late answer".to_string())
        }
    }

    struct FailingClient {
        error: InferenceError,
    }

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
            Err(self.error.clone())
        }
    }

    fn invoker(client: Arc<dyn LlmClient>) -> BoundedInvoker {
        BoundedInvoker::new(client, "Trend Street", "Rs.")
    }

    #[tokio::test(start_paused = true)]
    async fn busy_sentence_comes_back_within_the_budget() {
        let client = Arc::new(SlowClient {
            delay: Duration::from_secs(30),
            calls: AtomicUsize::new(0),
        });
        let invoker = invoker(client.clone());

        let started = time::Instant::now();
        let reply = invoker
            .invoke_with_timeout(InferenceRequest::default(), Duration::from_secs(4))
            .await;

        assert_eq!(reply, BUSY_REPLY);
        // paused clock: elapsed is exactly the budget, never the 30s sleep
        assert!(started.elapsed() <= Duration::from_millis(4100));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_replies_pass_through_untouched() {
        let client = Arc::new(SlowClient {
            delay: Duration::from_millis(10),
            calls: AtomicUsize::new(0),
        });
        let invoker = invoker(client);

        let reply = invoker
            .invoke_with_timeout(InferenceRequest::default(), Duration::from_secs(4))
            .await;

        assert_eq!(reply, "a perfectly good late answer");
    }

    #[tokio::test]
    async fn provider_errors_collapse_into_nonempty_sentences() {
        for error in [
            InferenceError::ProviderUnavailable("no API key configured".to_string()),
            InferenceError::ProviderError { code: 503 },
            InferenceError::MalformedResponse,
        ] {
            let invoker = invoker(Arc::new(FailingClient { error }));
            let reply = invoker
                .invoke_with_timeout(InferenceRequest::default(), Duration::from_secs(4))
                .await;
            assert!(!reply.trim().is_empty());
            assert_ne!(reply, BUSY_REPLY);
        }
    }

    #[tokio::test]
    async fn at_most_one_provider_call_per_invocation() {
        let client = Arc::new(SlowClient {
            delay: Duration::from_millis(1),
            calls: AtomicUsize::new(0),
        });
        let invoker = invoker(client.clone());

        invoker.invoke_with_timeout(InferenceRequest::default(), Duration::from_secs(1)).await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }
}
