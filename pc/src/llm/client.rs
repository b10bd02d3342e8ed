//! GenerationClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, GenerationError};

/// Stateless generation client - each call is independent
///
/// This is the core abstraction for the generation service boundary. The
/// transcript travels inside every request; no conversation state is held by
/// the client, so the orchestrator stays the single owner of session state.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    ///
    /// The wizard awaits each call sequentially - at most one request is in
    /// flight per session.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, GenerationError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock generation client for unit tests
    pub struct MockGenerationClient {
        responses: Vec<CompletionResponse>,
        call_count: AtomicUsize,
    }

    impl MockGenerationClient {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Build a mock that replies with the given texts, in order
        pub fn with_texts(texts: &[&str]) -> Self {
            Self::new(
                texts
                    .iter()
                    .map(|t| CompletionResponse {
                        content: Some(t.to_string()),
                        usage: Default::default(),
                    })
                    .collect(),
            )
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationClient for MockGenerationClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, GenerationError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(idx)
                .cloned()
                .ok_or_else(|| GenerationError::InvalidResponse("No more mock responses".to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_responses() {
            let client = MockGenerationClient::with_texts(&["Response 1", "Response 2"]);

            let req = CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![],
                max_tokens: 1000,
            };

            let resp1 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp2.content, Some("Response 2".to_string()));

            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockGenerationClient::new(vec![]);

            let req = CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![],
                max_tokens: 1000,
            };

            let result = client.complete(req).await;
            assert!(result.is_err());
        }
    }
}
