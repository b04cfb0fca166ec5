//! Hydrate History use case
//!
//! Seeds a session with the remote transcript of a stored thread. Failure is
//! never fatal: the session simply starts with an empty log.

use crate::ports::chat_gateway::ChatGateway;
use std::sync::Arc;
use threadline_domain::{Message, ThreadId, order_history};
use tracing::{debug, info, warn};

/// How hydration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationStatus {
    /// No stored thread; nothing was fetched.
    NoThread,
    /// The transcript was fetched (possibly empty).
    Hydrated,
    /// The fetch failed; the session continues with an empty log.
    Failed,
}

/// Result of a hydration run.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationOutcome {
    pub status: HydrationStatus,
    /// Completed messages, oldest first.
    pub messages: Vec<Message>,
}

impl HydrationOutcome {
    fn empty(status: HydrationStatus) -> Self {
        Self {
            status,
            messages: Vec::new(),
        }
    }
}

/// Use case for fetching and ordering a thread's prior transcript
pub struct HydrateHistoryUseCase {
    gateway: Arc<dyn ChatGateway>,
}

impl HydrateHistoryUseCase {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch the transcript for `thread_id`, if there is one.
    ///
    /// Issues at most one request.
    pub async fn execute(&self, thread_id: Option<&ThreadId>) -> HydrationOutcome {
        let Some(thread_id) = thread_id else {
            debug!("No stored thread, skipping history fetch");
            return HydrationOutcome::empty(HydrationStatus::NoThread);
        };

        match self.gateway.fetch_history(thread_id).await {
            Ok(turns) => {
                let messages = order_history(turns);
                info!(
                    "Hydrated thread {} with {} messages",
                    thread_id,
                    messages.len()
                );
                HydrationOutcome {
                    status: HydrationStatus::Hydrated,
                    messages,
                }
            }
            Err(e) => {
                warn!("History fetch for thread {} failed: {}", thread_id, e);
                HydrationOutcome::empty(HydrationStatus::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_gateway::{EventStream, GatewayError, SendRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use threadline_domain::{HistoryTurn, Origin};

    // -- Mock ChatGateway -------------------------------------------------------

    struct HistoryGateway {
        history: Result<Vec<HistoryTurn>, GatewayError>,
        fetches: AtomicUsize,
    }

    impl HistoryGateway {
        fn new(history: Result<Vec<HistoryTurn>, GatewayError>) -> Arc<Self> {
            Arc::new(Self {
                history,
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatGateway for HistoryGateway {
        async fn send(&self, _request: &SendRequest) -> Result<EventStream, GatewayError> {
            Err(GatewayError::Other("send not scripted".to_string()))
        }

        async fn fetch_history(
            &self,
            _thread_id: &ThreadId,
        ) -> Result<Vec<HistoryTurn>, GatewayError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.history.clone()
        }
    }

    fn thread() -> ThreadId {
        ThreadId::new("t1").unwrap()
    }

    #[tokio::test]
    async fn no_thread_skips_fetch() {
        let gateway = HistoryGateway::new(Ok(vec![]));
        let use_case = HydrateHistoryUseCase::new(gateway.clone());

        let outcome = use_case.execute(None).await;
        assert_eq!(outcome.status, HydrationStatus::NoThread);
        assert!(outcome.messages.is_empty());
        assert_eq!(gateway.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn hydrates_in_created_at_order() {
        let gateway = HistoryGateway::new(Ok(vec![
            HistoryTurn::new("m2", Origin::Assistant, "Hello!", 2.0),
            HistoryTurn::new("m1", Origin::User, "Hi", 1.0),
        ]));
        let use_case = HydrateHistoryUseCase::new(gateway.clone());

        let outcome = use_case.execute(Some(&thread())).await;
        assert_eq!(outcome.status, HydrationStatus::Hydrated);
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.messages[0].text(), "Hi");
        assert_eq!(outcome.messages[1].text(), "Hello!");
        assert!(outcome.messages.iter().all(|m| !m.is_pending()));
        assert_eq!(gateway.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_absorbed() {
        let gateway = HistoryGateway::new(Err(GatewayError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        }));
        let use_case = HydrateHistoryUseCase::new(gateway);

        let outcome = use_case.execute(Some(&thread())).await;
        assert_eq!(outcome.status, HydrationStatus::Failed);
        assert!(outcome.messages.is_empty());
    }
}
