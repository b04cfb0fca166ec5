//! HTTP implementation of the ChatGateway port

use super::decoder::decode_event_stream;
use super::error::{HttpError, Result};
use super::protocol::{HistoryResponse, SendRequestBody};
use async_trait::async_trait;
use std::time::Duration;
use threadline_application::{ChatGateway, EventStream, GatewayError, SendRequest};
use threadline_domain::{HistoryTurn, ThreadId, truncate};
use tracing::{debug, warn};

/// Connection settings for [`HttpChatGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGatewaySettings {
    pub base_url: String,
    pub chat_path: String,
    pub history_path: String,
    /// Applies to connection establishment only, never to an open reply.
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpGatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/api/chat".to_string(),
            history_path: "/api/history".to_string(),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("threadline/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Gateway to the chat service over HTTP.
///
/// Replies are decoded incrementally as the body arrives.
pub struct HttpChatGateway {
    client: reqwest::Client,
    chat_url: String,
    history_url: String,
}

impl HttpChatGateway {
    pub fn new(settings: &HttpGatewaySettings) -> Result<Self> {
        let base = settings.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(HttpError::InvalidUrl(settings.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            chat_url: join_url(base, &settings.chat_path),
            history_url: join_url(base, &settings.history_path),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn history_url(&self) -> &str {
        &self.history_url
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Turn a non-success response into an error carrying (a prefix of) its body.
async fn reject_status(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("Chat service returned HTTP {}: {}", status, truncate(&body, 200));
    GatewayError::HttpStatus {
        status,
        body: truncate(&body, 500),
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send(&self, request: &SendRequest) -> std::result::Result<EventStream, GatewayError> {
        debug!(
            "POST {} (thread: {})",
            self.chat_url,
            request
                .thread_id
                .as_ref()
                .map(ThreadId::as_str)
                .unwrap_or("<new>")
        );

        let response = self
            .client
            .post(&self.chat_url)
            .json(&SendRequestBody::from(request))
            .send()
            .await
            .map_err(HttpError::from)?;

        if !response.status().is_success() {
            return Err(reject_status(response).await);
        }

        Ok(Box::pin(decode_event_stream(response.bytes_stream())))
    }

    async fn fetch_history(
        &self,
        thread_id: &ThreadId,
    ) -> std::result::Result<Vec<HistoryTurn>, GatewayError> {
        debug!("GET {} (thread: {})", self.history_url, thread_id);

        let response = self
            .client
            .get(&self.history_url)
            .query(&[("threadId", thread_id.as_str())])
            .send()
            .await
            .map_err(HttpError::from)?;

        if !response.status().is_success() {
            return Err(reject_status(response).await);
        }

        let body: HistoryResponse = response.json().await.map_err(HttpError::from)?;
        Ok(body.into_turns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use threadline_domain::{Origin, StreamEvent};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> HttpChatGateway {
        HttpChatGateway::new(&HttpGatewaySettings {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let gateway = HttpChatGateway::new(&HttpGatewaySettings {
            base_url: "http://localhost:9000/".to_string(),
            chat_path: "api/chat".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(gateway.chat_url(), "http://localhost:9000/api/chat");
        assert_eq!(gateway.history_url(), "http://localhost:9000/api/history");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let result = HttpChatGateway::new(&HttpGatewaySettings {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn send_posts_message_and_decodes_reply() {
        let server = MockServer::start().await;
        let body = concat!(
            r#"{"type":"threadId","threadId":"t1"}"#,
            "\n",
            r#"{"type":"delta","content":"Hi"}"#,
            "\n",
            r#"{"type":"delta","content":" there"}"#,
            "\n",
        );

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({"message": "hello", "threadId": null})))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let stream = gateway
            .send(&SendRequest::new("hello", None))
            .await
            .unwrap();
        let events: Vec<_> = stream.map(|r| r.unwrap()).collect().await;

        assert_eq!(
            events,
            vec![
                StreamEvent::thread_assigned(ThreadId::new("t1").unwrap()),
                StreamEvent::delta("Hi"),
                StreamEvent::delta(" there"),
            ]
        );
    }

    #[tokio::test]
    async fn send_includes_held_thread_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({"message": "again", "threadId": "t1"})))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let request = SendRequest::new("again", Some(ThreadId::new("t1").unwrap()));
        let stream = gateway.send(&request).await.unwrap();
        assert_eq!(stream.count().await, 0);
    }

    #[tokio::test]
    async fn non_success_status_fails_before_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let result = gateway.send(&SendRequest::new("hello", None)).await;
        match result {
            Err(GatewayError::HttpStatus { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected HTTP status error"),
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_a_connection_error() {
        let gateway = HttpChatGateway::new(&HttpGatewaySettings {
            base_url: "http://127.0.0.1:9".to_string(),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let result = gateway.send(&SendRequest::new("hello", None)).await;
        assert!(matches!(result, Err(GatewayError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn fetch_history_queries_by_thread() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .and(query_param("threadId", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [
                    {"id": "m2", "role": "assistant", "text": "Hello", "created_at": 2.0},
                    {"id": "m1", "role": "user", "text": "Hi", "created_at": 1.0}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let turns = gateway
            .fetch_history(&ThreadId::new("t1").unwrap())
            .await
            .unwrap();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].id, "m2");
        assert_eq!(turns[0].origin, Origin::Assistant);
        assert_eq!(turns[1].created_at, 1.0);
    }

    #[tokio::test]
    async fn fetch_history_accepts_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let turns = gateway
            .fetch_history(&ThreadId::new("t1").unwrap())
            .await
            .unwrap();
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn fetch_history_rejects_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let result = gateway.fetch_history(&ThreadId::new("t1").unwrap()).await;
        assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
    }
}
