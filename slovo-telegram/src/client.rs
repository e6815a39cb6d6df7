//! HTTP client for the Bot API methods the trainer uses.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::TelegramError;
use crate::types::{InlineButton, ReplyMarkup, SendMessageRequest, Update, UpdatesResponse};

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin client over `getUpdates` and `sendMessage`.
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client against the public Bot API.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_API_URL, token)
    }

    /// Point the client at a different API host (tests, local proxies).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    /// Fetch updates with ids at or above `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`TelegramError`] if the request fails, the status is
    /// non-success, or the body does not parse.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let response = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[("offset", offset)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Status(status.as_u16()));
        }

        let body: UpdatesResponse = response.json().await?;
        if !body.ok {
            return Err(TelegramError::Api("getUpdates reported ok=false".into()));
        }

        debug!(count = body.result.len(), offset, "fetched updates");
        Ok(body.result)
    }

    /// Send a plain text message.
    ///
    /// # Errors
    ///
    /// Returns a [`TelegramError`] if the request fails or the status is
    /// non-success.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send(SendMessageRequest {
            chat_id,
            text: text.to_owned(),
            reply_markup: None,
        })
        .await
    }

    /// Send a message with rows of labeled choice buttons.
    ///
    /// # Errors
    ///
    /// Returns a [`TelegramError`] if the request fails or the status is
    /// non-success.
    pub async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Vec<Vec<InlineButton>>,
    ) -> Result<(), TelegramError> {
        self.send(SendMessageRequest {
            chat_id,
            text: text.to_owned(),
            reply_markup: Some(ReplyMarkup {
                inline_keyboard: keyboard,
            }),
        })
        .await
    }

    async fn send(&self, body: SendMessageRequest) -> Result<(), TelegramError> {
        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Status(status.as_u16()));
        }

        debug!(chat = body.chat_id, "message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TelegramClient {
        TelegramClient::with_base_url(server.uri(), "TESTTOKEN")
    }

    #[tokio::test]
    async fn get_updates_parses_batch() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "ok": true,
            "result": [
                {"update_id": 5, "message": {"text": "hello", "chat": {"id": 1}}},
                {"update_id": 6, "callback_query": {"data": "answer_1", "message": {"chat": {"id": 1}}}}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/botTESTTOKEN/getUpdates"))
            .and(query_param("offset", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let updates = client(&server).get_updates(5).await.expect("updates");
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].update_id, 5);
        assert_eq!(
            updates[1]
                .callback_query
                .as_ref()
                .and_then(|q| q.data.as_deref()),
            Some("answer_1")
        );
    }

    #[tokio::test]
    async fn get_updates_maps_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/botTESTTOKEN/getUpdates"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client(&server).get_updates(0).await.expect_err("status");
        assert!(matches!(err, TelegramError::Status(502)));
    }

    #[tokio::test]
    async fn get_updates_rejects_ok_false() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/botTESTTOKEN/getUpdates"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "result": []})),
            )
            .mount(&server)
            .await;

        let err = client(&server).get_updates(0).await.expect_err("api error");
        assert!(matches!(err, TelegramError::Api(_)));
    }

    #[tokio::test]
    async fn get_updates_flags_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/botTESTTOKEN/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).get_updates(0).await.expect_err("malformed");
        assert!(matches!(err, TelegramError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn send_message_posts_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTESTTOKEN/sendMessage"))
            .and(body_partial_json(
                serde_json::json!({"chat_id": 7, "text": "Правильно!"}),
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .send_message(7, "Правильно!")
            .await
            .expect("send");
    }

    #[tokio::test]
    async fn send_keyboard_includes_buttons() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTESTTOKEN/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "reply_markup": {"inline_keyboard": [[
                    {"text": "яблоко", "callback_data": "answer_0"}
                ]]}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .send_keyboard(
                7,
                "apple",
                vec![vec![InlineButton {
                    text: "яблоко".into(),
                    callback_data: "answer_0".into(),
                }]],
            )
            .await
            .expect("send");
    }
}
