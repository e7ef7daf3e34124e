use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{BotError, Result};

pub const API_BASE: &str = "https://api.telegram.org";

/// Extra time on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl<'a> SendMessage<'a> {
    pub fn plain(chat_id: i64, text: &'a str) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: None,
            disable_web_page_preview: false,
            reply_to_message_id: None,
        }
    }

    pub fn markdown(chat_id: i64, text: &'a str) -> Self {
        Self {
            parse_mode: Some("Markdown"),
            disable_web_page_preview: true,
            ..Self::plain(chat_id, text)
        }
    }

    pub fn replying_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

/// Minimal Bot API client: `getUpdates` and `sendMessage`.
pub struct TelegramClient {
    client: reqwest::Client,
    endpoint: String,
}

impl TelegramClient {
    pub fn new(token: &str, poll_timeout: Duration) -> Result<Self> {
        Self::with_api_base(API_BASE, token, poll_timeout)
    }

    pub fn with_api_base(api_base: &str, token: &str, poll_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + POLL_GRACE)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        })
    }

    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let resp = self
            .client
            .get(format!("{}/getUpdates", self.endpoint))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout.as_secs().to_string()),
            ])
            .send()
            .await?;
        Self::unwrap_response(resp).await
    }

    pub async fn send_message(&self, message: &SendMessage<'_>) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/sendMessage", self.endpoint))
            .json(message)
            .send()
            .await?;
        Self::unwrap_response::<serde_json::Value>(resp).await?;
        Ok(())
    }

    async fn unwrap_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body: ApiResponse<T> = resp.json().await.map_err(|err| {
            BotError::Api(format!("unreadable response (HTTP {}): {err}", status.as_u16()))
        })?;
        match (body.ok, body.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Api(body.description.unwrap_or_else(|| {
                format!("request failed with HTTP {}", status.as_u16())
            }))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server: &mockito::ServerGuard) -> TelegramClient {
        TelegramClient::with_api_base(&server.url(), "TOKEN", Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_get_updates_parses_messages() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/botTOKEN/getUpdates")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("offset".into(), "7".into()),
                Matcher::UrlEncoded("timeout".into(), "30".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ok": true, "result": [
                    {"update_id": 7, "message": {"message_id": 1, "chat": {"id": 42, "type": "private"}, "text": "Dom Casmurro"}},
                    {"update_id": 8, "edited_message": {"message_id": 1, "chat": {"id": 42}}}
                ]}"#,
            )
            .create_async()
            .await;

        let updates = client(&server)
            .get_updates(7, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("Dom Casmurro"));
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn test_api_error_description_is_surfaced() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/botTOKEN/getUpdates")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .get_updates(0, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Api(msg) if msg == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_send_markdown_disables_previews() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": 42,
                "text": "*hi*",
                "parse_mode": "Markdown",
                "disable_web_page_preview": true,
                "reply_to_message_id": 3
            })))
            .with_status(200)
            .with_body(r#"{"ok": true, "result": {"message_id": 4}}"#)
            .create_async()
            .await;

        client(&server)
            .send_message(&SendMessage::markdown(42, "*hi*").replying_to(3))
            .await
            .unwrap();
        m.assert_async().await;
    }
}
