//! Outbound Discord REST calls behind a trait so the wizard can be driven
//! against a recording fake in tests.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use timeclock_core::MessageHandle;
use tracing::debug;

use crate::components::{MessageTemplate, Modal};
use crate::events::InteractionContext;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("discord request failed: {0}")]
    Transport(String),
    #[error("discord returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("discord response could not be decoded: {0}")]
    Decode(String),
}

/// Interaction callback bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionResponse {
    /// New message in the channel, ephemeral when the template says so.
    ChannelMessage(MessageTemplate),
    /// Acknowledge without changing anything visible.
    DeferredUpdate,
    /// Replace the message the component is attached to.
    UpdateMessage(MessageTemplate),
    Modal(Modal),
}

impl InteractionResponse {
    pub fn callback_type(&self) -> u8 {
        match self {
            Self::ChannelMessage(_) => 4,
            Self::DeferredUpdate => 6,
            Self::UpdateMessage(_) => 7,
            Self::Modal(_) => 9,
        }
    }

    pub fn to_payload(&self) -> Value {
        let data = match self {
            Self::ChannelMessage(message) | Self::UpdateMessage(message) => json!(message),
            Self::DeferredUpdate => Value::Null,
            Self::Modal(modal) => json!(modal),
        };
        if data.is_null() {
            json!({ "type": self.callback_type() })
        } else {
            json!({ "type": self.callback_type(), "data": data })
        }
    }
}

#[async_trait]
pub trait DiscordHttp: Send + Sync {
    async fn create_message(
        &self,
        channel_id: &str,
        message: &MessageTemplate,
    ) -> Result<MessageHandle, HttpError>;

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        message: &MessageTemplate,
    ) -> Result<(), HttpError>;

    async fn respond(
        &self,
        interaction: &InteractionContext,
        response: &InteractionResponse,
    ) -> Result<(), HttpError>;
}

pub struct RestDiscordHttp {
    client: Client,
    api_base_url: String,
    token: SecretString,
}

#[derive(Deserialize)]
struct CreatedMessage {
    id: String,
    channel_id: String,
}

impl RestDiscordHttp {
    pub fn new(api_base_url: impl Into<String>, token: SecretString) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_owned();
        Self { client: Client::new(), api_base_url, token }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token.expose_secret())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, HttpError> {
        let response =
            request.send().await.map_err(|error| HttpError::Transport(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }
}

#[async_trait]
impl DiscordHttp for RestDiscordHttp {
    async fn create_message(
        &self,
        channel_id: &str,
        message: &MessageTemplate,
    ) -> Result<MessageHandle, HttpError> {
        let request = self
            .client
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .header("Authorization", self.authorization())
            .json(message);
        let created: CreatedMessage = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|error| HttpError::Decode(error.to_string()))?;
        debug!(channel_id, message_id = %created.id, "created discord message");
        Ok(MessageHandle { channel_id: created.channel_id, message_id: created.id })
    }

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        message: &MessageTemplate,
    ) -> Result<(), HttpError> {
        let request = self
            .client
            .patch(self.url(&format!(
                "/channels/{}/messages/{}",
                handle.channel_id, handle.message_id
            )))
            .header("Authorization", self.authorization())
            .json(message);
        self.send(request).await.map(|_| ())
    }

    async fn respond(
        &self,
        interaction: &InteractionContext,
        response: &InteractionResponse,
    ) -> Result<(), HttpError> {
        let request = self
            .client
            .post(self.url(&format!(
                "/interactions/{}/{}/callback",
                interaction.interaction_id, interaction.token
            )))
            .json(&response.to_payload());
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use timeclock_core::SessionId;

    use super::{InteractionResponse, RestDiscordHttp};
    use crate::components::{hello_message, name_modal};

    #[test]
    fn deferred_update_carries_no_data() {
        assert_eq!(InteractionResponse::DeferredUpdate.to_payload(), json!({ "type": 6 }));
    }

    #[test]
    fn modal_payload_wraps_the_dialog() {
        let session_id = SessionId::new();
        let payload = InteractionResponse::Modal(name_modal(session_id)).to_payload();

        assert_eq!(payload["type"], 9);
        assert_eq!(payload["data"]["custom_id"], format!("timeclock:{session_id}:name_modal"));
        assert_eq!(payload["data"]["components"][0]["components"][0]["custom_id"], "user_name");
    }

    #[test]
    fn message_payloads_use_their_callback_type() {
        let channel = InteractionResponse::ChannelMessage(hello_message()).to_payload();
        let update = InteractionResponse::UpdateMessage(hello_message()).to_payload();

        assert_eq!(channel["type"], 4);
        assert_eq!(update["type"], 7);
        assert_eq!(update["data"]["content"], "สวัสดีครับ!");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let http = RestDiscordHttp::new("https://discord.com/api/v10/", "token".to_owned().into());
        assert_eq!(http.url("/channels/1/messages"), "https://discord.com/api/v10/channels/1/messages");
    }
}
