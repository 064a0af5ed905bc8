//! Channel and message calls

use crate::client::RestClient;
use crate::error::RestResult;
use guild_core::models::{ChatMessage, MessageCreate, MessageUpdate, ServerChannel};
use reqwest::Method;
use serde::Deserialize;

#[derive(Deserialize)]
struct MessageBody {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChannelBody {
    channel: ServerChannel,
}

impl RestClient {
    /// Post a plain text message
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn channel_message_create(&self, channel_id: &str, content: &str) -> RestResult<ChatMessage> {
        self.channel_message_create_complex(channel_id, &MessageCreate::text(content))
            .await
    }

    /// Post a message with embeds, replies or privacy flags
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn channel_message_create_complex(
        &self,
        channel_id: &str,
        message: &MessageCreate,
    ) -> RestResult<ChatMessage> {
        let url = self.endpoints().channel_messages(channel_id);
        let body: MessageBody = self.request_json(Method::POST, &url, Some(message)).await?;
        Ok(body.message)
    }

    /// Fetch a single message
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn channel_message(&self, channel_id: &str, message_id: &str) -> RestResult<ChatMessage> {
        let url = self.endpoints().channel_message(channel_id, message_id);
        let body: MessageBody = self.request_json::<_, ()>(Method::GET, &url, None).await?;
        Ok(body.message)
    }

    /// Edit a message
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn channel_message_update(
        &self,
        channel_id: &str,
        message_id: &str,
        update: &MessageUpdate,
    ) -> RestResult<ChatMessage> {
        let url = self.endpoints().channel_message(channel_id, message_id);
        let body: MessageBody = self.request_json(Method::PUT, &url, Some(update)).await?;
        Ok(body.message)
    }

    /// Delete a message
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn channel_message_delete(&self, channel_id: &str, message_id: &str) -> RestResult<()> {
        let url = self.endpoints().channel_message(channel_id, message_id);
        self.execute(Method::DELETE, &url, None).await?;
        Ok(())
    }

    /// Fetch a channel
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn channel_get(&self, channel_id: &str) -> RestResult<ServerChannel> {
        let url = self.endpoints().channel(channel_id);
        let body: ChannelBody = self.request_json::<_, ()>(Method::GET, &url, None).await?;
        Ok(body.channel)
    }
}

#[cfg(test)]
mod tests {
    use crate::{RestClient, RestError};
    use guild_common::RestConfig;
    use guild_core::models::{MessageUpdate, ServerChannelType};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RestClient {
        let config = RestConfig {
            api_base: format!("{}/", server.uri()),
            ..RestConfig::default()
        };
        RestClient::new("token", config, None).unwrap()
    }

    fn message_json(content: &str) -> serde_json::Value {
        serde_json::json!({
            "message": {
                "id": "m1",
                "type": "default",
                "serverId": "s1",
                "channelId": "c1",
                "content": content,
                "createdBy": "u1"
            }
        })
    }

    #[tokio::test]
    async fn test_channel_message_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/c1/messages"))
            .and(body_json(serde_json::json!({"content": "pong"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(message_json("pong")))
            .expect(1)
            .mount(&server)
            .await;

        let message = client(&server).channel_message_create("c1", "pong").await.unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.content, "pong");
    }

    #[tokio::test]
    async fn test_channel_message_update_uses_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/channels/c1/messages/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json("edited")))
            .expect(1)
            .mount(&server)
            .await;

        let update = MessageUpdate {
            content: Some("edited".to_string()),
            ..MessageUpdate::default()
        };
        let message = client(&server)
            .channel_message_update("c1", "m1", &update)
            .await
            .unwrap();
        assert_eq!(message.content, "edited");
    }

    #[tokio::test]
    async fn test_channel_message_get_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/c1/messages/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json("hi")))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/channels/c1/messages/m1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let rest = client(&server);
        assert_eq!(rest.channel_message("c1", "m1").await.unwrap().id, "m1");
        rest.channel_message_delete("c1", "m1").await.unwrap();
    }

    #[tokio::test]
    async fn test_channel_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "channel": {"id": "c1", "type": "voice", "name": "lobby", "serverId": "s1"}
            })))
            .mount(&server)
            .await;

        let channel = client(&server).channel_get("c1").await.unwrap();
        assert_eq!(channel.name, "lobby");
        assert_eq!(channel.channel_type, ServerChannelType::Voice);
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let error = client(&server).channel_get("c1").await.unwrap_err();
        assert!(matches!(error, RestError::Decode(_)));
    }
}
