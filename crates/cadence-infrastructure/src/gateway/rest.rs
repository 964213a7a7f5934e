//! Persistence gateway over the hosted backend's REST interface.
//!
//! The backend exposes each table at `{base_url}/rest/v1/{table}` with
//! PostgREST conventions: row filters as `column=eq.value` query pairs,
//! ordering as `order=column.asc`, and `Prefer: return=representation` to get
//! affected rows back from `PATCH`/`DELETE`. The latter is what makes
//! `claim_latest_for_user` a single atomic call: the delete itself returns the
//! rows it removed.

use async_trait::async_trait;
use cadence_core::CadenceError;
use cadence_core::config::GatewaySettings;
use cadence_core::error::Result;
use cadence_core::paused::{PausedConversation, PausedConversationRepository};
use cadence_core::session::{Conversation, ConversationGateway, ConversationPatch, MessageRow};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const CONVERSATIONS: &str = "conversations";
const MESSAGES: &str = "messages";
const PAUSED_CONVERSATIONS: &str = "paused_conversations";

const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

#[derive(Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestGateway {
    /// Creates a gateway with an explicit HTTP client.
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Builds a gateway from the `[gateway]` config section.
    ///
    /// Both `base_url` and `api_key` are required.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self> {
        let base_url = settings
            .base_url
            .clone()
            .ok_or_else(|| CadenceError::config("gateway.base_url is not set"))?;
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| CadenceError::config("gateway.api_key is not set"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        tracing::info!("[RestGateway] Using backend at {}", base_url);
        Ok(Self::new(client, base_url, api_key))
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Adds the API key headers every request needs.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(CadenceError::gateway(format!("HTTP {}: {}", status, body)))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn delete_user_rows(&self, user_id: &str) -> Result<Vec<PausedConversation>> {
        let request = self
            .client
            .delete(self.table_url(PAUSED_CONVERSATIONS))
            .query(&[("user_id", eq(user_id))])
            .header("Prefer", RETURN_REPRESENTATION);
        self.send_json(request).await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl ConversationGateway for RestGateway {
    async fn fetch_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let request = self
            .client
            .get(self.table_url(CONVERSATIONS))
            .query(&[("id", eq(conversation_id)), ("select", "*".to_string())]);
        let rows: Vec<Conversation> = self.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>> {
        let request = self.client.get(self.table_url(MESSAGES)).query(&[
            ("conversation_id", eq(conversation_id)),
            ("select", "*".to_string()),
            ("order", "created_at.asc".to_string()),
        ]);
        self.send_json(request).await
    }

    async fn update_conversation(
        &self,
        conversation_id: &str,
        patch: &ConversationPatch,
    ) -> Result<()> {
        let request = self
            .client
            .patch(self.table_url(CONVERSATIONS))
            .query(&[("id", eq(conversation_id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        let rows: Vec<serde_json::Value> = self.send_json(request).await?;
        if rows.is_empty() {
            return Err(CadenceError::not_found("conversation", conversation_id));
        }
        Ok(())
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(CONVERSATIONS))
            .header("Prefer", RETURN_MINIMAL)
            .json(conversation);
        self.send(request).await?;
        Ok(())
    }

    async fn insert_message(&self, row: &MessageRow) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(MESSAGES))
            .header("Prefer", RETURN_MINIMAL)
            .json(row);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl PausedConversationRepository for RestGateway {
    async fn insert(&self, row: &PausedConversation) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(PAUSED_CONVERSATIONS))
            .header("Prefer", RETURN_MINIMAL)
            .json(row);
        self.send(request).await?;
        Ok(())
    }

    async fn find_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>> {
        let request = self
            .client
            .get(self.table_url(PAUSED_CONVERSATIONS))
            .query(&[
                ("user_id", eq(user_id)),
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", "1".to_string()),
            ]);
        let rows: Vec<PausedConversation> = self.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<usize> {
        Ok(self.delete_user_rows(user_id).await?.len())
    }

    async fn claim_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>> {
        let rows = self.delete_user_rows(user_id).await?;
        Ok(rows.into_iter().max_by_key(|row| row.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let gateway = RestGateway::new(Client::new(), "https://backend.example.co/", "key");
        assert_eq!(
            gateway.table_url(PAUSED_CONVERSATIONS),
            "https://backend.example.co/rest/v1/paused_conversations"
        );
    }

    #[test]
    fn test_from_settings_requires_url_and_key() {
        let mut settings = GatewaySettings::default();
        let err = RestGateway::from_settings(&settings).err().unwrap();
        assert!(err.to_string().contains("base_url"));

        settings.base_url = Some("https://backend.example.co".to_string());
        let err = RestGateway::from_settings(&settings).err().unwrap();
        assert!(err.to_string().contains("api_key"));

        settings.api_key = Some("anon".to_string());
        assert!(RestGateway::from_settings(&settings).is_ok());
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq("user-1"), "eq.user-1");
    }
}
