//! Client for the external generative-AI flows.
//!
//! The core depends only on the request/response contracts here. Every
//! error from this boundary is recoverable: call sites own a fallback and
//! a user-visible notice. Timeouts are the provider's responsibility; no
//! retries, no cancellation of in-flight requests.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use tranquil_core::{PrioritizeItem, PrioritizedTask};

use crate::config::AiSection;

#[derive(Debug, Clone)]
pub struct AiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl AiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(cfg: &AiSection) -> Self {
        let api_key = std::env::var(&cfg.api_key_env).ok();
        Self::new(cfg.base_url.clone(), cfg.model.clone(), api_key)
    }

    /// Prioritize: tasks in, `{name, priorityScore, reasoning}` out.
    /// Matching back to Task records is by name (see core::prioritize).
    pub async fn prioritize_tasks(&self, items: &[PrioritizeItem]) -> Result<Vec<PrioritizedTask>> {
        self.post_flow("prioritizeTasks", &items)
            .await
            .context("prioritize request")
    }

    /// Motivate: a short message for a just-completed task.
    pub async fn motivate_completion(
        &self,
        task_name: &str,
        task_description: &str,
    ) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            task_name: &'a str,
            task_description: &'a str,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Resp {
            motivational_message: String,
        }

        let resp: Resp = self
            .post_flow(
                "motivateTaskCompletion",
                &Req {
                    task_name,
                    task_description,
                },
            )
            .await
            .context("motivate request")?;
        Ok(resp.motivational_message)
    }

    /// Sarcastic snooze: joke audio (wav) as a data URI.
    pub async fn sarcastic_snooze(&self, alarm_description: &str) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            alarm_description: &'a str,
        }

        #[derive(Deserialize)]
        struct Resp {
            audio: String,
        }

        let resp: Resp = self
            .post_flow("sarcasticAlarmSnooze", &Req { alarm_description })
            .await
            .context("snooze joke request")?;

        if !resp.audio.starts_with("data:audio") {
            bail!("snooze joke response is not an audio data URI");
        }
        Ok(resp.audio)
    }

    async fn post_flow<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        flow: &str,
        input: &B,
    ) -> Result<R> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no AI key configured (set the api_key_env variable)"))?;

        let url = format!("{}/flows/{flow}", self.base_url.trim_end_matches('/'));

        #[derive(Serialize)]
        struct Body<'a, B: Serialize + ?Sized> {
            model: &'a str,
            input: &'a B,
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&Body {
                model: &self.model,
                input,
            })
            .send()
            .await
            .with_context(|| format!("{flow} request"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("{flow} error: {status} {txt}");
        }

        resp.json().await.with_context(|| format!("parse {flow} response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_before_any_network_call() {
        let client = AiClient::new("http://127.0.0.1:9", "test-model", None);
        let err = client.motivate_completion("task", "desc").await.unwrap_err();
        assert!(err.to_string().contains("motivate request"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_recoverable_error() {
        let client = AiClient::new("http://127.0.0.1:9", "test-model", Some("k".to_string()));
        assert!(client.sarcastic_snooze("gym").await.is_err());
    }
}
