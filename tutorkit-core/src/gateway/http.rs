//! HTTP implementation of the backend gateway

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use tutorkit_common::protocol::{
    ChatRequest, ChatResponse, FillBlankRequest, GoOnRequest, LogCodeExecutionRequest,
    SegmentsRequest, UpdateBktRequest, UpdateSeqRequest,
};
use tutorkit_common::types::Segment;

use super::{GatewayError, TutorBackend};

const USER_AGENT: &str = concat!("tutorkit/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway posting JSON bodies to `<base_url>/<operation>`.
pub struct HttpGateway {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, R>(&self, operation: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{operation}", self.base_url);
        tracing::debug!(operation, "posting to tutoring backend");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(status.as_u16(), error_text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| GatewayError::Malformed(format!("{operation}: {e}")))
    }

    /// Operations whose acknowledgement body we don't care about beyond it
    /// being valid JSON.
    async fn post_ack<B>(&self, operation: &str, body: &B) -> Result<(), GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let _: serde_json::Value = self.post_json(operation, body).await?;
        Ok(())
    }
}

#[async_trait]
impl TutorBackend for HttpGateway {
    async fn segments(&self, req: SegmentsRequest) -> Result<Vec<Segment>, GatewayError> {
        self.post_json("segments", &req).await
    }

    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.post_json("chat", &req).await
    }

    async fn go_on(&self, req: GoOnRequest) -> Result<bool, GatewayError> {
        let answer: String = self.post_json("go_on", &req).await?;
        Ok(answer.trim().eq_ignore_ascii_case("yes"))
    }

    async fn update_seq(&self, req: UpdateSeqRequest) -> Result<(), GatewayError> {
        self.post_ack("update_seq", &req).await
    }

    async fn update_bkt(&self, req: UpdateBktRequest) -> Result<(), GatewayError> {
        self.post_ack("update_bkt", &req).await
    }

    async fn fill_blank(&self, req: FillBlankRequest) -> Result<Vec<String>, GatewayError> {
        self.post_json("fill_blank", &req).await
    }

    async fn log_code_execution(
        &self,
        req: LogCodeExecutionRequest,
    ) -> Result<(), GatewayError> {
        self.post_ack("log_code_execution", &req).await
    }
}
