//! Simulation service API: the trait the controller talks to, and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::SessionId,
    protocol::{
        EnvironmentsResponse, ErrorBody, LaunchWorldResponse, ObjectsResponse, SpawnRobotRequest,
        SpawnRobotResponse, StatusResponse, StopResponse, ValidateConfigRequest,
        ValidateConfigResponse, WorldConfigPayload,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("service responded with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// The `error` string the service put in a failure body, if any.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            TransportError::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

#[async_trait]
pub trait SimulationApi: Send + Sync {
    async fn health_check(&self) -> TransportResult<()>;
    async fn list_objects(&self) -> TransportResult<ObjectsResponse>;
    async fn list_environments(&self) -> TransportResult<EnvironmentsResponse>;
    async fn launch_world(&self, config: &WorldConfigPayload)
        -> TransportResult<LaunchWorldResponse>;
    async fn spawn_robot(&self, request: &SpawnRobotRequest)
        -> TransportResult<SpawnRobotResponse>;
    async fn status(&self, session_id: Option<&SessionId>) -> TransportResult<StatusResponse>;
    async fn stop_session(&self, session_id: &SessionId) -> TransportResult<StopResponse>;
    async fn stop_all(&self) -> TransportResult<StopResponse>;
    async fn validate_config(
        &self,
        request: &ValidateConfigRequest,
    ) -> TransportResult<ValidateConfigResponse>;
}

pub struct HttpSimulationApi {
    http: Client,
    api_root: String,
    health_url: String,
}

impl HttpSimulationApi {
    pub fn new(settings: &Settings) -> TransportResult<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Ok(Self {
            http,
            api_root: settings.api_root(),
            health_url: settings.health_url(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_root)
    }

    /// `path` followed by the session id as one percent-encoded segment.
    fn session_endpoint(&self, path: &str, session_id: &SessionId) -> TransportResult<String> {
        let mut url = Url::parse(&self.endpoint(path))
            .map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl("api root cannot take a path".into()))?
            .pop_if_empty()
            .push(session_id.as_str());
        Ok(url.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> TransportResult<T> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, url: String, body: Option<&B>) -> TransportResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, "POST");
        let request = self.http.post(url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let response = request.send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> TransportResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.trim().is_empty());
        return Err(TransportError::Status {
            status: status.as_u16(),
            message,
        });
    }
    response.json::<T>().await.map_err(TransportError::from)
}

#[async_trait]
impl SimulationApi for HttpSimulationApi {
    async fn health_check(&self) -> TransportResult<()> {
        let response = self.http.get(&self.health_url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Status {
                status: response.status().as_u16(),
                message: None,
            })
        }
    }

    async fn list_objects(&self) -> TransportResult<ObjectsResponse> {
        self.get_json(self.endpoint("/objects")).await
    }

    async fn list_environments(&self) -> TransportResult<EnvironmentsResponse> {
        self.get_json(self.endpoint("/environments")).await
    }

    async fn launch_world(
        &self,
        config: &WorldConfigPayload,
    ) -> TransportResult<LaunchWorldResponse> {
        self.post_json(self.endpoint("/world/launch"), Some(config))
            .await
    }

    async fn spawn_robot(
        &self,
        request: &SpawnRobotRequest,
    ) -> TransportResult<SpawnRobotResponse> {
        self.post_json(self.endpoint("/robot/spawn"), Some(request))
            .await
    }

    async fn status(&self, session_id: Option<&SessionId>) -> TransportResult<StatusResponse> {
        let url = match session_id {
            Some(id) => self.session_endpoint("/simulation/status", id)?,
            None => self.endpoint("/simulation/status"),
        };
        self.get_json(url).await
    }

    async fn stop_session(&self, session_id: &SessionId) -> TransportResult<StopResponse> {
        let url = self.session_endpoint("/simulation/stop", session_id)?;
        self.post_json::<(), _>(url, None).await
    }

    async fn stop_all(&self) -> TransportResult<StopResponse> {
        self.post_json::<(), _>(self.endpoint("/simulation/stop-all"), None)
            .await
    }

    async fn validate_config(
        &self,
        request: &ValidateConfigRequest,
    ) -> TransportResult<ValidateConfigResponse> {
        self.post_json(self.endpoint("/config/validate"), Some(request))
            .await
    }
}
