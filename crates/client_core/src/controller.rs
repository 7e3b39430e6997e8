use std::{collections::BTreeMap, sync::Arc};

use shared::{
    catalog::Catalog,
    domain::{ApiHealth, SessionId, SessionStatus},
    error::LauncherError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    api::{SimulationApi, TransportError},
    state::LauncherState,
};

/// Drives [`LauncherState`] against a [`SimulationApi`].
///
/// The state lock is taken only around the synchronous `begin_*`/`complete_*`
/// steps, never across a request, so a status poll and a user action can
/// interleave; whichever completes last wins.
pub struct LauncherController {
    api: Arc<dyn SimulationApi>,
    inner: Mutex<LauncherState>,
}

impl LauncherController {
    pub fn new(api: Arc<dyn SimulationApi>, catalog: Catalog) -> Arc<Self> {
        Arc::new(Self {
            api,
            inner: Mutex::new(LauncherState::new(catalog)),
        })
    }

    pub async fn snapshot(&self) -> LauncherState {
        self.inner.lock().await.clone()
    }

    /// Runs a local, synchronous edit against the state.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut LauncherState) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    /// Startup sequence: health probe, catalog discovery, first status fetch.
    pub async fn start(&self) {
        self.check_health().await;
        if let Err(err) = self.refresh_catalog().await {
            debug!(%err, "catalog discovery failed");
        }
        self.refresh_sessions().await;
    }

    pub async fn check_health(&self) -> ApiHealth {
        let health = match self.api.health_check().await {
            Ok(()) => ApiHealth::Healthy,
            Err(err) => {
                warn!(%err, "simulation API health check failed");
                ApiHealth::Offline
            }
        };
        self.inner.lock().await.set_api_health(health);
        info!(%health, "simulation API health");
        health
    }

    pub async fn refresh_catalog(&self) -> Result<(), LauncherError> {
        let result = tokio::try_join!(self.api.list_objects(), self.api.list_environments());
        let mut guard = self.inner.lock().await;
        match result {
            Ok((objects, environments)) => {
                guard.set_available_catalog(objects.objects, environments.environments);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "failed to fetch object/environment catalogs");
                let err = LauncherError::request("Failed to fetch available resources");
                guard.report_error(&err);
                Err(err)
            }
        }
    }

    pub async fn launch_world(&self) -> Result<SessionId, LauncherError> {
        let payload = self.inner.lock().await.begin_launch()?;
        info!(world = %payload.world_name, headless = payload.headless, "launching world");

        let outcome = match self.api.launch_world(&payload).await {
            Ok(response) => match (response.success, response.session_id) {
                (true, Some(session_id)) => Ok(session_id),
                (true, None) => Err(LauncherError::request(
                    "World launch response did not include a session id",
                )),
                (false, _) => Err(failure_payload(response.error, "Failed to launch world")),
            },
            Err(err) => Err(request_error(err, "Failed to launch world")),
        };

        self.inner.lock().await.complete_launch(outcome.clone());
        match &outcome {
            Ok(session_id) => {
                info!(%session_id, "world launched");
                self.refresh_sessions().await;
            }
            Err(err) => warn!(%err, "world launch failed"),
        }
        outcome
    }

    pub async fn spawn_robot(&self) -> Result<String, LauncherError> {
        let request = self.inner.lock().await.begin_spawn()?;
        info!(
            robot = %request.robot_name,
            robot_type = %request.robot_type,
            world_session = %request.world_session_id,
            "spawning robot"
        );

        let outcome = match self.api.spawn_robot(&request).await {
            Ok(response) if response.success => {
                Ok(response.robot_name.unwrap_or_else(|| request.robot_name.clone()))
            }
            Ok(response) => Err(failure_payload(response.error, "Failed to spawn robot")),
            Err(err) => Err(request_error(err, "Failed to spawn robot")),
        };

        self.inner.lock().await.complete_spawn(outcome.clone());
        match &outcome {
            Ok(robot_name) => {
                info!(%robot_name, "robot spawned");
                self.refresh_sessions().await;
            }
            Err(err) => warn!(%err, "robot spawn failed"),
        }
        outcome
    }

    pub async fn validate_config(&self) -> Result<bool, LauncherError> {
        let request = self.inner.lock().await.begin_validate()?;

        let outcome = match self.api.validate_config(&request).await {
            Ok(response) => Ok(response.success && response.valid),
            Err(err) => Err(request_error(err, "Validation failed")),
        };

        self.inner.lock().await.complete_validate(outcome.clone());
        if let Err(err) = &outcome {
            warn!(%err, "config validation failed");
        }
        outcome
    }

    pub async fn stop_session(&self, session_id: &SessionId) -> Result<(), LauncherError> {
        let fallback = format!("Failed to stop session: {session_id}");
        let outcome = match self.api.stop_session(session_id).await {
            Ok(response) if response.success => Ok(()),
            Ok(response) => Err(failure_payload(response.error, &fallback)),
            Err(err) => Err(request_error(err, &fallback)),
        };

        self.inner
            .lock()
            .await
            .complete_stop(session_id, outcome.clone());
        match &outcome {
            Ok(()) => info!(%session_id, "session stopped"),
            Err(err) => warn!(%session_id, %err, "stop session failed"),
        }
        self.refresh_sessions().await;
        outcome
    }

    pub async fn stop_all(&self) -> Result<(), LauncherError> {
        let outcome = match self.api.stop_all().await {
            Ok(response) if response.success => Ok(()),
            Ok(response) => Err(failure_payload(
                response.error,
                "Failed to stop all simulations",
            )),
            Err(err) => Err(request_error(err, "Failed to stop all simulations")),
        };

        self.inner.lock().await.complete_stop_all(outcome.clone());
        match &outcome {
            Ok(()) => info!("all sessions stopped"),
            Err(err) => warn!(%err, "stop all failed"),
        }
        self.refresh_sessions().await;
        outcome
    }

    /// One status poll. Failures come back as [`LauncherError::Poll`] and
    /// leave the notice and health indicator untouched.
    pub async fn poll_sessions(&self) -> Result<(), LauncherError> {
        let response = self
            .api
            .status(None)
            .await
            .map_err(|err| LauncherError::Poll(err.to_string()))?;
        match response.sessions {
            Some(sessions) if response.success => {
                self.inner.lock().await.apply_poll(sessions);
                Ok(())
            }
            _ => Err(LauncherError::Poll(
                response
                    .error
                    .unwrap_or_else(|| "status response reported failure".into()),
            )),
        }
    }

    /// Status of a single session, straight from the service. Does not touch local state.
    pub async fn session_status(
        &self,
        session_id: &SessionId,
    ) -> Result<BTreeMap<SessionId, SessionStatus>, LauncherError> {
        let response = self
            .api
            .status(Some(session_id))
            .await
            .map_err(|err| request_error(err, "Failed to fetch session status"))?;
        if !response.success {
            return Err(failure_payload(
                response.error,
                "Failed to fetch session status",
            ));
        }
        Ok(response.sessions.unwrap_or_default())
    }

    async fn refresh_sessions(&self) {
        if let Err(err) = self.poll_sessions().await {
            debug!(%err, "status refresh failed");
        }
    }
}

fn request_error(err: TransportError, fallback: &str) -> LauncherError {
    match err.service_message() {
        Some(message) => LauncherError::request(message),
        None => {
            debug!(%err, "request failed without a service message");
            LauncherError::request(fallback)
        }
    }
}

fn failure_payload(error: Option<String>, fallback: &str) -> LauncherError {
    LauncherError::request(
        error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    )
}
