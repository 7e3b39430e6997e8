//! In-memory launcher state and the rules for which actions are legal.
//!
//! Everything here is synchronous. Remote effects are split into a `begin_*`
//! step that checks guards and builds the request, and a `complete_*` step
//! that applies the outcome; the controller runs the network call between
//! them without holding the state lock.

use std::collections::BTreeMap;

use shared::{
    catalog::Catalog,
    domain::{
        ApiHealth, EntityId, EntityKind, PositionAxis, RobotConfig, RobotType, SceneEntity,
        SessionId, SessionStatus, WorldConfig,
    },
    error::LauncherError,
    orientation::{Orientation, OrientationMode, QuaternionComponent, RpyAxis},
    protocol::{RobotConfigPayload, SpawnRobotRequest, ValidateConfigRequest, WorldConfigPayload},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoWorld,
    WorldLaunching,
    WorldActive,
    RobotSpawning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    World,
    Robot,
}

/// The single transient message shown to the operator. A new one replaces the old.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(message) | Notice::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

#[derive(Debug, Clone)]
pub struct LauncherState {
    phase: Phase,
    active_tab: Tab,
    orientation_mode: OrientationMode,
    world: WorldConfig,
    robot: RobotConfig,
    world_session: Option<SessionId>,
    sessions: BTreeMap<SessionId, SessionStatus>,
    available_objects: Vec<String>,
    available_environments: Vec<String>,
    notice: Option<Notice>,
    api_health: ApiHealth,
    catalog: Catalog,
    next_entity_id: u64,
}

impl LauncherState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            phase: Phase::NoWorld,
            active_tab: Tab::World,
            orientation_mode: OrientationMode::Rpy,
            world: WorldConfig::default(),
            robot: RobotConfig::default(),
            world_session: None,
            sessions: BTreeMap::new(),
            available_objects: Vec::new(),
            available_environments: Vec::new(),
            notice: None,
            api_health: ApiHealth::Unknown,
            catalog,
            next_entity_id: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn orientation_mode(&self) -> OrientationMode {
        self.orientation_mode
    }

    pub fn world_config(&self) -> &WorldConfig {
        &self.world
    }

    pub fn robot_config(&self) -> &RobotConfig {
        &self.robot
    }

    pub fn world_session(&self) -> Option<&SessionId> {
        self.world_session.as_ref()
    }

    pub fn sessions(&self) -> &BTreeMap<SessionId, SessionStatus> {
        &self.sessions
    }

    pub fn available_objects(&self) -> &[String] {
        &self.available_objects
    }

    pub fn available_environments(&self) -> &[String] {
        &self.available_environments
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn api_health(&self) -> ApiHealth {
        self.api_health
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn robot_tab_enabled(&self) -> bool {
        self.world_session.is_some()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::WorldLaunching | Phase::RobotSpawning)
    }

    pub fn select_tab(&mut self, tab: Tab) -> Result<(), LauncherError> {
        if tab == Tab::Robot && !self.robot_tab_enabled() {
            return Err(LauncherError::validation(
                "Robot configuration requires a launched world",
            ));
        }
        self.active_tab = tab;
        Ok(())
    }

    pub fn set_orientation_mode(&mut self, mode: OrientationMode) {
        self.orientation_mode = mode;
    }

    pub fn set_world_name(&mut self, name: &str) -> Result<(), LauncherError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LauncherError::validation("World name is required"));
        }
        self.world.world_name = name.to_string();
        Ok(())
    }

    pub fn set_headless(&mut self, headless: bool) {
        self.world.headless = headless;
    }

    /// Stages a catalog entity for the next launch, starting at its default pose.
    pub fn add_entity(&mut self, kind: EntityKind, key: &str) -> Result<EntityId, LauncherError> {
        let entry = self.catalog.resolve(kind, key)?.clone();
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        let name = format!("{}_{}", entry.key, id.0);
        self.world.entities_mut(kind).push(SceneEntity {
            id,
            kind,
            key: entry.key,
            name,
            pose: entry.default_pose,
        });
        Ok(id)
    }

    pub fn remove_entity(
        &mut self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<SceneEntity, LauncherError> {
        let entities = self.world.entities_mut(kind);
        let index = entities
            .iter()
            .position(|entity| entity.id == id)
            .ok_or_else(|| LauncherError::validation(format!("no staged {kind} with id {id}")))?;
        Ok(entities.remove(index))
    }

    pub fn set_robot_name(&mut self, name: &str) {
        self.robot.robot_name = name.to_string();
    }

    pub fn set_robot_type(&mut self, robot_type: RobotType) {
        self.robot.robot_type = robot_type;
    }

    pub fn set_position_axis(&mut self, axis: PositionAxis, meters: f64) -> Result<(), LauncherError> {
        if !meters.is_finite() {
            return Err(LauncherError::validation("position must be a finite number"));
        }
        self.robot.pose.set_axis(axis, meters);
        Ok(())
    }

    pub fn set_rpy_axis(&mut self, axis: RpyAxis, radians: f64) -> Result<(), LauncherError> {
        self.robot.pose.orientation = self.robot.pose.orientation.with_rpy_axis(axis, radians)?;
        Ok(())
    }

    pub fn set_quaternion_component(
        &mut self,
        component: QuaternionComponent,
        value: f64,
    ) -> Result<(), LauncherError> {
        self.robot.pose.orientation = self
            .robot
            .pose
            .orientation
            .with_quaternion_component(component, value)?;
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.robot.pose.orientation = orientation;
    }

    pub fn set_api_health(&mut self, health: ApiHealth) {
        self.api_health = health;
    }

    pub fn set_available_catalog(&mut self, objects: Vec<String>, environments: Vec<String>) {
        self.available_objects = objects;
        self.available_environments = environments;
    }

    /// Records a failed user-facing action. Poll failures are dropped here.
    pub fn report_error(&mut self, err: &LauncherError) {
        if err.is_user_facing() {
            self.notice = Some(Notice::Error(err.to_string()));
        }
    }

    pub fn report_success(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Success(message.into()));
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn begin_launch(&mut self) -> Result<WorldConfigPayload, LauncherError> {
        self.clear_notice();
        let result = match self.phase {
            Phase::NoWorld => Ok(WorldConfigPayload::from(&self.world)),
            Phase::WorldLaunching => Err(LauncherError::validation("World launch already in progress")),
            Phase::WorldActive | Phase::RobotSpawning => {
                Err(LauncherError::validation("A world is already active"))
            }
        };
        match result {
            Ok(payload) => {
                self.phase = Phase::WorldLaunching;
                Ok(payload)
            }
            Err(err) => {
                self.report_error(&err);
                Err(err)
            }
        }
    }

    pub fn complete_launch(&mut self, outcome: Result<SessionId, LauncherError>) {
        match outcome {
            Ok(session_id) => {
                self.report_success(format!(
                    "World launched successfully! Session ID: {session_id}"
                ));
                self.world_session = Some(session_id);
                self.phase = Phase::WorldActive;
            }
            Err(err) => {
                if self.phase == Phase::WorldLaunching {
                    self.phase = Phase::NoWorld;
                }
                self.report_error(&err);
            }
        }
    }

    pub fn begin_spawn(&mut self) -> Result<SpawnRobotRequest, LauncherError> {
        self.clear_notice();
        let result = self.check_spawn();
        match result {
            Ok(request) => {
                self.phase = Phase::RobotSpawning;
                Ok(request)
            }
            Err(err) => {
                self.report_error(&err);
                Err(err)
            }
        }
    }

    fn check_spawn(&self) -> Result<SpawnRobotRequest, LauncherError> {
        let Some(world_session) = self.world_session.clone() else {
            return Err(LauncherError::validation("Please launch a world first"));
        };
        if self.robot.robot_name.trim().is_empty() {
            return Err(LauncherError::validation("Robot name is required"));
        }
        match self.phase {
            Phase::WorldActive => Ok(SpawnRobotRequest::new(world_session, &self.robot)),
            Phase::RobotSpawning => Err(LauncherError::validation("Robot spawn already in progress")),
            Phase::NoWorld | Phase::WorldLaunching => {
                Err(LauncherError::validation("Please launch a world first"))
            }
        }
    }

    /// Applies a spawn outcome. The robot name is cleared only on success so
    /// a failed spawn can be retried as-is.
    pub fn complete_spawn(&mut self, outcome: Result<String, LauncherError>) {
        if self.phase == Phase::RobotSpawning {
            self.phase = Phase::WorldActive;
        }
        match outcome {
            Ok(robot_name) => {
                self.report_success(format!("Robot '{robot_name}' spawned successfully!"));
                self.robot.robot_name.clear();
            }
            Err(err) => self.report_error(&err),
        }
    }

    pub fn begin_validate(&mut self) -> Result<ValidateConfigRequest, LauncherError> {
        self.clear_notice();
        if self.robot.robot_name.trim().is_empty() {
            let err = LauncherError::validation("Robot name is required");
            self.report_error(&err);
            return Err(err);
        }
        Ok(ValidateConfigRequest {
            world: WorldConfigPayload::from(&self.world),
            robot: RobotConfigPayload::from(&self.robot),
        })
    }

    pub fn complete_validate(&mut self, outcome: Result<bool, LauncherError>) {
        match outcome {
            Ok(true) => self.report_success("Configuration is valid!"),
            Ok(false) => self.report_error(&LauncherError::request("Configuration is invalid")),
            Err(err) => self.report_error(&err),
        }
    }

    pub fn complete_stop(&mut self, session_id: &SessionId, outcome: Result<(), LauncherError>) {
        match outcome {
            Ok(()) => {
                self.report_success(format!("Stopped session: {session_id}"));
                if self.world_session.as_ref() == Some(session_id) {
                    self.reset_world();
                }
            }
            Err(err) => self.report_error(&err),
        }
    }

    pub fn complete_stop_all(&mut self, outcome: Result<(), LauncherError>) {
        match outcome {
            Ok(()) => {
                self.report_success("All simulations stopped");
                self.reset_world();
            }
            Err(err) => self.report_error(&err),
        }
    }

    /// Replaces the known sessions with the server's view, verbatim.
    pub fn apply_poll(&mut self, sessions: BTreeMap<SessionId, SessionStatus>) {
        self.sessions = sessions;
    }

    fn reset_world(&mut self) {
        self.world_session = None;
        self.phase = Phase::NoWorld;
        self.active_tab = Tab::World;
    }
}

impl Default for LauncherState {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}
