use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{catalog::CatalogKey, orientation::Orientation};

/// Opaque session handle issued by the simulation service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotType {
    #[default]
    Symbot,
    Minibot,
}

impl RobotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotType::Symbot => "symbot",
            RobotType::Minibot => "minibot",
        }
    }
}

impl fmt::Display for RobotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RobotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symbot" => Ok(RobotType::Symbot),
            "minibot" => Ok(RobotType::Minibot),
            other => Err(format!("unknown robot type '{other}' (expected symbot or minibot)")),
        }
    }
}

/// Whether a staged entity is a scene object or an environment fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Object,
    Environment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Object => f.write_str("object"),
            EntityKind::Environment => f.write_str("environment"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "object" | "obj" => Ok(EntityKind::Object),
            "environment" | "env" => Ok(EntityKind::Environment),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

/// Position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionAxis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Position,
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(position: Position, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new(Position::new(x, y, z), Orientation::identity())
    }

    pub fn set_axis(&mut self, axis: PositionAxis, meters: f64) {
        match axis {
            PositionAxis::X => self.position.x = meters,
            PositionAxis::Y => self.position.y = meters,
            PositionAxis::Z => self.position.z = meters,
        }
    }
}

/// An object or environment instance staged for the next world launch.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub key: CatalogKey,
    pub name: String,
    pub pose: Pose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub world_name: String,
    pub headless: bool,
    pub objects: Vec<SceneEntity>,
    pub environments: Vec<SceneEntity>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_name: "empty".into(),
            headless: false,
            objects: Vec::new(),
            environments: Vec::new(),
        }
    }
}

impl WorldConfig {
    pub fn entities(&self, kind: EntityKind) -> &[SceneEntity] {
        match kind {
            EntityKind::Object => &self.objects,
            EntityKind::Environment => &self.environments,
        }
    }

    pub fn entities_mut(&mut self, kind: EntityKind) -> &mut Vec<SceneEntity> {
        match kind {
            EntityKind::Object => &mut self.objects,
            EntityKind::Environment => &mut self.environments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotConfig {
    pub robot_name: String,
    pub robot_type: RobotType,
    pub pose: Pose,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            robot_name: String::new(),
            robot_type: RobotType::Symbot,
            pose: Pose::at(0.0, 0.0, 0.12),
        }
    }
}

/// Per-session status as reported by the service's status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    #[serde(default)]
    pub bridge_running: bool,
    #[serde(default)]
    pub spawn_running: bool,
    #[serde(default)]
    pub uptime: f64,
}

/// Result of the single startup health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiHealth {
    #[default]
    Unknown,
    Healthy,
    Offline,
}

impl fmt::Display for ApiHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiHealth::Unknown => f.write_str("unknown"),
            ApiHealth::Healthy => f.write_str("healthy"),
            ApiHealth::Offline => f.write_str("offline"),
        }
    }
}
