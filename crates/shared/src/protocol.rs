//! JSON bodies exchanged with the simulation service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Pose, Position, RobotConfig, RobotType, SceneEntity, SessionId, SessionStatus, WorldConfig},
    orientation::{Quaternion, Rpy},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosePayload {
    pub position: Position,
    pub orientation_rpy: Rpy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation_quaternion: Option<Quaternion>,
}

impl From<&Pose> for PosePayload {
    fn from(pose: &Pose) -> Self {
        Self {
            position: pose.position,
            orientation_rpy: pose.orientation.rpy(),
            orientation_quaternion: Some(pose.orientation.quaternion()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntityPayload {
    pub id: u64,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    pub pose: PosePayload,
}

impl From<&SceneEntity> for SceneEntityPayload {
    fn from(entity: &SceneEntity) -> Self {
        Self {
            id: entity.id.0,
            entity_type: entity.key.to_string(),
            name: entity.name.clone(),
            pose: PosePayload::from(&entity.pose),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfigPayload {
    pub world_name: String,
    pub headless: bool,
    #[serde(default)]
    pub objects: Vec<SceneEntityPayload>,
    #[serde(default)]
    pub environments: Vec<SceneEntityPayload>,
}

impl From<&WorldConfig> for WorldConfigPayload {
    fn from(config: &WorldConfig) -> Self {
        Self {
            world_name: config.world_name.clone(),
            headless: config.headless,
            objects: config.objects.iter().map(SceneEntityPayload::from).collect(),
            environments: config
                .environments
                .iter()
                .map(SceneEntityPayload::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfigPayload {
    pub robot_name: String,
    pub robot_type: RobotType,
    pub pose: PosePayload,
}

impl From<&RobotConfig> for RobotConfigPayload {
    fn from(config: &RobotConfig) -> Self {
        Self {
            robot_name: config.robot_name.trim().to_string(),
            robot_type: config.robot_type,
            pose: PosePayload::from(&config.pose),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRobotRequest {
    pub world_session_id: SessionId,
    pub robot_name: String,
    pub robot_type: RobotType,
    pub pose: PosePayload,
}

impl SpawnRobotRequest {
    pub fn new(world_session_id: SessionId, config: &RobotConfig) -> Self {
        let robot = RobotConfigPayload::from(config);
        Self {
            world_session_id,
            robot_name: robot.robot_name,
            robot_type: robot.robot_type,
            pose: robot.pose,
        }
    }
}

/// World configuration with the robot merged in, as the validate endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateConfigRequest {
    #[serde(flatten)]
    pub world: WorldConfigPayload,
    pub robot: RobotConfigPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectsResponse {
    #[serde(default)]
    pub objects: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentsResponse {
    #[serde(default)]
    pub environments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchWorldResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnRobotResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robot_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<BTreeMap<SessionId, SessionStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateConfigResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body shape of a non-2xx response, when the service sends one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
