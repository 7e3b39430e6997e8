//! Plain-text views of launcher state for the terminal.

use std::{collections::BTreeMap, fmt::Write as _};

use client_core::{LauncherState, Notice, Tab};
use shared::{
    domain::{EntityKind, Pose, SceneEntity, SessionId, SessionStatus},
    orientation::{format_degrees, format_radians, Orientation, OrientationMode},
};

pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(message) => format!("ok: {message}"),
        Notice::Error(message) => format!("error: {message}"),
    }
}

pub fn sessions(
    sessions: &BTreeMap<SessionId, SessionStatus>,
    world_session: Option<&SessionId>,
) -> String {
    if sessions.is_empty() {
        return "no active sessions\n".to_string();
    }
    let mut out = String::new();
    for (id, status) in sessions {
        let marker = if Some(id) == world_session { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {id}  bridge={}  spawn={}  uptime={:.1}s",
            running(status.bridge_running),
            running(status.spawn_running),
            status.uptime
        );
    }
    out
}

fn running(flag: bool) -> &'static str {
    if flag {
        "running"
    } else {
        "stopped"
    }
}

pub fn catalog(state: &LauncherState) -> String {
    let mut out = String::new();
    for (kind, offered) in [
        (EntityKind::Object, state.available_objects()),
        (EntityKind::Environment, state.available_environments()),
    ] {
        let _ = writeln!(out, "{kind} types:");
        for entry in state.catalog().entries(kind) {
            let flag = if offered.iter().any(|name| name == entry.key.as_str()) {
                "offered"
            } else {
                "local"
            };
            let _ = writeln!(
                out,
                "  {:<20} default {}  [{flag}]",
                entry.key.as_str(),
                entry.default_pose.position
            );
        }
        for name in offered {
            if !state.catalog().contains(kind, name) {
                let _ = writeln!(out, "  {name:<20} (no default pose; cannot be staged)");
            }
        }
    }
    out
}

pub fn orientation(orientation: &Orientation) -> String {
    let rpy = orientation.rpy();
    let q = orientation.quaternion();
    format!(
        "rpy  roll={} ({}°) pitch={} ({}°) yaw={} ({}°)\nquat x={:.4} y={:.4} z={:.4} w={:.4}\n",
        format_radians(rpy.roll),
        format_degrees(rpy.roll),
        format_radians(rpy.pitch),
        format_degrees(rpy.pitch),
        format_radians(rpy.yaw),
        format_degrees(rpy.yaw),
        q.x,
        q.y,
        q.z,
        q.w
    )
}

fn pose_line(pose: &Pose, mode: OrientationMode) -> String {
    let orientation = match mode {
        OrientationMode::Rpy => {
            let rpy = pose.orientation.rpy();
            format!(
                "rpy=({}, {}, {})",
                format_radians(rpy.roll),
                format_radians(rpy.pitch),
                format_radians(rpy.yaw)
            )
        }
        OrientationMode::Quaternion => {
            let q = pose.orientation.quaternion();
            format!("quat=({:.4}, {:.4}, {:.4}, {:.4})", q.x, q.y, q.z, q.w)
        }
    };
    format!("pos={} {orientation}", pose.position)
}

fn entity_lines(out: &mut String, label: &str, entities: &[SceneEntity], mode: OrientationMode) {
    if entities.is_empty() {
        let _ = writeln!(out, "  {label}: none");
        return;
    }
    let _ = writeln!(out, "  {label}:");
    for entity in entities {
        let _ = writeln!(
            out,
            "    #{} {} ({}) {}",
            entity.id,
            entity.name,
            entity.key,
            pose_line(&entity.pose, mode)
        );
    }
}

pub fn state(state: &LauncherState) -> String {
    let mut out = String::new();
    let tab = match state.active_tab() {
        Tab::World => "world",
        Tab::Robot => "robot",
    };
    let _ = writeln!(
        out,
        "API: {}  phase: {:?}{}  tab: {tab}  world session: {}",
        state.api_health(),
        state.phase(),
        if state.is_busy() { " (request in flight)" } else { "" },
        state
            .world_session()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".into())
    );

    let world = state.world_config();
    let mode = state.orientation_mode();
    let _ = writeln!(
        out,
        "world: name={} headless={}",
        world.world_name, world.headless
    );
    entity_lines(&mut out, "objects", world.entities(EntityKind::Object), mode);
    entity_lines(
        &mut out,
        "environments",
        world.entities(EntityKind::Environment),
        mode,
    );

    if state.robot_tab_enabled() {
        let robot = state.robot_config();
        let name = if robot.robot_name.is_empty() {
            "<unset>"
        } else {
            robot.robot_name.as_str()
        };
        let _ = writeln!(
            out,
            "robot: name={name} type={} {}",
            robot.robot_type,
            pose_line(&robot.pose, mode)
        );
        let rpy = robot.pose.orientation.rpy();
        let _ = writeln!(
            out,
            "       degrees roll={}° pitch={}° yaw={}°",
            format_degrees(rpy.roll),
            format_degrees(rpy.pitch),
            format_degrees(rpy.yaw)
        );
    } else {
        let _ = writeln!(out, "robot: launch a world to configure robots");
    }

    out.push_str(&sessions(state.sessions(), state.world_session()));
    if let Some(current) = state.notice() {
        let _ = writeln!(out, "{}", notice(current));
    }
    out
}
