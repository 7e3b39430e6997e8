use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use shared::{
    domain::{EntityId, EntityKind, Position, SessionId, SessionStatus},
    error::LauncherError,
    orientation::{QuaternionComponent, RpyAxis, UNIT_NORM_EPSILON},
};

use crate::state::{LauncherState, Notice, Phase, Tab};

fn launched_state(session: &str) -> LauncherState {
    let mut state = LauncherState::default();
    state.begin_launch().expect("begin launch");
    state.complete_launch(Ok(SessionId::new(session)));
    state
}

#[test]
fn starts_without_world_on_world_tab() {
    let state = LauncherState::default();
    assert_eq!(state.phase(), Phase::NoWorld);
    assert_eq!(state.active_tab(), Tab::World);
    assert!(!state.robot_tab_enabled());
    assert_eq!(state.world_config().world_name, "empty");
    assert!(!state.world_config().headless);
}

#[test]
fn robot_tab_requires_world_session() {
    let mut state = LauncherState::default();
    let err = state.select_tab(Tab::Robot).expect_err("no world");
    assert!(matches!(err, LauncherError::Validation(_)));
    assert_eq!(state.active_tab(), Tab::World);

    let mut state = launched_state("w1");
    state.select_tab(Tab::Robot).expect("robot tab");
    assert_eq!(state.active_tab(), Tab::Robot);
}

#[test]
fn launch_empty_world_records_session_and_enables_robot_tab() {
    let mut state = LauncherState::default();
    let payload = state.begin_launch().expect("begin");
    assert_eq!(payload.world_name, "empty");
    assert!(!payload.headless);
    assert!(payload.objects.is_empty());
    assert!(payload.environments.is_empty());
    assert_eq!(state.phase(), Phase::WorldLaunching);

    state.complete_launch(Ok(SessionId::new("sess-42")));
    assert_eq!(state.phase(), Phase::WorldActive);
    assert_eq!(state.world_session(), Some(&SessionId::new("sess-42")));
    assert!(state.robot_tab_enabled());
    assert!(matches!(state.notice(), Some(Notice::Success(msg)) if msg.contains("sess-42")));
}

#[test]
fn launch_is_only_legal_without_a_world() {
    let mut state = launched_state("w1");
    let err = state.begin_launch().expect_err("already active");
    assert!(matches!(err, LauncherError::Validation(_)));
    assert_eq!(state.phase(), Phase::WorldActive);
}

#[test]
fn failed_launch_returns_to_no_world() {
    let mut state = LauncherState::default();
    state.begin_launch().expect("begin");
    state.complete_launch(Err(LauncherError::request("Failed to launch world")));
    assert_eq!(state.phase(), Phase::NoWorld);
    assert!(state.world_session().is_none());
    assert_eq!(
        state.notice(),
        Some(&Notice::Error("Failed to launch world".into()))
    );
    state.begin_launch().expect("retry allowed");
}

#[test]
fn spawn_rejected_without_world_session() {
    let mut state = LauncherState::default();
    state.set_robot_name("robot1");
    let err = state.begin_spawn().expect_err("no world");
    assert_eq!(err, LauncherError::validation("Please launch a world first"));
    assert_eq!(state.phase(), Phase::NoWorld);
    assert!(state.notice().is_some_and(Notice::is_error));
}

#[test]
fn spawn_rejected_with_blank_name() {
    let mut state = launched_state("w1");
    for name in ["", "   ", "\t\n"] {
        state.set_robot_name(name);
        let err = state.begin_spawn().expect_err("blank name");
        assert_eq!(err, LauncherError::validation("Robot name is required"));
        assert_eq!(state.phase(), Phase::WorldActive);
    }
}

#[test]
fn successful_spawn_clears_only_the_name() {
    let mut state = launched_state("w1");
    state.set_robot_name("  robot1 ");
    state.set_robot_type(shared::domain::RobotType::Minibot);
    state.set_position_axis(shared::domain::PositionAxis::X, 2.5).expect("x");
    state.set_rpy_axis(RpyAxis::Yaw, FRAC_PI_2).expect("yaw");

    let request = state.begin_spawn().expect("begin");
    assert_eq!(request.robot_name, "robot1");
    assert_eq!(request.world_session_id, SessionId::new("w1"));
    let q = request.pose.orientation_quaternion.expect("quaternion");
    assert!((q.z - 0.7071).abs() < 1e-4 && (q.w - 0.7071).abs() < 1e-4);
    assert_eq!(state.phase(), Phase::RobotSpawning);

    let second = state.begin_spawn().expect_err("in flight");
    assert!(matches!(second, LauncherError::Validation(_)));

    state.complete_spawn(Ok("robot1".into()));
    assert_eq!(state.phase(), Phase::WorldActive);
    assert!(state.robot_config().robot_name.is_empty());
    assert_eq!(state.robot_config().robot_type, shared::domain::RobotType::Minibot);
    assert_eq!(state.robot_config().pose.position.x, 2.5);
    assert_eq!(state.robot_config().pose.orientation.rpy().yaw, FRAC_PI_2);
}

#[test]
fn failed_spawn_keeps_name_for_retry() {
    let mut state = launched_state("w1");
    state.set_robot_name("robot1");
    state.begin_spawn().expect("begin");
    state.complete_spawn(Err(LauncherError::request("name taken")));
    assert_eq!(state.phase(), Phase::WorldActive);
    assert_eq!(state.robot_config().robot_name, "robot1");
    assert_eq!(state.notice(), Some(&Notice::Error("name taken".into())));
}

#[test]
fn stopping_world_session_resets_to_world_tab() {
    let mut state = launched_state("w1");
    state.select_tab(Tab::Robot).expect("robot tab");

    state.complete_stop(&SessionId::new("other"), Ok(()));
    assert_eq!(state.world_session(), Some(&SessionId::new("w1")));
    assert_eq!(state.active_tab(), Tab::Robot);

    state.complete_stop(&SessionId::new("w1"), Ok(()));
    assert!(state.world_session().is_none());
    assert_eq!(state.phase(), Phase::NoWorld);
    assert_eq!(state.active_tab(), Tab::World);
    assert!(state.select_tab(Tab::Robot).is_err());
}

#[test]
fn failed_stop_keeps_world() {
    let mut state = launched_state("w1");
    state.complete_stop(
        &SessionId::new("w1"),
        Err(LauncherError::request("Failed to stop session: w1")),
    );
    assert_eq!(state.world_session(), Some(&SessionId::new("w1")));
    assert_eq!(state.phase(), Phase::WorldActive);
}

#[test]
fn stop_all_clears_world_session() {
    let mut state = launched_state("w1");
    state.apply_poll(
        [("w1", 1.0), ("w2", 2.0), ("w3", 3.0)]
            .into_iter()
            .map(|(id, uptime)| {
                (
                    SessionId::new(id),
                    SessionStatus {
                        uptime,
                        ..SessionStatus::default()
                    },
                )
            })
            .collect(),
    );
    state.select_tab(Tab::Robot).expect("robot tab");

    state.complete_stop_all(Ok(()));
    assert!(state.world_session().is_none());
    assert_eq!(state.active_tab(), Tab::World);
    assert_eq!(state.phase(), Phase::NoWorld);
}

#[test]
fn stop_during_spawn_lets_spawn_finish_without_reviving_world() {
    let mut state = launched_state("w1");
    state.set_robot_name("robot1");
    state.begin_spawn().expect("begin");
    state.complete_stop_all(Ok(()));
    state.complete_spawn(Ok("robot1".into()));
    assert_eq!(state.phase(), Phase::NoWorld);
    assert!(state.world_session().is_none());
}

#[test]
fn poll_replaces_sessions_and_leaves_notice_alone() {
    let mut state = launched_state("w1");
    state.report_error(&LauncherError::request("earlier failure"));

    let mut first = BTreeMap::new();
    first.insert(SessionId::new("a"), SessionStatus::default());
    first.insert(SessionId::new("b"), SessionStatus::default());
    state.apply_poll(first);

    let mut second = BTreeMap::new();
    second.insert(
        SessionId::new("c"),
        SessionStatus {
            bridge_running: true,
            spawn_running: false,
            uptime: 4.0,
        },
    );
    state.apply_poll(second.clone());

    assert_eq!(state.sessions(), &second);
    assert_eq!(state.notice(), Some(&Notice::Error("earlier failure".into())));

    state.report_error(&LauncherError::Poll("connection refused".into()));
    assert_eq!(state.notice(), Some(&Notice::Error("earlier failure".into())));
}

#[test]
fn add_then_remove_box_mini_leaves_no_residue() {
    let mut state = LauncherState::default();
    let first = state.add_entity(EntityKind::Object, "box_mini").expect("add");
    let entity = &state.world_config().objects[0];
    assert_eq!(entity.pose.position, Position::new(1.3, 18.7, 2.82));
    assert_eq!(entity.name, format!("box_mini_{}", first.0));

    let removed = state.remove_entity(EntityKind::Object, first).expect("remove");
    assert_eq!(removed.id, first);
    assert!(state.world_config().objects.is_empty());

    let second = state.add_entity(EntityKind::Object, "box_mini").expect("add again");
    assert_ne!(first, second);
    assert_eq!(state.world_config().objects.len(), 1);
}

#[test]
fn unknown_catalog_keys_are_rejected_at_insertion() {
    let mut state = LauncherState::default();
    let err = state
        .add_entity(EntityKind::Object, "flying_saucer")
        .expect_err("unknown");
    assert!(matches!(err, LauncherError::Validation(_)));
    assert!(state.world_config().objects.is_empty());

    let err = state
        .remove_entity(EntityKind::Environment, EntityId(99))
        .expect_err("missing id");
    assert!(matches!(err, LauncherError::Validation(_)));
}

#[test]
fn entities_added_after_launch_only_affect_next_launch() {
    let mut state = launched_state("w1");
    state
        .add_entity(EntityKind::Environment, "warehouse_shelf")
        .expect("add");
    assert_eq!(state.world_config().environments.len(), 1);

    state.complete_stop_all(Ok(()));
    let payload = state.begin_launch().expect("relaunch");
    assert_eq!(payload.environments.len(), 1);
    assert_eq!(payload.environments[0].entity_type, "warehouse_shelf");
}

#[test]
fn validate_requires_robot_name() {
    let mut state = LauncherState::default();
    state.set_robot_name(" ");
    assert!(state.begin_validate().is_err());

    state.set_robot_name("robot1");
    let request = state.begin_validate().expect("validate without world");
    assert_eq!(request.robot.robot_name, "robot1");

    state.complete_validate(Ok(false));
    assert_eq!(
        state.notice(),
        Some(&Notice::Error("Configuration is invalid".into()))
    );
    state.complete_validate(Ok(true));
    assert_eq!(
        state.notice(),
        Some(&Notice::Success("Configuration is valid!".into()))
    );
}

#[test]
fn quaternion_edits_keep_robot_orientation_normalized() {
    let mut state = LauncherState::default();
    state
        .set_quaternion_component(QuaternionComponent::Z, 1.0)
        .expect("edit z");
    let q = state.robot_config().pose.orientation.quaternion();
    assert!(q.is_unit(UNIT_NORM_EPSILON));
    assert!((state.robot_config().pose.orientation.rpy().yaw - FRAC_PI_2).abs() < 1e-9);

    let err = state
        .set_quaternion_component(QuaternionComponent::W, f64::INFINITY)
        .expect_err("non-finite");
    assert!(matches!(err, LauncherError::Validation(_)));
    assert!(state.robot_config().pose.orientation.quaternion().is_unit(UNIT_NORM_EPSILON));
}

#[test]
fn world_name_must_not_be_blank() {
    let mut state = LauncherState::default();
    assert!(state.set_world_name("  ").is_err());
    assert_eq!(state.world_config().world_name, "empty");
    state.set_world_name(" warehouse ").expect("name");
    assert_eq!(state.world_config().world_name, "warehouse");
}
