//! Line-oriented interactive launcher.
//!
//! Each input line is parsed with clap, applied to the shared controller and
//! answered with the resulting notice. A [`SessionPoller`] refreshes the
//! session list in the background for as long as the shell is open.

use std::{io::Write as _, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{LauncherController, LauncherState, SessionPoller, Tab};
use shared::{
    domain::{EntityId, EntityKind, PositionAxis, RobotType, SessionId},
    error::LauncherError,
    orientation::{
        degrees_to_radians, Orientation, OrientationMode, QuaternionComponent, Rpy, RpyAxis,
    },
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    signal,
};
use tracing::info;

use crate::render;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Show the full launcher state.
    #[command(visible_alias = "status")]
    Show,
    /// Switch between the world and robot views.
    Tab { tab: TabArg },
    /// Edit the world configuration.
    World {
        #[command(subcommand)]
        edit: WorldEdit,
    },
    /// Stage a catalog object or environment for the next launch.
    Add { kind: EntityKind, key: String },
    /// Remove a staged object or environment by id.
    Remove { kind: EntityKind, id: u64 },
    /// Show catalog entries and what the service offers.
    Catalog,
    /// Launch the configured world.
    Launch,
    /// Edit the robot configuration.
    Robot {
        #[command(subcommand)]
        edit: RobotEdit,
    },
    /// Pick which orientation representation is displayed.
    Mode { mode: ModeArg },
    /// Spawn the configured robot into the active world.
    Spawn,
    /// Ask the service to validate the world and robot configuration.
    Validate,
    /// Stop one session.
    Stop { session_id: String },
    /// Stop every session.
    StopAll,
    /// List sessions as of the last poll.
    Sessions,
    /// Poll session status now.
    Refresh,
    /// Leave the shell.
    #[command(visible_alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug)]
enum WorldEdit {
    Name { name: Vec<String> },
    Headless { value: Toggle },
}

#[derive(Subcommand, Debug)]
enum RobotEdit {
    Name { name: Vec<String> },
    Type { robot_type: RobotType },
    Pos {
        axis: AxisArg,
        #[arg(allow_hyphen_values = true)]
        meters: f64,
    },
    Rpy {
        axis: RpyArg,
        #[arg(allow_hyphen_values = true)]
        value: f64,
        /// Value is in degrees rather than radians.
        #[arg(long)]
        degrees: bool,
    },
    Quat {
        component: QuatArg,
        #[arg(allow_hyphen_values = true)]
        value: f64,
    },
    /// Set roll, pitch and yaw at once.
    Orient {
        #[arg(allow_hyphen_values = true)]
        roll: f64,
        #[arg(allow_hyphen_values = true)]
        pitch: f64,
        #[arg(allow_hyphen_values = true)]
        yaw: f64,
        #[arg(long)]
        degrees: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TabArg {
    World,
    Robot,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Rpy,
    Quaternion,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AxisArg {
    X,
    Y,
    Z,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RpyArg {
    Roll,
    Pitch,
    Yaw,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QuatArg {
    X,
    Y,
    Z,
    W,
}

impl From<TabArg> for Tab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::World => Tab::World,
            TabArg::Robot => Tab::Robot,
        }
    }
}

impl From<ModeArg> for OrientationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Rpy => OrientationMode::Rpy,
            ModeArg::Quaternion => OrientationMode::Quaternion,
        }
    }
}

impl From<AxisArg> for PositionAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::X => PositionAxis::X,
            AxisArg::Y => PositionAxis::Y,
            AxisArg::Z => PositionAxis::Z,
        }
    }
}

impl From<RpyArg> for RpyAxis {
    fn from(axis: RpyArg) -> Self {
        match axis {
            RpyArg::Roll => RpyAxis::Roll,
            RpyArg::Pitch => RpyAxis::Pitch,
            RpyArg::Yaw => RpyAxis::Yaw,
        }
    }
}

impl From<QuatArg> for QuaternionComponent {
    fn from(component: QuatArg) -> Self {
        match component {
            QuatArg::X => QuaternionComponent::X,
            QuatArg::Y => QuaternionComponent::Y,
            QuatArg::Z => QuaternionComponent::Z,
            QuatArg::W => QuaternionComponent::W,
        }
    }
}

/// What the loop prints after a command ran.
enum Reply {
    /// Print the notice the action left behind.
    Notice,
    Text(String),
    Quit,
}

pub async fn run(controller: Arc<LauncherController>, poll_interval: Duration) -> Result<()> {
    controller.start().await;
    let poller = SessionPoller::spawn(controller.clone(), poll_interval);
    info!(interval = ?poll_interval, "session polling started");
    print!("{}", render::state(&controller.snapshot().await));
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read input")?,
            _ = signal::ctrl_c() => {
                println!();
                break;
            }
        };
        let Some(line) = line else { break };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                print!("{err}");
                continue;
            }
        };

        match execute(&controller, command).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) => print!("{text}"),
            Ok(Reply::Notice) => {
                if let Some(notice) = controller.snapshot().await.notice() {
                    println!("{}", render::notice(notice));
                }
            }
            Err(err) => println!("error: {err}"),
        }
    }

    poller.stop();
    info!("shell closed");
    Ok(())
}

fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(tokens).map(|parsed| Some(parsed.command))
}

async fn execute(
    controller: &LauncherController,
    command: ShellCommand,
) -> Result<Reply, LauncherError> {
    let reply = match command {
        ShellCommand::Show => Reply::Text(render::state(&controller.snapshot().await)),
        ShellCommand::Tab { tab } => {
            controller.edit(|s| s.select_tab(tab.into())).await?;
            Reply::Text(render::state(&controller.snapshot().await))
        }
        ShellCommand::World { edit } => {
            match edit {
                WorldEdit::Name { name } => {
                    controller
                        .edit(|s| s.set_world_name(&name.join(" ")))
                        .await?
                }
                WorldEdit::Headless { value } => {
                    controller
                        .edit(|s| s.set_headless(matches!(value, Toggle::On)))
                        .await
                }
            }
            Reply::Text("world updated\n".into())
        }
        ShellCommand::Add { kind, key } => {
            let id = controller.edit(|s| s.add_entity(kind, &key)).await?;
            Reply::Text(format!("staged {kind} {key} as #{id}\n"))
        }
        ShellCommand::Remove { kind, id } => {
            let removed = controller
                .edit(|s| s.remove_entity(kind, EntityId(id)))
                .await?;
            Reply::Text(format!("removed {}\n", removed.name))
        }
        ShellCommand::Catalog => {
            if let Err(err) = controller.refresh_catalog().await {
                println!("error: {err}");
            }
            Reply::Text(render::catalog(&controller.snapshot().await))
        }
        ShellCommand::Launch => {
            let _ = controller.launch_world().await;
            Reply::Notice
        }
        ShellCommand::Robot { edit } => {
            controller
                .edit(|s| {
                    s.select_tab(Tab::Robot)?;
                    apply_robot_edit(s, edit)
                })
                .await?;
            let snapshot = controller.snapshot().await;
            Reply::Text(render::orientation(
                &snapshot.robot_config().pose.orientation,
            ))
        }
        ShellCommand::Mode { mode } => {
            controller
                .edit(|s| s.set_orientation_mode(mode.into()))
                .await;
            Reply::Text(render::state(&controller.snapshot().await))
        }
        ShellCommand::Spawn => {
            let _ = controller.spawn_robot().await;
            Reply::Notice
        }
        ShellCommand::Validate => {
            let _ = controller.validate_config().await;
            Reply::Notice
        }
        ShellCommand::Stop { session_id } => {
            let _ = controller.stop_session(&SessionId::new(session_id)).await;
            Reply::Notice
        }
        ShellCommand::StopAll => {
            let _ = controller.stop_all().await;
            Reply::Notice
        }
        ShellCommand::Sessions => {
            let snapshot = controller.snapshot().await;
            Reply::Text(render::sessions(
                snapshot.sessions(),
                snapshot.world_session(),
            ))
        }
        ShellCommand::Refresh => {
            controller.poll_sessions().await?;
            let snapshot = controller.snapshot().await;
            Reply::Text(render::sessions(
                snapshot.sessions(),
                snapshot.world_session(),
            ))
        }
        ShellCommand::Quit => Reply::Quit,
    };
    Ok(reply)
}

fn apply_robot_edit(
    state: &mut LauncherState,
    edit: RobotEdit,
) -> Result<(), LauncherError> {
    match edit {
        RobotEdit::Name { name } => state.set_robot_name(&name.join(" ")),
        RobotEdit::Type { robot_type } => state.set_robot_type(robot_type),
        RobotEdit::Pos { axis, meters } => state.set_position_axis(axis.into(), meters)?,
        RobotEdit::Rpy {
            axis,
            value,
            degrees,
        } => {
            let radians = if degrees {
                degrees_to_radians(value)
            } else {
                value
            };
            state.set_rpy_axis(axis.into(), radians)?
        }
        RobotEdit::Quat { component, value } => {
            state.set_quaternion_component(component.into(), value)?
        }
        RobotEdit::Orient {
            roll,
            pitch,
            yaw,
            degrees,
        } => {
            let rpy = if degrees {
                Rpy::new(
                    degrees_to_radians(roll),
                    degrees_to_radians(pitch),
                    degrees_to_radians(yaw),
                )
            } else {
                Rpy::new(roll, pitch, yaw)
            };
            state.set_orientation(Orientation::from_rpy(rpy)?)
        }
    }
    Ok(())
}
