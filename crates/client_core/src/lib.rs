pub mod api;
pub mod controller;
pub mod poller;
pub mod settings;
pub mod state;

pub use api::{HttpSimulationApi, SimulationApi, TransportError};
pub use controller::LauncherController;
pub use poller::SessionPoller;
pub use settings::{load_settings, Settings, SettingsError};
pub use state::{LauncherState, Notice, Phase, Tab};

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod state_tests;

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod api_tests;
