//! AxleKit Settings Crate
//!
//! Handles the planner configuration, the shell's key/value setters and
//! settings persistence.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    format_catalog, parse_catalog, Config, MachineCodeSettings, MachineSettings, PlannerSettings,
    SETTING_KEYS,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use persistence::SettingsPersistence;
