//! # AxleKit
//!
//! Cutting-plan optimizer for producing fixed-length axles from stock bars
//! with as little waste as possible.
//!
//! ## Architecture
//!
//! AxleKit is organized as a workspace with multiple crates:
//!
//! 1. **axlekit-core** - Catalog, machine parameters, demand, error taxonomy
//! 2. **axlekit-optimizer** - Pattern enumeration, bulk allocation, sequence search, planner
//! 3. **axlekit-settings** - Configuration model and persistence
//! 4. **axlekit-camtools** - Lathe program generation
//! 5. **axlekit-visualizer** - Console rendering of plans
//! 6. **axlekit** - Interactive shell that integrates all crates

pub mod shell;

pub use axlekit_core::{
    AxleType, Catalog, Demand, EngineError, Error, InputError, MachineParameters, Result,
};
pub use axlekit_optimizer::{Planner, PlanningReport, SearchConfig};
pub use axlekit_settings::{Config, SettingsPersistence};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Log lines go to stderr so they do not interleave with the shell output
/// on stdout. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
