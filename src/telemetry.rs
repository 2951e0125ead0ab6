//! Tracing subscriber bootstrap
//!
//! Library code only emits `tracing` events; binaries, tests and benchmarks
//! that want to see them call [`init_tracing`] once at startup.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::{Error, Result};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a global fmt subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns [`Error::TelemetryInit`] if called more than once or if another
/// global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    INITIALISED
        .set(())
        .map_err(|()| Error::TelemetryInit("tracing has already been initialised".to_string()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stdout().is_terminal());

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::TelemetryInit(e.to_string()))
}
