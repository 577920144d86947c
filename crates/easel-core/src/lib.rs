//! Easel Core
//!
//! Shared plumbing for the Easel crates: logging setup, profiling hooks,
//! hash collections and configuration.

pub mod alloc;
pub mod config;
pub mod logging;
pub mod profiling;

pub use config::{CanvasDefaults, Config, ProfilingMode};

/// Install logging and profiling as described by `config`.
pub fn init(config: &Config) {
    logging::init_with_filter(&config.log_filter);

    match config.profiling {
        ProfilingMode::Off => {}
        ProfilingMode::On => profiling::init_profiling(profiling::ProfilingBackend::InProcess),
        #[cfg(feature = "profiling")]
        ProfilingMode::WithWebserver => {
            profiling::init_profiling(profiling::ProfilingBackend::PuffinHttp)
        }
        #[cfg(not(feature = "profiling"))]
        ProfilingMode::WithWebserver => {
            tracing::warn!("Built without the `profiling` feature, recording in-process only");
            profiling::init_profiling(profiling::ProfilingBackend::InProcess)
        }
    }
}
