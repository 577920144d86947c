//! Profiling utilities based on the `puffin` crate.

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

/// Profiling backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingBackend {
    /// Record scopes in-process only.
    InProcess,
    /// Send profiling data to puffin_viewer via HTTP.
    #[cfg(feature = "profiling")]
    PuffinHttp,
}

#[cfg(feature = "profiling")]
static PROFILING_SERVER: std::sync::OnceLock<puffin_http::Server> = std::sync::OnceLock::new();

/// Initialize profiling with the specified backend.
///
/// # Example
/// ```no_run
/// use easel_core::profiling::{init_profiling, ProfilingBackend};
///
/// init_profiling(ProfilingBackend::PuffinHttp);
/// ```
pub fn init_profiling(backend: ProfilingBackend) {
    puffin::set_scopes_on(true);

    match backend {
        ProfilingBackend::InProcess => {
            tracing::info!("Puffin scopes enabled (in-process)");
        }
        #[cfg(feature = "profiling")]
        ProfilingBackend::PuffinHttp => match puffin_http::Server::new("0.0.0.0:8585") {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://0.0.0.0:8585");
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        },
    }
}

/// Whether profiling scopes are currently being recorded.
#[inline]
pub fn enabled() -> bool {
    puffin::are_scopes_on()
}

/// Mark the start of a new frame for profiling.
///
/// Render threads call this once per frame; it is a no-op while scopes are off.
#[inline]
pub fn new_frame() {
    if enabled() {
        puffin::GlobalProfiler::lock().new_frame();
    }
}
