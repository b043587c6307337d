//! Observability: structured logging and routing diagnostics
//!
//! Nothing in this module may affect routing outcomes. Diagnostics and log
//! sinks are advisory collaborators; their failures are logged and swallowed.

pub mod diagnostics;
pub mod logging;

pub use diagnostics::{NoopDiagnostics, RouteDiagnostics, TracingDiagnostics};
pub use logging::{init_default_logging, init_logging, LogFormat};
