// Library interface for the dashboard
// This allows integration tests and benches to access the core modules

pub mod errors;
pub mod session;
pub mod telemetry;

// Re-export commonly used types
pub use errors::DashboardError;
pub use session::{SessionSettings, SessionState};
pub use telemetry::{
    MockTelemetryProducer, SerialTelemetryProducer, TelemetryLink, TelemetryOutput,
    TelemetryProducer, TelemetryReading,
};
