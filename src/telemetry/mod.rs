pub mod collector;
pub mod link;
pub mod parser;
pub mod producer;

pub use collector::collect_telemetry;
pub use link::TelemetryLink;
pub use parser::parse_line;
pub use producer::{MockTelemetryProducer, SerialTelemetryProducer, TelemetryProducer};

/// A single decoded value from the rig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TelemetryReading {
    /// Motor temperature in degrees Celsius
    MotorTemp(f32),
    /// Battery temperature in degrees Celsius
    BatteryTemp(f32),
    /// Vibration level as reported by the sensor board
    Vibration(f32),
    /// Warning flag raised by the rig
    Warning,
}

/// State of the serial link as seen by the reader thread.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkStatus {
    Connected(String),
    Reconnecting,
    Closed,
}

/// Messages handed from the reader thread to the UI thread.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryOutput {
    Reading(TelemetryReading),
    Link(LinkStatus),
}
