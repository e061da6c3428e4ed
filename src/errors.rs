// Error types for the dashboard

use crate::telemetry::TelemetryOutput;
use snafu::Snafu;
use std::{io, num::ParseFloatError, sync::mpsc::SendError};

#[derive(Debug, Snafu)]
pub enum DashboardError {
    // Errors for the serial link
    #[snafu(display("Unable to open serial port {port}"))]
    SerialOpenError {
        port: String,
        source: serialport::Error,
    },
    #[snafu(display("Error reading from serial port"))]
    SerialReadError { source: io::Error },
    #[snafu(display("Serial port not connected"))]
    MissingSerialConnection,

    // Errors while parsing and broadcasting telemetry
    #[snafu(display("Invalid telemetry reading: {line}"))]
    InvalidReading {
        line: String,
        source: ParseFloatError,
    },
    #[snafu(display("Error broadcasting telemetry reading"))]
    TelemetryBroadcastError {
        source: Box<SendError<TelemetryOutput>>,
    },
    #[snafu(display("Telemetry reader thread panicked"))]
    ReaderThreadPanic,

    // User input validation errors
    #[snafu(display("Invalid energy value '{input}': {reason}"))]
    InvalidEnergyInput { input: String, reason: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Replay errors
    #[snafu(display("Invalid capture file: {path}"))]
    InvalidCaptureFile { path: String },
    #[snafu(display("Error loading capture file"))]
    CaptureLoaderError { source: io::Error },
}

impl From<SendError<TelemetryOutput>> for DashboardError {
    fn from(value: SendError<TelemetryOutput>) -> Self {
        DashboardError::TelemetryBroadcastError {
            source: Box::new(value),
        }
    }
}
