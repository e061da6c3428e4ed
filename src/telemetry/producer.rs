use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    thread,
    time::Duration,
};

use log::{debug, info, warn};
use serialport::SerialPort;

use crate::DashboardError;

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];
pub(crate) const SERIAL_READ_TIMEOUT_MS: u64 = 1000;

/// A source of telemetry lines.
///
/// This trait abstracts where the text comes from so the collector loop can be
/// driven by the rig's serial port in a live session, or by a canned list of
/// lines for replays and tests.
pub trait TelemetryProducer {
    /// Opens the underlying source. Called once before the reader thread is
    /// spawned and again every time the collector retries after a read error.
    fn start(&mut self) -> Result<(), DashboardError>;

    /// Returns the next trimmed, non-empty line or `None` when nothing is
    /// available yet.
    fn next_line(&mut self) -> Result<Option<String>, DashboardError>;

    /// Human readable name of the source, shown in the UI once connected.
    fn description(&self) -> String;
}

type LineReader = Box<dyn BufRead + Send>;

/// Reads newline terminated telemetry from the rig's serial port.
pub struct SerialTelemetryProducer {
    port_name: String,
    baud_rate: u32,
    reader: Option<LineReader>,
    pending: Vec<u8>,
}

impl SerialTelemetryProducer {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            reader: None,
            pending: Vec::new(),
        }
    }

    #[cfg(test)]
    fn with_reader(port_name: &str, reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            ..Self::new(port_name, DEFAULT_BAUD_RATE)
        }
    }
}

/// Reads from `reader` up to the next newline.
///
/// Bytes received before a read timeout stay in `pending`, so a line split
/// across two reads is reassembled on the next call. A complete line is decoded
/// as lossy UTF-8 and trimmed; blank lines, partial lines and timeouts all
/// yield `None`.
fn read_telemetry_line<R: BufRead + ?Sized>(
    reader: &mut R,
    pending: &mut Vec<u8>,
) -> io::Result<Option<String>> {
    match reader.read_until(b'\n', pending) {
        Ok(_) if pending.ends_with(b"\n") => {
            let line = String::from_utf8_lossy(pending).trim().to_string();
            pending.clear();
            Ok(Some(line).filter(|l| !l.is_empty()))
        }
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
        Err(e) => {
            pending.clear();
            Err(e)
        }
    }
}

impl TelemetryProducer for SerialTelemetryProducer {
    fn start(&mut self) -> Result<(), DashboardError> {
        // drop any previous handle first so the OS releases the device
        self.reader = None;
        self.pending.clear();

        let port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(SERIAL_READ_TIMEOUT_MS))
            .open()
            .map_err(|e| DashboardError::SerialOpenError {
                port: self.port_name.clone(),
                source: e,
            })?;
        info!("Opened {} at {} baud", self.port_name, self.baud_rate);
        self.reader = Some(Box::new(BufReader::new(port)));
        Ok(())
    }

    fn next_line(&mut self) -> Result<Option<String>, DashboardError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or(DashboardError::MissingSerialConnection)?;

        match read_telemetry_line(reader, &mut self.pending) {
            Ok(line) => {
                if let Some(line) = &line {
                    debug!("{}: {}", self.port_name, line);
                }
                Ok(line)
            }
            Err(e) => {
                // the collector reopens the port through `start`
                self.reader = None;
                Err(DashboardError::SerialReadError { source: e })
            }
        }
    }

    fn description(&self) -> String {
        self.port_name.clone()
    }
}

/// Lists the serial ports available on this machine, sorted by name.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => {
            let mut names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
            names.sort();
            names
        }
        Err(e) => {
            warn!("Could not enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}

/// A canned telemetry producer for tests and offline replays.
///
/// Lines are handed out in order, optionally paced by a fixed delay so a
/// capture replays at roughly the speed the rig would send it. Once every line
/// has been consumed the producer stays idle.
pub struct MockTelemetryProducer {
    lines: VecDeque<String>,
    line_delay: Duration,
    source: String,
}

impl Default for MockTelemetryProducer {
    fn default() -> Self {
        Self {
            lines: VecDeque::new(),
            line_delay: Duration::ZERO,
            source: "mock".to_string(),
        }
    }
}

impl MockTelemetryProducer {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Loads a capture file, one telemetry line per text line.
    pub fn from_file(path: &Path) -> Result<Self, DashboardError> {
        if !path.exists() {
            return Err(DashboardError::InvalidCaptureFile {
                path: format!("{:?}", path),
            });
        }
        let file = File::open(path).map_err(|e| DashboardError::CaptureLoaderError { source: e })?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<VecDeque<String>, io::Error>>()
            .map_err(|e| DashboardError::CaptureLoaderError { source: e })?;
        info!("Loaded {} lines from {:?}", lines.len(), path);

        Ok(Self {
            lines,
            line_delay: Duration::ZERO,
            source: path.display().to_string(),
        })
    }

    pub fn with_line_delay(mut self, line_delay: Duration) -> Self {
        self.line_delay = line_delay;
        self
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl TelemetryProducer for MockTelemetryProducer {
    fn start(&mut self) -> Result<(), DashboardError> {
        Ok(())
    }

    fn next_line(&mut self) -> Result<Option<String>, DashboardError> {
        while let Some(line) = self.lines.pop_front() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !self.line_delay.is_zero() {
                thread::sleep(self.line_delay);
            }
            return Ok(Some(line.to_string()));
        }
        Ok(None)
    }

    fn description(&self) -> String {
        self.source.clone()
    }
}
