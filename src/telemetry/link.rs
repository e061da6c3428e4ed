use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver},
    },
    thread::{self, JoinHandle},
};

use log::{error, info};

use crate::DashboardError;

use super::{TelemetryOutput, collect_telemetry, producer::TelemetryProducer};

/// Handle to a running telemetry reader thread.
///
/// The producer is started on the calling thread so a port that cannot be
/// opened is reported straight away. Dropping the link stops the reader.
pub struct TelemetryLink {
    description: String,
    running: Arc<AtomicBool>,
    receiver: Receiver<TelemetryOutput>,
    handle: Option<JoinHandle<Result<(), DashboardError>>>,
}

impl TelemetryLink {
    pub fn connect<P>(mut producer: P) -> Result<Self, DashboardError>
    where
        P: TelemetryProducer + Send + 'static,
    {
        producer.start()?;
        let description = producer.description();
        info!("Telemetry link established with {}", description);

        let (telemetry_tx, telemetry_rx) = mpsc::channel::<TelemetryOutput>();
        let running = Arc::new(AtomicBool::new(true));
        let handle = {
            let running = running.clone();
            thread::spawn(move || collect_telemetry(producer, running, telemetry_tx))
        };

        Ok(Self {
            description,
            running,
            receiver: telemetry_rx,
            handle: Some(handle),
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn try_recv(&self) -> Option<TelemetryOutput> {
        self.receiver.try_recv().ok()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the reader thread and waits for it to exit.
    pub fn stop(&mut self) -> Result<(), DashboardError> {
        self.running.store(false, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| DashboardError::ReaderThreadPanic)?,
            None => Ok(()),
        }
    }
}

impl Drop for TelemetryLink {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Error while stopping telemetry reader for {}: {}", self.description, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{LinkStatus, MockTelemetryProducer, TelemetryReading};
    use std::time::{Duration, Instant};

    fn recv_timeout(link: &TelemetryLink) -> Option<TelemetryOutput> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(output) = link.try_recv() {
                return Some(output);
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    }

    #[test]
    fn test_link_delivers_readings_and_stops() {
        let mut link =
            TelemetryLink::connect(MockTelemetryProducer::from_lines(["MT:33", "BT:21"])).unwrap();
        assert_eq!(link.description(), "mock");
        assert_eq!(
            recv_timeout(&link),
            Some(TelemetryOutput::Reading(TelemetryReading::MotorTemp(33.0)))
        );
        assert_eq!(
            recv_timeout(&link),
            Some(TelemetryOutput::Reading(TelemetryReading::BatteryTemp(21.0)))
        );

        link.stop().unwrap();
        assert!(!link.is_running());
        assert_eq!(
            recv_timeout(&link),
            Some(TelemetryOutput::Link(LinkStatus::Closed))
        );
        // stopping twice is harmless
        link.stop().unwrap();
    }

    #[test]
    fn test_link_reports_open_failure() {
        let result = TelemetryLink::connect(crate::telemetry::SerialTelemetryProducer::new(
            "/dev/does-not-exist",
            9600,
        ));
        assert!(matches!(result, Err(DashboardError::SerialOpenError { .. })));
    }
}
