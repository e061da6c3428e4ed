use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
    },
    thread,
    time::Duration,
};

use log::{debug, error, info, warn};

use crate::DashboardError;

use super::{LinkStatus, TelemetryOutput, parse_line, producer::TelemetryProducer};

const IDLE_WAIT_MS: u64 = 10;
pub(crate) const RETRY_WAIT_MS: u64 = 1000;

/// Reads lines from `producer` until `running` is cleared, forwarding every
/// decoded reading to `telemetry_sender`.
///
/// The producer must already be started. Read errors are retried by waiting
/// and restarting the producer; the loop only gives up when nobody is
/// listening on the other side of the channel.
pub fn collect_telemetry(
    mut producer: impl TelemetryProducer,
    running: Arc<AtomicBool>,
    telemetry_sender: Sender<TelemetryOutput>,
) -> Result<(), DashboardError> {
    collect_with_retry_wait(
        &mut producer,
        &running,
        &telemetry_sender,
        Duration::from_millis(RETRY_WAIT_MS),
    )
}

fn collect_with_retry_wait(
    producer: &mut impl TelemetryProducer,
    running: &AtomicBool,
    telemetry_sender: &Sender<TelemetryOutput>,
    retry_wait: Duration,
) -> Result<(), DashboardError> {
    let mut connected = true;
    let result = loop {
        if !running.load(Ordering::Relaxed) {
            break Ok(());
        }

        if !connected {
            thread::sleep(retry_wait);
            match producer.start() {
                Ok(()) => {
                    info!("Reconnected to {}", producer.description());
                    connected = true;
                    if let Err(e) = send(
                        telemetry_sender,
                        TelemetryOutput::Link(LinkStatus::Connected(producer.description())),
                    ) {
                        break Err(e);
                    }
                }
                Err(e) => {
                    debug!("Reconnect attempt failed: {}", e);
                }
            }
            continue;
        }

        match producer.next_line() {
            Ok(Some(line)) => match parse_line(&line) {
                Ok(Some(reading)) => {
                    if let Err(e) = send(telemetry_sender, TelemetryOutput::Reading(reading)) {
                        break Err(e);
                    }
                }
                Ok(None) => debug!("Ignoring line: {}", line),
                Err(e) => warn!("{}", e),
            },
            Ok(None) => thread::sleep(Duration::from_millis(IDLE_WAIT_MS)),
            Err(e) => {
                warn!("Error reading telemetry from {}: {}", producer.description(), e);
                connected = false;
                if let Err(e) = send(
                    telemetry_sender,
                    TelemetryOutput::Link(LinkStatus::Reconnecting),
                ) {
                    break Err(e);
                }
            }
        }
    };

    // the receiver may already be gone, nothing left to report to
    let _ = telemetry_sender.send(TelemetryOutput::Link(LinkStatus::Closed));
    result
}

fn send(sender: &Sender<TelemetryOutput>, output: TelemetryOutput) -> Result<(), DashboardError> {
    sender.send(output).map_err(|e| {
        error!("Could not send telemetry output: {}", e);
        DashboardError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{MockTelemetryProducer, TelemetryReading};
    use std::sync::mpsc;

    /// Fails on the first read, then serves the given lines.
    struct FlakyProducer {
        failed: bool,
        starts: usize,
        inner: MockTelemetryProducer,
    }

    impl TelemetryProducer for FlakyProducer {
        fn start(&mut self) -> Result<(), DashboardError> {
            self.starts += 1;
            Ok(())
        }

        fn next_line(&mut self) -> Result<Option<String>, DashboardError> {
            if !self.failed {
                self.failed = true;
                return Err(DashboardError::SerialReadError {
                    source: std::io::Error::other("unplugged"),
                });
            }
            self.inner.next_line()
        }

        fn description(&self) -> String {
            "flaky".to_string()
        }
    }

    #[test]
    fn test_collect_forwards_parsed_readings() {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let producer =
            MockTelemetryProducer::from_lines(["MT:40.5", "garbage", "BT:x", "V:2", "W"]);

        let handle = {
            let running = running.clone();
            thread::spawn(move || collect_telemetry(producer, running, tx))
        };

        assert_eq!(
            rx.recv().unwrap(),
            TelemetryOutput::Reading(TelemetryReading::MotorTemp(40.5))
        );
        assert_eq!(
            rx.recv().unwrap(),
            TelemetryOutput::Reading(TelemetryReading::Vibration(2.0))
        );
        assert_eq!(
            rx.recv().unwrap(),
            TelemetryOutput::Reading(TelemetryReading::Warning)
        );

        running.store(false, Ordering::Relaxed);
        assert!(handle.join().unwrap().is_ok());
        assert_eq!(rx.recv().unwrap(), TelemetryOutput::Link(LinkStatus::Closed));
    }

    #[test]
    fn test_collect_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let running = Arc::new(AtomicBool::new(true));
        let producer = MockTelemetryProducer::from_lines(["MT:40.5"]);

        let result = collect_telemetry(producer, running, tx);
        assert!(matches!(
            result,
            Err(DashboardError::TelemetryBroadcastError { .. })
        ));
    }

    #[test]
    fn test_collect_reconnects_after_read_error() {
        let (tx, rx) = mpsc::channel();
        let running = AtomicBool::new(true);
        let mut producer = FlakyProducer {
            failed: false,
            starts: 0,
            inner: MockTelemetryProducer::from_lines(["BT:22"]),
        };

        thread::scope(|s| {
            let handle = s.spawn(|| {
                collect_with_retry_wait(&mut producer, &running, &tx, Duration::from_millis(1))
            });

            assert_eq!(
                rx.recv().unwrap(),
                TelemetryOutput::Link(LinkStatus::Reconnecting)
            );
            assert_eq!(
                rx.recv().unwrap(),
                TelemetryOutput::Link(LinkStatus::Connected("flaky".to_string()))
            );
            assert_eq!(
                rx.recv().unwrap(),
                TelemetryOutput::Reading(TelemetryReading::BatteryTemp(22.0))
            );

            running.store(false, Ordering::Relaxed);
            assert!(handle.join().unwrap().is_ok());
        });

        assert_eq!(producer.starts, 1);
    }
}
