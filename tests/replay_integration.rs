// Integration tests driving a capture through the reader thread into a session

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use vts_dashboard::session::LapEntryKind;
use vts_dashboard::telemetry::LinkStatus;
use vts_dashboard::{
    MockTelemetryProducer, SessionState, TelemetryLink, TelemetryOutput, TelemetryReading,
};

/// Drains `expected` readings from the link (or gives up at the deadline),
/// applies them to the session and stops the reader.
fn drain_readings(link: &mut TelemetryLink, session: &mut SessionState, expected: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut readings = 0;
    while readings < expected && Instant::now() < deadline {
        match link.try_recv() {
            Some(TelemetryOutput::Reading(reading)) => {
                session.apply_reading(reading, Instant::now());
                readings += 1;
            }
            Some(TelemetryOutput::Link(_)) => {}
            None => thread::sleep(Duration::from_millis(1)),
        }
    }
    link.stop().unwrap();
    readings
}

#[test]
fn test_replay_capture_updates_session() {
    let mut capture = tempfile::NamedTempFile::new().unwrap();
    for line in [
        "MT:30.0",
        "BT:22.5",
        "noise from the rig",
        "V:3.5",
        "MT:not-a-number",
        "",
        "MT:41.25",
        "W",
    ] {
        writeln!(capture, "{}", line).unwrap();
    }

    let producer = MockTelemetryProducer::from_file(capture.path()).unwrap();
    let mut link = TelemetryLink::connect(producer).unwrap();
    let mut session = SessionState::default();

    let readings = drain_readings(&mut link, &mut session, 5);
    assert_eq!(readings, 5);

    assert_eq!(session.motor_temp_c(), 41.25);
    assert_eq!(session.battery_temp_c(), 22.5);
    assert_eq!(session.vibration(), 3.5);
    assert!(session.warning_active());

    // only the closing status is left once the reader has stopped
    assert_eq!(
        link.try_recv(),
        Some(TelemetryOutput::Link(LinkStatus::Closed))
    );
    assert_eq!(link.try_recv(), None);
}

#[test]
fn test_link_readings_feed_graph_samples() {
    let start = Instant::now();
    let mut link =
        TelemetryLink::connect(MockTelemetryProducer::from_lines(["MT:55", "BT:35"])).unwrap();
    let mut session = SessionState::default();
    session.start_timer(start);

    drain_readings(&mut link, &mut session, 2);
    session.record_lap(Some(25.0));
    session.advance(start + Duration::from_secs(5));

    let sample = session.history().latest().copied().unwrap();
    assert_eq!(sample.elapsed_s, 5);
    assert_eq!(sample.motor_temp_c, 55.0);
    assert_eq!(sample.battery_temp_c, 35.0);
    assert_eq!(sample.energy_ah, 25.0);
}

#[test]
fn test_full_heat_bookkeeping() {
    let start = Instant::now();
    let mut session = SessionState::default();
    session.start_timer(start);

    // first lap after 90 seconds
    session.advance(start + Duration::from_secs(90));
    session.record_lap(Some(25.0));

    // pit stop from 120s to 150s
    session.advance(start + Duration::from_secs(120));
    session.toggle_pit_stop();
    session.advance(start + Duration::from_secs(150));
    session.toggle_pit_stop();

    // second lap closes at 200s
    session.advance(start + Duration::from_secs(200));
    session.record_lap(Some(23.5));

    assert_eq!(session.heat_remaining_s(), 1600);
    assert_eq!(session.lap_count(), 2);
    assert_eq!(session.history().len(), 40);

    let kinds: Vec<LapEntryKind> = session
        .laps()
        .entries()
        .iter()
        .map(|e| e.kind.clone())
        .collect();
    assert_eq!(
        kinds,
        vec![
            LapEntryKind::Lap {
                lap_no: 1,
                time_taken_s: 90,
                energy_used_ah: 1.0,
            },
            LapEntryKind::PitEntered,
            LapEntryKind::PitCompleted { duration_s: 30 },
            LapEntryKind::Lap {
                lap_no: 2,
                time_taken_s: 110,
                energy_used_ah: 1.5,
            },
        ]
    );

    let rendered: Vec<String> = session.laps().entries().iter().map(|e| e.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "1 | 01:30 | 1.00 Ah",
            "-- | Entered Pit Stop | --",
            "-- | Pit Stop Complete (00:30) | --",
            "2 | 01:50 | 1.50 Ah",
        ]
    );

    // the session reading survives a warning round trip
    session.apply_reading(TelemetryReading::Warning, start);
    session.clear_warning();
    assert!(!session.warning_active());
}
