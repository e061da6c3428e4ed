use crate::DashboardError;

use super::TelemetryReading;

pub const MOTOR_TEMP_TAG: &str = "MT:";
pub const BATTERY_TEMP_TAG: &str = "BT:";
pub const VIBRATION_TAG: &str = "V:";
pub const WARNING_FLAG: char = 'W';

/// Parses a single telemetry line.
///
/// Numeric tags are searched in order motor, battery, vibration and the first
/// one found anywhere in the line wins. A line carrying no numeric tag but a
/// `W` is a warning. Anything else is not telemetry and returns `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<TelemetryReading>, DashboardError> {
    let numeric_tags: [(&str, fn(f32) -> TelemetryReading); 3] = [
        (MOTOR_TEMP_TAG, TelemetryReading::MotorTemp),
        (BATTERY_TEMP_TAG, TelemetryReading::BatteryTemp),
        (VIBRATION_TAG, TelemetryReading::Vibration),
    ];

    for (tag, reading) in numeric_tags {
        if line.contains(tag) {
            return tagged_value(line, tag).map(|value| Some(reading(value)));
        }
    }

    if line.contains(WARNING_FLAG) {
        return Ok(Some(TelemetryReading::Warning));
    }

    Ok(None)
}

// value sits between the tag and the next repetition of it
fn tagged_value(line: &str, tag: &str) -> Result<f32, DashboardError> {
    let raw = line.split(tag).nth(1).unwrap_or_default().trim();
    raw.parse::<f32>()
        .map_err(|e| DashboardError::InvalidReading {
            line: line.to_string(),
            source: e,
        })
}
