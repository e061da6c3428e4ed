pub mod history;
pub mod laps;
pub mod ticker;

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::{DashboardError, telemetry::TelemetryReading};

pub use history::{HISTORY_CAPACITY, MAX_HISTORY_CAPACITY, Sample, SampleHistory};
pub use laps::{LapEntry, LapEntryKind, LapLog};
pub use ticker::Ticker;

pub const HEAT_DURATION_S: u32 = 30 * 60;
pub const INITIAL_ENERGY_AH: f32 = 26.;
pub const INITIAL_MOTOR_TEMP_C: f32 = 25.;
pub const INITIAL_BATTERY_TEMP_C: f32 = 25.;
pub const INITIAL_VIBRATION: f32 = 20.;
pub const SAMPLE_INTERVAL_S: u32 = 5;
pub const MAX_SAMPLE_INTERVAL_S: u32 = 60 * 60;
pub const MAX_ENERGY_AH: f32 = 100.;
const ENERGY_INPUT_DECIMALS: usize = 2;
const HEAT_TICK_MS: u64 = 1000;
const WARNING_BLINK_MS: u128 = 500;

/// Tunables of a heat, usually taken from the app config.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub heat_duration_s: u32,
    pub initial_energy_ah: f32,
    pub sample_interval_s: u32,
    pub history_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heat_duration_s: HEAT_DURATION_S,
            initial_energy_ah: INITIAL_ENERGY_AH,
            sample_interval_s: SAMPLE_INTERVAL_S,
            history_capacity: HISTORY_CAPACITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PitStop {
    OnTrack,
    /// Heat seconds remaining when the kart entered the pits
    InPit { start_s: u32 },
}

/// Everything the dashboard knows about the running heat.
///
/// Time only moves through [`SessionState::advance`], which the UI calls every
/// frame with the current instant. The heat countdown ticks once a second while
/// the timer runs. The graph window is sampled every `sample_interval_s` but
/// only records while the timer runs.
#[derive(Clone, Debug)]
pub struct SessionState {
    settings: SessionSettings,
    heat_remaining_s: u32,
    last_lap_mark_s: u32,
    lap_count: u32,
    remaining_energy_ah: f32,
    motor_temp_c: f32,
    battery_temp_c: f32,
    vibration: f32,
    warning_since: Option<Instant>,
    pit_stop: PitStop,
    laps: LapLog,
    history: SampleHistory,
    elapsed_s: u32,
    heat_ticker: Option<Ticker>,
    sample_ticker: Option<Ticker>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl SessionSettings {
    /// Pulls the sampling tunables back into a usable range.
    fn clamped(self) -> Self {
        Self {
            sample_interval_s: self.sample_interval_s.clamp(1, MAX_SAMPLE_INTERVAL_S),
            history_capacity: self.history_capacity.clamp(1, MAX_HISTORY_CAPACITY),
            ..self
        }
    }
}

impl SessionState {
    pub fn new(settings: SessionSettings) -> Self {
        let settings = settings.clamped();
        Self {
            heat_remaining_s: settings.heat_duration_s,
            last_lap_mark_s: settings.heat_duration_s,
            lap_count: 0,
            remaining_energy_ah: settings.initial_energy_ah,
            motor_temp_c: INITIAL_MOTOR_TEMP_C,
            battery_temp_c: INITIAL_BATTERY_TEMP_C,
            vibration: INITIAL_VIBRATION,
            warning_since: None,
            pit_stop: PitStop::OnTrack,
            laps: LapLog::default(),
            history: SampleHistory::with_capacity(settings.history_capacity),
            elapsed_s: 0,
            heat_ticker: None,
            sample_ticker: None,
            settings,
        }
    }

    pub fn apply_reading(&mut self, reading: TelemetryReading, now: Instant) {
        match reading {
            TelemetryReading::MotorTemp(t) => self.motor_temp_c = t,
            TelemetryReading::BatteryTemp(t) => self.battery_temp_c = t,
            TelemetryReading::Vibration(v) => self.vibration = v,
            TelemetryReading::Warning => {
                if self.warning_since.is_none() {
                    info!("Warning raised by the rig");
                    self.warning_since = Some(now);
                }
            }
        }
    }

    /// Starts the heat countdown. Does nothing if it is already running.
    pub fn start_timer(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.heat_ticker = Some(Ticker::new(Duration::from_millis(HEAT_TICK_MS), now));
        self.arm_sampling(now);
    }

    pub fn pause_timer(&mut self) {
        self.heat_ticker = None;
    }

    /// Restarts the sampling clock from `now`.
    pub fn arm_sampling(&mut self, now: Instant) {
        let interval = Duration::from_secs(self.settings.sample_interval_s as u64);
        self.sample_ticker = Some(Ticker::new(interval, now));
    }

    pub fn is_running(&self) -> bool {
        self.heat_ticker.is_some()
    }

    /// Fires every heat tick and sample that became due up to `now`.
    pub fn advance(&mut self, now: Instant) {
        let ticks = self.heat_ticker.as_mut().map_or(0, |t| t.poll(now));
        let samples = self.sample_ticker.as_mut().map_or(0, |t| t.poll(now));
        for _ in 0..ticks {
            self.tick();
        }
        for _ in 0..samples {
            self.collect_sample();
        }
    }

    /// One second of heat time.
    pub fn tick(&mut self) {
        self.heat_remaining_s = self.heat_remaining_s.saturating_sub(1);
    }

    pub fn collect_sample(&mut self) {
        if !self.is_running() {
            return;
        }
        self.elapsed_s = self.elapsed_s.saturating_add(self.settings.sample_interval_s);
        self.history.push(Sample {
            elapsed_s: self.elapsed_s,
            motor_temp_c: self.motor_temp_c,
            battery_temp_c: self.battery_temp_c,
            energy_ah: self.remaining_energy_ah,
        });
        debug!("Collected sample at {}s", self.elapsed_s);
    }

    /// Closes the current lap. `new_energy_ah` is the energy left in the pack
    /// as read by the driver; without it no energy is counted for the lap.
    pub fn record_lap(&mut self, new_energy_ah: Option<f32>) -> &LapEntry {
        let new_energy_ah = new_energy_ah.unwrap_or(self.remaining_energy_ah);
        let energy_used_ah = self.remaining_energy_ah - new_energy_ah;
        self.remaining_energy_ah = new_energy_ah;

        self.lap_count += 1;
        let time_taken_s = self.last_lap_mark_s.saturating_sub(self.heat_remaining_s);
        self.last_lap_mark_s = self.heat_remaining_s;
        info!(
            "Lap {} recorded in {} using {:.2} Ah",
            self.lap_count,
            format_time(time_taken_s),
            energy_used_ah
        );

        self.laps.push(LapEntryKind::Lap {
            lap_no: self.lap_count,
            time_taken_s,
            energy_used_ah,
        })
    }

    /// Enters the pits, or leaves them logging how long the stop took.
    pub fn toggle_pit_stop(&mut self) -> &LapEntry {
        match self.pit_stop {
            PitStop::OnTrack => {
                self.pit_stop = PitStop::InPit {
                    start_s: self.heat_remaining_s,
                };
                info!("Entered pit stop at {}", format_time(self.heat_remaining_s));
                self.laps.push(LapEntryKind::PitEntered)
            }
            PitStop::InPit { start_s } => {
                self.pit_stop = PitStop::OnTrack;
                let duration_s = start_s.saturating_sub(self.heat_remaining_s);
                info!("Pit stop complete in {}", format_time(duration_s));
                self.laps.push(LapEntryKind::PitCompleted { duration_s })
            }
        }
    }

    /// Removes a lap row from the table. The lap counter is left untouched.
    pub fn delete_lap(&mut self, id: u64) -> Option<LapEntry> {
        self.laps.remove_lap(id)
    }

    pub fn clear_warning(&mut self) {
        self.warning_since = None;
    }

    pub fn warning_active(&self) -> bool {
        self.warning_since.is_some()
    }

    /// Whether the warning lamp is lit at `now`. The lamp blinks while a
    /// warning is latched, starting lit.
    pub fn warning_lamp_lit(&self, now: Instant) -> bool {
        match self.warning_since {
            Some(since) => {
                let elapsed_ms = now.saturating_duration_since(since).as_millis();
                (elapsed_ms / WARNING_BLINK_MS) % 2 == 0
            }
            None => false,
        }
    }

    pub fn in_pit_stop(&self) -> bool {
        matches!(self.pit_stop, PitStop::InPit { .. })
    }

    pub fn heat_remaining_s(&self) -> u32 {
        self.heat_remaining_s
    }

    pub fn lap_count(&self) -> u32 {
        self.lap_count
    }

    pub fn remaining_energy_ah(&self) -> f32 {
        self.remaining_energy_ah
    }

    pub fn motor_temp_c(&self) -> f32 {
        self.motor_temp_c
    }

    pub fn battery_temp_c(&self) -> f32 {
        self.battery_temp_c
    }

    pub fn vibration(&self) -> f32 {
        self.vibration
    }

    pub fn laps(&self) -> &LapLog {
        &self.laps
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }
}

/// Formats seconds as `MM:SS`.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Validates the remaining energy typed by the driver.
///
/// Blank input means "unchanged" and returns `None`. Anything else must be a
/// plain decimal between 0 and 100 Ah with at most two decimals.
pub fn parse_energy_input(input: &str) -> Result<Option<f32>, DashboardError> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: &str| DashboardError::InvalidEnergyInput {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid("only digits and a decimal point are allowed"));
    }
    if let Some((_, decimals)) = text.split_once('.')
        && decimals.len() > ENERGY_INPUT_DECIMALS
    {
        return Err(invalid("at most two decimals are allowed"));
    }
    let value = text
        .parse::<f32>()
        .map_err(|_| invalid("not a number"))?;
    if value > MAX_ENERGY_AH {
        return Err(invalid("must be between 0 and 100 Ah"));
    }
    Ok(Some(value))
}
