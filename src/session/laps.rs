use std::fmt;

use super::format_time;

/// What a row of the lap table records.
#[derive(Clone, Debug, PartialEq)]
pub enum LapEntryKind {
    Lap {
        lap_no: u32,
        time_taken_s: u32,
        energy_used_ah: f32,
    },
    PitEntered,
    PitCompleted {
        duration_s: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LapEntry {
    /// Stable identifier, never reused within a session
    pub id: u64,
    pub kind: LapEntryKind,
}

impl LapEntry {
    pub fn is_deletable(&self) -> bool {
        matches!(self.kind, LapEntryKind::Lap { .. })
    }

    pub fn lap_column(&self) -> String {
        match self.kind {
            LapEntryKind::Lap { lap_no, .. } => lap_no.to_string(),
            _ => "--".to_string(),
        }
    }

    pub fn time_column(&self) -> String {
        match self.kind {
            LapEntryKind::Lap { time_taken_s, .. } => format_time(time_taken_s),
            LapEntryKind::PitEntered => "Entered Pit Stop".to_string(),
            LapEntryKind::PitCompleted { duration_s } => {
                format!("Pit Stop Complete ({})", format_time(duration_s))
            }
        }
    }

    pub fn energy_column(&self) -> String {
        match self.kind {
            LapEntryKind::Lap { energy_used_ah, .. } => format!("{:.2} Ah", energy_used_ah),
            _ => "--".to_string(),
        }
    }
}

impl fmt::Display for LapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.lap_column(),
            self.time_column(),
            self.energy_column()
        )
    }
}

/// Ordered lap and pit stop rows of a heat.
#[derive(Clone, Debug, Default)]
pub struct LapLog {
    entries: Vec<LapEntry>,
    next_id: u64,
}

impl LapLog {
    pub fn push(&mut self, kind: LapEntryKind) -> &LapEntry {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(LapEntry { id, kind });
        &self.entries[self.entries.len() - 1]
    }

    /// Removes a lap row. Pit stop rows stay in the log.
    pub fn remove_lap(&mut self, id: u64) -> Option<LapEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id && e.is_deletable())?;
        Some(self.entries.remove(index))
    }

    pub fn entries(&self) -> &[LapEntry] {
        &self.entries
    }

    pub fn laps(&self) -> impl Iterator<Item = &LapEntry> {
        self.entries.iter().filter(|e| e.is_deletable())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
