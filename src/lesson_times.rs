use crate::config::ConfigError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Number of absolute lesson slots in a school day (four pairs of two).
pub const SLOT_COUNT: usize = 8;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTime {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SlotTime {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Range from the start of `self` to the end of `later`.
    pub fn start_to(&self, later: &SlotTime) -> SlotTime {
        SlotTime::new(self.start, later.end)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}–{}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

/// Bell schedule: the wall-clock window of every absolute slot.
///
/// Always holds exactly [`SLOT_COUNT`] entries, each ending after it starts, so a
/// lookup for any slot derived from a valid pair number cannot miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LessonTimesConfig", into = "LessonTimesConfig")]
pub struct LessonTimes {
    slots: [SlotTime; SLOT_COUNT],
}

/// Serialized form of [`LessonTimes`]: `[{"start": "08:55", "end": "09:45"}, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonTimesConfig {
    slots: Vec<SlotTimeConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTimeConfig {
    pub start: String,
    pub end: String,
}

impl Default for LessonTimes {
    fn default() -> Self {
        Self {
            slots: [
                hm(8, 55, 9, 45),
                hm(9, 50, 10, 35),
                hm(10, 45, 11, 30),
                hm(11, 35, 12, 20),
                hm(12, 40, 13, 25),
                hm(13, 30, 14, 15),
                hm(14, 25, 15, 10),
                hm(15, 15, 16, 0),
            ],
        }
    }
}

fn hm(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> SlotTime {
    // Constant table; every component is a valid clock time.
    let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN);
    SlotTime::new(time(start_h, start_m), time(end_h, end_m))
}

impl LessonTimes {
    pub fn new(slots: [SlotTime; SLOT_COUNT]) -> Result<Self, ConfigError> {
        for (idx, slot) in slots.iter().enumerate() {
            if slot.end <= slot.start {
                return Err(ConfigError::SlotEndsBeforeStart {
                    slot: idx + 1,
                    range: slot.to_string(),
                });
            }
        }
        Ok(Self { slots })
    }

    pub fn from_config(config: &LessonTimesConfig) -> Result<Self, ConfigError> {
        if config.slots.len() != SLOT_COUNT {
            return Err(ConfigError::SlotCount {
                expected: SLOT_COUNT,
                found: config.slots.len(),
            });
        }
        let mut slots = [SlotTime::new(NaiveTime::MIN, NaiveTime::MIN); SLOT_COUNT];
        for (idx, entry) in config.slots.iter().enumerate() {
            slots[idx] = SlotTime::new(parse_time(&entry.start)?, parse_time(&entry.end)?);
        }
        Self::new(slots)
    }

    pub fn to_config(&self) -> LessonTimesConfig {
        LessonTimesConfig::from(self)
    }

    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        let config: LessonTimesConfig = serde_json::from_reader(file)?;
        let times = Self::from_config(&config)?;
        tracing::info!(path = %path.as_ref().display(), "loaded lesson times");
        Ok(times)
    }

    /// Time window of an absolute slot, `None` outside 1..=8.
    pub fn get(&self, slot: u8) -> Option<&SlotTime> {
        usize::from(slot)
            .checked_sub(1)
            .and_then(|idx| self.slots.get(idx))
    }

    /// Like [`LessonTimes::get`] for slots derived from a validated pair number.
    pub(crate) fn slot(&self, slot: u8) -> &SlotTime {
        let idx = usize::from(slot.clamp(1, SLOT_COUNT as u8)) - 1;
        &self.slots[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &SlotTime)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| (idx as u8 + 1, slot))
    }
}

impl From<&LessonTimes> for LessonTimesConfig {
    fn from(times: &LessonTimes) -> Self {
        Self {
            slots: times
                .slots
                .iter()
                .map(|slot| SlotTimeConfig {
                    start: slot.start.format(TIME_FORMAT).to_string(),
                    end: slot.end.format(TIME_FORMAT).to_string(),
                })
                .collect(),
        }
    }
}

impl From<LessonTimes> for LessonTimesConfig {
    fn from(times: LessonTimes) -> Self {
        Self::from(&times)
    }
}

impl TryFrom<LessonTimesConfig> for LessonTimes {
    type Error = ConfigError;

    fn try_from(config: LessonTimesConfig) -> Result<Self, Self::Error> {
        Self::from_config(&config)
    }
}

impl LessonTimesConfig {
    pub fn new<I>(slots: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            slots: slots
                .into_iter()
                .map(|(start, end)| SlotTimeConfig { start, end })
                .collect(),
        }
    }

    pub fn slots(&self) -> &[SlotTimeConfig] {
        &self.slots
    }
}

fn parse_time(input: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT).map_err(|err| ConfigError::InvalidTime {
        input: input.to_string(),
        reason: err.to_string(),
    })
}
