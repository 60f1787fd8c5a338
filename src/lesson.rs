use crate::lesson_times::LessonTimes;
use crate::lesson_validation::LessonValidationError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ROMAN: [&str; 4] = ["I", "II", "III", "IV"];

/// School day. Ordering follows the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Storage code, 1 for Monday through 5 for Friday.
    pub fn code(self) -> u8 {
        match self {
            Day::Monday => 1,
            Day::Tuesday => 2,
            Day::Wednesday => 3,
            Day::Thursday => 4,
            Day::Friday => 5,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, LessonValidationError> {
        match code {
            1 => Ok(Day::Monday),
            2 => Ok(Day::Tuesday),
            3 => Ok(Day::Wednesday),
            4 => Ok(Day::Thursday),
            5 => Ok(Day::Friday),
            other => Err(LessonValidationError::InvalidDay(other)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Понеділок",
            Day::Tuesday => "Вівторок",
            Day::Wednesday => "Середа",
            Day::Thursday => "Четвер",
            Day::Friday => "П'ятниця",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
        }
    }

    /// `None` for weekend days.
    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.weekday() == weekday)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the storage code, the English name (full or three-letter) or the display label.
impl FromStr for Day {
    type Err = LessonValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code);
        }
        if let Ok(weekday) = trimmed.parse::<Weekday>() {
            return Self::from_weekday(weekday)
                .ok_or_else(|| LessonValidationError::UnknownDay(trimmed.to_string()));
        }
        let lower = trimmed.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.label().to_lowercase() == lower)
            .ok_or_else(|| LessonValidationError::UnknownDay(trimmed.to_string()))
    }
}

/// Position in the four-week rotation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Week {
    #[default]
    One,
    Two,
    Three,
    Four,
}

impl Week {
    pub fn number(self) -> u8 {
        match self {
            Week::One => 1,
            Week::Two => 2,
            Week::Three => 3,
            Week::Four => 4,
        }
    }

    pub fn roman(self) -> &'static str {
        ROMAN[usize::from(self.number() - 1)]
    }

    pub fn label(self) -> String {
        format!("{} тиждень", self.roman())
    }
}

impl TryFrom<u8> for Week {
    type Error = LessonValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Week::One),
            2 => Ok(Week::Two),
            3 => Ok(Week::Three),
            4 => Ok(Week::Four),
            other => Err(LessonValidationError::InvalidWeek(other)),
        }
    }
}

impl From<Week> for u8 {
    fn from(value: Week) -> Self {
        value.number()
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Parses the `week` query parameter. Missing or non-numeric input falls back to week 1;
/// numeric values are passed through even when outside the rotation so that the grid
/// builder can answer them with an empty grid.
pub fn parse_week_param(raw: Option<&str>) -> u32 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => text.parse::<u32>().unwrap_or_else(|_| {
            tracing::warn!(week = text, "non-numeric week parameter, using week 1");
            1
        }),
        None => 1,
    }
}

/// Number of a pair (two consecutive slots) within the day, 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PairNumber(u8);

impl PairNumber {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: u8) -> Result<Self, LessonValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LessonValidationError::InvalidPairNumber(value))
        }
    }

    /// The pair a given absolute slot belongs to (`ceil(slot / 2)`).
    pub fn containing_slot(slot: u8) -> Option<Self> {
        Self::new(slot.div_ceil(2)).ok()
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn first_slot(self) -> u8 {
        self.0 * 2 - 1
    }

    pub fn second_slot(self) -> u8 {
        self.0 * 2
    }

    pub fn roman(self) -> &'static str {
        ROMAN[usize::from(self.0 - 1)]
    }

    pub fn label(self) -> String {
        format!("{} пара", self.roman())
    }
}

impl TryFrom<u8> for PairNumber {
    type Error = LessonValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PairNumber> for u8 {
    fn from(value: PairNumber) -> Self {
        value.0
    }
}

/// Roman pair label for an absolute slot: 1,2 → I … 7,8 → IV.
pub fn pair_label(slot: u8) -> Option<&'static str> {
    PairNumber::containing_slot(slot).map(PairNumber::roman)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairPart {
    #[default]
    Full,
    FirstHalf,
    SecondHalf,
}

impl PairPart {
    pub fn code(self) -> u8 {
        match self {
            PairPart::Full => 0,
            PairPart::FirstHalf => 1,
            PairPart::SecondHalf => 2,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, LessonValidationError> {
        match code {
            0 => Ok(PairPart::Full),
            1 => Ok(PairPart::FirstHalf),
            2 => Ok(PairPart::SecondHalf),
            other => Err(LessonValidationError::InvalidPairPart(other)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PairPart::Full => "Повна пара",
            PairPart::FirstHalf => "1-ша половина",
            PairPart::SecondHalf => "2-га половина",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubGroup {
    #[default]
    WholeClass,
    First,
    Second,
}

impl SubGroup {
    pub fn code(self) -> u8 {
        match self {
            SubGroup::WholeClass => 0,
            SubGroup::First => 1,
            SubGroup::Second => 2,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, LessonValidationError> {
        match code {
            0 => Ok(SubGroup::WholeClass),
            1 => Ok(SubGroup::First),
            2 => Ok(SubGroup::Second),
            other => Err(LessonValidationError::InvalidSubGroup(other)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubGroup::WholeClass => "Весь клас",
            SubGroup::First => "1 підгрупа",
            SubGroup::Second => "2 підгрупа",
        }
    }
}

impl fmt::Display for SubGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    #[default]
    FullTime,
    Distance,
}

impl StudyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StudyMode::FullTime => "ОЧНЕ",
            StudyMode::Distance => "ДИСТ.",
        }
    }
}

impl FromStr for StudyMode {
    type Err = LessonValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ОЧНЕ" | "full_time" => Ok(StudyMode::FullTime),
            "ДИСТ." | "distance" => Ok(StudyMode::Distance),
            other => Err(LessonValidationError::InvalidStudyMode(other.to_string())),
        }
    }
}

/// A class or section, e.g. `10-A` taught in person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub study_mode: StudyMode,
}

impl ClassGroup {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            study_mode: StudyMode::default(),
        }
    }
}

impl fmt::Display for ClassGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.study_mode.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub id: u32,
    /// Lessons may reference a subject by id alone; the name is filled in from the catalog.
    #[serde(default)]
    pub name: String,
}

impl Subject {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One scheduled lesson. `subject` is the resolved subject at the time the
/// lesson was loaded; the owning [`crate::Timetable`] keeps it in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub class_group_id: u32,
    pub day: Day,
    pub pair: PairNumber,
    #[serde(default)]
    pub part: PairPart,
    pub subject: Subject,
    #[serde(default)]
    pub cabinet: String,
    #[serde(default)]
    pub week: Week,
    #[serde(default)]
    pub sub_group: SubGroup,
}

impl Lesson {
    pub fn new(
        id: u32,
        class_group_id: u32,
        day: Day,
        pair: PairNumber,
        part: PairPart,
        subject: Subject,
    ) -> Self {
        Self {
            id,
            class_group_id,
            day,
            pair,
            part,
            subject,
            cabinet: String::new(),
            week: Week::default(),
            sub_group: SubGroup::default(),
        }
    }

    /// Absolute slots (1..=8) occupied by the lesson, ascending.
    pub fn slots(&self) -> Vec<u8> {
        match self.part {
            PairPart::Full => vec![self.pair.first_slot(), self.pair.second_slot()],
            PairPart::FirstHalf => vec![self.pair.first_slot()],
            PairPart::SecondHalf => vec![self.pair.second_slot()],
        }
    }

    /// Wall-clock range of the whole lesson. A full pair runs from the start of its
    /// first slot to the end of its second.
    pub fn time(&self, times: &LessonTimes) -> String {
        let first = times.slot(self.pair.first_slot());
        let second = times.slot(self.pair.second_slot());
        match self.part {
            PairPart::Full => first.start_to(second).to_string(),
            PairPart::FirstHalf => first.to_string(),
            PairPart::SecondHalf => second.to_string(),
        }
    }

    /// Human readable summary, e.g. `10-A (ОЧНЕ) - Понеділок - I пара (Повна пара) - Math`.
    pub fn describe(&self, group: &ClassGroup) -> String {
        format!(
            "{} - {} - {} ({}) - {}",
            group,
            self.day,
            self.pair.label(),
            self.part.label(),
            self.subject
        )
    }

    /// Canonical list ordering: week, day, pair, part.
    pub fn sort_key(&self) -> (Week, Day, PairNumber, PairPart) {
        (self.week, self.day, self.pair, self.part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_numbers_outside_range_are_rejected() {
        assert!(PairNumber::new(0).is_err());
        assert!(PairNumber::new(5).is_err());
        let err = PairNumber::new(9).unwrap_err();
        assert!(err.to_string().contains("invalid lesson slot"));
    }

    #[test]
    fn day_parses_codes_names_and_labels() {
        assert_eq!("1".parse::<Day>().unwrap(), Day::Monday);
        assert_eq!("fri".parse::<Day>().unwrap(), Day::Friday);
        assert_eq!("Wednesday".parse::<Day>().unwrap(), Day::Wednesday);
        assert_eq!("Четвер".parse::<Day>().unwrap(), Day::Thursday);
        assert!("sunday".parse::<Day>().is_err());
        assert!(matches!(
            "Sat".parse::<Day>(),
            Err(LessonValidationError::UnknownDay(_))
        ));
        assert!("6".parse::<Day>().is_err());
    }

    #[test]
    fn week_param_defaults_to_first_week() {
        assert_eq!(parse_week_param(None), 1);
        assert_eq!(parse_week_param(Some("")), 1);
        assert_eq!(parse_week_param(Some("abc")), 1);
        assert_eq!(parse_week_param(Some(" 3 ")), 3);
        assert_eq!(parse_week_param(Some("7")), 7);
    }

    #[test]
    fn week_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Week::Three).unwrap(), "3");
        assert!(serde_json::from_str::<Week>("5").is_err());
    }
}
