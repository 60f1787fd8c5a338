use super::{PersistenceError, PersistenceResult};
use crate::lesson::{ClassGroup, Day, Lesson, PairNumber, PairPart, StudyMode, SubGroup, Subject, Week};
use crate::lesson_times::{LessonTimes, LessonTimesConfig, SLOT_COUNT};
use crate::Timetable;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct TimetableSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lesson_times: Option<LessonTimes>,
    #[serde(default)]
    class_groups: Vec<ClassGroup>,
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    lessons: Vec<Lesson>,
}

impl TimetableSnapshot {
    fn from_timetable(timetable: &Timetable) -> Self {
        let (class_groups, subjects, lessons) = timetable.to_parts();
        Self {
            lesson_times: Some(timetable.lesson_times().clone()),
            class_groups,
            subjects,
            lessons,
        }
    }

    fn into_timetable(self) -> PersistenceResult<Timetable> {
        let timetable = Timetable::from_parts(
            self.lesson_times.unwrap_or_default(),
            self.class_groups,
            self.subjects,
            self.lessons,
        )?;
        Ok(timetable)
    }
}

pub fn save_timetable_to_json<P: AsRef<Path>>(
    timetable: &Timetable,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = TimetableSnapshot::from_timetable(timetable);
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    tracing::info!(path = %path.as_ref().display(), lessons = snapshot.lessons.len(), "saved timetable json");
    Ok(())
}

pub fn load_timetable_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Timetable> {
    let file = File::open(path.as_ref())?;
    let snapshot: TimetableSnapshot = serde_json::from_reader(file)?;
    let timetable = snapshot.into_timetable()?;
    tracing::info!(path = %path.as_ref().display(), lessons = timetable.lesson_count(), "loaded timetable json");
    Ok(timetable)
}

const CLASS_GROUP_ROW: &str = "class_group";
const SUBJECT_ROW: &str = "subject";
const LESSON_ROW: &str = "lesson";
const LESSON_TIME_ROW: &str = "lesson_time";

/// One line of the spreadsheet export. `record_type` selects which columns are used;
/// lesson rows repeat the subject name in `name` for readability only.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct TimetableCsvRecord {
    record_type: String,
    id: u32,
    name: String,
    study_mode: String,
    class_group_id: String,
    week: String,
    day: String,
    pair: String,
    part: String,
    subject_id: String,
    cabinet: String,
    sub_group: String,
    start: String,
    end: String,
}

impl TimetableCsvRecord {
    fn class_group(group: &ClassGroup) -> Self {
        Self {
            record_type: CLASS_GROUP_ROW.to_string(),
            id: group.id,
            name: group.name.clone(),
            study_mode: group.study_mode.as_str().to_string(),
            ..Self::default()
        }
    }

    fn subject(subject: &Subject) -> Self {
        Self {
            record_type: SUBJECT_ROW.to_string(),
            id: subject.id,
            name: subject.name.clone(),
            ..Self::default()
        }
    }

    fn lesson(lesson: &Lesson) -> Self {
        Self {
            record_type: LESSON_ROW.to_string(),
            id: lesson.id,
            name: lesson.subject.name.clone(),
            class_group_id: lesson.class_group_id.to_string(),
            week: lesson.week.number().to_string(),
            day: lesson.day.code().to_string(),
            pair: lesson.pair.get().to_string(),
            part: lesson.part.code().to_string(),
            subject_id: lesson.subject.id.to_string(),
            cabinet: lesson.cabinet.clone(),
            sub_group: lesson.sub_group.code().to_string(),
            ..Self::default()
        }
    }

    fn lesson_time(slot: u8, start: String, end: String) -> Self {
        Self {
            record_type: LESSON_TIME_ROW.to_string(),
            id: u32::from(slot),
            start,
            end,
            ..Self::default()
        }
    }

    fn into_class_group(self) -> PersistenceResult<ClassGroup> {
        let study_mode = if self.study_mode.trim().is_empty() {
            StudyMode::default()
        } else {
            self.study_mode.parse()?
        };
        Ok(ClassGroup {
            id: self.id,
            name: self.name,
            study_mode,
        })
    }

    fn into_lesson(self) -> PersistenceResult<Lesson> {
        let class_group_id = parse_u32("class_group_id", &self.class_group_id)?;
        let subject_id = parse_u32("subject_id", &self.subject_id)?;
        let day = Day::from_code(parse_u8("day", &self.day)?)?;
        let pair = PairNumber::new(parse_u8("pair", &self.pair)?)?;
        let part = PairPart::from_code(parse_u8_or("part", &self.part, 0)?)?;
        let week = Week::try_from(parse_u8_or("week", &self.week, 1)?)?;
        let sub_group = SubGroup::from_code(parse_u8_or("sub_group", &self.sub_group, 0)?)?;

        let mut lesson = Lesson::new(
            self.id,
            class_group_id,
            day,
            pair,
            part,
            Subject::new(subject_id, self.name),
        );
        lesson.week = week;
        lesson.cabinet = self.cabinet;
        lesson.sub_group = sub_group;
        Ok(lesson)
    }
}

pub fn save_timetable_to_csv<P: AsRef<Path>>(timetable: &Timetable, path: P) -> PersistenceResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    for (slot, time) in timetable.lesson_times().iter() {
        writer.serialize(TimetableCsvRecord::lesson_time(
            slot,
            time.start.format("%H:%M").to_string(),
            time.end.format("%H:%M").to_string(),
        ))?;
    }
    let (class_groups, subjects, lessons) = timetable.to_parts();
    for group in &class_groups {
        writer.serialize(TimetableCsvRecord::class_group(group))?;
    }
    for subject in &subjects {
        writer.serialize(TimetableCsvRecord::subject(subject))?;
    }
    for lesson in &lessons {
        writer.serialize(TimetableCsvRecord::lesson(lesson))?;
    }
    writer.flush()?;
    tracing::info!(path = %path.as_ref().display(), lessons = lessons.len(), "saved timetable csv");
    Ok(())
}

pub fn load_timetable_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Timetable> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);

    let mut times = Vec::new();
    let mut class_groups = Vec::new();
    let mut subjects = Vec::new();
    let mut lessons = Vec::new();
    for record in reader.deserialize::<TimetableCsvRecord>() {
        let record = record?;
        match record.record_type.trim() {
            LESSON_TIME_ROW => times.push((record.id, (record.start, record.end))),
            CLASS_GROUP_ROW => class_groups.push(record.into_class_group()?),
            SUBJECT_ROW => subjects.push(Subject::new(record.id, record.name)),
            LESSON_ROW => lessons.push(record.into_lesson()?),
            other => {
                return Err(PersistenceError::InvalidData(format!(
                    "unknown record_type '{other}'"
                )));
            }
        }
    }

    if class_groups.is_empty() && subjects.is_empty() && lessons.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no timetable records".into(),
        ));
    }

    let lesson_times = if times.is_empty() {
        LessonTimes::default()
    } else {
        times.sort_by_key(|(slot, _)| *slot);
        let slots: Vec<u32> = times.iter().map(|(slot, _)| *slot).collect();
        if !slots.iter().copied().eq(1..=SLOT_COUNT as u32) {
            return Err(PersistenceError::InvalidData(format!(
                "lesson_time rows must cover slots 1..={SLOT_COUNT} exactly once (found {slots:?})"
            )));
        }
        LessonTimes::from_config(&LessonTimesConfig::new(times.into_iter().map(|(_, t)| t)))?
    };

    let timetable = Timetable::from_parts(lesson_times, class_groups, subjects, lessons)?;
    tracing::info!(path = %path.as_ref().display(), lessons = timetable.lesson_count(), "loaded timetable csv");
    Ok(timetable)
}

fn parse_u32(field: &str, input: &str) -> PersistenceResult<u32> {
    input.trim().parse::<u32>().map_err(|e| {
        PersistenceError::InvalidData(format!("invalid {field} '{input}': {e}"))
    })
}

fn parse_u8(field: &str, input: &str) -> PersistenceResult<u8> {
    input.trim().parse::<u8>().map_err(|e| {
        PersistenceError::InvalidData(format!("invalid {field} '{input}': {e}"))
    })
}

fn parse_u8_or(field: &str, input: &str, default: u8) -> PersistenceResult<u8> {
    if input.trim().is_empty() {
        return Ok(default);
    }
    parse_u8(field, input)
}
