use crate::grid::{ScheduleGrid, ScheduleGridBuilder};
use crate::lesson::{ClassGroup, Day, Lesson, Subject, Week};
use crate::lesson_times::LessonTimes;
use crate::lesson_validation::{self, LessonValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error(transparent)]
    Validation(#[from] LessonValidationError),
    #[error("class group {0} not found")]
    ClassGroupNotFound(u32),
    #[error("subject {0} not found")]
    SubjectNotFound(u32),
    #[error("lesson {0} not found")]
    LessonNotFound(u32),
}

pub type TimetableResult<T> = Result<T, TimetableError>;

/// Optional criteria for listing lessons. `query` matches subject name or cabinet,
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonFilter {
    #[serde(default)]
    pub week: Option<Week>,
    #[serde(default)]
    pub day: Option<Day>,
    #[serde(default)]
    pub class_group_id: Option<u32>,
    #[serde(default)]
    pub query: Option<String>,
}

impl LessonFilter {
    fn matches(&self, lesson: &Lesson) -> bool {
        if self.week.is_some_and(|week| lesson.week != week) {
            return false;
        }
        if self.day.is_some_and(|day| lesson.day != day) {
            return false;
        }
        if self
            .class_group_id
            .is_some_and(|id| lesson.class_group_id != id)
        {
            return false;
        }
        match self.query.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                lesson.subject.name.to_lowercase().contains(&needle)
                    || lesson.cabinet.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Class groups, subjects and lessons of the school together with its bell schedule.
///
/// Every mutation keeps the collection valid: lessons always reference existing
/// groups and subjects and never double-book a slot for the same sub-group.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    class_groups: BTreeMap<u32, ClassGroup>,
    subjects: BTreeMap<u32, Subject>,
    lessons: BTreeMap<u32, Lesson>,
    lesson_times: LessonTimes,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lesson_times(lesson_times: LessonTimes) -> Self {
        Self {
            lesson_times,
            ..Self::default()
        }
    }

    /// Assembles a timetable from loaded records, validating them as a whole.
    /// Lesson subjects are replaced by the catalog entry with the same id.
    pub fn from_parts(
        lesson_times: LessonTimes,
        class_groups: Vec<ClassGroup>,
        subjects: Vec<Subject>,
        mut lessons: Vec<Lesson>,
    ) -> TimetableResult<Self> {
        lesson_validation::validate_collection(&class_groups, &subjects, &lessons)?;
        let subjects: BTreeMap<u32, Subject> = subjects.into_iter().map(|s| (s.id, s)).collect();
        for lesson in &mut lessons {
            if let Some(subject) = subjects.get(&lesson.subject.id) {
                lesson.subject = subject.clone();
            }
        }
        Ok(Self {
            class_groups: class_groups.into_iter().map(|g| (g.id, g)).collect(),
            subjects,
            lessons: lessons.into_iter().map(|l| (l.id, l)).collect(),
            lesson_times,
        })
    }

    pub fn lesson_times(&self) -> &LessonTimes {
        &self.lesson_times
    }

    pub fn set_lesson_times(&mut self, lesson_times: LessonTimes) {
        self.lesson_times = lesson_times;
    }

    /// Class groups ordered by name.
    pub fn class_groups(&self) -> Vec<&ClassGroup> {
        let mut groups: Vec<&ClassGroup> = self.class_groups.values().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        groups
    }

    pub fn class_group(&self, id: u32) -> Option<&ClassGroup> {
        self.class_groups.get(&id)
    }

    pub fn subjects(&self) -> Vec<&Subject> {
        self.subjects.values().collect()
    }

    pub fn subject(&self, id: u32) -> Option<&Subject> {
        self.subjects.get(&id)
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// All lessons ordered by week, day, pair, part and class group name.
    pub fn lessons(&self) -> Vec<&Lesson> {
        self.filter_lessons(&LessonFilter::default())
    }

    pub fn filter_lessons(&self, filter: &LessonFilter) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self
            .lessons
            .values()
            .filter(|lesson| filter.matches(lesson))
            .collect();
        lessons.sort_by(|a, b| {
            a.sort_key()
                .cmp(&b.sort_key())
                .then_with(|| self.group_name(a).cmp(self.group_name(b)))
                .then(a.sub_group.cmp(&b.sub_group))
                .then(a.id.cmp(&b.id))
        });
        lessons
    }

    pub fn find_lesson(&self, id: u32) -> Option<&Lesson> {
        self.lessons.get(&id)
    }

    pub fn next_lesson_id(&self) -> u32 {
        self.lessons.keys().next_back().map_or(1, |id| id + 1)
    }

    pub fn upsert_class_group(&mut self, group: ClassGroup) -> TimetableResult<()> {
        lesson_validation::validate_class_group(&group)?;
        self.class_groups.insert(group.id, group);
        Ok(())
    }

    /// Removes a class group together with its lessons.
    pub fn delete_class_group(&mut self, id: u32) -> TimetableResult<ClassGroup> {
        let group = self
            .class_groups
            .remove(&id)
            .ok_or(TimetableError::ClassGroupNotFound(id))?;
        let before = self.lessons.len();
        self.lessons.retain(|_, lesson| lesson.class_group_id != id);
        tracing::info!(
            class_group = id,
            removed_lessons = before - self.lessons.len(),
            "deleted class group"
        );
        Ok(group)
    }

    /// Inserts or renames a subject; lessons taught in it pick up the new name.
    pub fn upsert_subject(&mut self, subject: Subject) -> TimetableResult<()> {
        lesson_validation::validate_subject(&subject)?;
        for lesson in self.lessons.values_mut() {
            if lesson.subject.id == subject.id {
                lesson.subject = subject.clone();
            }
        }
        self.subjects.insert(subject.id, subject);
        Ok(())
    }

    /// Removes a subject together with its lessons.
    pub fn delete_subject(&mut self, id: u32) -> TimetableResult<Subject> {
        let subject = self
            .subjects
            .remove(&id)
            .ok_or(TimetableError::SubjectNotFound(id))?;
        let before = self.lessons.len();
        self.lessons.retain(|_, lesson| lesson.subject.id != id);
        tracing::info!(
            subject = id,
            removed_lessons = before - self.lessons.len(),
            "deleted subject"
        );
        Ok(subject)
    }

    /// Inserts or replaces a lesson after checking its references and slot.
    pub fn upsert_lesson(&mut self, mut lesson: Lesson) -> TimetableResult<()> {
        lesson_validation::validate_lesson(&lesson)?;
        if !self.class_groups.contains_key(&lesson.class_group_id) {
            return Err(LessonValidationError::UnknownClassGroup {
                lesson_id: lesson.id,
                class_group_id: lesson.class_group_id,
            }
            .into());
        }
        let subject = self.subjects.get(&lesson.subject.id).ok_or(
            LessonValidationError::UnknownSubject {
                lesson_id: lesson.id,
                subject_id: lesson.subject.id,
            },
        )?;
        lesson.subject = subject.clone();
        if let Some(conflict) = lesson_validation::find_slot_conflict(self.lessons.values(), &lesson)
        {
            return Err(conflict.into());
        }
        self.lessons.insert(lesson.id, lesson);
        Ok(())
    }

    pub fn delete_lesson(&mut self, id: u32) -> TimetableResult<Lesson> {
        self.lessons
            .remove(&id)
            .ok_or(TimetableError::LessonNotFound(id))
    }

    /// Grid for a raw week number as received from a request.
    pub fn grid(&self, week: u32) -> ScheduleGrid {
        let class_groups: Vec<ClassGroup> = self.class_groups().into_iter().cloned().collect();
        ScheduleGridBuilder::new(&self.lesson_times).build(self.lessons.values(), week, &class_groups)
    }

    /// Owned copies of every record, in storage order, for persistence.
    pub fn to_parts(&self) -> (Vec<ClassGroup>, Vec<Subject>, Vec<Lesson>) {
        (
            self.class_groups.values().cloned().collect(),
            self.subjects.values().cloned().collect(),
            self.lessons.values().cloned().collect(),
        )
    }

    fn group_name(&self, lesson: &Lesson) -> &str {
        self.class_groups
            .get(&lesson.class_group_id)
            .map(|g| g.name.as_str())
            .unwrap_or("")
    }
}
