use crate::lesson::{ClassGroup, Day, Lesson, Subject, SubGroup, Week};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub const MAX_CABINET_LEN: usize = 20;
pub const MAX_CLASS_GROUP_NAME_LEN: usize = 20;
pub const MAX_SUBJECT_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LessonValidationError {
    #[error("invalid lesson slot: pair number {0} is outside 1..=4")]
    InvalidPairNumber(u8),
    #[error("invalid lesson slot: pair part code {0} (expected 0, 1 or 2)")]
    InvalidPairPart(u8),
    #[error("invalid week {0} (must be between 1 and 4)")]
    InvalidWeek(u8),
    #[error("invalid day code {0} (must be between 1 and 5)")]
    InvalidDay(u8),
    #[error("unknown day '{0}'")]
    UnknownDay(String),
    #[error("invalid sub-group code {0} (expected 0, 1 or 2)")]
    InvalidSubGroup(u8),
    #[error("invalid study mode '{0}'")]
    InvalidStudyMode(String),
    #[error("class group {id} requires a name of 1..={max} characters (got {len})")]
    InvalidClassGroupName { id: u32, len: usize, max: usize },
    #[error("subject {id} requires a name of 1..={max} characters (got {len})")]
    InvalidSubjectName { id: u32, len: usize, max: usize },
    #[error("lesson {lesson_id} cabinet '{cabinet}' exceeds {max} characters")]
    CabinetTooLong {
        lesson_id: u32,
        cabinet: String,
        max: usize,
    },
    #[error("duplicate class group id {0}")]
    DuplicateClassGroup(u32),
    #[error("duplicate subject id {0}")]
    DuplicateSubject(u32),
    #[error("duplicate lesson id {0}")]
    DuplicateLesson(u32),
    #[error("lesson {lesson_id} references unknown class group {class_group_id}")]
    UnknownClassGroup { lesson_id: u32, class_group_id: u32 },
    #[error("lesson {lesson_id} references unknown subject {subject_id}")]
    UnknownSubject { lesson_id: u32, subject_id: u32 },
    #[error(
        "lessons {existing} and {candidate} both occupy slot {slot} on {day} of week {week} \
         for class group {class_group_id} ({sub_group})"
    )]
    SlotConflict {
        existing: u32,
        candidate: u32,
        week: u8,
        day: Day,
        slot: u8,
        class_group_id: u32,
        sub_group: SubGroup,
    },
}

pub fn validate_class_group(group: &ClassGroup) -> Result<(), LessonValidationError> {
    let len = group.name.trim().chars().count();
    if len == 0 || group.name.chars().count() > MAX_CLASS_GROUP_NAME_LEN {
        return Err(LessonValidationError::InvalidClassGroupName {
            id: group.id,
            len: group.name.chars().count(),
            max: MAX_CLASS_GROUP_NAME_LEN,
        });
    }
    Ok(())
}

pub fn validate_subject(subject: &Subject) -> Result<(), LessonValidationError> {
    let len = subject.name.trim().chars().count();
    if len == 0 || subject.name.chars().count() > MAX_SUBJECT_NAME_LEN {
        return Err(LessonValidationError::InvalidSubjectName {
            id: subject.id,
            len: subject.name.chars().count(),
            max: MAX_SUBJECT_NAME_LEN,
        });
    }
    Ok(())
}

/// Field checks that the typed model cannot express on its own.
pub fn validate_lesson(lesson: &Lesson) -> Result<(), LessonValidationError> {
    if lesson.cabinet.chars().count() > MAX_CABINET_LEN {
        return Err(LessonValidationError::CabinetTooLong {
            lesson_id: lesson.id,
            cabinet: lesson.cabinet.clone(),
            max: MAX_CABINET_LEN,
        });
    }
    Ok(())
}

type SlotKey = (Week, Day, u8, u32, SubGroup);

/// Returns the first lesson in `existing` that shares a slot, class group and
/// sub-group with `candidate`. A lesson never conflicts with itself (same id).
pub fn find_slot_conflict<'a, I>(existing: I, candidate: &Lesson) -> Option<LessonValidationError>
where
    I: IntoIterator<Item = &'a Lesson>,
{
    let wanted: HashSet<SlotKey> = slot_keys(candidate).collect();
    for other in existing {
        if other.id == candidate.id {
            continue;
        }
        if let Some(key) = slot_keys(other).find(|key| wanted.contains(key)) {
            return Some(conflict(other.id, candidate.id, key));
        }
    }
    None
}

pub fn validate_collection(
    class_groups: &[ClassGroup],
    subjects: &[Subject],
    lessons: &[Lesson],
) -> Result<(), LessonValidationError> {
    let mut group_ids = HashSet::with_capacity(class_groups.len());
    for group in class_groups {
        if !group_ids.insert(group.id) {
            return Err(LessonValidationError::DuplicateClassGroup(group.id));
        }
        validate_class_group(group)?;
    }

    let mut subject_ids = HashSet::with_capacity(subjects.len());
    for subject in subjects {
        if !subject_ids.insert(subject.id) {
            return Err(LessonValidationError::DuplicateSubject(subject.id));
        }
        validate_subject(subject)?;
    }

    let mut lesson_ids = HashSet::with_capacity(lessons.len());
    let mut occupied: HashMap<SlotKey, u32> = HashMap::new();
    for lesson in lessons {
        if !lesson_ids.insert(lesson.id) {
            return Err(LessonValidationError::DuplicateLesson(lesson.id));
        }
        validate_lesson(lesson)?;
        if !group_ids.contains(&lesson.class_group_id) {
            return Err(LessonValidationError::UnknownClassGroup {
                lesson_id: lesson.id,
                class_group_id: lesson.class_group_id,
            });
        }
        if !subject_ids.contains(&lesson.subject.id) {
            return Err(LessonValidationError::UnknownSubject {
                lesson_id: lesson.id,
                subject_id: lesson.subject.id,
            });
        }
        for key in slot_keys(lesson) {
            if let Some(existing) = occupied.insert(key, lesson.id) {
                return Err(conflict(existing, lesson.id, key));
            }
        }
    }
    Ok(())
}

fn slot_keys(lesson: &Lesson) -> impl Iterator<Item = SlotKey> + '_ {
    lesson.slots().into_iter().map(move |slot| {
        (
            lesson.week,
            lesson.day,
            slot,
            lesson.class_group_id,
            lesson.sub_group,
        )
    })
}

fn conflict(existing: u32, candidate: u32, key: SlotKey) -> LessonValidationError {
    let (week, day, slot, class_group_id, sub_group) = key;
    LessonValidationError::SlotConflict {
        existing,
        candidate,
        week: week.number(),
        day,
        slot,
        class_group_id,
        sub_group,
    }
}
