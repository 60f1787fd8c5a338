use mcl_schedule::{
    ClassGroup, Day, Lesson, LessonFilter, LessonValidationError, PairNumber, PairPart, SubGroup,
    Subject, Timetable, TimetableError, Week,
};

fn lesson(id: u32, group: u32, day: Day, pair: u8, part: PairPart, subject: u32) -> Lesson {
    Lesson::new(
        id,
        group,
        day,
        PairNumber::new(pair).unwrap(),
        part,
        Subject::new(subject, ""),
    )
}

fn sample_timetable() -> Timetable {
    let mut timetable = Timetable::new();
    timetable
        .upsert_class_group(ClassGroup::new(1, "10-A"))
        .unwrap();
    timetable
        .upsert_class_group(ClassGroup::new(2, "9-B"))
        .unwrap();
    timetable.upsert_subject(Subject::new(1, "Math")).unwrap();
    timetable.upsert_subject(Subject::new(2, "History")).unwrap();
    timetable
        .upsert_lesson(lesson(1, 1, Day::Monday, 1, PairPart::Full, 1))
        .unwrap();
    let mut history = lesson(2, 2, Day::Monday, 1, PairPart::Full, 2);
    history.cabinet = "Room 12".into();
    timetable.upsert_lesson(history).unwrap();
    timetable
}

#[test]
fn lessons_resolve_subject_names_from_catalog() {
    let timetable = sample_timetable();
    assert_eq!(timetable.find_lesson(1).unwrap().subject.name, "Math");
    assert_eq!(timetable.lesson_count(), 2);
    assert_eq!(timetable.next_lesson_id(), 3);
}

#[test]
fn lesson_for_unknown_group_is_rejected() {
    let mut timetable = sample_timetable();
    let err = timetable
        .upsert_lesson(lesson(3, 99, Day::Monday, 2, PairPart::Full, 1))
        .unwrap_err();
    assert!(matches!(
        err,
        TimetableError::Validation(LessonValidationError::UnknownClassGroup {
            class_group_id: 99,
            ..
        })
    ));
}

#[test]
fn lesson_for_unknown_subject_is_rejected() {
    let mut timetable = sample_timetable();
    let err = timetable
        .upsert_lesson(lesson(3, 1, Day::Monday, 2, PairPart::Full, 42))
        .unwrap_err();
    assert!(matches!(
        err,
        TimetableError::Validation(LessonValidationError::UnknownSubject { subject_id: 42, .. })
    ));
}

#[test]
fn overlapping_half_pair_conflicts_with_full_pair() {
    let mut timetable = sample_timetable();
    let err = timetable
        .upsert_lesson(lesson(3, 1, Day::Monday, 1, PairPart::SecondHalf, 2))
        .unwrap_err();
    match err {
        TimetableError::Validation(LessonValidationError::SlotConflict {
            existing,
            candidate,
            slot,
            ..
        }) => {
            assert_eq!(existing, 1);
            assert_eq!(candidate, 3);
            assert_eq!(slot, 2);
        }
        other => panic!("expected slot conflict, got {other:?}"),
    }
}

#[test]
fn parallel_sub_groups_and_other_weeks_do_not_conflict() {
    let mut timetable = sample_timetable();
    let mut first = lesson(10, 1, Day::Tuesday, 2, PairPart::Full, 1);
    first.sub_group = SubGroup::First;
    let mut second = lesson(11, 1, Day::Tuesday, 2, PairPart::Full, 2);
    second.sub_group = SubGroup::Second;
    let mut other_week = lesson(12, 1, Day::Monday, 1, PairPart::Full, 2);
    other_week.week = Week::Two;

    timetable.upsert_lesson(first).unwrap();
    timetable.upsert_lesson(second).unwrap();
    timetable.upsert_lesson(other_week).unwrap();
    assert_eq!(timetable.lesson_count(), 5);
}

#[test]
fn updating_a_lesson_in_place_is_not_a_conflict() {
    let mut timetable = sample_timetable();
    let mut moved = timetable.find_lesson(1).unwrap().clone();
    moved.part = PairPart::FirstHalf;
    moved.cabinet = "101".into();
    timetable.upsert_lesson(moved).unwrap();
    let stored = timetable.find_lesson(1).unwrap();
    assert_eq!(stored.part, PairPart::FirstHalf);
    assert_eq!(stored.cabinet, "101");
}

#[test]
fn deleting_a_class_group_removes_its_lessons() {
    let mut timetable = sample_timetable();
    let removed = timetable.delete_class_group(2).unwrap();
    assert_eq!(removed.name, "9-B");
    assert!(timetable.find_lesson(2).is_none());
    assert_eq!(timetable.lesson_count(), 1);
    assert!(matches!(
        timetable.delete_class_group(2),
        Err(TimetableError::ClassGroupNotFound(2))
    ));
}

#[test]
fn deleting_a_subject_removes_its_lessons() {
    let mut timetable = sample_timetable();
    timetable.delete_subject(1).unwrap();
    assert!(timetable.find_lesson(1).is_none());
    assert!(timetable.find_lesson(2).is_some());
}

#[test]
fn renaming_a_subject_updates_lessons() {
    let mut timetable = sample_timetable();
    timetable.upsert_subject(Subject::new(1, "Algebra")).unwrap();
    assert_eq!(timetable.find_lesson(1).unwrap().subject.name, "Algebra");
    let grid = timetable.grid(1);
    let cell = &grid.day(Day::Monday).unwrap().rows[&1].cells_for(1)[0];
    assert_eq!(cell.subject.name, "Algebra");
}

#[test]
fn invalid_names_and_cabinets_are_rejected() {
    let mut timetable = sample_timetable();
    assert!(timetable.upsert_class_group(ClassGroup::new(3, "  ")).is_err());
    assert!(
        timetable
            .upsert_class_group(ClassGroup::new(3, "x".repeat(21)))
            .is_err()
    );
    assert!(timetable.upsert_subject(Subject::new(3, "")).is_err());

    let mut long_cabinet = lesson(5, 1, Day::Friday, 1, PairPart::Full, 1);
    long_cabinet.cabinet = "c".repeat(21);
    assert!(matches!(
        timetable.upsert_lesson(long_cabinet),
        Err(TimetableError::Validation(
            LessonValidationError::CabinetTooLong { lesson_id: 5, .. }
        ))
    ));
}

#[test]
fn class_groups_are_listed_by_name() {
    let timetable = sample_timetable();
    let names: Vec<&str> = timetable
        .class_groups()
        .into_iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(names, vec!["10-A", "9-B"]);
    let grid = timetable.grid(1);
    assert_eq!(grid.class_groups[0].name, "10-A");
}

#[test]
fn filter_matches_week_day_group_and_text() {
    let mut timetable = sample_timetable();
    let mut friday = lesson(3, 1, Day::Friday, 3, PairPart::FirstHalf, 2);
    friday.week = Week::Two;
    timetable.upsert_lesson(friday).unwrap();

    let by_week = LessonFilter {
        week: Some(Week::Two),
        ..LessonFilter::default()
    };
    let ids: Vec<u32> = timetable.filter_lessons(&by_week).iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![3]);

    let by_group = LessonFilter {
        class_group_id: Some(1),
        day: Some(Day::Monday),
        ..LessonFilter::default()
    };
    let ids: Vec<u32> = timetable.filter_lessons(&by_group).iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1]);

    let by_text = LessonFilter {
        query: Some("room".into()),
        ..LessonFilter::default()
    };
    let ids: Vec<u32> = timetable.filter_lessons(&by_text).iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![2]);

    let by_subject = LessonFilter {
        query: Some("HIST".into()),
        ..LessonFilter::default()
    };
    let ids: Vec<u32> = timetable
        .filter_lessons(&by_subject)
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn lessons_are_listed_in_schedule_order() {
    let mut timetable = sample_timetable();
    timetable
        .upsert_lesson(lesson(3, 1, Day::Monday, 2, PairPart::SecondHalf, 2))
        .unwrap();
    timetable
        .upsert_lesson(lesson(4, 2, Day::Monday, 2, PairPart::FirstHalf, 1))
        .unwrap();
    let ids: Vec<u32> = timetable.lessons().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2, 4, 3]);
}

#[test]
fn from_parts_rejects_conflicting_lessons() {
    let groups = vec![ClassGroup::new(1, "10-A")];
    let subjects = vec![Subject::new(1, "Math")];
    let lessons = vec![
        lesson(1, 1, Day::Monday, 1, PairPart::Full, 1),
        lesson(2, 1, Day::Monday, 1, PairPart::FirstHalf, 1),
    ];
    let err = Timetable::from_parts(Default::default(), groups, subjects, lessons).unwrap_err();
    assert!(err.to_string().contains("both occupy slot 1"), "{err}");
}
