#![cfg(feature = "sqlite")]

use mcl_schedule::{
    ClassGroup, Day, Lesson, PairNumber, PairPart, SqliteTimetableStore, SubGroup, Subject,
    Timetable, TimetableStore, Week,
};
use tempfile::NamedTempFile;

fn build_timetable() -> Timetable {
    let mut timetable = Timetable::new();
    timetable
        .upsert_class_group(ClassGroup::new(1, "10-A"))
        .unwrap();
    timetable
        .upsert_class_group(ClassGroup::new(2, "10-B"))
        .unwrap();
    timetable.upsert_subject(Subject::new(1, "Physics")).unwrap();
    timetable.upsert_subject(Subject::new(2, "Informatics")).unwrap();

    let mut physics = Lesson::new(
        1,
        1,
        Day::Thursday,
        PairNumber::new(2).unwrap(),
        PairPart::Full,
        Subject::new(1, ""),
    );
    physics.cabinet = "Lab 3".into();
    timetable.upsert_lesson(physics).unwrap();

    let mut informatics = Lesson::new(
        2,
        2,
        Day::Thursday,
        PairNumber::new(2).unwrap(),
        PairPart::FirstHalf,
        Subject::new(2, ""),
    );
    informatics.week = Week::Four;
    informatics.sub_group = SubGroup::First;
    timetable.upsert_lesson(informatics).unwrap();
    timetable
}

#[test]
fn sqlite_store_round_trip_timetable() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteTimetableStore::new(file.path()).unwrap();
    let timetable = build_timetable();

    store.save_timetable(&timetable).expect("save timetable");
    let loaded = store
        .load_timetable()
        .expect("load timetable")
        .expect("timetable exists");

    assert_eq!(loaded.to_parts(), timetable.to_parts());
    assert_eq!(loaded.lesson_times(), timetable.lesson_times());
    assert_eq!(loaded.grid(4), timetable.grid(4));
    assert_eq!(loaded.find_lesson(1).unwrap().subject.name, "Physics");
}

#[test]
fn empty_store_has_no_timetable() {
    let store = SqliteTimetableStore::in_memory().unwrap();
    assert!(store.load_timetable().unwrap().is_none());
}

#[test]
fn saving_replaces_previous_contents() {
    let store = SqliteTimetableStore::in_memory().unwrap();
    let mut timetable = build_timetable();
    store.save_timetable(&timetable).unwrap();

    timetable.delete_class_group(1).unwrap();
    timetable.upsert_subject(Subject::new(2, "Computer Science")).unwrap();
    store.save_timetable(&timetable).unwrap();

    let loaded = store.load_timetable().unwrap().unwrap();
    assert!(loaded.class_group(1).is_none());
    assert_eq!(loaded.lesson_count(), 1);
    assert_eq!(
        loaded.find_lesson(2).unwrap().subject.name,
        "Computer Science"
    );
}

#[test]
fn store_reopens_from_disk() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteTimetableStore::new(file.path()).unwrap();
        store.save_timetable(&build_timetable()).unwrap();
    }
    let reopened = SqliteTimetableStore::new(file.path()).unwrap();
    let loaded = reopened.load_timetable().unwrap().unwrap();
    assert_eq!(loaded.lesson_count(), 2);
    assert_eq!(loaded.class_groups().len(), 2);
}
