use mcl_schedule::{
    ClassGroup, Day, Lesson, LessonTimes, PairNumber, PairPart, StudyMode, SubGroup, Subject,
    Week,
};

fn math(part: PairPart) -> Lesson {
    Lesson::new(
        7,
        1,
        Day::Thursday,
        PairNumber::new(2).unwrap(),
        part,
        Subject::new(3, "Math"),
    )
}

#[test]
fn lesson_defaults_to_whole_class_in_first_week() {
    let lesson = math(PairPart::Full);
    assert_eq!(lesson.week, Week::One);
    assert_eq!(lesson.sub_group, SubGroup::WholeClass);
    assert!(lesson.cabinet.is_empty());
}

#[test]
fn lesson_time_covers_its_slots() {
    let times = LessonTimes::default();
    assert_eq!(math(PairPart::Full).time(&times), "10:45–12:20");
    assert_eq!(math(PairPart::FirstHalf).time(&times), "10:45–11:30");
    assert_eq!(math(PairPart::SecondHalf).time(&times), "11:35–12:20");
}

#[test]
fn describe_names_group_day_pair_and_subject() {
    let group = ClassGroup::new(1, "10-A");
    assert_eq!(
        math(PairPart::FirstHalf).describe(&group),
        "10-A (ОЧНЕ) - Четвер - II пара (1-ша половина) - Math"
    );
}

#[test]
fn lesson_json_uses_readable_codes() {
    let mut lesson = math(PairPart::SecondHalf);
    lesson.week = Week::Three;
    lesson.sub_group = SubGroup::Second;
    lesson.cabinet = "204".into();
    let value = serde_json::to_value(&lesson).unwrap();
    assert_eq!(value["day"], "thursday");
    assert_eq!(value["pair"], 2);
    assert_eq!(value["part"], "second_half");
    assert_eq!(value["week"], 3);
    assert_eq!(value["sub_group"], "second");

    let back: Lesson = serde_json::from_value(value).unwrap();
    assert_eq!(back, lesson);
}

#[test]
fn lesson_json_with_invalid_pair_is_rejected() {
    let raw = r#"{"id": 1, "class_group_id": 1, "day": "monday", "pair": 5, "subject": {"id": 1}}"#;
    let err = serde_json::from_str::<Lesson>(raw).unwrap_err();
    assert!(err.to_string().contains("invalid lesson slot"), "{err}");
}

#[test]
fn lesson_json_fills_optional_fields() {
    let raw = r#"{"id": 1, "class_group_id": 2, "day": "friday", "pair": 4, "subject": {"id": 9}}"#;
    let lesson: Lesson = serde_json::from_str(raw).unwrap();
    assert_eq!(lesson.part, PairPart::Full);
    assert_eq!(lesson.week, Week::One);
    assert_eq!(lesson.subject.id, 9);
    assert!(lesson.subject.name.is_empty());
    assert_eq!(lesson.slots(), vec![7, 8]);
}

#[test]
fn week_and_pair_labels() {
    assert_eq!(Week::Four.label(), "IV тиждень");
    assert_eq!(PairNumber::new(3).unwrap().label(), "III пара");
    assert_eq!(PairNumber::containing_slot(6), PairNumber::new(3).ok());
    assert_eq!(PairNumber::containing_slot(0), None);
}

#[test]
fn study_mode_parses_labels() {
    assert_eq!("ДИСТ.".parse::<StudyMode>().unwrap(), StudyMode::Distance);
    assert_eq!("full_time".parse::<StudyMode>().unwrap(), StudyMode::FullTime);
    assert!("evening".parse::<StudyMode>().is_err());
}
