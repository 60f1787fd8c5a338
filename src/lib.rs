pub mod config;
pub mod grid;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod lesson;
pub mod lesson_times;
pub mod lesson_validation;
pub mod persistence;
pub mod render;
pub mod timetable;

pub use config::{AppConfig, ConfigError};
pub use grid::{DaySchedule, LessonCell, ScheduleGrid, ScheduleGridBuilder, SlotRow};
pub use lesson::{
    ClassGroup, Day, Lesson, PairNumber, PairPart, StudyMode, SubGroup, Subject, Week,
    pair_label, parse_week_param,
};
pub use lesson_times::{LessonTimes, LessonTimesConfig, SlotTime};
pub use lesson_validation::LessonValidationError;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTimetableStore;
pub use persistence::{
    PersistenceError, TimetableStore, load_timetable_from_csv, load_timetable_from_json,
    save_timetable_to_csv, save_timetable_to_json,
};
pub use timetable::{LessonFilter, Timetable, TimetableError};
