use crate::Timetable;
use crate::config::ConfigError;
use crate::lesson_validation::LessonValidationError;
use crate::timetable::TimetableError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid lesson times: {0}")]
    LessonTimes(#[from] ConfigError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no timetable stored")]
    NotFound,
}

impl From<LessonValidationError> for PersistenceError {
    fn from(value: LessonValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

impl From<TimetableError> for PersistenceError {
    fn from(value: TimetableError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait TimetableStore {
    fn save_timetable(&self, timetable: &Timetable) -> PersistenceResult<()>;
    fn load_timetable(&self) -> PersistenceResult<Option<Timetable>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_timetable_from_csv, load_timetable_from_json, save_timetable_to_csv,
    save_timetable_to_json,
};
