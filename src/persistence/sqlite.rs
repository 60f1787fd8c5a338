use super::{PersistenceResult, TimetableStore};
use crate::lesson::{ClassGroup, Day, Lesson, PairNumber, PairPart, SubGroup, Subject, Week};
use crate::lesson_times::{LessonTimes, LessonTimesConfig};
use crate::Timetable;
use rusqlite::{Connection, Row, params};
use std::sync::Mutex;

/// Raw lesson columns: id, class group, week, day, pair, part, subject, cabinet, sub-group.
type LessonRow = (u32, u32, u8, u8, u8, u8, Subject, String, u8);

pub struct SqliteTimetableStore {
    connection: Mutex<Connection>,
}

impl SqliteTimetableStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path.as_ref())?;
        Self::initialize_schema(&connection)?;
        tracing::info!(path = %path.as_ref().display(), "opened sqlite timetable store");
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS lesson_times (
                slot INTEGER PRIMARY KEY CHECK (slot BETWEEN 1 AND 8),
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS class_groups (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                study_mode TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS lessons (
                id INTEGER PRIMARY KEY,
                class_group_id INTEGER NOT NULL REFERENCES class_groups(id) ON DELETE CASCADE,
                week INTEGER NOT NULL,
                day INTEGER NOT NULL,
                pair INTEGER NOT NULL,
                part INTEGER NOT NULL,
                subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
                cabinet TEXT NOT NULL DEFAULT '',
                sub_group INTEGER NOT NULL DEFAULT 0
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_lesson_times(tx: &rusqlite::Transaction, times: &LessonTimes) -> PersistenceResult<()> {
        tx.execute("DELETE FROM lesson_times", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO lesson_times (slot, start_time, end_time) VALUES (?1, ?2, ?3)")?;
        for (slot, time) in times.iter() {
            stmt.execute(params![
                slot,
                time.start.format("%H:%M").to_string(),
                time.end.format("%H:%M").to_string()
            ])?;
        }
        Ok(())
    }

    fn save_records(tx: &rusqlite::Transaction, timetable: &Timetable) -> PersistenceResult<()> {
        tx.execute("DELETE FROM lessons", [])?;
        tx.execute("DELETE FROM class_groups", [])?;
        tx.execute("DELETE FROM subjects", [])?;

        let (class_groups, subjects, lessons) = timetable.to_parts();
        let mut stmt =
            tx.prepare("INSERT INTO class_groups (id, name, study_mode) VALUES (?1, ?2, ?3)")?;
        for group in &class_groups {
            stmt.execute(params![group.id, group.name, group.study_mode.as_str()])?;
        }
        let mut stmt = tx.prepare("INSERT INTO subjects (id, name) VALUES (?1, ?2)")?;
        for subject in &subjects {
            stmt.execute(params![subject.id, subject.name])?;
        }
        let mut stmt = tx.prepare(
            "INSERT INTO lessons (id, class_group_id, week, day, pair, part, subject_id, cabinet, sub_group) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for lesson in &lessons {
            stmt.execute(params![
                lesson.id,
                lesson.class_group_id,
                lesson.week.number(),
                lesson.day.code(),
                lesson.pair.get(),
                lesson.part.code(),
                lesson.subject.id,
                lesson.cabinet,
                lesson.sub_group.code()
            ])?;
        }
        Ok(())
    }

    fn load_lesson_times(conn: &Connection) -> PersistenceResult<Option<LessonTimes>> {
        let mut stmt =
            conn.prepare("SELECT start_time, end_time FROM lesson_times ORDER BY slot ASC")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut slots = Vec::new();
        for row in rows {
            slots.push(row?);
        }
        if slots.is_empty() {
            return Ok(None);
        }
        Ok(Some(LessonTimes::from_config(&LessonTimesConfig::new(slots))?))
    }

    fn lesson_from_row(row: &Row<'_>) -> rusqlite::Result<LessonRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            Subject::new(row.get(6)?, row.get::<_, String>(7)?),
            row.get(8)?,
            row.get(9)?,
        ))
    }
}

impl TimetableStore for SqliteTimetableStore {
    fn save_timetable(&self, timetable: &Timetable) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        Self::save_lesson_times(&tx, timetable.lesson_times())?;
        Self::save_records(&tx, timetable)?;
        tx.commit()?;
        tracing::debug!(lessons = timetable.lesson_count(), "saved timetable to sqlite");
        Ok(())
    }

    fn load_timetable(&self) -> PersistenceResult<Option<Timetable>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let Some(lesson_times) = Self::load_lesson_times(&conn)? else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT id, name, study_mode FROM class_groups ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut class_groups = Vec::new();
        for row in rows {
            let (id, name, study_mode) = row?;
            class_groups.push(ClassGroup {
                id,
                name,
                study_mode: study_mode.parse()?,
            });
        }

        let mut stmt = conn.prepare("SELECT id, name FROM subjects ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| Ok(Subject::new(row.get(0)?, row.get::<_, String>(1)?)))?;
        let mut subjects = Vec::new();
        for row in rows {
            subjects.push(row?);
        }

        let mut stmt = conn.prepare(
            "SELECT l.id, l.class_group_id, l.week, l.day, l.pair, l.part, s.id, s.name, l.cabinet, l.sub_group \
             FROM lessons l JOIN subjects s ON s.id = l.subject_id ORDER BY l.id ASC",
        )?;
        let rows = stmt.query_map([], Self::lesson_from_row)?;
        let mut lessons = Vec::new();
        for row in rows {
            let (id, class_group_id, week, day, pair, part, subject, cabinet, sub_group) = row?;
            let mut lesson = Lesson::new(
                id,
                class_group_id,
                Day::from_code(day)?,
                PairNumber::new(pair)?,
                PairPart::from_code(part)?,
                subject,
            );
            lesson.week = Week::try_from(week)?;
            lesson.cabinet = cabinet;
            lesson.sub_group = SubGroup::from_code(sub_group)?;
            lessons.push(lesson);
        }

        let timetable = Timetable::from_parts(lesson_times, class_groups, subjects, lessons)?;
        tracing::debug!(lessons = timetable.lesson_count(), "loaded timetable from sqlite");
        Ok(Some(timetable))
    }
}
