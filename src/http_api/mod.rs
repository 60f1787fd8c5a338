use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    ClassGroup, Day, Lesson, LessonFilter, LessonTimes, LessonValidationError, PersistenceError,
    ScheduleGrid, Subject, Timetable, TimetableError, TimetableStore, Week, parse_week_param,
    render,
};

pub type SharedStore = Arc<dyn TimetableStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    timetable: Arc<RwLock<Timetable>>,
    store: Option<SharedStore>,
}

impl AppState {
    pub fn new(timetable: Timetable) -> Self {
        Self {
            timetable: Arc::new(RwLock::new(timetable)),
            store: None,
        }
    }

    /// Persist every successful mutation to `store`.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    fn timetable(&self) -> Arc<RwLock<Timetable>> {
        self.timetable.clone()
    }

    /// Applies `change` under the write lock. With a store configured the change runs on
    /// a copy that replaces the live timetable only once it has been saved.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Timetable) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut guard = self.timetable.write();
        let Some(store) = &self.store else {
            return change(&mut *guard);
        };
        let mut next = (*guard).clone();
        let output = change(&mut next)?;
        store.save_timetable(&next)?;
        *guard = next;
        Ok(output)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<TimetableError> for ApiError {
    fn from(value: TimetableError) -> Self {
        match value {
            TimetableError::Validation(err @ LessonValidationError::SlotConflict { .. }) => {
                ApiError::Conflict(err.to_string())
            }
            TimetableError::Validation(err) => ApiError::Invalid(err.to_string()),
            err @ (TimetableError::ClassGroupNotFound(_)
            | TimetableError::SubjectNotFound(_)
            | TimetableError::LessonNotFound(_)) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        tracing::error!(error = %value, "failed to persist timetable");
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    week: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LessonQuery {
    week: Option<String>,
    day: Option<String>,
    class_group: Option<String>,
    q: Option<String>,
}

impl LessonQuery {
    fn into_filter(self) -> Result<LessonFilter, ApiError> {
        let week = match non_empty(self.week.as_deref()) {
            Some(raw) => {
                let number = raw
                    .parse::<u8>()
                    .map_err(|_| ApiError::invalid(format!("invalid week '{raw}'")))?;
                Some(Week::try_from(number).map_err(|err| ApiError::invalid(err.to_string()))?)
            }
            None => None,
        };
        let day = non_empty(self.day.as_deref())
            .map(str::parse::<Day>)
            .transpose()
            .map_err(|err| ApiError::invalid(err.to_string()))?;
        let class_group_id = non_empty(self.class_group.as_deref())
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| ApiError::invalid(format!("invalid class_group '{raw}'")))
            })
            .transpose()?;
        Ok(LessonFilter {
            week,
            day,
            class_group_id,
            query: self.q,
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule", get(get_schedule))
        .route("/schedule.html", get(get_schedule_html))
        .route("/lesson-times", get(get_lesson_times))
        .route(
            "/class-groups",
            get(list_class_groups).post(create_class_group),
        )
        .route("/class-groups/:id", delete(delete_class_group))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/:id", delete(delete_subject))
        .route("/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/lessons/:id",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "schedule HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn build_grid(state: &AppState, query: ScheduleQuery) -> ScheduleGrid {
    let week = parse_week_param(query.week.as_deref());
    let timetable = state.timetable();
    let guard = timetable.read();
    guard.grid(week)
}

async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Json<ScheduleGrid> {
    Json(build_grid(&state, query))
}

async fn get_schedule_html(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Html<String> {
    Html(render::render_html(&build_grid(&state, query)))
}

async fn get_lesson_times(State(state): State<AppState>) -> Json<LessonTimes> {
    let timetable = state.timetable();
    let times = timetable.read().lesson_times().clone();
    Json(times)
}

async fn list_class_groups(State(state): State<AppState>) -> Json<Vec<ClassGroup>> {
    let timetable = state.timetable();
    let groups: Vec<ClassGroup> = {
        let guard = timetable.read();
        guard.class_groups().into_iter().cloned().collect()
    };
    Json(groups)
}

async fn create_class_group(
    State(state): State<AppState>,
    Json(group): Json<ClassGroup>,
) -> Result<(StatusCode, Json<ClassGroup>), ApiError> {
    state.mutate(|timetable| {
        if timetable.class_group(group.id).is_some() {
            return Err(ApiError::conflict(format!(
                "class group {} already exists",
                group.id
            )));
        }
        Ok(timetable.upsert_class_group(group.clone())?)
    })?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn delete_class_group(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.mutate(|timetable| Ok(timetable.delete_class_group(id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_subjects(State(state): State<AppState>) -> Json<Vec<Subject>> {
    let timetable = state.timetable();
    let subjects: Vec<Subject> = {
        let guard = timetable.read();
        guard.subjects().into_iter().cloned().collect()
    };
    Json(subjects)
}

async fn create_subject(
    State(state): State<AppState>,
    Json(subject): Json<Subject>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    state.mutate(|timetable| {
        if timetable.subject(subject.id).is_some() {
            return Err(ApiError::conflict(format!(
                "subject {} already exists",
                subject.id
            )));
        }
        Ok(timetable.upsert_subject(subject.clone())?)
    })?;
    Ok((StatusCode::CREATED, Json(subject)))
}

async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.mutate(|timetable| Ok(timetable.delete_subject(id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_lessons(
    State(state): State<AppState>,
    Query(query): Query<LessonQuery>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    let filter = query.into_filter()?;
    let timetable = state.timetable();
    let lessons: Vec<Lesson> = {
        let guard = timetable.read();
        guard
            .filter_lessons(&filter)
            .into_iter()
            .cloned()
            .collect()
    };
    Ok(Json(lessons))
}

async fn get_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<u32>,
) -> Result<Json<Lesson>, ApiError> {
    let timetable = state.timetable();
    let result = {
        let guard = timetable.read();
        guard.find_lesson(lesson_id).cloned()
    };
    match result {
        Some(lesson) => Ok(Json(lesson)),
        None => Err(ApiError::not_found(format!("lesson {lesson_id} not found"))),
    }
}

async fn create_lesson(
    State(state): State<AppState>,
    Json(lesson): Json<Lesson>,
) -> Result<(StatusCode, Json<Lesson>), ApiError> {
    let created = state.mutate(|timetable| {
        if timetable.find_lesson(lesson.id).is_some() {
            return Err(ApiError::conflict(format!(
                "lesson {} already exists",
                lesson.id
            )));
        }
        let id = lesson.id;
        timetable.upsert_lesson(lesson)?;
        timetable
            .find_lesson(id)
            .cloned()
            .ok_or_else(|| ApiError::internal("lesson not found after creation"))
    })?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<u32>,
    Json(lesson): Json<Lesson>,
) -> Result<Json<Lesson>, ApiError> {
    if lesson.id != lesson_id {
        return Err(ApiError::invalid(
            "lesson id in payload does not match path parameter",
        ));
    }
    let updated = state.mutate(|timetable| {
        if timetable.find_lesson(lesson_id).is_none() {
            return Err(ApiError::not_found(format!("lesson {lesson_id} not found")));
        }
        timetable.upsert_lesson(lesson)?;
        timetable
            .find_lesson(lesson_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("lesson not found after update"))
    })?;
    Ok(Json(updated))
}

async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.mutate(|timetable| Ok(timetable.delete_lesson(lesson_id)?))?;
    Ok(StatusCode::NO_CONTENT)
}
