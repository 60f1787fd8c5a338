#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "sqlite")]
    use std::sync::Arc;

    use mcl_schedule::{AppConfig, Timetable, config, http_api, load_timetable_from_json};

    config::init_tracing();
    let config = AppConfig::from_env()?;

    let mut timetable = match &config.import_path {
        Some(path) => {
            let timetable = load_timetable_from_json(path)?;
            tracing::info!(path = %path.display(), lessons = timetable.lesson_count(), "imported timetable");
            timetable
        }
        None => Timetable::with_lesson_times(config.lesson_times()?),
    };
    if config.lesson_times_path.is_some() {
        timetable.set_lesson_times(config.lesson_times()?);
    }

    #[cfg(feature = "sqlite")]
    let store = match &config.db_path {
        Some(db_path) => {
            use mcl_schedule::{SqliteTimetableStore, TimetableStore};

            let store = SqliteTimetableStore::new(db_path)?;
            match store.load_timetable()? {
                Some(stored) if config.import_path.is_none() => timetable = stored,
                _ => store.save_timetable(&timetable)?,
            }
            Some(Arc::new(store))
        }
        None => None,
    };
    #[cfg(not(feature = "sqlite"))]
    if config.db_path.is_some() {
        tracing::warn!("MCL_SCHEDULE_DB is set but the `sqlite` feature is disabled; changes stay in memory");
    }

    #[allow(unused_mut)]
    let mut state = http_api::AppState::new(timetable);
    #[cfg(feature = "sqlite")]
    if let Some(store) = store {
        state = state.with_store(store);
    }

    println!("mcl-schedule HTTP API listening on http://{}", config.http_addr);
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
