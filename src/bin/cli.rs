use std::io::{self, Write};

use mcl_schedule::{
    AppConfig, ClassGroup, Day, Lesson, LessonFilter, LessonTimes, PairNumber, PairPart,
    SubGroup, Subject, Timetable, Week, config, load_timetable_from_csv, load_timetable_from_json,
    parse_week_param, render, save_timetable_to_csv, save_timetable_to_json,
};

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show [week]                        Show the timetable grid (week 1 by default)\n  lessons [week]                     List lessons, optionally for one week\n  groups                             List class groups\n  subjects                           List subjects\n  group add <id> <name> [mode]       Upsert a class group (mode: ОЧНЕ|ДИСТ.)\n  subject add <id> <name...>         Upsert a subject (name is the rest of line)\n  lesson add <id> <group> <week> <day> <pair> <part> <subject> [cabinet] [subgroup]\n                                     Upsert a lesson (part: full|first|second, subgroup: 0|1|2)\n  delete <lesson_id>                 Delete a lesson\n  find <text>                        Search lessons by subject or cabinet\n  save <json|csv> <path>             Save the timetable\n  load <json|csv> <path>             Replace the timetable from a file\n  times [path]                       Show the bell schedule or load one from JSON\n  quit|exit                          Exit"
    );
}

fn parse_part(raw: &str) -> Option<PairPart> {
    match raw.to_ascii_lowercase().as_str() {
        "full" => Some(PairPart::Full),
        "first" => Some(PairPart::FirstHalf),
        "second" => Some(PairPart::SecondHalf),
        other => other.parse().ok().and_then(|code| PairPart::from_code(code).ok()),
    }
}

fn lessons_table(timetable: &Timetable, lessons: &[&Lesson]) -> String {
    let headers: Vec<String> = [
        "id", "week", "day", "pair", "part", "time", "group", "subject", "cabinet", "subgroup",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    let rows: Vec<Vec<String>> = lessons
        .iter()
        .map(|lesson| {
            let group = timetable
                .class_group(lesson.class_group_id)
                .map(|g| g.name.clone())
                .unwrap_or_default();
            vec![
                lesson.id.to_string(),
                lesson.week.to_string(),
                lesson.day.to_string(),
                lesson.pair.roman().to_string(),
                lesson.part.label().to_string(),
                lesson.time(timetable.lesson_times()),
                group,
                lesson.subject.name.clone(),
                lesson.cabinet.clone(),
                lesson.sub_group.label().to_string(),
            ]
        })
        .collect();
    render::render_text_table(&headers, &rows)
}

fn groups_table(timetable: &Timetable) -> String {
    let headers = vec!["id".to_string(), "name".to_string(), "mode".to_string()];
    let rows: Vec<Vec<String>> = timetable
        .class_groups()
        .into_iter()
        .map(|g| vec![g.id.to_string(), g.name.clone(), g.study_mode.as_str().to_string()])
        .collect();
    render::render_text_table(&headers, &rows)
}

fn subjects_table(timetable: &Timetable) -> String {
    let headers = vec!["id".to_string(), "name".to_string()];
    let rows: Vec<Vec<String>> = timetable
        .subjects()
        .into_iter()
        .map(|s| vec![s.id.to_string(), s.name.clone()])
        .collect();
    render::render_text_table(&headers, &rows)
}

fn times_table(times: &LessonTimes) -> String {
    let headers = vec!["slot".to_string(), "pair".to_string(), "time".to_string()];
    let rows: Vec<Vec<String>> = times
        .iter()
        .map(|(slot, time)| {
            vec![
                slot.to_string(),
                mcl_schedule::pair_label(slot).unwrap_or_default().to_string(),
                time.to_string(),
            ]
        })
        .collect();
    render::render_text_table(&headers, &rows)
}

fn initial_timetable() -> Timetable {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("Config error: {}", e);
            return Timetable::new();
        }
    };
    if let Some(path) = &config.import_path {
        match load_timetable_from_json(path) {
            Ok(timetable) => return timetable,
            Err(e) => println!("Import error: {}", e),
        }
    }
    match config.lesson_times() {
        Ok(times) => Timetable::with_lesson_times(times),
        Err(e) => {
            println!("Lesson times error: {}", e);
            Timetable::new()
        }
    }
}

fn main() {
    config::init_tracing();
    let mut timetable = initial_timetable();

    println!("MCL Schedule (CLI) - type 'help' for commands\n");
    println!("{}", render::render_text(&timetable.grid(1)));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => {
                let week = parse_week_param(parts.next());
                println!("{}", render::render_text(&timetable.grid(week)));
            }
            "lessons" => {
                let week = match parts.next() {
                    Some(raw) => match raw.parse::<u8>().ok().and_then(|n| Week::try_from(n).ok()) {
                        Some(week) => Some(week),
                        None => {
                            println!("Invalid week (1-4)");
                            continue;
                        }
                    },
                    None => None,
                };
                let filter = LessonFilter {
                    week,
                    ..LessonFilter::default()
                };
                println!("{}", lessons_table(&timetable, &timetable.filter_lessons(&filter)));
            }
            "groups" => println!("{}", groups_table(&timetable)),
            "subjects" => println!("{}", subjects_table(&timetable)),
            "group" => {
                let sub = parts.next();
                let id_s = parts.next();
                let name = parts.next();
                let mode_s = parts.next();
                match (sub, id_s, name) {
                    (Some("add"), Some(id_s), Some(name)) => {
                        let id: u32 = match id_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                        let mut group = ClassGroup::new(id, name);
                        if let Some(mode_s) = mode_s {
                            group.study_mode = match mode_s.parse() { Ok(m) => m, Err(e) => { println!("Error: {}", e); continue; } };
                        }
                        match timetable.upsert_class_group(group) {
                            Ok(_) => println!("Class group {} saved.\n{}", id, groups_table(&timetable)),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: group add <id> <name> [mode]"),
                }
            }
            "subject" => {
                let sub = parts.next();
                let id_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (sub, id_s, !rest.is_empty()) {
                    (Some("add"), Some(id_s), true) => {
                        let id: u32 = match id_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                        match timetable.upsert_subject(Subject::new(id, rest.join(" "))) {
                            Ok(_) => println!("Subject {} saved.\n{}", id, subjects_table(&timetable)),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: subject add <id> <name...>"),
                }
            }
            "lesson" => {
                let args: Vec<&str> = parts.collect();
                if args.first() != Some(&"add") || args.len() < 8 {
                    println!("Usage: lesson add <id> <group> <week> <day> <pair> <part> <subject> [cabinet] [subgroup]");
                    continue;
                }
                let id: u32 = match args[1].parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                let group_id: u32 = match args[2].parse() { Ok(v) => v, Err(_) => { println!("Invalid group id"); continue; } };
                let week = match args[3].parse::<u8>().ok().and_then(|n| Week::try_from(n).ok()) { Some(w) => w, None => { println!("Invalid week (1-4)"); continue; } };
                let day: Day = match args[4].parse() { Ok(d) => d, Err(e) => { println!("Error: {}", e); continue; } };
                let pair = match args[5].parse::<u8>().map_err(|e| e.to_string()).and_then(|n| PairNumber::new(n).map_err(|e| e.to_string())) { Ok(p) => p, Err(e) => { println!("Error: {}", e); continue; } };
                let part = match parse_part(args[6]) { Some(p) => p, None => { println!("Invalid part (full|first|second)"); continue; } };
                let subject_id: u32 = match args[7].parse() { Ok(v) => v, Err(_) => { println!("Invalid subject id"); continue; } };
                let sub_group = match args.get(9) {
                    Some(raw) => match raw.parse::<u8>().ok().and_then(|n| SubGroup::from_code(n).ok()) { Some(s) => s, None => { println!("Invalid subgroup (0|1|2)"); continue; } },
                    None => SubGroup::WholeClass,
                };

                let mut lesson = Lesson::new(id, group_id, day, pair, part, Subject::new(subject_id, ""));
                lesson.week = week;
                lesson.cabinet = args.get(8).map(|c| c.to_string()).unwrap_or_default();
                lesson.sub_group = sub_group;
                match timetable.upsert_lesson(lesson) {
                    Ok(_) => {
                        let summary = timetable
                            .find_lesson(id)
                            .zip(timetable.class_group(group_id))
                            .map(|(lesson, group)| lesson.describe(group))
                            .unwrap_or_default();
                        println!("Lesson {} saved: {}", id, summary);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => match parts.next().map(str::parse::<u32>) {
                Some(Ok(id)) => match timetable.delete_lesson(id) {
                    Ok(_) => println!("Deleted lesson {}.", id),
                    Err(e) => println!("Error: {}", e),
                },
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: delete <lesson_id>"),
            },
            "find" => {
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    println!("Usage: find <text>");
                    continue;
                }
                let filter = LessonFilter {
                    query: Some(rest.join(" ")),
                    ..LessonFilter::default()
                };
                let found = timetable.filter_lessons(&filter);
                if found.is_empty() {
                    println!("No lessons match.");
                } else {
                    println!("{}", lessons_table(&timetable, &found));
                }
            }
            "save" | "load" => {
                let format = parts.next();
                let path = parts.next();
                match (format, path) {
                    (Some(format @ ("json" | "csv")), Some(path)) => {
                        if cmd == "save" {
                            let res = if format == "json" {
                                save_timetable_to_json(&timetable, path)
                            } else {
                                save_timetable_to_csv(&timetable, path)
                            };
                            match res {
                                Ok(_) => println!("Timetable saved to {}.", path),
                                Err(e) => println!("Save error: {}", e),
                            }
                        } else {
                            let res = if format == "json" {
                                load_timetable_from_json(path)
                            } else {
                                load_timetable_from_csv(path)
                            };
                            match res {
                                Ok(loaded) => {
                                    timetable = loaded;
                                    println!("Timetable loaded from {}.", path);
                                }
                                Err(e) => println!("Load error: {}", e),
                            }
                        }
                    }
                    _ => println!("Usage: {} <json|csv> <path>", cmd),
                }
            }
            "times" => match parts.next() {
                Some(path) => match LessonTimes::load_from_json(path) {
                    Ok(times) => {
                        timetable.set_lesson_times(times);
                        println!("Lesson times loaded.\n{}", times_table(timetable.lesson_times()));
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("{}", times_table(timetable.lesson_times())),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
