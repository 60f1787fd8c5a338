#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

const SEED: &str = "group add 1 10-A\nsubject add 1 Math\nsubject add 2 World History\n";

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("MCL_SCHEDULE_IMPORT")
        .env_remove("MCL_SCHEDULE_LESSON_TIMES")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_shows_empty_timetable_on_start() {
    run_cli("quit\n").success().stdout(str_contains("(no lessons)"));
}

#[test]
fn cli_adds_lesson_and_shows_grid() {
    let script = format!("{SEED}lesson add 1 1 1 mon 1 full 1 204\nshow 1\nquit\n");
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Lesson 1 saved"), "{output}");
    assert!(output.contains("Понеділок"), "{output}");
    assert!(output.contains("Math (204)"), "{output}");
    assert!(output.contains("08:55–09:45"), "{output}");
    assert!(output.contains("〃"), "{output}");
}

#[test]
fn cli_reports_slot_conflicts() {
    let script =
        format!("{SEED}lesson add 1 1 1 mon 1 full 1\nlesson add 2 1 1 mon 1 second 2\nquit\n");
    run_cli(&script)
        .success()
        .stdout(str_contains("both occupy slot 2"));
}

#[test]
fn cli_rejects_pair_outside_day() {
    let script = format!("{SEED}lesson add 1 1 1 mon 5 full 1\nquit\n");
    run_cli(&script)
        .success()
        .stdout(str_contains("invalid lesson slot"));
}

#[test]
fn cli_delete_command_removes_lesson() {
    let script = format!("{SEED}lesson add 1 1 1 tue 2 first 2\ndelete 1\ndelete 1\nquit\n");
    run_cli(&script)
        .success()
        .stdout(str_contains("Deleted lesson 1."))
        .stdout(str_contains("lesson 1 not found"));
}

#[test]
fn cli_find_searches_subjects() {
    let script = format!("{SEED}lesson add 1 1 2 wed 3 full 2\nfind history\nquit\n");
    run_cli(&script)
        .success()
        .stdout(str_contains("World History"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "{SEED}lesson add 1 1 1 mon 1 full 1\nsave json {path}\nlesson add 2 1 1 fri 4 full 2\nload json {path}\nlessons\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Timetable loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Timetable loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("Math"), "{after_reload}");
    assert!(
        !after_reload.contains("П'ятниця"),
        "lesson added after save should not survive reload:\n{after_reload}"
    );
}

#[test]
fn cli_times_lists_bell_schedule() {
    run_cli("times\nquit\n")
        .success()
        .stdout(str_contains("15:15–16:00"))
        .stdout(str_contains("IV"));
}

#[test]
fn cli_unknown_command_hints_help() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}
