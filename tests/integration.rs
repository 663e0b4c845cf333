//! Integration tests for the communistopoly driver binary.
//!
//! Tests full protocol sessions by spawning the engine process, sending
//! commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_communistopoly");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start communistopoly");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

const NEWGAME: &str = "newgame Stalin:adjudicator Ivan:hammer Olga:sickle Boris:redstar";

#[test]
fn isready_response() {
    let lines = run_engine(&["isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["foobar", "nonsense", "roll 1", "quit"]);
    assert!(lines.is_empty());
}

#[test]
fn empty_lines_are_ignored() {
    let lines = run_engine(&["", "  ", "isready", "quit"]);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0], "readyok");
}

#[test]
fn setoption_is_silent_unless_rejected() {
    let lines = run_engine(&[
        "setoption name gulag_fee value 300",
        "setoption name seed value 9",
        "setoption name nonsense value 1",
        "isready",
        "quit",
    ]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("error "));
    assert_eq!(lines[1], "readyok");
}

#[test]
fn commands_before_newgame_are_errors() {
    let lines = run_engine(&["roll", "status", "quit"]);
    assert_eq!(lines, vec!["error no game in progress".to_string(), "error no game in progress".to_string()]);
}

#[test]
fn newgame_announces_the_first_turn() {
    let lines = run_engine(&[NEWGAME, "quit"]);
    assert_eq!(lines[0], "log The Revolution begins.");
    assert_eq!(lines.last().unwrap(), "phase pre-roll current #1 round 1");
}

#[test]
fn invalid_setup_is_rejected() {
    let lines = run_engine(&["newgame Ivan:hammer Olga:sickle", "quit"]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("error "));
}

#[test]
fn roll_buy_and_pass_the_turn() {
    let lines = run_engine(&[NEWGAME, "roll 2 4", "buy yes", "worth 1", "endturn", "quota 6 2", "quit"]);

    assert!(lines.contains(&"dice 2 4".to_string()));
    assert!(lines.contains(&"phase awaiting purchase current #1 round 1".to_string()));
    assert!(lines.contains(&"log Ivan takes custody of Kolkhoz No. 1 for 100 rubles.".to_string()));
    assert!(lines.contains(&"phase post-turn current #1 round 1".to_string()));
    assert!(lines.contains(&"worth 1500".to_string()));
    assert!(lines.contains(&"log It is Olga's turn.".to_string()));
    assert!(lines.contains(&"phase pre-roll current #2 round 1".to_string()));
    assert_eq!(lines.last().unwrap(), "quota 6");
}

#[test]
fn wrong_decision_reports_an_error() {
    let lines = run_engine(&[NEWGAME, "roll 2 4", "pay", "quit"]);
    assert!(lines.last().unwrap().starts_with("error "));
}

#[test]
fn status_lists_every_seat_and_the_treasury() {
    let lines = run_engine(&[NEWGAME, "status", "quit"]);
    let status: Vec<&String> = lines.iter().filter(|l| l.starts_with("player ")).collect();
    assert_eq!(status.len(), 4);
    assert!(status[1].contains("hammer"));
    assert!(status[3].contains("rank party-member"));
    assert!(lines.contains(&"treasury 0".to_string()));
}

#[test]
fn tribunal_session() {
    let lines = run_engine(&[
        NEWGAME,
        "targets 2",
        "accuse 2 1 hoarding nails",
        "advance",
        "advance",
        "witness 3 accuser",
        "advance",
        "judge guilty",
        "quit",
    ]);
    assert!(lines.contains(&"targets #1 #3".to_string()));
    assert!(lines.contains(&"tribunal judgement".to_string()));
    assert!(lines.iter().any(|l| l.starts_with("log The tribunal of Olga against Ivan returns: guilty")));
    assert!(!lines.iter().any(|l| l.starts_with("error ")));
}

#[test]
fn gulag_session_pays_for_release() {
    let lines = run_engine(&[NEWGAME, "decree 2 gulag", "roll 1 2", "buy no", "endturn", "gulag pay", "quit"]);
    assert!(lines.iter().any(|l| l.contains("Olga pays 500 rubles for release.")));
    assert_eq!(lines.last().unwrap(), "phase pre-roll current #2 round 1");
}

#[test]
fn save_and_load_round_trip() {
    let lines = run_engine(&[NEWGAME, "roll 2 4", "buy yes", "save", "quit"]);
    let snapshot = lines.iter().find_map(|l| l.strip_prefix("snapshot ")).unwrap().to_string();

    let load = format!("load {snapshot}");
    let lines = run_engine(&[&load, "worth 1", "save", "quit"]);
    assert_eq!(lines[0], "phase post-turn current #1 round 1");
    assert!(lines.contains(&"worth 1500".to_string()));
    let again = lines.iter().find_map(|l| l.strip_prefix("snapshot ")).unwrap();
    assert_eq!(again, snapshot);
}

#[test]
fn bad_snapshot_is_rejected() {
    let lines = run_engine(&["load {\"version\":99,\"state\":{}}", "quit"]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("error "));
}
