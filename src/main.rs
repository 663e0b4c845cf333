//! Communistopoly: a rules engine for a satirical Soviet property game.
//!
//! This binary reads commands from stdin and writes responses to stdout,
//! one line per fact. Narrative log lines are prefixed `log`, failures
//! `error`, and every state-changing command ends with a `phase` line.

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use communistopoly::engine::{Engine, EngineError};
use communistopoly::protocol::parser::{parse_command, Command};
use communistopoly::resolve::Decision;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        if cmd == Command::Quit {
            break;
        }
        dispatch(&mut engine, cmd, &mut out)?;
        out.flush()?;
    }
    Ok(())
}

/// What a command prints on success.
enum Reply {
    /// A query answer; nothing changed.
    Answer(Vec<String>),
    /// State may have changed: print these, then new log lines and the phase.
    Changed(Vec<String>),
}

fn changed<T>(_: T) -> Reply {
    Reply::Changed(Vec::new())
}

/// Runs one command against the engine and writes its response.
fn dispatch<W: Write>(engine: &mut Engine, cmd: Command, out: &mut W) -> io::Result<()> {
    let result: Result<Reply, EngineError> = match cmd {
        Command::IsReady => return engine.handle_isready(out),
        Command::SetOption { name, value } => engine.set_option(name, value).map(|_| Reply::Answer(Vec::new())),
        Command::NewGame { seats } => engine.new_game(&seats).map(changed),

        Command::Roll(dice) => engine.roll(dice).map(|(d1, d2)| Reply::Changed(vec![format!("dice {d1} {d2}")])),
        Command::Buy(yes) => engine.decide(Decision::Purchase(yes)).map(changed),
        Command::Pay => engine.decide(Decision::Pay).map(changed),
        Command::Acknowledge => engine.decide(Decision::Acknowledge).map(changed),
        Command::KeepCard => engine.decide(Decision::KeepCard).map(changed),
        Command::Verdict(yes) => engine.decide(Decision::Verdict(yes)).map(changed),
        Command::Payers(payers) => engine.decide(Decision::Payers(payers)).map(changed),
        Command::Cancel => engine.cancel().map(changed),
        Command::EndTurn => engine.end_turn().map(changed),

        Command::Gulag(gulag) => engine.gulag(gulag).map(changed),

        Command::Accuse { accuser, accused, crime } => engine.accuse(accuser, accused, &crime).map(changed),
        Command::Advance => engine
            .advance_tribunal()
            .map(|phase| Reply::Changed(vec![format!("tribunal {}", phase.name())])),
        Command::Witness { witness, side } => engine.witness(witness, side).map(changed),
        Command::Judge(verdict) => engine.judge(verdict).map(changed),

        Command::Decree { player, reason } => engine.decree(player, reason).map(changed),
        Command::Execute(player) => engine.execute(player).map(changed),
        Command::Promote(player) => engine.promote(player).map(changed),

        Command::Property { action, space } => engine.property(action, space).map(changed),
        Command::PayDebt => engine.pay_debt().map(changed),
        Command::Harvest(space) => engine.harvest(space).map(changed),
        Command::Disappear(space) => engine.disappear(space).map(changed),
        Command::Ration => engine.ration().map(changed),
        Command::Purge { target, voters } => engine
            .purge(target, &voters)
            .map(|purged| Reply::Changed(vec![format!("purged {}", if purged { "yes" } else { "no" })])),

        Command::Status => engine.status_lines().map(Reply::Answer),
        Command::Targets(id) => engine.denouncement_targets(id).map(|ids| {
            let list: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            Reply::Answer(vec![format!("targets {}", list.join(" ")).trim_end().to_string()])
        }),
        Command::Quota { space, payer } => engine.quota_for(space, payer).map(|q| Reply::Answer(vec![format!("quota {q}")])),
        Command::Worth(id) => engine.net_worth(id).map(|w| Reply::Answer(vec![format!("worth {w}")])),
        Command::Abilities(id) => engine.ability_status(id).map(|s| Reply::Answer(vec![format!("abilities {s}")])),

        Command::Save => engine.snapshot().map(|json| Reply::Answer(vec![format!("snapshot {json}")])),
        Command::Load { json } => engine.restore(&json).map(changed),

        Command::Quit => Ok(Reply::Answer(Vec::new())),
    };

    match result {
        Ok(Reply::Answer(lines)) => {
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
        Ok(Reply::Changed(lines)) => {
            for line in lines {
                writeln!(out, "{line}")?;
            }
            for entry in engine.drain_log() {
                writeln!(out, "log {}", entry.message)?;
            }
            writeln!(out, "{}", engine.phase_line())?;
        }
        Err(e) => {
            // Keep the log cursor current even on rejection.
            engine.drain_log();
            writeln!(out, "error {e}")?;
        }
    }
    Ok(())
}
