//! Driver command parser.
//!
//! Parses incoming text commands into structured `Command` variants that the
//! main loop can dispatch on. Player ids are written as seat numbers, with or
//! without a leading `#`.

use crate::board::player::{PieceType, PlayerId};
use crate::board::state::PlayerSetup;
use crate::rules::gulag::GulagReason;
use crate::rules::tribunal::{Verdict, WitnessSide};

/// A Gulag escape request from the current prisoner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GulagCommand {
    /// Roll for doubles, optionally with fixed dice.
    Roll(Option<(u8, u8)>),
    Pay,
    Card,
    Vouch(PlayerId),
    Inform(PlayerId),
    Bribe(i64),
}

/// Something the current player does to one of their properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAction {
    Mortgage,
    Unmortgage,
    Build,
    Sell,
}

/// A parsed driver command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; the driver replies `readyok`.
    IsReady,

    /// Set a rules option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a match: `newgame <name>:<piece> ...`, with piece `adjudicator`
    /// for the one seat without a piece.
    NewGame { seats: Vec<PlayerSetup> },

    /// Roll for the current player, optionally with fixed dice.
    Roll(Option<(u8, u8)>),

    Buy(bool),
    Pay,
    Acknowledge,
    KeepCard,
    /// The adjudicator's yes or no on a pending verdict.
    Verdict(bool),
    Payers(Vec<PlayerId>),
    Cancel,
    EndTurn,

    Gulag(GulagCommand),

    Accuse { accuser: PlayerId, accused: PlayerId, crime: String },
    /// Move the open tribunal to its next phase.
    Advance,
    Witness { witness: PlayerId, side: WitnessSide },
    Judge(Verdict),

    Decree { player: PlayerId, reason: GulagReason },
    Execute(PlayerId),
    Promote(PlayerId),

    Property { action: PropertyAction, space: u8 },
    PayDebt,
    Harvest(u8),
    Disappear(u8),
    Ration,
    Purge { target: PlayerId, voters: Vec<PlayerId> },

    /// One line per player.
    Status,
    Targets(PlayerId),
    Quota { space: u8, payer: PlayerId },
    Worth(PlayerId),
    Abilities(PlayerId),

    /// Print the game as a JSON snapshot.
    Save,
    /// Replace the game with a JSON snapshot.
    Load { json: String },

    /// Terminate the driver process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let (&head, args) = tokens.split_first()?;

    let cmd = match head {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "pay" => Some(Command::Pay),
        "ack" => Some(Command::Acknowledge),
        "keep" => Some(Command::KeepCard),
        "cancel" => Some(Command::Cancel),
        "endturn" => Some(Command::EndTurn),
        "advance" => Some(Command::Advance),
        "paydebt" => Some(Command::PayDebt),
        "ration" => Some(Command::Ration),
        "status" => Some(Command::Status),
        "save" => Some(Command::Save),

        "setoption" => parse_setoption(args),
        "newgame" => parse_newgame(args),
        "roll" => parse_dice(args).map(Command::Roll),
        "buy" => parse_yes_no(args.first()).map(Command::Buy),
        "verdict" => parse_yes_no(args.first()).map(Command::Verdict),
        "payers" => args.iter().map(|t| parse_player(t)).collect::<Option<Vec<_>>>().map(Command::Payers),
        "gulag" => parse_gulag(args),
        "accuse" => parse_accuse(args),
        "witness" => parse_witness(args),
        "judge" => parse_judge(args),
        "decree" => parse_decree(args),
        "execute" => one_player(args).map(Command::Execute),
        "promote" => one_player(args).map(Command::Promote),
        "mortgage" => property_action(PropertyAction::Mortgage, args),
        "unmortgage" => property_action(PropertyAction::Unmortgage, args),
        "build" => property_action(PropertyAction::Build, args),
        "sell" => property_action(PropertyAction::Sell, args),
        "harvest" => one_space(args).map(Command::Harvest),
        "disappear" => one_space(args).map(Command::Disappear),
        "purge" => parse_purge(args),
        "targets" => one_player(args).map(Command::Targets),
        "worth" => one_player(args).map(Command::Worth),
        "abilities" => one_player(args).map(Command::Abilities),
        "quota" => parse_quota(args),
        "load" => parse_load(trimmed),

        other => {
            tracing::warn!("unknown command: {other}");
            return None;
        }
    };
    if cmd.is_none() {
        tracing::warn!("malformed command: {trimmed}");
    }
    cmd
}

/// Parses a seat number such as `2` or `#2`.
pub fn parse_player(token: &str) -> Option<PlayerId> {
    token.strip_prefix('#').unwrap_or(token).parse::<u8>().ok().map(PlayerId)
}

fn one_player(args: &[&str]) -> Option<PlayerId> {
    match args {
        [id] => parse_player(id),
        _ => None,
    }
}

fn one_space(args: &[&str]) -> Option<u8> {
    match args {
        [space] => space.parse().ok(),
        _ => None,
    }
}

fn parse_yes_no(token: Option<&&str>) -> Option<bool> {
    match token.copied()? {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

/// Parses optional fixed dice. No arguments means a random roll.
fn parse_dice(args: &[&str]) -> Option<Option<(u8, u8)>> {
    match args {
        [] => Some(None),
        [d1, d2] => Some(Some((d1.parse().ok()?, d2.parse().ok()?))),
        _ => None,
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    if args.len() < 2 || args[0] != "name" {
        return None;
    }
    let value_idx = args.iter().position(|&t| t == "value");
    let (name_parts, value_parts) = match value_idx {
        Some(vi) => (&args[1..vi], &args[vi + 1..]),
        None => (&args[1..], &args[args.len()..]),
    };
    if name_parts.is_empty() {
        return None;
    }
    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
    Some(Command::SetOption { name: name_parts.join(" "), value })
}

/// Parses `newgame <name>:<piece> ...`.
fn parse_newgame(args: &[&str]) -> Option<Command> {
    if args.is_empty() {
        return None;
    }
    let seats = args
        .iter()
        .map(|seat| {
            let (name, piece) = seat.split_once(':')?;
            if name.is_empty() {
                return None;
            }
            match piece {
                "adjudicator" => Some(PlayerSetup::new(name, None)),
                other => PieceType::from_name(other).map(|p| PlayerSetup::new(name, Some(p))),
            }
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Command::NewGame { seats })
}

fn parse_gulag(args: &[&str]) -> Option<Command> {
    let (&method, rest) = args.split_first()?;
    let cmd = match (method, rest) {
        ("roll", dice) => GulagCommand::Roll(parse_dice(dice)?),
        ("pay", []) => GulagCommand::Pay,
        ("card", []) => GulagCommand::Card,
        ("vouch", [id]) => GulagCommand::Vouch(parse_player(id)?),
        ("inform", [id]) => GulagCommand::Inform(parse_player(id)?),
        ("bribe", [amount]) => GulagCommand::Bribe(amount.parse().ok()?),
        _ => return None,
    };
    Some(Command::Gulag(cmd))
}

/// Parses `accuse <accuser> <accused> <crime...>`.
fn parse_accuse(args: &[&str]) -> Option<Command> {
    match args {
        [accuser, accused, crime @ ..] if !crime.is_empty() => Some(Command::Accuse {
            accuser: parse_player(accuser)?,
            accused: parse_player(accused)?,
            crime: crime.join(" "),
        }),
        _ => None,
    }
}

fn parse_witness(args: &[&str]) -> Option<Command> {
    let [id, side] = args else {
        return None;
    };
    let side = match *side {
        "accuser" => WitnessSide::Accuser,
        "accused" => WitnessSide::Accused,
        _ => return None,
    };
    Some(Command::Witness { witness: parse_player(id)?, side })
}

fn parse_judge(args: &[&str]) -> Option<Command> {
    let verdict = match args {
        ["guilty"] => Verdict::Guilty,
        ["innocent"] => Verdict::Innocent,
        ["both"] => Verdict::BothGuilty,
        ["insufficient"] => Verdict::InsufficientEvidence,
        _ => return None,
    };
    Some(Command::Judge(verdict))
}

fn parse_decree(args: &[&str]) -> Option<Command> {
    let [id, kind] = args else {
        return None;
    };
    let reason = match *kind {
        "labour" => GulagReason::ForcedLabour,
        "gulag" => GulagReason::AdjudicatorDecree,
        _ => return None,
    };
    Some(Command::Decree { player: parse_player(id)?, reason })
}

fn property_action(action: PropertyAction, args: &[&str]) -> Option<Command> {
    one_space(args).map(|space| Command::Property { action, space })
}

/// Parses `purge <target> <voter>...`.
fn parse_purge(args: &[&str]) -> Option<Command> {
    let (target, voters) = args.split_first()?;
    Some(Command::Purge {
        target: parse_player(target)?,
        voters: voters.iter().map(|t| parse_player(t)).collect::<Option<Vec<_>>>()?,
    })
}

/// Parses `quota <space> <payer>`.
fn parse_quota(args: &[&str]) -> Option<Command> {
    let [space, payer] = args else {
        return None;
    };
    Some(Command::Quota { space: space.parse().ok()?, payer: parse_player(payer)? })
}

/// Parses `load <json>`, capturing everything after the keyword.
fn parse_load(full_line: &str) -> Option<Command> {
    let json = full_line.strip_prefix("load")?.trim();
    if json.is_empty() {
        return None;
    }
    Some(Command::Load { json: json.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_commands() {
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("endturn"), Some(Command::EndTurn));
        assert_eq!(parse_command("ack"), Some(Command::Acknowledge));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("\t"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        let cmd = parse_command("setoption name gulag_fee value 400").unwrap();
        assert_eq!(
            cmd,
            Command::SetOption {
                name: "gulag_fee".to_string(),
                value: Some("400".to_string()),
            }
        );
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption foo"), None);
    }

    #[test]
    fn parse_newgame_seats() {
        let cmd = parse_command("newgame Stalin:adjudicator Ivan:hammer Olga:sickle").unwrap();
        let Command::NewGame { seats } = cmd else {
            panic!("expected newgame");
        };
        assert_eq!(seats.len(), 3);
        assert_eq!(seats[0], PlayerSetup::new("Stalin", None));
        assert_eq!(seats[2].piece, Some(PieceType::Sickle));
        assert_eq!(parse_command("newgame Ivan:bishop"), None);
        assert_eq!(parse_command("newgame Ivan"), None);
    }

    #[test]
    fn parse_roll_with_and_without_dice() {
        assert_eq!(parse_command("roll"), Some(Command::Roll(None)));
        assert_eq!(parse_command("roll 3 4"), Some(Command::Roll(Some((3, 4)))));
        assert_eq!(parse_command("roll 3"), None);
    }

    #[test]
    fn parse_gulag_methods() {
        assert_eq!(parse_command("gulag pay"), Some(Command::Gulag(GulagCommand::Pay)));
        assert_eq!(parse_command("gulag roll 6 6"), Some(Command::Gulag(GulagCommand::Roll(Some((6, 6))))));
        assert_eq!(parse_command("gulag vouch #2"), Some(Command::Gulag(GulagCommand::Vouch(PlayerId(2)))));
        assert_eq!(parse_command("gulag bribe 250"), Some(Command::Gulag(GulagCommand::Bribe(250))));
        assert_eq!(parse_command("gulag dig"), None);
    }

    #[test]
    fn parse_tribunal_commands() {
        assert_eq!(
            parse_command("accuse 1 2 hoarding grain"),
            Some(Command::Accuse { accuser: PlayerId(1), accused: PlayerId(2), crime: "hoarding grain".to_string() })
        );
        assert_eq!(parse_command("accuse 1 2"), None);
        assert_eq!(
            parse_command("witness 3 accused"),
            Some(Command::Witness { witness: PlayerId(3), side: WitnessSide::Accused })
        );
        assert_eq!(parse_command("judge both"), Some(Command::Judge(Verdict::BothGuilty)));
    }

    #[test]
    fn parse_adjudicator_commands() {
        assert_eq!(
            parse_command("decree 2 labour"),
            Some(Command::Decree { player: PlayerId(2), reason: GulagReason::ForcedLabour })
        );
        assert_eq!(parse_command("execute 3"), Some(Command::Execute(PlayerId(3))));
        assert_eq!(
            parse_command("purge 2 1 3"),
            Some(Command::Purge { target: PlayerId(2), voters: vec![PlayerId(1), PlayerId(3)] })
        );
    }

    #[test]
    fn parse_property_actions() {
        assert_eq!(
            parse_command("build 6"),
            Some(Command::Property { action: PropertyAction::Build, space: 6 })
        );
        assert_eq!(parse_command("mortgage x"), None);
    }

    #[test]
    fn parse_load_keeps_json_intact() {
        let cmd = parse_command(r#"load {"a": 1, "b": [2, 3]}"#).unwrap();
        assert_eq!(cmd, Command::Load { json: r#"{"a": 1, "b": [2, 3]}"#.to_string() });
    }

    #[test]
    fn parse_with_leading_trailing_whitespace() {
        assert_eq!(parse_command("  isready  "), Some(Command::IsReady));
        assert_eq!(parse_command(" buy yes "), Some(Command::Buy(true)));
    }
}
