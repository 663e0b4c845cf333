//! Engine state management.
//!
//! Holds the current match, the rules configuration, driver options and the
//! random number generator, and exposes every rules operation behind one
//! facade for the driver loop and for tests.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::board::player::PlayerId;
use crate::board::state::{GameOutcome, GameState, LogEntry, PlayerSetup, TurnPhase};
use crate::config::{ConfigError, RulesConfig};
use crate::error::RuleError;
use crate::protocol::parser::{GulagCommand, PropertyAction};
use crate::protocol::snapshot::{decode_snapshot, encode_snapshot, SnapshotError};
use crate::resolve::pending::Decision;
use crate::resolve::{actions, phase};
use crate::rules::gulag::{self, GulagReason};
use crate::rules::tribunal::{self, TribunalPhase, Verdict, WitnessSide};
use crate::rules::{ability, economy};

/// Errors surfaced to the driver.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no game in progress")]
    NoGame,

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub state: Option<GameState>,
    pub rules: RulesConfig,
    pub options: HashMap<String, String>,
    rng: SmallRng,
    /// Log entries already handed out by `drain_log`.
    log_cursor: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with default rules and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Creates an engine whose dice and shuffles are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Engine {
            state: None,
            rules: RulesConfig::default(),
            options: HashMap::new(),
            rng,
            log_cursor: 0,
        }
    }

    /// Starts a new match with shuffled decks.
    pub fn new_game(&mut self, seats: &[PlayerSetup]) -> EngineResult<()> {
        let state = GameState::new_shuffled(self.rules.clone(), seats, &mut self.rng)?;
        self.state = Some(state);
        self.log_cursor = 0;
        Ok(())
    }

    /// Sets a driver option.
    ///
    /// `seed` reseeds the dice, `config` loads a rules file, and any other
    /// name is a rules field. Rules changes also apply to a match in progress.
    pub fn set_option(&mut self, name: String, value: Option<String>) -> EngineResult<()> {
        let value = value.unwrap_or_default();
        match name.as_str() {
            "seed" => {
                let seed = value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue { name: name.clone(), value: value.clone() })?;
                self.rng = SmallRng::seed_from_u64(seed);
            }
            "config" => {
                self.rules = RulesConfig::load(Path::new(&value))?;
                if let Some(state) = self.state.as_mut() {
                    state.rules = self.rules.clone();
                }
            }
            _ => {
                self.rules.set(&name, &value)?;
                if let Some(state) = self.state.as_mut() {
                    state.rules.set(&name, &value)?;
                }
            }
        }
        self.options.insert(name, value);
        Ok(())
    }

    pub fn game(&self) -> EngineResult<&GameState> {
        self.state.as_ref().ok_or(EngineError::NoGame)
    }

    fn game_mut(&mut self) -> EngineResult<&mut GameState> {
        self.state.as_mut().ok_or(EngineError::NoGame)
    }

    /// Rolls for the current player, with fixed dice if given.
    pub fn roll(&mut self, dice: Option<(u8, u8)>) -> EngineResult<(u8, u8)> {
        let state = self.state.as_mut().ok_or(EngineError::NoGame)?;
        match dice {
            Some((d1, d2)) => {
                phase::roll_dice(state, d1, d2, &mut self.rng)?;
                Ok((d1, d2))
            }
            None => Ok(phase::roll(state, &mut self.rng)?),
        }
    }

    /// Answers the pending action.
    pub fn decide(&mut self, decision: Decision) -> EngineResult<()> {
        Ok(phase::resolve_pending(self.game_mut()?, decision)?)
    }

    pub fn cancel(&mut self) -> EngineResult<()> {
        Ok(phase::cancel_pending(self.game_mut()?)?)
    }

    pub fn end_turn(&mut self) -> EngineResult<()> {
        Ok(phase::end_turn(self.game_mut()?)?)
    }

    /// Runs a Gulag escape attempt for the current prisoner.
    pub fn gulag(&mut self, command: GulagCommand) -> EngineResult<()> {
        let state = self.state.as_mut().ok_or(EngineError::NoGame)?;
        match command {
            GulagCommand::Roll(Some((d1, d2))) => {
                phase::gulag_roll_dice(state, d1, d2, &mut self.rng)?;
            }
            GulagCommand::Roll(None) => {
                phase::gulag_roll(state, &mut self.rng)?;
            }
            GulagCommand::Pay => {
                phase::gulag_pay(state)?;
            }
            GulagCommand::Card => {
                phase::gulag_card(state)?;
            }
            GulagCommand::Vouch(voucher) => {
                phase::gulag_vouch(state, voucher)?;
            }
            GulagCommand::Inform(accused) => phase::gulag_inform(state, accused)?,
            GulagCommand::Bribe(amount) => phase::gulag_bribe(state, amount)?,
        }
        Ok(())
    }

    pub fn accuse(&mut self, accuser: PlayerId, accused: PlayerId, crime: &str) -> EngineResult<()> {
        Ok(tribunal::accuse(self.game_mut()?, accuser, accused, crime)?)
    }

    pub fn advance_tribunal(&mut self) -> EngineResult<TribunalPhase> {
        Ok(tribunal::advance_phase(self.game_mut()?)?)
    }

    pub fn witness(&mut self, witness: PlayerId, side: WitnessSide) -> EngineResult<WitnessSide> {
        Ok(tribunal::add_witness(self.game_mut()?, witness, side)?)
    }

    pub fn judge(&mut self, verdict: Verdict) -> EngineResult<()> {
        Ok(tribunal::render_verdict(self.game_mut()?, verdict)?)
    }

    pub fn decree(&mut self, player: PlayerId, reason: GulagReason) -> EngineResult<()> {
        gulag::decree(self.game_mut()?, player, reason)?;
        Ok(())
    }

    pub fn execute(&mut self, player: PlayerId) -> EngineResult<()> {
        Ok(gulag::execute(self.game_mut()?, player)?)
    }

    pub fn promote(&mut self, player: PlayerId) -> EngineResult<()> {
        Ok(gulag::promote(self.game_mut()?, player)?)
    }

    pub fn purge(&mut self, target: PlayerId, voters: &[PlayerId]) -> EngineResult<bool> {
        Ok(tribunal::purge_vote(self.game_mut()?, target, voters)?)
    }

    /// Applies a property action for the current player.
    pub fn property(&mut self, action: PropertyAction, space: u8) -> EngineResult<()> {
        let state = self.game_mut()?;
        let player = state.current;
        match action {
            PropertyAction::Mortgage => economy::mortgage(state, player, space)?,
            PropertyAction::Unmortgage => economy::unmortgage(state, player, space)?,
            PropertyAction::Build => economy::collectivize(state, player, space)?,
            PropertyAction::Sell => economy::decollectivize(state, player, space)?,
        }
        Ok(())
    }

    /// Pays off the current player's debt.
    pub fn pay_debt(&mut self) -> EngineResult<()> {
        let state = self.game_mut()?;
        let player = state.current;
        Ok(economy::pay_debt(state, player)?)
    }

    pub fn harvest(&mut self, space: u8) -> EngineResult<()> {
        let state = self.game_mut()?;
        let thief = state.current;
        Ok(actions::harvest(state, thief, space)?)
    }

    pub fn disappear(&mut self, space: u8) -> EngineResult<()> {
        let state = self.game_mut()?;
        let actor = state.current;
        Ok(actions::disappear(state, actor, space)?)
    }

    pub fn ration(&mut self) -> EngineResult<()> {
        let state = self.game_mut()?;
        let collector = state.current;
        Ok(actions::ration_appeal(state, collector)?)
    }

    /// Players `accuser` may denounce right now.
    pub fn denouncement_targets(&self, accuser: PlayerId) -> EngineResult<Vec<PlayerId>> {
        Ok(tribunal::denouncement_targets(self.game()?, accuser))
    }

    pub fn net_worth(&self, player: PlayerId) -> EngineResult<i64> {
        Ok(economy::net_worth(self.game()?, player)?)
    }

    pub fn ability_status(&self, player: PlayerId) -> EngineResult<String> {
        let state = self.game()?;
        Ok(ability::ability_status(state.player(player)?))
    }

    /// The quota `payer` would owe on `space` right now.
    pub fn quota_for(&self, space: u8, payer: PlayerId) -> EngineResult<i64> {
        let state = self.game()?;
        Ok(economy::quota(state, space, state.player(payer)?)?)
    }

    /// Encodes the match as a JSON snapshot.
    pub fn snapshot(&self) -> EngineResult<String> {
        Ok(encode_snapshot(self.game()?)?)
    }

    /// Replaces the match with a decoded snapshot. The restored log is
    /// treated as already seen.
    pub fn restore(&mut self, json: &str) -> EngineResult<()> {
        let state = decode_snapshot(json)?;
        self.log_cursor = state.log.len();
        self.rules = state.rules.clone();
        self.state = Some(state);
        Ok(())
    }

    /// Log entries written since the last call.
    pub fn drain_log(&mut self) -> Vec<LogEntry> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        let fresh = state.log.get(self.log_cursor..).unwrap_or_default().to_vec();
        self.log_cursor = state.log.len();
        fresh
    }

    /// One-line summary of where the match stands.
    pub fn phase_line(&self) -> String {
        let Some(state) = self.state.as_ref() else {
            return "phase none".to_string();
        };
        match (&state.phase, state.outcome) {
            (_, Some(GameOutcome::Winner(id))) => format!("gameover winner {id}"),
            (_, Some(GameOutcome::StateVictory)) => "gameover state".to_string(),
            (TurnPhase::AwaitingInput(action), None) => {
                format!("phase awaiting {} current {} round {}", action.name(), state.current, state.round)
            }
            (phase, None) => format!("phase {} current {} round {}", phase.name(), state.current, state.round),
        }
    }

    /// One line per seat.
    pub fn status_lines(&self) -> EngineResult<Vec<String>> {
        let state = self.game()?;
        let lines = state
            .players
            .iter()
            .map(|p| {
                let piece = p.piece.map_or("adjudicator", |piece| piece.name());
                let standing = if p.is_eliminated() {
                    "eliminated"
                } else if p.in_gulag {
                    "gulag"
                } else {
                    "free"
                };
                format!(
                    "player {} {} {} rank {} rubles {} at {} {} properties {}",
                    p.id,
                    p.name,
                    piece,
                    p.rank.name().replace(' ', "-"),
                    p.rubles,
                    p.position,
                    standing,
                    p.properties.len()
                )
            })
            .chain(std::iter::once(format!("treasury {}", state.treasury)))
            .collect();
        Ok(lines)
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }
}
