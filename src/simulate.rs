//! Random self-play.
//!
//! Plays complete matches with every decision drawn at random: purchases,
//! Gulag escapes, card handling, adjudicator verdicts, abilities and the
//! occasional tribunal. Used by the benches, the smoke tests and the
//! `simulate` binary to exercise the rules end to end.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::player::{EliminationReason, PlayerId, ALL_PIECES};
use crate::board::state::{GameOutcome, GameState, PlayerSetup, TurnPhase};
use crate::config::RulesConfig;
use crate::error::RuleResult;
use crate::resolve::pending::{Decision, PendingAction};
use crate::resolve::{actions, phase};
use crate::rules::economy;
use crate::rules::tribunal::{self, TribunalPhase, Verdict, WitnessSide};

const NAMES: [&str; 8] = ["Ivan", "Olga", "Boris", "Nina", "Misha", "Sasha", "Lena", "Pyotr"];

/// Configuration for a batch of simulated matches.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub num_games: usize,
    /// Piece holders per match, 2 to 8. The adjudicator is added on top.
    pub players: usize,
    /// Matches still running after this many turns are abandoned.
    pub max_turns: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    pub quiet: bool,
    pub rules: RulesConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_games: 10,
            players: 4,
            max_turns: 2000,
            threads: 1,
            seed: 0,
            quiet: false,
            rules: RulesConfig::default(),
        }
    }
}

/// What happened in one simulated match.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: usize,
    /// None if the match hit the turn limit.
    pub outcome: Option<GameOutcome>,
    pub rounds: u32,
    pub turns: u32,
    pub eliminations: Vec<(PlayerId, EliminationReason)>,
    pub treasury: i64,
    pub log_lines: usize,
}

impl GameSummary {
    fn from_state(game_id: usize, state: &GameState) -> Self {
        GameSummary {
            game_id,
            outcome: state.outcome,
            rounds: state.round,
            turns: state.turn,
            eliminations: state
                .players
                .iter()
                .filter_map(|p| p.elimination.as_ref().map(|e| (p.id, e.reason)))
                .collect(),
            treasury: state.treasury,
            log_lines: state.log.len(),
        }
    }
}

/// Seats for a random match: the adjudicator first, then `players` distinct
/// pieces in random order.
pub fn random_seats<R: Rng>(players: usize, rng: &mut R) -> Vec<PlayerSetup> {
    let mut pieces = ALL_PIECES.to_vec();
    pieces.shuffle(rng);
    let players = players.clamp(2, ALL_PIECES.len());
    std::iter::once(PlayerSetup::new("Stalin", None))
        .chain(
            pieces
                .into_iter()
                .take(players)
                .zip(NAMES)
                .map(|(piece, name)| PlayerSetup::new(name, Some(piece))),
        )
        .collect()
}

/// Plays one match to completion or to the turn limit.
pub fn play_game(config: &SimulationConfig, game_id: usize, rng: &mut SmallRng) -> RuleResult<GameSummary> {
    let seats = random_seats(config.players, rng);
    let mut state = GameState::new_shuffled(config.rules.clone(), &seats, rng)?;

    while !state.is_over() && state.turn <= config.max_turns {
        step(&mut state, rng)?;
    }
    Ok(GameSummary::from_state(game_id, &state))
}

/// Makes one random move for whoever has to act.
pub fn step(state: &mut GameState, rng: &mut SmallRng) -> RuleResult<()> {
    match state.phase.clone() {
        TurnPhase::PreRoll if state.current_player().in_gulag => gulag_attempt(state, rng),
        TurnPhase::PreRoll => phase::roll(state, rng).map(|_| ()),
        TurnPhase::AwaitingInput(action) => {
            let decision = choose_decision(state, &action, rng);
            phase::resolve_pending(state, decision)
        }
        TurnPhase::PostTurn => {
            optional_actions(state, rng);
            if state.is_over() || state.phase != TurnPhase::PostTurn {
                return Ok(());
            }
            phase::end_turn(state)
        }
        TurnPhase::GameOver => Ok(()),
        TurnPhase::Rolling | TurnPhase::Moving | TurnPhase::Resolving => phase::end_turn(state),
    }
}

fn gulag_attempt(state: &mut GameState, rng: &mut SmallRng) -> RuleResult<()> {
    let prisoner = state.current_player();
    let can_pay = prisoner.rubles >= state.rules.gulag_fee;
    let has_card = !prisoner.release_cards.is_empty();
    match rng.gen_range(0..4) {
        0 if has_card => phase::gulag_card(state).map(|_| ()),
        1 if can_pay => phase::gulag_pay(state).map(|_| ()),
        _ => phase::gulag_roll(state, rng).map(|_| ()),
    }
}

fn choose_decision(state: &GameState, action: &PendingAction, rng: &mut SmallRng) -> Decision {
    match action {
        PendingAction::PurchaseDecision { player, space } => {
            let affordable = match (state.player(*player), state.property(*space)) {
                (Ok(p), Ok(prop)) => p.rubles >= prop.price(),
                _ => false,
            };
            Decision::Purchase(affordable && rng.gen_bool(0.7))
        }
        PendingAction::PaymentDue { .. } => Decision::Pay,
        PendingAction::CardDrawn { player, .. } => {
            let holding = state.player(*player).is_ok_and(|p| !p.release_cards.is_empty());
            if !holding && rng.gen_bool(0.2) {
                Decision::KeepCard
            } else {
                Decision::Acknowledge
            }
        }
        PendingAction::InformVerdict { .. }
        | PendingAction::BribeVerdict { .. }
        | PendingAction::TheftVerdict { .. } => Decision::Verdict(rng.gen_bool(0.5)),
        PendingAction::RationAppeal { collector } => Decision::Payers(
            state
                .free_players()
                .filter(|p| p.id != *collector)
                .map(|p| p.id)
                .filter(|_| rng.gen_bool(0.5))
                .collect(),
        ),
    }
}

/// Post-move extras. Each is an attempt; refusals are ordinary.
fn optional_actions(state: &mut GameState, rng: &mut SmallRng) {
    let id = state.current;
    if rng.gen_bool(0.05) {
        if let Some(&space) = state.player(id).ok().and_then(|p| p.properties.first()) {
            let _ = economy::collectivize(state, id, space);
        }
    }
    if rng.gen_bool(0.1) {
        let rival_space = state
            .properties
            .iter()
            .filter(|p| p.custodian.is_some_and(|c| c != id))
            .map(|p| p.space)
            .collect::<Vec<_>>()
            .choose(rng)
            .copied();
        if let Some(space) = rival_space {
            let _ = actions::harvest(state, id, space).or_else(|_| actions::disappear(state, id, space));
        }
        let _ = actions::ration_appeal(state, id);
        // Abilities that need an answer get it at once.
        if let Some(action) = state.pending().cloned() {
            let decision = choose_decision(state, &action, rng);
            let _ = phase::resolve_pending(state, decision);
        }
    }
    if rng.gen_bool(0.05) {
        let _ = run_tribunal(state, id, rng);
    }
}

/// Accuses a random target and runs the tribunal to a verdict.
fn run_tribunal(state: &mut GameState, accuser: PlayerId, rng: &mut SmallRng) -> RuleResult<()> {
    let Some(&accused) = tribunal::denouncement_targets(state, accuser).choose(rng) else {
        return Ok(());
    };
    tribunal::accuse(state, accuser, accused, "insufficient enthusiasm")?;
    while tribunal::advance_phase(state)? != TribunalPhase::Witnesses {}
    for witness in tribunal::eligible_witnesses(state) {
        let side = if rng.gen_bool(0.5) { WitnessSide::Accuser } else { WitnessSide::Accused };
        tribunal::add_witness(state, witness, side)?;
    }
    tribunal::advance_phase(state)?;
    let verdict = match rng.gen_range(0..4) {
        0 if tribunal::requirement_met(state) => Verdict::Guilty,
        1 => Verdict::BothGuilty,
        2 => Verdict::InsufficientEvidence,
        _ => Verdict::Innocent,
    };
    tribunal::render_verdict(state, verdict)
}

fn game_rng(config: &SimulationConfig, game_id: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn report(config: &SimulationConfig, n: usize, game: &GameSummary, started: Instant) {
    if config.quiet {
        return;
    }
    let outcome = match game.outcome {
        Some(GameOutcome::Winner(id)) => format!("{id} wins"),
        Some(GameOutcome::StateVictory) => "the State wins".to_string(),
        None => "abandoned".to_string(),
    };
    tracing::info!(
        "Game {}/{}: {} after {} rounds ({:.2}s)",
        n,
        config.num_games,
        outcome,
        game.rounds,
        started.elapsed().as_secs_f64()
    );
}

/// Runs a batch of matches, in parallel when `config.threads > 1`.
pub fn run_simulation(config: &SimulationConfig) -> RuleResult<Vec<GameSummary>> {
    if config.threads <= 1 {
        return (0..config.num_games)
            .map(|i| {
                let started = Instant::now();
                let game = play_game(config, i, &mut game_rng(config, i))?;
                report(config, i + 1, &game, started);
                Ok(game)
            })
            .collect();
    }

    use rayon::prelude::*;

    let completed = AtomicUsize::new(0);
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("falling back to one thread: {e}");
            return run_simulation(&SimulationConfig { threads: 1, ..config.clone() });
        }
    };
    pool.install(|| {
        (0..config.num_games)
            .into_par_iter()
            .map(|i| {
                let started = Instant::now();
                let game = play_game(config, i, &mut game_rng(config, i))?;
                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                report(config, n, &game, started);
                Ok(game)
            })
            .collect()
    })
}

/// Writes summaries as JSONL, one match per line.
pub fn write_jsonl<W: Write>(games: &[GameSummary], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Logs win and elimination counts across a batch.
pub fn print_summary(games: &[GameSummary]) {
    let finished = games.iter().filter(|g| g.outcome.is_some()).count();
    let state_wins = games
        .iter()
        .filter(|g| g.outcome == Some(GameOutcome::StateVictory))
        .count();
    let mean_rounds = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.rounds as f64).sum::<f64>() / games.len() as f64
    };
    let eliminations: usize = games.iter().map(|g| g.eliminations.len()).sum();
    tracing::info!(
        games = games.len(),
        finished,
        state_wins,
        eliminations,
        "mean rounds {mean_rounds:.1}"
    );
}
