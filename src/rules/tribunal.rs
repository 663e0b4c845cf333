//! Tribunals: accusation, defence, witnesses and judgement.
//!
//! At most one tribunal is open at a time. The adjudicator walks it through
//! its phases in order; witnesses may only testify while the witness phase is
//! open, and the verdict closes it.

use serde::{Deserialize, Serialize};

use crate::board::player::{EliminationReason, PlayerId, Rank};
use crate::board::state::GameState;
use crate::error::{RuleError, RuleResult};

use super::ability;
use super::economy::grant;
use super::elimination::eliminate;
use super::gulag::{send_to_gulag, GulagReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TribunalPhase {
    Accusation,
    Defence,
    Witnesses,
    Judgement,
    Closed,
}

impl TribunalPhase {
    /// The phase that follows, or None once judgement is reached.
    pub const fn next(self) -> Option<TribunalPhase> {
        match self {
            TribunalPhase::Accusation => Some(TribunalPhase::Defence),
            TribunalPhase::Defence => Some(TribunalPhase::Witnesses),
            TribunalPhase::Witnesses => Some(TribunalPhase::Judgement),
            TribunalPhase::Judgement | TribunalPhase::Closed => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TribunalPhase::Accusation => "accusation",
            TribunalPhase::Defence => "defence",
            TribunalPhase::Witnesses => "witnesses",
            TribunalPhase::Judgement => "judgement",
            TribunalPhase::Closed => "closed",
        }
    }
}

/// Which principal a witness testifies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WitnessSide {
    Accuser,
    Accused,
}

/// How much support the accuser needs before a guilty verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WitnessRequirement {
    /// At least this many witnesses for the accuser.
    Count(usize),
    /// Every eligible witness must support the accuser.
    Unanimous,
}

impl WitnessRequirement {
    /// Higher ranks are harder to convict.
    pub const fn for_rank(rank: Rank) -> WitnessRequirement {
        match rank {
            Rank::Proletariat => WitnessRequirement::Count(0),
            Rank::PartyMember => WitnessRequirement::Count(1),
            Rank::Commissar => WitnessRequirement::Count(2),
            Rank::InnerCircle => WitnessRequirement::Unanimous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Guilty,
    Innocent,
    BothGuilty,
    InsufficientEvidence,
}

impl Verdict {
    pub const fn name(self) -> &'static str {
        match self {
            Verdict::Guilty => "guilty",
            Verdict::Innocent => "innocent",
            Verdict::BothGuilty => "both guilty",
            Verdict::InsufficientEvidence => "insufficient evidence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribunal {
    pub accuser: PlayerId,
    pub accused: PlayerId,
    pub crime: String,
    pub phase: TribunalPhase,
    pub witnesses_for_accuser: Vec<PlayerId>,
    pub witnesses_for_accused: Vec<PlayerId>,
    pub requirement: WitnessRequirement,
}

impl Tribunal {
    pub fn is_open(&self) -> bool {
        self.phase != TribunalPhase::Closed
    }

    fn has_testified(&self, id: PlayerId) -> bool {
        self.witnesses_for_accuser.contains(&id) || self.witnesses_for_accused.contains(&id)
    }
}

/// Players `accuser` may currently denounce.
pub fn denouncement_targets(state: &GameState, accuser: PlayerId) -> Vec<PlayerId> {
    let Ok(accuser) = state.player(accuser) else {
        return Vec::new();
    };
    if !accuser.is_free() {
        return Vec::new();
    }
    state
        .free_players()
        .filter(|p| p.id != accuser.id && !ability::shielded_from(p, accuser))
        .map(|p| p.id)
        .collect()
}

fn open_tribunal(state: &GameState) -> RuleResult<&Tribunal> {
    state
        .tribunal
        .as_ref()
        .filter(|t| t.is_open())
        .ok_or(RuleError::Invalid("no tribunal is in session"))
}

fn open_tribunal_mut(state: &mut GameState) -> RuleResult<&mut Tribunal> {
    state
        .tribunal
        .as_mut()
        .filter(|t| t.is_open())
        .ok_or(RuleError::Invalid("no tribunal is in session"))
}

/// Opens a tribunal. Each player may accuse once per round.
pub fn accuse(state: &mut GameState, accuser: PlayerId, accused: PlayerId, crime: &str) -> RuleResult<()> {
    if state.is_over() {
        return Err(RuleError::GameOver);
    }
    if state.tribunal.as_ref().is_some_and(Tribunal::is_open) {
        return Err(RuleError::Invalid("a tribunal is already in session"));
    }
    if state.accusers_this_round.contains(&accuser) {
        return Err(RuleError::NotEligible(accuser));
    }
    if !denouncement_targets(state, accuser).contains(&accused) {
        return Err(RuleError::NotEligible(accused));
    }

    let requirement = WitnessRequirement::for_rank(state.player(accused)?.rank);
    state.tribunal = Some(Tribunal {
        accuser,
        accused,
        crime: crime.to_string(),
        phase: TribunalPhase::Accusation,
        witnesses_for_accuser: Vec::new(),
        witnesses_for_accused: Vec::new(),
        requirement,
    });
    state.accusers_this_round.push(accuser);
    let (a, b) = (state.name_of(accuser), state.name_of(accused));
    state.record(format!("{a} accuses {b} of {crime}."));
    Ok(())
}

/// Moves the tribunal to its next phase, stopping at judgement.
pub fn advance_phase(state: &mut GameState) -> RuleResult<TribunalPhase> {
    let tribunal = open_tribunal_mut(state)?;
    let next = tribunal
        .phase
        .next()
        .ok_or(RuleError::Invalid("the tribunal awaits a verdict"))?;
    tribunal.phase = next;
    state.record(format!("The tribunal moves to {}.", next.name()));
    Ok(next)
}

/// Players allowed to testify in the open tribunal.
pub fn eligible_witnesses(state: &GameState) -> Vec<PlayerId> {
    let Ok(tribunal) = open_tribunal(state) else {
        return Vec::new();
    };
    state
        .free_players()
        .filter(|p| p.id != tribunal.accuser && p.id != tribunal.accused)
        .map(|p| p.id)
        .collect()
}

/// Records testimony. A piece bound to one side always testifies there.
///
/// Returns the side actually recorded.
pub fn add_witness(state: &mut GameState, witness: PlayerId, side: WitnessSide) -> RuleResult<WitnessSide> {
    let tribunal = open_tribunal(state)?;
    if tribunal.phase != TribunalPhase::Witnesses {
        return Err(RuleError::WrongPhase(tribunal.phase.name()));
    }
    if tribunal.has_testified(witness) || !eligible_witnesses(state).contains(&witness) {
        return Err(RuleError::NotEligible(witness));
    }
    let side = ability::forced_witness_side(state.player(witness)?).unwrap_or(side);

    let tribunal = open_tribunal_mut(state)?;
    let principal = match side {
        WitnessSide::Accuser => {
            tribunal.witnesses_for_accuser.push(witness);
            tribunal.accuser
        }
        WitnessSide::Accused => {
            tribunal.witnesses_for_accused.push(witness);
            tribunal.accused
        }
    };
    let (w, p) = (state.name_of(witness), state.name_of(principal));
    state.record(format!("{w} testifies for {p}."));
    Ok(side)
}

/// True if the accuser has gathered the support a guilty verdict needs.
pub fn requirement_met(state: &GameState) -> bool {
    let Ok(tribunal) = open_tribunal(state) else {
        return false;
    };
    match tribunal.requirement {
        WitnessRequirement::Count(n) => tribunal.witnesses_for_accuser.len() >= n,
        WitnessRequirement::Unanimous => {
            let eligible = eligible_witnesses(state);
            !eligible.is_empty() && eligible.iter().all(|id| tribunal.witnesses_for_accuser.contains(id))
        }
    }
}

fn confine_if_free(state: &mut GameState, id: PlayerId) -> RuleResult<()> {
    if state.player(id)?.is_free() {
        send_to_gulag(state, id, GulagReason::TribunalGuilty)?;
    }
    Ok(())
}

/// Closes the tribunal with a verdict and applies its consequences.
pub fn render_verdict(state: &mut GameState, verdict: Verdict) -> RuleResult<()> {
    let tribunal = open_tribunal(state)?;
    if tribunal.phase != TribunalPhase::Judgement {
        return Err(RuleError::WrongPhase(tribunal.phase.name()));
    }
    let gated = tribunal.requirement != WitnessRequirement::Count(0);
    if verdict == Verdict::Guilty && gated && !requirement_met(state) {
        return Err(RuleError::Invalid("not enough witnesses for a guilty verdict"));
    }
    let (accuser, accused) = (tribunal.accuser, tribunal.accused);
    if let Some(t) = state.tribunal.as_mut() {
        t.phase = TribunalPhase::Closed;
    }
    let (a, b) = (state.name_of(accuser), state.name_of(accused));
    state.record(format!("The tribunal of {a} against {b} returns: {}.", verdict.name()));

    match verdict {
        Verdict::Guilty => {
            confine_if_free(state, accused)?;
            let bonus = state.rules.tribunal_bonus;
            if state.player(accuser)?.is_active() {
                grant(state, accuser, bonus)?;
            }
        }
        Verdict::Innocent => {
            state.update_player(accuser, |p| p.demoted())?;
        }
        Verdict::BothGuilty => {
            confine_if_free(state, accused)?;
            confine_if_free(state, accuser)?;
        }
        Verdict::InsufficientEvidence => {
            state.update_player(accused, |p| p.with_suspicion(true))?;
        }
    }
    Ok(())
}

/// Eliminates `target` if every other active player voted against them.
///
/// Returns true if the purge went through.
pub fn purge_vote(state: &mut GameState, target: PlayerId, votes: &[PlayerId]) -> RuleResult<bool> {
    if !state.player(target)?.is_active() {
        return Err(RuleError::NotEligible(target));
    }
    let voters: Vec<PlayerId> = state
        .active_players()
        .map(|p| p.id)
        .filter(|&id| id != target)
        .collect();
    if let Some(&bad) = votes.iter().find(|id| !voters.contains(id)) {
        return Err(RuleError::NotEligible(bad));
    }
    let name = state.name_of(target);
    if voters.iter().all(|id| votes.contains(id)) {
        state.record(format!("The comrades vote as one to purge {name}."));
        eliminate(state, target, EliminationReason::UnanimousVote)?;
        return Ok(true);
    }
    state.record(format!("The vote to purge {name} is not unanimous."));
    Ok(false)
}
