//! JSON snapshots of a match.
//!
//! A snapshot is the whole `GameState` wrapped with a format version, on a
//! single line so it can travel through the line protocol. Restoring checks
//! the version and the few cross-references serde cannot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::player::{Creditor, PlayerId};
use crate::board::space::{ownable_spaces, GULAG_SPACE};
use crate::board::state::GameState;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur while decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("inconsistent snapshot: {0}")]
    Inconsistent(&'static str),
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    state: GameState,
}

/// Encodes the game as a single-line JSON snapshot.
pub fn encode_snapshot(state: &GameState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&SnapshotRef { version: SNAPSHOT_VERSION, state })?)
}

/// Decodes and checks a snapshot.
pub fn decode_snapshot(json: &str) -> Result<GameState, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }
    let state = snapshot.state;

    if state.players.iter().enumerate().any(|(i, p)| p.id.index() != i) {
        return Err(SnapshotError::Inconsistent("player ids out of seat order"));
    }
    if state.player(state.current).is_err() {
        return Err(SnapshotError::Inconsistent("current player does not exist"));
    }
    if !state.properties.iter().map(|p| p.space).eq(ownable_spaces()) {
        return Err(SnapshotError::Inconsistent("property table does not match the board"));
    }
    for property in &state.properties {
        if let Some(custodian) = property.custodian {
            let holds = state.player(custodian).is_ok_and(|p| p.owns(property.space));
            if !holds {
                return Err(SnapshotError::Inconsistent("custodian does not list its property"));
            }
        }
    }
    if state.treasury < 0 {
        return Err(SnapshotError::Inconsistent("negative treasury"));
    }
    check_references(&state)?;
    Ok(state)
}

/// Every player id stored inside the state must name a seat, and prisoners
/// must stand on the Gulag corner.
fn check_references(state: &GameState) -> Result<(), SnapshotError> {
    let known = |id: PlayerId| state.player(id).is_ok();

    for player in &state.players {
        if player.in_gulag && player.position != GULAG_SPACE {
            return Err(SnapshotError::Inconsistent("prisoner is not on the Gulag corner"));
        }
        if player.vouching_for.is_some_and(|id| !known(id)) {
            return Err(SnapshotError::Inconsistent("voucher liability names an unknown player"));
        }
        if let Some(debt) = &player.debt {
            let creditor_known = match debt.creditor {
                Creditor::State => true,
                Creditor::Player(id) => known(id),
            };
            if debt.debtor != player.id || !creditor_known {
                return Err(SnapshotError::Inconsistent("debt names the wrong players"));
            }
        }
    }
    if state.vouchers.iter().any(|v| !known(v.prisoner) || !known(v.voucher)) {
        return Err(SnapshotError::Inconsistent("voucher agreement names an unknown player"));
    }
    if let Some(tribunal) = &state.tribunal {
        let mut named = [tribunal.accuser, tribunal.accused]
            .into_iter()
            .chain(tribunal.witnesses_for_accuser.iter().copied())
            .chain(tribunal.witnesses_for_accused.iter().copied());
        if named.any(|id| !known(id)) {
            return Err(SnapshotError::Inconsistent("tribunal names an unknown player"));
        }
    }
    if state.accusers_this_round.iter().any(|&id| !known(id)) {
        return Err(SnapshotError::Inconsistent("accuser list names an unknown player"));
    }
    Ok(())
}
