//! Elimination and victory detection.

use crate::board::player::{EliminationReason, PlayerId};
use crate::board::state::{GameOutcome, GameState, TurnPhase};
use crate::error::{RuleError, RuleResult};

/// Removes a player from the game.
///
/// Their properties return to the State, any voucher agreement they are
/// part of is cancelled, a tribunal they are a principal in is dropped,
/// and the game ends if at most one piece holder remains.
pub fn eliminate(state: &mut GameState, id: PlayerId, reason: EliminationReason) -> RuleResult<()> {
    let player = state.player(id)?;
    if !player.is_active() {
        return Err(RuleError::NotEligible(id));
    }
    let holdings = player.properties.clone();
    let cards = player.release_cards.clone();
    let turn = state.turn;

    state.update_player(id, |p| p.eliminated(reason, turn))?;
    for space in holdings {
        state.update_property(space, |p| p.returned_to_state())?;
    }
    for card in cards {
        state.deck_mut(card.deck).discard(card.card);
    }

    for agreement in state.vouchers.iter_mut() {
        if agreement.active && (agreement.prisoner == id || agreement.voucher == id) {
            agreement.active = false;
        }
    }
    let vouchers: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| p.vouching_for == Some(id))
        .map(|p| p.id)
        .collect();
    for voucher in vouchers {
        state.update_player(voucher, |p| p.with_voucher_liability(None))?;
    }

    if state
        .tribunal
        .as_ref()
        .is_some_and(|t| t.accuser == id || t.accused == id)
    {
        state.tribunal = None;
    }

    let name = state.name_of(id);
    state.record(format!("{name} has been eliminated ({}).", reason_text(reason)));

    if state.current == id && !matches!(state.phase, TurnPhase::GameOver) {
        state.cut_turn_short();
    }
    check_victory(state);
    Ok(())
}

/// Ends the game if one or zero piece holders remain.
pub fn check_victory(state: &mut GameState) -> Option<GameOutcome> {
    if state.outcome.is_some() {
        return state.outcome;
    }
    let outcome = {
        let mut remaining = state.active_players().map(|p| p.id);
        match (remaining.next(), remaining.next()) {
            (None, _) => GameOutcome::StateVictory,
            (Some(winner), None) => GameOutcome::Winner(winner),
            _ => return None,
        }
    };
    state.outcome = Some(outcome);
    state.phase = TurnPhase::GameOver;
    match outcome {
        GameOutcome::Winner(id) => {
            let name = state.name_of(id);
            state.record(format!("{name} is the last comrade standing."));
        }
        GameOutcome::StateVictory => state.record("Nobody survived. The State wins."),
    }
    Some(outcome)
}

fn reason_text(reason: EliminationReason) -> &'static str {
    match reason {
        EliminationReason::Bankruptcy => "bankrupt",
        EliminationReason::Execution => "executed",
        EliminationReason::GulagTimeout => "died in the Gulag",
        EliminationReason::RankCollapse => "fell from grace",
        EliminationReason::UnanimousVote => "purged by unanimous vote",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::deck::DECK_SIZE;
    use crate::board::player::{CardRef, PieceType};
    use crate::board::space::DeckKind;
    use crate::board::state::PlayerSetup;
    use crate::config::RulesConfig;
    use crate::resolve::pending::PendingAction;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn game(pieces: &[PieceType]) -> GameState {
        let mut seats = vec![PlayerSetup::new("Stalin", None)];
        for (i, &piece) in pieces.iter().enumerate() {
            seats.push(PlayerSetup::new(format!("P{}", i + 1), Some(piece)));
        }
        GameState::new(RulesConfig::default(), &seats).unwrap()
    }

    #[test]
    fn eliminated_player_loses_properties() {
        let mut state = game(&[PieceType::Hammer, PieceType::Sickle, PieceType::Tank]);
        state.update_property(6, |p| p.with_custodian(Some(PlayerId(1))).with_collectivization(2)).unwrap();
        state.update_player(PlayerId(1), |p| p.with_property(6)).unwrap();

        eliminate(&mut state, PlayerId(1), EliminationReason::Execution).unwrap();

        assert_eq!(state.property(6).unwrap().custodian, None);
        assert_eq!(state.property(6).unwrap().collectivization, 0);
        let record = state.player(PlayerId(1)).unwrap().elimination.clone().unwrap();
        assert_eq!(record.reason, EliminationReason::Execution);
        assert_eq!(record.final_property_count, 1);
        assert!(state.outcome.is_none());
    }

    #[test]
    fn held_release_cards_go_back_to_the_discard_pile() {
        let mut state = game(&[PieceType::Hammer, PieceType::Sickle, PieceType::Tank]);
        let mut rng = SmallRng::seed_from_u64(3);
        let card = state.test_deck.draw(&mut rng).unwrap();
        state
            .update_player(PlayerId(2), |p| p.with_release_card(CardRef { deck: DeckKind::CommunistTest, card }))
            .unwrap();

        eliminate(&mut state, PlayerId(2), EliminationReason::Execution).unwrap();
        assert!(state.player(PlayerId(2)).unwrap().release_cards.is_empty());
        assert_eq!(state.test_deck.len(), DECK_SIZE as usize);
        assert_eq!(state.test_deck.discard_pile, vec![card]);
    }

    #[test]
    fn eliminating_mid_card_returns_the_drawn_card() {
        let mut state = game(&[PieceType::Hammer, PieceType::Sickle, PieceType::Tank]);
        let mut rng = SmallRng::seed_from_u64(3);
        let card = state.directive_deck.draw(&mut rng).unwrap();
        state.phase = TurnPhase::AwaitingInput(PendingAction::CardDrawn {
            player: PlayerId(1),
            deck: DeckKind::PartyDirective,
            card,
        });

        eliminate(&mut state, PlayerId(1), EliminationReason::Bankruptcy).unwrap();
        assert_eq!(state.phase, TurnPhase::PostTurn);
        assert_eq!(state.directive_deck.len(), DECK_SIZE as usize);
    }

    #[test]
    fn last_survivor_wins() {
        let mut state = game(&[PieceType::Hammer, PieceType::Sickle]);
        eliminate(&mut state, PlayerId(2), EliminationReason::Bankruptcy).unwrap();
        assert_eq!(state.outcome, Some(GameOutcome::Winner(PlayerId(1))));
        assert_eq!(state.phase, TurnPhase::GameOver);
    }

    #[test]
    fn cannot_eliminate_twice_or_adjudicator() {
        let mut state = game(&[PieceType::Hammer, PieceType::Sickle, PieceType::Tank]);
        eliminate(&mut state, PlayerId(3), EliminationReason::Execution).unwrap();
        assert!(eliminate(&mut state, PlayerId(3), EliminationReason::Execution).is_err());
        assert!(eliminate(&mut state, PlayerId(0), EliminationReason::Execution).is_err());
    }
}
