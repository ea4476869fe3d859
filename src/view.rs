//! Read-only snapshots for the presentation layer.

use serde::{Deserialize, Serialize};
use crate::{Card, Character, GameState, PendingAction, Phase, Player, Seat, Winner};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    /// `None` while the card is hidden from the viewer.
    pub character: Option<Character>,
    pub dead: bool,
    pub revealed: bool,
    pub reveal_countdown: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: Seat,
    pub coins: u32,
    pub lives: u8,
    pub hand: [CardView; 2],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub id: String,
    pub viewer: Seat,
    pub turn: Seat,
    pub phase: Phase,
    pub pending: Option<PendingAction>,
    pub winner: Option<Winner>,
    pub logs: Vec<String>,
    pub players: [PlayerView; 2],
}

fn card_view(card: &Card, visible: bool) -> CardView {
    CardView {
        character: if visible || card.revealed { Some(card.character) } else { None },
        dead: card.dead,
        revealed: card.revealed,
        reveal_countdown: card.reveal_countdown,
    }
}

fn player_view(seat: Seat, player: &Player, viewer: Seat) -> PlayerView {
    let own = seat == viewer;
    PlayerView {
        seat,
        coins: player.coins,
        lives: player.lives,
        hand: [card_view(&player.hand[0], own), card_view(&player.hand[1], own)],
    }
}

impl GameState {
    /// What `viewer` is allowed to see: their own hand, and only the revealed
    /// cards of the opponent.
    pub fn view_for(&self, viewer: Seat) -> GameView {
        GameView {
            id: self.id.clone(),
            viewer,
            turn: self.turn,
            phase: self.phase,
            pending: self.pending.clone(),
            winner: self.winner,
            logs: self.logs.clone(),
            players: [
                player_view(Seat::P1, self.player(Seat::P1), viewer),
                player_view(Seat::P2, self.player(Seat::P2), viewer),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::{Engine, LocalOracle, MatchConfig, Seat, Sha256Commitment};

    #[test]
    fn opponent_cards_hidden_until_revealed() {
        let config = MatchConfig { seed: Some(5), ..MatchConfig::default() };
        let engine = Engine::new(&config, Arc::new(LocalOracle), Arc::new(Sha256Commitment));
        let state = engine.state();

        let view = state.view_for(Seat::P1);
        assert!(view.players[0].hand.iter().all(|card| card.character.is_some()));
        assert!(view.players[1].hand.iter().all(|card| card.character.is_none()));

        let mut revealed = state.clone();
        revealed.players[1].hand[1].revealed = true;
        let view = revealed.view_for(Seat::P1);
        assert_eq!(view.players[1].hand[0].character, None);
        assert_eq!(view.players[1].hand[1].character, Some(revealed.players[1].hand[1].character));

        // and the other way around
        let view = state.view_for(Seat::P2);
        assert!(view.players[0].hand.iter().all(|card| card.character.is_none()));
        assert_eq!(view.players[1].hand[0].character, Some(state.players[1].hand[0].character));
    }

    #[test]
    fn view_serializes() {
        let engine = Engine::new(&MatchConfig::default(), Arc::new(LocalOracle), Arc::new(Sha256Commitment));
        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"MainTurn\""));
    }
}
