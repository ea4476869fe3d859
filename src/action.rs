use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::{Character, Seat, COUP_COST, REVEAL_COST};
use crate::Character::{Chameleon, Crow, Lion, Snake, Spider};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Action {
    Income,
    ForeignAid,
    Tax,
    Steal,
    // index of the target card to reveal, falls back to the first eligible card
    Reveal { card: Option<usize> },
    // index of the target card to kill, falls back to the first living card
    Coup { card: Option<usize> },
    Exchange,
    // the two identities the actor thinks the target still holds
    CoupDeGrace { guess: [Character; 2] },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Income => "INCOME",
            Action::ForeignAid => "FOREIGN_AID",
            Action::Tax => "TAX",
            Action::Steal => "STEAL",
            Action::Reveal { .. } => "REVEAL",
            Action::Coup { .. } => "COUP",
            Action::Exchange => "EXCHANGE",
            Action::CoupDeGrace { .. } => "COUP_DE_GRACE",
        }
    }

    /// The character the actor claims to hold by taking this action.
    pub fn claim(&self) -> Option<Character> {
        match self {
            Action::Tax => Some(Lion),
            Action::Reveal { .. } => Some(Spider),
            Action::Steal => Some(Crow),
            Action::Exchange => Some(Chameleon),
            _ => None,
        }
    }

    pub fn cost(&self) -> u32 {
        match self {
            Action::Reveal { .. } => REVEAL_COST,
            Action::Coup { .. } => COUP_COST,
            _ => 0,
        }
    }

    /// Interruptible actions open a response window, the rest resolve immediately.
    pub fn is_interruptible(&self) -> bool {
        !matches!(self, Action::Income | Action::Coup { .. } | Action::CoupDeGrace { .. })
    }

    pub fn blockers(&self) -> &'static [Character] {
        match self {
            Action::ForeignAid => &[Lion],
            Action::Steal => &[Crow, Chameleon],
            Action::Reveal { .. } => &[Snake],
            _ => &[],
        }
    }

    pub fn is_blockable_by(&self, character: Character) -> bool {
        self.blockers().contains(&character)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Income => f.write_str("takes Income"),
            Action::ForeignAid => f.write_str("gets foreign aid"),
            Action::Tax => f.write_str("collects Tax"),
            Action::Steal => f.write_str("steals"),
            Action::Reveal { card: Some(card_idx) } => {
                f.write_fmt(format_args!("reveals card {card_idx}"))
            }
            Action::Reveal { card: None } => f.write_str("reveals a card"),
            Action::Coup { card: Some(card_idx) } => {
                f.write_fmt(format_args!("coups card {card_idx}"))
            }
            Action::Coup { card: None } => f.write_str("coups"),
            Action::Exchange => f.write_str("exchanges with the court"),
            Action::CoupDeGrace { guess } => {
                f.write_fmt(format_args!("attempts a coup de grace guessing {:?} and {:?}", guess[0], guess[1]))
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Response {
    Allow,
    // claimed counter-character
    Block(Character),
    Challenge,
}

impl Response {
    pub fn name(&self) -> &'static str {
        match self {
            Response::Allow => "ALLOW",
            Response::Block(_) => "BLOCK",
            Response::Challenge => "CHALLENGE",
        }
    }
}

/// A single decision by one seat, as enumerated by `Engine::legal_moves`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Move {
    Propose(Seat, Action),
    Respond(Seat, Response),
}

impl Move {
    pub fn seat(&self) -> Seat {
        match self {
            Move::Propose(seat, _) | Move::Respond(seat, _) => *seat,
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Propose(seat, action) => {
                f.write_fmt(format_args!("{seat} {action}"))
            }
            Move::Respond(seat, Response::Allow) => {
                f.write_fmt(format_args!("{seat} allows"))
            }
            Move::Respond(seat, Response::Block(character)) => {
                f.write_fmt(format_args!("{seat} blocks with {:?}", character))
            }
            Move::Respond(seat, Response::Challenge) => {
                f.write_fmt(format_args!("{seat} challenges"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::Character::{Chameleon, Crow, Lion, Snake, Spider};

    #[test]
    fn claims_and_blockers() {
        assert_eq!(Action::Tax.claim(), Some(Lion));
        assert_eq!(Action::Reveal { card: None }.claim(), Some(Spider));
        assert_eq!(Action::ForeignAid.claim(), None);

        // tax and exchange can only be challenged
        assert!(Action::Tax.blockers().is_empty());
        assert!(Action::Exchange.blockers().is_empty());

        assert!(Action::Steal.is_blockable_by(Crow));
        assert!(Action::Steal.is_blockable_by(Chameleon));
        assert!(!Action::Steal.is_blockable_by(Lion));
        assert!(Action::Reveal { card: Some(1) }.is_blockable_by(Snake));
    }

    #[test]
    fn unstoppable_actions() {
        assert!(!Action::Income.is_interruptible());
        assert!(!Action::Coup { card: None }.is_interruptible());
        assert!(!Action::CoupDeGrace { guess: [Lion, Crow] }.is_interruptible());
        assert!(Action::ForeignAid.is_interruptible());
        assert_eq!(Action::Coup { card: None }.cost(), 7);
        assert_eq!(Action::Reveal { card: None }.cost(), 3);
    }
}
