pub mod action;
pub mod ai;
pub mod audit;
pub mod config;
pub mod proof;
pub mod session;
pub mod view;

pub use action::{Action, Move, Response};
pub use audit::AuditReport;
pub use config::{ConfigError, MatchConfig};
pub use proof::{CommitmentScheme, LocalOracle, ProofOracle, ProofRecord, Sha256Commitment};
pub use session::Session;
pub use view::GameView;

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::Character::{Chameleon, Crow, Lion, Snake, Spider};
use crate::proof::{hand_digest, ProofRequest, EMPTY_CERTIFICATE};

pub const COUP_COST: u32 = 7;
pub const REVEAL_COST: u32 = 3;
pub const MAX_STEAL: u32 = 2;
pub const STARTING_LIVES: u8 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Character {
    Lion = 1,
    Spider = 2,
    Snake = 3,
    Crow = 4,
    Chameleon = 5,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Lion,
    Spider,
    Snake,
    Crow,
    Chameleon,
];

impl Character {
    pub fn id(self) -> u8 {
        self as u8
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    P1,
    P2,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::P1 => Seat::P2,
            Seat::P2 => Seat::P1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::P1 => 0,
            Seat::P2 => 1,
        }
    }
}

impl Display for Seat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Seat::P1 => f.write_str("p1"),
            Seat::P2 => f.write_str("p2"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    MainTurn,
    ActionResponse,
    BlockResponse,
    Resolving,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player(Seat),
    Draw,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub character: Character,
    pub dead: bool,
    // face up for both players, permanently once dead
    pub revealed: bool,
    pub reveal_countdown: u8,
}

impl Card {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            dead: false,
            revealed: false,
            reveal_countdown: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }
}

pub type Hand = [Card; 2];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub coins: u32,
    pub lives: u8,
    pub hand: Hand,
}

impl Player {
    fn new(characters: [Character; 2], coins: u32) -> Self {
        Self {
            coins,
            lives: STARTING_LIVES,
            hand: [Card::new(characters[0]), Card::new(characters[1])],
        }
    }

    pub fn living_cards(&self) -> impl Iterator<Item=usize> + '_ {
        self.hand
            .iter()
            .enumerate()
            .filter_map(|(idx, card)| if card.is_alive() { Some(idx) } else { None })
    }

    pub fn first_living(&self) -> Option<usize> {
        self.living_cards().next()
    }

    /// Holds a living copy of the character.
    pub fn holds(&self, character: Character) -> bool {
        self.hand.iter().any(|card| card.is_alive() && card.character == character)
    }

    pub fn is_out(&self) -> bool {
        self.hand.iter().all(|card| card.dead)
    }

    pub fn characters(&self) -> [Character; 2] {
        [self.hand[0].character, self.hand[1].character]
    }
}

/// An interruptible action waiting on a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub action: Action,
    pub source: Seat,
    pub target: Seat,
    pub blocker: Option<Seat>,
    pub block_claim: Option<Character>,
    pub challenger: Option<Seat>,
    // a proof attempt was already recorded for this action
    pub proved: bool,
}

impl PendingAction {
    pub fn new(action: Action, source: Seat) -> Self {
        Self {
            action,
            source,
            target: source.other(),
            blocker: None,
            block_claim: None,
            challenger: None,
            proved: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub players: [Player; 2],
    pub turn: Seat,
    pub turn_count: u32,
    pub phase: Phase,
    pub pending: Option<PendingAction>,
    pub winner: Option<Winner>,
    pub logs: Vec<String>,
    pub proofs: Vec<ProofRecord>,
    // salt and commitment of the local seat's hand
    pub salt: u64,
    pub commitment: String,
}

impl GameState {
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// Characters held by nobody, dead or alive.
    pub fn court(&self) -> Vec<Character> {
        CHARACTER_VARIANTS
            .iter()
            .copied()
            .filter(|character| {
                !self.players.iter().any(|player| player.hand.iter().any(|card| card.character == *character))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoupError {
    #[error("the game is over")]
    GameOver,

    #[error("not in main turn phase (phase is {0:?})")]
    WrongPhase(Phase),

    #[error("it is not {0}'s turn")]
    NotYourTurn(Seat),

    #[error("{seat} needs {cost} coins for {action} but has {coins}")]
    InsufficientCoins { seat: Seat, action: &'static str, cost: u32, coins: u32 },

    #[error("{action} cannot be blocked with {character:?}")]
    InvalidBlock { action: &'static str, character: Character },

    #[error("{0} makes no claim to challenge")]
    Unchallengeable(&'static str),

    #[error("{response} is not a valid response in {phase:?}")]
    InvalidResponse { response: &'static str, phase: Phase },

    #[error("the move was interrupted before it finished")]
    Interrupted,
}

/// Authoritative two player state machine.
///
/// All mutation goes through [`Engine::apply_action`] and
/// [`Engine::apply_response`]; the oracle and commitment calls inside them
/// are the only suspension points, so callers must not interleave mutations
/// on the same engine, and a mutation future dropped at one of them leaves
/// the engine mid-resolution. [`Session`] drives them to completion.
#[derive(Clone)]
pub struct Engine {
    state: GameState,
    local: Seat,
    reveal_turns: u8,
    oracle: Arc<dyn ProofOracle>,
    scheme: Arc<dyn CommitmentScheme>,
    rng: Pcg64,
}

impl Debug for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("T {} | {} | {:?} | W {:?}\n", self.state.turn_count, self.state.turn, self.state.phase, self.state.winner).as_str())?;
        for (player_idx, player) in self.state.players.iter().enumerate() {
            f.write_str(format!("\tP {player_idx}: ${} | {:?}, {:?}\n", player.coins, player.hand[0], player.hand[1]).as_str())?;
        }
        Ok(())
    }
}

impl Engine {
    /// Deals without committing; `commit` has to run before any claim can be
    /// proven. Outside the crate, use [`Engine::start`].
    pub(crate) fn new(config: &MatchConfig, oracle: Arc<dyn ProofOracle>, scheme: Arc<dyn CommitmentScheme>) -> Self {
        let mut rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };

        let mut deck = CHARACTER_VARIANTS.to_vec();
        deck.shuffle(&mut rng);

        let players = [
            Player::new([deck[0], deck[1]], config.starting_coins),
            Player::new([deck[2], deck[3]], config.starting_coins),
        ];

        let state = GameState {
            id: config.session_id.clone(),
            players,
            turn: config.first_turn,
            turn_count: 0,
            phase: Phase::MainTurn,
            pending: None,
            winner: None,
            logs: vec!["Game Started.".to_string()],
            proofs: Vec::new(),
            salt: rng.gen_range(0..1_000_000_000),
            commitment: String::new(),
        };

        Self {
            state,
            local: config.local_seat,
            reveal_turns: config.reveal_turns,
            oracle,
            scheme,
            rng,
        }
    }

    /// Deals a fresh match and commits to the local hand.
    pub async fn start(config: &MatchConfig, oracle: Arc<dyn ProofOracle>, scheme: Arc<dyn CommitmentScheme>) -> Self {
        let mut engine = Self::new(config, oracle, scheme);
        engine.commit().await;
        info!(session = %engine.state.id, local = %engine.local, "match started");
        engine
    }

    /// Computes the initial commitment for the local hand.
    pub async fn commit(&mut self) {
        let hand = self.state.player(self.local).characters();
        match self.scheme.fingerprint(hand, self.state.salt).await {
            Ok(commitment) => {
                debug!(%commitment, "commitment ready");
                self.state.commitment = commitment;
            }
            Err(err) => {
                warn!(%err, "commitment generation failed");
                self.state.commitment = "0x00".to_string();
            }
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn local_seat(&self) -> Seat {
        self.local
    }

    pub fn winner(&self) -> Option<Winner> {
        self.state.winner
    }

    pub fn snapshot(&self) -> GameView {
        self.state.view_for(self.local)
    }

    /// The seat that owes the next decision.
    pub fn to_move(&self) -> Option<Seat> {
        if self.state.winner.is_some() {
            return None;
        }

        match (self.state.phase, &self.state.pending) {
            (Phase::MainTurn, _) => Some(self.state.turn),
            (Phase::ActionResponse, Some(pending)) => Some(pending.target),
            (Phase::BlockResponse, Some(pending)) => Some(pending.source),
            _ => None,
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(24);

        let Some(seat) = self.to_move() else {
            return moves;
        };

        match self.state.phase {
            Phase::MainTurn => {
                let actor = self.state.player(seat);
                let target = self.state.player(seat.other());

                for action in [Action::Income, Action::ForeignAid, Action::Tax, Action::Steal, Action::Exchange] {
                    moves.push(Move::Propose(seat, action));
                }

                if actor.coins >= REVEAL_COST {
                    for card_idx in target.living_cards().filter(|&idx| !target.hand[idx].revealed) {
                        moves.push(Move::Propose(seat, Action::Reveal { card: Some(card_idx) }));
                    }
                }

                if actor.coins >= COUP_COST {
                    for card_idx in target.living_cards() {
                        moves.push(Move::Propose(seat, Action::Coup { card: Some(card_idx) }));
                    }
                }

                for (i, &first) in CHARACTER_VARIANTS.iter().enumerate() {
                    for &second in &CHARACTER_VARIANTS[i + 1..] {
                        moves.push(Move::Propose(seat, Action::CoupDeGrace { guess: [first, second] }));
                    }
                }
            }
            Phase::ActionResponse => {
                if let Some(pending) = &self.state.pending {
                    moves.push(Move::Respond(seat, Response::Allow));
                    for &character in pending.action.blockers() {
                        moves.push(Move::Respond(seat, Response::Block(character)));
                    }
                    if pending.action.claim().is_some() {
                        moves.push(Move::Respond(seat, Response::Challenge));
                    }
                }
            }
            Phase::BlockResponse => {
                moves.push(Move::Respond(seat, Response::Allow));
                moves.push(Move::Respond(seat, Response::Challenge));
            }
            Phase::Resolving => {}
        }

        moves
    }

    pub async fn play(&mut self, mv: Move) -> Result<(), CoupError> {
        if self.state.winner.is_some() {
            return Err(CoupError::GameOver);
        }

        match mv {
            Move::Propose(seat, action) => self.apply_action(seat, action).await,
            Move::Respond(seat, response) => {
                if self.state.pending.is_some() && self.to_move() != Some(seat) {
                    return Err(CoupError::NotYourTurn(seat));
                }
                self.apply_response(response).await
            }
        }
    }

    pub async fn apply_action(&mut self, source: Seat, action: Action) -> Result<(), CoupError> {
        self.check_proposal(source, &action)?;
        debug!(%source, ?action, "applying action");

        let pending = PendingAction::new(action, source);
        if pending.action.is_interruptible() {
            self.log(format!("{source} attempts {}", pending.action.name()));
            self.state.pending = Some(pending);
            self.state.phase = Phase::ActionResponse;
        } else {
            // income, coup and coup de grace can't be stopped
            self.state.phase = Phase::Resolving;
            self.resolve_action(pending).await;
        }

        Ok(())
    }

    fn check_proposal(&self, source: Seat, action: &Action) -> Result<(), CoupError> {
        if self.state.winner.is_some() {
            return Err(CoupError::GameOver);
        }
        if self.state.phase != Phase::MainTurn {
            return Err(CoupError::WrongPhase(self.state.phase));
        }
        if self.state.turn != source {
            return Err(CoupError::NotYourTurn(source));
        }

        let coins = self.state.player(source).coins;
        if coins < action.cost() {
            return Err(CoupError::InsufficientCoins {
                seat: source,
                action: action.name(),
                cost: action.cost(),
                coins,
            });
        }

        Ok(())
    }

    pub async fn apply_response(&mut self, response: Response) -> Result<(), CoupError> {
        let Some(mut pending) = self.state.pending.clone() else {
            debug!(response = response.name(), "response ignored, nothing pending");
            return Ok(());
        };

        match (self.state.phase, response) {
            (Phase::BlockResponse, Response::Allow) => {
                self.log(format!("Block accepted. Action {} was canceled.", pending.action.name()));
                self.go_next_turn();
            }
            (Phase::ActionResponse, Response::Allow) => {
                self.state.phase = Phase::Resolving;
                self.resolve_action(pending).await;
            }
            (Phase::ActionResponse, Response::Block(character)) => {
                if !pending.action.is_blockable_by(character) {
                    return Err(CoupError::InvalidBlock { action: pending.action.name(), character });
                }

                pending.blocker = Some(pending.target);
                pending.block_claim = Some(character);
                self.log(format!("{} blocked with {:?}", pending.target, character));
                self.state.pending = Some(pending);
                self.state.phase = Phase::BlockResponse;
            }
            (Phase::ActionResponse, Response::Challenge) => {
                if pending.action.claim().is_none() {
                    return Err(CoupError::Unchallengeable(pending.action.name()));
                }
                self.challenge_action(pending).await;
            }
            (Phase::BlockResponse, Response::Challenge) => {
                self.challenge_block(pending).await;
            }
            (phase, response) => {
                return Err(CoupError::InvalidResponse { response: response.name(), phase });
            }
        }

        Ok(())
    }

    async fn challenge_action(&mut self, mut pending: PendingAction) {
        let Some(claim) = pending.action.claim() else {
            return;
        };

        let accused = pending.source;
        let challenger = pending.target;
        pending.challenger = Some(challenger);
        self.log(format!("Challenge raised by {challenger} against {accused}'s {}!", pending.action.name()));

        let truthful = if accused == self.local {
            self.prove_claim(&mut pending).await
        } else {
            self.state.player(accused).holds(claim)
        };
        self.state.pending = Some(pending.clone());

        if truthful {
            self.log(format!("FAIL! {accused} was telling the truth! Challenger loses a card."));
            self.eliminate(challenger, None);

            if self.state.winner.is_none() {
                // a failed challenge validates the action
                self.log(format!("Action {} proceeds after failed challenge.", pending.action.name()));
                self.state.phase = Phase::Resolving;
                self.resolve_action(pending).await;
                return;
            }
        } else {
            self.log(format!("SUCCESS! {accused} was caught lying!"));
            self.eliminate(accused, None);
        }

        self.go_next_turn();
    }

    async fn challenge_block(&mut self, mut pending: PendingAction) {
        let (Some(blocker), Some(claim)) = (pending.blocker, pending.block_claim) else {
            warn!("block challenged without a recorded blocker");
            self.go_next_turn();
            return;
        };

        let challenger = pending.source;
        pending.challenger = Some(challenger);
        self.state.pending = Some(pending.clone());
        self.log(format!("Challenge raised by {challenger} against {blocker}'s {:?} block!", claim));

        if self.state.player(blocker).holds(claim) {
            self.log(format!("FAIL! {blocker} really holds {:?}. Action {} stays blocked.", claim, pending.action.name()));
            self.eliminate(challenger, None);
        } else {
            self.log(format!("SUCCESS! {blocker} was caught lying about {:?}!", claim));
            self.eliminate(blocker, None);

            if self.state.winner.is_none() {
                self.state.phase = Phase::Resolving;
                self.resolve_action(pending).await;
                return;
            }
        }

        self.go_next_turn();
    }

    async fn resolve_action(&mut self, mut pending: PendingAction) {
        let source = pending.source;
        let target = pending.target;
        debug!(%source, action = pending.action.name(), "resolving");

        // prove against the hand the claim was made with, before any exchange
        if source == self.local && !pending.proved && pending.action.claim().is_some() {
            self.prove_claim(&mut pending).await;
        }

        match pending.action {
            Action::Income => {
                self.player_mut(source).coins += 1;
                self.log(format!("{source} collected INCOME (+1 coin)"));
            }
            Action::ForeignAid => {
                self.player_mut(source).coins += 2;
                self.log(format!("{source} collected FOREIGN AID (+2 coins)"));
            }
            Action::Tax => {
                self.player_mut(source).coins += 3;
                self.log(format!("{source} collected TAX (+3 coins)"));
            }
            Action::Steal => {
                let amount = self.state.player(target).coins.min(MAX_STEAL);
                self.player_mut(target).coins -= amount;
                self.player_mut(source).coins += amount;
                self.log(format!("{source} STOLE {amount} coins from {target}"));
            }
            Action::Reveal { card } => {
                self.player_mut(source).coins -= REVEAL_COST;

                let victim = {
                    let target_player = self.state.player(target);
                    let eligible = |idx: usize| target_player.hand.get(idx).is_some_and(|c| c.is_alive() && !c.revealed);
                    card.filter(|&idx| eligible(idx)).or_else(|| (0..target_player.hand.len()).find(|&idx| eligible(idx)))
                };

                match victim {
                    Some(card_idx) => {
                        let reveal_turns = self.reveal_turns;
                        let revealed = &mut self.player_mut(target).hand[card_idx];
                        revealed.revealed = true;
                        revealed.reveal_countdown = reveal_turns;
                        self.log(format!("{source} REVEALED a card from {target} for {reveal_turns} turns!"));
                    }
                    None => {
                        self.log(format!("{source} tried to REVEAL but {target} has no hidden card."));
                    }
                }
            }
            Action::Coup { card } => {
                self.player_mut(source).coins -= COUP_COST;
                if self.eliminate(target, card).is_some() {
                    self.log(format!("{source} used a COUP against {target}! A card was eliminated."));
                }
            }
            Action::Exchange => self.exchange(source).await,
            Action::CoupDeGrace { guess } => self.coup_de_grace(source, target, guess),
        }

        self.check_win_condition();
        self.go_next_turn();
    }

    async fn exchange(&mut self, source: Seat) {
        let Some(card_idx) = self.state.player(source).first_living() else {
            return;
        };

        let court = self.state.court();
        let Some(&replacement) = court.choose(&mut self.rng) else {
            warn!(%source, "court is empty, exchange has no effect");
            return;
        };

        let card = &mut self.player_mut(source).hand[card_idx];
        card.character = replacement;
        card.revealed = false;
        card.reveal_countdown = 0;
        self.log(format!("{source} EXCHANGED a card with the court deck."));

        if source == self.local {
            self.recompute_commitment().await;
        }
    }

    fn coup_de_grace(&mut self, source: Seat, target: Seat, guess: [Character; 2]) {
        let target_player = self.state.player(target);
        let mut actual: Vec<Character> = target_player
            .living_cards()
            .map(|idx| target_player.hand[idx].character)
            .collect();
        actual.sort();

        let mut guessed = guess.to_vec();
        guessed.sort();

        let correct = match actual.len() {
            2 => actual == guessed,
            1 => guessed.contains(&actual[0]),
            _ => false,
        };

        if correct {
            self.log(format!("{source} used COUP DE GRACE and guessed correctly! WINS!"));
            self.state.winner = Some(Winner::Player(source));
            let target_player = self.player_mut(target);
            for card in target_player.hand.iter_mut() {
                card.dead = true;
                card.revealed = true;
                card.reveal_countdown = 0;
            }
            target_player.lives = 0;
        } else {
            self.log(format!("{source} used COUP DE GRACE but guessed incorrectly. Severe penalty."));
            self.eliminate(source, None);
        }
    }

    async fn prove_claim(&mut self, pending: &mut PendingAction) -> bool {
        let Some(claim) = pending.action.claim() else {
            return true;
        };
        let source = pending.source;
        let action_name = pending.action.name();

        let (valid, certificate) = if !self.state.player(source).holds(claim) {
            warn!(action = action_name, "bluff detected, skipping proof generation");
            (false, EMPTY_CERTIFICATE.to_string())
        } else {
            let request = ProofRequest {
                claim,
                hand: self.state.player(source).characters(),
                salt: self.state.salt,
                commitment: self.state.commitment.clone(),
            };
            match self.oracle.attempt(&request).await {
                Ok(attestation) => (attestation.valid, attestation.certificate),
                Err(err) => {
                    warn!(%err, action = action_name, "proof generation failed");
                    (false, EMPTY_CERTIFICATE.to_string())
                }
            }
        };

        self.state.proofs.push(ProofRecord::new(pending.action.clone(), source, valid, certificate));
        pending.proved = true;

        if valid {
            self.log(format!("[ZK] Proof for {action_name} accrued."));
        } else {
            self.log(format!("[ZK] Bluff for {action_name} recorded."));
        }

        valid
    }

    async fn recompute_commitment(&mut self) {
        let hand = self.state.player(self.local).characters();
        match self.scheme.fingerprint(hand, self.state.salt).await {
            Ok(commitment) => {
                debug!(%commitment, "commitment updated after exchange");
                self.state.commitment = commitment;
            }
            Err(err) => {
                // previous commitment stays in place
                warn!(%err, "failed to recompute commitment");
                self.log("Commitment could not be recomputed.".to_string());
            }
        }
    }

    /// Kills the chosen living card, or the first living one.
    fn eliminate(&mut self, seat: Seat, card: Option<usize>) -> Option<usize> {
        let player = self.player_mut(seat);
        let card_idx = card
            .filter(|&idx| player.hand.get(idx).is_some_and(Card::is_alive))
            .or_else(|| player.first_living())?;

        let lost = &mut player.hand[card_idx];
        lost.dead = true;
        lost.revealed = true;
        lost.reveal_countdown = 0;
        let character = lost.character;
        player.lives = player.lives.saturating_sub(1);

        self.log(format!("{seat} lost their {:?} influence.", character));
        self.check_win_condition();
        Some(card_idx)
    }

    fn check_win_condition(&mut self) {
        if self.state.winner.is_some() {
            return;
        }

        let winner = match (self.state.players[0].is_out(), self.state.players[1].is_out()) {
            (true, true) => Winner::Draw,
            (true, false) => Winner::Player(Seat::P2),
            (false, true) => Winner::Player(Seat::P1),
            (false, false) => return,
        };

        self.state.winner = Some(winner);
        match winner {
            Winner::Player(seat) => self.log(format!("GAME OVER! {seat} wins!")),
            Winner::Draw => self.log("GAME OVER! Draw.".to_string()),
        }
    }

    fn go_next_turn(&mut self) {
        // reset state
        self.state.pending = None;
        self.state.phase = Phase::MainTurn;

        if self.state.winner.is_some() {
            return;
        }

        let next = self.state.turn.other();
        let mut hidden = false;
        for card in self.player_mut(next).hand.iter_mut() {
            if card.reveal_countdown > 0 {
                card.reveal_countdown -= 1;
                if card.reveal_countdown == 0 && !card.dead {
                    card.revealed = false;
                    hidden = true;
                }
            }
        }
        if hidden {
            self.log(format!("{next} card hidden again."));
        }

        self.state.turn = next;
        self.state.turn_count += 1;
        debug!(turn = %next, "turn complete");
    }

    /// Clone in which everything `viewer` can't see has been resampled.
    pub fn determine<R: Rng>(&self, viewer: Seat, rng: &mut R) -> Engine {
        let mut determinization = self.clone();
        let opponent = viewer.other();

        let mut unseen: Vec<Character> = {
            let state = &determinization.state;
            CHARACTER_VARIANTS
                .iter()
                .copied()
                .filter(|character| {
                    !state.player(viewer).hand.iter().any(|card| card.character == *character)
                        && !state.player(opponent).hand.iter().any(|card| card.revealed && card.character == *character)
                })
                .collect()
        };
        unseen.shuffle(rng);

        for card in determinization.player_mut(opponent).hand.iter_mut() {
            if card.is_alive() && !card.revealed {
                if let Some(character) = unseen.pop() {
                    card.character = character;
                }
            }
        }

        // playouts prove claims in-process against the resampled hand
        determinization.oracle = Arc::new(LocalOracle);
        determinization.scheme = Arc::new(Sha256Commitment);
        let local_hand = determinization.state.player(determinization.local).characters();
        determinization.state.commitment = hand_digest(local_hand, determinization.state.salt);
        determinization.rng = Pcg64::seed_from_u64(rng.gen());

        determinization
    }

    pub fn audit(&self) -> AuditReport {
        AuditReport {
            session_id: self.state.id.clone(),
            commitment: self.state.commitment.clone(),
            salt: self.state.salt,
            hand: self.state.player(self.local).characters(),
            proofs: self.state.proofs.clone(),
            winner: self.state.winner,
        }
    }

    fn player_mut(&mut self, seat: Seat) -> &mut Player {
        &mut self.state.players[seat.index()]
    }

    fn log(&mut self, msg: String) {
        info!("{msg}");
        self.state.logs.push(msg);
    }
}
