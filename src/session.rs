//! Match Session
//!
//! Owns one engine per match and serializes every mutation through a lock,
//! publishing a fresh snapshot to subscribers after each accepted call.
//!
//! Mutations run on a spawned task that owns the lock guard, so a resolution
//! that has begun finishes even when the caller stops waiting for it.

use std::sync::Arc;
use rand::Rng;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};
use crate::action::{Action, Move, Response};
use crate::ai::choose_move;
use crate::audit::AuditReport;
use crate::proof::{CommitmentScheme, ProofOracle};
use crate::view::GameView;
use crate::{CoupError, Engine, MatchConfig, Seat};

pub struct Session {
    engine: Arc<Mutex<Engine>>,
    updates: Arc<watch::Sender<GameView>>,
}

enum Mutation {
    Play(Move),
    Respond(Response),
}

impl Session {
    pub async fn start(config: &MatchConfig, oracle: Arc<dyn ProofOracle>, scheme: Arc<dyn CommitmentScheme>) -> Self {
        Self::from_engine(Engine::start(config, oracle, scheme).await)
    }

    pub fn from_engine(engine: Engine) -> Self {
        let (updates, _) = watch::channel(engine.snapshot());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            updates: Arc::new(updates),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GameView> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> GameView {
        self.engine.lock().await.snapshot()
    }

    pub async fn propose(&self, source: Seat, action: Action) -> Result<GameView, CoupError> {
        self.play(Move::Propose(source, action)).await
    }

    /// Responds as whichever seat the pending action is waiting on.
    pub async fn respond(&self, response: Response) -> Result<GameView, CoupError> {
        self.mutate(Mutation::Respond(response)).await
    }

    pub async fn play(&self, mv: Move) -> Result<GameView, CoupError> {
        debug!(%mv, "session move");
        self.mutate(Mutation::Play(mv)).await
    }

    pub async fn legal_moves(&self) -> (Option<Seat>, Vec<Move>) {
        let engine = self.engine.lock().await;
        (engine.to_move(), engine.legal_moves())
    }

    /// Runs the playout bot for whoever is to move, without mutating the match.
    pub async fn bot_move<R: Rng + Send>(&self, rng: &mut R, num_determinizations: usize, num_simulations: usize) -> Option<Move> {
        let engine = self.engine.lock().await.clone();
        choose_move(&engine, rng, num_determinizations, num_simulations).await
    }

    pub async fn audit(&self) -> AuditReport {
        self.engine.lock().await.audit()
    }

    async fn mutate(&self, mutation: Mutation) -> Result<GameView, CoupError> {
        let engine = self.engine.clone();
        let updates = self.updates.clone();

        let task = tokio::spawn(async move {
            let mut engine = engine.lock_owned().await;
            match mutation {
                Mutation::Play(mv) => engine.play(mv).await?,
                Mutation::Respond(response) => engine.apply_response(response).await?,
            }
            Ok::<_, CoupError>(publish(&engine, &updates))
        });

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                error!(%err, "session mutation was cancelled");
                Err(CoupError::Interrupted)
            }
        }
    }
}

fn publish(engine: &Engine, updates: &watch::Sender<GameView>) -> GameView {
    let view = engine.snapshot();
    if let Some(winner) = view.winner {
        info!(session = %view.id, ?winner, "match finished");
    }
    updates.send_replace(view.clone());
    view
}
