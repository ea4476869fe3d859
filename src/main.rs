//! Demo match: a random local player against the playout bot.

use std::sync::Arc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use coup_duel::{LocalOracle, MatchConfig, Session, Sha256Commitment};

const CONFIG_ENV: &str = "COUP_DUEL_CONFIG";
const MAX_MOVES: usize = 1000;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => match MatchConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%path, %err, "could not load config");
                std::process::exit(1);
            }
        },
        Err(_) => MatchConfig::default(),
    };

    let session = Session::start(&config, Arc::new(LocalOracle), Arc::new(Sha256Commitment)).await;
    let local = config.local_seat;
    let mut rng = match config.seed {
        Some(seed) => Pcg64::seed_from_u64(seed.wrapping_add(1)),
        None => Pcg64::from_entropy(),
    };

    for _ in 0..MAX_MOVES {
        let (to_move, mut moves) = session.legal_moves().await;
        let Some(seat) = to_move else {
            break;
        };

        let mv = if seat == local {
            moves.swap_remove(rng.gen_range(0..moves.len()))
        } else {
            match session.bot_move(&mut rng, 4, 8).await {
                Some(mv) => mv,
                None => break,
            }
        };

        info!("{mv}");
        if let Err(err) = session.play(mv).await {
            error!(%err, "move rejected");
            break;
        }
    }

    let view = session.snapshot().await;
    info!(winner = ?view.winner, "game over");

    match session.audit().await.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => error!(%err, "failed to serialize audit report"),
    }
}
