// determinized flat monte carlo: resample the hidden cards, play each move out at random

use rand::Rng;
use tracing::{debug, warn};
use crate::action::Move;
use crate::{Engine, Winner};

pub const MAX_PLAYOUT_STEPS: usize = 400;

/// Plays random legal moves until someone wins or `max_steps` runs out.
pub async fn simulate<R: Rng + Send>(game: &Engine, rng: &mut R, max_steps: usize) -> Option<Winner> {
    let mut game = game.clone();

    for _ in 0..max_steps {
        if let Some(winner) = game.winner() {
            return Some(winner);
        }

        let mut moves = game.legal_moves();
        if moves.is_empty() {
            return game.winner();
        }

        let random_index = rng.gen_range(0..moves.len());
        let random_move = moves.swap_remove(random_index);

        if let Err(err) = game.play(random_move).await {
            warn!(%err, "playout move rejected");
            return None;
        }
    }

    game.winner()
}

pub async fn choose_move<R: Rng + Send>(game: &Engine, rng: &mut R, num_determinizations: usize, num_simulations: usize) -> Option<Move> {
    let seat = game.to_move()?;

    // moves are the same between the determinization and the current game
    let moves = game.legal_moves();
    if moves.len() <= 1 {
        return moves.into_iter().next();
    }

    let mut scores = vec![0f32; moves.len()];

    for _ in 0..num_determinizations {
        let determinization = game.determine(seat, rng);

        for (move_idx, mv) in moves.iter().enumerate() {
            let mut after = determinization.clone();
            if after.play(mv.clone()).await.is_err() {
                continue;
            }

            for _ in 0..num_simulations {
                if simulate(&after, rng, MAX_PLAYOUT_STEPS).await == Some(Winner::Player(seat)) {
                    scores[move_idx] += 1f32;
                }
            }
        }
    }

    let best = scores
        .iter()
        .enumerate()
        .fold(0, |best, (idx, &score)| if score > scores[best] { idx } else { best });

    debug!(%seat, chosen = %moves[best], score = scores[best], "bot selected move");
    Some(moves[best].clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use crate::ai::{choose_move, simulate, MAX_PLAYOUT_STEPS};
    use crate::{Action, Engine, LocalOracle, MatchConfig, Move, Seat, Sha256Commitment};

    async fn fresh(seed: u64) -> Engine {
        let config = MatchConfig { seed: Some(seed), ..MatchConfig::default() };
        Engine::start(&config, Arc::new(LocalOracle), Arc::new(Sha256Commitment)).await
    }

    #[tokio::test]
    async fn playouts_finish() {
        let game = fresh(3).await;
        let mut rng = Pcg64::seed_from_u64(3);

        for _ in 0..20 {
            assert!(simulate(&game, &mut rng, MAX_PLAYOUT_STEPS).await.is_some());
        }
        // the source game is untouched
        assert_eq!(game.state().turn_count, 0);
    }

    #[tokio::test]
    async fn bot_picks_a_legal_move() {
        let mut game = fresh(8).await;
        game.apply_action(Seat::P1, Action::Income).await.unwrap();

        let mut rng = Pcg64::seed_from_u64(8);
        let chosen = choose_move(&game, &mut rng, 2, 4).await.unwrap();

        assert_eq!(chosen.seat(), Seat::P2);
        assert!(game.legal_moves().contains(&chosen));
    }

    #[tokio::test]
    async fn nothing_to_choose_after_game_over() {
        let mut game = fresh(8).await;
        let opponent: Vec<_> = game.state().players[1].characters().to_vec();
        game.play(Move::Propose(Seat::P1, Action::CoupDeGrace { guess: [opponent[0], opponent[1]] })).await.unwrap();

        let mut rng = Pcg64::seed_from_u64(1);
        assert_eq!(choose_move(&game, &mut rng, 1, 1).await, None);
    }
}
