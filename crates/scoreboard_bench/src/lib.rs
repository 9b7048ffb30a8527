//! Benchmark utilities.

use rand::Rng;
use scoreboard_core::{ScoreUpdate, Scoreboard, StaticOracle, TeamId};
use scoreboard_storage::DurableStore;
use std::sync::Arc;

/// Opens an always-editor scoreboard over `store`.
pub fn editor_board(store: Arc<dyn DurableStore>) -> Scoreboard {
    Scoreboard::builder(store)
        .oracle(Arc::new(StaticOracle::ALLOW))
        .open()
}

/// Creates a tournament with `teams` teams and makes it current.
pub fn populate(board: &mut Scoreboard, teams: usize) {
    board.create_tournament("Bench Cup");
    for i in 0..teams {
        board.add_team(format!("Team {i:03}"));
    }
}

/// Ids of the current tournament's teams.
pub fn team_ids(board: &Scoreboard) -> Vec<TeamId> {
    board
        .current()
        .map(|t| t.teams.iter().map(|team| team.id.clone()).collect())
        .unwrap_or_default()
}

/// A random sparse score update.
pub fn random_update() -> ScoreUpdate {
    let mut rng = rand::thread_rng();
    let mut update = ScoreUpdate::new();
    if rng.gen_bool(0.5) {
        update = update.points(rng.gen_range(-10i32..100));
    }
    if rng.gen_bool(0.5) {
        update = update.wins(rng.gen_range(0i32..20));
    }
    if rng.gen_bool(0.3) {
        update = update.rounds(rng.gen_range(0i32..40));
    }
    update
}

/// Generate random value bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}
