//! Property-based test generators using proptest.

use proptest::prelude::*;
use scoreboard_core::{ScoreField, ScoreUpdate, Tournament};

/// Strategy for team names.
pub fn team_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,15}").expect("Invalid regex")
}

/// Strategy for counter values: whole and half points, negatives included.
pub fn counter_strategy() -> impl Strategy<Value = f64> {
    (-100i32..1000).prop_map(|halves| f64::from(halves) / 2.0)
}

/// Strategy for sparse score updates, including the empty one.
pub fn score_update_strategy() -> impl Strategy<Value = ScoreUpdate> {
    (
        prop::option::of(counter_strategy()),
        prop::option::of(counter_strategy()),
        prop::option::of(counter_strategy()),
        prop::option::of(counter_strategy()),
    )
        .prop_map(|(rounds, wins, losses, points)| ScoreUpdate {
            rounds,
            wins,
            losses,
            points,
        })
}

/// Strategy for a score field.
pub fn score_field_strategy() -> impl Strategy<Value = ScoreField> {
    prop::sample::select(ScoreField::ALL.to_vec())
}

/// Strategy for `(name, points)` rosters.
pub fn roster_strategy(max_teams: usize) -> impl Strategy<Value = Vec<(String, f64)>> {
    prop::collection::vec((team_name_strategy(), counter_strategy()), 0..=max_teams)
}

/// Strategy for tournaments with scored teams and a few auth keys.
pub fn tournament_strategy() -> impl Strategy<Value = Tournament> {
    (
        team_name_strategy(),
        prop::collection::vec((team_name_strategy(), score_update_strategy()), 0..8),
        prop::collection::vec(team_name_strategy(), 0..4),
    )
        .prop_map(|(name, teams, users)| {
            let mut tournament = Tournament::new(name);
            for (team, update) in teams {
                tournament = tournament.add_team(team);
                let id = tournament.teams[tournament.teams.len() - 1].id.clone();
                tournament = tournament.update_team_score(&id, update);
            }
            for user in users {
                tournament = tournament
                    .issue_auth_key(user, 10, 26)
                    .map(|(issued, _)| issued)
                    .unwrap_or(tournament);
            }
            tournament
        })
}
