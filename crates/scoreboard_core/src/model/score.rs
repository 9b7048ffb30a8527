//! Sparse score updates.

use super::tournament::Team;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of a team's four counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreField {
    /// Rounds played.
    Rounds,
    /// Rounds won.
    Wins,
    /// Rounds lost.
    Losses,
    /// Ranking points.
    Points,
}

impl ScoreField {
    /// All fields in display order.
    pub const ALL: [ScoreField; 4] = [Self::Rounds, Self::Wins, Self::Losses, Self::Points];

    /// Reads this field from a team.
    #[must_use]
    pub fn get(self, team: &Team) -> f64 {
        match self {
            Self::Rounds => team.rounds,
            Self::Wins => team.wins,
            Self::Losses => team.losses,
            Self::Points => team.points,
        }
    }

    /// Returns the field's display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rounds => "Rounds",
            Self::Wins => "Wins",
            Self::Losses => "Losses",
            Self::Points => "Points",
        }
    }
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A counter whose value differs between two versions of a team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldChange {
    /// Which counter changed.
    pub field: ScoreField,
    /// Value before the update.
    pub old: f64,
    /// Value after the update.
    pub new: f64,
}

/// A sparse update to a team's counters.
///
/// Fields left as `None` keep their current value. An empty update is
/// valid and changes nothing. Values are not validated: negative and
/// fractional counters are accepted as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    /// New rounds value.
    pub rounds: Option<f64>,
    /// New wins value.
    pub wins: Option<f64>,
    /// New losses value.
    pub losses: Option<f64>,
    /// New points value.
    pub points: Option<f64>,
}

impl ScoreUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets rounds.
    #[must_use]
    pub fn rounds(mut self, value: impl Into<f64>) -> Self {
        self.rounds = Some(value.into());
        self
    }

    /// Sets wins.
    #[must_use]
    pub fn wins(mut self, value: impl Into<f64>) -> Self {
        self.wins = Some(value.into());
        self
    }

    /// Sets losses.
    #[must_use]
    pub fn losses(mut self, value: impl Into<f64>) -> Self {
        self.losses = Some(value.into());
        self
    }

    /// Sets points.
    #[must_use]
    pub fn points(mut self, value: impl Into<f64>) -> Self {
        self.points = Some(value.into());
        self
    }

    /// Sets one field by name.
    #[must_use]
    pub fn set(self, field: ScoreField, value: impl Into<f64>) -> Self {
        match field {
            ScoreField::Rounds => self.rounds(value),
            ScoreField::Wins => self.wins(value),
            ScoreField::Losses => self.losses(value),
            ScoreField::Points => self.points(value),
        }
    }

    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rounds.is_none() && self.wins.is_none() && self.losses.is_none() && self.points.is_none()
    }

    /// Returns a copy of `team` with the set fields replaced.
    #[must_use]
    pub fn apply(&self, team: &Team) -> Team {
        Team {
            rounds: self.rounds.unwrap_or(team.rounds),
            wins: self.wins.unwrap_or(team.wins),
            losses: self.losses.unwrap_or(team.losses),
            points: self.points.unwrap_or(team.points),
            ..team.clone()
        }
    }

    /// Lists the counters that differ between `before` and `after`, in
    /// [`ScoreField::ALL`] order.
    #[must_use]
    pub fn diff(before: &Team, after: &Team) -> Vec<FieldChange> {
        ScoreField::ALL
            .iter()
            .filter_map(|&field| {
                let old = field.get(before);
                let new = field.get(after);
                (old != new).then_some(FieldChange { field, old, new })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team() -> Team {
        Team {
            rounds: 5.0,
            wins: 3.0,
            losses: 2.0,
            points: 9.0,
            ..Team::new("Red")
        }
    }

    #[test]
    fn empty_update_is_identity() {
        let before = team();
        let after = ScoreUpdate::new().apply(&before);
        assert!(ScoreUpdate::new().is_empty());
        assert_eq!(before, after);
        assert!(ScoreUpdate::diff(&before, &after).is_empty());
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let before = team();
        let after = ScoreUpdate::new().wins(4).apply(&before);

        assert_eq!(after.wins, 4.0);
        assert_eq!(after.rounds, 5.0);
        assert_eq!(after.losses, 2.0);
        assert_eq!(after.points, 9.0);
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
    }

    #[test]
    fn same_value_is_not_a_change() {
        let before = team();
        let after = ScoreUpdate::new().rounds(5).apply(&before);
        assert!(ScoreUpdate::diff(&before, &after).is_empty());
    }

    #[test]
    fn diff_lists_changed_fields_in_order() {
        let before = team();
        let after = ScoreUpdate::new().points(12).rounds(6).losses(2).apply(&before);

        assert_eq!(
            ScoreUpdate::diff(&before, &after),
            vec![
                FieldChange { field: ScoreField::Rounds, old: 5.0, new: 6.0 },
                FieldChange { field: ScoreField::Points, old: 9.0, new: 12.0 },
            ]
        );
    }

    #[test]
    fn negative_values_are_accepted() {
        let after = ScoreUpdate::new().points(-3).apply(&team());
        assert_eq!(after.points, -3.0);
    }

    #[test]
    fn fractional_values_are_accepted() {
        let before = team();
        let after = ScoreUpdate::new().points(9.5).apply(&before);
        assert_eq!(
            ScoreUpdate::diff(&before, &after),
            vec![FieldChange { field: ScoreField::Points, old: 9.0, new: 9.5 }]
        );
    }

    #[test]
    fn set_by_field() {
        let update = ScoreUpdate::new().set(ScoreField::Losses, 1);
        assert_eq!(update.losses, Some(1.0));
        assert!(update.rounds.is_none());
    }

    #[test]
    fn field_names() {
        let names: Vec<String> = ScoreField::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["Rounds", "Wins", "Losses", "Points"]);
    }
}
