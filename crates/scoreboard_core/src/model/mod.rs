//! Tournament model.
//!
//! Every transformation here is pure: it takes `&self` and returns a new
//! value, leaving its input untouched. The pipeline in
//! [`crate::scoreboard`] decides when a transformed value replaces the
//! stored one.

mod id;
pub(crate) mod number;
mod score;
mod token;
mod tournament;

pub use id::{AuthKeyId, EntryId, TeamId, TournamentId};
pub use score::{FieldChange, ScoreField, ScoreUpdate};
pub use token::random_token;
pub use tournament::{AuthKey, Team, Tournament};
