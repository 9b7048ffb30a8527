//! Entity identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares an opaque, text-backed identifier.
///
/// Fresh identifiers are UUIDv7 strings, so they sort by creation time.
/// Any text is accepted on load: stored data may carry identifiers minted
/// by older writers.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new time-ordered identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Returns the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a tournament. Unique across the tournament collection.
    TournamentId
);

string_id!(
    /// Identifier of a team within its tournament.
    TeamId
);

string_id!(
    /// Identifier of an auth key within its tournament.
    AuthKeyId
);

string_id!(
    /// Identifier of a change log entry.
    EntryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_unique() {
        let id1 = TournamentId::new();
        let id2 = TournamentId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn accepts_foreign_text() {
        let id = TournamentId::from("1718000000000");
        assert_eq!(id.as_str(), "1718000000000");
        assert_eq!(format!("{id}"), "1718000000000");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = AuthKeyId::from("k-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"k-1\"");
        let back: AuthKeyId = serde_json::from_str("\"k-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn debug_names_the_kind() {
        let id = EntryId::from("e");
        assert_eq!(format!("{id:?}"), "EntryId(e)");
    }
}
