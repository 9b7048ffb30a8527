//! Who may edit, and who is editing.
//!
//! The pipeline asks an [`EditorOracle`] before every gated mutation and an
//! [`IdentityProvider`] for the name stamped on audit entries. Neither is a
//! security boundary; both are answered by the embedding application.

use parking_lot::RwLock;

/// Name recorded when no actor is signed in.
pub const UNKNOWN_ACTOR: &str = "Unknown";

/// Answers whether the current actor may run gated mutations.
pub trait EditorOracle: Send + Sync {
    /// Returns true if the current actor is an editor.
    fn is_editor(&self) -> bool;
}

/// Names the current actor for audit attribution.
pub trait IdentityProvider: Send + Sync {
    /// Returns the actor's display name, if known.
    fn current_actor_name(&self) -> Option<String>;
}

/// An oracle with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticOracle(pub bool);

impl StaticOracle {
    /// Everyone is an editor.
    pub const ALLOW: Self = Self(true);
    /// Nobody is an editor.
    pub const DENY: Self = Self(false);
}

impl EditorOracle for StaticOracle {
    fn is_editor(&self) -> bool {
        self.0
    }
}

impl IdentityProvider for StaticOracle {
    fn current_actor_name(&self) -> Option<String> {
        None
    }
}

/// A sign-in session: whoever is signed in is an editor.
///
/// Shared between the pipeline and the UI layer behind an `Arc`; signing
/// in or out takes effect on the next operation.
#[derive(Debug, Default)]
pub struct EditorSession {
    editor: RwLock<Option<String>>,
}

impl EditorSession {
    /// Creates a session with nobody signed in.
    #[must_use]
    pub fn viewer() -> Self {
        Self::default()
    }

    /// Creates a session with `name` signed in.
    #[must_use]
    pub fn signed_in(name: impl Into<String>) -> Self {
        Self {
            editor: RwLock::new(Some(name.into())),
        }
    }

    /// Signs `name` in, replacing any current editor.
    pub fn sign_in(&self, name: impl Into<String>) {
        *self.editor.write() = Some(name.into());
    }

    /// Signs the current editor out.
    pub fn sign_out(&self) {
        *self.editor.write() = None;
    }

    /// The signed-in editor, if any.
    #[must_use]
    pub fn editor(&self) -> Option<String> {
        self.editor.read().clone()
    }
}

impl EditorOracle for EditorSession {
    fn is_editor(&self) -> bool {
        self.editor.read().is_some()
    }
}

impl IdentityProvider for EditorSession {
    fn current_actor_name(&self) -> Option<String> {
        self.editor()
    }
}
