//! Scoreboard fixtures.
//!
//! Every fixture owns its store and an [`EditorSession`] that starts signed
//! in as [`EDITOR`]; sign out to exercise viewer paths.

use scoreboard_core::{BroadcastHub, Config, EditorSession, Scoreboard, TeamId, Tournament};
use scoreboard_storage::{DurableStore, FileStore, InMemoryStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Editor name the fixtures sign in with.
pub const EDITOR: &str = "Nithi";

/// A scoreboard with its store, session and cleanup.
pub struct TestScoreboard {
    /// The scoreboard under test.
    pub board: Scoreboard,
    /// The session behind the oracle and identity provider.
    pub session: Arc<EditorSession>,
    /// The raw store, for inspecting persisted bytes.
    pub store: Arc<dyn DurableStore>,
    _temp_dir: Option<TempDir>,
}

impl TestScoreboard {
    /// Creates a scoreboard over a fresh in-memory store.
    pub fn memory() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()), None, Config::default())
    }

    /// Creates a scoreboard over a file store in a temp directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(temp_dir.path()).expect("Failed to open file store");
        let mut fixture = Self::with_store(Arc::new(store), None, Config::default());
        fixture._temp_dir = Some(temp_dir);
        fixture
    }

    /// Creates a scoreboard over `store`, optionally joined to `hub`.
    pub fn with_store(
        store: Arc<dyn DurableStore>,
        hub: Option<Arc<BroadcastHub>>,
        config: Config,
    ) -> Self {
        let session = Arc::new(EditorSession::signed_in(EDITOR));
        let board = open_board(Arc::clone(&store), Arc::clone(&session), hub, config);
        Self {
            board,
            session,
            store,
            _temp_dir: None,
        }
    }

    /// Opens another scoreboard over the same store and session, as a
    /// restarted process would.
    pub fn reopen(&self) -> Scoreboard {
        open_board(
            Arc::clone(&self.store),
            Arc::clone(&self.session),
            None,
            self.board.config().clone(),
        )
    }

    /// Signs the fixture's editor back in.
    pub fn sign_in(&self) {
        self.session.sign_in(EDITOR);
    }

    /// Signs out, turning the session into a viewer.
    pub fn sign_out(&self) {
        self.session.sign_out();
    }

    /// Id of the current tournament's team called `name`.
    pub fn team_id(&self, name: &str) -> TeamId {
        self.board
            .current()
            .expect("No current tournament")
            .teams
            .iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("No team named {name}"))
            .id
            .clone()
    }

    /// The tournaments collection as persisted.
    pub fn stored_tournaments(&self) -> Vec<Tournament> {
        self.store
            .load("tournaments")
            .expect("Failed to read store")
            .map(|bytes| {
                serde_json::from_slice(&bytes).expect("Stored tournaments are malformed")
            })
            .unwrap_or_default()
    }
}

impl std::ops::Deref for TestScoreboard {
    type Target = Scoreboard;

    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

impl std::ops::DerefMut for TestScoreboard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.board
    }
}

fn open_board(
    store: Arc<dyn DurableStore>,
    session: Arc<EditorSession>,
    hub: Option<Arc<BroadcastHub>>,
    config: Config,
) -> Scoreboard {
    let builder = Scoreboard::builder(store)
        .oracle(session.clone())
        .identity(session)
        .config(config);
    match hub {
        Some(hub) => builder.hub(hub).open(),
        None => builder.open(),
    }
}

/// An in-memory scoreboard with tournament "Cup" open and `teams` added.
pub fn cup_with_teams(teams: &[&str]) -> TestScoreboard {
    let mut fixture = TestScoreboard::memory();
    assert!(fixture.create_tournament("Cup").is_applied());
    for name in teams {
        assert!(fixture.add_team(*name).is_applied());
    }
    fixture
}

/// Two contexts sharing one in-memory store and one hub.
pub fn context_pair() -> (TestScoreboard, TestScoreboard) {
    let store: Arc<dyn DurableStore> = Arc::new(InMemoryStore::new());
    let hub = Arc::new(BroadcastHub::default());
    let a = TestScoreboard::with_store(
        Arc::clone(&store),
        Some(Arc::clone(&hub)),
        Config::default(),
    );
    let b = TestScoreboard::with_store(store, Some(hub), Config::default());
    (a, b)
}

/// Runs a test with a temporary in-memory scoreboard.
pub fn with_board<F, R>(f: F) -> R
where
    F: FnOnce(&mut Scoreboard) -> R,
{
    let mut fixture = TestScoreboard::memory();
    f(&mut fixture.board)
}
