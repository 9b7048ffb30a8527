//! Scoreboard configuration.

/// Shortest share code the pipeline generates.
pub const MIN_SHARE_CODE_LEN: usize = 4;

/// Configuration for opening a [`crate::Scoreboard`].
#[derive(Debug, Clone)]
pub struct Config {
    /// How many automatic backups to retain (newest first).
    pub max_backups: usize,

    /// How many change log entries to retain (newest first).
    pub max_change_log: usize,

    /// Maximum number of auth keys per tournament.
    pub max_auth_keys: usize,

    /// Length of generated share codes. Values below
    /// [`MIN_SHARE_CODE_LEN`] are raised to it.
    pub share_code_len: usize,

    /// Length of generated auth key tokens.
    pub auth_key_len: usize,

    /// Whether mutations are announced to other contexts.
    pub sync_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_backups: 50,
            max_change_log: 500,
            max_auth_keys: 10,
            share_code_len: 7,
            auth_key_len: 26,
            sync_enabled: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of retained backups.
    #[must_use]
    pub const fn max_backups(mut self, value: usize) -> Self {
        self.max_backups = value;
        self
    }

    /// Sets the number of retained change log entries.
    #[must_use]
    pub const fn max_change_log(mut self, value: usize) -> Self {
        self.max_change_log = value;
        self
    }

    /// Sets the per-tournament auth key cap.
    #[must_use]
    pub const fn max_auth_keys(mut self, value: usize) -> Self {
        self.max_auth_keys = value;
        self
    }

    /// Sets the share code length, at least [`MIN_SHARE_CODE_LEN`].
    #[must_use]
    pub const fn share_code_len(mut self, value: usize) -> Self {
        self.share_code_len = if value < MIN_SHARE_CODE_LEN {
            MIN_SHARE_CODE_LEN
        } else {
            value
        };
        self
    }

    /// Sets whether mutations are broadcast.
    #[must_use]
    pub const fn sync_enabled(mut self, value: bool) -> Self {
        self.sync_enabled = value;
        self
    }
}
