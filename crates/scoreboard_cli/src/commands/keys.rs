//! Auth key commands.

use super::{open, select, Scope};
use crate::error::{applied, CliResult};
use scoreboard_core::AuthKeyId;
use std::path::Path;
use tracing::info;

/// Issue a key for `username` and print the token.
pub fn issue(path: &Path, editor: Option<&str>, scope: &Scope, username: &str) -> CliResult<()> {
    info!("Issuing auth key for {:?}", username);
    let mut board = open(path, editor)?;
    select(&mut board, scope)?;
    let token = board.issue_auth_key(username)?;
    println!("✓ Auth key issued");
    println!("  User: {username}");
    println!("  Key: {token}");
    Ok(())
}

/// Revoke a key by id.
pub fn revoke(path: &Path, scope: &Scope, key_id: &str) -> CliResult<()> {
    info!("Revoking auth key {}", key_id);
    let mut board = open(path, None)?;
    select(&mut board, scope)?;
    applied(board.revoke_auth_key(&AuthKeyId::from(key_id)))?;
    println!("✓ Auth key revoked");
    Ok(())
}

/// List the keys of a tournament.
pub fn list(path: &Path, scope: &Scope) -> CliResult<()> {
    let mut board = open(path, None)?;
    select(&mut board, scope)?;

    let keys = board
        .current()
        .map(|t| t.auth_keys.as_slice())
        .unwrap_or_default();
    println!("Auth keys ({}/{})", keys.len(), board.config().max_auth_keys);
    for key in keys {
        println!(
            "  {}  {:<16} {}  created: {}{}",
            key.id,
            key.username,
            key.key,
            key.created_at.format("%Y-%m-%d %H:%M"),
            if key.is_active { "" } else { "  (inactive)" }
        );
    }
    Ok(())
}
