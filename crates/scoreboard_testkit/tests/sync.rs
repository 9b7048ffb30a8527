//! Two contexts sharing a store and a hub.

use scoreboard_core::{
    Config, ContextId, SyncEnvelope, SyncMessage, TimestampGate, Tournament, SCHEMA_VERSION,
};
use scoreboard_storage::InMemoryStore;
use scoreboard_testkit::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn update(timestamp: u64, tournaments: Vec<Tournament>) -> SyncEnvelope {
    update_from(ContextId::new(), timestamp, tournaments)
}

fn update_from(origin: ContextId, timestamp: u64, tournaments: Vec<Tournament>) -> SyncEnvelope {
    SyncEnvelope {
        version: SCHEMA_VERSION,
        origin,
        timestamp,
        message: SyncMessage::TournamentUpdate {
            tournaments,
            tournament_id: None,
        },
    }
}

#[test]
fn contexts_observe_each_other() {
    let (mut a, mut b) = context_pair();
    a.create_tournament("Cup");
    let id = a.current().unwrap().id.clone();

    assert!(b.pump_sync() >= 1);
    assert_eq!(b.tournaments(), a.tournaments());

    b.load_tournament(&id);
    b.add_team("Red");
    assert!(a.pump_sync() >= 1);
    assert_eq!(a.current().unwrap().teams.len(), 1);
    assert_eq!(a.current().unwrap().teams[0].name, "Red");
}

#[test]
fn duplicate_delivery_applies_once() {
    let (mut a, mut b) = context_pair();
    a.create_tournament("Cup");

    // hub and slot both carry the same envelope
    assert_eq!(b.pump_sync(), 1);
    assert_eq!(b.pump_sync(), 0);
}

#[test]
fn listeners_see_remote_announcements() {
    let (mut a, b) = context_pair();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let subscription = b
        .sync()
        .unwrap()
        .subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    a.create_tournament("Cup");
    b.sync().unwrap().pump();
    assert!(seen.load(Ordering::SeqCst) >= 1);

    drop(subscription);
    let before = seen.load(Ordering::SeqCst);
    a.add_team("Red");
    b.sync().unwrap().pump();
    assert_eq!(seen.load(Ordering::SeqCst), before);
}

#[test]
fn slot_works_without_hub() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let mut a = TestScoreboard::with_store(store.clone(), None, Config::default());
    let mut b = TestScoreboard::with_store(store, None, Config::default());

    a.create_tournament("Cup");
    assert_eq!(b.pump_sync(), 1);
    assert_eq!(b.tournaments().len(), 1);
}

#[test]
fn reconcile_ignores_stale_envelopes() {
    let mut t = TestScoreboard::memory();
    let newer = update(200, vec![Tournament::new("Newer")]);
    let older = update(100, vec![Tournament::new("Older")]);

    assert!(t.reconcile(&newer));
    assert!(!t.reconcile(&older));
    assert!(!t.reconcile(&newer));
    assert_eq!(t.tournaments()[0].name, "Newer");
}

#[test]
fn reconcile_refreshes_current() {
    let mut t = cup_with_teams(&["Red"]);
    let renamed = {
        let mut cup = t.current().unwrap().add_team("Blue");
        cup.name = "Cup Final".to_string();
        cup
    };

    let envelope = update(u64::MAX, vec![renamed.clone()]);
    assert!(t.reconcile(&envelope));
    assert_eq!(t.current(), Some(&renamed));

    // A repeat of the same envelope is a duplicate
    assert!(!t.reconcile(&envelope));
}

#[test]
fn reconcile_clears_current_when_deleted_remotely() {
    let mut t = cup_with_teams(&[]);
    assert!(t.reconcile(&update(u64::MAX, Vec::new())));
    assert!(t.current().is_none());
    assert!(t.tournaments().is_empty());
}

#[test]
fn reconcile_does_not_persist() {
    let mut t = TestScoreboard::memory();
    t.reconcile(&update(1, vec![Tournament::new("Remote")]));
    assert!(t.stored_tournaments().is_empty());
}

#[test]
fn gate_drops_stragglers() {
    let origin = ContextId::new();
    let mut gate = TimestampGate::new();
    let envelopes: Vec<_> = [5, 3, 5, 8, 7]
        .into_iter()
        .map(|ts| update_from(origin, ts, Vec::new()))
        .collect();
    let admitted: Vec<u64> = envelopes
        .iter()
        .filter(|e| gate.admit(e))
        .map(|e| e.timestamp)
        .collect();
    assert_eq!(admitted, [5, 8]);
}

/// Both contexts write whole collections from their own view, so the
/// later writer overwrites the earlier one's change.
#[test]
fn stale_writers_lose_updates() {
    let (mut a, mut b) = context_pair();
    a.create_tournament("Cup");
    b.pump_sync();
    let id = a.current().unwrap().id.clone();
    b.load_tournament(&id);

    a.add_team("Red");
    b.add_team("Blue");

    let stored = a.stored_tournaments();
    let names: Vec<_> = stored[0].teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Blue"]);
}

#[test]
fn own_write_is_not_rolled_back_by_older_remote_state() {
    let (mut a, mut b) = context_pair();
    a.create_tournament("Cup");
    b.pump_sync();
    let id = a.current().unwrap().id.clone();
    b.load_tournament(&id);

    b.add_team("Blue");
    thread::sleep(Duration::from_millis(5));
    a.add_team("Red");

    assert_eq!(a.pump_sync(), 0);
    assert_eq!(a.tournaments(), a.stored_tournaments().as_slice());
    let names: Vec<_> = a.current().unwrap().teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Red"]);

    // The next write from A keeps its own edit
    a.add_team("Green");
    let stored = a.stored_tournaments();
    let names: Vec<_> = stored[0].teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Red", "Green"]);
}

#[test]
fn same_millisecond_writers_converge_on_one_winner() {
    let (low, high) = {
        let (x, y) = (ContextId::new(), ContextId::new());
        if x < y {
            (x, y)
        } else {
            (y, x)
        }
    };
    let from_low = update_from(low, 1_000, vec![Tournament::new("Low")]);
    let from_high = update_from(high, 1_000, vec![Tournament::new("High")]);

    let mut first = TestScoreboard::memory();
    assert!(first.reconcile(&from_low));
    assert!(first.reconcile(&from_high));

    let mut second = TestScoreboard::memory();
    assert!(second.reconcile(&from_high));
    assert!(!second.reconcile(&from_low));

    assert_eq!(first.tournaments()[0].name, "High");
    assert_eq!(second.tournaments()[0].name, "High");
}

#[test]
fn remote_clock_ahead_does_not_hide_later_local_writes() {
    let (mut a, mut b) = context_pair();
    let ahead = update(u64::MAX / 2, vec![Tournament::new("Remote")]);
    assert!(a.reconcile(&ahead));
    assert!(b.reconcile(&ahead));

    a.create_tournament("Local");
    assert_eq!(b.pump_sync(), 1);
    assert_eq!(b.tournaments().len(), 2);
}
