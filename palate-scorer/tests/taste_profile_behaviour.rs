#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for the taste profile lifecycle.

use std::cell::RefCell;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use palate_core::record::{ClickKind, ClickRecord, FoodLogRecord};
use palate_core::test_support::{MemoryProfileStore, MemorySources};
use palate_core::{FeedKind, ProfileStore, SourceError, TasteProfile};
use palate_scorer::TasteProfileEngine;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const USER: &str = "u1";

/// Aggregate fixtures shared across the BDD scenarios.
pub struct TestContext {
    store: Arc<MemoryProfileStore>,
    failing_feed: RefCell<Option<FeedKind>>,
    served: RefCell<Option<TasteProfile>>,
    diagnostics: RefCell<Vec<SourceError>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        store: Arc::new(MemoryProfileStore::new()),
        failing_feed: RefCell::new(None),
        served: RefCell::new(None),
        diagnostics: RefCell::new(Vec::new()),
    }
}

/// Twenty-five food logs plus two explore clicks: enough history for a
/// complete profile.
fn build_engine(context: &TestContext) -> TasteProfileEngine<MemorySources, Arc<MemoryProfileStore>> {
    let food_logs = vec![
        FoodLogRecord {
            cuisine: "Thai".into(),
            food_type: "noodles".into(),
            eaten_at: Utc::now(),
            rating: Some(4.0),
        };
        25
    ];
    let clicks = vec![
        ClickRecord {
            restaurant_id: "R1".into(),
            cuisine_types: vec!["Thai".into()],
            kind: ClickKind::Explore,
        };
        2
    ];
    let mut sources = MemorySources::new()
        .with_food_logs(food_logs)
        .with_clicks(clicks);
    if let Some(feed) = *context.failing_feed.borrow() {
        sources = sources.with_failing_feed(feed);
    }
    TasteProfileEngine::new(sources, Arc::clone(&context.store))
}

#[given("a user with an extensive dining history")]
fn extensive_history(context: &TestContext) {
    // History lives in the sources built per step; nothing to stage
    // beyond a clean store.
    assert_eq!(context.store.writes(), 0);
}

#[given("their profile has already been computed")]
fn profile_already_computed(context: &TestContext) {
    build_engine(context)
        .get(USER, false)
        .expect("initial compute");
    assert_eq!(context.store.writes(), 1);
}

#[given("their stored profile is older than the freshness window")]
fn profile_is_stale(context: &TestContext) {
    let mut profile = build_engine(context)
        .get(USER, false)
        .expect("initial compute");
    profile.last_computed = Utc::now() - TimeDelta::hours(7);
    context.store.seed(profile);
}

#[given("the clicks feed is failing")]
fn clicks_feed_fails(context: &TestContext) {
    *context.failing_feed.borrow_mut() = Some(FeedKind::Clicks);
}

#[when("they request their taste profile")]
fn request_profile(context: &TestContext) {
    let profile = build_engine(context)
        .get(USER, false)
        .expect("get should succeed");
    *context.served.borrow_mut() = Some(profile);
}

#[when("their profile is recomputed with diagnostics")]
fn recompute_with_diagnostics(context: &TestContext) {
    let (profile, diagnostics) = build_engine(context)
        .compute_with_diagnostics(USER)
        .expect("compute should succeed");
    *context.served.borrow_mut() = Some(profile);
    *context.diagnostics.borrow_mut() = diagnostics;
}

#[when("they reset their taste profile")]
fn reset_profile(context: &TestContext) {
    build_engine(context).reset(USER).expect("reset");
}

#[then("the stored document is served without recomputation")]
fn assert_served_from_cache(context: &TestContext) {
    assert_eq!(context.store.writes(), 1, "no second write expected");
    let served = context.served.borrow();
    let stored = context
        .store
        .get(USER)
        .expect("read back")
        .expect("document present");
    assert_eq!(served.as_ref(), Some(&stored));
}

#[then("the profile is recomputed and persisted")]
fn assert_recomputed(context: &TestContext) {
    assert_eq!(context.store.writes(), 2, "expected a second write");
    let served = context.served.borrow();
    let profile = served.as_ref().expect("profile should be recorded");
    assert!(profile.is_complete());
}

#[then("the profile is built from the remaining feeds")]
fn assert_degraded_profile(context: &TestContext) {
    let served = context.served.borrow();
    let profile = served.as_ref().expect("profile should be recorded");
    assert_eq!(profile.data_points, 25, "clicks contribute nothing");
    assert!(profile.cuisine_scores.contains_key("Thai"));
    assert!(profile.restaurant_scores.is_empty());
}

#[then("the failure is reported in the diagnostics")]
fn assert_diagnostics(context: &TestContext) {
    let diagnostics = context.diagnostics.borrow();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics.first().map(|error| error.feed),
        Some(FeedKind::Clicks)
    );
}

#[then("the stored document is empty")]
fn assert_stored_empty(context: &TestContext) {
    let stored = context
        .store
        .get(USER)
        .expect("read back")
        .expect("document present");
    assert_eq!(stored.data_points, 0);
    assert_eq!(stored.confidence_score, 0.0);
    assert!(stored.cuisine_scores.is_empty());
}

#[scenario(path = "tests/features/taste_profile.feature", index = 0)]
fn fresh_profile_served_from_cache(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/taste_profile.feature", index = 1)]
fn stale_profile_recomputed(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/taste_profile.feature", index = 2)]
fn failed_feed_degrades_to_empty(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/taste_profile.feature", index = 3)]
fn reset_clears_the_stored_profile(context: TestContext) {
    let _ = context;
}
