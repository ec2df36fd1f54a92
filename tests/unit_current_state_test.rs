// tests/unit_current_state_test.rs

#[path = "integration/test_helpers.rs"]
mod test_helpers;

use opalcache::core::store::MetadataStore;
use test_helpers::{TestCluster, fixtures};

async fn seeded_cluster() -> TestCluster {
    let ctx = TestCluster::new().await;
    ctx.seed_live_instance("n1", "s1").await;
    ctx.seed_instance_config(fixtures::instance_config("n1", true))
        .await;
    ctx
}

#[tokio::test]
async fn test_current_state_is_visible_after_refresh() {
    let ctx = seeded_cluster().await;
    ctx.seed_current_state("n1", fixtures::current_state("db", "s1", &[("p1", "LEADER")]))
        .await;

    ctx.refresh().await;

    let states = ctx.cache.current_state("n1", "s1");
    assert_eq!(states.len(), 1);
    assert_eq!(states["db"].partition_state("p1"), Some("LEADER"));
}

#[tokio::test]
async fn test_unchanged_stat_skips_full_fetch() {
    let ctx = seeded_cluster().await;
    ctx.seed_current_state("n1", fixtures::current_state("db", "s1", &[("p1", "LEADER")]))
        .await;
    ctx.refresh().await;

    ctx.store.counters().reset();
    ctx.refresh().await;

    assert_eq!(ctx.store.counters().record_reads("CURRENTSTATES"), 0);
    assert!(ctx.store.counters().stat_reads() > 0);
    // The retained record is still served.
    let states = ctx.cache.current_state("n1", "s1");
    assert_eq!(states["db"].partition_state("p1"), Some("LEADER"));
}

#[tokio::test]
async fn test_changed_stat_reloads_exactly_once() {
    let ctx = seeded_cluster().await;
    ctx.seed_current_state("n1", fixtures::current_state("db", "s1", &[("p1", "LEADER")]))
        .await;
    ctx.refresh().await;

    // Rewriting the record bumps its version in the store.
    ctx.seed_current_state("n1", fixtures::current_state("db", "s1", &[("p1", "STANDBY")]))
        .await;
    ctx.store.counters().reset();
    ctx.refresh().await;

    assert_eq!(ctx.store.counters().record_reads("CURRENTSTATES"), 1);
    let states = ctx.cache.current_state("n1", "s1");
    assert_eq!(states["db"].partition_state("p1"), Some("STANDBY"));
}

#[tokio::test]
async fn test_bucketed_record_is_always_reloaded() {
    let ctx = seeded_cluster().await;
    ctx.seed_current_state(
        "n1",
        fixtures::bucketed_current_state("db", "s1", 4, &[("p1", "LEADER")]),
    )
    .await;
    ctx.refresh().await;

    ctx.store.counters().reset();
    ctx.refresh().await;

    // The stat is unchanged but the bucket size forbids the shortcut.
    assert_eq!(ctx.store.counters().record_reads("CURRENTSTATES"), 1);
}

#[tokio::test]
async fn test_session_flip_evicts_old_session_entries() {
    let ctx = seeded_cluster().await;
    ctx.seed_current_state("n1", fixtures::current_state("db", "s1", &[("p1", "LEADER")]))
        .await;
    ctx.refresh().await;
    assert!(!ctx.cache.current_state("n1", "s1").is_empty());

    // The participant reconnects under a new session.
    ctx.seed_live_instance("n1", "s2").await;
    ctx.cache
        .notify_data_change(opalcache::core::cache::ChangeCategory::LiveInstance);
    ctx.refresh().await;

    assert!(ctx.cache.current_state("n1", "s1").is_empty());
    assert!(ctx.cache.current_state("n1", "s2").is_empty());
    assert!(ctx.cache.current_states("n1").is_empty());
}

#[tokio::test]
async fn test_listed_but_missing_entry_is_skipped_and_retried() {
    let ctx = seeded_cluster().await;
    let parent = ctx.store.key_builder().current_states("n1", "s1");
    ctx.store.add_phantom_child(&parent, "ghost");

    ctx.refresh().await;
    assert!(ctx.cache.current_state("n1", "s1").is_empty());

    // The name is still listed, so the next refresh tries again; once the
    // record appears it is picked up.
    ctx.store.clear_phantom_children();
    ctx.seed_current_state("n1", fixtures::current_state("ghost", "s1", &[("p1", "LEADER")]))
        .await;
    ctx.refresh().await;
    assert!(ctx.cache.current_state("n1", "s1").contains_key("ghost"));
}

#[tokio::test]
async fn test_view_is_scoped_to_live_instances() {
    let ctx = seeded_cluster().await;
    // A report from an instance that is not live is never enumerated.
    ctx.seed_current_state("n2", fixtures::current_state("db", "s9", &[("p1", "LEADER")]))
        .await;

    ctx.refresh().await;

    let view = ctx.cache.current_state_view();
    for instance in view.keys() {
        assert!(ctx.cache.live_instances().contains_key(instance));
    }
    assert!(ctx.cache.current_states("n2").is_empty());
}
