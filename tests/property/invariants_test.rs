// tests/property/invariants_test.rs

//! Refresh invariants that must survive arbitrary cluster shapes.

use crate::test_helpers::{CLUSTER, TestCluster, fixtures};
use opalcache::core::cache::ChangeCategory;
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32, // Each case spins up a full cache; keep the count modest.
        max_shrink_iters: 500,
        ..ProptestConfig::default()
    })]

    #[test]
    fn disabled_set_covers_flags_and_cluster_list(
        instances in prop::collection::hash_map("[a-z][a-z0-9]{1,8}", any::<bool>(), 1..=12),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..=4),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestCluster::new().await;
            let names: Vec<String> = instances.keys().cloned().collect();
            let cluster_disabled: HashSet<String> =
                picks.iter().map(|ix| ix.get(&names).clone()).collect();

            for (name, enabled) in &instances {
                ctx.seed_instance_config(fixtures::instance_config(name, *enabled))
                    .await;
            }
            let refs: Vec<&str> = cluster_disabled.iter().map(String::as_str).collect();
            ctx.seed_cluster_config(fixtures::cluster_config(CLUSTER, &refs, &[]))
                .await;
            ctx.refresh().await;

            let disabled = ctx.cache.disabled_instances();
            for (name, enabled) in &instances {
                if !*enabled {
                    assert!(disabled.contains(name), "flag-disabled '{name}' missing");
                }
            }
            for name in &cluster_disabled {
                assert!(disabled.contains(name), "cluster-disabled '{name}' missing");
            }

            // Enabled and disabled partition the configured instances.
            let enabled_set = ctx.cache.enabled_instances();
            assert!(enabled_set.is_disjoint(&disabled));
            for name in ctx.cache.all_instances() {
                assert!(enabled_set.contains(&name) || disabled.contains(&name));
            }
        });
    }

    #[test]
    fn current_state_view_is_scoped_to_live_sessions(
        live in prop::collection::hash_map("[a-z][a-z0-9]{1,6}", "[a-z0-9]{4}", 1..=8),
        dead in prop::collection::hash_map("[A-Z][A-Z0-9]{1,6}", "[a-z0-9]{4}", 0..=4),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestCluster::new().await;
            for (name, session) in &live {
                ctx.seed_live_instance(name, session).await;
                ctx.seed_instance_config(fixtures::instance_config(name, true))
                    .await;
                ctx.seed_current_state(
                    name,
                    fixtures::current_state("db", session, &[("p1", "LEADER")]),
                )
                .await;
            }
            // Reports from instances that are not live must never be enumerated.
            for (name, session) in &dead {
                ctx.seed_current_state(
                    name,
                    fixtures::current_state("db", session, &[("p1", "LEADER")]),
                )
                .await;
            }
            ctx.refresh().await;

            let view = ctx.cache.current_state_view();
            for (instance, sessions) in view.iter() {
                let live_session = live.get(instance).expect("view contains a non-live instance");
                for session in sessions.keys() {
                    assert_eq!(session, live_session);
                }
            }
            for (name, session) in &live {
                assert!(ctx.cache.current_state(name, session).contains_key("db"));
            }
        });
    }

    #[test]
    fn quiet_refreshes_are_idempotent(
        instances in prop::collection::hash_map("[a-z][a-z0-9]{1,6}", "[a-z0-9]{4}", 1..=6),
        replica_counts in prop::collection::hash_map("[a-z][a-z0-9]{1,6}", 1u32..=5, 0..=5),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestCluster::new().await;
            for (name, session) in &instances {
                ctx.seed_live_instance(name, session).await;
                ctx.seed_instance_config(fixtures::instance_config(name, true))
                    .await;
                ctx.seed_current_state(
                    name,
                    fixtures::current_state("db", session, &[("p1", "LEADER")]),
                )
                .await;
            }
            for (resource, replicas) in &replica_counts {
                ctx.seed_ideal_state(fixtures::ideal_state(resource, &replicas.to_string()))
                    .await;
            }

            ctx.refresh().await;
            let first = ctx.cache.snapshot();
            ctx.store.counters().reset();
            ctx.refresh().await;
            let second = ctx.cache.snapshot();

            assert_eq!(*first, *second);
            // An unchanged world costs stat checks, never record fetches.
            assert_eq!(ctx.store.counters().record_reads("CURRENTSTATES"), 0);
        });
    }

    #[test]
    fn disabled_flag_round_trip(
        name in "[a-z][a-z0-9]{1,8}",
        start_enabled in any::<bool>(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestCluster::new().await;
            ctx.seed_instance_config(fixtures::instance_config(&name, start_enabled))
                .await;
            ctx.refresh().await;
            assert_eq!(ctx.cache.enabled_instances().contains(&name), start_enabled);
            assert_eq!(ctx.cache.disabled_instances().contains(&name), !start_enabled);

            ctx.seed_instance_config(fixtures::instance_config(&name, !start_enabled))
                .await;
            ctx.cache.notify_data_change(ChangeCategory::InstanceConfig);
            ctx.refresh().await;
            assert_eq!(ctx.cache.enabled_instances().contains(&name), !start_enabled);
            assert_eq!(ctx.cache.disabled_instances().contains(&name), start_enabled);
        });
    }
}
