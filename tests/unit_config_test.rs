// tests/unit_config_test.rs

use opalcache::ClusterDataCache;
use opalcache::config::CacheConfig;
use std::io::Write;

#[test]
fn test_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.cluster_name, "default-cluster");
    assert!(!config.task_cache);
    assert_eq!(config.refresh.fetch_warn_threshold, 100_000);
}

#[test]
fn test_load_from_toml() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        "cluster_name = \"prod\"\ntask_cache = true\n\n[refresh]\nfetch_warn_threshold = 5\n"
    )
    .unwrap();

    let config = CacheConfig::load(file.path().to_str()).unwrap();
    assert_eq!(config.cluster_name, "prod");
    assert!(config.task_cache);
    assert_eq!(config.refresh.fetch_warn_threshold, 5);
}

#[test]
fn test_missing_fields_fall_back_to_defaults() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(file, "cluster_name = \"staging\"").unwrap();

    let config = CacheConfig::load(file.path().to_str()).unwrap();
    assert_eq!(config.cluster_name, "staging");
    assert!(!config.task_cache);
    assert_eq!(config.refresh.fetch_warn_threshold, 100_000);
}

#[tokio::test]
async fn test_cache_adopts_config() {
    let config = CacheConfig {
        cluster_name: "prod".to_string(),
        task_cache: true,
        ..Default::default()
    };
    let cache = ClusterDataCache::from_config(&config);
    assert_eq!(cache.cluster_name(), "prod");
    assert!(cache.is_task_cache());
}
