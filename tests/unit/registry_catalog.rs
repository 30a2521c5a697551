//! Embedded endpoint catalog

use coinglass_ingest::downloader::RawJob;
use coinglass_ingest::registry::{EndpointRegistry, RegistryError};

#[test]
fn test_catalog_has_unique_names_and_normalized_paths() {
    let registry = EndpointRegistry::load().unwrap();
    let entries = registry.entries();
    assert!(entries.len() >= 90);

    let mut names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), entries.len());
    assert_eq!(
        EndpointRegistry::load_embedded().unwrap().entries().len(),
        entries.len()
    );

    for entry in entries {
        assert!(entry.path().starts_with('/'), "{}", entry.name());
        assert!(!entry.path().starts_with("/api/"), "{}", entry.name());
    }
}

#[test]
fn test_hobbyist_defaults_include_catalog_listings() {
    let registry = EndpointRegistry::load().unwrap();
    let defaults: Vec<&str> = registry
        .hobbyist_defaults()
        .iter()
        .map(|e| e.name())
        .collect();
    assert!(defaults.contains(&"futures_supported_coins"));
    assert!(defaults.contains(&"futures_supported_exchange_pairs"));
}

#[test]
fn test_require_unknown_name() {
    let registry = EndpointRegistry::load().unwrap();
    assert!(matches!(
        registry.require("does_not_exist"),
        Err(RegistryError::NotFound(_))
    ));
}

#[test]
fn test_raw_job_from_entry() {
    let registry = EndpointRegistry::load().unwrap();

    let listing = RawJob::from_entry(registry.require("futures_supported_coins").unwrap(), None);
    assert_eq!(listing.name, "futures_supported_coins");
    assert_eq!(listing.descriptor.path(), "/futures/supported-coins");
    assert_eq!(listing.descriptor.params_json(), "{}");

    let history = RawJob::from_entry(
        registry.require("oi_ohlc_aggregated_history").unwrap(),
        Some("ETH"),
    );
    assert_eq!(history.descriptor.params_json(), r#"{"symbol":"ETH"}"#);
}

#[test]
fn test_wildcard_resolution() {
    let registry = EndpointRegistry::load().unwrap();
    let heatmaps = registry.resolve_pattern("liquidation_*heatmap*").unwrap();
    assert!(heatmaps.len() >= 6);
    assert!(heatmaps.iter().all(|e| e.category() == "liquidation"));
}
