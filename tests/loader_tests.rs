//! End-to-end loader tests: ingest from disk, inject, define, serve resources.

mod common;

use common::{
    assert_error_contains, assert_ok, module_bytes, write_archive, write_package_dir,
    CountingInjection, RecordingDefiner,
};
use move_injector::prelude::*;
use move_injector::{BootstrapResources, MoveCodec, ResourceHandle, SearchRoot};
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// Archive ingestion
// =============================================================================

#[test]
fn test_archive_modules_are_injected_before_definition() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = temp_dir.path().join("framework.mvar");
    write_archive(
        &archive,
        &[("0x2", "coin"), ("0x2", "balance")],
        &[("config/limits.json", b"{\"max_gas\":50}")],
    )?;

    let trace = CountingInjection::new("traced").only("coin");
    let loader = InjectingLoader::new(LoaderConfig::new(), RecordingDefiner::default())
        .with_pipeline(InjectionChain::new().with(trace.clone()));

    let ingested = loader.ingest_archive(&archive)?;
    assert_eq!(ingested.len(), 2);
    assert_eq!(trace.calls(), 0, "ingestion must not inject");

    let coin = loader.resolve("0x2::coin")?;
    let coin = coin.as_defined().expect("coin is defined");
    assert!(coin.has_identifier("traced0"));
    assert_eq!(trace.calls(), 1);

    let balance = loader.resolve("0x2::balance")?;
    assert!(!balance.as_defined().expect("defined").has_identifier("traced0"));
    assert_eq!(trace.calls(), 1);

    assert_eq!(
        loader.definer().defined(),
        vec!["0x2::coin".to_string(), "0x2::balance".to_string()]
    );
    assert_eq!(
        loader.resource_bytes("config/limits.json"),
        Some(b"{\"max_gas\":50}".to_vec())
    );
    Ok(())
}

#[test]
fn test_corrupt_archive_is_reported() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = temp_dir.path().join("broken.mvar");
    std::fs::write(&archive, b"not bcs at all")?;

    let loader = InjectingLoader::new(LoaderConfig::new(), RecordingDefiner::default());
    let err = loader.ingest_archive(&archive).unwrap_err();
    assert!(matches!(err, LoaderError::Io { .. }));
    assert!(loader.search_roots().is_empty());
    Ok(())
}

// =============================================================================
// Package ingestion
// =============================================================================

#[test]
fn test_package_ingestion_from_directory_code_root() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write_package_dir(temp_dir.path(), "0x2", &["coin", "balance"])?;
    write_package_dir(temp_dir.path(), "0x3", &["pool"])?;

    let loader = InjectingLoader::new(
        LoaderConfig::new().with_code_root(temp_dir.path()),
        RecordingDefiner::default(),
    );

    let listed: Vec<String> = loader
        .list_package("0x2")?
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(listed, vec!["0x2::balance", "0x2::coin"]);

    loader.ingest_package("0x2")?;
    assert!(loader.has_unit("0x2::coin"));
    assert!(!loader.has_unit("0x3::pool"));

    // not ingested and not on the search path
    assert!(loader.resolve("0x3::pool").unwrap_err().is_not_found());
    Ok(())
}

#[test]
fn test_package_ingestion_from_archive_code_root() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("app.mvar");
    write_archive(&root, &[("0x2", "coin"), ("0x7", "app"), ("0x7", "vault")], &[])?;

    let injection = CountingInjection::new("hook");
    let loader = InjectingLoader::new(
        LoaderConfig::new().with_code_root(&root),
        RecordingDefiner::default(),
    )
    .with_pipeline(InjectionChain::new().with(injection.clone()));

    let ingested = loader.ingest_package("0x7")?;
    assert_eq!(ingested.len(), 2);
    assert!(!loader.has_unit("0x2::coin"));

    let vault = loader.resolve("0x7::vault")?;
    assert!(vault.as_defined().expect("defined").has_identifier("hook0"));
    Ok(())
}

#[test]
fn test_package_ingestion_without_code_root() {
    let loader = InjectingLoader::new(LoaderConfig::new(), RecordingDefiner::default());
    assert_error_contains(loader.ingest_package("0x2"), "NotFound");
}

// =============================================================================
// Nested loaders
// =============================================================================

#[test]
fn test_child_falls_back_to_parent_with_parent_injections() -> anyhow::Result<()> {
    let parent_injection = CountingInjection::new("parent");
    let parent = Arc::new(
        InjectingLoader::new(LoaderConfig::new(), RecordingDefiner::default())
            .with_pipeline(InjectionChain::new().with(parent_injection.clone())),
    );
    parent.ingest_module_bytes(vec![module_bytes("0x2", "coin")])?;

    let child_injection = CountingInjection::new("child");
    let child = InjectingLoader::new(LoaderConfig::new(), RecordingDefiner::default())
        .with_pipeline(InjectionChain::new().with(child_injection.clone()))
        .with_parent(parent.clone());
    child.ingest_module_bytes(vec![module_bytes("0x7", "app")])?;

    let app = child.resolve("0x7::app")?;
    assert!(app.as_defined().expect("defined").has_identifier("child0"));

    let coin = child.resolve("0x2::coin")?;
    let coin = coin.as_defined().expect("defined");
    assert!(coin.has_identifier("parent0"));
    assert!(!coin.identifiers.iter().any(|i| i.starts_with("child")));
    assert_eq!(parent_injection.calls(), 1);
    assert_eq!(child_injection.calls(), 1);

    // the parent also serves unit resources through the child
    let bytes = child.resource_bytes("0x2/coin.mv").expect("served by parent");
    let unit = MoveCodec::new().decode(&bytes, "parent resource")?;
    assert_eq!(unit.name().as_str(), "0x2::coin");
    assert_eq!(parent_injection.calls(), 2);
    Ok(())
}

// =============================================================================
// Configuration and resources
// =============================================================================

#[test]
fn test_loader_from_json_config() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let search = temp_dir.path().join("deps");
    write_package_dir(&search, "0x5", &["oracle"])?;

    let config_path = temp_dir.path().join("loader.json");
    std::fs::write(
        &config_path,
        config_json(&search, &temp_dir.path().join("missing-root")),
    )?;

    let config = assert_ok(LoaderConfig::from_json_file(&config_path), "load config");
    assert!(config.debug);

    let loader = InjectingLoader::new(config, RecordingDefiner::default());
    assert!(loader.debug());
    assert_eq!(loader.search_roots(), vec![SearchRoot::Directory(search.clone())]);

    let oracle = loader.resolve("0x5::oracle")?;
    assert_eq!(oracle.as_defined().expect("defined").identifiers, vec!["oracle"]);
    assert!(loader.list_package("0x5").unwrap_err().is_not_found());
    Ok(())
}

fn config_json(search: &std::path::Path, code_root: &std::path::Path) -> String {
    format!(
        r#"{{"debug": true, "code_root": {:?}, "search_path": [{:?}]}}"#,
        code_root.display().to_string(),
        search.display().to_string()
    )
}

#[test]
fn test_resources_fall_back_to_bootstrap() -> anyhow::Result<()> {
    static GAS_TABLE: &[u8] = b"base=1000";
    let loader = InjectingLoader::new(LoaderConfig::new(), RecordingDefiner::default())
        .with_bootstrap(BootstrapResources::new().with("defaults/gas.txt", GAS_TABLE));

    let mut stream = loader
        .resource_stream("/defaults/gas.txt")
        .expect("bootstrap resource");
    let mut out = String::new();
    stream.read_to_string(&mut out)?;
    assert_eq!(out, "base=1000");

    let handle = loader.find_resource("defaults/gas.txt").expect("locator");
    assert!(matches!(handle, ResourceHandle::InMemory { .. }));
    assert!(loader.find_resource("defaults/other.txt").is_none());
    Ok(())
}

#[test]
fn test_ingest_units_pulls_from_search_path() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = temp_dir.path().join("deps.mvar");
    write_archive(&archive, &[("0x8", "math"), ("0x8", "vec")], &[])?;

    let injection = CountingInjection::new("math");
    let loader = InjectingLoader::new(
        LoaderConfig::new().with_search_root(&archive),
        RecordingDefiner::default(),
    )
    .with_pipeline(InjectionChain::new().with(injection.clone()));

    // before ingestion the raw search-path bytes are defined without injection
    let raw = loader.resolve("0x8::vec")?;
    assert!(!raw.as_defined().expect("defined").has_identifier("math0"));

    loader.ingest_units(&["0x8::math"])?;
    let math = loader.resolve("0x8::math")?;
    assert!(math.as_defined().expect("defined").has_identifier("math0"));
    assert_eq!(injection.calls(), 1);
    Ok(())
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_parallel_resolution_of_many_names() -> anyhow::Result<()> {
    let injection = CountingInjection::new("par");
    let loader = InjectingLoader::new(LoaderConfig::new(), RecordingDefiner::default())
        .with_pipeline(InjectionChain::new().with(injection.clone()));
    let names = ["a", "b", "c", "d"];
    loader.ingest_module_bytes(names.iter().map(|n| module_bytes("0x9", n)).collect())?;

    let shared = &loader;
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(move || {
                for name in names {
                    let resolved = shared.resolve(&format!("0x9::{}", name));
                    assert_ok(resolved, "parallel resolve");
                }
            });
        }
    });

    assert_eq!(injection.calls(), names.len());
    let mut defined = loader.definer().defined();
    defined.sort();
    assert_eq!(defined, vec!["0x9::a", "0x9::b", "0x9::c", "0x9::d"]);
    assert_eq!(loader.metrics().snapshot().definitions, 4);
    Ok(())
}
