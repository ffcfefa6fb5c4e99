//! Behaviour-driven tests for the module registry update.
//!
//! Each scenario lays out a module build tree in a temporary directory and
//! runs the full discovery, merge, persist and publish flow against it.

use camino::{Utf8Path, Utf8PathBuf};
use launchermeta::checksum::DigestAlgorithm;
use launchermeta::config::{ModuleSettings, ProductInfo};
use launchermeta::error::MetaError;
use launchermeta::registry::ModuleRegistry;
use launchermeta::registry::updater::{load_registry, update_registry};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct RegistryWorld {
    _temp_dir: TempDir,
    settings: ModuleSettings,
    product: ProductInfo,
    registry: Option<ModuleRegistry>,
    error: Option<MetaError>,
}

#[fixture]
fn world() -> RegistryWorld {
    let temp_dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 temp path");
    let settings = ModuleSettings {
        output_dir: root.join("modules"),
        distribution_dir: root.join("feed/modules"),
        registry_path: root.join("feed/modules.json"),
        ..ModuleSettings::default()
    };
    RegistryWorld {
        _temp_dir: temp_dir,
        settings,
        product: ProductInfo {
            name: "CloudNet".to_owned(),
            codename: "Blizzard".to_owned(),
            version: "4.0.0".to_owned(),
            group: "eu.cloudnetservice.cloudnet".to_owned(),
            ignored_groups: Vec::new(),
        },
        registry: None,
        error: None,
    }
}

fn archive_name(module: &str) -> String {
    format!("cloudnet-{}.jar", module.to_lowercase())
}

fn write(path: &Utf8Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn build_module(world: &RegistryWorld, name: &str, version: &str, dependencies: &[&str]) {
    let project = world.settings.output_dir.join(name.to_lowercase());
    write(
        &project
            .join(&world.settings.archive_dir)
            .join(archive_name(name)),
        &format!("{name} {version}"),
    );
    let metadata = json!({
        "name": name,
        "website": "https://cloudnetservice.eu",
        "version": version,
        "description": format!("The {name} module"),
        "author": "CloudNetService",
        "dependencies": dependencies
            .iter()
            .map(|d| json!({ "name": d }))
            .collect::<Vec<_>>(),
    });
    write(
        &project.join(&world.settings.metadata_path),
        &metadata.to_string(),
    );
}

fn registry(world: &RegistryWorld) -> &ModuleRegistry {
    world.registry.as_ref().expect("registry updated")
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("an existing registry listing module \"{name}\" at version \"{version}\"")]
fn given_existing_registry(world: &mut RegistryWorld, name: String, version: String) {
    let document = json!({
        "entries": [{
            "official": true,
            "name": name,
            "website": "https://cloudnetservice.eu",
            "version": version,
            "sha3256": "0".repeat(64),
            "description": "previous build",
            "url": "https://example.test/old.jar",
            "maintainers": ["CloudNetService"],
            "releaseNotes": [],
            "dependingModules": []
        }]
    });
    write(&world.settings.registry_path, &document.to_string());
}

#[given("a built module \"{name}\" at version \"{version}\"")]
fn given_built_module(world: &mut RegistryWorld, name: String, version: String) {
    build_module(world, &name, &version, &[]);
}

#[given("a built module \"{name}\" depending on module \"{dependency}\"")]
fn given_built_module_with_dependency(world: &mut RegistryWorld, name: String, dependency: String) {
    build_module(world, &name, "4.0.0", &[dependency.as_str()]);
}

#[given("a built module archive \"{name}\" without metadata")]
fn given_archive_without_metadata(world: &mut RegistryWorld, name: String) {
    let archive = world
        .settings
        .output_dir
        .join(&name)
        .join(&world.settings.archive_dir)
        .join(archive_name(&name));
    write(&archive, "orphan");
}

#[when("the registry is updated")]
fn when_updated(world: &mut RegistryWorld) {
    match update_registry(&world.settings, &world.product, DigestAlgorithm::Sha3_256) {
        Ok(registry) => world.registry = Some(registry),
        Err(e) => world.error = Some(e),
    }
}

#[then("the registry lists module \"{name}\" once at version \"{version}\"")]
fn then_lists_once(world: &mut RegistryWorld, name: String, version: String) {
    let on_disk = load_registry(&world.settings.registry_path).expect("registry readable");
    assert_eq!(&on_disk, registry(world));
    assert_eq!(on_disk.entries().filter(|e| e.name == name).count(), 1);
    assert_eq!(
        on_disk.get(&name).map(|e| e.version.as_str()),
        Some(version.as_str())
    );
}

#[then("the archive of module \"{name}\" is published")]
fn then_published(world: &mut RegistryWorld, name: String) {
    let published = world.settings.distribution_dir.join(archive_name(&name));
    assert!(published.is_file(), "{published} missing");
    let entry = registry(world).get(&name).expect("entry present");
    assert!(entry.download_url.ends_with(&archive_name(&name)));
}

#[then("module \"{name}\" depends on module \"{dependency}\"")]
fn then_depends(world: &mut RegistryWorld, name: String, dependency: String) {
    let entry = registry(world).get(&name).expect("entry present");
    assert!(entry.depending_modules.contains(&dependency));
}

#[then("the update fails with missing module metadata")]
fn then_missing_metadata(world: &mut RegistryWorld) {
    assert!(matches!(
        world.error,
        Some(MetaError::MissingModuleMetadata { .. })
    ));
    assert!(!world.settings.registry_path.exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/module_registry.feature",
    name = "Rebuilt module replaces its registry entry"
)]
fn scenario_replace_entry(world: RegistryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/module_registry.feature",
    name = "Module dependencies are recorded"
)]
fn scenario_dependencies(world: RegistryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/module_registry.feature",
    name = "Archive without metadata aborts the update"
)]
fn scenario_missing_metadata(world: RegistryWorld) {
    let _ = world;
}
