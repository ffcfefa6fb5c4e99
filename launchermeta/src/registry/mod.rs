//! Central module registry consumed by the update feed.
//!
//! The registry document is `{ "entries": [ ... ] }`. Entries are keyed by
//! module name: merging a descriptor replaces the entry of the same name in
//! place and appends otherwise, so names never repeat and existing order is
//! kept. Keys this generator does not know about are carried through
//! untouched.
//!
//! # Sub-modules
//!
//! - [`discovery`] - locating built module archives and their metadata
//! - [`metadata`] - the per-module metadata document written by module builds
//! - [`updater`] - descriptor construction, registry persistence and
//!   archive publication

pub mod discovery;
pub mod metadata;
pub mod updater;

use crate::checksum::Sha3Digest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

/// A module as advertised by the update feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Whether the module is built and published by the product itself.
    #[serde(default)]
    pub official: bool,
    /// Unique module name.
    pub name: String,
    /// Project website.
    #[serde(default)]
    pub website: String,
    /// Module version.
    pub version: String,
    /// SHA3-256 digest of the module archive.
    #[serde(rename = "sha3256")]
    pub checksum: Sha3Digest,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Where clients download the archive.
    #[serde(rename = "url")]
    pub download_url: String,
    /// Maintainers, in display order.
    #[serde(default)]
    pub maintainers: Vec<String>,
    /// Release notes, in display order.
    #[serde(default)]
    pub release_notes: Vec<String>,
    /// Names of first-party modules this module requires.
    #[serde(default)]
    pub depending_modules: BTreeSet<String>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Insertion-ordered mapping from module name to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RegistryDocument", into = "RegistryDocument")]
pub struct ModuleRegistry {
    entries: Vec<ModuleDescriptor>,
    index: HashMap<String, usize>,
    extra: Map<String, Value>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `descriptor`, replacing any entry with the same name.
    ///
    /// Returns the replaced entry, if any.
    pub fn merge(&mut self, descriptor: ModuleDescriptor) -> Option<ModuleDescriptor> {
        if let Some(&position) = self.index.get(&descriptor.name) {
            return self
                .entries
                .get_mut(position)
                .map(|slot| std::mem::replace(slot, descriptor));
        }
        self.index
            .insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(descriptor);
        None
    }

    /// Look up an entry by module name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.index.get(name).and_then(|&i| self.entries.get(i))
    }

    /// Entries in registry order.
    pub fn entries(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-disk shape of the registry.
#[derive(Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    entries: Vec<ModuleDescriptor>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RegistryDocument> for ModuleRegistry {
    fn from(document: RegistryDocument) -> Self {
        let mut registry = Self {
            extra: document.extra,
            ..Self::default()
        };
        for entry in document.entries {
            registry.merge(entry);
        }
        registry
    }
}

impl From<ModuleRegistry> for RegistryDocument {
    fn from(registry: ModuleRegistry) -> Self {
        Self {
            entries: registry.entries,
            extra: registry.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, version: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            official: true,
            name: name.to_owned(),
            website: "https://cloudnetservice.eu".to_owned(),
            version: version.to_owned(),
            checksum: Sha3Digest::try_from("a".repeat(64)).expect("valid digest"),
            description: format!("The {name} module"),
            download_url: format!("https://example.test/{name}.jar"),
            maintainers: vec!["CloudNetService".to_owned()],
            release_notes: vec!["Compatible with CloudNet 4.0.0".to_owned()],
            depending_modules: BTreeSet::new(),
            extra: Map::new(),
        }
    }

    #[test]
    fn merge_replaces_same_named_entry_in_place() {
        let mut registry = ModuleRegistry::new();
        registry.merge(descriptor("Bridge", "1.0"));
        registry.merge(descriptor("Signs", "1.0"));

        let replaced = registry.merge(descriptor("Bridge", "2.0"));

        assert_eq!(replaced.map(|d| d.version), Some("1.0".to_owned()));
        assert_eq!(registry.entries().filter(|e| e.name == "Bridge").count(), 1);
        let names: Vec<_> = registry.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Bridge", "Signs"]);
        assert_eq!(registry.get("Bridge").map(|e| e.version.as_str()), Some("2.0"));
    }

    #[test]
    fn merge_appends_new_names() {
        let mut registry = ModuleRegistry::new();
        registry.merge(descriptor("Bridge", "1.0"));
        assert!(registry.merge(descriptor("Npcs", "1.0")).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn serialises_with_client_field_names() {
        let mut registry = ModuleRegistry::new();
        let mut bridge = descriptor("Bridge", "1.0");
        bridge.depending_modules.insert("Syncproxy".to_owned());
        registry.merge(bridge);

        let json = serde_json::to_value(&registry).expect("serialise");
        let entry = &json["entries"][0];
        for key in [
            "official",
            "name",
            "website",
            "version",
            "sha3256",
            "description",
            "url",
            "maintainers",
            "releaseNotes",
            "dependingModules",
        ] {
            assert!(entry.get(key).is_some(), "missing key: {key}");
        }
        assert_eq!(entry["dependingModules"][0], "Syncproxy");
    }

    #[test]
    fn preserves_unknown_keys_across_round_trip() {
        let source = serde_json::json!({
            "format": 2,
            "entries": [{
                "official": false,
                "name": "ThirdParty",
                "website": "https://example.test",
                "version": "0.1",
                "sha3256": "b".repeat(64),
                "description": "community module",
                "url": "https://example.test/third-party.jar",
                "maintainers": ["someone"],
                "releaseNotes": [],
                "dependingModules": [],
                "stars": 5
            }]
        });
        let registry: ModuleRegistry = serde_json::from_value(source.clone()).expect("parse");
        assert_eq!(registry.get("ThirdParty").map(|e| e.official), Some(false));

        let written = serde_json::to_value(&registry).expect("serialise");
        assert_eq!(written, source);
    }

    #[test]
    fn duplicate_names_in_existing_document_collapse() {
        let source = serde_json::json!({
            "entries": [
                serde_json::to_value(descriptor("Bridge", "1.0")).expect("serialise"),
                serde_json::to_value(descriptor("Bridge", "1.1")).expect("serialise"),
            ]
        });
        let registry: ModuleRegistry = serde_json::from_value(source).expect("parse");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Bridge").map(|e| e.version.as_str()), Some("1.1"));
    }
}
