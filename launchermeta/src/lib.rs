//! Launcher metadata generator library.
//!
//! This crate produces the integrity and update metadata that accompanies a
//! CloudNet distribution: the CNL trust manifest read by the launcher's
//! dependency installer, the central module registry consumed by the module
//! update feed, and the staging directory read by the launcher's self-updater.
//! It is used by the `launchermeta` binary and can be driven programmatically
//! from tests.
//!
//! # Modules
//!
//! - [`checksum`] - SHA3-256 digests of files and buffers
//! - [`cli`] - Command-line argument definitions
//! - [`cnl`] - CNL trust manifest export
//! - [`config`] - Generator configuration
//! - [`coordinate`] - Artifact coordinates and repository paths
//! - [`dependencies`] - Resolved dependency lists supplied by the build tool
//! - [`error`] - Error types
//! - [`registry`] - Module discovery and registry maintenance
//! - [`repository`] - Package repositories and first-match resolution
//! - [`staging`] - Self-update staging directory and checksum file

pub mod checksum;
pub mod cli;
pub mod cnl;
pub mod config;
pub mod coordinate;
pub mod dependencies;
pub mod error;
pub mod registry;
pub mod repository;
pub mod staging;
