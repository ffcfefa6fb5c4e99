//! Artifact coordinates for resolved runtime dependencies.
//!
//! A coordinate carries both the declared version and the concrete version
//! that was resolved. They differ only for unique snapshots, whose artifacts
//! are published under a server-assigned timestamp
//! (`1.0-SNAPSHOT` resolves to e.g. `1.0-20240105.101530-3`).

use std::fmt;

/// Suffix marking a floating snapshot version.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Extension used when a dependency does not declare one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// The identity of a resolved dependency artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    group: String,
    name: String,
    version: String,
    resolved_version: String,
    classifier: Option<String>,
    extension: String,
}

impl ArtifactCoordinate {
    /// Build a coordinate from what the build tool resolved.
    ///
    /// `resolved_version` is only honoured for snapshot versions that were
    /// resolved to a timestamped unique-snapshot identity; in every other case
    /// the resolved version equals the declared one. Blank classifiers are
    /// treated as absent.
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        resolved_version: Option<&str>,
        classifier: Option<&str>,
    ) -> Self {
        let version = version.into();
        let resolved_version = resolved_version
            .filter(|resolved| is_snapshot(&version) && is_unique_snapshot(&version, resolved))
            .map_or_else(|| version.clone(), str::to_owned);
        Self {
            group: group.into(),
            name: name.into(),
            version,
            resolved_version,
            classifier: classifier
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }

    /// Shorthand for a release coordinate without classifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use launchermeta::coordinate::ArtifactCoordinate;
    ///
    /// let coordinate = ArtifactCoordinate::release("eu.example", "foo", "1.0");
    /// assert_eq!(coordinate.resolved_version(), "1.0");
    /// ```
    #[must_use]
    pub fn release(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group, name, version, None, None)
    }

    /// Replace the artifact file extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        if !extension.trim().is_empty() {
            self.extension = extension.trim().trim_start_matches('.').to_owned();
        }
        self
    }

    /// Group id.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Artifact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version as declared by the build.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The concrete version of the verified artifact.
    #[must_use]
    pub fn resolved_version(&self) -> &str {
        &self.resolved_version
    }

    /// Optional classifier.
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// File extension without leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether the declared version is a floating snapshot.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        is_snapshot(&self.version)
    }

    /// Path of the artifact relative to a repository root.
    ///
    /// The directory uses the declared version while the file name uses the
    /// resolved one, matching the Maven repository layout for unique
    /// snapshots.
    ///
    /// # Examples
    ///
    /// ```
    /// use launchermeta::coordinate::ArtifactCoordinate;
    ///
    /// let coordinate = ArtifactCoordinate::new(
    ///     "eu.example",
    ///     "foo",
    ///     "1.0-SNAPSHOT",
    ///     Some("1.0-20240105.101530-3"),
    ///     None,
    /// );
    /// assert_eq!(
    ///     coordinate.repository_path(),
    ///     "eu/example/foo/1.0-SNAPSHOT/foo-1.0-20240105.101530-3.jar"
    /// );
    /// ```
    #[must_use]
    pub fn repository_path(&self) -> String {
        let classifier = self
            .classifier
            .as_deref()
            .map(|c| format!("-{c}"))
            .unwrap_or_default();
        format!(
            "{group}/{name}/{version}/{name}-{resolved}{classifier}.{ext}",
            group = self.group.replace('.', "/"),
            name = self.name,
            version = self.version,
            resolved = self.resolved_version,
            ext = self.extension,
        )
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if self.resolved_version != self.version {
            write!(f, " ({})", self.resolved_version)?;
        }
        Ok(())
    }
}

fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}

/// Check that `resolved` is `<base>-<yyyyMMdd>.<HHmmss>-<build>` for the
/// snapshot `version` with base `<base>`.
fn is_unique_snapshot(version: &str, resolved: &str) -> bool {
    let Some(base) = version.strip_suffix(SNAPSHOT_SUFFIX) else {
        return false;
    };
    let Some(identity) = resolved
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    let Some((timestamp, build)) = identity.split_once('-') else {
        return false;
    };
    let Some((date, time)) = timestamp.split_once('.') else {
        return false;
    };
    let all_digits = |s: &str, len: Option<usize>| {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && len.is_none_or(|l| s.len() == l)
    };
    all_digits(date, Some(8)) && all_digits(time, Some(6)) && all_digits(build, None)
}
