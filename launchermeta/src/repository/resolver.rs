//! Sequential first-match repository resolution.

use super::RepositoryDescriptor;
use super::probe::{ArtifactProbe, ProbeOutcome};
use crate::coordinate::ArtifactCoordinate;
use crate::error::{MetaError, Result};
use log::debug;

/// Determines which configured repository hosts an artifact.
///
/// Candidates are probed one at a time in declaration order and the first
/// repository that answers successfully wins, so probe traffic stays low and
/// the choice is deterministic when several repositories mirror the same
/// artifact. Failed probes are not retried, and a repository that cannot be
/// reached aborts resolution instead of falling through to the next one.
pub struct RepositoryResolver<'a> {
    probe: &'a dyn ArtifactProbe,
}

impl<'a> RepositoryResolver<'a> {
    /// Create a resolver that checks existence through `probe`.
    #[must_use]
    pub fn new(probe: &'a dyn ArtifactProbe) -> Self {
        Self { probe }
    }

    /// Return the first candidate repository that hosts `coordinate`.
    ///
    /// Candidates whose policy excludes the coordinate (release-only
    /// repositories for snapshots and vice versa) are skipped without a probe.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::UnresolvedRepository`] when no candidate hosts the
    /// artifact, including when `candidates` is empty, and
    /// [`MetaError::ProbeFailed`] when a candidate cannot be reached.
    pub fn resolve<'r>(
        &self,
        coordinate: &ArtifactCoordinate,
        candidates: &'r [RepositoryDescriptor],
    ) -> Result<&'r RepositoryDescriptor> {
        for repository in candidates {
            if !repository.accepts.accepts(coordinate) {
                debug!(
                    "skipping {} for {coordinate}: repository serves {} only",
                    repository.name, repository.accepts
                );
                continue;
            }
            let url = repository.artifact_url(coordinate);
            match self.probe.probe(&url) {
                ProbeOutcome::Found => {
                    debug!("resolved {coordinate} in {}", repository.name);
                    return Ok(repository);
                }
                outcome @ ProbeOutcome::Missing { .. } => debug!("{url}: {outcome}"),
                ProbeOutcome::Unreachable { reason } => {
                    return Err(MetaError::ProbeFailed {
                        coordinate: coordinate.clone(),
                        repository: repository.name.clone(),
                        reason,
                    });
                }
            }
        }
        Err(MetaError::UnresolvedRepository {
            coordinate: coordinate.clone(),
        })
    }
}
