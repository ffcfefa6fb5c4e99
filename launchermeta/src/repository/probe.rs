//! Artifact existence checks against remote repositories.
//!
//! The resolver only needs to know whether a URL answers successfully, so the
//! check sits behind [`ArtifactProbe`]. Alternate strategies (parallel
//! probing, authenticated registry lookups) can be swapped in without
//! touching manifest generation, and tests inject mocks instead of touching
//! the network.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default connect and response timeout, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default cap on followed redirects.
const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Result of a single existence probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The repository answered with a success status.
    Found,
    /// The repository answered with a non-success status.
    Missing {
        /// HTTP status code returned.
        status: u16,
    },
    /// The request failed before a status was received.
    Unreachable {
        /// Description of the transport failure.
        reason: String,
    },
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => f.write_str("found"),
            Self::Missing { status } => write!(f, "missing (HTTP {status})"),
            Self::Unreachable { reason } => write!(f, "unreachable ({reason})"),
        }
    }
}

/// Strategy for checking whether an artifact exists at a URL.
///
/// # Examples
///
/// ```
/// use launchermeta::repository::{ArtifactProbe, HttpProbe, ProbeSettings};
///
/// let probe = HttpProbe::new(&ProbeSettings::default());
/// // Use probe.probe("https://repo1.maven.org/maven2/...") in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactProbe {
    /// Check whether `url` names an existing artifact.
    fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Network settings for [`HttpProbe`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSettings {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Timeout for receiving the response, in seconds.
    pub read_timeout_secs: u64,
    /// Maximum number of redirects to follow.
    pub max_redirects: u32,
    /// `User-Agent` header sent with every probe.
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: concat!(
                "launchermeta/",
                env!("CARGO_PKG_VERSION"),
                " (dependency repository resolver)"
            )
            .to_owned(),
        }
    }
}

/// Anonymous HTTP probe backed by `ureq`.
///
/// Issues `HEAD` requests with caching disabled, following redirects. Any
/// 2xx status counts as found.
pub struct HttpProbe {
    agent: ureq::Agent,
}

impl HttpProbe {
    /// Build a probe with its own agent configured from `settings`.
    #[must_use]
    pub fn new(settings: &ProbeSettings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(settings.connect_timeout_secs)))
            .timeout_recv_response(Some(Duration::from_secs(settings.read_timeout_secs)))
            .max_redirects(settings.max_redirects)
            .user_agent(settings.user_agent.as_str())
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl ArtifactProbe for HttpProbe {
    fn probe(&self, url: &str) -> ProbeOutcome {
        let result = self
            .agent
            .head(url)
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .call();
        match result {
            Ok(response) if response.status().is_success() => ProbeOutcome::Found,
            Ok(response) => ProbeOutcome::Missing {
                status: response.status().as_u16(),
            },
            Err(err) => map_ureq_error(&err),
        }
    }
}

/// Map a ureq error to a [`ProbeOutcome`].
fn map_ureq_error(err: &ureq::Error) -> ProbeOutcome {
    match err {
        ureq::Error::StatusCode(status) => ProbeOutcome::Missing { status: *status },
        other => ProbeOutcome::Unreachable {
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_ureq_error_maps_status_to_missing() {
        let outcome = map_ureq_error(&ureq::Error::StatusCode(404));
        assert_eq!(outcome, ProbeOutcome::Missing { status: 404 });
    }

    #[test]
    fn map_ureq_error_maps_transport_failures_to_unreachable() {
        let err = ureq::Error::Io(std::io::Error::other("connection refused"));
        let outcome = map_ureq_error(&err);
        assert!(matches!(outcome, ProbeOutcome::Unreachable { .. }));
    }

    #[test]
    fn default_settings_use_thirty_second_timeouts() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.connect_timeout_secs, 30);
        assert_eq!(settings.read_timeout_secs, 30);
        assert!(settings.user_agent.starts_with("launchermeta/"));
    }

    #[test]
    fn outcome_display_includes_status() {
        assert_eq!(
            ProbeOutcome::Missing { status: 404 }.to_string(),
            "missing (HTTP 404)"
        );
    }
}
