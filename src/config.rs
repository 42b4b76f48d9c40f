//! Bot configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GITHUB_TOKEN` | required |
//! | `STALE_CI_REPO` | required, `owner/repo` |
//! | `STALE_CI_REQUIRED_CONTEXTS` | required, comma-separated |
//! | `STALE_CI_BOT_LOGIN` | `k8s-merge-robot` |
//! | `STALE_CI_RETEST_MENTION` | `k8s-bot` |
//! | `STALE_CI_APPROVED_LABEL` | `lgtm` |
//! | `STALE_CI_RETEST_NOT_REQUIRED_LABEL` | `retest-not-required` |
//! | `STALE_CI_RETEST_NOT_REQUIRED_DOCS_ONLY_LABEL` | `retest-not-required-docs-only` |
//! | `STALE_CI_POLL_INTERVAL_MINS` | 30 |
//! | `STALE_CI_PENDING_TIMEOUT_MINS` | 15 |
//!
//! The staleness threshold and the comment grace window are constants in
//! `crate::policy`, not configuration.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::github::PendingWaitConfig;
use crate::policy::{BotIdentity, PolicyLabels};
use crate::types::{InvalidRepoId, RepoId};

/// Default interval between sweeps (30 minutes).
const DEFAULT_POLL_INTERVAL_MINS: u64 = 30;

/// Errors reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} must be a positive number of minutes, got {value:?}")]
    InvalidMinutes { name: &'static str, value: String },

    #[error("STALE_CI_REQUIRED_CONTEXTS must name at least one context")]
    NoRequiredContexts,

    #[error(transparent)]
    InvalidRepo(#[from] InvalidRepoId),
}

/// Everything the binary needs to run sweeps.
#[derive(Clone)]
pub struct BotConfig {
    pub github_token: String,
    pub repo: RepoId,

    /// Required contexts, in the order the retrigger scans them.
    pub required_contexts: Vec<String>,

    pub identity: BotIdentity,
    pub labels: PolicyLabels,
    pub poll_interval: Duration,
    pub pending_wait: PendingWaitConfig,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("github_token", &"<redacted>")
            .field("repo", &self.repo)
            .field("required_contexts", &self.required_contexts)
            .field("identity", &self.identity)
            .field("labels", &self.labels)
            .field("poll_interval", &self.poll_interval)
            .field("pending_wait", &self.pending_wait)
            .finish()
    }
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name: &str| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let github_token = require("GITHUB_TOKEN")?;
        let repo: RepoId = require("STALE_CI_REPO")?.parse()?;

        let required_contexts = parse_contexts(&require("STALE_CI_REQUIRED_CONTEXTS")?);
        if required_contexts.is_empty() {
            return Err(ConfigError::NoRequiredContexts);
        }

        let defaults = BotIdentity::default();
        let identity = BotIdentity::new(
            get("STALE_CI_BOT_LOGIN").unwrap_or(defaults.login),
            get("STALE_CI_RETEST_MENTION").unwrap_or(defaults.retest_mention),
        );

        let defaults = PolicyLabels::default();
        let labels = PolicyLabels {
            approved: get("STALE_CI_APPROVED_LABEL").unwrap_or(defaults.approved),
            retest_not_required: get("STALE_CI_RETEST_NOT_REQUIRED_LABEL")
                .unwrap_or(defaults.retest_not_required),
            retest_not_required_docs_only: get("STALE_CI_RETEST_NOT_REQUIRED_DOCS_ONLY_LABEL")
                .unwrap_or(defaults.retest_not_required_docs_only),
        };

        let minutes = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match get(name) {
                None => Ok(Duration::from_secs(default * 60)),
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(m) if m > 0 => m
                        .checked_mul(60)
                        .map(Duration::from_secs)
                        .ok_or(ConfigError::InvalidMinutes { name, value }),
                    _ => Err(ConfigError::InvalidMinutes { name, value }),
                },
            }
        };

        let poll_interval = minutes("STALE_CI_POLL_INTERVAL_MINS", DEFAULT_POLL_INTERVAL_MINS)?;
        let default_wait = PendingWaitConfig::default();
        let pending_wait = PendingWaitConfig {
            timeout: minutes(
                "STALE_CI_PENDING_TIMEOUT_MINS",
                default_wait.timeout.as_secs() / 60,
            )?,
            ..default_wait
        };

        Ok(BotConfig {
            github_token,
            repo,
            required_contexts,
            identity,
            labels,
            poll_interval,
            pending_wait,
        })
    }
}

/// Splits a comma-separated list, dropping blanks and duplicates but keeping
/// first-seen order.
fn parse_contexts(raw: &str) -> Vec<String> {
    let mut contexts: Vec<String> = Vec::new();
    for context in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !contexts.iter().any(|c| c == context) {
            contexts.push(context.to_string());
        }
    }
    contexts
}
