//! Octocrab client wrapper scoped to a specific repository.
//!
//! Effects don't carry repository information, so the client that interprets
//! them does.

use std::time::Duration;

use octocrab::Octocrab;

use crate::types::RepoId;

/// Default bound on waiting for contexts to go pending (15 minutes).
const DEFAULT_PENDING_TIMEOUT_SECS: u64 = 15 * 60;

/// Default interval between status checks while waiting (10 seconds).
const DEFAULT_PENDING_RECHECK_SECS: u64 = 10;

/// How `WaitForPending` polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWaitConfig {
    /// Give up after this long and report a timeout.
    pub timeout: Duration,

    /// Delay between combined-status reads.
    pub recheck_interval: Duration,
}

impl Default for PendingWaitConfig {
    fn default() -> Self {
        PendingWaitConfig {
            timeout: Duration::from_secs(DEFAULT_PENDING_TIMEOUT_SECS),
            recheck_interval: Duration::from_secs(DEFAULT_PENDING_RECHECK_SECS),
        }
    }
}

/// A GitHub API client scoped to a specific repository.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
    pending_wait: PendingWaitConfig,
}

impl OctocrabClient {
    /// Creates a new client scoped to the given repository.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self {
            client,
            repo,
            pending_wait: PendingWaitConfig::default(),
        }
    }

    /// Creates a client authenticated with a personal access token.
    pub fn from_token(token: impl Into<String>, repo: RepoId) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client, repo))
    }

    /// Replaces the pending-wait settings.
    pub fn with_pending_wait(mut self, pending_wait: PendingWaitConfig) -> Self {
        self.pending_wait = pending_wait;
        self
    }

    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    pub fn pending_wait(&self) -> PendingWaitConfig {
        self.pending_wait
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .field("pending_wait", &self.pending_wait)
            .finish_non_exhaustive()
    }
}
