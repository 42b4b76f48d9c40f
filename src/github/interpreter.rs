//! GitHub effect interpreter using octocrab.
//!
//! Key implementation details:
//! - Snapshots combine three reads: the issue (labels, PR marker), the pull
//!   request (mergeability, head SHA) and the head commit's combined status,
//!   read across all of its pages
//! - `WaitForPending` polls the combined status until the contexts go pending
//!   or the client's wait timeout elapses
//! - Reads and deletes retry transient errors; posts and waits never do

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{
    AggregateStatus, CommentId, ContextStatus, IssueComment, PrNumber, PrSnapshot, Sha,
    StatusState, Tristate, aggregate_status,
};

use super::client::{OctocrabClient, PendingWaitConfig};
use super::error::GitHubApiError;
use super::retry::{RetryConfig, RetryPolicy, retry_with_backoff};

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        let policy = if effect.is_retriable() {
            RetryPolicy::RetryTransient
        } else {
            RetryPolicy::NoRetry
        };
        interpret_github_effect(self, effect, RetryConfig::DEFAULT, policy).await
    }
}

/// Interprets a GitHub effect, executing it against the GitHub API.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
    retry_config: RetryConfig,
    retry_policy: RetryPolicy,
) -> Result<GitHubResponse, GitHubApiError> {
    debug!(effect = effect.name(), repo = %client.repo(), "Interpreting GitHub effect");
    retry_with_backoff(retry_config, retry_policy, || {
        execute_effect(client, effect.clone())
    })
    .await
}

async fn execute_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::ListOpenIssues => list_open_issues(client).await,
        GitHubEffect::LoadSnapshot { pr } => load_snapshot(client, pr).await,
        GitHubEffect::ListComments { pr } => list_comments(client, pr).await,
        GitHubEffect::PostComment { pr, body } => post_comment(client, pr, body).await,
        GitHubEffect::WaitForPending { pr, contexts } => {
            wait_for_pending(client, pr, contexts).await
        }
        GitHubEffect::DeleteComment { comment_id } => delete_comment(client, comment_id).await,
    }
}

// ─── Issues ───────────────────────────────────────────────────────────────────

async fn list_open_issues(client: &OctocrabClient) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut numbers = Vec::new();

    loop {
        let result = client
            .inner()
            .issues(client.owner(), client.repo_name())
            .list()
            .state(octocrab::params::State::Open)
            .per_page(100)
            .page(page)
            .send()
            .await;

        match result {
            Ok(page_result) => {
                let items = page_result.items;
                let is_last_page = items.len() < 100;
                numbers.extend(items.iter().map(|issue| PrNumber(issue.number)));

                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::IssueList(numbers))
}

// ─── Snapshots ────────────────────────────────────────────────────────────────

async fn load_snapshot(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let issue = client
        .inner()
        .issues(client.owner(), client.repo_name())
        .get(pr.0)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let labels: BTreeSet<String> = issue.labels.into_iter().map(|l| l.name).collect();
    if issue.pull_request.is_none() {
        return Ok(GitHubResponse::Snapshot(PrSnapshot::issue(pr, labels)));
    }

    let pull = client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .get(pr.0)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let head_sha = Sha::new(pull.head.sha.clone());
    let statuses = combined_status(client, &head_sha).await?;

    Ok(GitHubResponse::Snapshot(PrSnapshot::pull_request(
        pr,
        labels,
        Tristate::from(pull.mergeable),
        head_sha,
        Some(statuses),
    )))
}

/// Page size for combined-status reads; GitHub's maximum.
const STATUS_PAGE_SIZE: usize = 100;

/// The combined status endpoint's response, reduced to what we read.
#[derive(Debug, Deserialize)]
struct CombinedStatusResponse {
    #[serde(default)]
    total_count: usize,
    statuses: Vec<StatusEntry>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    context: String,
    state: StatusState,
    updated_at: Option<DateTime<Utc>>,
}

async fn combined_status(
    client: &OctocrabClient,
    sha: &Sha,
) -> Result<BTreeMap<String, ContextStatus>, GitHubApiError> {
    let mut page = 1u32;
    let mut entries = Vec::new();

    loop {
        let url = format!(
            "/repos/{}/{}/commits/{}/status?per_page={STATUS_PAGE_SIZE}&page={page}",
            client.owner(),
            client.repo_name(),
            sha
        );

        let response: CombinedStatusResponse = client
            .inner()
            .get(&url, None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let fetched = response.statuses.len();
        entries.extend(response.statuses);
        if is_last_status_page(fetched, entries.len(), response.total_count) {
            break;
        }
        page += 1;
    }

    Ok(latest_statuses(entries))
}

/// A short page ends the listing, as does having seen `total_count` entries.
fn is_last_status_page(fetched: usize, seen: usize, total_count: usize) -> bool {
    fetched < STATUS_PAGE_SIZE || seen >= total_count
}

/// Keeps the most recently updated entry per context.
fn latest_statuses(entries: Vec<StatusEntry>) -> BTreeMap<String, ContextStatus> {
    let mut latest: BTreeMap<String, ContextStatus> = BTreeMap::new();
    for entry in entries {
        let newer = latest
            .get(&entry.context)
            .is_none_or(|existing| entry.updated_at > existing.updated_at);
        if newer {
            latest.insert(
                entry.context,
                ContextStatus::new(entry.state, entry.updated_at),
            );
        }
    }
    latest
}

// ─── Pending Wait ─────────────────────────────────────────────────────────────

/// Longest a pending wait runs, whatever the configured timeout.
const MAX_PENDING_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

async fn wait_for_pending(
    client: &OctocrabClient,
    pr: PrNumber,
    contexts: Vec<String>,
) -> Result<GitHubResponse, GitHubApiError> {
    let pull = client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .get(pr.0)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    let head_sha = Sha::new(pull.head.sha.clone());

    let sha = &head_sha;
    let response = poll_until_pending(client.pending_wait(), &contexts, move || {
        retry_with_backoff(RetryConfig::DEFAULT, RetryPolicy::RetryTransient, move || {
            combined_status(client, sha)
        })
    })
    .await?;

    if response == GitHubResponse::PendingReached {
        debug!(%pr, sha = head_sha.short(), "Required contexts are pending");
    }
    Ok(response)
}

/// Reads statuses every `recheck_interval` until the required contexts
/// aggregate to pending, or until another read would start past the timeout.
///
/// The timeout is clamped to [`MAX_PENDING_WAIT`].
async fn poll_until_pending<F, Fut, E>(
    wait: PendingWaitConfig,
    contexts: &[String],
    mut read_statuses: F,
) -> Result<GitHubResponse, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<BTreeMap<String, ContextStatus>, E>>,
{
    let deadline = Instant::now() + wait.timeout.min(MAX_PENDING_WAIT);

    loop {
        let statuses = read_statuses().await?;
        if aggregate_status(&statuses, contexts) == AggregateStatus::Pending {
            return Ok(GitHubResponse::PendingReached);
        }

        let past_deadline = Instant::now()
            .checked_add(wait.recheck_interval)
            .is_none_or(|next| next > deadline);
        if past_deadline {
            return Ok(GitHubResponse::PendingTimedOut);
        }
        tokio::time::sleep(wait.recheck_interval).await;
    }
}

// ─── Comments ─────────────────────────────────────────────────────────────────

async fn list_comments(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut all_comments = Vec::new();

    loop {
        let result = client
            .inner()
            .issues(client.owner(), client.repo_name())
            .list_comments(pr.0)
            .per_page(100)
            .page(page)
            .send()
            .await;

        match result {
            Ok(page_result) => {
                let items = page_result.items;
                let is_last_page = items.len() < 100;

                for comment in items {
                    all_comments.push(IssueComment {
                        id: Some(CommentId(comment.id.into_inner())),
                        author: comment.user.login,
                        body: comment.body.unwrap_or_default(),
                        created_at: Some(comment.created_at),
                    });
                }

                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::Comments(all_comments))
}

async fn post_comment(
    client: &OctocrabClient,
    pr: PrNumber,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let comment = client
        .inner()
        .issues(client.owner(), client.repo_name())
        .create_comment(pr.0, body)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::CommentPosted {
        id: CommentId(comment.id.into_inner()),
    })
}

async fn delete_comment(
    client: &OctocrabClient,
    comment_id: CommentId,
) -> Result<GitHubResponse, GitHubApiError> {
    client
        .inner()
        .issues(client.owner(), client.repo_name())
        .delete_comment(octocrab::models::CommentId(comment_id.0))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::CommentDeleted)
}
