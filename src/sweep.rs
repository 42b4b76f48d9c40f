//! One pass of the policy over a repository's open issues.
//!
//! For each open issue the sweep loads a snapshot, prunes our obsolete retest
//! comments, then asks the retrigger whether to request a new retest. Both
//! steps read the same snapshot.
//!
//! A failure on one PR is logged and counted; the pass carries on with the
//! next one. Only failing to list the open issues aborts the pass.

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::policy::{RetestError, RetestOutcome, StaleGreenCi};
use crate::types::{IssueComment, PrNumber, PrSnapshot};

/// Errors from sweeping a single PR, or from listing the PRs to sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("GitHub API error during {effect}: {message}")]
    GitHub {
        effect: &'static str,
        message: String,
    },

    #[error("unexpected response to {effect}: {response}")]
    UnexpectedResponse {
        effect: &'static str,
        response: String,
    },

    #[error(transparent)]
    Retest(#[from] RetestError),
}

/// Counts from one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Open issues looked at.
    pub examined: usize,
    /// PRs that got a retest comment.
    pub retriggered: usize,
    /// Obsolete retest comments deleted.
    pub comments_pruned: usize,
    /// PRs whose evaluation failed.
    pub failures: usize,
}

/// What happened to one PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrReport {
    pub pr: PrNumber,
    pub outcome: RetestOutcome,
    pub comments_pruned: usize,
}

/// Runs the policy over every open issue.
///
/// `required_contexts` are passed through on every evaluation, so a caller
/// that re-reads them between passes sees changes immediately.
#[instrument(skip_all, fields(policy = policy.name()))]
pub async fn run_sweep<G: GitHubInterpreter>(
    github: &G,
    policy: &StaleGreenCi,
    required_contexts: &[String],
) -> Result<SweepSummary, SweepError> {
    let issues = match execute(github, GitHubEffect::ListOpenIssues).await? {
        GitHubResponse::IssueList(issues) => issues,
        other => return Err(unexpected("list_open_issues", other)),
    };

    let mut summary = SweepSummary::default();
    for pr in issues {
        summary.examined += 1;
        match sweep_pr(github, policy, pr, required_contexts).await {
            Ok(report) => {
                summary.comments_pruned += report.comments_pruned;
                if matches!(report.outcome, RetestOutcome::Retriggered { .. }) {
                    summary.retriggered += 1;
                }
            }
            Err(e) => {
                summary.failures += 1;
                error!(%pr, error = %e, "Stale green CI evaluation failed");
            }
        }
    }

    info!(
        examined = summary.examined,
        retriggered = summary.retriggered,
        comments_pruned = summary.comments_pruned,
        failures = summary.failures,
        "Sweep complete"
    );
    Ok(summary)
}

/// Prunes obsolete comments on `pr` and evaluates it for a retest.
pub async fn sweep_pr<G: GitHubInterpreter>(
    github: &G,
    policy: &StaleGreenCi,
    pr: PrNumber,
    required_contexts: &[String],
) -> Result<PrReport, SweepError> {
    let snapshot = match execute(github, GitHubEffect::LoadSnapshot { pr }).await? {
        GitHubResponse::Snapshot(snapshot) => snapshot,
        other => return Err(unexpected("load_snapshot", other)),
    };

    let comments_pruned = if snapshot.is_pull_request {
        prune_stale_comments(github, policy, &snapshot, required_contexts).await?
    } else {
        0
    };

    let outcome = policy.run(&snapshot, required_contexts, github).await?;

    Ok(PrReport {
        pr,
        outcome,
        comments_pruned,
    })
}

async fn prune_stale_comments<G: GitHubInterpreter>(
    github: &G,
    policy: &StaleGreenCi,
    snapshot: &PrSnapshot,
    required_contexts: &[String],
) -> Result<usize, SweepError> {
    let pr = snapshot.number;
    let comments: Vec<IssueComment> =
        match execute(github, GitHubEffect::ListComments { pr }).await? {
            GitHubResponse::Comments(comments) => comments,
            other => return Err(unexpected("list_comments", other)),
        };

    let mut pruned = 0;
    for comment in policy.filter_stale(snapshot, &comments, required_contexts) {
        let Some(comment_id) = comment.id else {
            warn!(%pr, "Stale retest comment has no ID, cannot delete");
            continue;
        };
        match execute(github, GitHubEffect::DeleteComment { comment_id }).await? {
            GitHubResponse::CommentDeleted => {
                info!(%pr, %comment_id, "Deleted stale retest comment");
                pruned += 1;
            }
            other => return Err(unexpected("delete_comment", other)),
        }
    }
    Ok(pruned)
}

async fn execute<G: GitHubInterpreter>(
    github: &G,
    effect: GitHubEffect,
) -> Result<GitHubResponse, SweepError> {
    let name = effect.name();
    github
        .interpret(effect)
        .await
        .map_err(|e| SweepError::GitHub {
            effect: name,
            message: e.to_string(),
        })
}

fn unexpected(effect: &'static str, response: GitHubResponse) -> SweepError {
    SweepError::UnexpectedResponse {
        effect,
        response: format!("{response:?}"),
    }
}
