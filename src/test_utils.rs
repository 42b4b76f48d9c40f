//! Shared test fixtures, a recording interpreter, and proptest generators.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{CommentId, IssueComment, PrNumber, PrSnapshot, Sha, Tristate};

/// A fixed "now" so tests don't depend on the wall clock.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

pub fn contexts(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// An approved, mergeable pull request with no statuses yet.
pub fn approved_pr(number: u64) -> PrSnapshot {
    PrSnapshot::pull_request(
        PrNumber(number),
        BTreeSet::from(["lgtm".to_string()]),
        Tristate::Yes,
        Sha::new("a".repeat(40)),
        Some(BTreeMap::new()),
    )
}

/// Status ages the policy must treat as fresh (up to and including 96h).
pub fn arb_fresh_age() -> impl Strategy<Value = TimeDelta> {
    (0i64..=96 * 3600).prop_map(TimeDelta::seconds)
}

/// Status ages the policy must treat as stale (96h plus at least a second).
pub fn arb_stale_age() -> impl Strategy<Value = TimeDelta> {
    (96 * 3600 + 1..=5000 * 3600i64).prop_map(TimeDelta::seconds)
}

/// A mock interpreter that records every effect and answers from fixtures.
#[derive(Default)]
pub struct RecordingInterpreter {
    seen: Mutex<Vec<GitHubEffect>>,
    fail_on: Option<&'static str>,
    pending_times_out: bool,
    snapshots: BTreeMap<PrNumber, PrSnapshot>,
    comments: BTreeMap<PrNumber, Vec<IssueComment>>,
}

impl RecordingInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every effect with this [`GitHubEffect::name`].
    pub fn failing_on(mut self, effect: &'static str) -> Self {
        self.fail_on = Some(effect);
        self
    }

    /// Answer `WaitForPending` with a timeout.
    pub fn pending_times_out(mut self) -> Self {
        self.pending_times_out = true;
        self
    }

    /// Serve `snapshot` for `LoadSnapshot` and list it as an open issue.
    pub fn with_snapshot(mut self, snapshot: PrSnapshot) -> Self {
        self.snapshots.insert(snapshot.number, snapshot);
        self
    }

    pub fn with_comments(mut self, pr: u64, comments: Vec<IssueComment>) -> Self {
        self.comments.insert(PrNumber(pr), comments);
        self
    }

    /// Every effect interpreted so far, in order.
    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.seen.lock().unwrap().clone()
    }

    /// Only the effects that write to GitHub.
    pub fn writes(&self) -> Vec<GitHubEffect> {
        self.effects()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    GitHubEffect::PostComment { .. } | GitHubEffect::DeleteComment { .. }
                )
            })
            .collect()
    }

    fn respond(&self, effect: GitHubEffect) -> Result<GitHubResponse, String> {
        if self.fail_on == Some(effect.name()) {
            return Err(format!("{} failed", effect.name()));
        }

        match effect {
            GitHubEffect::ListOpenIssues => Ok(GitHubResponse::IssueList(
                self.snapshots.keys().copied().collect(),
            )),
            GitHubEffect::LoadSnapshot { pr } => self
                .snapshots
                .get(&pr)
                .cloned()
                .map(GitHubResponse::Snapshot)
                .ok_or_else(|| format!("no snapshot for {pr}")),
            GitHubEffect::ListComments { pr } => Ok(GitHubResponse::Comments(
                self.comments.get(&pr).cloned().unwrap_or_default(),
            )),
            GitHubEffect::PostComment { .. } => Ok(GitHubResponse::CommentPosted {
                id: CommentId(1000 + self.seen.lock().unwrap().len() as u64),
            }),
            GitHubEffect::WaitForPending { .. } if self.pending_times_out => {
                Ok(GitHubResponse::PendingTimedOut)
            }
            GitHubEffect::WaitForPending { .. } => Ok(GitHubResponse::PendingReached),
            GitHubEffect::DeleteComment { .. } => Ok(GitHubResponse::CommentDeleted),
        }
    }
}

impl GitHubInterpreter for RecordingInterpreter {
    type Error = String;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        self.seen.lock().unwrap().push(effect.clone());
        let result = self.respond(effect);
        async move { result }
    }
}
