use std::future::Future;

use crate::config::PollPolicy;

/// Where a wait for a search index stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexReadiness {
    /// No check has run yet.
    Unknown,
    /// Checks are in progress.
    Checking,
    /// A check saw the index.
    Ready,
    /// The attempt budget ran out without seeing the index.
    TimedOut,
}

impl IndexReadiness {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IndexReadiness::Ready | IndexReadiness::TimedOut)
    }
}

/// Repeats an existence check until it succeeds or the attempt budget of
/// its [`PollPolicy`] is exceeded.
///
/// There is no cancellation; wrap [`poll`](Self::poll) in
/// `tokio::time::timeout` or `select!` to stop early.
#[derive(Debug)]
pub struct IndexReadinessPoller {
    policy: PollPolicy,
    state: IndexReadiness,
    attempts: usize,
}

impl IndexReadinessPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            state: IndexReadiness::Unknown,
            attempts: 0,
        }
    }

    pub fn state(&self) -> IndexReadiness {
        self.state
    }

    /// Number of checks performed by the last [`poll`](Self::poll).
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Run `check` until it returns `true` or more than `max_attempts`
    /// checks have failed, sleeping `interval` between checks.
    pub async fn poll<F, Fut>(&mut self, mut check: F) -> IndexReadiness
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        self.state = IndexReadiness::Checking;
        self.attempts = 0;

        loop {
            self.attempts += 1;
            if check().await {
                self.state = IndexReadiness::Ready;
                return self.state;
            }
            if self.attempts > self.policy.max_attempts {
                self.state = IndexReadiness::TimedOut;
                return self.state;
            }
            tracing::debug!(
                attempt = self.attempts,
                max_attempts = self.policy.max_attempts,
                "index not visible yet"
            );
            tokio::time::sleep(self.policy.interval).await;
        }
    }
}
