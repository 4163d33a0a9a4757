use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::Quota;
use tracing::debug;

use crate::{SourceError, SourceKind};

type DirectRateLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Longest window a budget may span.
pub const MAX_WINDOW: Duration = Duration::from_secs(86_400);

/// Request budget per rolling window, written `<requests>/<seconds>s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub requests: NonZeroU32,
    pub window: Duration,
}

impl RateBudget {
    pub fn new(requests: NonZeroU32, window: Duration) -> Self {
        Self { requests, window }
    }

    /// One cell every `window / requests` with no burst, so any span of
    /// `window` holds at most `requests` grants.
    fn quota(self) -> Option<Quota> {
        let period = (self.window.min(MAX_WINDOW) / self.requests.get()).max(Duration::from_nanos(1));
        Quota::with_period(period)
    }
}

impl Display for RateBudget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}s", self.requests, self.window.as_secs_f64())
    }
}

impl FromStr for RateBudget {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (requests, window) = value
            .trim()
            .split_once('/')
            .ok_or_else(|| String::from("missing '/'"))?;
        let requests = requests
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| String::from("request count must be a positive integer"))?;
        let window = window.trim();
        let seconds = window
            .strip_suffix('s')
            .unwrap_or(window)
            .parse::<f64>()
            .ok()
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .ok_or_else(|| String::from("window must be a positive number of seconds"))?;
        let window = Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|window| !window.is_zero() && *window <= MAX_WINDOW)
            .ok_or_else(|| format!("window must be at most {}s", MAX_WINDOW.as_secs()))?;
        Ok(Self::new(requests, window))
    }
}

/// Proof that a request slot was granted. Slots are consumed on grant, so
/// dropping the permit is the implicit release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permit {
    pub kind: SourceKind,
    pub waited: Duration,
}

/// Per-source-kind request throttle shared by every fetch in a run.
///
/// Each kind owns an independent governor limiter, so exhausting one kind
/// never delays another. Grants are spaced evenly across the window. Kinds without a budget are unlimited. Callers wait for a
/// slot; a wait longer than `max_wait` becomes a rate-limited failure.
#[derive(Clone)]
pub struct RateLimiter {
    limiters: Arc<HashMap<SourceKind, Arc<DirectRateLimiter>>>,
    budgets: Arc<HashMap<SourceKind, RateBudget>>,
    max_wait: Duration,
}

impl RateLimiter {
    pub fn new(budgets: impl IntoIterator<Item = (SourceKind, RateBudget)>, max_wait: Duration) -> Self {
        let budgets: HashMap<_, _> = budgets.into_iter().collect();
        let limiters = budgets
            .iter()
            .filter_map(|(kind, budget)| {
                budget
                    .quota()
                    .map(|quota| (*kind, Arc::new(DirectRateLimiter::direct(quota))))
            })
            .collect();

        Self {
            limiters: Arc::new(limiters),
            budgets: Arc::new(budgets),
            max_wait,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(Vec::new(), Duration::ZERO)
    }

    pub fn budget(&self, kind: SourceKind) -> Option<RateBudget> {
        self.budgets.get(&kind).copied()
    }

    /// Waits for a slot in `kind`'s budget.
    pub async fn acquire(&self, kind: SourceKind) -> Result<Permit, SourceError> {
        let started = Instant::now();
        let Some(limiter) = self.limiters.get(&kind) else {
            return Ok(Permit {
                kind,
                waited: Duration::ZERO,
            });
        };

        if limiter.check().is_ok() {
            return Ok(Permit {
                kind,
                waited: Duration::ZERO,
            });
        }

        debug!(source = %kind, max_wait_ms = self.max_wait.as_millis() as u64, "waiting for rate budget");
        match tokio::time::timeout(self.max_wait, limiter.until_ready()).await {
            Ok(()) => {
                let waited = started.elapsed();
                debug!(source = %kind, waited_ms = waited.as_millis() as u64, "rate budget granted");
                Ok(Permit { kind, waited })
            }
            Err(_) => Err(SourceError::rate_limit_wait_exceeded(format!(
                "{kind} rate budget still exhausted after waiting {:.1}s",
                self.max_wait.as_secs_f64()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureReason;

    fn budget(requests: u32, window_ms: u64) -> RateBudget {
        RateBudget::new(
            NonZeroU32::new(requests).expect("non-zero"),
            Duration::from_millis(window_ms),
        )
    }

    #[test]
    fn parses_budget_notation() {
        let parsed: RateBudget = "120/60s".parse().expect("budget should parse");
        assert_eq!(parsed, budget(120, 60_000));
        assert!("0/60s".parse::<RateBudget>().is_err());
        assert!("10-60s".parse::<RateBudget>().is_err());
    }

    #[test]
    fn oversized_windows_are_rejected() {
        assert!("1/1e20s".parse::<RateBudget>().is_err());
        assert!("1/90000s".parse::<RateBudget>().is_err());
        assert!("1/1e-12s".parse::<RateBudget>().is_err());
        assert!("1/86400s".parse::<RateBudget>().is_ok());
    }

    #[tokio::test]
    async fn first_slot_is_granted_without_waiting() {
        let limiter = RateLimiter::new([(SourceKind::RemoteMarket, budget(3, 60_000))], Duration::from_secs(1));

        let permit = limiter.acquire(SourceKind::RemoteMarket).await.expect("slot");
        assert_eq!(permit.waited, Duration::ZERO);
    }

    #[tokio::test]
    async fn no_window_holds_more_than_the_budget() {
        let window = Duration::from_millis(400);
        let limiter = RateLimiter::new([(SourceKind::RemoteIndicator, budget(2, 400))], Duration::from_secs(2));

        let started = Instant::now();
        let mut grants = Vec::new();
        for _ in 0..6 {
            limiter.acquire(SourceKind::RemoteIndicator).await.expect("slot within max wait");
            grants.push(started.elapsed());
        }

        // Any three consecutive grants must span a full window; 10ms covers timer slack.
        for triple in grants.windows(3) {
            let span = triple[2] - triple[0];
            assert!(span + Duration::from_millis(10) >= window, "grants={grants:?}");
        }
    }

    #[tokio::test]
    async fn exceeding_max_wait_is_rate_limited() {
        let limiter = RateLimiter::new([(SourceKind::RemoteIndicator, budget(1, 60_000))], Duration::from_millis(20));

        limiter.acquire(SourceKind::RemoteIndicator).await.expect("first slot");
        let err = limiter
            .acquire(SourceKind::RemoteIndicator)
            .await
            .expect_err("second slot must time out");
        assert_eq!(err.reason(), FailureReason::RateLimited);
        assert!(!err.retryable());
    }

    #[tokio::test]
    async fn kinds_have_independent_budgets() {
        let limiter = RateLimiter::new([(SourceKind::RemoteIndicator, budget(1, 60_000))], Duration::from_millis(10));

        limiter.acquire(SourceKind::RemoteIndicator).await.expect("indicator slot");
        for _ in 0..10 {
            limiter.acquire(SourceKind::Static).await.expect("unbudgeted kind never waits");
        }
        assert!(limiter.acquire(SourceKind::RemoteIndicator).await.is_err());
    }
}
