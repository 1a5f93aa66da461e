//! Generic polling engine for long-running remote operations.
//!
//! [`poll`] drives an initial request followed by repeated polling requests
//! until a caller-supplied stop predicate is satisfied, the attempt budget is
//! exhausted, or the wall-clock budget elapses. The engine never inspects the
//! response shape itself: termination and error recovery are delegated to the
//! hooks carried in [`PollOptions`]. Each resource waiter in
//! [`crate::resources`] fixes those hooks for one status field and validates
//! the resting state afterwards.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Delay before the first polling attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
/// Delay between polling attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Polling attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

type StopPredicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type AttemptObserver<T> = Box<dyn FnMut(u32, &T) + Send>;
type ErrorRecovery<T> = Box<dyn Fn(ApiError) -> Result<T, ApiError> + Send + Sync>;

/// Configuration for one [`poll`] call.
///
/// Built over [`Default`] with the `with_*`/hook methods; every field is
/// optional. Without a stop predicate the loop runs until the attempt or
/// wall-clock budget ends it — a caller omitting the predicate *and* both
/// budgets has misconfigured the operation, and the defaults keep the attempt
/// budget finite.
pub struct PollOptions<T> {
    initial_delay: Duration,
    interval: Duration,
    max_attempts: u32,
    timeout: Option<Duration>,
    should_stop: Option<StopPredicate<T>>,
    on_attempt: Option<AttemptObserver<T>>,
    on_error: Option<ErrorRecovery<T>>,
}

impl<T> Default for PollOptions<T> {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: None,
            should_stop: None,
            on_attempt: None,
            on_error: None,
        }
    }
}

impl<T> PollOptions<T> {
    /// Delay between the initial request and the first polling attempt.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Delay between polling attempts.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Polling-attempt budget. The initial request does not count.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Wall-clock budget for the entire operation, raced against every
    /// request and delay.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Stop predicate. Returning `false` means "keep polling"; the engine
    /// stops on the first `true`, whether or not the resting state is the
    /// desirable one.
    #[must_use]
    pub fn stop_when(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.should_stop = Some(Box::new(predicate));
        self
    }

    /// Side-effect-only observer invoked after each polling response, before
    /// the stop predicate. Not invoked for the initial request.
    #[must_use]
    pub fn on_attempt(mut self, observer: impl FnMut(u32, &T) + Send + 'static) -> Self {
        self.on_attempt = Some(Box::new(observer));
        self
    }

    /// Error-recovery hook. Receives every request error; must return a
    /// substitute result for the one transient kind it recognizes and give
    /// the error back for everything else.
    #[must_use]
    pub fn on_error(
        mut self,
        recover: impl Fn(ApiError) -> Result<T, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(recover));
        self
    }

    fn stops_at(&self, value: &T) -> bool {
        self.should_stop.as_ref().is_some_and(|stop| stop(value))
    }

    fn recover(&self, err: ApiError) -> Result<T, ApiError> {
        match &self.on_error {
            Some(hook) => hook(err),
            None => Err(err),
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1");
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err("timeout must be positive when set");
        }
        Ok(())
    }
}

/// Terminal failure of a [`poll`] call.
///
/// The three kinds stay distinguishable because waiters key behavior off
/// which one occurred; the budget failures carry the last observed result so
/// callers can report the state the operation was left in.
#[derive(Debug, Error)]
pub enum PollError<T: fmt::Debug> {
    /// The wall-clock budget elapsed before the stop predicate held.
    #[error("polling timed out after {waited:?}")]
    TimedOut {
        waited: Duration,
        /// Last observed result; absent if no attempt completed.
        last: Option<T>,
    },

    /// The attempt budget was exhausted before the stop predicate held.
    #[error("polling gave up after {attempts} attempts")]
    AttemptsExhausted { attempts: u32, last: Option<T> },

    /// A request error that was not recovered by the `on_error` hook.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The options were rejected before any request was made.
    #[error("invalid polling options: {reason}")]
    InvalidConfig { reason: &'static str },
}

/// Drive `initial_request` once, then `polling_request` repeatedly, until the
/// stop predicate holds or a budget ends the operation.
///
/// Exactly one outcome is produced: the terminal result, or one of the three
/// failure kinds of [`PollError`]. The wall-clock budget is raced against
/// every request and delay; the losing future is dropped, and the engine
/// itself never installs per-attempt timeouts or cancellation.
///
/// # Errors
///
/// Returns [`PollError::InvalidConfig`] for rejected options,
/// [`PollError::Api`] for an unrecovered request error,
/// [`PollError::TimedOut`] when the wall-clock budget elapses, and
/// [`PollError::AttemptsExhausted`] when the attempt budget runs out.
pub async fn poll<T, I, P, IFut, PFut>(
    initial_request: I,
    mut polling_request: P,
    mut options: PollOptions<T>,
) -> Result<T, PollError<T>>
where
    T: fmt::Debug,
    I: FnOnce() -> IFut,
    P: FnMut() -> PFut,
    IFut: Future<Output = Result<T, ApiError>>,
    PFut: Future<Output = Result<T, ApiError>>,
{
    if let Err(reason) = options.validate() {
        return Err(PollError::InvalidConfig { reason });
    }

    let started = Instant::now();
    let deadline = options.timeout.map(|t| started + t);

    let mut result = match bounded(deadline, initial_request()).await {
        None => return Err(timed_out(started, None)),
        Some(Ok(value)) => value,
        Some(Err(err)) => options.recover(err)?,
    };

    if options.stops_at(&result) {
        debug!("initial result satisfied the stop predicate");
        return Ok(result);
    }

    if bounded(deadline, sleep(options.initial_delay)).await.is_none() {
        return Err(timed_out(started, Some(result)));
    }

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let next = match bounded(deadline, polling_request()).await {
            None => return Err(timed_out(started, Some(result))),
            Some(Ok(value)) => value,
            Some(Err(err)) => options.recover(err)?,
        };
        debug!(attempt, max_attempts = options.max_attempts, "polling attempt completed");
        if let Some(observer) = options.on_attempt.as_mut() {
            observer(attempt, &next);
        }
        if options.stops_at(&next) {
            debug!(attempt, "stop predicate satisfied");
            return Ok(next);
        }
        result = next;

        if attempt >= options.max_attempts {
            warn!(attempts = attempt, "polling attempt budget exhausted");
            return Err(PollError::AttemptsExhausted {
                attempts: attempt,
                last: Some(result),
            });
        }
        if bounded(deadline, sleep(options.interval)).await.is_none() {
            return Err(timed_out(started, Some(result)));
        }
    }
}

/// Race a future against the operation deadline. `None` means the deadline
/// won; the losing future is dropped.
async fn bounded<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn timed_out<T: fmt::Debug>(started: Instant, last: Option<T>) -> PollError<T> {
    let waited = started.elapsed();
    warn!(?waited, "polling wall-clock budget exhausted");
    PollError::TimedOut { waited, last }
}
