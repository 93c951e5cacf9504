//! Bounded retry and page iteration for remote listings.
//!
//! Every remote call goes through [`Fetcher::with_retry`]: a failed attempt
//! is retried after `base^attempt` seconds until `max_tries` attempts have
//! been made. [`Fetcher::paginate`] walks a listing page by page on top of
//! that and hands each item to a [`Verdict`] callback, which lets the release
//! listing stop as soon as it reaches releases older than the cutoff.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use indicatif::ProgressBar;

use crate::{
    catalog::{Page, PageRequest},
    error::{ExhaustedRetries, RemoteError},
    warning,
};

/// Blocking wait between two attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, the first one included.
    pub max_tries: u32,
    pub base_backoff_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 4,
            base_backoff_secs: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): 2s, 4s, 8s, ...
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        Duration::from_secs(self.base_backoff_secs.saturating_pow(failed_attempt))
    }
}

/// How a listing signals its last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStyle {
    /// Ends with a page shorter than the requested limit.
    Offset,
    /// Ends when the page carries no next cursor.
    Cursor,
}

/// Decision taken for every fetched item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Skip,
    /// Drop this item and stop the whole listing.
    Stop,
}

/// Result of walking a paginated listing.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Complete(T),
    /// A page could not be fetched; `partial` holds what was kept before it.
    Exhausted {
        partial: T,
        failure: ExhaustedRetries,
    },
}

impl<T> FetchOutcome<T> {
    /// For call sites where an exhausted page aborts the run.
    pub fn into_result(self) -> Result<T, ExhaustedRetries> {
        match self {
            FetchOutcome::Complete(items) => Ok(items),
            FetchOutcome::Exhausted { failure, .. } => Err(failure),
        }
    }

    /// For call sites that carry on with whatever was fetched.
    pub fn into_parts(self) -> (T, Option<ExhaustedRetries>) {
        match self {
            FetchOutcome::Complete(items) => (items, None),
            FetchOutcome::Exhausted { partial, failure } => (partial, Some(failure)),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FetchOutcome::Complete(_))
    }
}

#[derive(Clone)]
pub struct Fetcher {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    progress: Option<ProgressBar>,
}

impl Fetcher {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            policy,
            sleeper,
            progress: None,
        }
    }

    /// A fetcher that hides `pb` while printing retry warnings, so they do
    /// not get mixed into the spinner line.
    pub fn with_progress(&self, pb: &ProgressBar) -> Self {
        Self {
            progress: Some(pb.clone()),
            ..self.clone()
        }
    }

    fn report(&self, message: impl FnOnce()) {
        match &self.progress {
            Some(pb) => pb.suspend(message),
            None => message(),
        }
    }

    /// Runs `call` until it succeeds or the policy's attempts are used up.
    pub async fn with_retry<T, F, Fut>(
        &self,
        operation: &str,
        mut call: F,
    ) -> Result<T, ExhaustedRetries>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_tries = self.policy.max_tries.max(1);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_tries => {
                    return Err(ExhaustedRetries {
                        operation: operation.to_string(),
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt);
                    self.report(|| {
                        warning!(
                            "{} failed (attempt {}/{}): {}. Retrying in {}s.",
                            operation,
                            attempt,
                            max_tries,
                            e,
                            delay.as_secs()
                        )
                    });
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Fetches pages until the listing ends or `verdict` returns [`Verdict::Stop`].
    ///
    /// Page termination is judged on the raw page, so skipped items still
    /// count towards the page size.
    pub async fn paginate<T, F, Fut, V>(
        &self,
        operation: &str,
        style: PageStyle,
        limit: u32,
        mut fetch: F,
        mut verdict: V,
    ) -> FetchOutcome<Vec<T>>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Page<T>, RemoteError>>,
        V: FnMut(&T) -> Verdict,
    {
        let mut items = Vec::new();
        let mut request = PageRequest::first(limit);

        loop {
            let page = match self.with_retry(operation, || fetch(request.clone())).await {
                Ok(page) => page,
                Err(failure) => {
                    return FetchOutcome::Exhausted {
                        partial: items,
                        failure,
                    };
                }
            };

            let fetched = page.items.len();
            for item in page.items {
                match verdict(&item) {
                    Verdict::Keep => items.push(item),
                    Verdict::Skip => {}
                    Verdict::Stop => return FetchOutcome::Complete(items),
                }
            }

            if fetched == 0 {
                break;
            }

            request = match style {
                PageStyle::Offset if fetched < limit as usize => break,
                PageStyle::Offset => PageRequest {
                    offset: request.offset + limit,
                    limit,
                    after: None,
                },
                PageStyle::Cursor => match page.next_cursor {
                    Some(after) => PageRequest {
                        offset: request.offset + fetched as u32,
                        limit,
                        after: Some(after),
                    },
                    None => break,
                },
            };
        }

        FetchOutcome::Complete(items)
    }
}
