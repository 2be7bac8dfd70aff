//! Check scheduling: a bounded worker pool for blocking checks and one
//! cooperative batch for async checks.
//!
//! The split is decided at registration time - two explicit typed lists,
//! never runtime introspection. Failure isolation is the scheduler's core
//! job: an escaped error or panic in one check lands in the error log under
//! that check's name and leaves every sibling untouched.

use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::context::ErrorLog;

/// A check that may block (pure DOM/header inspection, no suspension).
/// Registered as a zero-argument closure that already captured its
/// `Arc<CheckContext>`.
pub struct BlockingCheck {
    pub name: &'static str,
    pub run: Box<dyn FnOnce() -> anyhow::Result<()> + Send>,
}

impl BlockingCheck {
    pub fn new(
        name: &'static str,
        run: impl FnOnce() -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }
}

/// A check that suspends on network I/O.
pub struct AsyncCheck {
    pub name: &'static str,
    pub fut: futures::future::BoxFuture<'static, anyhow::Result<()>>,
}

impl AsyncCheck {
    pub fn new(
        name: &'static str,
        fut: impl std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    ) -> Self {
        Self {
            name,
            fut: Box::pin(fut),
        }
    }
}

pub struct Scheduler {
    workers: usize,
}

impl Scheduler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Run both groups to completion. The groups overlap freely: checks
    /// write disjoint keys, so ordering between them carries no meaning.
    pub async fn run(
        &self,
        blocking: Vec<BlockingCheck>,
        asynchronous: Vec<AsyncCheck>,
        errors: &ErrorLog,
    ) {
        tokio::join!(
            self.run_blocking(blocking, errors),
            Self::run_async(asynchronous, errors),
        );
    }

    async fn run_blocking(&self, checks: Vec<BlockingCheck>, errors: &ErrorLog) {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(checks.len());

        for check in checks {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("scheduler semaphore closed");
            let BlockingCheck { name, run } = check;
            handles.push((
                name,
                tokio::task::spawn_blocking(move || {
                    // The permit rides along so at most `workers` checks
                    // occupy the blocking pool at once.
                    let _permit = permit;
                    run()
                }),
            ));
        }

        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(())) => debug!("[SCHED] {} completed", name),
                Ok(Err(e)) => {
                    warn!("[SCHED] check {} failed: {:#}", name, e);
                    errors.record(name, format!("{e:#}"));
                }
                Err(join_err) if join_err.is_panic() => {
                    warn!("[SCHED] check {} panicked", name);
                    errors.record(name, "check panicked".to_string());
                }
                Err(join_err) => {
                    errors.record(name, format!("check task aborted: {join_err}"));
                }
            }
        }
    }

    async fn run_async(checks: Vec<AsyncCheck>, errors: &ErrorLog) {
        let guarded = checks.into_iter().map(|check| {
            let name = check.name;
            let errors = errors.clone();
            async move {
                match AssertUnwindSafe(check.fut).catch_unwind().await {
                    Ok(Ok(())) => debug!("[SCHED] {} completed", name),
                    Ok(Err(e)) => {
                        warn!("[SCHED] check {} failed: {:#}", name, e);
                        errors.record(name, format!("{e:#}"));
                    }
                    Err(_) => {
                        warn!("[SCHED] check {} panicked", name);
                        errors.record(name, "check panicked".to_string());
                    }
                }
            }
        });
        join_all(guarded).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Outcome, Status};
    use crate::domain::rules::RuleId;
    use crate::engine::context::ResultSink;

    #[tokio::test]
    async fn failing_blocking_check_does_not_block_siblings() {
        let sink = ResultSink::new();
        let errors = ErrorLog::default();

        let ok_sink = sink.clone();
        let checks = vec![
            BlockingCheck::new("always_fails", || anyhow::bail!("boom")),
            BlockingCheck::new("always_panics", || panic!("kaboom")),
            BlockingCheck::new("writes_outcome", move || {
                ok_sink.record(
                    RuleId::TitleTag,
                    Outcome::new(true, Status::Good, 10, "present"),
                );
                Ok(())
            }),
        ];

        Scheduler::new(4).run(checks, Vec::new(), &errors).await;

        let tree = sink.snapshot();
        assert!(tree
            .outcome(RuleId::TitleTag.section(), "title_tag")
            .is_some());
        let errors = errors.into_sorted();
        assert_eq!(errors.len(), 2);
        assert!(errors["always_fails"].contains("boom"));
        assert_eq!(errors["always_panics"], "check panicked");
    }

    #[tokio::test]
    async fn failing_async_check_does_not_stop_the_batch() {
        let sink = ResultSink::new();
        let errors = ErrorLog::default();

        let ok_sink = sink.clone();
        let checks = vec![
            AsyncCheck::new("async_fails", async { anyhow::bail!("net down") }),
            AsyncCheck::new("async_ok", async move {
                ok_sink.record(
                    RuleId::RobotsTxtExists,
                    Outcome::new(true, Status::Good, 10, "found"),
                );
                Ok(())
            }),
        ];

        Scheduler::new(4).run(Vec::new(), checks, &errors).await;

        assert!(sink
            .snapshot()
            .outcome(RuleId::RobotsTxtExists.section(), "robots_txt_exists")
            .is_some());
        assert!(errors.into_sorted().contains_key("async_fails"));
    }
}
