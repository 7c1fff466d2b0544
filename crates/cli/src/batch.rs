//! Bounded worker pool for batch conversion.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Upper bound on concurrent workers.
pub const MAX_WORKERS: usize = 10;

/// Outcome of a batch run. Order within each list is completion order.
#[derive(Debug)]
pub struct BatchReport<T, E> {
    pub completed: Vec<T>,
    pub failures: Vec<E>,
}

impl<T, E> BatchReport<T, E> {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failures.len()
    }

    /// True when there was work and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        self.completed.is_empty() && !self.failures.is_empty()
    }
}

/// A job that panicked instead of returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPanic<I> {
    pub item: I,
    pub message: String,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Clamp a requested worker count to `1..=MAX_WORKERS`.
pub fn clamp_workers(requested: usize) -> usize {
    requested.clamp(1, MAX_WORKERS)
}

/// Run `job` over every item with at most `workers` threads.
///
/// A failing or panicking item is recorded and never stops the others.
pub fn run_bounded<I, T, E, F>(items: &[I], workers: usize, job: F) -> BatchReport<T, E>
where
    I: Clone + Sync,
    T: Send,
    E: Send + From<JobPanic<I>>,
    F: Fn(&I) -> Result<T, E> + Sync,
{
    let next = AtomicUsize::new(0);
    let completed = Mutex::new(Vec::new());
    let failures = Mutex::new(Vec::new());
    let workers = clamp_workers(workers).min(items.len().max(1));

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(item) = items.get(index) else {
                    break;
                };
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(item)))
                    .unwrap_or_else(|payload| {
                        Err(E::from(JobPanic {
                            item: item.clone(),
                            message: panic_message(payload.as_ref()),
                        }))
                    });
                match outcome {
                    Ok(value) => completed
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(value),
                    Err(error) => failures
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(error),
                }
            });
        }
    });

    BatchReport {
        completed: completed.into_inner().unwrap_or_else(PoisonError::into_inner),
        failures: failures.into_inner().unwrap_or_else(PoisonError::into_inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum JobError {
        Rejected(i32),
        Panicked(i32, String),
    }

    impl From<JobPanic<i32>> for JobError {
        fn from(panic: JobPanic<i32>) -> Self {
            JobError::Panicked(panic.item, panic.message)
        }
    }

    #[test]
    fn test_clamp_workers() {
        assert_eq!(clamp_workers(0), 1);
        assert_eq!(clamp_workers(4), 4);
        assert_eq!(clamp_workers(64), MAX_WORKERS);
    }

    #[test]
    fn test_every_item_processed_once() {
        let items: Vec<i32> = (0..100).collect();
        let report = run_bounded(&items, 4, |n| Ok::<i32, JobError>(n * 2));

        let mut values = report.completed;
        values.sort_unstable();
        assert_eq!(values, (0..100).map(|n| n * 2).collect::<Vec<_>>());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_failures_do_not_stop_others() {
        let items = vec![1, 2, 3, 4, 5, 6];
        let report = run_bounded(&items, 3, |n| {
            if n % 2 == 0 {
                Err(JobError::Rejected(*n))
            } else {
                Ok(*n)
            }
        });

        assert_eq!(report.completed.len(), 3);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.total(), 6);
        assert!(!report.all_failed());
    }

    #[test]
    fn test_panicking_job_is_recorded_as_failure() {
        let items = vec![1, 2, 3, 4];
        let report = run_bounded(&items, 2, |n| {
            if *n == 3 {
                panic!("bad input {}", n);
            }
            Ok::<i32, JobError>(*n)
        });

        let mut completed = report.completed;
        completed.sort_unstable();
        assert_eq!(completed, vec![1, 2, 4]);
        assert_eq!(
            report.failures,
            vec![JobError::Panicked(3, "bad input 3".to_string())]
        );
    }

    #[test]
    fn test_all_failed() {
        let report = run_bounded(&[1, 2][..], 2, |n| Err::<(), _>(JobError::Rejected(*n)));
        assert!(report.all_failed());
    }

    #[test]
    fn test_empty_batch() {
        let items: Vec<i32> = Vec::new();
        let report = run_bounded(&items, 5, |_| Ok::<(), JobError>(()));
        assert_eq!(report.total(), 0);
        assert!(!report.all_failed());
    }
}
