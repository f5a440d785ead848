// src/source/coordinator.rs
use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::models::RawRecord;
use crate::source::RecordSource;
use crate::utils::logging::{ProcessingLogger, Stage};

#[derive(Debug)]
pub enum FetchOutcome {
    Completed {
        request_id: Uuid,
        records: Vec<RawRecord>,
    },
    /// A newer fetch started, or `cancel` was called, before this one finished.
    Superseded { request_id: Uuid },
}

impl FetchOutcome {
    pub fn request_id(&self) -> Uuid {
        match self {
            FetchOutcome::Completed { request_id, .. } => *request_id,
            FetchOutcome::Superseded { request_id } => *request_id,
        }
    }

    pub fn into_records(self) -> Option<Vec<RawRecord>> {
        match self {
            FetchOutcome::Completed { records, .. } => Some(records),
            FetchOutcome::Superseded { .. } => None,
        }
    }
}

struct InFlight {
    request_id: Uuid,
    abort: AbortHandle,
}

/// Owns the cancellation handle of the one fetch allowed in flight. Share it
/// (behind an `Arc`) with every caller that may start a fetch.
#[derive(Default)]
pub struct RequestCoordinator {
    in_flight: Mutex<Option<InFlight>>,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch, aborting whatever fetch was in flight.
    pub async fn fetch<S: RecordSource>(&self, source: Arc<S>) -> Result<FetchOutcome> {
        let request_id = Uuid::new_v4();
        let logger = ProcessingLogger::new(Stage::Fetching);
        logger.log_start(&format!("request {} from {}", request_id, source.describe()));

        // Spawn and register under one lock so registration order is start order
        let handle = {
            let mut in_flight = self.in_flight.lock().await;
            let handle = tokio::spawn(async move { source.fetch().await });
            let previous = in_flight.replace(InFlight {
                request_id,
                abort: handle.abort_handle(),
            });
            if let Some(previous) = previous {
                debug!("Aborting request {} in favour of {}", previous.request_id, request_id);
                previous.abort.abort();
            }
            handle
        };

        let joined = handle.await;

        let still_current = {
            let mut in_flight = self.in_flight.lock().await;
            let current = in_flight.as_ref().map(|f| f.request_id) == Some(request_id);
            if current {
                *in_flight = None;
            }
            current
        };

        match joined {
            Err(join_error) if join_error.is_cancelled() => {
                logger.log_superseded(&request_id.to_string());
                Ok(FetchOutcome::Superseded { request_id })
            }
            Err(join_error) => Err(join_error).context("Record fetch task failed"),
            Ok(_) if !still_current => {
                logger.log_superseded(&request_id.to_string());
                Ok(FetchOutcome::Superseded { request_id })
            }
            Ok(records) => {
                let records = records.with_context(|| format!("Request {} failed", request_id))?;
                logger.log_fetch_complete(&request_id.to_string(), records.len());
                Ok(FetchOutcome::Completed {
                    request_id,
                    records,
                })
            }
        }
    }

    /// Aborts the fetch in flight, if any. Returns whether one was aborted.
    pub async fn cancel(&self) -> bool {
        match self.in_flight.lock().await.take() {
            Some(previous) => {
                debug!("Cancelling request {}", previous.request_id);
                previous.abort.abort();
                true
            }
            None => false,
        }
    }

    pub async fn in_flight(&self) -> Option<Uuid> {
        self.in_flight.lock().await.as_ref().map(|f| f.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct DelayedSource {
        delay: Duration,
        records: Vec<RawRecord>,
        fail: bool,
        started: AtomicBool,
    }

    impl DelayedSource {
        fn new(delay_ms: u64, names: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(delay_ms),
                records: names.iter().map(|n| RawRecord::named(n)).collect(),
                fail: false,
                started: AtomicBool::new(false),
            })
        }
    }

    impl RecordSource for DelayedSource {
        fn describe(&self) -> String {
            "delayed test source".to_string()
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>> {
            self.started.store(true, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(anyhow!("upstream exploded"));
            }
            Ok(self.records.clone())
        }
    }

    #[tokio::test]
    async fn test_newer_fetch_supersedes_older() {
        let coordinator = Arc::new(RequestCoordinator::new());

        let slow = DelayedSource::new(5_000, &["Old Result"]);
        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.fetch(slow).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(coordinator.in_flight().await.is_some());

        let fast = DelayedSource::new(10, &["New A", "New B"]);
        let second = coordinator.fetch(fast).await.unwrap();
        let first = first.await.unwrap().unwrap();

        assert!(matches!(first, FetchOutcome::Superseded { .. }));
        assert_ne!(first.request_id(), second.request_id());
        assert_eq!(second.into_records().map(|r| r.len()), Some(2));
        assert!(coordinator.in_flight().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_fetch() {
        let coordinator = Arc::new(RequestCoordinator::new());
        assert!(!coordinator.cancel().await);

        let slow = DelayedSource::new(5_000, &["Never"]);
        let pending = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.fetch(slow).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(coordinator.cancel().await);
        let outcome = pending.await.unwrap().unwrap();
        assert!(outcome.into_records().is_none());
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let coordinator = RequestCoordinator::new();
        let failing = Arc::new(DelayedSource {
            delay: Duration::from_millis(1),
            records: Vec::new(),
            fail: true,
            started: AtomicBool::new(false),
        });
        let err = coordinator.fetch(failing).await.unwrap_err();
        assert!(format!("{:#}", err).contains("upstream exploded"));
        assert!(coordinator.in_flight().await.is_none());
    }

    #[tokio::test]
    async fn test_fetches_register_in_start_order() {
        let coordinator = Arc::new(RequestCoordinator::new());
        let older = DelayedSource::new(20, &["Older"]);
        let newer = DelayedSource::new(20, &["Newer"]);

        let guard = coordinator.in_flight.lock().await;
        let first = {
            let (coordinator, source) = (coordinator.clone(), older.clone());
            tokio::spawn(async move { coordinator.fetch(source).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = {
            let (coordinator, source) = (coordinator.clone(), newer.clone());
            tokio::spawn(async move { coordinator.fetch(source).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Nothing runs until it is registered
        assert!(!older.started.load(Ordering::SeqCst));
        assert!(!newer.started.load(Ordering::SeqCst));
        drop(guard);

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert!(matches!(first, FetchOutcome::Superseded { .. }));
        let names: Vec<String> = second
            .into_records()
            .unwrap()
            .into_iter()
            .filter_map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Newer".to_string()]);
    }
}
