//! Ordered steps with reverse-order compensation.
//!
//! A lifecycle operation spans the catalog and a media server with no
//! shared transaction. It is expressed as a [`Saga`]:
//!
//! 1. zero or more *compensable* steps, each registering an undo action;
//! 2. one *pivot* step, the remote side effect that cannot be taken back;
//! 3. zero or more *post-pivot* steps.
//!
//! A failure before or at the pivot runs the registered undo actions in
//! reverse order and surfaces the original error. A failure after the
//! pivot cannot be compensated: it is logged under [`RECONCILE_TARGET`]
//! as a divergence between catalog and media server, then surfaced.

use std::future::Future;

use futures::future::BoxFuture;
use tracing::{debug, error, info, warn};

use mediahub_core::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId};

/// Log target for catalog/media-server divergence that needs an operator.
pub const RECONCILE_TARGET: &str = "mediahub::reconcile";

/// A registered undo action.
struct Compensation<'a> {
    step: &'static str,
    undo: BoxFuture<'a, AppResult<()>>,
}

/// One running lifecycle operation.
pub struct Saga<'a> {
    name: &'static str,
    owner_id: OwnerId,
    folder_id: Option<FolderId>,
    compensations: Vec<Compensation<'a>>,
    pivoted: bool,
}

impl std::fmt::Debug for Saga<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saga")
            .field("name", &self.name)
            .field("owner_id", &self.owner_id)
            .field("folder_id", &self.folder_id)
            .field("compensations", &self.compensations.len())
            .field("pivoted", &self.pivoted)
            .finish()
    }
}

impl<'a> Saga<'a> {
    /// Start a saga acting for `owner_id`.
    pub fn new(name: &'static str, owner_id: OwnerId) -> Self {
        Self {
            name,
            owner_id,
            folder_id: None,
            compensations: Vec::new(),
            pivoted: false,
        }
    }

    /// Attach the folder id to every subsequent log line.
    pub fn set_folder(&mut self, folder_id: FolderId) {
        self.folder_id = Some(folder_id);
    }

    /// Whether the pivot step has completed.
    pub fn is_pivoted(&self) -> bool {
        self.pivoted
    }

    /// Run a reversible step. On success `undo` is called with the result
    /// to build the compensation, which only runs if a later step up to
    /// and including the pivot fails.
    pub async fn compensable<T, F, U>(&mut self, step: &'static str, action: F, undo: U) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
        U: FnOnce(&T) -> BoxFuture<'a, AppResult<()>>,
    {
        debug_assert!(!self.pivoted, "compensable step after pivot");
        self.trace_step(step);

        match action.await {
            Ok(value) => {
                self.compensations.push(Compensation {
                    step,
                    undo: undo(&value),
                });
                Ok(value)
            }
            Err(err) => self.abort(step, err).await,
        }
    }

    /// Run the irreversible step. Its failure still compensates the
    /// earlier steps.
    pub async fn pivot<T, F>(&mut self, step: &'static str, action: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.trace_step(step);

        match action.await {
            Ok(value) => {
                self.pivoted = true;
                Ok(value)
            }
            Err(err) => self.abort(step, err).await,
        }
    }

    /// Run a step after the pivot. Nothing is compensated on failure.
    pub async fn post_pivot<T, F>(&mut self, step: &'static str, action: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.trace_step(step);

        action.await.map_err(|err| {
            error!(
                target: RECONCILE_TARGET,
                saga = self.name,
                step,
                owner_id = %self.owner_id,
                folder_id = ?self.folder_id,
                error = %err.detailed(),
                "Catalog diverged from media server after remote side effect"
            );
            err
        })
    }

    fn trace_step(&self, step: &'static str) {
        debug!(
            saga = self.name,
            step,
            owner_id = %self.owner_id,
            folder_id = ?self.folder_id,
            "Saga step"
        );
    }

    async fn abort<T>(&mut self, step: &'static str, err: AppError) -> AppResult<T> {
        warn!(
            saga = self.name,
            step,
            owner_id = %self.owner_id,
            folder_id = ?self.folder_id,
            compensations = self.compensations.len(),
            error = %err,
            "Saga step failed"
        );
        self.compensate().await;
        Err(err)
    }

    async fn compensate(&mut self) {
        while let Some(Compensation { step, undo }) = self.compensations.pop() {
            match undo.await {
                Ok(()) => info!(
                    saga = self.name,
                    step,
                    owner_id = %self.owner_id,
                    folder_id = ?self.folder_id,
                    "Compensated saga step"
                ),
                Err(err) => error!(
                    target: RECONCILE_TARGET,
                    saga = self.name,
                    step,
                    owner_id = %self.owner_id,
                    folder_id = ?self.folder_id,
                    error = %err.detailed(),
                    "Compensation failed"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use futures::FutureExt;
    use mediahub_core::error::ErrorKind;
    use tracing::Level;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records the target and level of every event.
    #[derive(Clone, Default)]
    struct EventLog(Arc<Mutex<Vec<(String, Level)>>>);

    impl<S: tracing::Subscriber> Layer<S> for EventLog {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            self.0
                .lock()
                .unwrap()
                .push((meta.target().to_string(), *meta.level()));
        }
    }

    impl EventLog {
        fn reconcile_errors(&self) -> usize {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(target, level)| target == RECONCILE_TARGET && *level == Level::ERROR)
                .count()
        }
    }

    fn undo(log: &Log, name: &'static str) -> BoxFuture<'static, AppResult<()>> {
        let log = Arc::clone(log);
        async move {
            log.lock().unwrap().push(format!("undo {name}"));
            Ok(())
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_pivot_failure_compensates_in_reverse() {
        let log: Log = Arc::default();
        let mut saga = Saga::new("test", OwnerId::new());

        saga.compensable("a", async { Ok(1) }, |_| undo(&log, "a"))
            .await
            .unwrap();
        saga.compensable("b", async { Ok(2) }, |_| undo(&log, "b"))
            .await
            .unwrap();
        let err = saga
            .pivot("remote", async { Err::<(), _>(AppError::remote_execution("down")) })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::RemoteExecution);
        assert!(!saga.is_pivoted());
        assert_eq!(*log.lock().unwrap(), vec!["undo b", "undo a"]);
    }

    #[tokio::test]
    async fn test_compensable_failure_undoes_only_earlier_steps() {
        let log: Log = Arc::default();
        let mut saga = Saga::new("test", OwnerId::new());

        saga.compensable("a", async { Ok(()) }, |_| undo(&log, "a"))
            .await
            .unwrap();
        let result = saga
            .compensable(
                "b",
                async { Err::<(), _>(AppError::database("insert failed")) },
                |_| undo(&log, "b"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["undo a"]);
    }

    #[tokio::test]
    async fn test_post_pivot_failure_is_not_compensated() {
        let log: Log = Arc::default();
        let mut saga = Saga::new("test", OwnerId::new());
        saga.set_folder(FolderId::new());

        saga.compensable("a", async { Ok(()) }, |_| undo(&log, "a"))
            .await
            .unwrap();
        saga.pivot("remote", async { Ok(()) }).await.unwrap();
        assert!(saga.is_pivoted());

        let err = saga
            .post_pivot("record", async { Err::<(), _>(AppError::database("gone")) })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Database);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_compensation_keeps_original_error() {
        let mut saga = Saga::new("test", OwnerId::new());

        saga.compensable("a", async { Ok(()) }, |_| {
            async { Err(AppError::database("undo failed")) }.boxed()
        })
        .await
        .unwrap();
        let err = saga
            .pivot("remote", async { Err::<(), _>(AppError::remote_execution("down")) })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::RemoteExecution);
    }

    #[tokio::test]
    async fn test_post_pivot_failure_is_logged_for_reconciliation() {
        let events = EventLog::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));
        let mut saga = Saga::new("test", OwnerId::new());

        saga.pivot("remote", async { Ok(()) }).await.unwrap();
        assert_eq!(events.reconcile_errors(), 0);

        saga.post_pivot("record", async { Err::<(), _>(AppError::database("gone")) })
            .await
            .unwrap_err();
        assert_eq!(events.reconcile_errors(), 1);
    }

    #[tokio::test]
    async fn test_failed_compensation_is_logged_for_reconciliation() {
        let events = EventLog::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));
        let log: Log = Arc::default();
        let mut saga = Saga::new("test", OwnerId::new());

        saga.compensable("a", async { Ok(()) }, |_| undo(&log, "a"))
            .await
            .unwrap();
        saga.compensable("b", async { Ok(()) }, |_| {
            async { Err(AppError::database("undo failed")) }.boxed()
        })
        .await
        .unwrap();
        saga.pivot("remote", async { Err::<(), _>(AppError::remote_execution("down")) })
            .await
            .unwrap_err();

        // Only the failed undo is a divergence; the pivot failure and the
        // successful undo are ordinary events.
        assert_eq!(events.reconcile_errors(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["undo a"]);
    }
}
