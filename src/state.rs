use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;
use tokio::task::JoinError;

use crate::auth::IdentityProvider;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::BookingEvent;
use crate::services::notify::Notifier;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub identity: Box<dyn IdentityProvider>,
    pub notifier: Box<dyn Notifier>,
    pub events_tx: broadcast::Sender<BookingEvent>,
}

const RUNNING: u8 = 0;
const COMMITTING: u8 = 1;
const ABANDONED: u8 = 2;

impl AppState {
    /// Runs a store operation in a transaction on the blocking pool, bounded by
    /// the configured timeout. An operation that times out is rolled back and
    /// never commits; one that already began committing is awaited instead.
    pub async fn with_db<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, AppError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let claim = Arc::new(AtomicU8::new(RUNNING));
        let task_claim = Arc::clone(&claim);
        let mut task = tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))?;
            if task_claim.load(Ordering::SeqCst) == ABANDONED {
                return Err(abandoned());
            }
            let tx = conn.unchecked_transaction()?;
            let value = op(&tx)?;
            if task_claim
                .compare_exchange(RUNNING, COMMITTING, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                // dropping tx rolls back
                return Err(abandoned());
            }
            tx.commit()?;
            Ok(value)
        });

        match tokio::time::timeout(self.config.store_timeout, &mut task).await {
            Ok(joined) => flatten(joined),
            Err(_) => {
                if claim
                    .compare_exchange(RUNNING, ABANDONED, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    tracing::warn!(timeout = ?self.config.store_timeout, "store operation timed out");
                    Err(AppError::Dependency("store operation timed out".to_string()))
                } else {
                    flatten(task.await)
                }
            }
        }
    }
}

fn abandoned() -> AppError {
    AppError::Dependency("store operation abandoned after timeout".to_string())
}

fn flatten<T>(joined: Result<Result<T, AppError>, JoinError>) -> Result<T, AppError> {
    match joined {
        Ok(result) => result,
        Err(join_err) => Err(AppError::Internal(anyhow::anyhow!(
            "store task failed: {join_err}"
        ))),
    }
}
