use std::future::Future;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::time::Instant;

pub mod users;

pub use users::{NewUser, PgUserStore, User, UserStore};

/// Entity stores, each exposed through the narrowest trait its callers need.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
}

impl Storage {
    pub fn new(db: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(db)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Runs a store operation under `deadline`. An already expired deadline never
/// polls `op`, so nothing reaches the database.
pub async fn with_deadline<T, F>(deadline: Instant, op: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    if Instant::now() >= deadline {
        return Err(StoreError::DeadlineExceeded);
    }
    match tokio::time::timeout_at(deadline, op).await {
        Ok(res) => res.map_err(StoreError::Database),
        Err(_) => Err(StoreError::DeadlineExceeded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn expired_deadline_never_polls_the_operation() {
        let polled = AtomicBool::new(false);
        let op = async {
            polled.store(true, Ordering::SeqCst);
            Ok::<_, sqlx::Error>(())
        };
        let res = with_deadline(Instant::now() - Duration::from_millis(1), op).await;
        assert!(matches!(res, Err(StoreError::DeadlineExceeded)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn slow_operation_is_cut_off() {
        let op = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, sqlx::Error>(1)
        };
        let res = with_deadline(Instant::now() + Duration::from_millis(20), op).await;
        assert!(matches!(res, Err(StoreError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn driver_errors_pass_through_untouched() {
        let op = async { Err::<(), _>(sqlx::Error::PoolTimedOut) };
        let err = with_deadline(Instant::now() + Duration::from_secs(1), op)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolTimedOut)));
        assert_eq!(err.to_string(), sqlx::Error::PoolTimedOut.to_string());
    }

    #[tokio::test]
    async fn result_is_returned_before_deadline() {
        let op = async { Ok::<_, sqlx::Error>(42) };
        let v = with_deadline(Instant::now() + Duration::from_secs(1), op)
            .await
            .expect("completes in time");
        assert_eq!(v, 42);
    }
}
