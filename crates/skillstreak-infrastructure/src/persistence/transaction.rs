use async_trait::async_trait;
use skillstreak_domain::shared::transaction::{TransactionContext, UnitOfWork, UnitOfWorkError};
use sqlx::{Pool, Sqlite, SqliteConnection, Transaction as SqlxTransaction};
use std::sync::Arc;

use super::error_mapper::is_busy;

/// Sqlite implementation of TransactionContext
pub struct SqliteTransactionContext {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteTransactionContext {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Connection bound to the open transaction, for repository queries
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }
}

#[async_trait]
impl TransactionContext for SqliteTransactionContext {
    type Error = sqlx::Error;

    async fn commit(self: Box<Self>) -> Result<(), Self::Error> {
        let this = *self;
        this.tx.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), Self::Error> {
        let this = *self;
        this.tx.rollback().await
    }
}

/// Sqlite implementation of Unit of Work
pub struct SqliteUnitOfWork {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteUnitOfWork {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    type Transaction = SqliteTransactionContext;

    async fn begin(&self) -> Result<Box<Self::Transaction>, UnitOfWorkError> {
        let tx = self.pool.begin().await.map_err(|e| {
            if is_busy(&e) {
                UnitOfWorkError::Conflict(e.to_string())
            } else {
                UnitOfWorkError::TransactionFailed(e.to_string())
            }
        })?;

        Ok(Box::new(SqliteTransactionContext::new(tx)))
    }
}
