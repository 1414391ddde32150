use crate::models::{saving::now_millis, Saving, SavingChanges};
use crate::services::filter::SavingFilter;
use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;

/// Persistence for savings entries.
#[async_trait]
pub trait SavingsStore: Send + Sync {
    /// Entries matching `filter`, oldest `date` first.
    async fn list(&self, filter: SavingFilter) -> Result<Vec<Saving>, AppError>;
    async fn insert(&self, saving: Saving) -> Result<Saving, AppError>;
    /// Returns the updated entry, or `None` if `id` does not exist.
    async fn update(&self, id: &str, changes: SavingChanges) -> Result<Option<Saving>, AppError>;
    /// Returns whether an entry was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Process-local store for tests and database-less local runs.
#[derive(Default)]
pub struct InMemorySavingsStore {
    savings: RwLock<Vec<Saving>>,
}

impl InMemorySavingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavingsStore for InMemorySavingsStore {
    async fn list(&self, filter: SavingFilter) -> Result<Vec<Saving>, AppError> {
        let savings = self.savings.read().await;
        let mut matching: Vec<Saving> = savings
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(matching)
    }

    async fn insert(&self, saving: Saving) -> Result<Saving, AppError> {
        let mut savings = self.savings.write().await;
        if savings.iter().any(|s| s.id == saving.id) {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "duplicate saving id {}",
                saving.id
            )));
        }
        savings.push(saving.clone());
        Ok(saving)
    }

    async fn update(&self, id: &str, changes: SavingChanges) -> Result<Option<Saving>, AppError> {
        let mut savings = self.savings.write().await;
        Ok(savings.iter_mut().find(|s| s.id == id).map(|saving| {
            saving.apply(&changes, now_millis());
            saving.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut savings = self.savings.write().await;
        let before = savings.len();
        savings.retain(|s| s.id != id);
        Ok(savings.len() != before)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
