use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CatalogEntry, SearchField, ValidFields},
};

/// Document store holding the catalog
///
/// Every lookup is read-only and independent; implementations must be safe to
/// call from concurrent requests. Failures to reach the backing store surface
/// as `AppError::StoreUnavailable` and are never retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Point lookup by id
    async fn get(&self, id: Uuid) -> AppResult<Option<CatalogEntry>>;

    /// Up to `limit` entries ordered by period, composer, work, performers, time
    async fn list(&self, limit: usize) -> AppResult<Vec<CatalogEntry>>;

    /// Up to `limit` entries in store order
    async fn list_unsorted(&self, limit: usize) -> AppResult<Vec<CatalogEntry>>;

    /// Entries by `composer`, except `exclude`
    async fn find_by_composer(&self, composer: &str, exclude: Uuid)
        -> AppResult<Vec<CatalogEntry>>;

    /// Entries whose period equals `period` (absent matches absent), except `exclude`
    async fn find_by_period(
        &self,
        period: Option<u8>,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>>;

    /// Entries sharing both `label` and `number`, except `exclude`, in store order
    async fn find_by_disc(
        &self,
        label: &str,
        number: &str,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>>;

    /// Case-insensitive term search, most matching terms first
    async fn search(
        &self,
        field: SearchField,
        terms: &[String],
        limit: usize,
    ) -> AppResult<Vec<CatalogEntry>>;

    /// Stores a new entry under a freshly assigned id
    async fn insert(&self, fields: ValidFields) -> AppResult<CatalogEntry>;

    /// Replaces the editable fields of an entry; `None` if it does not exist
    async fn replace(&self, id: Uuid, fields: ValidFields) -> AppResult<Option<CatalogEntry>>;

    /// Removes an entry; `false` if it did not exist
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
