use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{CatalogEntry, SearchField, ValidFields},
};

/// Process-local catalog store
///
/// Entries keep insertion order, which is the "store order" of this backend.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    entries: RwLock<Vec<CatalogEntry>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`, ids included
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<CatalogEntry>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

/// Number of `terms` found in the searched field(s) of `entry`
fn matching_terms(entry: &CatalogEntry, field: SearchField, terms: &[String]) -> usize {
    let haystack: Vec<String> = field
        .values(entry)
        .into_iter()
        .map(str::to_lowercase)
        .collect();

    terms
        .iter()
        .filter(|term| haystack.iter().any(|value| value.contains(term.as_str())))
        .count()
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<CatalogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self, limit: usize) -> AppResult<Vec<CatalogEntry>> {
        let mut entries = self.entries.read().await.clone();
        entries.sort_by(|a, b| {
            (a.period, &a.composer, &a.work, &a.performers, &a.time).cmp(&(
                b.period,
                &b.composer,
                &b.work,
                &b.performers,
                &b.time,
            ))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    async fn list_unsorted(&self, limit: usize) -> AppResult<Vec<CatalogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().take(limit).cloned().collect())
    }

    async fn find_by_composer(
        &self,
        composer: &str,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>> {
        Ok(self
            .filtered(|e| e.id != exclude && e.composer == composer)
            .await)
    }

    async fn find_by_period(
        &self,
        period: Option<u8>,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>> {
        Ok(self
            .filtered(|e| e.id != exclude && e.period == period)
            .await)
    }

    async fn find_by_disc(
        &self,
        label: &str,
        number: &str,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>> {
        Ok(self
            .filtered(|e| e.id != exclude && e.label == label && e.number == number)
            .await)
    }

    async fn search(
        &self,
        field: SearchField,
        terms: &[String],
        limit: usize,
    ) -> AppResult<Vec<CatalogEntry>> {
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let entries = self.entries.read().await;

        let mut scored: Vec<(usize, &CatalogEntry)> = entries
            .iter()
            .map(|e| (matching_terms(e, field, &terms), e))
            .filter(|(hits, _)| *hits > 0)
            .collect();
        scored.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| a.1.composer.cmp(&b.1.composer))
                .then_with(|| a.1.work.cmp(&b.1.work))
        });

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn insert(&self, fields: ValidFields) -> AppResult<CatalogEntry> {
        let entry = CatalogEntry::new(Uuid::new_v4(), fields);
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn replace(&self, id: Uuid, fields: ValidFields) -> AppResult<Option<CatalogEntry>> {
        let mut entries = self.entries.write().await;
        Ok(entries.iter_mut().find(|e| e.id == id).map(|entry| {
            entry.replace_fields(fields);
            entry.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < before)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
