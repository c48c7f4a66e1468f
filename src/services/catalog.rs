use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{CatalogEntry, EntryFields, SearchField, SearchRequest, ValidFields},
};

/// Cap on the full catalog listing
pub const LIST_ALL_LIMIT: usize = 10_000;
/// Size of the landing-page listing
pub const LIST_LIMITED_LIMIT: usize = 50;
/// Cap on search results
pub const SEARCH_LIMIT: usize = 100;

/// Parses a path identifier
pub fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidInput(format!("Malformed record id {:?}", raw)))
}

/// Splits a query into distinct lowercase terms
pub fn search_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.split_whitespace().map(str::to_lowercase) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

fn validate(fields: EntryFields) -> AppResult<ValidFields> {
    fields.validate().map_err(AppError::InvalidInput)
}

/// Plain catalog operations: listing, search and record CRUD
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> AppResult<Vec<CatalogEntry>> {
        self.store.list(LIST_ALL_LIMIT).await
    }

    pub async fn list_limited(&self) -> AppResult<Vec<CatalogEntry>> {
        self.store.list_unsorted(LIST_LIMITED_LIMIT).await
    }

    pub async fn search(&self, request: SearchRequest) -> AppResult<Vec<CatalogEntry>> {
        let field: SearchField = request
            .search_field
            .parse()
            .map_err(AppError::InvalidInput)?;
        let terms = search_terms(&request.query_text);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.store.search(field, &terms, SEARCH_LIMIT).await?;
        tracing::info!(
            field = %field,
            terms = terms.len(),
            results = results.len(),
            "Catalog search"
        );
        Ok(results)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<CatalogEntry> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))
    }

    pub async fn create(&self, fields: EntryFields) -> AppResult<CatalogEntry> {
        let entry = self.store.insert(validate(fields)?).await?;
        tracing::info!(id = %entry.id, composer = %entry.composer, "Record created");
        Ok(entry)
    }

    pub async fn update(&self, id: Uuid, fields: EntryFields) -> AppResult<CatalogEntry> {
        let entry = self
            .store
            .replace(id, validate(fields)?)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))?;
        tracing::info!(id = %id, "Record updated");
        Ok(entry)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Record {} not found", id)));
        }
        tracing::info!(id = %id, "Record deleted");
        Ok(())
    }
}
