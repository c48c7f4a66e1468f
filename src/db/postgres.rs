use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{CatalogEntry, SearchField, ValidFields},
};

const ENTRY_COLUMNS: &str =
    "id, label, format, number, period, composer, work, performers, duration, created_at, updated_at";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Row shape of `catalog_entries`
#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    label: String,
    format: String,
    number: String,
    period: Option<i16>,
    composer: String,
    work: String,
    performers: String,
    duration: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EntryRow> for CatalogEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            label: row.label,
            format: row.format,
            number: row.number,
            period: row.period.and_then(|p| u8::try_from(p).ok()),
            composer: row.composer,
            work: row.work,
            performers: row.performers,
            time: row.duration,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SQL expression a search over `field` matches against
fn search_expression(field: SearchField) -> &'static str {
    match field {
        SearchField::All => {
            "concat_ws(' ', label, format, number, composer, work, performers)"
        }
        SearchField::Label => "label",
        SearchField::Format => "format",
        SearchField::Number => "number",
        SearchField::Composer => "composer",
        SearchField::Work => "work",
        SearchField::Performers => "performers",
    }
}

/// Ranked search over `field`: `$1` is the pattern array, `$2` the limit
///
/// Ties on the match count fall back to composer then work in byte order,
/// matching the in-memory store.
fn search_sql(field: SearchField) -> String {
    format!(
        "SELECT {columns} FROM catalog_entries \
         WHERE {expr} ILIKE ANY($1) \
         ORDER BY (SELECT COUNT(*) FROM unnest($1::text[]) AS p WHERE {expr} ILIKE p) DESC, \
         composer COLLATE \"C\", work COLLATE \"C\" \
         LIMIT $2",
        columns = ENTRY_COLUMNS,
        expr = search_expression(field),
    )
}

/// Turns a search term into an `ILIKE` substring pattern
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Catalog store backed by the `catalog_entries` table
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Catalog schema migrations applied");
        Ok(())
    }

    fn limit(limit: usize) -> i64 {
        i64::try_from(limit).unwrap_or(i64::MAX)
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<CatalogEntry>> {
        let sql = format!("SELECT {} FROM catalog_entries WHERE id = $1", ENTRY_COLUMNS);
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogEntry::from))
    }

    async fn list(&self, limit: usize) -> AppResult<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM catalog_entries \
             ORDER BY period ASC NULLS FIRST, composer, work, performers, duration NULLS FIRST \
             LIMIT $1",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(Self::limit(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn list_unsorted(&self, limit: usize) -> AppResult<Vec<CatalogEntry>> {
        let sql = format!("SELECT {} FROM catalog_entries LIMIT $1", ENTRY_COLUMNS);
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(Self::limit(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn find_by_composer(
        &self,
        composer: &str,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM catalog_entries WHERE composer = $1 AND id <> $2",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(composer)
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn find_by_period(
        &self,
        period: Option<u8>,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM catalog_entries \
             WHERE period IS NOT DISTINCT FROM $1 AND id <> $2",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(period.map(i16::from))
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn find_by_disc(
        &self,
        label: &str,
        number: &str,
        exclude: Uuid,
    ) -> AppResult<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM catalog_entries WHERE label = $1 AND number = $2 AND id <> $3",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(label)
            .bind(number)
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn search(
        &self,
        field: SearchField,
        terms: &[String],
        limit: usize,
    ) -> AppResult<Vec<CatalogEntry>> {
        let patterns: Vec<String> = terms.iter().map(|t| like_pattern(t)).collect();
        let sql = search_sql(field);
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(&patterns)
            .bind(Self::limit(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn insert(&self, fields: ValidFields) -> AppResult<CatalogEntry> {
        let entry = CatalogEntry::new(Uuid::new_v4(), fields);
        let sql = format!(
            "INSERT INTO catalog_entries ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            ENTRY_COLUMNS, ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(entry.id)
            .bind(&entry.label)
            .bind(&entry.format)
            .bind(&entry.number)
            .bind(entry.period.map(i16::from))
            .bind(&entry.composer)
            .bind(&entry.work)
            .bind(&entry.performers)
            .bind(&entry.time)
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn replace(&self, id: Uuid, fields: ValidFields) -> AppResult<Option<CatalogEntry>> {
        let period = fields.period().map(i16::from);
        let f = fields.fields();
        let sql = format!(
            "UPDATE catalog_entries SET \
             label = $2, format = $3, number = $4, period = $5, composer = $6, \
             work = $7, performers = $8, duration = $9, updated_at = now() \
             WHERE id = $1 \
             RETURNING {}",
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(id)
            .bind(&f.label)
            .bind(&f.format)
            .bind(&f.number)
            .bind(period)
            .bind(&f.composer)
            .bind(&f.work)
            .bind(&f.performers)
            .bind(&f.time)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogEntry::from))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM catalog_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Op. 98"), "%Op. 98%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_search_expression_all_covers_text_fields() {
        let expr = search_expression(SearchField::All);
        for field in SearchField::TEXT_FIELDS {
            assert!(expr.contains(search_expression(field)));
        }
    }

    #[test]
    fn test_search_sql_breaks_ties_by_composer_then_work() {
        let sql = search_sql(SearchField::Composer);
        assert!(sql.contains("WHERE composer ILIKE ANY($1)"));
        assert!(sql.contains("DESC, composer COLLATE \"C\", work COLLATE \"C\" LIMIT $2"));
    }

    #[test]
    fn test_row_with_out_of_range_period_has_none() {
        let now = Utc::now();
        let row = EntryRow {
            id: Uuid::new_v4(),
            label: "DG".to_string(),
            format: "CD".to_string(),
            number: "447 4042".to_string(),
            period: Some(-1),
            composer: "Brahms".to_string(),
            work: "Symphony No. 4".to_string(),
            performers: "Kleiber, Wiener Philharmoniker".to_string(),
            duration: Some("39".to_string()),
            created_at: now,
            updated_at: now,
        };
        let entry = CatalogEntry::from(row);
        assert_eq!(entry.period, None);
        assert_eq!(entry.time.as_deref(), Some("39"));
    }
}
