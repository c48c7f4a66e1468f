use std::sync::Arc;

use rand::{seq::SliceRandom, Rng};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{CatalogEntry, RecommendationSet},
    services::similarity::{relevance, same_work, Proximity},
};

/// Entries sampled from the source's composer
pub const COMPOSER_SAMPLE_SIZE: usize = 3;
/// Longest period/duration recommendation list
pub const PERIOD_RESULT_LIMIT: usize = 5;

/// Generates "you may also like" lists for a catalog entry
///
/// Three independent strategies, each resolving the source entry first:
/// - composer: a random sample of other recordings by the same composer
/// - period: same period, ranked by title similarity and duration proximity
/// - disc: every other track pressed on the same disc
///
/// The engine is stateless; each call issues its own read-only store queries.
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn CatalogStore>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    async fn resolve(&self, id: Uuid) -> AppResult<CatalogEntry> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))
    }

    /// The source entry itself, as a one-element list
    #[instrument(skip(self))]
    pub async fn source(&self, id: Uuid) -> AppResult<Vec<CatalogEntry>> {
        Ok(vec![self.resolve(id).await?])
    }

    /// Up to three random recordings by the source's composer
    #[instrument(skip(self))]
    pub async fn by_composer(&self, id: Uuid) -> AppResult<Vec<CatalogEntry>> {
        let source = self.resolve(id).await?;
        self.composer_for(&source).await
    }

    /// Up to five same-period entries, most relevant first
    #[instrument(skip(self))]
    pub async fn by_period(&self, id: Uuid) -> AppResult<Vec<CatalogEntry>> {
        let source = self.resolve(id).await?;
        self.period_for(&source).await
    }

    /// All other entries on the source's disc
    #[instrument(skip(self))]
    pub async fn by_disc(&self, id: Uuid) -> AppResult<Vec<CatalogEntry>> {
        let source = self.resolve(id).await?;
        self.disc_for(&source).await
    }

    /// Runs all three strategies against one source entry
    ///
    /// A source lacking both period and duration contributes an empty period
    /// list instead of failing the whole set.
    #[instrument(skip(self))]
    pub async fn blend(&self, id: Uuid) -> AppResult<RecommendationSet> {
        let source = self.resolve(id).await?;

        let period = async {
            if has_period_signal(&source) {
                self.period_for(&source).await
            } else {
                Ok(Vec::new())
            }
        };

        let (composer, period, disc) = tokio::try_join!(
            self.composer_for(&source),
            period,
            self.disc_for(&source),
        )?;

        Ok(RecommendationSet {
            composer,
            period,
            disc,
        })
    }

    async fn composer_for(&self, source: &CatalogEntry) -> AppResult<Vec<CatalogEntry>> {
        let matches = self
            .store
            .find_by_composer(&source.composer, source.id)
            .await?;
        let match_count = matches.len();

        let sample = sample_entries(matches, COMPOSER_SAMPLE_SIZE, &mut rand::thread_rng());

        tracing::debug!(
            id = %source.id,
            composer = %source.composer,
            match_count,
            sampled = sample.len(),
            "Composer recommendations"
        );

        Ok(sample)
    }

    async fn period_for(&self, source: &CatalogEntry) -> AppResult<Vec<CatalogEntry>> {
        if !has_period_signal(source) {
            return Err(AppError::NotFound(format!(
                "Record {} has neither period nor duration",
                source.id
            )));
        }

        let candidates = self.store.find_by_period(source.period, source.id).await?;
        let candidate_count = candidates.len();
        let ranked = rank_by_period(source, candidates);

        tracing::debug!(
            id = %source.id,
            period = ?source.period,
            candidate_count,
            returned = ranked.len(),
            "Period recommendations"
        );

        Ok(ranked)
    }

    async fn disc_for(&self, source: &CatalogEntry) -> AppResult<Vec<CatalogEntry>> {
        let mates = self
            .store
            .find_by_disc(&source.label, &source.number, source.id)
            .await?;

        tracing::debug!(
            id = %source.id,
            label = %source.label,
            number = %source.number,
            count = mates.len(),
            "Disc recommendations"
        );

        Ok(mates)
    }
}

/// Whether a period/duration search has anything to go on
fn has_period_signal(source: &CatalogEntry) -> bool {
    source.period.is_some() || source.minutes().is_some()
}

/// Uniform sample of at most `size` entries, without replacement
pub fn sample_entries<R: Rng + ?Sized>(
    entries: Vec<CatalogEntry>,
    size: usize,
    rng: &mut R,
) -> Vec<CatalogEntry> {
    if entries.len() <= size {
        return entries;
    }
    entries.choose_multiple(rng, size).cloned().collect()
}

/// Scores period candidates against `source`, drops self and same-work
/// pressings, and keeps the best `PERIOD_RESULT_LIMIT`
///
/// Equal scores keep the store order.
pub fn rank_by_period(source: &CatalogEntry, candidates: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let window = Proximity::around(source.minutes());

    let mut scored: Vec<(f64, CatalogEntry)> = candidates
        .into_iter()
        .filter(|c| c.id != source.id && !same_work(&c.work, &source.work))
        .map(|c| (relevance(&source.work, &window, &c), c))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(PERIOD_RESULT_LIMIT);
    scored.into_iter().map(|(_, c)| c).collect()
}
