//! Search orchestrator: the strategy cascade over the catalog store.
//!
//! The backing store only answers equality lookups, ordered prefix ranges and
//! bounded scans, so one request fans out over a cascade of increasingly
//! broad strategies: exact dimension lookups first, then name-prefix scans,
//! then bounded category/catalog fetches, and as a last resort a paginated
//! walk of the dimensional category. Each phase runs only while the
//! accumulated unique count is still short of the requested limit; nothing a
//! phase found is ever discarded.
//!
//! Best-effort by contract: a failed sub-query is logged and contributes
//! nothing. Only a fully failed opening phase aborts the request.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use thiserror::Error;

use super::anchors::{anchors, capitalize_first};
use super::cache::{Clock, ResultCache};
use super::dimensions::DimensionTuple;
use super::matching::{filter_and_dedup, MatchContext};
use crate::models::CatalogItem;
use crate::store::{CatalogStore, DimensionField, StoreError};

/// Upper bound for prefix range scans: everything strictly below
/// `prefix + PREFIX_SENTINEL` shares the prefix.
const PREFIX_SENTINEL: char = '\u{f8ff}';

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 500;
pub const DEFAULT_LIMIT: usize = 50;

/// Clamps a requested result limit to `[MIN_LIMIT, MAX_LIMIT]`; a missing
/// limit falls back to [`DEFAULT_LIMIT`].
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT)
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// The opening phase of the cascade could not reach the store at all.
    #[error("catalog store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Engine knobs, injected from configuration at startup.
#[derive(Debug, Clone)]
pub struct SearchTuning {
    /// Category whose items carry height/width/length attributes.
    pub dimensional_category: String,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub scan_batch_size: usize,
    pub max_scan_batches: usize,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            dimensional_category: "Maderas".to_string(),
            cache_ttl: Duration::from_secs(20),
            cache_capacity: 100,
            scan_batch_size: 1000,
            max_scan_batches: 30,
        }
    }
}

type SubQuery = BoxFuture<'static, Result<Vec<CatalogItem>, StoreError>>;

/// Per-request accumulation buffer. Keeps the first occurrence per id so the
/// cascade's discovery order becomes the response order.
struct Accumulator {
    items: Vec<CatalogItem>,
    seen: HashSet<String>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn extend(&mut self, batch: Vec<CatalogItem>) {
        for item in batch {
            if self.seen.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
    }

    fn unique(&self) -> usize {
        self.items.len()
    }
}

struct PhaseOutcome {
    total: usize,
    failures: usize,
    last_error: Option<StoreError>,
}

impl PhaseOutcome {
    fn all_failed(&self) -> bool {
        self.total > 0 && self.failures == self.total
    }
}

/// The catalog search engine. One instance per process, shared across
/// requests; each request gets its own accumulation buffer, the only shared
/// mutable state is the result cache.
pub struct CatalogSearch {
    store: Arc<dyn CatalogStore>,
    cache: ResultCache,
    tuning: SearchTuning,
}

impl CatalogSearch {
    pub fn new(store: Arc<dyn CatalogStore>, tuning: SearchTuning, clock: Arc<dyn Clock>) -> Self {
        let cache = ResultCache::new(tuning.cache_ttl, tuning.cache_capacity, clock);
        Self {
            store,
            cache,
            tuning,
        }
    }

    /// Runs one search request end to end: cache probe, cascade, filter,
    /// cache write. `limit` is assumed pre-clamped (see [`clamp_limit`]).
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let ctx = MatchContext::new(query);
        let cache_key = ctx.normalized().to_string();

        // Fraction queries never read the cache; an earlier partial
        // computation could otherwise serve stale results. Writes still
        // happen below.
        let bypass_cache = query.contains('/');
        if !bypass_cache {
            if let Some(hit) = self.cache.get(&cache_key, limit) {
                tracing::debug!("search cache hit: {:?} (limit {})", cache_key, limit);
                return Ok(hit);
            }
        }

        let mut acc = Accumulator::new();

        if let Some(dims) = ctx.dimensions.clone() {
            self.dimensional_cascade(query, &dims, &ctx, limit, &mut acc)
                .await?;
        } else {
            let outcome = self
                .run_phase("name-scan", self.name_scan_queries(query, limit), &mut acc)
                .await;
            if outcome.all_failed() && acc.unique() == 0 {
                if let Some(error) = outcome.last_error {
                    return Err(SearchError::StoreUnavailable(error));
                }
            }
        }

        let items = filter_and_dedup(acc.items, &ctx, limit);
        self.cache.put(&cache_key, limit, items.clone());
        Ok(items)
    }

    /// The dimensional strategy cascade (§ equality → name scans → category
    /// fetch → catalog fetch → paginated walk). Later phases only run while
    /// the unique candidate count is short of `limit`.
    async fn dimensional_cascade(
        &self,
        query: &str,
        dims: &DimensionTuple,
        ctx: &MatchContext,
        limit: usize,
        acc: &mut Accumulator,
    ) -> Result<(), SearchError> {
        let outcome = self
            .run_phase("equality", self.equality_queries(dims, limit), acc)
            .await;
        if outcome.all_failed() && acc.unique() == 0 {
            if let Some(error) = outcome.last_error {
                return Err(SearchError::StoreUnavailable(error));
            }
        }

        if acc.unique() < limit {
            self.run_phase("name-scan", self.name_scan_queries(query, limit), acc)
                .await;
        }

        let cap = broad_fetch_cap(limit);
        if acc.unique() < limit {
            let store = Arc::clone(&self.store);
            let category = self.tuning.dimensional_category.clone();
            let scan =
                async move { store.scoped_scan(Some(&category), cap).await }.boxed();
            self.run_phase("category-fetch", vec![scan], acc).await;
        }

        if acc.unique() < limit {
            let store = Arc::clone(&self.store);
            let scan = async move { store.scoped_scan(None, cap).await }.boxed();
            self.run_phase("catalog-fetch", vec![scan], acc).await;
        }

        if acc.unique() < limit {
            self.paginated_phase(ctx, limit, acc).await;
        }

        Ok(())
    }

    /// Fan-out/fan-in over one phase's sub-queries. Individual failures are
    /// logged and swallowed; the outcome reports them for the caller's
    /// first-phase check.
    async fn run_phase(
        &self,
        label: &str,
        queries: Vec<SubQuery>,
        acc: &mut Accumulator,
    ) -> PhaseOutcome {
        let total = queries.len();
        let mut failures = 0;
        let mut last_error = None;
        for result in join_all(queries).await {
            match result {
                Ok(batch) => acc.extend(batch),
                Err(error) => {
                    failures += 1;
                    tracing::warn!("search phase {} sub-query failed: {}", label, error);
                    last_error = Some(error);
                }
            }
        }
        tracing::debug!(
            "search phase {}: {} sub-queries, {} failed, {} unique so far",
            label,
            total,
            failures,
            acc.unique()
        );
        PhaseOutcome {
            total,
            failures,
            last_error,
        }
    }

    /// Parallel equality lookups on the dimensional category. 3-value tuples
    /// try the natural height/width/length assignment plus one height/width
    /// swap; 2-value tuples try all three field pairings.
    fn equality_queries(&self, dims: &DimensionTuple, limit: usize) -> Vec<SubQuery> {
        use DimensionField::{Height, Length, Width};
        let d = dims.values();
        let assignments: Vec<Vec<(DimensionField, f64)>> = match d.len() {
            3 => vec![
                vec![(Height, d[0]), (Width, d[1]), (Length, d[2])],
                vec![(Height, d[1]), (Width, d[0]), (Length, d[2])],
            ],
            2 => vec![
                vec![(Height, d[0]), (Width, d[1])],
                vec![(Height, d[0]), (Length, d[1])],
                vec![(Width, d[0]), (Length, d[1])],
            ],
            _ => Vec::new(),
        };

        assignments
            .into_iter()
            .map(|fields| {
                let store = Arc::clone(&self.store);
                let category = self.tuning.dimensional_category.clone();
                async move {
                    store
                        .equality_query(Some(&category), &fields, limit)
                        .await
                }
                .boxed()
            })
            .collect()
    }

    /// One range scan per anchor variant plus coarse scans for the case
    /// variants of the query's first 1-3 characters.
    fn name_scan_queries(&self, query: &str, limit: usize) -> Vec<SubQuery> {
        let per_scan = std::cmp::max(50, limit / 2);
        let mut prefixes = anchors(query);
        for prefix in leading_prefixes(query) {
            if !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }

        prefixes
            .into_iter()
            .map(|prefix| {
                let store = Arc::clone(&self.store);
                async move {
                    let high = format!("{}{}", prefix, PREFIX_SENTINEL);
                    store.range_by_name_prefix(&prefix, &high, per_scan).await
                }
                .boxed()
            })
            .collect()
    }

    /// Last-resort deterministic walk of the dimensional category, ordered by
    /// name. Hard-capped at `max_scan_batches` batches; keeps only items that
    /// already pass the final predicate and stops as soon as `limit` of them
    /// are in hand.
    async fn paginated_phase(&self, ctx: &MatchContext, limit: usize, acc: &mut Accumulator) {
        let mut matched: Vec<CatalogItem> = Vec::new();
        let mut matched_ids: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;

        for _ in 0..self.tuning.max_scan_batches {
            let (batch, next) = match self
                .store
                .paginated_scan(
                    Some(&self.tuning.dimensional_category),
                    cursor.as_deref(),
                    self.tuning.scan_batch_size,
                )
                .await
            {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!("paginated catalog scan failed: {}", error);
                    break;
                }
            };
            cursor = next;

            for item in batch {
                if ctx.matches(&item) && matched_ids.insert(item.id.clone()) {
                    matched.push(item);
                }
            }

            if matched.len() >= limit || cursor.is_none() {
                break;
            }
        }

        acc.extend(matched);
    }
}

/// Bound for the broad category/catalog fetches.
fn broad_fetch_cap(limit: usize) -> usize {
    std::cmp::max(1000, std::cmp::min(5000, limit.saturating_mul(25)))
}

/// Case variants of the query's first 1-3 characters for coarse prefix scans.
fn leading_prefixes(query: &str) -> Vec<String> {
    let chars: Vec<char> = query.chars().collect();
    let mut out = Vec::new();
    for n in 1..=chars.len().min(3) {
        let prefix: String = chars[..n].iter().collect();
        for variant in [
            prefix.to_lowercase(),
            prefix.to_uppercase(),
            capitalize_first(&prefix),
        ] {
            if !out.contains(&variant) {
                out.push(variant);
            }
        }
    }
    out
}
