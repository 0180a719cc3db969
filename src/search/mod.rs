//! Catalog search engine.
//!
//! The backing store only supports equality lookups, ordered prefix range
//! scans on the name index and bounded scans, so free-text and dimension
//! matching runs as a cascade of fallback strategies:
//! - `normalize`: canonical text form shared by matching and cache keys
//! - `dimensions`: "1x4x4"-style queries parsed into 2/3-value tuples
//! - `anchors`: casing/spacing prefix variants for the case-sensitive index
//! - `engine`: strategy cascade and concurrent fan-out orchestration
//! - `matching`: final in-memory predicate plus dedup
//! - `cache`: bounded TTL response cache

pub mod anchors;
pub mod cache;
pub mod dimensions;
pub mod engine;
pub mod matching;
pub mod normalize;

pub use cache::{Clock, ResultCache, SystemClock};
pub use dimensions::{parse_dimensions, DimensionTuple};
pub use engine::{
    clamp_limit, CatalogSearch, SearchError, SearchTuning, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};
pub use matching::MatchContext;
pub use normalize::normalize;
