//! Movie domain: records, normalization, upsert and similarity search

pub mod normalize;
pub mod record;
pub mod similarity;
pub mod upsert;

pub use normalize::MovieNormalizer;
pub use record::{CanonicalMovie, RawMovie};
pub use similarity::{SimilarMovie, SimilarityQueryService, MAX_RESULTS, SCORE_TOLERANCE};
pub use upsert::MovieUpsertService;
