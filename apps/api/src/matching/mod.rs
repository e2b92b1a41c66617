pub mod handlers;
pub mod pg_store;
pub mod service;
pub mod store;
pub mod tag_matcher;

pub use service::{MatchingService, SortSpec};
pub use store::{InMemoryMatchStore, MatchStore};
pub use tag_matcher::{
    compute_match_details, compute_match_score, MatchDetails, MatchError, MatcherConfig,
    TagMatcher, TagSide,
};
