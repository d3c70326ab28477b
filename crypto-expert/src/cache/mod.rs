mod store;

pub use store::{CacheStore, DEFAULT_SEARCH_LIMIT, DEFAULT_SOURCE, SIMILARITY_THRESHOLD};
