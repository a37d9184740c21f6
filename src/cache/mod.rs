pub mod resolution;
mod store;

pub use resolution::{CACHE_FILE, CacheSummary, MatchFootprint, ResolutionCache};
pub use store::DataStore;
