//! Raw history retrieval and daily normalization.

pub mod normalize;
pub mod store;

pub use normalize::{normalize, normalize_series};
pub use store::RawHistoryStore;
