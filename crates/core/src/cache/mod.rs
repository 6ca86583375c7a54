mod error;
mod keys;
mod outcome;
mod serialization;
mod stats;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    all_collection_keys, article_search_key, collection_key, entity_key, natural_key,
    natural_keys_of, normalize_query,
};
pub use outcome::CacheWrite;
pub use serialization::{deserialize, serialize, SerializationError};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use traits::Cache;
