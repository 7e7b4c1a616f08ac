pub mod soft_cache;
pub mod value_cache;

pub use soft_cache::AssetSoftCache;
pub use value_cache::{CacheKey, FetchToken, ValueCache};
