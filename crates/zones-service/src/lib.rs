//! Service layer for the delivery-zone engine: configuration, the
//! pluggable TTL cache, and the thread-safe zone service.

pub mod cache;
pub mod config;
pub mod zones;

pub use cache::{build_cache, CacheError, MemoryCache, SharedCache, ZoneCache};
pub use config::{CacheProvider, Config, ConfigError};
pub use zones::ZoneService;
