//! Cache Config

use std::path::PathBuf;

use clap::Args;

/// Local cache settings.
#[derive(Debug, Args)]
pub(crate) struct CacheConfig {
    /// Path of the cached client envelope
    #[arg(long, env = "ATRIUM_CACHE_PATH", default_value = ".atrium/cache.json")]
    pub cache_path: PathBuf,
}
