//! Configuration for celldiff
//!
//! Typed defaults for the cache, input watcher, and UI. Nothing here is
//! read from disk; callers construct a config and hand sections to the
//! component constructors.

use serde::{Deserialize, Serialize};

/// Global configuration for celldiff
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellDiffConfig {
    /// Input watcher configuration
    pub watcher: WatcherConfig,
    /// Caching configuration
    pub cache: CacheConfig,
    /// UI configuration
    pub ui: UiConfig,
}

/// Configuration for input-file watching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Debounce duration for file events in milliseconds
    pub event_debounce_ms: u64,
}

/// Configuration for the rendered-diff cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached renderings
    pub diff_cache_size: usize,
}

/// Configuration for the terminal user interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How often the run loop polls for watcher and key events, in ms
    pub tick_rate_ms: u64,
    /// Lines moved by PageUp/PageDown
    pub scroll_page: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            event_debounce_ms: 100,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            diff_cache_size: 64,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            scroll_page: 10,
        }
    }
}
