//! Memory pool configuration.

/// Bounds on the pool's interning caches.
///
/// ```text
/// let pool = MemoryPool::with_config(
///     PoolConfig::default().cache_capacity(500).text_cache_max_units(32),
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum entries per interning cache. Lookups still hit once a cache
    /// is full; new values are simply not remembered.
    pub cache_capacity: usize,
    /// Integers with `|n| <= integer_cache_magnitude` are interned.
    pub integer_cache_magnitude: u64,
    /// Texts of at most this many code units are interned.
    pub text_cache_max_units: usize,
    pub heading_cache_max_attrs: usize,
    /// Longest attribute name, in UTF-16 code units, of an interned heading.
    pub heading_cache_max_name_units: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            cache_capacity: 10_000,
            integer_cache_magnitude: 1_000_000,
            text_cache_max_units: 200,
            heading_cache_max_attrs: 3,
            heading_cache_max_name_units: 200,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn cache_capacity(mut self, entries: usize) -> Self {
        self.cache_capacity = entries;
        self
    }

    #[must_use]
    pub fn integer_cache_magnitude(mut self, magnitude: u64) -> Self {
        self.integer_cache_magnitude = magnitude;
        self
    }

    #[must_use]
    pub fn text_cache_max_units(mut self, units: usize) -> Self {
        self.text_cache_max_units = units;
        self
    }

    #[must_use]
    pub fn heading_cache_max_attrs(mut self, attrs: usize) -> Self {
        self.heading_cache_max_attrs = attrs;
        self
    }

    #[must_use]
    pub fn heading_cache_max_name_units(mut self, units: usize) -> Self {
        self.heading_cache_max_name_units = units;
        self
    }
}
