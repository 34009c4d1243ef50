//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so
//! builds remain quiet. All of them are further gated by `cfg(debug_assertions)`.

pub struct DebugFlags {
    /// Emit per-series fractal counts after each detection pass.
    pub print_fractal_scan: bool,
    /// Emit each cluster as it is closed during aggregation.
    pub print_level_clusters: bool,
    /// Emit level cache hit/miss diagnostics.
    pub print_level_cache_events: bool,
    /// Emit detailed serialization/deserialization logs.
    pub print_serde: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_fractal_scan: false,
    print_level_clusters: false,
    print_level_cache_events: false,
    print_serde: false,
};
