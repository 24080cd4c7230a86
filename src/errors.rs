/// Failures that can occur while switching systems.
///
/// None of these cross the pool's public boundary: every variant is logged
/// where it occurs and the switch continues best-effort. The enum exists so
/// the per-surface and per-engine paths report *which* step failed instead
/// of a bare log string.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("unknown system: {0}")]
    UnknownSystem(String),

    #[error("surface element not found: {0}")]
    SurfaceNotFound(String),

    #[error("region container not found: {0}")]
    RegionNotFound(String),

    #[error("no graphics context obtainable for surface {0}")]
    ContextUnavailable(String),

    #[error("context lost immediately on surface {0}")]
    ContextLost(String),

    #[error("context validation failed for surface {id}: {reason}")]
    Validation { id: String, reason: String },

    #[error("engine construction failed for {system}: {source}")]
    EngineBuild {
        system: String,
        #[source]
        source: anyhow::Error,
    },
}
