use thiserror::Error;

/// Errors surfaced by the sketch engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine is missing a required piece of construction-time wiring,
    /// e.g. an operation was invoked before `attach`. Callers should treat
    /// this as fatal rather than catch and retry.
    #[error("engine setup error: {0}")]
    Setup(&'static str),

    /// An image source failed to decode. The raster is left unchanged.
    #[error("failed to decode image source")]
    Decode(#[from] image::ImageError),

    /// An unexpected state variant was reached. Unreachable given
    /// exhaustive construction; a programming-error signal, not a
    /// recoverable runtime condition.
    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub type EngineResult<T> = Result<T, EngineError>;
