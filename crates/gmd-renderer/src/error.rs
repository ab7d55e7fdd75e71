//! Error types for the rendering pipeline.

/// Error returned when a document exceeds the renderer's resource limits.
///
/// Malformed markdown or HTML is never an error: the renderer degrades to
/// literal text instead. Only inputs that would make rendering unbounded are
/// rejected, see [`Limits`](crate::Limits).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Input is larger than `Limits::max_input_bytes`.
    #[error("input is {len} bytes, exceeding the limit of {limit} bytes")]
    InputTooLarge {
        /// Input size in bytes.
        len: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Document has more top-level `gmd-md` blocks than `Limits::max_blocks`.
    #[error("document contains more than {limit} gmd-md blocks")]
    TooManyBlocks {
        /// Configured block limit.
        limit: usize,
    },

    /// `gmd-md` tags are nested deeper than `Limits::max_nesting_depth`.
    #[error("gmd-md blocks are nested deeper than {limit} levels")]
    NestingTooDeep {
        /// Configured depth limit.
        limit: usize,
    },
}
