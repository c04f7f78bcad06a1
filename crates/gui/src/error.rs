//! Error taxonomy for the viewport core.
//!
//! Every variant is recoverable: manipulation calls turn them into no-ops and
//! the interaction state machine reports them as skipped events.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewportError {
    /// A manipulation was requested with nothing selected
    #[error("no object is selected")]
    NoSelection,

    /// The selection names an object the registry no longer holds
    #[error("object `{0}` is not in the scene")]
    UnknownObject(String),

    #[error("an object named `{0}` already exists")]
    DuplicateName(String),

    /// Client area has zero width or height, so nothing can be projected
    #[error("viewport has no area ({width}x{height})")]
    DegenerateViewport { width: f32, height: f32 },

    #[error("render resources are not initialized")]
    UninitializedRenderResources,

    /// Failure reported by the GPU backend; surfaced to the host application
    #[error("render backend: {0}")]
    Backend(String),
}
