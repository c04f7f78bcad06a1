// Library crate: the viewport core, testable without a window.
// The eframe shell (GL renderer, panels, menus) stays in the binary crate.

pub mod error;
pub mod fixtures;
pub mod harness;
pub mod redraw;
pub mod state;
pub mod viewport;

pub use error::ViewportError;
