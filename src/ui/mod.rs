//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - the template list and editor screens
//! - the status and toast bars
//! - modal overlays for the action menu, rename and delete confirmations,
//!   the create prompt, the snippet picker and help

mod overlays;
mod render;
mod status;

pub use overlays::centered_popup_rect;
pub use render::render;
pub use status::{SPINNER_FRAMES, status_text};

#[cfg(test)]
mod tests;
