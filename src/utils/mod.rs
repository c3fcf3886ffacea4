//! Utility modules for the drawer.
//!
//! - [`color`] - configured colour names to terminal colours

pub mod color;
