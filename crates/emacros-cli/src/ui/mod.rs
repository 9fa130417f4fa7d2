//! # CLI UI Module
//!
//! Styling and formatting layer for `emacros` output.
//!
//! - `color`: color mode detection and terminal capability checks
//! - `style`: message types, prefixes, and styling functions
//! - `format`: small text formatters (truncation, scope lists, plurals)
//! - `table`: macro listings rendered with comfy-table

pub mod color;
pub mod format;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use style::{MessageType, Style};
