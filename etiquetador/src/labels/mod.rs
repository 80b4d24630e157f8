//! Label Generation Module
//!
//! Turns spreadsheet rows into ZPL label documents:
//! - Normalization: code padding, name formatting, defaults
//! - Wrapping: menu names split over at most two lines
//! - Rendering: fixed label template

pub mod normalize;
pub mod renderer;
pub mod types;
pub mod wrap;

pub use normalize::{RecordNormalizer, format_employee_name, pad_code};
pub use renderer::LabelRenderer;
pub use types::*;
pub use wrap::wrap_two_lines;
