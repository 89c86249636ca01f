#![forbid(unsafe_code)]

//! Frame composition and output.
//!
//! A frame is drawn into a [`Grid`] and handed to a [`Presenter`], which
//! writes only what changed since the previous frame.

pub mod grid;
pub mod presenter;

pub use grid::{Cell, CellContent, Grid, Rect, Rgb, Style, StyleFlags, display_width};
pub use presenter::Presenter;
