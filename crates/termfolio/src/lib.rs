#![forbid(unsafe_code)]

//! Terminal front end for the portfolio.
//!
//! Maps crossterm events onto a [`termfolio_core::Session`], draws it into
//! a cell grid, and presents only the cells that changed.

pub mod app;
pub mod cli;
pub mod error;
pub mod logging;
pub mod render;
pub mod scene;
pub mod terminal;
pub mod theme;

pub use error::{Error, Result};
