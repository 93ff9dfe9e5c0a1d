//! # kup-editor — Text model and editing core for kup
//!
//! This crate contains everything between the key decoder and the screen:
//!
//! - **[`render`]** — tab expansion and logical/visual column mapping
//! - **[`syntax`]** — table-driven highlighting with block comments that
//!   span rows
//! - **[`row`]** / **[`document`]** — the row store, file load and save
//! - **[`cursor`]** — logical cursor and movement
//! - **[`search`]** — incremental search with a match overlay
//! - **[`view`]** — scrolling, status bar, and frame composition
//! - **[`prompt`]** — message-bar input driving search and save-as
//! - **[`editor`]** — key dispatch; implements the terminal event loop's
//!   `App` trait

pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod options;
pub mod prompt;
pub mod render;
pub mod row;
pub mod search;
pub mod syntax;
pub mod view;

pub use error::{Error, Result};

/// Version shown on the welcome screen.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
