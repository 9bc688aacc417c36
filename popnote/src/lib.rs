//! popnote: themed desktop notification popups.
//!
//! Events fire into a [`Notifier`], which checks whether they should be
//! shown, picks a template from the loaded themes, renders it and hands the
//! image to the [`display::DisplayManager`] for animation and stacking.
//! Everything window-system specific sits behind [`host::PopupHost`].

pub mod bootstrap;
pub mod config;
pub mod display;
pub mod event;
pub mod geometry;
pub mod host;
pub mod notifier;
pub mod render;
pub mod theme;
pub mod timer;

pub use bootstrap::{data_dir, init_foundation};
pub use notifier::Notifier;
