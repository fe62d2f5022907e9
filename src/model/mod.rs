//! Data models for orq.
//!
//! This module contains all domain models:
//! - Requirement / Solution (tagged as `Item`)
//! - ItemVersion
//! - ProjectVersion / Info
//! - Label / LabelItem
//! - Media

pub mod item;
pub mod label;
pub mod media;
pub mod project;
pub mod version;

pub use item::{Item, ItemType, Requirement, Solution};
pub use label::{Color, Label, LabelItem};
pub use media::{Media, MediaInfo};
pub use project::{Info, ProjectVersion};
pub use version::ItemVersion;
