//! # dropline-settings
//!
//! Configuration with layered sources for the Dropline broker.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`DroplineSettings::default()`]
//! 2. **User file**: `~/.dropline/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `DROPLINE_*` overrides (highest priority)
//!
//! Command-line flags in the `dropline` binary sit above all three.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings_from_path, settings_path};
pub use types::*;
