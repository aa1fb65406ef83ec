//! Zonecast Core - layout composition and publish engine
//!
//! Operators pick a screen layout, size its zones, fill each zone with a
//! playlist from the media catalog, and publish the resulting document to
//! any number of display devices at once.
//!
//! This crate contains all business logic with zero UI dependencies.
//! It can be used by a console front-end or the bundled CLI tool.

pub mod composer;
pub mod config;
pub mod layout;
pub mod logging;
pub mod models;
pub mod publish;
pub mod sources;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
