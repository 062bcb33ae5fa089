//! Utility functions for FairTree Core
//!
//! This module provides helpers used at the edges of the core, such as
//! seeding a collection from a path listing.

mod listing;

pub use listing::{parse_listing, parse_listing_with_stats, ListingStats};
