//! Data models for newspapers and the metadata gathered about them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`PaperListing`]: One row of the front page directory
//! - [`PaperDetail`]: Links and date scraped from a paper's detail page
//! - [`GeoPoint`]: Coordinates resolved for a paper's place of publication
//!
//! Nothing here outlives a single run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A newspaper as listed in the front page directory.
///
/// # Fields
///
/// * `id` - Opaque directory identifier, e.g. `"AL_AS"` (state prefix, underscore, paper code)
/// * `name` - Display name of the paper
/// * `place` - Place of publication, normalized once after scraping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperListing {
    /// The directory identifier of the paper.
    pub id: String,
    /// The display name of the paper.
    pub name: String,
    /// The place of publication.
    pub place: String,
}

impl PaperListing {
    /// Whether the paper is published in the USA.
    pub fn is_usa(&self) -> bool {
        self.place.contains("USA")
    }
}

/// Details scraped from a paper's own page in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperDetail {
    /// The paper's own homepage.
    pub homepage_link: String,
    /// Absolute URL of today's front page image.
    pub image_link: String,
    /// The paper's local date as printed on the detail page.
    pub local_date: Option<String>,
}

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}
