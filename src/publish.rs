//! Publishing seam between the pipeline and the social feed.
//!
//! The pipeline hands a [`Post`] to anything implementing [`Publish`]; the
//! production implementation is [`crate::twitter::TwitterClient`]. Publishing
//! never retries: a failed post is reported back and the pipeline moves on.

use crate::error::Result;
use crate::models::GeoPoint;
use std::path::Path;

/// One status update: text, an image on disk, and optionally where it's from.
#[derive(Debug, Clone, Copy)]
pub struct Post<'a> {
    pub status: &'a str,
    pub media: &'a Path,
    /// When present the post is geotagged and the coordinates shown.
    pub coordinates: Option<GeoPoint>,
}

/// A feed that accepts status updates with media.
pub trait Publish {
    async fn publish(&self, post: &Post<'_>) -> Result<()>;
}
