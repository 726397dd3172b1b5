//! Front page directory scrapers.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Indexing**: Fetch the directory listing once and parse every paper
//!    it names (a failure here ends the run; there is nothing to post).
//! 2. **Details**: For each sampled paper, fetch its detail page for the
//!    homepage link, front page image and local date, then download the image.
//!
//! The pipeline only talks to phase 2 through [`PaperSource`], so it can be
//! driven by an in-memory source in tests.

use crate::error::Result;
use crate::models::PaperDetail;
use std::path::Path;

pub mod newseum;

/// Per-paper lookups the pipeline needs from the directory.
pub trait PaperSource {
    /// Scrape the detail page of the paper with directory id `id`.
    async fn paper_details(&self, id: &str) -> Result<PaperDetail>;

    /// Download the image at `url` to `dest`, replacing any existing file.
    async fn download_image(&self, url: &str, dest: &Path) -> Result<()>;
}
