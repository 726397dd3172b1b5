//! Per-paper posting loop.
//!
//! Each sampled paper goes through the same sequence, strictly one paper at a
//! time:
//!
//! 1. **Details**: scrape the detail page for links and local date
//! 2. **Download**: save the front page image to the save folder
//! 3. **Geocode**: look up the place of publication (no match is fine)
//! 4. **Publish**: compose the status and post it with the image
//!
//! A failure at any stage is logged, recorded against the paper, and followed
//! by the longer error pause; the loop then continues with the next paper.
//! Nothing is retried and nothing is cleaned up, so an image whose post failed
//! stays on disk.

use crate::config::PausePolicy;
use crate::error::Error;
use crate::geocode::Geocode;
use crate::images::image_path;
use crate::models::{GeoPoint, PaperListing};
use crate::publish::{Post, Publish};
use crate::scrapers::PaperSource;
use crate::status::compose_status;
use std::fmt;
use std::path::Path;
use tokio::time::sleep;
use tracing::{error, info, instrument};

/// Where in the per-paper sequence a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Details,
    Download,
    Geocode,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Details => "details",
            Stage::Download => "download",
            Stage::Geocode => "geocode",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// What happened to one paper.
#[derive(Debug)]
pub enum ItemOutcome {
    Published {
        id: String,
        coordinates: Option<GeoPoint>,
    },
    Failed {
        id: String,
        stage: Stage,
        error: Error,
    },
}

/// Outcomes of a run, in processing order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn published(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Published { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.published()
    }

    /// Published posts that carried coordinates.
    pub fn geotagged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    ItemOutcome::Published {
                        coordinates: Some(_),
                        ..
                    }
                )
            })
            .count()
    }
}

struct ItemFailure {
    stage: Stage,
    error: Error,
}

fn at(stage: Stage) -> impl FnOnce(Error) -> ItemFailure {
    move |error| ItemFailure { stage, error }
}

/// Wires a paper source, geocoder and publisher into the posting loop.
pub struct Pipeline<'a, S, G, P> {
    pub source: &'a S,
    pub geocoder: &'a G,
    pub publisher: &'a P,
    pub save_folder: &'a Path,
    pub pause: PausePolicy,
}

impl<S, G, P> Pipeline<'_, S, G, P>
where
    S: PaperSource,
    G: Geocode,
    P: Publish,
{
    /// Post every paper in `papers`, pausing after each one.
    #[instrument(level = "info", skip_all, fields(count = papers.len()))]
    pub async fn run(&self, papers: &[PaperListing]) -> RunReport {
        let mut report = RunReport::default();

        for paper in papers {
            info!(id = %paper.id, "Processing paper");
            let outcome = match self.process(paper).await {
                Ok(coordinates) => {
                    sleep(self.pause.after_success).await;
                    ItemOutcome::Published {
                        id: paper.id.clone(),
                        coordinates,
                    }
                }
                Err(ItemFailure { stage, error }) => {
                    error!(id = %paper.id, %stage, error = %error, "Failed to post paper");
                    sleep(self.pause.after_error).await;
                    ItemOutcome::Failed {
                        id: paper.id.clone(),
                        stage,
                        error,
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        report
    }

    async fn process(&self, paper: &PaperListing) -> Result<Option<GeoPoint>, ItemFailure> {
        let dest = image_path(self.save_folder, &paper.id);

        let detail = self
            .source
            .paper_details(&paper.id)
            .await
            .map_err(at(Stage::Details))?;
        self.source
            .download_image(&detail.image_link, &dest)
            .await
            .map_err(at(Stage::Download))?;
        let coordinates = self
            .geocoder
            .geocode(&paper.place)
            .await
            .map_err(at(Stage::Geocode))?;

        let status = compose_status(
            &paper.name,
            &paper.place,
            &detail.homepage_link,
            detail.local_date.as_deref(),
        );
        let post = Post {
            status: &status,
            media: &dest,
            coordinates,
        };
        self.publisher
            .publish(&post)
            .await
            .map_err(at(Stage::Publish))?;

        Ok(coordinates)
    }
}
