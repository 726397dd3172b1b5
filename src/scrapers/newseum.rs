//! Today's Front Pages directory scraper.
//!
//! # Listing page
//!
//! Each paper is a `div.tfp-list-item` holding an anchor whose `name` is the
//! paper id, the paper name in an `<em>` inside that anchor, and the place in
//! a `<small>`.
//!
//! # Detail page
//!
//! The homepage link is the anchor wrapping the `fa-external-link` icon, the
//! full size image is the anchor in `p.tfp-thumbnail`, and the local date is
//! the `h4` of `div.tfp-pane-detail`.

use super::PaperSource;
use crate::config::SourcesConfig;
use crate::error::{Error, Result};
use crate::images;
use crate::models::{PaperDetail, PaperListing};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("div.tfp-list-item"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static EMPHASIS: Lazy<Selector> = Lazy::new(|| selector("em"));
static SMALL: Lazy<Selector> = Lazy::new(|| selector("small"));
static EXTERNAL_LINK_ICON: Lazy<Selector> = Lazy::new(|| selector("span.fa.fa-external-link"));
static THUMBNAIL: Lazy<Selector> = Lazy::new(|| selector("p.tfp-thumbnail"));
static DETAIL_PANE: Lazy<Selector> = Lazy::new(|| selector("div.tfp-pane-detail"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h4"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn missing(page: &'static str, element: &'static str) -> Error {
    Error::MissingElement { page, element }
}

/// HTTP client for the directory site.
#[derive(Debug, Clone)]
pub struct Newseum {
    client: Client,
    listing_url: String,
    detail_url_template: String,
}

impl Newseum {
    pub fn new(client: Client, sources: &SourcesConfig) -> Self {
        Self {
            client,
            listing_url: sources.listing_url.clone(),
            detail_url_template: sources.detail_url_template.clone(),
        }
    }

    /// Detail page URL for paper `id`.
    pub fn detail_url(&self, id: &str) -> String {
        self.detail_url_template
            .replace("{id}", &urlencoding::encode(id))
    }

    /// Fetch and parse the full directory listing.
    ///
    /// Any failure, including a single malformed list item, is returned: without
    /// a listing there is nothing to sample.
    #[instrument(level = "info", skip_all, fields(url = %self.listing_url))]
    pub async fn index_papers(&self) -> Result<Vec<PaperListing>> {
        let t0 = Instant::now();
        let html = self
            .client
            .get(&self.listing_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let papers = parse_listing(&html)?;
        info!(
            count = papers.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Retrieved and parsed list of newspapers"
        );
        Ok(papers)
    }
}

impl PaperSource for Newseum {
    #[instrument(level = "info", skip(self))]
    async fn paper_details(&self, id: &str) -> Result<PaperDetail> {
        let t0 = Instant::now();
        let url = Url::parse(&self.detail_url(id))?;
        let html = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let detail = parse_details(&html, &url)?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Retrieved and parsed local date, newspaper link, and image url"
        );
        debug!(?detail, "Paper detail");
        Ok(detail)
    }

    async fn download_image(&self, url: &str, dest: &Path) -> Result<()> {
        images::download(&self.client, url, dest).await
    }
}

/// Parse the directory listing page into paper records, in page order.
pub fn parse_listing(html: &str) -> Result<Vec<PaperListing>> {
    let document = Html::parse_document(html);
    let mut papers = Vec::new();

    for item in document.select(&LIST_ITEM) {
        let anchor = item
            .select(&ANCHOR)
            .next()
            .ok_or_else(|| missing("listing", "paper anchor"))?;
        let id = anchor
            .value()
            .attr("name")
            .ok_or_else(|| missing("listing", "paper id"))?;
        let name = anchor
            .select(&EMPHASIS)
            .next()
            .ok_or_else(|| missing("listing", "paper name"))?;
        let place = item
            .select(&SMALL)
            .next()
            .ok_or_else(|| missing("listing", "paper place"))?;

        papers.push(PaperListing {
            id: id.to_string(),
            name: text_of(name),
            place: text_of(place),
        });
    }

    Ok(papers)
}

/// Parse a detail page fetched from `page_url`.
///
/// The homepage link is kept as printed, since it is only ever posted. The
/// image link is resolved against `page_url` so it can be downloaded. A blank
/// date heading yields no local date; a missing one is an error like the other
/// two elements.
pub fn parse_details(html: &str, page_url: &Url) -> Result<PaperDetail> {
    let document = Html::parse_document(html);

    let homepage = document
        .select(&EXTERNAL_LINK_ICON)
        .next()
        .and_then(|icon| {
            icon.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "a")
        })
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| missing("detail", "homepage link"))?;

    let image = document
        .select(&THUMBNAIL)
        .next()
        .and_then(|p| p.select(&ANCHOR).next())
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| missing("detail", "thumbnail link"))?;

    let heading = document
        .select(&DETAIL_PANE)
        .next()
        .and_then(|pane| pane.select(&HEADING).next())
        .ok_or_else(|| missing("detail", "date heading"))?;
    let local_date = Some(text_of(heading)).filter(|d| !d.is_empty());

    Ok(PaperDetail {
        homepage_link: homepage.trim().to_string(),
        image_link: page_url.join(image)?.to_string(),
        local_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body>
  <div class="tfp-list">
    <div class="tfp-list-item">
      <a name="AL_AS" href="?tfp_id=AL_AS"><em>The Anniston Star</em></a>
      <small>Anniston, AL  USA</small>
    </div>
    <div class="tfp-list-item">
      <a name="BRA_OG" href="?tfp_id=BRA_OG"><em>O Globo</em></a>
      <small>Rio de Janeiro, Brazil</small>
    </div>
  </div>
</body></html>"#;

    const DETAIL: &str = r#"
<html><body>
  <div class="tfp-pane-detail">
    <h4>Sunday, October 18, 2026</h4>
    <p class="tfp-thumbnail">
      <a href="/dfp/pdf18/AL_AS.jpg"><img src="/dfp/pdf18/AL_AS_thumb.jpg"></a>
    </p>
    <a href="http://www.annistonstar.com/">
      annistonstar.com <span class="fa fa-external-link"></span>
    </a>
  </div>
</body></html>"#;

    fn page_url() -> Url {
        Url::parse("http://www.newseum.org/todaysfrontpages/?tfp_id=AL_AS").unwrap()
    }

    #[test]
    fn test_parse_listing() {
        let papers = parse_listing(LISTING).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(
            papers[0],
            PaperListing {
                id: "AL_AS".to_string(),
                name: "The Anniston Star".to_string(),
                place: "Anniston, AL  USA".to_string(),
            }
        );
        assert_eq!(papers[1].id, "BRA_OG");
        assert_eq!(papers[1].place, "Rio de Janeiro, Brazil");
    }

    #[test]
    fn test_parse_listing_without_items_is_empty() {
        let papers = parse_listing("<html><body><p>maintenance</p></body></html>").unwrap();
        assert!(papers.is_empty());
    }

    #[test]
    fn test_parse_listing_rejects_item_without_place() {
        let html = r#"<div class="tfp-list-item"><a name="X_Y"><em>Paper</em></a></div>"#;
        let err = parse_listing(html).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingElement {
                page: "listing",
                element: "paper place"
            }
        ));
    }

    #[test]
    fn test_parse_details() {
        let detail = parse_details(DETAIL, &page_url()).unwrap();
        assert_eq!(detail.homepage_link, "http://www.annistonstar.com/");
        assert_eq!(detail.image_link, "http://www.newseum.org/dfp/pdf18/AL_AS.jpg");
        assert_eq!(detail.local_date.as_deref(), Some("Sunday, October 18, 2026"));
    }

    #[test]
    fn test_homepage_link_is_posted_as_printed() {
        for href in [
            "http://www.annistonstar.com",
            "www.annistonstar.com",
            "HTTP://Example.COM/a b",
        ] {
            let html = DETAIL.replace("http://www.annistonstar.com/", href);
            let detail = parse_details(&html, &page_url()).unwrap();
            assert_eq!(detail.homepage_link, href);
            assert_eq!(detail.image_link, "http://www.newseum.org/dfp/pdf18/AL_AS.jpg");
        }
    }

    #[test]
    fn test_homepage_link_is_trimmed() {
        let html = DETAIL.replace("http://www.annistonstar.com/", "  annistonstar.com ");
        let detail = parse_details(&html, &page_url()).unwrap();
        assert_eq!(detail.homepage_link, "annistonstar.com");
    }

    #[test]
    fn test_parse_details_blank_date() {
        let html = DETAIL.replace("Sunday, October 18, 2026", "  ");
        let detail = parse_details(&html, &page_url()).unwrap();
        assert_eq!(detail.local_date, None);
    }

    #[test]
    fn test_parse_details_missing_thumbnail() {
        let html = DETAIL.replace("tfp-thumbnail", "tfp-other");
        let err = parse_details(&html, &page_url()).unwrap_err();
        assert_eq!(err.to_string(), "detail page is missing thumbnail link");
    }

    #[test]
    fn test_parse_details_missing_homepage() {
        let html = DETAIL.replace("fa-external-link", "fa-link");
        assert!(matches!(
            parse_details(&html, &page_url()),
            Err(Error::MissingElement {
                element: "homepage link",
                ..
            })
        ));
    }

    #[test]
    fn test_detail_url() {
        let newseum = Newseum::new(Client::new(), &SourcesConfig::default());
        assert_eq!(
            newseum.detail_url("AL_AS"),
            "http://www.newseum.org/todaysfrontpages/?tfp_id=AL_AS"
        );
    }
}
