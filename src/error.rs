//! Error type shared by every stage of the front page pipeline.
//!
//! Fatal errors (config, logging, the directory listing, login) bubble up to
//! `main`. Everything raised while processing a single paper is caught by the
//! pipeline and recorded against that paper instead.

use thiserror::Error;

/// Anything that can go wrong while scraping, geocoding or posting.
#[derive(Debug, Error)]
pub enum Error {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid config: {0}")]
    Config(String),

    /// An HTML page lacked a structural element we rely on.
    #[error("{page} page is missing {element}")]
    MissingElement {
        page: &'static str,
        element: &'static str,
    },

    #[error("geocoder returned an unparseable coordinate {value:?}")]
    Coordinate { value: String },

    /// A remote API answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("could not install log subscriber: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_message() {
        let e = Error::MissingElement {
            page: "detail",
            element: "thumbnail link",
        };
        assert_eq!(e.to_string(), "detail page is missing thumbnail link");
    }

    #[test]
    fn test_api_error_message() {
        let e = Error::Api {
            service: "twitter",
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(e.to_string(), "twitter returned 403: forbidden");
    }
}
