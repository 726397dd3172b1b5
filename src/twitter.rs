//! Minimal Twitter v1.1 client: login check, media upload, status update.
//!
//! Requests are signed with OAuth 1.0a (HMAC-SHA1) using the app's consumer
//! keys and the account's access token.
//!
//! # Signing
//!
//! ```text
//! base   = METHOD & enc(url) & enc(sorted "k=v" pairs joined by "&")
//! key    = enc(consumer_secret) & enc(token_secret)
//! sig    = base64(hmac_sha1(key, base))
//! ```
//!
//! Multipart bodies (media upload) are not part of the signature; form bodies
//! (status update) are.

use crate::config::{TwitterConfig, TwitterKeys};
use crate::error::{Error, Result};
use crate::publish::{Post, Publish};
use crate::utils::truncate_for_log;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use itertools::Itertools;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Request, Response};
use serde::Deserialize;
use sha1::Sha1;
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

type HmacSha1 = Hmac<Sha1>;

/// The logged-in account, as reported by `verify_credentials`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: u64,
    pub screen_name: String,
}

#[derive(Debug, Deserialize)]
struct MediaUpload {
    media_id_string: String,
}

/// Per-request OAuth values that must be unique for every call.
#[derive(Debug, Clone)]
pub struct Nonce {
    pub nonce: String,
    pub timestamp: i64,
}

impl Nonce {
    pub fn fresh() -> Self {
        let nonce = rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        Self {
            nonce,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

fn encode(s: &str) -> Cow<'_, str> {
    urlencoding::encode(s)
}

/// Compute the OAuth 1.0a HMAC-SHA1 signature of a request.
///
/// `params` holds every query, form and `oauth_*` parameter, unencoded.
pub fn signature(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> String {
    let param_string = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .sorted()
        .map(|(k, v)| format!("{k}={v}"))
        .join("&");
    let base = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    );
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(base.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Build the `Authorization` header for a request carrying `params`.
pub fn authorization_header(
    keys: &TwitterKeys,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &Nonce,
) -> String {
    let timestamp = nonce.timestamp.to_string();
    let oauth = [
        ("oauth_consumer_key", keys.consumer_key.as_str()),
        ("oauth_nonce", nonce.nonce.as_str()),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", keys.access_token_key.as_str()),
        ("oauth_version", "1.0"),
    ];
    let all: Vec<(&str, &str)> = oauth.iter().chain(params.iter()).copied().collect();
    let sig = signature(
        method,
        url,
        &all,
        &keys.consumer_secret,
        &keys.access_token_secret,
    );

    let fields = oauth
        .iter()
        .copied()
        .chain(std::iter::once(("oauth_signature", sig.as_str())))
        .sorted()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .join(", ");
    format!("OAuth {fields}")
}

/// Signed client for one Twitter account.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    client: Client,
    api_base: String,
    upload_base: String,
    keys: TwitterKeys,
}

impl TwitterClient {
    pub fn new(client: Client, config: &TwitterConfig, keys: TwitterKeys) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
            keys,
        }
    }

    fn authorize(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        authorization_header(&self.keys, method, url, params, &Nonce::fresh())
    }

    /// Check the credentials and return the account they belong to.
    #[instrument(level = "info", skip_all)]
    pub async fn verify_credentials(&self) -> Result<Account> {
        let t0 = Instant::now();
        let url = format!("{}/account/verify_credentials.json", self.api_base);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorize("GET", &url, &[]))
            .send()
            .await?;
        let account: Account = check(response).await?.json().await?;
        info!(
            screen_name = %account.screen_name,
            id = account.id,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Logged into twitter"
        );
        Ok(account)
    }

    /// Upload an image and return its media id.
    #[instrument(level = "info", skip(self, path), fields(path = %path.display()))]
    async fn upload_media(&self, path: &Path) -> Result<String> {
        let url = format!("{}/media/upload.json", self.upload_base);
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "front_page.jpg".to_string());
        let form = Form::new().part("media", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorize("POST", &url, &[]))
            .multipart(form)
            .send()
            .await?;
        let upload: MediaUpload = check(response).await?.json().await?;
        debug!(media_id = %upload.media_id_string, "Uploaded media");
        Ok(upload.media_id_string)
    }

    /// The signed `statuses/update.json` request posting `post` with `media_id`.
    pub fn update_request(&self, post: &Post<'_>, media_id: &str, nonce: &Nonce) -> Result<Request> {
        let url = format!("{}/statuses/update.json", self.api_base);
        let params = status_params(post, media_id);
        let borrowed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let auth = authorization_header(&self.keys, "POST", &url, &borrowed, nonce);

        let request = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .form(&borrowed)
            .build()?;
        Ok(request)
    }

    async fn update_status(&self, post: &Post<'_>, media_id: &str) -> Result<()> {
        let request = self.update_request(post, media_id, &Nonce::fresh())?;
        let response = self.client.execute(request).await?;
        check(response).await?;
        Ok(())
    }
}

/// Form parameters of a status update. Coordinates are only sent when known.
fn status_params(post: &Post<'_>, media_id: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("status", post.status.to_string()),
        ("media_ids", media_id.to_string()),
    ];
    if let Some(point) = post.coordinates {
        params.push(("lat", point.lat.to_string()));
        params.push(("long", point.lng.to_string()));
        params.push(("display_coordinates", "true".to_string()));
    }
    params
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        service: "twitter",
        status: status.as_u16(),
        body: truncate_for_log(&body, 300),
    })
}

impl Publish for TwitterClient {
    #[instrument(level = "info", skip_all, fields(media = %post.media.display()))]
    async fn publish(&self, post: &Post<'_>) -> Result<()> {
        let t0 = Instant::now();
        let media_id = self.upload_media(post.media).await?;
        self.update_status(post, &media_id).await?;
        info!(
            status = ?post.status,
            coordinates = ?post.coordinates,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Tweeted front page"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn keys() -> TwitterKeys {
        TwitterKeys {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            access_token_key: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    fn reference_nonce() -> Nonce {
        Nonce {
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string(),
            timestamp: 1318622958,
        }
    }

    const UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const UPDATE_PARAMS: [(&str, &str); 2] = [
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ("include_entities", "true"),
    ];

    #[test]
    fn test_signature_matches_published_example() {
        let keys = keys();
        let nonce = reference_nonce();
        let timestamp = nonce.timestamp.to_string();
        let mut params = vec![
            ("oauth_consumer_key", keys.consumer_key.as_str()),
            ("oauth_nonce", nonce.nonce.as_str()),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", keys.access_token_key.as_str()),
            ("oauth_version", "1.0"),
        ];
        params.extend(UPDATE_PARAMS);

        let sig = signature(
            "post",
            UPDATE_URL,
            &params,
            &keys.consumer_secret,
            &keys.access_token_secret,
        );
        assert_eq!(sig, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_authorization_header_layout() {
        let header = authorization_header(&keys(), "POST", UPDATE_URL, &UPDATE_PARAMS, &reference_nonce());
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", oauth_nonce="));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
        // request parameters are signed but not sent in the header
        assert!(!header.contains("status"));
    }

    fn client() -> TwitterClient {
        TwitterClient::new(Client::new(), &TwitterConfig::default(), keys())
    }

    fn form_pairs(request: &Request) -> Vec<(String, String)> {
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        url::form_urlencoded::parse(body).into_owned().collect()
    }

    #[test]
    fn test_update_request_with_coordinates() {
        let post = Post {
            status: "The Anniston Star\nAnniston, Alabama, USA",
            media: Path::new("images/AL_AS.jpg"),
            coordinates: Some(GeoPoint { lat: 33.5, lng: -85.75 }),
        };
        let nonce = reference_nonce();
        let request = client().update_request(&post, "710511363345354753", &nonce).unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), UPDATE_URL);
        assert_eq!(
            form_pairs(&request),
            vec![
                ("status".to_string(), "The Anniston Star\nAnniston, Alabama, USA".to_string()),
                ("media_ids".to_string(), "710511363345354753".to_string()),
                ("lat".to_string(), "33.5".to_string()),
                ("long".to_string(), "-85.75".to_string()),
                ("display_coordinates".to_string(), "true".to_string()),
            ]
        );

        let auth = request.headers()[reqwest::header::AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("OAuth "));
        let params = status_params(&post, "710511363345354753");
        let signed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        assert_eq!(auth, authorization_header(&keys(), "POST", UPDATE_URL, &signed, &nonce));
    }

    #[test]
    fn test_update_request_without_coordinates() {
        let post = Post {
            status: "O Globo",
            media: Path::new("images/BRA_OG.jpg"),
            coordinates: None,
        };
        let request = client().update_request(&post, "1", &reference_nonce()).unwrap();
        let keys: Vec<String> = form_pairs(&request).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["status", "media_ids"]);
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_fresh_nonces_differ() {
        let a = Nonce::fresh();
        let b = Nonce::fresh();
        assert_eq!(a.nonce.len(), 32);
        assert!(a.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_status_params_without_coordinates() {
        let post = Post {
            status: "O Globo",
            media: Path::new("images/BRA_OG.jpg"),
            coordinates: None,
        };
        let params = status_params(&post, "123");
        assert_eq!(
            params,
            vec![("status", "O Globo".to_string()), ("media_ids", "123".to_string())]
        );
    }

    #[test]
    fn test_status_params_with_coordinates() {
        let post = Post {
            status: "The Anniston Star",
            media: Path::new("images/AL_AS.jpg"),
            coordinates: Some(GeoPoint { lat: 33.5, lng: -85.75 }),
        };
        let params = status_params(&post, "123");
        assert_eq!(params.len(), 5);
        assert!(params.contains(&("lat", "33.5".to_string())));
        assert!(params.contains(&("long", "-85.75".to_string())));
        assert!(params.contains(&("display_coordinates", "true".to_string())));
    }
}
