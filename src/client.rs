use crate::config::Config;
use crate::error::{TransportError, UploadError};
use crate::photo::PHOTO_FILE_NAME;
use crate::submit::HuntForm;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// The spreadsheet-backed hunt log.
#[async_trait]
pub trait LogEndpoint: Send + Sync {
    /// Raw GET payload. Shape checks belong to the caller.
    async fn fetch_history(&self) -> Result<Value, TransportError>;

    /// Post one entry. Only network failures are errors.
    async fn submit(&self, entry: &HuntForm) -> Result<SubmitReceipt, TransportError>;
}

/// Third-party image host that turns JPEG bytes into a public URL.
#[async_trait]
pub trait PhotoHost: Send + Sync {
    async fn upload(&self, jpeg: Vec<u8>) -> Result<String, UploadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub status: u16,
}

fn http_client(timeout: Duration) -> Result<Client, TransportError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("flyway/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// A history read only trusts 2xx bodies.
fn check_status(status: StatusCode) -> Result<(), TransportError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(TransportError::Status(status.as_u16()))
    }
}

pub struct SheetClient {
    client: Client,
    endpoint: Url,
}

impl SheetClient {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        Ok(Self {
            client: http_client(config.timeout)?,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint URL with a cache-busting `t` parameter.
    pub fn history_url(&self, stamp_millis: i64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("t", &stamp_millis.to_string());
        url
    }
}

#[async_trait]
impl LogEndpoint for SheetClient {
    async fn fetch_history(&self) -> Result<Value, TransportError> {
        let url = self.history_url(Utc::now().timestamp_millis());
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        check_status(response.status())?;
        Ok(response.json::<Value>().await?)
    }

    async fn submit(&self, entry: &HuntForm) -> Result<SubmitReceipt, TransportError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&entry.params())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            info!("Log endpoint accepted the hunt ({})", status);
        } else {
            warn!(
                "Log endpoint answered {} to a submission; the reload will show whether it was stored",
                status
            );
        }
        Ok(SubmitReceipt {
            status: status.as_u16(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct HostResponse {
    #[serde(default)]
    success: bool,
    data: Option<HostData>,
}

#[derive(Debug, Deserialize)]
struct HostData {
    url: String,
}

impl HostResponse {
    fn into_url(self) -> Result<String, UploadError> {
        match (self.success, self.data) {
            (true, Some(data)) if !data.url.is_empty() => Ok(data.url),
            _ => Err(UploadError::Rejected),
        }
    }
}

/// imgbb-style host: multipart `image` field, `key` query parameter,
/// `{success, data: {url}}` reply.
pub struct ImageHostClient {
    client: Client,
    upload_url: Url,
    key: String,
}

impl ImageHostClient {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        Ok(Self {
            client: http_client(config.timeout)?,
            upload_url: config.image_host.clone(),
            key: config.image_key.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl PhotoHost for ImageHostClient {
    async fn upload(&self, jpeg: Vec<u8>) -> Result<String, UploadError> {
        let part = Part::bytes(jpeg)
            .file_name(PHOTO_FILE_NAME)
            .mime_str("image/jpeg")
            .map_err(TransportError::from)?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.upload_url.clone())
            .query(&[("key", self.key.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::from)?;

        let body: HostResponse = response.json().await.map_err(TransportError::from)?;
        body.into_url()
    }
}
