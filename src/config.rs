use crate::error::{FlywayError, Result};
use crate::parse::Args;
use crate::photo::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WIDTH};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_IMAGE_HOST: &str = "https://api.imgbb.com/1/upload";

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    pub image_host: Url,
    pub image_key: Option<String>,
    pub timeout: Duration,
    /// Pause before reloading when the client becomes visible again.
    pub reload_delay: Duration,
    pub max_photo_width: u32,
    pub jpeg_quality: u8,
}

impl Config {
    /// Defaults for everything except the log endpoint.
    pub fn for_endpoint(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: parse_url("endpoint", endpoint)?,
            image_host: parse_url("image host", DEFAULT_IMAGE_HOST)?,
            image_key: None,
            timeout: Duration::from_secs(30),
            reload_delay: Duration::from_millis(300),
            max_photo_width: DEFAULT_MAX_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        })
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        if args.max_photo_width == 0 {
            return Err(FlywayError::Config("max photo width must be positive".into()));
        }
        if !(1..=100).contains(&args.jpeg_quality) {
            return Err(FlywayError::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                args.jpeg_quality
            )));
        }

        let mut config = Self::for_endpoint(&args.endpoint)?;
        config.image_host = parse_url("image host", &args.image_host)?;
        config.image_key = args
            .image_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        config.timeout = Duration::from_secs(args.timeout);
        config.reload_delay = Duration::from_millis(args.reload_delay);
        config.max_photo_width = args.max_photo_width;
        config.jpeg_quality = args.jpeg_quality;
        Ok(config)
    }

    pub fn image_key(&self) -> Result<&str> {
        self.image_key.as_deref().ok_or(FlywayError::MissingImageKey)
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| FlywayError::Config(format!("invalid {name} URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FlywayError::Config(format!(
            "{name} URL must be http or https, got {other}"
        ))),
    }
}
