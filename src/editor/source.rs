//! Texture loading.
//!
//! Resolves a user-supplied string to a decoded texture. Accepted inputs, in
//! the order they are tried:
//! - `data:` URIs with a base64 payload
//! - `http://` / `https://` URLs
//! - paths to existing image files
//! - base64 Minecraft texture payloads (`{"textures":{"SKIN":{"url":...}}}`)
//! - raw base64 image bytes
//!
//! Downloads share one HTTP client to avoid connection pool churn.

use crate::config::DownloadSettings;
use crate::texture::{PixelBuffer, TextureError};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Shared HTTP client for all texture downloads
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .pool_max_idle_per_host(1)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
});

/// Texture source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Image decode failed: {0}")]
    DecodeError(#[from] image::ImageError),

    #[error("Invalid base64 data: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed data URI")]
    MalformedDataUri,

    #[error("Image is {width}x{height}, larger than the {max}px limit")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("Invalid texture: {0}")]
    InvalidTexture(#[from] TextureError),

    #[error("Empty texture source")]
    EmptyInput,

    #[error("Download timeout")]
    Timeout,
}

/// Minecraft profile texture payload, after base64 decoding
#[derive(Debug, Deserialize)]
struct TexturePayload {
    textures: PayloadTextures,
}

#[derive(Debug, Deserialize)]
struct PayloadTextures {
    #[serde(rename = "SKIN")]
    skin: Option<PayloadSkin>,
}

#[derive(Debug, Deserialize)]
struct PayloadSkin {
    url: String,
}

/// Load a texture from any supported source
pub async fn load_texture(
    input: &str,
    settings: &DownloadSettings,
) -> Result<PixelBuffer, SourceError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SourceError::EmptyInput);
    }

    let img = if input.starts_with("data:") {
        tracing::debug!("Decoding data URI texture");
        decode_bytes(&decode_data_uri(input)?)?
    } else if is_url(input) {
        download_texture(input, settings).await?
    } else if Path::new(input).is_file() {
        tracing::info!("Reading texture from {}", input);
        let bytes = std::fs::read(input).map_err(|source| SourceError::ReadError {
            path: input.to_string(),
            source,
        })?;
        decode_bytes(&bytes)?
    } else if let Some(url) = texture_payload_url(input) {
        tracing::info!("Texture payload points at {}", url);
        download_texture(&url, settings).await?
    } else {
        tracing::debug!("Decoding raw base64 texture");
        decode_bytes(&STANDARD.decode(input)?)?
    };

    into_buffer(img, settings.max_dimension)
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Extract the base64 payload of a `data:[<mime>];base64,<data>` URI
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, SourceError> {
    let rest = uri.strip_prefix("data:").ok_or(SourceError::MalformedDataUri)?;
    let (meta, data) = rest.split_once(',').ok_or(SourceError::MalformedDataUri)?;
    if !meta.ends_with(";base64") {
        return Err(SourceError::MalformedDataUri);
    }
    Ok(STANDARD.decode(data.trim())?)
}

/// Skin URL from a base64 Minecraft texture payload, if `input` is one
fn texture_payload_url(input: &str) -> Option<String> {
    let decoded = STANDARD.decode(input).ok()?;
    let payload: TexturePayload = serde_json::from_slice(&decoded).ok()?;
    payload.textures.skin.map(|skin| skin.url)
}

fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, SourceError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SourceError::DecodeError(image::ImageError::IoError(e)))?;
    Ok(reader.decode()?)
}

fn into_buffer(img: DynamicImage, max_dimension: u32) -> Result<PixelBuffer, SourceError> {
    let (width, height) = (img.width(), img.height());
    tracing::debug!("Texture decoded: {}x{}", width, height);

    if width > max_dimension || height > max_dimension {
        return Err(SourceError::TooLarge {
            width,
            height,
            max: max_dimension,
        });
    }

    Ok(PixelBuffer::try_from(img.into_rgba8())?)
}

/// Download and decode a texture
async fn download_texture(
    url: &str,
    settings: &DownloadSettings,
) -> Result<DynamicImage, SourceError> {
    tracing::info!("Downloading texture from: {}", url);

    let bytes = download_with_retry(&HTTP_CLIENT, url, settings).await?;
    tracing::debug!("Downloaded {} bytes, decoding texture...", bytes.len());

    decode_bytes(&bytes)
}

/// Download with retry and exponential back-off
async fn download_with_retry(
    client: &reqwest::Client,
    url: &str,
    settings: &DownloadSettings,
) -> Result<bytes::Bytes, SourceError> {
    let mut last_error = None;
    let retry_delay = Duration::from_millis(settings.retry_delay_ms);
    let timeout = Duration::from_secs(settings.timeout_secs);

    for attempt in 0..settings.max_retries {
        if attempt > 0 {
            let delay = backoff_delay(retry_delay, attempt);
            tracing::debug!(
                "Retry attempt {}/{}, waiting {:?}",
                attempt + 1,
                settings.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        match client.get(url).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    match response.bytes().await {
                        Ok(bytes) => return Ok(bytes),
                        Err(e) => {
                            tracing::warn!("Failed to read response body: {}", e);
                            last_error = Some(SourceError::RequestError(e));
                        }
                    }
                } else {
                    tracing::warn!("HTTP error: {} for {}", status, url);
                    last_error = Some(SourceError::HttpError {
                        status: status.as_u16(),
                    });
                }
            }
            Err(e) => {
                tracing::warn!("Request failed: {} for {}", e, url);
                last_error = Some(SourceError::RequestError(e));
            }
        }
    }

    Err(last_error.unwrap_or(SourceError::Timeout))
}

/// Delay before retry number `attempt` (1-based), doubling each time
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbaImage::new(width, height);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn settings() -> DownloadSettings {
        DownloadSettings::default()
    }

    #[test]
    fn test_data_uri() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(2, 2)));
        let bytes = decode_data_uri(&uri).unwrap();
        assert_eq!(bytes, png_bytes(2, 2));

        assert!(matches!(
            decode_data_uri("data:image/png,plain"),
            Err(SourceError::MalformedDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64"),
            Err(SourceError::MalformedDataUri)
        ));
    }

    #[test]
    fn test_texture_payload_url() {
        let json = r#"{"timestamp":1,"textures":{"SKIN":{"url":"http://textures.example/abc"}}}"#;
        let payload = STANDARD.encode(json);
        assert_eq!(
            texture_payload_url(&payload).as_deref(),
            Some("http://textures.example/abc")
        );

        let no_skin = STANDARD.encode(r#"{"textures":{}}"#);
        assert_eq!(texture_payload_url(&no_skin), None);
        assert_eq!(texture_payload_url(&STANDARD.encode(png_bytes(1, 1))), None);
        assert_eq!(texture_payload_url("not base64 !"), None);
    }

    #[test]
    fn test_into_buffer_limits() {
        let img = decode_bytes(&png_bytes(64, 64)).unwrap();
        let buffer = into_buffer(img, 4096).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (64, 64));
        assert_eq!(buffer.get(0, 0).unwrap(), [255, 0, 0, 255]);

        let img = decode_bytes(&png_bytes(64, 64)).unwrap();
        assert!(matches!(
            into_buffer(img, 32),
            Err(SourceError::TooLarge { max: 32, .. })
        ));
    }

    #[test]
    fn test_backoff_delay_doubles_and_saturates() {
        let base = Duration::from_millis(2000);
        assert_eq!(backoff_delay(base, 1), base);
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(4000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(8000));
        // Large attempt counts clamp instead of overflowing
        assert_eq!(backoff_delay(base, 40), base * u32::MAX);
        assert_eq!(backoff_delay(Duration::MAX, 5), Duration::MAX);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_bytes(b"definitely not an image").is_err());
    }

    #[tokio::test]
    async fn test_load_from_data_uri_and_base64() {
        let encoded = STANDARD.encode(png_bytes(64, 64));

        let from_uri = load_texture(&format!("data:image/png;base64,{}", encoded), &settings())
            .await
            .unwrap();
        let from_raw = load_texture(&encoded, &settings()).await.unwrap();
        assert_eq!(from_uri, from_raw);
        assert_eq!(from_raw.width(), 64);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.png");
        std::fs::write(&path, png_bytes(64, 64)).unwrap();

        let buffer = load_texture(path.to_str().unwrap(), &settings())
            .await
            .unwrap();
        assert_eq!(buffer.get(0, 0).unwrap(), [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_load_empty_input() {
        assert!(matches!(
            load_texture("   ", &settings()).await,
            Err(SourceError::EmptyInput)
        ));
    }
}
