use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use reqwest::Client;
use thiserror::Error;

pub const MAX_IMAGE_DIMENSION: u32 = 2048;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error("image request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("image request returned HTTP {status}")]
    Status { status: u16 },
    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),
    #[error("{0}")]
    Other(String),
}

/// Where enhancement inputs come from.
#[async_trait]
pub trait ImageSource: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, ImageFetchError>;
}

pub type SharedImageSource = Arc<dyn ImageSource>;

#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Result<Self, ImageFetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ImageFetchError::Request)?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, ImageFetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ImageFetchError::Request)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status {
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await.map_err(ImageFetchError::Request)?;
        image::load_from_memory(bytes.as_ref()).map_err(ImageFetchError::Decode)
    }
}

/// Shrinks to fit `max_dim` x `max_dim`, keeping aspect ratio. Never upsizes.
pub fn fit_within(image: DynamicImage, max_dim: u32) -> DynamicImage {
    if image.width() <= max_dim && image.height() <= max_dim {
        return image;
    }
    image.resize(max_dim, max_dim, FilterType::Lanczos3)
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    image.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

pub fn jpeg_data_url(image: &RgbImage, quality: u8) -> Result<String, image::ImageError> {
    let bytes = encode_jpeg(image, quality)?;
    Ok(format!(
        "data:image/jpeg;base64,{}",
        BASE64_STANDARD.encode(bytes.as_slice())
    ))
}
