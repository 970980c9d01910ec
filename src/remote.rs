//! Remote execution client: ship the payload to a conversion endpoint.
//!
//! The wire format matches what the upload service consumes: a multipart
//! form with an `options` JSON field and one `image_<i>` file part per
//! image, answered with the PDF bytes as an attachment (filename in
//! `Content-Disposition`) or a JSON `{"error": …}` body on failure.
//!
//! The client performs no layout work of its own. The remote side runs the
//! same [`crate::assemble::Assembler`], so output structure is identical to
//! the local path.

use crate::assemble::{derived_file_name, ConversionOutput};
use crate::config::PdfOptions;
use crate::error::ConvertError;
use crate::input::ImageInput;
use reqwest::header::CONTENT_DISPOSITION;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a remote conversion endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    endpoint: String,
    timeout: Duration,
}

impl RemoteClient {
    /// Target a conversion endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Override the whole-request timeout (upload + processing + download).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upload `images` and return the converted document.
    pub async fn convert(
        &self,
        images: &[ImageInput],
        options: &PdfOptions,
    ) -> Result<ConversionOutput, ConvertError> {
        info!(endpoint = %self.endpoint, images = images.len(), "Uploading to remote converter");

        let options_json = serde_json::to_string(options)
            .map_err(|e| ConvertError::InvalidOptions(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new().text("options", options_json);
        for (i, image) in images.iter().enumerate() {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.name.clone())
                .mime_str(&image.mime)?;
            form = form.part(format!("image_{i}"), part);
        }

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ConvertError::RemoteRejected {
                status: status.as_u16(),
                message,
            });
        }

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_attachment_file_name)
            .unwrap_or_else(derived_file_name);

        let bytes = response.bytes().await?.to_vec();
        debug!(byte_len = bytes.len(), %file_name, "Remote conversion complete");

        Ok(ConversionOutput {
            byte_len: bytes.len(),
            bytes,
            file_name,
        })
    }
}

/// Pull the quoted filename out of a `Content-Disposition` header value.
fn parse_attachment_file_name(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=\"")?;
    let (name, _) = rest.split_once('"')?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
