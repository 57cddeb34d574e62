//! OpenAI-compatible API client
//!
//! Provides:
//! - Chat completions (theme lists, theme descriptions)
//! - Image generation, one image per request

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::{Error, Result};

/// Chat message for the text API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Image generation request
#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
}

/// Image generation response
#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

/// Where a generated image can be picked up
///
/// Remote URLs are short-lived and consumed exactly once by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Url(String),
    Inline(Vec<u8>),
}

impl ImageData {
    fn into_reference(self) -> Result<ImageReference> {
        if let Some(url) = self.url.filter(|u| !u.is_empty()) {
            return Ok(ImageReference::Url(url));
        }
        match self.b64_json {
            Some(encoded) => BASE64
                .decode(encoded.as_bytes())
                .map(ImageReference::Inline)
                .map_err(|e| Error::InvalidImagePayload(e.to_string())),
            None => Err(Error::NoImageData),
        }
    }
}

/// Client for the text and image generation endpoints
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    /// HTTP client, also used for downloading generated images
    client: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    image_model: String,
    image_size: String,
    image_quality: String,
}

impl OpenAiClient {
    /// Create a client from configuration
    ///
    /// Fails with [`Error::MissingApiKey`] when no usable key is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or(Error::MissingApiKey)?.to_string();

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            image_model: config.image_model.clone(),
            image_size: config.image_size.clone(),
            image_quality: config.image_quality.clone(),
        })
    }

    /// Underlying HTTP client
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Send a chat completion request and return the first choice's text
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages,
        };

        debug!("Sending chat request with model {}", request.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Text API error: {} - {}", status, body);
            return Err(Error::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(Error::EmptyCompletion)
    }

    /// Generate one image for the prompt
    ///
    /// An empty `data` array is reported as [`Error::NoImageData`].
    pub async fn generate_image(&self, prompt: &str) -> Result<ImageReference> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
            size: &self.image_size,
            quality: &self.image_quality,
        };

        debug!(
            "Sending image request with model {} ({}, {})",
            request.model, request.size, request.quality
        );

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Image API error: {} - {}", status, body);
            return Err(Error::Api { status, body });
        }

        let image_response: ImageResponse = response.json().await?;

        image_response
            .data
            .into_iter()
            .next()
            .ok_or(Error::NoImageData)?
            .into_reference()
    }
}
