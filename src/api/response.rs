use crate::error::{NexoraError, Result};
use serde_json::Value;

/// Layouts a completion payload is known to come in
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionShape {
    /// `choices[0].message.content`
    ChatCompletion(String),
    /// top-level `content`
    Flat(String),
}

impl CompletionShape {
    pub fn into_text(self) -> String {
        match self {
            CompletionShape::ChatCompletion(text) | CompletionShape::Flat(text) => text,
        }
    }
}

/// Layouts an image-generation payload is known to come in
#[derive(Debug, Clone, PartialEq)]
pub enum ImageShape {
    /// `data[0].url`
    Data(String),
    /// `images[0].url`
    Images(String),
    /// `output[0]`
    Output(String),
    /// top-level `url`
    Flat(String),
}

impl ImageShape {
    pub fn into_url(self) -> String {
        match self {
            ImageShape::Data(url)
            | ImageShape::Images(url)
            | ImageShape::Output(url)
            | ImageShape::Flat(url) => url,
        }
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

fn first<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    value.get(key).and_then(|v| v.get(0))
}

/// Classify a completion payload. A present `choices[0].message` decides the
/// shape on its own: if its content is missing or empty the payload is
/// malformed even when a flat `content` also exists.
pub fn classify_completion(response_json: &Value) -> Result<CompletionShape> {
    let message = response_json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"));

    if let Some(message) = message {
        return non_empty(message.get("content"))
            .map(CompletionShape::ChatCompletion)
            .ok_or_else(|| {
                NexoraError::MalformedResponse("choices[0].message has no content".to_string())
            });
    }

    non_empty(response_json.get("content"))
        .map(CompletionShape::Flat)
        .ok_or_else(|| NexoraError::MalformedResponse("Invalid response format".to_string()))
}

/// Extract the answer text from a completion payload
pub fn extract_completion(response_json: &Value) -> Result<String> {
    classify_completion(response_json).map(CompletionShape::into_text)
}

/// Probe an image payload for its URL in priority order
pub fn classify_image(response_json: &Value) -> Result<ImageShape> {
    if let Some(url) = non_empty(first(response_json, "data").and_then(|d| d.get("url"))) {
        return Ok(ImageShape::Data(url));
    }
    if let Some(url) = non_empty(first(response_json, "images").and_then(|d| d.get("url"))) {
        return Ok(ImageShape::Images(url));
    }
    if let Some(url) = non_empty(first(response_json, "output")) {
        return Ok(ImageShape::Output(url));
    }
    if let Some(url) = non_empty(response_json.get("url")) {
        return Ok(ImageShape::Flat(url));
    }

    Err(NexoraError::MalformedResponse(
        "No image URL in response".to_string(),
    ))
}

pub fn extract_image_url(response_json: &Value) -> Result<String> {
    classify_image(response_json).map(ImageShape::into_url)
}
