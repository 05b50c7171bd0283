pub mod client;
pub mod completion;
pub mod image;
pub mod models;
pub mod response;
pub mod speech;

pub use client::{HttpTransport, Transport};
pub use completion::{Completion, CompletionClient, CompletionSettings, RequestState};
pub use image::ImageClient;
pub use models::{ChatMessage, ImageRequest, RequestBody};
pub use speech::SpeechClient;
