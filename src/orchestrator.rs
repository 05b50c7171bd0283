use crate::api::{CompletionClient, ImageClient, RequestState};
use crate::error::{NexoraError, Result};
use crate::models::Message;
use crate::session::ChatStore;

pub const APOLOGY_MESSAGE: &str = "I'm sorry, I'm having trouble connecting right now. Please check your internet connection and try again. If the problem persists, try again in a few minutes.";
pub const IMAGE_READY_MESSAGE: &str = "Here's your generated image:";
pub const IMAGE_UNAVAILABLE_MESSAGE: &str = "Sorry, I couldn't generate the image. Please try again.";
pub const IMAGE_ERROR_MESSAGE: &str = "Sorry, there was an error generating the image. Please try again.";
pub const IMAGE_PROMPT_PREFIX: &str = "Generate image: ";

/// How the assistant side of an exchange turned out
#[derive(Debug)]
pub enum Reply {
    Answered { model: String, used_backup: bool },
    /// Both models failed; the apology was appended instead
    Apologized(NexoraError),
    ImageGenerated { url: String },
    ImageFailed(NexoraError),
}

/// One user turn plus the assistant message appended for it
#[derive(Debug)]
pub struct Exchange {
    pub session_id: String,
    pub message: Message,
    pub reply: Reply,
    /// Set when the store could not be written; the exchange itself is
    /// still in memory.
    pub persistence_error: Option<NexoraError>,
}

impl Exchange {
    pub fn failed(&self) -> bool {
        matches!(self.reply, Reply::Apologized(_) | Reply::ImageFailed(_))
    }
}

/// Drives a conversation: snapshots context from the store, asks the
/// models and writes the outcome back.
pub struct ChatController {
    store: ChatStore,
    completions: CompletionClient,
    images: Option<ImageClient>,
    context_window: usize,
    state: RequestState,
}

impl ChatController {
    pub fn new(store: ChatStore, completions: CompletionClient, context_window: usize) -> Self {
        Self {
            store,
            completions,
            images: None,
            context_window,
            state: RequestState::Idle,
        }
    }

    pub fn with_images(mut self, images: ImageClient) -> Self {
        self.images = Some(images);
        self
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    pub fn into_store(self) -> ChatStore {
        self.store
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state != RequestState::Idle
    }

    /// Send `prompt` with the current session's recent messages as context.
    ///
    /// The context is taken before the prompt is appended, so the prompt
    /// only appears once in the request, as the final user turn. A total
    /// model failure is not an error here: the apology is appended and the
    /// failure is reported through `Reply::Apologized`.
    pub async fn send_message(&mut self, prompt: &str) -> Result<Exchange> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(NexoraError::EmptyPrompt);
        }

        let history: Vec<Message> = self.store.recent_messages(self.context_window).to_vec();
        let mut persistence_error = None;
        append(&mut self.store, Message::user(prompt), &mut persistence_error);

        let state = &mut self.state;
        let result = self
            .completions
            .complete_with(prompt, &history, |next| {
                tracing::debug!(state = ?next, "completion state");
                *state = next;
            })
            .await;

        let (message, reply) = match result {
            Ok(completion) => (
                Message::assistant(completion.text),
                Reply::Answered {
                    model: completion.model,
                    used_backup: completion.used_backup,
                },
            ),
            Err(e) => {
                tracing::error!("AI error: {}", e);
                (Message::assistant(APOLOGY_MESSAGE), Reply::Apologized(e))
            }
        };
        self.state = RequestState::Idle;

        let session_id = append(&mut self.store, message.clone(), &mut persistence_error);
        Ok(Exchange {
            session_id,
            message,
            reply,
            persistence_error,
        })
    }

    /// Ask the image endpoint for a picture of `prompt`
    pub async fn generate_image(&mut self, prompt: &str) -> Result<Exchange> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(NexoraError::EmptyPrompt);
        }
        let Some(images) = &self.images else {
            return Err(NexoraError::FeatureUnavailable(
                "image generation is not configured".to_string(),
            ));
        };

        let mut persistence_error = None;
        append(
            &mut self.store,
            Message::user(format!("{}{}", IMAGE_PROMPT_PREFIX, prompt)),
            &mut persistence_error,
        );

        self.state = RequestState::GeneratingImage;
        let result = images.generate(prompt).await;
        self.state = RequestState::Idle;

        let (message, reply) = match result {
            Ok(url) => (
                Message::assistant(IMAGE_READY_MESSAGE).with_image(url.clone()),
                Reply::ImageGenerated { url },
            ),
            Err(e @ NexoraError::MalformedResponse(_)) => {
                tracing::warn!("image response had no URL: {}", e);
                (
                    Message::assistant(IMAGE_UNAVAILABLE_MESSAGE),
                    Reply::ImageFailed(e),
                )
            }
            Err(e) => {
                tracing::error!("image generation error: {}", e);
                (Message::assistant(IMAGE_ERROR_MESSAGE), Reply::ImageFailed(e))
            }
        };

        let session_id = append(&mut self.store, message.clone(), &mut persistence_error);
        Ok(Exchange {
            session_id,
            message,
            reply,
            persistence_error,
        })
    }
}

/// Append through the store, keeping the first persistence failure
fn append(
    store: &mut ChatStore,
    message: Message,
    persistence_error: &mut Option<NexoraError>,
) -> String {
    match store.add_message(message) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("failed to save chat history: {}", e);
            persistence_error.get_or_insert(e);
            store
                .current_session_id()
                .map(str::to_string)
                .unwrap_or_default()
        }
    }
}
