pub const DEFAULT_API_ENDPOINT: &str = "https://api.together.xyz/v1/chat/completions";
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://api.together.xyz/v1/images/generations";
pub const DEFAULT_PRIMARY_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_BACKUP_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";
pub const DEFAULT_VOICE_ID: &str = "9BWtsMINqrJLrRacOk9x";
pub const DEFAULT_SPEECH_MODEL: &str = "eleven_v3";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Nexora AI, an advanced artificial intelligence assistant.

**Core Capabilities:**
- Advanced reasoning and problem-solving
- Expert programming assistance across all languages
- Technical analysis and detailed explanations
- Creative writing and content generation
- Mathematical and scientific problem solving

**Response Style:**
- Provide comprehensive, well-structured answers
- Use examples and code snippets when helpful
- Maintain conversational context from previous messages
- Be concise yet thorough

**Guidelines:**
- Be accurate, helpful, and professional
- Ask clarifying questions when needed
- Acknowledge limitations honestly
- Use markdown formatting for better readability";

pub fn default_temperature() -> f32 {
    0.8
}

pub fn default_top_p() -> f32 {
    1.0
}

pub fn default_max_tokens() -> u32 {
    3500
}

/// Number of prior messages sent as conversation history
pub fn default_context_window() -> usize {
    16
}

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_image_width() -> u32 {
    512
}

pub fn default_image_height() -> u32 {
    512
}

pub fn default_image_steps() -> u32 {
    4
}
