use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "nexora")]
#[command(about = "Nexora AI chat client with persistent conversations", long_about = None)]
pub struct Args {
    #[arg(short = 'n', long = "new", help = "Start a new conversation")]
    pub new_conversation: bool,

    #[arg(short = 'l', long = "list", help = "List saved conversations")]
    pub list: bool,

    #[arg(long = "show", help = "Print the messages of the current conversation")]
    pub show: bool,

    #[arg(long = "switch", value_name = "ID", help = "Make another conversation current")]
    pub switch: Option<String>,

    #[arg(long = "delete", value_name = "ID", help = "Delete a conversation")]
    pub delete: Option<String>,

    #[arg(
        long = "rename",
        num_args = 2,
        value_names = ["ID", "TITLE"],
        help = "Rename a conversation"
    )]
    pub rename: Option<Vec<String>>,

    #[arg(long = "clear", help = "Clear all conversation history")]
    pub clear_history: bool,

    #[arg(long = "yes", help = "Skip the confirmation prompt for --clear")]
    pub assume_yes: bool,

    #[arg(long = "export", value_name = "PATH", help = "Export chat history as JSON")]
    pub export: Option<PathBuf>,

    #[arg(short = 'i', long = "image", help = "Generate an image from the prompt")]
    pub image: bool,

    #[arg(
        long = "speak",
        value_name = "PATH",
        help = "Save the latest reply as speech (MP3) to PATH"
    )]
    pub speak: Option<PathBuf>,

    #[arg(long = "login", help = "Sign in with Google")]
    pub login: bool,

    #[arg(long = "logout", help = "Sign out")]
    pub logout: bool,

    #[arg(long = "whoami", help = "Show the signed-in user")]
    pub whoami: bool,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostic logs")]
    pub verbose: bool,

    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(long = "model", help = "Override the primary model")]
    pub model: Option<String>,

    #[arg(help = "Message to send to Nexora")]
    pub prompt: Vec<String>,
}

impl Args {
    /// Positional words joined into one prompt, trimmed
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ").trim().to_string()
    }
}
