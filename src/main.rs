use clap::Parser;
use colored::*;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nexora::api::{
    CompletionClient, CompletionSettings, HttpTransport, ImageClient, SpeechClient, Transport,
};
use nexora::auth::{AccountManager, AuthProvider, GoogleDeviceAuth, USER_STORAGE_KEY};
use nexora::cli::Args;
use nexora::config::Config;
use nexora::error::{NexoraError, Result};
use nexora::models::Role;
use nexora::orchestrator::ChatController;
use nexora::session::{
    default_storage_dir, ChatStore, FilesystemStorage, StateStorage, CHAT_STORE_KEY,
};
use nexora::ui::{
    display_exchange, display_notice, display_session_list, display_transcript, display_warning,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load configuration
    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    init_tracing(config.verbose);

    if let Err(e) = run(args, config).await {
        eprintln!("{} {}", "Error:".red(), e);
        eprintln!(
            "{}",
            "Your chat history is intact; fix the problem above and run the command again."
                .dimmed()
        );
        process::exit(1);
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "nexora=debug" } else { "nexora=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run(args: Args, config: Config) -> Result<()> {
    let storage_dir = match &config.storage_dir {
        Some(dir) => dir.clone(),
        None => default_storage_dir()?,
    };

    if args.login || args.logout || args.whoami {
        return run_account(&args, &config, &storage_dir).await;
    }

    let mut store = open_store(&storage_dir);
    let mut did_something = false;

    // Handle --clear option
    if args.clear_history {
        did_something = true;
        if args.assume_yes || confirm("Delete all conversations? This cannot be undone.")? {
            report_persist(store.clear_all_chats());
            println!("{}", "All conversation history cleared.".green());
        } else {
            println!("{}", "Nothing was deleted.".dimmed());
        }
    }

    if let Some(id) = &args.delete {
        did_something = true;
        match store.delete_session(id) {
            Ok(true) => println!("{}", format!("Deleted {}", id).green()),
            Ok(false) => display_notice("Not found", &format!("No conversation with id {}", id)),
            Err(e) => display_warning(&format!("Deleted, but not saved: {}", e)),
        }
    }

    if let Some(id) = &args.switch {
        did_something = true;
        match store.switch_session(id) {
            Ok(true) => println!("{}", format!("Switched to {}", id).green()),
            Ok(false) => display_notice("Not found", &format!("No conversation with id {}", id)),
            Err(e) => display_warning(&format!("Switched, but not saved: {}", e)),
        }
    }

    if let Some([id, title]) = args.rename.as_deref() {
        did_something = true;
        match store.update_session_title(id, title.as_str()) {
            Ok(true) => println!("{}", format!("Renamed {} to {:?}", id, title).green()),
            Ok(false) => display_notice("Not found", &format!("No conversation with id {}", id)),
            Err(e) => display_warning(&format!("Renamed, but not saved: {}", e)),
        }
    }

    if args.new_conversation {
        did_something = true;
        report_persist(store.create_new_session());
    }

    let prompt = args.prompt_text();
    if !prompt.is_empty() {
        did_something = true;
        store = send_prompt(&args, &config, store, &prompt).await?;
    }

    if let Some(path) = &args.speak {
        did_something = true;
        speak_latest_reply(&config, &store, path).await?;
    }

    if args.list {
        did_something = true;
        display_session_list(store.sessions(), store.current_session_id());
    }

    if args.show {
        did_something = true;
        match store.current_session() {
            Some(session) => display_transcript(session),
            None => println!("{}", "No current conversation.".dimmed()),
        }
    }

    if let Some(path) = &args.export {
        did_something = true;
        fs::write(path, store.export()?)?;
        println!("{}", format!("Exported chat history to {}", path.display()).green());
    }

    if !did_something {
        print_usage();
        process::exit(1);
    }

    Ok(())
}

fn open_store(storage_dir: &Path) -> ChatStore {
    let storage: Arc<dyn StateStorage> =
        Arc::new(FilesystemStorage::new(storage_dir, CHAT_STORE_KEY));
    match ChatStore::open(storage.clone()) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("starting with empty chat history: {}", e);
            display_warning(&format!("Could not load chat history ({}); starting fresh", e));
            ChatStore::empty(storage)
        }
    }
}

async fn send_prompt(
    args: &Args,
    config: &Config,
    store: ChatStore,
    prompt: &str,
) -> Result<ChatStore> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        config.api_key()?,
        config.request_timeout,
    )?);

    let completions = CompletionClient::new(
        transport.clone(),
        config.api_endpoint.clone(),
        CompletionSettings::from_config(config),
    );
    let images = ImageClient::new(transport, config.image_endpoint.clone(), config.image.clone());
    let mut controller =
        ChatController::new(store, completions, config.context_window).with_images(images);

    if config.verbose {
        eprintln!(
            "{}",
            format!(
                "[nexora] Models: {} (backup {}), context window {}",
                config.primary_model, config.backup_model, config.context_window
            )
            .dimmed()
        );
    }

    let exchange = if args.image {
        controller.generate_image(prompt).await?
    } else {
        controller.send_message(prompt).await?
    };
    display_exchange(&exchange, config.verbose);

    Ok(controller.into_store())
}

async fn speak_latest_reply(config: &Config, store: &ChatStore, path: &Path) -> Result<()> {
    let Some(settings) = config.speech.clone() else {
        return Err(NexoraError::FeatureUnavailable(
            "text-to-speech needs ELEVENLABS_API_KEY".to_string(),
        ));
    };

    let reply = store
        .current_session()
        .and_then(|session| {
            session
                .messages
                .iter()
                .rev()
                .find(|m| m.role == Role::Assistant)
        })
        .ok_or_else(|| NexoraError::Other("No assistant reply to speak".to_string()))?;

    let client = SpeechClient::new(settings, config.request_timeout)?;
    let audio = client.synthesize(&reply.content).await?;
    fs::write(path, audio)?;
    println!("{}", format!("Saved speech to {}", path.display()).green());
    Ok(())
}

async fn run_account(args: &Args, config: &Config, storage_dir: &Path) -> Result<()> {
    let storage: Arc<dyn StateStorage> =
        Arc::new(FilesystemStorage::new(storage_dir, USER_STORAGE_KEY));
    let provider = match &config.auth {
        Some(settings) => Some(Box::new(GoogleDeviceAuth::new(
            settings.clone(),
            config.request_timeout,
        )?) as Box<dyn AuthProvider>),
        None => None,
    };
    let accounts = AccountManager::new(provider, storage);

    if args.logout {
        accounts.sign_out().await?;
        println!("{}", "Signed out.".green());
    }

    if args.login {
        match accounts.sign_in().await {
            Ok(profile) => println!("{}", format!("Signed in as {}", profile.label()).green()),
            Err(e) => display_notice("Sign-in failed", &e.to_string()),
        }
    }

    if args.whoami {
        match accounts.current_user() {
            Some(profile) => {
                println!("{}", profile.label().bold());
                if let Some(email) = &profile.email {
                    println!("{}", email.dimmed());
                }
            }
            None => println!("{}", "Not signed in.".dimmed()),
        }
    }

    Ok(())
}

fn report_persist<T>(result: Result<T>) {
    if let Err(e) = result {
        display_warning(&format!("Chat history was not saved: {}", e));
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_usage() {
    eprintln!("{}", "Usage: nexora [OPTIONS] <prompt>".red());
    eprintln!("{}", "  -n, --new                  Start a new conversation".dimmed());
    eprintln!("{}", "  -i, --image                Generate an image from the prompt".dimmed());
    eprintln!("{}", "  -l, --list                 List saved conversations".dimmed());
    eprintln!("{}", "      --show                 Print the current conversation".dimmed());
    eprintln!("{}", "      --switch <ID>          Make another conversation current".dimmed());
    eprintln!("{}", "      --delete <ID>          Delete a conversation".dimmed());
    eprintln!("{}", "      --rename <ID> <TITLE>  Rename a conversation".dimmed());
    eprintln!("{}", "      --clear                Clear all conversation history".dimmed());
    eprintln!("{}", "      --export <PATH>        Export chat history as JSON".dimmed());
    eprintln!("{}", "      --speak <PATH>         Save the latest reply as speech".dimmed());
    eprintln!("{}", "      --login / --logout     Sign in or out with Google".dimmed());
    eprintln!("{}", "      --whoami               Show the signed-in user".dimmed());
}
