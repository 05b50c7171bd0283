use crate::models::{ChatSession, Message, Role};
use crate::orchestrator::{Exchange, Reply};
use colored::*;

/// Print the assistant side of an exchange
pub fn display_exchange(exchange: &Exchange, verbose: bool) {
    display_message(&exchange.message);

    match &exchange.reply {
        Reply::Answered { model, used_backup } => {
            if *used_backup {
                eprintln!(
                    "{}",
                    format!("[nexora] Answered by backup model {}", model).dimmed()
                );
            } else if verbose {
                eprintln!("{}", format!("[nexora] Answered by {}", model).dimmed());
            }
        }
        Reply::Apologized(error) => {
            display_notice(
                "Connection Error",
                "Unable to get AI response. Please try again.",
            );
            if verbose {
                eprintln!("{}", format!("[nexora] {}", error).dimmed());
            }
        }
        Reply::ImageGenerated { .. } => {}
        Reply::ImageFailed(error) => {
            display_notice("Image Error", "Unable to generate the image. Please try again.");
            if verbose {
                eprintln!("{}", format!("[nexora] {}", error).dimmed());
            }
        }
    }

    if let Some(error) = &exchange.persistence_error {
        display_warning(&format!("Chat history was not saved: {}", error));
    }
}

/// Transient, toast-style notification
pub fn display_notice(title: &str, description: &str) {
    eprintln!("{} {}", format!("{}:", title).red().bold(), description);
}

pub fn display_warning(text: &str) {
    eprintln!("{} {}", "Warning:".yellow(), text);
}

pub fn display_session_list(sessions: &[ChatSession], current: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No conversations yet.".dimmed());
        return;
    }

    for session in sessions {
        let marker = if Some(session.id.as_str()) == current {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "{} {}  {}  {}",
            marker,
            session.display_title().bold(),
            session.id.dimmed(),
            format!(
                "{} messages, updated {}",
                session.messages.len(),
                session.updated_at.format("%Y-%m-%d %H:%M")
            )
            .dimmed()
        );
    }
}

pub fn display_transcript(session: &ChatSession) {
    println!("{}", format!("── {} ──", session.display_title()).cyan());
    for message in &session.messages {
        let speaker = match message.role {
            Role::User => "You".green().bold(),
            Role::Assistant => "Nexora".cyan().bold(),
        };
        println!(
            "{} {}",
            speaker,
            message.timestamp.format("%H:%M").to_string().dimmed()
        );
        display_message(message);
        println!();
    }
}

fn display_message(message: &Message) {
    println!("{}", message.content);
    if let Some(url) = &message.image_url {
        println!("{}", url.underline().blue());
    }
}
