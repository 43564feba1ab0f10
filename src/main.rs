//! docchat - session controller for a document-chat service
//!
//! Thin interactive shell over the controller: upload a PDF, pick an agent
//! mode, chat, reset. All session logic lives in the library modules; this
//! file only parses commands and prints turns.

mod client;
mod config;
mod controller;
mod conversation;
mod session;

use client::HttpChatService;
use config::AppConfig;
use controller::{ChatController, ControllerError};
use conversation::{Role, Turn};
use session::AgentMode;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "commands:
  /upload <path>   upload a PDF and start a session
  /mode <m>        select agent mode (auto, qa, summarize, ppt)
  /reset           discard the session and start over
  /status          show session status
  /help            show this help
  /quit            exit
anything else is sent as a chat message";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(base_url = %config.base_url, "starting docchat");

    let service = HttpChatService::new(&config.base_url, config.timeout);
    if let Err(err) = service.health_check().await {
        tracing::warn!(error = %err, base_url = %config.base_url,
            "document-chat service is unreachable; commands will fail until it is up");
    }

    let controller = ChatController::with_reset_policy(service, config.reset_policy);

    println!("docchat - upload a PDF with /upload <path>, /help for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };

        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/status" => print_status(&controller),
            "/reset" => match controller.reset_session().await {
                Ok(()) => println!("session reset; upload a new document to continue"),
                Err(err) => print_error(&err),
            },
            command if command.starts_with("/mode") => {
                handle_mode(&controller, command.trim_start_matches("/mode").trim());
            }
            command if command.starts_with("/upload") => {
                handle_upload(&controller, command.trim_start_matches("/upload").trim()).await;
            }
            command if command.starts_with('/') => {
                println!("unknown command: {command} (/help for commands)");
            }
            message => match controller.send(message).await {
                Ok(turn) => print_turn(&turn),
                Err(err) => print_error(&err),
            },
        }
    }

    Ok(())
}

fn handle_mode(controller: &ChatController<HttpChatService>, arg: &str) {
    if arg.is_empty() {
        println!(
            "current mode: {} (available: auto, qa, summarize, ppt)",
            controller.agent_mode()
        );
        return;
    }
    match arg.parse::<AgentMode>() {
        Ok(mode) => match controller.select_agent_mode(mode) {
            Ok(()) => println!("agent mode set to {mode}"),
            Err(err) => print_error(&err),
        },
        Err(err) => println!("error: {err}"),
    }
}

async fn handle_upload(controller: &ChatController<HttpChatService>, path: &str) {
    if path.is_empty() {
        println!("usage: /upload <path-to-pdf>");
        return;
    }
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            println!("error: cannot read {path}: {err}");
            return;
        }
    };
    let filename = Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned());

    match controller.upload(bytes, &filename).await {
        Ok(()) => println!("uploaded {filename}; session ready"),
        Err(err) => print_error(&err),
    }
}

fn print_status(controller: &ChatController<HttpChatService>) {
    match controller.document_filename() {
        Some(filename) => println!(
            "status: {} | document: {filename} | mode: {} | turns: {}",
            controller.status(),
            controller.agent_mode(),
            controller.turns().len()
        ),
        None => println!("status: empty | no document uploaded"),
    }
}

fn print_turn(turn: &Turn) {
    let speaker = match turn.role {
        Role::User => "you",
        Role::Bot => "bot",
    };
    match &turn.produced_by_agent {
        Some(agent) => println!("[{}] {speaker} ({agent}): {}", turn.timestamp, turn.text),
        None => println!("[{}] {speaker}: {}", turn.timestamp, turn.text),
    }
    if let Some(attachment) = &turn.attachment {
        println!("  generated file: {attachment}");
    }
}

fn print_error(err: &ControllerError) {
    println!("error: {err}");
}
