//! Chat Sessions - terminal client for a single-turn inference backend
//!
//! Keeps several saved conversations, persists them across restarts, and
//! manages one in-flight request per conversation.

mod backend;
mod cli;
mod config;
mod controller;
mod render;
mod runtime;
mod session;

use backend::{find_model, HttpInferenceClient, LoggingClient};
use cli::{read_input_line, Command, HELP};
use config::Config;
use controller::{ConversationController, Event, ViewModel};
use runtime::ChatRuntime;
use session::{JsonFileStore, SessionId, SessionStore};
use std::io::Write;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_sessions=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        backend = %config.backend_url,
        data_dir = %config.data_dir.display(),
        timeout_secs = config.request_timeout.as_secs(),
        "Configuration loaded"
    );

    std::fs::create_dir_all(&config.data_dir)?;
    let store = SessionStore::open(Arc::new(JsonFileStore::new(&config.data_dir)));

    let client = LoggingClient::new(HttpInferenceClient::new(
        config.backend_url.clone(),
        config.request_timeout,
    )?);
    let controller = ConversationController::new(store).with_model(config.model.clone());
    let runtime = ChatRuntime::new(controller, client, config.request_timeout);

    let events = runtime.sender();
    let view = runtime.subscribe();
    let shutdown = CancellationToken::new();

    print_flush(&render::render_transcript(&view.borrow()));
    let renderer = tokio::spawn(render_loop(view.clone()));
    let runner = tokio::spawn(runtime.run(shutdown.clone()));

    let mut stdin = BufReader::new(tokio::io::stdin());
    loop {
        let line = match read_input_line(&mut stdin).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input, shutting down");
                break;
            }
        };
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if !run_command(command, &events, &view).await {
                    break;
                }
            }
            Err(e) => print_flush(&format!("{e}\n")),
        }
    }

    shutdown.cancel();
    runner.await?;
    renderer.await?;
    Ok(())
}

/// Translate one REPL command. Returns false once the runtime is gone.
async fn run_command(
    command: Command,
    events: &mpsc::Sender<Event>,
    view: &watch::Receiver<ViewModel>,
) -> bool {
    let event = match command {
        Command::Send(text) => Event::UserMessage { text },
        Command::NewChat => Event::NewChat,
        Command::Switch(id) => {
            let id = SessionId::new(id);
            if !view.borrow().sessions.iter().any(|s| s.id == id) {
                print_flush(&format!("no chat {id}, see /list\n"));
                return true;
            }
            Event::SwitchSession { id }
        }
        Command::Clear => {
            let Some(id) = view.borrow().active_id.clone() else {
                return true;
            };
            Event::ClearSession { id }
        }
        Command::Model(None) => {
            print_flush(&render::render_models(view.borrow().model.as_deref()));
            return true;
        }
        Command::Model(Some(name)) if name == "default" => Event::SelectModel { model: None },
        Command::Model(Some(name)) => {
            if find_model(&name).is_none() {
                print_flush(&format!("unknown model {name}, see /model\n"));
                return true;
            }
            Event::SelectModel { model: Some(name) }
        }
        Command::ListSessions => {
            print_flush(&render::render_sessions(&view.borrow()));
            return true;
        }
        Command::Cancel => Event::CancelTurn,
        Command::Help => {
            print_flush(&format!("{HELP}\n"));
            return true;
        }
        Command::Quit => return false,
    };

    events.send(event).await.is_ok()
}

/// Print transcript changes until the runtime drops its view sender
async fn render_loop(mut view: watch::Receiver<ViewModel>) {
    let mut shown = view.borrow_and_update().clone();
    while view.changed().await.is_ok() {
        let next = view.borrow_and_update().clone();
        print_flush(&render::render_update(&shown, &next));
        shown = next;
    }
}

fn print_flush(text: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        tracing::debug!(error = %e, "Failed to write to stdout");
    }
}
