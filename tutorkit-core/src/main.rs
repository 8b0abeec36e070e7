//! Tutorkit console client - main entry point
//!
//! Development harness that drives a tutoring session from stdin against a
//! live backend: lines become learner sends, `/go` is the go-on affordance,
//! and broadcast session events print as a transcript. Runs headless with
//! no notebook or player attached.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutorkit_common::config::resolve_backend_url;
use tutorkit_common::events::SessionEvent;
use tutorkit_core::gateway::{HttpGateway, DEFAULT_TIMEOUT};
use tutorkit_core::notebook::{NullClock, NullNotebook};
use tutorkit_core::{ConversationLog, SessionCommand, SessionEngine, SharedState};

/// Command-line arguments for the tutorkit console client
#[derive(Parser, Debug)]
#[command(name = "tutorkit")]
#[command(about = "Console client for the tutorkit tutoring backend")]
#[command(version)]
struct Args {
    /// Backend base URL (falls back to config file, then the default)
    #[arg(short, long, env = "TUTORKIT_BACKEND_URL")]
    backend_url: Option<String>,

    /// Learner identifier
    #[arg(short, long, env = "TUTORKIT_USER", default_value = "learner")]
    user: String,

    /// Video to select immediately instead of typing its id
    #[arg(long)]
    video: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorkit_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let backend_url = resolve_backend_url(args.backend_url.as_deref());
    info!(backend_url, user = args.user, "starting tutorkit console client");

    let gateway =
        HttpGateway::new(&backend_url, DEFAULT_TIMEOUT).context("failed to build gateway")?;

    let state = Arc::new(SharedState::new(args.user));
    let log = Arc::new(ConversationLog::new());
    let engine = Arc::new(SessionEngine::new(
        Arc::clone(&state),
        Arc::clone(&log),
        Arc::new(gateway),
        Arc::new(NullNotebook),
        Arc::new(NullClock),
    ));

    let mut events = state.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            print_event(&event);
        }
    });

    engine.start().await;
    let commands = engine.command_sender();

    {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.run().await });
    }

    if let Some(video) = args.video {
        commands
            .send(SessionCommand::LearnerSend { text: video })
            .context("engine stopped")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("stdin closed")? {
        let line = line.trim().to_string();
        match line.as_str() {
            "/quit" => break,
            "/go" => commands
                .send(SessionCommand::GoOn)
                .context("engine stopped")?,
            "" => continue,
            _ => commands
                .send(SessionCommand::LearnerSend { text: line })
                .context("engine stopped")?,
        }
    }

    info!("session ended");
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::TurnAppended { turn, .. } => {
            if !turn.text.trim().is_empty() {
                if let Some(segment) = &turn.segment {
                    println!("--- {} ---", segment.category);
                }
                println!("[{}] {}", turn.sender, turn.text);
            }
            if let Some(code) = &turn.code {
                println!("    | {}", code.replace('\n', "\n    | "));
            }
        }
        SessionEvent::TypingChanged { typing: true, .. } => println!("(tutor is typing...)"),
        SessionEvent::AdvanceGateChanged { may_advance: true, .. } => {
            println!("(you may go on: /go)")
        }
        SessionEvent::CodeCellInserted { code, .. } => {
            println!("(inserted into notebook)\n    | {}", code.replace('\n', "\n    | "));
        }
        _ => {}
    }
}
