use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use huddle_client::{
    ClientConfig, ClientError, ClientEvent, RTPCodecType, SessionState, SignalingClient,
    WebRtcEngineFactory,
};
use huddle_core::IceServerConfig;
use huddle_server::RelayConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", version, about = "Room-based WebRTC signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "HUDDLE_BIND")]
        bind: Option<SocketAddr>,

        /// Directory served for non-WebSocket requests.
        #[arg(long, env = "HUDDLE_STATIC_DIR")]
        static_dir: Option<PathBuf>,

        #[arg(long)]
        turn_url: Option<String>,

        #[arg(long, requires = "turn_url")]
        turn_username: Option<String>,

        #[arg(long, requires = "turn_url")]
        turn_credential: Option<String>,
    },

    /// Join a room as a receive-only peer and report what happens.
    Join {
        #[arg(long, default_value = "ws://127.0.0.1:3000/ws")]
        url: String,

        #[arg(short, long)]
        room: Option<String>,

        #[arg(short, long)]
        username: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        let usage = matches!(e.downcast_ref::<ClientError>(), Some(ClientError::Usage(_)));
        std::process::exit(if usage { 2 } else { 1 });
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            bind,
            static_dir,
            turn_url,
            turn_username,
            turn_credential,
        } => {
            let mut config = RelayConfig::from_env()?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }
            if let Some(url) = turn_url {
                config.ice_servers.push(IceServerConfig {
                    urls: vec![url],
                    username: turn_username,
                    credential: turn_credential,
                });
            }

            println!(
                "{} {}",
                "Relay listening on".green().bold(),
                format!("ws://{}/ws", config.bind).cyan()
            );
            huddle_server::serve(config).await?;
        }

        Commands::Join {
            url,
            room,
            username,
        } => {
            let room = match room {
                Some(room) => room,
                None => prompt("Room")?,
            };
            let username = match username {
                Some(username) => username,
                None => prompt("Username")?,
            };
            join(ClientConfig::new(url, room, username)).await?;
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("Failed to read {}", label.to_lowercase()))
}

async fn join(config: ClientConfig) -> Result<()> {
    config.validate()?;

    let factory = WebRtcEngineFactory::new()?
        .receive_only(&[RTPCodecType::Audio, RTPCodecType::Video]);
    let room = config.room.clone();
    let (client, mut events) = SignalingClient::connect(config, factory).await?;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ClientEvent::Welcome { id } => {
                    println!("{} {} as {}", "Joined".green().bold(), room.cyan(), id);
                }
                ClientEvent::PeerJoined { id, username } => {
                    println!("{} {} ({})", "+".green(), username.bold(), id);
                }
                ClientEvent::SessionStateChanged { peer, state } => {
                    let state = match state {
                        SessionState::Connected => "connected".green(),
                        SessionState::Closed => "closed".red(),
                        other => format!("{other:?}").to_lowercase().as_str().yellow(),
                    };
                    println!("  {} {}", peer, state);
                }
                ClientEvent::RemoteTrack { peer, track } => {
                    println!("  {} {} track from {}", "♪".cyan(), track.kind(), peer);
                }
                ClientEvent::PeerClosed { peer } => {
                    println!("{} {}", "-".red(), peer);
                }
            }
        }
    });

    client
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    println!("{}", "Left the room".yellow());
    Ok(())
}
