use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use pingwire::client::{DEFAULT_SERVER_URL, EngineConfig, PingEngine};
use pingwire::model::{DEFAULT_STUN_SERVERS, IceServerConfig};
use pingwire::server::{ServerConfig, TransportConfig, serve};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pingwire")]
#[command(about = "WebRTC data channel ping/pong over WebSocket signaling")]
struct Cli {
    /// Log filter, e.g. `info` or `pingwire_server=debug`. RUST_LOG wins if set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Applied to every `turn:`/`turns:` url in `--ice-servers`.
#[derive(clap::Args, Debug, Default)]
struct TurnAuth {
    #[arg(long, env = "PINGWIRE_ICE_USERNAME", requires = "ice_credential")]
    ice_username: Option<String>,

    #[arg(long, env = "PINGWIRE_ICE_CREDENTIAL", requires = "ice_username")]
    ice_credential: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server and answer every PING with PONG
    Serve {
        #[arg(long, env = "PINGWIRE_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        /// Comma separated STUN/TURN urls. Pass an empty string for host candidates only.
        /// TURN urls take `--ice-username` and `--ice-credential`.
        #[arg(
            long,
            env = "PINGWIRE_ICE_SERVERS",
            value_delimiter = ',',
            default_values_t = DEFAULT_STUN_SERVERS.map(String::from).to_vec()
        )]
        ice_servers: Vec<String>,

        #[command(flatten)]
        auth: TurnAuth,
    },

    /// Connect to a server, send PING and print the reply
    Ping {
        #[arg(long, env = "PINGWIRE_URL", default_value = DEFAULT_SERVER_URL)]
        url: String,

        #[arg(long, env = "PINGWIRE_ICE_SERVERS", value_delimiter = ',')]
        ice_servers: Vec<String>,

        #[command(flatten)]
        auth: TurnAuth,

        /// Seconds to wait for the channel to open and for the reply
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn ice_config(urls: Vec<String>, auth: &TurnAuth) -> Vec<IceServerConfig> {
    urls.into_iter()
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .map(|url| match (&auth.ice_username, &auth.ice_credential) {
            (Some(username), Some(credential)) if url.starts_with("turn") => {
                IceServerConfig::turn(url, username.as_str(), credential.as_str())
            }
            _ => IceServerConfig::stun(url),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Serve {
            bind,
            ice_servers,
            auth,
        } => {
            let config = ServerConfig {
                bind_addr: bind,
                transport: TransportConfig {
                    ice_servers: ice_config(ice_servers, &auth),
                },
            };

            serve(config).await?;
            println!("{}", "Server stopped".cyan());
        }

        Commands::Ping {
            url,
            ice_servers,
            auth,
            timeout,
        } => {
            let timeout = Duration::from_secs(timeout);
            let mut config = EngineConfig {
                url,
                ..Default::default()
            };
            if !ice_servers.is_empty() {
                config.ice_servers = ice_config(ice_servers, &auth);
            }

            println!("{} {}", "🔌 Connecting to".cyan(), config.url);
            let engine = PingEngine::connect(config).await?;
            engine
                .wait_connected(timeout)
                .await
                .context("Data channel did not open")?;

            let reply = engine.ping(timeout).await?;
            println!("{} {}", "✨ Reply:".green().bold(), reply);

            engine.close().await?;
        }
    }

    Ok(())
}
