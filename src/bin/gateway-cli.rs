use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use fleetbite_gateway::config::load_config;
use fleetbite_gateway::security::tokens::TokenIssuer;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the FleetBite API gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a bearer token signed with the gateway secret
    Token {
        /// Subject (user ID) placed in `sub`
        #[arg(short, long)]
        subject: String,

        /// Role to include; repeat for several
        #[arg(short, long = "role")]
        roles: Vec<String>,

        /// Lifetime in seconds; defaults to the configured expiry
        #[arg(long)]
        ttl: Option<u64>,

        /// Gateway configuration file
        #[arg(short, long, env = "GW_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Query a health endpoint and print its JSON
    Probe {
        #[arg(value_enum, default_value_t = Probe::Live)]
        kind: Probe,

        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Probe {
    Live,
    Ready,
}

impl Probe {
    fn path(self) -> &'static str {
        match self {
            Probe::Live => "/health/live",
            Probe::Ready => "/health/ready",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Token {
            subject,
            roles,
            ttl,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(ttl) = ttl {
                config.auth.token_expiry_secs = ttl;
            }
            let issuer = TokenIssuer::from_config(&config.auth)?;
            println!("{}", issuer.issue(&subject, roles)?);
        }
        Commands::Probe { kind, url } => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()?;
            let res = client
                .get(format!("{}{}", url.trim_end_matches('/'), kind.path()))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
