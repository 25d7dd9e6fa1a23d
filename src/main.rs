use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

use flipit_client::config::Config;
use flipit_client::wallet::{UpdateWalletRequest, WalletApi};
use flipit_client::{ApiClient, RequestOptions};

#[derive(Parser, Debug)]
#[command(name = "flipit")]
#[command(about = "Command-line client for the Flipit ad-credit claim API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/flipit/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base URL, overriding config and FLIPIT_API_URL
  #[arg(long)]
  base_url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show profile and node counts for a wallet
  Wallet { address: String },

  /// Show node ownership history for a wallet
  Transactions { address: String },

  /// Create or update the profile stored for a wallet
  UpdateWallet {
    #[arg(long)]
    address: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    nick_name: Option<String>,
    /// Two-letter ISO country code
    #[arg(long)]
    country: Option<String>,
  },

  /// Register a contact email for a wallet
  SubmitEmail { email: String, address: String },

  /// Fetch any endpoint and print its data payload
  Get {
    /// Path appended to the base URL, e.g. /wallet/0x...
    endpoint: String,
    /// Do not send or update ETag validators
    #[arg(long)]
    skip_cache: bool,
    #[arg(long)]
    max_retries: Option<u32>,
  },

  /// Manage the local response cache
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
  /// Delete every stored response
  Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?
    .with_base_url_override(args.base_url)
    .validated()?;

  let _log_guard = flipit_client::logging::init(&config.logging)?;
  debug!(base_url = %config.api.base_url, "configuration loaded");

  let client = ApiClient::from_config(&config)?;
  let wallets = WalletApi::new(client.clone());

  match args.command {
    Command::Wallet { address } => print_json(&wallets.get_wallet_details(&address).await?)?,
    Command::Transactions { address } => {
      print_json(&wallets.get_wallet_transactions(&address).await?)?
    }
    Command::UpdateWallet {
      address,
      email,
      first_name,
      last_name,
      nick_name,
      country,
    } => {
      let request = UpdateWalletRequest {
        address,
        email,
        first_name,
        last_name,
        nick_name,
        country,
      };
      print_json(&wallets.update_wallet_details(&request).await?)?
    }
    Command::SubmitEmail { email, address } => {
      wallets.submit_email(&email, &address).await?;
      println!("Email submitted for {}", address);
    }
    Command::Get {
      endpoint,
      skip_cache,
      max_retries,
    } => {
      let mut options = RequestOptions::get();
      options.skip_cache = skip_cache;
      options.max_retries = max_retries;

      let fetched = client.request_with_source::<Value>(&endpoint, options).await?;
      let budget = client.rate_limit_status();
      info!(
        source = %fetched.source,
        ratelimit_remaining = budget.remaining,
        "response received"
      );
      print_json(&fetched.data)?
    }
    Command::Cache {
      action: CacheAction::Clear,
    } => {
      let removed = client.cache().clear()?;
      println!("Removed {} cached responses", removed);
    }
  }

  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
