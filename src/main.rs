use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy::primitives::B256;
use alloy::rpc::types::BlockNumberOrTag;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use stakekit::config::{self, Config};
use stakekit::domain::{decode_compressed_abi, relay_confirmations, SupportsPastEventQuery};
use stakekit::infrastructure::{
    create_provider, Confirmation, EthereumProvider, EventQuery, PendingTransaction, ProviderConfig,
};

#[derive(Debug, Parser)]
#[command(
    name = "stakekit",
    version,
    about = "Query versioned staking contracts and decode their compressed ABIs"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long, global = true)]
    ipc: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a base64, deflate-compressed ABI and print it as JSON
    Abi {
        /// File holding the blob, or `-` for stdin
        input: PathBuf,
    },
    /// List the deployed versions of a configured contract
    Versions {
        /// Deployment name from the config file
        name: String,
    },
    /// Print past events of a configured contract as JSON lines
    Events {
        /// Deployment name from the config file
        name: String,
        /// Event name (e.g. Deposit)
        event: String,
        #[arg(long)]
        from_block: Option<u64>,
        #[arg(long)]
        to_block: Option<u64>,
        /// Only query this version (1 = oldest); all versions by default
        #[arg(long)]
        version: Option<usize>,
    },
    /// Wait for a transaction to be confirmed, printing each confirmation
    Wait {
        tx_hash: B256,
        /// Confirmations to wait for (defaults to the config value)
        #[arg(long)]
        confirmations: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = config::load();

    match &args.command {
        Command::Abi { input } => print_abi(input),
        Command::Versions { name } => {
            let deployment = config
                .deployment(name)
                .with_context(|| format!("unknown deployment '{}'", name))?;
            for (version, address) in deployment.parsed_addresses()?.iter().enumerate() {
                println!("{}\t{}", version + 1, address);
            }
            Ok(())
        }
        Command::Events {
            name,
            event,
            from_block,
            to_block,
            version,
        } => {
            let provider = connect(&args, &config).await?;
            let deployment = config
                .deployment(name)
                .with_context(|| format!("unknown deployment '{}'", name))?;
            let versions = deployment.version_set(provider)?;

            let mut query = EventQuery::default();
            if let Some(block) = from_block {
                query = query.from_block(*block);
            }
            query = query.to_block(to_block.map_or(BlockNumberOrTag::Latest, Into::into));

            let events = match version {
                Some(v) => versions.at(*v)?.get_past_events(event, &query).await?,
                None => versions.get_past_events(event, &query).await?,
            };
            info!(count = events.len(), deployment = %name, event = %event, "fetched events");

            for decoded in &events {
                println!("{}", serde_json::to_string(decoded)?);
            }
            Ok(())
        }
        Command::Wait {
            tx_hash,
            confirmations,
        } => {
            let provider = connect(&args, &config).await?;
            let pending = PendingTransaction::new(provider, *tx_hash)
                .with_required_confirmations(confirmations.unwrap_or(config.confirmations))
                .with_poll_interval(config.poll_interval());
            let pending = relay_confirmations(
                pending,
                Some(Box::new(|c: &Confirmation| {
                    println!("confirmation {} (block {:?})", c.number, c.receipt.block_number);
                })),
            );

            let receipt = pending.confirmed().await?;
            info!(tx = %tx_hash, status = receipt.status(), "transaction confirmed");
            Ok(())
        }
    }
}

fn print_abi(input: &Path) -> Result<()> {
    let blob = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read ABI blob from stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?
    };

    let abi = decode_compressed_abi(&blob)?;
    println!("{}", serde_json::to_string_pretty(&abi)?);
    Ok(())
}

/// Command-line endpoint flags win over the config file
fn endpoint_from_args_and_config(args: &Args, config: &Config) -> Result<ProviderConfig> {
    if let Some(ipc) = &args.ipc {
        #[cfg(unix)]
        return Ok(ProviderConfig::Ipc(ipc.clone()));
        #[cfg(not(unix))]
        bail!("IPC is only supported on Unix ({})", ipc.display());
    }
    if let Some(ws) = &args.ws {
        return Ok(ProviderConfig::WebSocket(ws.clone()));
    }
    if let Some(rpc) = &args.rpc {
        return Ok(ProviderConfig::Http(rpc.clone()));
    }
    match &config.rpc {
        Some(endpoint) => Ok(ProviderConfig::from_endpoint(endpoint)),
        None => bail!("no endpoint: pass --rpc/--ws/--ipc or set `rpc` in the config file"),
    }
}

async fn connect(args: &Args, config: &Config) -> Result<Arc<dyn EthereumProvider>> {
    let endpoint = endpoint_from_args_and_config(args, config)?;
    debug!(endpoint = %endpoint.display(), "connecting");
    let provider = create_provider(endpoint).await?;
    let chain_id = provider.chain_id().await.context("query chain id")?;
    info!(chain_id, endpoint = %provider.endpoint_name(), "connected");
    Ok(Arc::from(provider))
}
