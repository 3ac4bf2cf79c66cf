use clap::{Parser, Subcommand, ValueEnum};
use hashchain::{Chain, ChainConfig, LedgerStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "hashchain",
    version,
    about = "Hash-chained, append-only ledger with tamper detection"
)]
struct Cli {
    /// Ledger directory (default: ./hashchain.ledger)
    #[arg(long, default_value = "hashchain.ledger")]
    ledger: PathBuf,

    /// Reject payloads larger than this many bytes
    #[arg(long, env = "HASHCHAIN_MAX_PAYLOAD")]
    max_payload: Option<usize>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a ledger with a genesis block
    Init,
    /// Append a block
    Append { data: String },
    /// Show a block as JSON
    Get { index: u64 },
    /// Print the number of blocks
    Len,
    /// Show blocks, newest first
    Log {
        /// Max entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Replay every hash and link
    Verify,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// `Ok(false)` means the command ran but the process should exit non-zero.
type CmdResult = Result<bool, Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config = ChainConfig {
        max_payload_size: cli.max_payload,
        ..ChainConfig::default()
    };

    let result = match cli.command {
        Commands::Init => cmd_init(&cli.ledger, config),
        Commands::Append { data } => cmd_append(&cli.ledger, config, &data),
        Commands::Get { index } => cmd_get(&cli.ledger, config, index),
        Commands::Len => cmd_len(&cli.ledger, config),
        Commands::Log { limit } => cmd_log(&cli.ledger, config, limit),
        Commands::Verify => cmd_verify(&cli.ledger, config),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load the ledger in `dir`. With `create`, a missing ledger is started with a
/// persisted genesis block; otherwise a missing ledger is an error.
fn open_chain(
    dir: &Path,
    config: ChainConfig,
    create: bool,
) -> Result<(LedgerStore, Chain), Box<dyn std::error::Error>> {
    let store = if create {
        LedgerStore::open(dir)?
    } else {
        LedgerStore::open_existing(dir)?
    };
    let blocks = store.load()?;
    let chain = if blocks.is_empty() && create {
        let chain = Chain::new(config);
        store.append(&chain.genesis()?)?;
        chain
    } else {
        Chain::from_blocks(config, blocks)?
    };
    Ok((store, chain))
}

fn cmd_init(dir: &Path, config: ChainConfig) -> CmdResult {
    let existed = LedgerStore::open(dir)?.exists();
    let (_, chain) = open_chain(dir, config, true)?;
    if existed {
        println!("Ledger already initialized at {} ({} blocks)", dir.display(), chain.len());
    } else {
        println!("Initialized ledger at {}", dir.display());
    }
    Ok(true)
}

fn cmd_append(dir: &Path, config: ChainConfig, data: &str) -> CmdResult {
    let (store, chain) = open_chain(dir, config, true)?;
    let block = chain.append(data)?;
    store.append(&block)?;
    println!("[{}] {}", block.index(), block.hash());
    Ok(true)
}

fn cmd_get(dir: &Path, config: ChainConfig, index: u64) -> CmdResult {
    let (_, chain) = open_chain(dir, config, false)?;
    let block = chain.get(index)?;
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(true)
}

fn cmd_len(dir: &Path, config: ChainConfig) -> CmdResult {
    let (_, chain) = open_chain(dir, config, false)?;
    println!("{}", chain.len());
    Ok(true)
}

fn cmd_log(dir: &Path, config: ChainConfig, limit: usize) -> CmdResult {
    let (_, chain) = open_chain(dir, config, false)?;
    for block in chain.blocks().iter().rev().take(limit) {
        println!(
            "{} {} {} {}",
            block.index(),
            block.hash().get(..8).unwrap_or(block.hash()),
            block.timestamp().format("%Y-%m-%d %H:%M:%S"),
            String::from_utf8_lossy(block.data()),
        );
    }
    Ok(true)
}

fn cmd_verify(dir: &Path, config: ChainConfig) -> CmdResult {
    let (_, chain) = open_chain(dir, config, false)?;
    let result = chain.verify();
    println!("{}", result);
    Ok(result.is_valid())
}
