use anyhow::{Context, Result};
use clap::Parser;
use hashchain_core::{
    constants::{DEFAULT_DIFFICULTY, GENESIS_PAYLOAD},
    Chain, ChainConfig, MiningStrategy,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hashchain-cli")]
#[command(about = "Mine a small proof-of-work hash chain and print it")]
struct Cli {
    /// Required number of leading zero hex digits per block hash
    #[arg(short, long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    /// Payload of the first block
    #[arg(long, default_value = GENESIS_PAYLOAD)]
    genesis: String,

    /// Spread the nonce search over all cores
    #[arg(long)]
    parallel: bool,

    /// Print blocks as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Payloads to append, in order
    #[arg(default_values_t = [
        "Sending 1 ETH to Charles".to_string(),
        "Sending 3 ETH to Alice".to_string(),
    ])]
    payloads: Vec<String>,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let strategy = if cli.parallel {
        MiningStrategy::Parallel
    } else {
        MiningStrategy::Sequential
    };

    let mut chain = Chain::with_config(ChainConfig {
        difficulty: cli.difficulty,
        genesis_payload: cli.genesis.into_bytes(),
        strategy,
    })
    .context("creating chain")?;

    for payload in cli.payloads {
        chain.append(payload);
    }
    info!(blocks = chain.len(), "mining finished");

    let valid = chain.validate();
    if cli.json {
        let out = serde_json::json!({
            "difficulty": chain.difficulty(),
            "blocks": chain.summaries(),
            "valid": valid,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for row in chain.summaries() {
            println!("Block {}", row.index);
            println!("PrevHash: {}", row.prev_hash);
            println!("Data: {}", row.payload);
            println!("Nonce: {}", row.nonce);
            println!("Hash: {}\n", row.hash);
        }
        println!("Blockchain valid? {valid}");
    }
    Ok(())
}
