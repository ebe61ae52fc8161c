//! Safe console operator CLI
//!
//! Offline commands over the console configuration and the undeployed Safe
//! registry.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use safe_console_sdk::{
    affordability::{total_fee, wallet_can_pay},
    config::{ChainInfo, ConsoleConfig},
    counterfactual::{FileRegistry, UndeployedSafeRegistry},
    logging::{setup_logging, LoggingConfig},
    params::{tx_options, AdvancedParams},
    recovery::is_valid_email,
    Address, U256,
};

#[derive(Parser)]
#[command(name = "safe-console")]
#[command(about = "Safe console operator CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured chains
    Chains,

    /// Manage undeployed (counterfactual) Safes
    #[command(subcommand)]
    Undeployed(UndeployedCommands),

    /// Check a recovery email address
    Email {
        email: String,
    },

    /// Check whether a balance covers the maximum fee
    Fee {
        /// Wallet balance in wei
        #[arg(long)]
        balance: String,
        #[arg(long)]
        gas_limit: String,
        /// Max fee per gas in wei
        #[arg(long)]
        max_fee: String,
        /// Max priority fee per gas in wei
        #[arg(long)]
        priority_fee: Option<String>,
    },

    /// Print the execution options sent to the wallet
    TxOptions {
        /// Chain section name; defaults to the active chain
        #[arg(long)]
        chain: Option<String>,
        #[arg(long)]
        gas_limit: Option<String>,
        #[arg(long)]
        max_fee: Option<String>,
        #[arg(long)]
        priority_fee: Option<String>,
        #[arg(long)]
        nonce: Option<u64>,
    },
}

#[derive(Subcommand)]
enum UndeployedCommands {
    /// List undeployed Safes
    List {
        /// Only show Safes of this chain id
        #[arg(long)]
        chain: Option<u64>,
    },

    /// Forget an undeployed Safe
    Remove {
        #[arg(long)]
        chain: u64,
        #[arg(long)]
        address: String,
    },
}

fn parse_wei(value: &str) -> anyhow::Result<U256> {
    U256::from_str(value).with_context(|| format!("Invalid amount: {}", value))
}

fn parse_opt_wei(value: Option<&String>) -> anyhow::Result<Option<U256>> {
    value.map(|v| parse_wei(v)).transpose()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(&LoggingConfig::from_env().with_debug(cli.debug))?;

    let config_path = cli.config.clone().unwrap_or_else(ConsoleConfig::default_path);
    let config = ConsoleConfig::load_or_default(&config_path)?;
    tracing::debug!(path = %config_path.display(), "Loaded console config");

    match cli.command {
        Commands::Chains => {
            let mut chains = ChainInfo::load_all().context("Failed to load chains.toml")?;
            chains.extend(config.chains.clone());
            if chains.is_empty() {
                println!("No chains configured.");
            }
            for (name, chain) in chains {
                let marker = if name == config.active_chain { "*" } else { " " };
                let features: Vec<String> = chain.features.iter().map(|f| format!("{:?}", f)).collect();
                println!(
                    "{} {:<10} {:>10}  {:<18} {}",
                    marker,
                    name,
                    chain.chain_id,
                    chain.chain_name,
                    features.join(",")
                );
            }
        }
        Commands::Undeployed(command) => {
            let registry = FileRegistry::open(config.registry_path())?;
            match command {
                UndeployedCommands::List { chain } => {
                    let safes = registry.list(chain)?;
                    if safes.is_empty() {
                        println!("No undeployed Safes found.");
                    }
                    for (chain_id, address, safe) in safes {
                        println!(
                            "{:>10}  {}  {}/{} owners  v{}  salt {}",
                            chain_id,
                            address,
                            safe.threshold,
                            safe.owners.len(),
                            safe.safe_version,
                            safe.salt_nonce
                        );
                    }
                }
                UndeployedCommands::Remove { chain, address } => {
                    let address = Address::from_str(&address)
                        .with_context(|| format!("Invalid address: {}", address))?;
                    if registry.remove(chain, address)? {
                        println!("✓ Removed undeployed Safe {} on chain {}", address, chain);
                    } else {
                        bail!("No undeployed Safe {} on chain {}", address, chain);
                    }
                }
            }
        }
        Commands::Email { email } => {
            if is_valid_email(&email) {
                println!("✓ {} is a valid email address", email);
            } else {
                bail!("{} is not a valid email address", email);
            }
        }
        Commands::Fee {
            balance,
            gas_limit,
            max_fee,
            priority_fee,
        } => {
            let balance = parse_wei(&balance)?;
            let gas_limit = parse_wei(&gas_limit)?;
            let max_fee = parse_wei(&max_fee)?;
            let priority_fee = parse_opt_wei(priority_fee.as_ref())?;

            let fee = total_fee(max_fee, priority_fee, gas_limit);
            println!("Maximum fee: {} wei", fee);
            if wallet_can_pay(Some(gas_limit), Some(max_fee), priority_fee, Some(balance)) {
                println!("✓ Balance of {} wei covers the fee", balance);
            } else {
                bail!("Balance of {} wei does not cover the fee", balance);
            }
        }
        Commands::TxOptions {
            chain,
            gas_limit,
            max_fee,
            priority_fee,
            nonce,
        } => {
            let chain = match chain {
                Some(name) => config.chain(&name)?,
                None => config.active_chain()?,
            };
            let params = AdvancedParams {
                gas_limit: parse_opt_wei(gas_limit.as_ref())?,
                max_fee_per_gas: parse_opt_wei(max_fee.as_ref())?,
                max_priority_fee_per_gas: parse_opt_wei(priority_fee.as_ref())?,
                user_nonce: nonce,
            };
            let options = tx_options(&params, Some(&chain));
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}
