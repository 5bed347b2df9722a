use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use anchor_client::solana_sdk::signature::Signer;
use anchor_lang::prelude::Pubkey;
use digital_signatures_contract::ledger::digest_message;
use dsig::{
    client::{fetch_registry, load_keypair, storage_address, RegistryClient},
    default_cluster_rpc_url, default_config_file_path,
    digest::{file_digest, format_digest, parse_digest_hex},
    expand_tilde, get_config_value, load_config_with_overrides, save_default_config,
    set_config_value,
    verify::{verify_entries, Ed25519Verifier, Selection},
    view::RegistryView,
    write_config_file, ConfigOverrides, DsigConfig,
};

#[derive(Debug, Parser)]
#[command(name = "dsig", version, about = "Digital signatures registry CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Create a registry account owned by the configured wallet
    Init(InitCmd),
    /// Sign a document digest and record it in a registry
    Sign(SignCmd),
    /// Print a registry and its signatures
    Show(ShowCmd),
    /// Check recorded signatures against their signer keys
    Verify(VerifyCmd),
    /// Print the SHA-256 digest of a file
    Digest(DigestCmd),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Generate a configuration file (TOML)
    Init(ConfigInitCmd),
    /// Get current config settings
    Get(ConfigGetCmd),
    /// Set a config setting
    Set(ConfigSetCmd),
}

#[derive(Debug, Args)]
struct ConfigInitCmd {
    /// Output path for the config file. Defaults to XDG config dir.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
    /// Overwrite existing file if present
    #[arg(long = "force")]
    force: bool,
    /// Cluster shortcut: devnet|testnet|mainnet-beta|localnet
    #[arg(long = "cluster")]
    cluster: Option<String>,
    /// RPC URL (overrides cluster default)
    #[arg(long = "rpc-url")]
    rpc_url: Option<String>,
    /// Path to Solana keypair (id.json)
    #[arg(long = "keypair")]
    keypair_path: Option<PathBuf>,
    /// Registry program id, if not the built-in deployment
    #[arg(long = "program-id")]
    program_id: Option<String>,
}

#[derive(Debug, Args)]
struct ConfigGetCmd {
    /// Optional config key to read (cluster|rpc_url|keypair_path|commitment|program_id). If omitted, prints full config.
    key: Option<String>,
}

#[derive(Debug, Args)]
struct ConfigSetCmd {
    /// Config key to set (cluster|rpc_url|keypair_path|commitment|program_id)
    key: String,
    /// Value to set
    value: String,
}

#[derive(Debug, Args)]
struct ConnectionArgs {
    /// RPC URL (overrides config and env)
    #[arg(long = "rpc-url")]
    rpc_url: Option<String>,
    /// Path to Solana keypair (id.json) (overrides config and env)
    #[arg(long = "keypair")]
    keypair_path: Option<PathBuf>,
    /// Registry program id (overrides config and env)
    #[arg(long = "program-id")]
    program_id: Option<String>,
}

impl ConnectionArgs {
    fn load(&self) -> Result<DsigConfig> {
        load_config_with_overrides(ConfigOverrides {
            rpc_url: self.rpc_url.clone(),
            keypair_path: self.keypair_path.clone(),
            program_id: self.program_id.clone(),
        })
    }
}

#[derive(Debug, Args)]
struct InitCmd {
    /// Registry id, unique per authority
    id: u64,
    /// Human readable label, at most 32 bytes
    name: String,
    #[command(flatten)]
    conn: ConnectionArgs,
}

#[derive(Debug, Args)]
struct SignCmd {
    /// Registry id
    id: u64,
    /// Document to hash and sign
    #[arg(
        long = "file",
        required_unless_present_any = ["digest", "message"],
        conflicts_with_all = ["digest", "message"]
    )]
    file: Option<PathBuf>,
    /// Precomputed SHA-256 digest (hex, optionally prefixed with sha256:)
    #[arg(long = "digest", conflicts_with = "message")]
    digest: Option<String>,
    /// Short text to hash and sign
    #[arg(long = "message")]
    message: Option<String>,
    /// Keypair that signs the digest. Defaults to the authority wallet.
    #[arg(long = "signer-keypair")]
    signer_keypair: Option<PathBuf>,
    #[command(flatten)]
    conn: ConnectionArgs,
}

#[derive(Debug, Args)]
struct ShowCmd {
    /// Registry id
    id: u64,
    /// Registry authority. Defaults to the configured wallet.
    #[arg(long = "authority")]
    authority: Option<String>,
    /// Print JSON instead of key=value lines
    #[arg(long = "json")]
    json: bool,
    #[command(flatten)]
    conn: ConnectionArgs,
}

#[derive(Debug, Args)]
struct VerifyCmd {
    /// Registry id
    id: u64,
    /// Registry authority. Defaults to the configured wallet.
    #[arg(long = "authority")]
    authority: Option<String>,
    /// Only check entries for this document
    #[arg(long = "file", conflicts_with_all = ["digest", "sequence"])]
    file: Option<PathBuf>,
    /// Only check entries for this digest
    #[arg(long = "digest", conflicts_with = "sequence")]
    digest: Option<String>,
    /// Only check the entry with this sequence number
    #[arg(long = "sequence")]
    sequence: Option<u64>,
    #[command(flatten)]
    conn: ConnectionArgs,
}

#[derive(Debug, Args)]
struct DigestCmd {
    /// File to hash
    file: PathBuf,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_authority(flag: Option<&str>, cfg: &DsigConfig) -> Result<Pubkey> {
    match flag {
        Some(key) => Pubkey::from_str(key).map_err(|e| anyhow::anyhow!("authority {key}: {e}")),
        None => Ok(load_keypair(&cfg.keypair_path)?.pubkey()),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Config(cmd) => match cmd {
            ConfigCommand::Init(cmd) => {
                let mut cfg = DsigConfig::default();
                if let Some(cluster) = cmd.cluster.as_deref() {
                    cfg.cluster = cluster.to_string();
                    cfg.rpc_url = default_cluster_rpc_url(cluster);
                }
                if let Some(rpc) = cmd.rpc_url.as_deref() {
                    cfg.rpc_url = rpc.to_string();
                }
                if let Some(path) = cmd.keypair_path.as_deref() {
                    cfg.keypair_path = expand_tilde(path);
                }
                if let Some(program_id) = cmd.program_id.as_deref() {
                    set_config_value(&mut cfg, "program_id", program_id)?;
                }

                let output_path = cmd
                    .output
                    .as_deref()
                    .map(expand_tilde)
                    .unwrap_or_else(default_config_file_path);

                write_config_file(&output_path, &cfg, cmd.force)?;
                println!(
                    "Wrote config to {}\ncluster={}\nrpc_url={}\nkeypair_path={}",
                    output_path.display(),
                    cfg.cluster,
                    cfg.rpc_url,
                    cfg.keypair_path.display()
                );
                Ok(ExitCode::SUCCESS)
            }
            ConfigCommand::Get(cmd) => {
                let cfg = dsig::read_config_file().or_else(|_| {
                    let cfg = DsigConfig::default();
                    save_default_config(&cfg).ok();
                    Ok::<DsigConfig, anyhow::Error>(cfg)
                })?;
                if let Some(key) = cmd.key.as_deref() {
                    let value = get_config_value(&cfg, key)?;
                    println!("{}", value);
                } else {
                    let toml_string = toml::to_string_pretty(&cfg)?;
                    println!("{}", toml_string);
                }
                Ok(ExitCode::SUCCESS)
            }
            ConfigCommand::Set(cmd) => {
                let mut cfg = dsig::read_config_file().unwrap_or_default();
                set_config_value(&mut cfg, &cmd.key, &cmd.value)?;
                save_default_config(&cfg)?;
                println!("updated {}", cmd.key);
                Ok(ExitCode::SUCCESS)
            }
        },
        Commands::Init(cmd) => {
            let config = cmd.conn.load()?;
            let client = RegistryClient::connect(&config)?;
            let (storage, signature) = client.initialize(cmd.id, &cmd.name)?;
            println!("Storage={}\nSignature={}", storage, signature);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sign(cmd) => {
            let config = cmd.conn.load()?;
            let digest = match (&cmd.file, &cmd.digest, &cmd.message) {
                (Some(path), _, _) => file_digest(path)?,
                (_, Some(hex), _) => parse_digest_hex(hex)?,
                (_, _, Some(text)) => digest_message(text.as_bytes()),
                _ => bail!("one of --file, --digest or --message is required"),
            };
            let client = RegistryClient::connect(&config)?;
            let external_signer = match cmd.signer_keypair.as_deref() {
                Some(path) => Some(load_keypair(&expand_tilde(path))?),
                None => None,
            };
            let signer = external_signer.as_ref().unwrap_or_else(|| client.wallet());

            let signature = client.append_signature(cmd.id, signer, digest)?;
            info!(digest = %format_digest(&digest), "digest recorded");
            println!("Digest={}\nSignature={}", format_digest(&digest), signature);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show(cmd) => {
            let config = cmd.conn.load()?;
            let authority = resolve_authority(cmd.authority.as_deref(), &config)?;
            let address = storage_address(&config.program_id()?, &authority, cmd.id);
            let record = fetch_registry(&config, &address)?;

            let view = RegistryView::new(address, &record);
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}", view);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify(cmd) => {
            let config = cmd.conn.load()?;
            let selection = match (&cmd.file, &cmd.digest, cmd.sequence) {
                (Some(path), _, _) => Selection::Digest(file_digest(path)?),
                (_, Some(hex), _) => Selection::Digest(parse_digest_hex(hex)?),
                (_, _, Some(sequence)) => Selection::Sequence(sequence),
                _ => Selection::All,
            };
            let authority = resolve_authority(cmd.authority.as_deref(), &config)?;
            let address = storage_address(&config.program_id()?, &authority, cmd.id);
            let record = fetch_registry(&config, &address)?;

            let outcomes = verify_entries(&record, selection, &Ed25519Verifier);
            if outcomes.is_empty() {
                warn!(%address, ?selection, "no matching signatures");
                println!("no matching signatures");
                return Ok(ExitCode::FAILURE);
            }
            for outcome in &outcomes {
                let verdict = if outcome.valid { "valid" } else { "INVALID" };
                println!("#{} signer={} {}", outcome.sequence, outcome.signer, verdict);
            }
            if outcomes.iter().all(|o| o.valid) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Digest(cmd) => {
            let digest = file_digest(&cmd.file)?;
            println!("sha256:{}", format_digest(&digest));
            Ok(ExitCode::SUCCESS)
        }
    }
}
