use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use suvidha_types::Action;

#[derive(Parser)]
#[command(
    name = "suvidha",
    about = "SUVIDHA complaint ledger: tamper-evident history and resolution certificates",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the ledger files
    #[arg(long, global = true, default_value = ".suvidha")]
    pub data_dir: PathBuf,

    /// TOML config file (defaults to <data-dir>/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record an action on a complaint
    Append(AppendArgs),
    /// Show ledger blocks
    Log(LogArgs),
    /// Verify a complaint's history, or the whole ledger
    Verify(VerifyArgs),
    /// Show ledger statistics
    Stats,
    /// Mint a resolution certificate
    Mint(MintArgs),
    /// Verify a certificate, or list certificates
    Certificate(CertificateArgs),
    /// List automation rules
    Rules,
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
pub struct AppendArgs {
    pub entity_id: String,
    /// One of CREATED, UPDATED, ASSIGNED, RESOLVED, ESCALATED, VERIFIED, CLOSED, REOPENED
    pub action: Action,
    #[arg(long, default_value = "citizen")]
    pub actor: String,
    #[arg(long, default_value = "")]
    pub details: String,
}

#[derive(Args)]
pub struct LogArgs {
    /// Only blocks of this complaint
    pub entity_id: Option<String>,
    /// Show at most this many of the latest blocks
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Complaint to verify; the whole ledger when omitted
    pub entity_id: Option<String>,
}

#[derive(Args)]
pub struct MintArgs {
    pub entity_id: String,
    /// Citizen rating, 0-5
    #[arg(long)]
    pub rating: u8,
    #[arg(long, default_value = "citizen")]
    pub issuer: String,
    #[arg(long, default_value = "department")]
    pub recipient: String,
    /// Extra metadata as KEY=VALUE; VALUE is parsed as JSON when it can be
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,
}

#[derive(Args)]
pub struct CertificateArgs {
    /// Token id to verify; lists certificates when omitted
    pub token_id: Option<String>,
    /// Show the certificate of this complaint
    #[arg(long, conflicts_with = "token_id")]
    pub entity: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}
