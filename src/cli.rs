use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "upsql", version, about = "Run SQL against the platform API from the command line")]
pub struct Cli {
    /// Path to config file
    #[arg(short = 'C', long, global = true, env = "UPSQL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit diagnostics (including every HTTP exchange) to stderr
    #[arg(short = 'v', long, global = true, env = "UPSQL_VERBOSE")]
    pub verbose: bool,

    /// Disable credential masking in diagnostics and messages
    #[arg(long, global = true, env = "UPSQL_SHOW_SECRETS")]
    pub show_secrets: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single SQL statement and print its result pages
    Execute(ExecuteArgs),

    /// Log in with email and password, and store the issued token in a profile
    Authenticate(AuthenticateArgs),
}

#[derive(Parser, Debug)]
pub struct ExecuteArgs {
    /// SQL statement text
    #[arg(short = 'c', long = "command", required_unless_present = "file")]
    pub command: Option<String>,

    /// Read the SQL statement from a file
    #[arg(short = 'f', long = "file", conflicts_with = "command")]
    pub file: Option<PathBuf>,

    /// API token
    #[arg(short = 't', long, env = "UPSQL_TOKEN")]
    pub token: Option<String>,

    /// Query API base URL (discovered from the auth API when omitted)
    #[arg(short = 'u', long, env = "UPSQL_API_URL")]
    pub api_url: Option<String>,

    /// Authentication API base URL
    #[arg(long, env = "UPSQL_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Seconds to wait for a pending result, 0 waits forever (default: 10)
    #[arg(long, env = "UPSQL_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Output format: json, csv, tsv or toon (default: json)
    #[arg(short = 'o', long, env = "UPSQL_OUTPUT")]
    pub output: Option<String>,

    /// Config file profile name
    #[arg(short = 'P', long, env = "UPSQL_PROFILE")]
    pub profile: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AuthenticateArgs {
    /// Account email
    #[arg(short = 'e', long, env = "UPSQL_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(short = 'p', long, env = "UPSQL_PASSWORD")]
    pub password: String,

    /// Authentication API base URL
    #[arg(short = 'u', long, env = "UPSQL_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Profile to store the token in
    #[arg(short = 'P', long, env = "UPSQL_PROFILE")]
    pub profile: Option<String>,
}
