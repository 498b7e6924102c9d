use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "labkey")]
#[command(about = "Query across multiple LabKey instances")]
#[command(version)]
#[command(after_help = "Examples:
  labkey servers                                  # List configured servers
  labkey query --filter 'gender~eq=Male'          # Query every server
  labkey query --server 0 --format csv            # Query the first server only
  labkey query --filter 'age~lte=40' --format json

Environment Variables:
  LABKEY_CONFIG   Path to the config file (default: ~/.config/labkey/config.yml)
  RUST_LOG        Log filter (default: warn, or debug with --verbose)")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML or TOML config file
    #[arg(short, long, global = true, env = "LABKEY_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the configured servers
    Servers,
    /// Run a query on every configured server (or one)
    Query(QueryArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  labkey query --filter 'gender~eq=Male' --filter 'age~lte=40'
  labkey query --server 1 --no-login
  labkey query --email me@example.org --ask-password")]
pub struct QueryArgs {
    /// Filter in <column>~<operator>=<value> form (can be repeated)
    #[arg(long, short = 'f', action = clap::ArgAction::Append, help_heading = "Query Options")]
    pub filter: Vec<String>,

    /// Only query the server at this index (see `labkey servers`)
    #[arg(long, short = 's', help_heading = "Query Options")]
    pub server: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", help_heading = "Output Options")]
    pub format: OutputFormat,

    /// Skip logging in before querying
    #[arg(long, help_heading = "Authentication Options")]
    pub no_login: bool,

    /// Log in and retry once when a query is rejected with 401/403
    #[arg(long, help_heading = "Authentication Options")]
    pub relogin: bool,

    /// Email to log in with instead of the configured one
    #[arg(long, help_heading = "Authentication Options")]
    pub email: Option<String>,

    /// Prompt for a password instead of using the configured one
    #[arg(long, help_heading = "Authentication Options")]
    pub ask_password: bool,
}
