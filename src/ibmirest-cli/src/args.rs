use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the ibmirest client
#[derive(Parser, Debug)]
#[command(name = "ibmirest")]
#[command(version)]
#[command(about = "Run SQL, CL, Qshell and data queue operations on an IBM i microservice", long_about = None)]
pub struct Cli {
    /// JSON connection config file
    #[arg(short = 'c', long = "config", default_value = "config.json")]
    pub config: String,

    /// Base URL of the microservice (overrides the config file)
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    #[arg(long = "user")]
    pub user: Option<String>,

    #[arg(long = "password")]
    pub password: Option<String>,

    /// Send Basic Auth credentials with every request
    #[arg(long = "http-auth")]
    pub http_auth: bool,

    /// Send the `user:password` pair without base64 encoding
    #[arg(long = "raw-auth")]
    pub raw_auth: bool,

    /// Accept invalid TLS certificates
    #[arg(long = "insecure")]
    pub insecure: bool,

    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Also write JSON logs to this directory
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a select and print the result set
    Sql {
        query: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run an insert, update, delete or DDL statement
    Exec { statement: String },
    /// Run a CL command
    Cl { command: String },
    /// Run a Qshell command
    Qsh { command: String },
    /// Send an entry to a data queue
    DqSend {
        library: String,
        object: String,
        data: String,
    },
    /// Receive the next entry from a data queue
    DqPop { library: String, object: String },
    /// POST a raw JSON body to any endpoint
    Call { endpoint: String, body: String },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    #[arg(long = "separator", default_value = ",")]
    pub separator: String,

    #[arg(long = "quote", default_value = "\"")]
    pub quote: String,

    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Row element name for XML output
    #[arg(long = "table-name", default_value = "Table1")]
    pub table_name: String,

    /// Include an inline schema in XML output
    #[arg(long = "schema")]
    pub schema: bool,

    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Write to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(long = "replace", requires = "output")]
    pub replace: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    Xml,
    Json,
    List,
}
