use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "nettools",
    about = "Network engineer's toolbox: log/config processing jobs and Excel sheet diff",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the processing API (overrides config and environment)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Repeat for more detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DistributeFormat {
    Txt,
    Log,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the available tools
    Tools,
    /// List the sheets of a workbook
    Sheets(SheetsArgs),
    /// Compare two sheets of a workbook cell by cell
    Diff(DiffArgs),
    /// Check that the processing API is reachable
    Health,
    /// Run a processing tool on the remote API
    Run(RunArgs),
}

#[derive(Args)]
pub struct SheetsArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Workbook (.xlsx) holding both sheets
    pub file: PathBuf,
    /// First sheet (default: the first sheet)
    #[arg(long)]
    pub sheet_a: Option<String>,
    /// Second sheet (default: the second sheet, or the first if there is only one)
    #[arg(long)]
    pub sheet_b: Option<String>,
    /// Compare the first row instead of using it as column headers
    #[arg(long)]
    pub no_header: bool,
    /// Keep rows without values instead of dropping them
    #[arg(long)]
    pub keep_blank_rows: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write the report workbook to this file (or directory)
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(subcommand)]
    pub tool: RunTool,

    /// Download the generated file to this path (or directory) instead of
    /// previewing a table
    #[arg(long, global = true)]
    pub artifact: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum RunTool {
    /// tool-0: list files inside a ZIP archive
    DirList {
        #[arg(long)]
        zip: PathBuf,
        #[arg(long)]
        include_ini: bool,
        #[arg(long)]
        no_log: bool,
        #[arg(long)]
        no_txt: bool,
    },
    /// tool-1: SecureCRT sessions from a host list
    SecurecrtHostname {
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        hostlist: PathBuf,
    },
    /// tool-1: SecureCRT sessions from an address range
    SecurecrtIprange {
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        labels: PathBuf,
        #[arg(long)]
        start_ip: String,
        #[arg(long)]
        end_ip: String,
    },
    /// tool-2: extract model, serial and hostname from logs (.log/.txt/.zip)
    Extract(ExtractArgs),
    /// tool-3: merge log files into one workbook
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Name of the generated workbook
        #[arg(long, default_value = "merged_logs.xlsx")]
        output_name: String,
    },
    /// tool-4: split a workbook of logs into one file per device
    Distribute {
        #[arg(long)]
        excel: PathBuf,
        #[arg(long = "log-format", value_enum, default_value_t = DistributeFormat::Txt)]
        log_format: DistributeFormat,
    },
    /// tool-5: LLDP neighbour port labels from logs (.log/.txt/.zip)
    Lldp {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Hostname pattern
        #[arg(long, default_value = "")]
        pattern: String,
        #[arg(long)]
        include_description: bool,
        /// Prefix removed from neighbour names
        #[arg(long, default_value = "")]
        strip_prefix: String,
    },
}

#[derive(Args)]
pub struct ExtractArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    #[arg(long)]
    pub no_ip: bool,
    #[arg(long)]
    pub no_model: bool,
    #[arg(long)]
    pub no_serial: bool,
    #[arg(long)]
    pub no_hostname: bool,
    #[arg(long)]
    pub no_image: bool,
    #[arg(long)]
    pub no_image_selected: bool,
    #[arg(long)]
    pub no_image_booted: bool,
}
