use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use nettools_core::{
    export_workbook, ApiClient, Artifact, Config, DiffOptions, DiffRecord,
    DirectoryListingInput, DistributeInput, ExtractInput, GridOptions, LldpInput, LogFormat, MergeInput,
    Outcome, RunMode, SecureCrtInput, SheetDiffInput, Table, Tool, ToolKind, Upload, Workbook,
    DEFAULT_EXPORT_FILE_NAME,
};

use crate::cli::*;
use crate::render;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.api_base.as_deref())?;
    tracing::debug!(api_base = %config.api_base, timeout_secs = config.timeout_secs, "configuration loaded");

    match cli.command {
        Command::Tools => cmd_tools(),
        Command::Sheets(args) => cmd_sheets(args),
        Command::Diff(args) => cmd_diff(&config, args),
        Command::Health => cmd_health(&config),
        Command::Run(args) => cmd_run(&config, args),
    }
}

/// Config file (or defaults), then environment, then `--api-base`.
fn load_config(path: Option<&Path>, api_base: Option<&str>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_toml_file(path)?.with_env_overrides(|key| std::env::var(key).ok())?,
        None => Config::from_env()?,
    };
    Ok(match api_base {
        Some(base) => config.with_api_base(base)?,
        None => config,
    })
}

fn cmd_tools() -> anyhow::Result<()> {
    for kind in ToolKind::ALL {
        let place = if kind.is_remote() { "remote".cyan() } else { "local".green() };
        println!("{}  {:<11} {:<6}  {}", kind.id().bold(), kind.slug(), place, kind.title());
    }
    Ok(())
}

fn cmd_sheets(args: SheetsArgs) -> anyhow::Result<()> {
    let workbook = Workbook::load(&args.file)?;
    for (idx, ws) in workbook.worksheets().iter().enumerate() {
        let range = ws.dimension().unwrap_or_else(|| "empty".to_string());
        println!("{:>3}  {}  ({})", idx + 1, ws.title().bold(), range.dimmed());
    }
    Ok(())
}

fn cmd_diff(config: &Config, args: DiffArgs) -> anyhow::Result<()> {
    let tool = Tool::SheetDiff(SheetDiffInput {
        workbook: Some(Upload::from_path(&args.file)?),
        sheet_a: args.sheet_a,
        sheet_b: args.sheet_b,
        options: DiffOptions {
            use_header_row: !args.no_header,
        },
        grid: GridOptions {
            skip_blank_rows: !args.keep_blank_rows,
        },
    });
    let client = ApiClient::from_config(config)?;

    let result = match client.run(&tool, RunMode::Preview)? {
        Outcome::Diff(result) => result,
        other => anyhow::bail!("unexpected outcome from sheet diff: {:?}", other),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result.records)?),
        OutputFormat::Text => {
            if !result.is_empty() {
                print!("{}", render::text_table(&Table::from_records(&result.records)));
            }
            println!("{}", render::diff_summary(&result));
        }
    }

    if let Some(target) = args.export {
        let written = export_report(config, &result.records, &target)?;
        println!("{} saved {}", "✓".green().bold(), written.display().to_string().bold());
    }
    Ok(())
}

/// Write the report next to `target`, or into it when it is a directory.
fn export_report(config: &Config, records: &[DiffRecord], target: &Path) -> anyhow::Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(DEFAULT_EXPORT_FILE_NAME)
    } else {
        target.to_path_buf()
    };
    let mut report = export_workbook(records)?;
    report.set_compression(config.compression);
    report
        .save(&path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}

fn cmd_health(config: &Config) -> anyhow::Result<()> {
    ApiClient::from_config(config)?
        .health()
        .with_context(|| format!("processing API at {} is not healthy", config.api_base))?;
    println!("{} {} is up", "✓".green().bold(), config.api_base);
    Ok(())
}

fn cmd_run(config: &Config, args: RunArgs) -> anyhow::Result<()> {
    let tool = build_tool(args.tool)?;
    let mode = if args.artifact.is_some() { RunMode::Artifact } else { RunMode::Preview };
    let client = ApiClient::from_config(config)?;

    tracing::info!(tool = tool.kind().id(), ?mode, "running tool");
    match client.run(&tool, mode)? {
        Outcome::Table(table) => match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render::json_table(&table))?),
            OutputFormat::Text => {
                print!("{}", render::text_table(&table));
                println!("{} rows", table.len());
            }
        },
        Outcome::Artifact(artifact) => {
            let target = args.artifact.unwrap_or_else(|| PathBuf::from("."));
            save_artifact(&artifact, &target)?;
        }
        Outcome::Diff(result) => println!("{}", render::diff_summary(&result)),
    }
    Ok(())
}

fn uploads(paths: &[PathBuf]) -> anyhow::Result<Vec<Upload>> {
    paths.iter().map(|p| Ok(Upload::from_path(p)?)).collect()
}

fn build_tool(tool: RunTool) -> anyhow::Result<Tool> {
    Ok(match tool {
        RunTool::DirList {
            zip,
            include_ini,
            no_log,
            no_txt,
        } => Tool::DirectoryListing(DirectoryListingInput {
            zip: Some(Upload::from_path(zip)?),
            include_ini,
            include_log: !no_log,
            include_txt: !no_txt,
        }),
        RunTool::SecurecrtHostname { template, hostlist } => Tool::SecureCrt(SecureCrtInput::Hostname {
            template: Some(Upload::from_path(template)?),
            hostlist: Some(Upload::from_path(hostlist)?),
        }),
        RunTool::SecurecrtIprange {
            template,
            labels,
            start_ip,
            end_ip,
        } => Tool::SecureCrt(SecureCrtInput::IpRange {
            template: Some(Upload::from_path(template)?),
            labels: Some(Upload::from_path(labels)?),
            start_ip,
            end_ip,
        }),
        RunTool::Extract(args) => Tool::Extract(ExtractInput {
            uploads: uploads(&args.files)?,
            include_ip: !args.no_ip,
            include_model: !args.no_model,
            include_serial: !args.no_serial,
            include_hostname: !args.no_hostname,
            include_image: !args.no_image,
            include_image_selected: !args.no_image_selected,
            include_image_booted: !args.no_image_booted,
        }),
        RunTool::Merge { files, output_name } => Tool::Merge(MergeInput {
            files: uploads(&files)?,
            output_name,
        }),
        RunTool::Distribute { excel, log_format } => Tool::Distribute(DistributeInput {
            excel: Some(Upload::from_path(excel)?),
            format: match log_format {
                DistributeFormat::Txt => LogFormat::Txt,
                DistributeFormat::Log => LogFormat::Log,
            },
        }),
        RunTool::Lldp {
            files,
            pattern,
            include_description,
            strip_prefix,
        } => Tool::Lldp(LldpInput {
            uploads: uploads(&files)?,
            pattern,
            include_description,
            strip_prefix,
        }),
    })
}

fn save_artifact(artifact: &Artifact, target: &Path) -> anyhow::Result<()> {
    let written = artifact
        .write_to(target)
        .with_context(|| format!("cannot write {}", target.display()))?;
    println!(
        "{} saved {} ({} bytes)",
        "✓".green().bold(),
        written.display().to_string().bold(),
        artifact.bytes.len()
    );
    Ok(())
}
