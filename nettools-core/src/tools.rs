//! The closed set of tools and the form each one sends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diff::DiffOptions;
use crate::error::{NettoolsError, Result};
use crate::export::DEFAULT_EXPORT_FILE_NAME;
use crate::grid::GridOptions;
use crate::upload::{MultipartForm, SortedUploads, Upload};

/// Whether a run previews a table or produces a downloadable file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Preview,
    Artifact,
}

/// Tool identity, independent of its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    DirectoryListing,
    SecureCrt,
    Extract,
    Merge,
    Distribute,
    Lldp,
    SheetDiff,
}

impl ToolKind {
    /// Every tool, in display order.
    pub const ALL: [ToolKind; 7] = [
        ToolKind::DirectoryListing,
        ToolKind::SecureCrt,
        ToolKind::Extract,
        ToolKind::Merge,
        ToolKind::Distribute,
        ToolKind::Lldp,
        ToolKind::SheetDiff,
    ];

    /// Stable identifier (`tool-0` .. `tool-6`).
    pub fn id(&self) -> &'static str {
        match self {
            ToolKind::DirectoryListing => "tool-0",
            ToolKind::SecureCrt => "tool-1",
            ToolKind::Extract => "tool-2",
            ToolKind::Merge => "tool-3",
            ToolKind::Distribute => "tool-4",
            ToolKind::Lldp => "tool-5",
            ToolKind::SheetDiff => "tool-6",
        }
    }

    /// Command-line name.
    pub fn slug(&self) -> &'static str {
        match self {
            ToolKind::DirectoryListing => "dir-list",
            ToolKind::SecureCrt => "securecrt",
            ToolKind::Extract => "extract",
            ToolKind::Merge => "merge",
            ToolKind::Distribute => "distribute",
            ToolKind::Lldp => "lldp",
            ToolKind::SheetDiff => "sheet-diff",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ToolKind::DirectoryListing => "Directory listing",
            ToolKind::SecureCrt => "SecureCRT session generator",
            ToolKind::Extract => "Model/serial/hostname extract",
            ToolKind::Merge => "Log merge to Excel",
            ToolKind::Distribute => "Log distribute from Excel",
            ToolKind::Lldp => "LLDP port labels",
            ToolKind::SheetDiff => "Excel sheet diff",
        }
    }

    /// Whether the tool runs against the processing API.
    pub fn is_remote(&self) -> bool {
        !matches!(self, ToolKind::SheetDiff)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ToolKind {
    type Err = NettoolsError;

    /// Accepts either the identifier (`tool-3`) or the slug (`merge`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s || kind.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| NettoolsError::parse(format!("unknown tool '{}'", s)))
    }
}

/// Directory listing of a ZIP archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryListingInput {
    pub zip: Option<Upload>,
    pub include_ini: bool,
    pub include_log: bool,
    pub include_txt: bool,
}

impl Default for DirectoryListingInput {
    fn default() -> Self {
        DirectoryListingInput {
            zip: None,
            include_ini: false,
            include_log: true,
            include_txt: true,
        }
    }
}

/// SecureCRT session generation, from a host list or an address range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecureCrtInput {
    Hostname {
        template: Option<Upload>,
        hostlist: Option<Upload>,
    },
    IpRange {
        template: Option<Upload>,
        labels: Option<Upload>,
        start_ip: String,
        end_ip: String,
    },
}

/// Device attribute extraction from logs and archives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractInput {
    pub uploads: Vec<Upload>,
    pub include_ip: bool,
    pub include_model: bool,
    pub include_serial: bool,
    pub include_hostname: bool,
    pub include_image: bool,
    pub include_image_selected: bool,
    pub include_image_booted: bool,
}

impl Default for ExtractInput {
    fn default() -> Self {
        ExtractInput {
            uploads: Vec::new(),
            include_ip: true,
            include_model: true,
            include_serial: true,
            include_hostname: true,
            include_image: true,
            include_image_selected: true,
            include_image_booted: true,
        }
    }
}

/// Default workbook name for merged logs.
pub const DEFAULT_MERGE_OUTPUT: &str = "merged_logs.xlsx";

/// Merge log files into one workbook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeInput {
    pub files: Vec<Upload>,
    /// Artifact name; blank means [`DEFAULT_MERGE_OUTPUT`].
    pub output_name: String,
}

impl MergeInput {
    pub fn output_name(&self) -> &str {
        match self.output_name.trim() {
            "" => DEFAULT_MERGE_OUTPUT,
            name => name,
        }
    }
}

/// Extension of the files produced by the distribute tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Txt,
    Log,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Txt => "txt",
            LogFormat::Log => "log",
        }
    }
}

impl FromStr for LogFormat {
    type Err = NettoolsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(LogFormat::Txt),
            "log" => Ok(LogFormat::Log),
            other => Err(NettoolsError::parse(format!("unknown log format '{}'", other))),
        }
    }
}

/// Split a workbook of logs back into one file per device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributeInput {
    pub excel: Option<Upload>,
    pub format: LogFormat,
}

/// LLDP neighbour extraction into port labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LldpInput {
    pub uploads: Vec<Upload>,
    /// Hostname filter passed through to the server.
    pub pattern: String,
    pub include_description: bool,
    /// Prefix stripped from neighbour names.
    pub strip_prefix: String,
}

/// Local comparison of two sheets of one workbook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetDiffInput {
    pub workbook: Option<Upload>,
    /// Defaults to the first sheet.
    pub sheet_a: Option<String>,
    /// Defaults to the second sheet, or the first when there is only one.
    pub sheet_b: Option<String>,
    pub options: DiffOptions,
    pub grid: GridOptions,
}

/// A tool together with its input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tool {
    DirectoryListing(DirectoryListingInput),
    SecureCrt(SecureCrtInput),
    Extract(ExtractInput),
    Merge(MergeInput),
    Distribute(DistributeInput),
    Lldp(LldpInput),
    SheetDiff(SheetDiffInput),
}

fn require<'a>(upload: &'a Option<Upload>, field: &str) -> Result<&'a Upload> {
    upload.as_ref().ok_or_else(|| NettoolsError::missing(field))
}

fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    match value.trim() {
        "" => Err(NettoolsError::missing(field)),
        trimmed => Ok(trimmed),
    }
}

impl Tool {
    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::DirectoryListing(_) => ToolKind::DirectoryListing,
            Tool::SecureCrt(_) => ToolKind::SecureCrt,
            Tool::Extract(_) => ToolKind::Extract,
            Tool::Merge(_) => ToolKind::Merge,
            Tool::Distribute(_) => ToolKind::Distribute,
            Tool::Lldp(_) => ToolKind::Lldp,
            Tool::SheetDiff(_) => ToolKind::SheetDiff,
        }
    }

    /// API path for the given mode; `None` for tools that run locally.
    pub fn endpoint(&self, mode: RunMode) -> Option<&'static str> {
        let (preview, artifact) = match self {
            Tool::DirectoryListing(_) => ("/dir/zip/list", "/dir/zip/list/excel"),
            Tool::SecureCrt(SecureCrtInput::Hostname { .. }) => {
                ("/securecrt/hostname/preview", "/securecrt/hostname/generate")
            }
            Tool::SecureCrt(SecureCrtInput::IpRange { .. }) => {
                ("/securecrt/iprange/preview", "/securecrt/iprange/generate")
            }
            Tool::Extract(_) => ("/extract/any/json", "/extract/any/excel"),
            Tool::Merge(_) => ("/merge/preview", "/merge/excel"),
            Tool::Distribute(_) => ("/distribute/preview", "/distribute/zip"),
            Tool::Lldp(_) => ("/lldp/hostname/preview", "/lldp/hostname/excel"),
            Tool::SheetDiff(_) => return None,
        };
        Some(match mode {
            RunMode::Preview => preview,
            RunMode::Artifact => artifact,
        })
    }

    /// File name of the artifact when the server does not provide one.
    pub fn default_file_name(&self) -> &str {
        match self {
            Tool::DirectoryListing(_) => "directory-listing.xlsx",
            Tool::SecureCrt(_) => "securecrt-sessions.zip",
            Tool::Extract(_) => "hostname-serial.xlsx",
            Tool::Merge(input) => input.output_name(),
            Tool::Distribute(_) => "distributed-logs.zip",
            Tool::Lldp(_) => "lldp.xlsx",
            Tool::SheetDiff(_) => DEFAULT_EXPORT_FILE_NAME,
        }
    }

    /// Check that every required upload and field is present.
    pub fn validate(&self) -> Result<()> {
        match self {
            Tool::DirectoryListing(input) => {
                require(&input.zip, "zip")?;
            }
            Tool::SecureCrt(SecureCrtInput::Hostname { template, hostlist }) => {
                require(template, "template")?;
                require(hostlist, "hostlist")?;
            }
            Tool::SecureCrt(SecureCrtInput::IpRange {
                template,
                labels,
                start_ip,
                end_ip,
            }) => {
                require(template, "template")?;
                require(labels, "labels")?;
                require_text(start_ip, "start_ip")?;
                require_text(end_ip, "end_ip")?;
            }
            Tool::Extract(input) => {
                if SortedUploads::split(&input.uploads).is_empty() {
                    return Err(NettoolsError::missing("files (no .log, .txt or .zip uploads)"));
                }
            }
            Tool::Merge(input) => {
                if input.files.is_empty() {
                    return Err(NettoolsError::missing("files"));
                }
            }
            Tool::Distribute(input) => {
                require(&input.excel, "excel")?;
            }
            Tool::Lldp(input) => {
                if SortedUploads::split(&input.uploads).is_empty() {
                    return Err(NettoolsError::missing("files (no .log, .txt or .zip uploads)"));
                }
            }
            Tool::SheetDiff(input) => {
                require(&input.workbook, "workbook")?;
                for (field, name) in [("sheet_a", &input.sheet_a), ("sheet_b", &input.sheet_b)] {
                    if matches!(name, Some(n) if n.trim().is_empty()) {
                        return Err(NettoolsError::missing(field));
                    }
                }
            }
        }
        Ok(())
    }

    /// Validate and build the multipart form for a remote run.
    pub fn form(&self, mode: RunMode) -> Result<MultipartForm> {
        self.validate()?;

        let form = MultipartForm::new();
        let form = match self {
            Tool::DirectoryListing(input) => form
                .file("zip", require(&input.zip, "zip")?)
                .flag("include_ini", input.include_ini)
                .flag("include_log", input.include_log)
                .flag("include_txt", input.include_txt),
            Tool::SecureCrt(SecureCrtInput::Hostname { template, hostlist }) => form
                .file("template", require(template, "template")?)
                .file("hostlist", require(hostlist, "hostlist")?),
            Tool::SecureCrt(SecureCrtInput::IpRange {
                template,
                labels,
                start_ip,
                end_ip,
            }) => form
                .file("template", require(template, "template")?)
                .file("labels", require(labels, "labels")?)
                .text("start_ip", require_text(start_ip, "start_ip")?)
                .text("end_ip", require_text(end_ip, "end_ip")?),
            Tool::Extract(input) => {
                let sorted = SortedUploads::split(&input.uploads);
                form.files("files", &sorted.logs)
                    .files("zips", &sorted.zips)
                    .flag("include_ip", input.include_ip)
                    .flag("include_model", input.include_model)
                    .flag("include_serial", input.include_serial)
                    .flag("include_hostname", input.include_hostname)
                    .flag("include_image", input.include_image)
                    .flag("include_image_selected", input.include_image_selected)
                    .flag("include_image_booted", input.include_image_booted)
            }
            Tool::Merge(input) => {
                let form = form.files("files", &input.files);
                match mode {
                    RunMode::Preview => form,
                    RunMode::Artifact => form.text("output_name", input.output_name()),
                }
            }
            Tool::Distribute(input) => {
                let form = form.file("excel", require(&input.excel, "excel")?);
                match mode {
                    RunMode::Preview => form,
                    RunMode::Artifact => form.text("format", input.format.as_str()),
                }
            }
            Tool::Lldp(input) => {
                let sorted = SortedUploads::split(&input.uploads);
                form.files("files", &sorted.logs)
                    .files("zips", &sorted.zips)
                    .text("pattern", input.pattern.as_str())
                    .flag("include_description", input.include_description)
                    .text("strip_prefix", input.strip_prefix.as_str())
            }
            Tool::SheetDiff(_) => {
                return Err(NettoolsError::Config(
                    "sheet diff runs locally and has no remote form".to_string(),
                ))
            }
        };
        Ok(form)
    }
}
