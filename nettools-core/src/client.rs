//! Client for the remote processing API.
//!
//! [`ApiClient::run`] validates a [`Tool`], then either diffs locally or posts
//! the tool's form through a [`Transport`] and maps the response to an
//! [`Outcome`].

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::diff::{default_sheet_pair, diff_sheets, SheetDiff};
use crate::error::{NettoolsError, Result};
use crate::export::{export_workbook, DEFAULT_EXPORT_FILE_NAME};
use crate::table::Table;
use crate::tools::{RunMode, SheetDiffInput, Tool};
use crate::upload::{FormValue, MultipartForm};
use crate::workbook::{CompressionLevel, Workbook};

/// A response as seen by the client, independent of the HTTP stack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Carries requests to the processing API.
pub trait Transport {
    /// POST a multipart form to an endpoint path.
    fn post_form(&self, path: &str, form: &MultipartForm) -> Result<RemoteResponse>;

    /// GET an endpoint path.
    fn get(&self, path: &str) -> Result<RemoteResponse>;
}

/// Blocking HTTP transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    config: Config,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("nettools/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTransport {
            config: config.clone(),
            client,
        })
    }

    fn to_reqwest_form(form: &MultipartForm) -> Result<reqwest::blocking::multipart::Form> {
        use reqwest::blocking::multipart::{Form, Part};

        let mut out = Form::new();
        for part in form.parts() {
            out = match &part.value {
                FormValue::Text(text) => out.text(part.name.clone(), text.clone()),
                FormValue::File(upload) => {
                    let file = Part::bytes(upload.bytes.clone())
                        .file_name(upload.file_name.clone())
                        .mime_str("application/octet-stream")?;
                    out.part(part.name.clone(), file)
                }
            };
        }
        Ok(out)
    }

    fn collect(response: reqwest::blocking::Response) -> Result<RemoteResponse> {
        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let status = response.status().as_u16();
        let content_type = header(reqwest::header::CONTENT_TYPE);
        let content_disposition = header(reqwest::header::CONTENT_DISPOSITION);
        let body = response.bytes()?.to_vec();
        Ok(RemoteResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, path: &str, form: &MultipartForm) -> Result<RemoteResponse> {
        let url = self.config.url(path);
        debug!(%url, parts = form.parts().len(), "POST");
        let response = self
            .client
            .post(&url)
            .multipart(Self::to_reqwest_form(form)?)
            .send()?;
        Self::collect(response)
    }

    fn get(&self, path: &str) -> Result<RemoteResponse> {
        let url = self.config.url(path);
        debug!(%url, "GET");
        Self::collect(self.client.get(&url).send()?)
    }
}

/// A downloadable file produced by a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write the artifact to `path`, or into `path` under its own name when
    /// `path` is a directory.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<std::path::PathBuf> {
        let path = path.as_ref();
        let target = if path.is_dir() {
            path.join(&self.file_name)
        } else {
            path.to_path_buf()
        };
        std::fs::write(&target, &self.bytes)?;
        Ok(target)
    }
}

/// What a run produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Table(Table),
    Diff(SheetDiff),
    Artifact(Artifact),
}

/// Runs tools against the processing API.
#[derive(Clone, Debug)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    compression: CompressionLevel,
}

impl ApiClient<HttpTransport> {
    /// Client over HTTP using `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(ApiClient {
            transport: HttpTransport::new(config)?,
            compression: config.compression,
        })
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        ApiClient {
            transport,
            compression: CompressionLevel::default(),
        }
    }

    /// Compression for locally generated reports.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a tool. No retries are attempted.
    pub fn run(&self, tool: &Tool, mode: RunMode) -> Result<Outcome> {
        tool.validate()?;

        if let Tool::SheetDiff(input) = tool {
            return self.run_sheet_diff(input, mode);
        }

        let path = tool
            .endpoint(mode)
            .ok_or_else(|| NettoolsError::Config(format!("{} has no endpoint", tool.kind())))?;
        let form = tool.form(mode)?;
        let response = self.transport.post_form(path, &form)?;
        debug!(tool = %tool.kind(), path, status = response.status, bytes = response.body.len(), "tool response");

        if !response.is_success() {
            return Err(failure(&response));
        }

        match mode {
            RunMode::Preview => preview_table(&response).map(Outcome::Table),
            RunMode::Artifact => {
                let file_name = response
                    .content_disposition
                    .as_deref()
                    .and_then(filename_from_disposition)
                    .unwrap_or_else(|| tool.default_file_name().to_string());
                Ok(Outcome::Artifact(Artifact {
                    file_name,
                    content_type: response.content_type,
                    bytes: response.body,
                }))
            }
        }
    }

    /// Check that the API is up.
    pub fn health(&self) -> Result<()> {
        let response = self.transport.get("/healthz")?;
        if !response.is_success() {
            return Err(failure(&response));
        }
        let value: Value = serde_json::from_slice(&response.body)
            .map_err(|e| NettoolsError::parse(format!("health response is not JSON: {}", e)))?;
        match value.get("status").and_then(Value::as_str) {
            Some("ok") => Ok(()),
            other => Err(NettoolsError::RemoteCallFailure {
                status: response.status,
                message: format!("unhealthy: status {}", other.unwrap_or("missing")),
            }),
        }
    }

    fn run_sheet_diff(&self, input: &SheetDiffInput, mode: RunMode) -> Result<Outcome> {
        let upload = input
            .workbook
            .as_ref()
            .ok_or_else(|| NettoolsError::missing("workbook"))?;
        if upload.extension().as_deref() == Some("xls") {
            return Err(NettoolsError::parse(format!(
                "'{}' is a legacy .xls file; save it as .xlsx first",
                upload.file_name
            )));
        }

        let workbook = Workbook::load_from_bytes(&upload.bytes)?;
        let (default_a, default_b) = default_sheet_pair(&workbook)?;
        let sheet_a = input.sheet_a.as_deref().unwrap_or(&default_a);
        let sheet_b = input.sheet_b.as_deref().unwrap_or(&default_b);
        let result = diff_sheets(&workbook, sheet_a, sheet_b, input.options, input.grid)?;

        match mode {
            RunMode::Preview => Ok(Outcome::Diff(result)),
            RunMode::Artifact => {
                let mut report = export_workbook(&result.records)?;
                report.set_compression(self.compression);
                Ok(Outcome::Artifact(Artifact {
                    file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
                    content_type: Some(XLSX_CONTENT_TYPE.to_string()),
                    bytes: report.save_to_bytes()?,
                }))
            }
        }
    }
}

/// Content type of `.xlsx` files.
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn preview_table(response: &RemoteResponse) -> Result<Table> {
    let value: Value = serde_json::from_slice(&response.body)
        .map_err(|e| NettoolsError::parse(format!("preview response is not JSON: {}", e)))?;

    if let Some(error) = value.get("error") {
        return Err(NettoolsError::RemoteCallFailure {
            status: response.status,
            message: match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        });
    }
    Table::from_json(&value)
}

fn failure(response: &RemoteResponse) -> NettoolsError {
    let body = response.text();
    let body = body.trim();
    let message = if body.is_empty() {
        reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    };
    warn!(status = response.status, %message, "remote call failed");
    NettoolsError::RemoteCallFailure {
        status: response.status,
        message,
    }
}

/// File name from a `Content-Disposition` header, reduced to its last path
/// component.
///
/// Handles `filename=x`, `filename="x"` and RFC 5987 `filename*=UTF-8''x`
/// (percent-decoded), preferring the latter.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            "filename*" => {
                let value = value.trim();
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                extended = percent_decode(encoded);
            }
            _ => {}
        }
    }

    extended
        .or(plain)
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or_default().to_string())
        .filter(|name| !name.is_empty() && name != "." && name != "..")
}

fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
