//! Core library for nettools: xlsx workbook I/O, the sheet diff engine and
//! its report export, and the client for the remote log/config processing API.
//!
//! # Example
//!
//! ```no_run
//! use nettools_core::{diff_sheets, DiffOptions, GridOptions, Workbook};
//!
//! let workbook = Workbook::load("inventory.xlsx")?;
//! let result = diff_sheets(&workbook, "Before", "After", DiffOptions::default(), GridOptions::default())?;
//! for record in &result.records {
//!     println!("{}{} {}: {} -> {}", record.column, record.row, record.status, record.value_a, record.value_b);
//! }
//! # Ok::<(), nettools_core::NettoolsError>(())
//! ```

pub mod cell;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod grid;
pub mod table;
pub mod tools;
pub mod upload;
pub mod utils;
pub mod workbook;
pub mod worksheet;
mod writer;

pub use cell::{format_number, CellValue};
pub use client::{filename_from_disposition, ApiClient, Artifact, HttpTransport, Outcome, RemoteResponse, Transport};
pub use config::Config;
pub use diff::{default_sheet_pair, diff, diff_sheets, DiffCounts, DiffOptions, DiffRecord, DiffStatus, SheetDiff};
pub use error::{ErrorKind, NettoolsError, Result};
pub use export::{
    export_to_bytes, export_to_file, export_workbook, records_from_workbook, DEFAULT_EXPORT_FILE_NAME,
    EXPORT_HEADER, EXPORT_SHEET_NAME,
};
pub use grid::{Grid, GridOptions};
pub use table::Table;
pub use tools::{
    DirectoryListingInput, DistributeInput, ExtractInput, LldpInput, LogFormat, MergeInput, RunMode,
    SecureCrtInput, SheetDiffInput, Tool, ToolKind,
};
pub use upload::{MultipartForm, Upload};
pub use utils::{column_letter, column_to_letter, coordinate_from_row_col, letter_to_column, parse_coordinate};
pub use workbook::{CompressionLevel, Workbook};
pub use worksheet::{CellData, Worksheet};
