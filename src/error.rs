// SimTrace: Time-Series Analysis and Visualization of Packet-Level Network Simulator Traces
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Error type shared by all processing stages.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Required file {0:?} does not exist")]
    MissingFile(PathBuf),
    #[error("Schema mismatch in {file:?}, row {row}: {reason}")]
    SchemaMismatch {
        file: PathBuf,
        row: usize,
        reason: String,
    },
    #[error("Cannot parse {column} = {value:?} in {file:?}, row {row}")]
    InvalidValue {
        file: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Capture {0:?} has {1} rows, but at least 2 are required to patch the first row")]
    TooFewRows(PathBuf, usize),
    #[error("Expected {expected} distinct application ids, but found {found}")]
    FlowCountMismatch { expected: usize, found: usize },
    #[error("Invalid window: {0}")]
    InvalidWindow(&'static str),
    #[error("A figure can hold at most {max} panels, but {found} were given")]
    TooManyPanels { found: usize, max: usize },
    #[error("No run directory is defined for {app_rate} Mbps with {n_senders} senders")]
    UnknownScenario { app_rate: u32, n_senders: usize },
}
