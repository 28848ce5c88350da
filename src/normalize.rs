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
//! Normalization of the raw captures written by the simulator into the canonical schema.
//!
//! The simulator writes every value preceded by a label column, e.g.,
//!
//! ```text
//! Tx sent at:, 1.2, Flow id is, 1, Packet uid is, 877, Packet size is, 1078, ...
//! ```
//!
//! The labels are checked against a versioned [`Schema`] when loading, and the values are mapped
//! onto the canonical column names of [`PacketRecord`] and [`SenderRecord`].
use std::{collections::HashMap, path::Path};

use csv::StringRecord;
use serde::de::DeserializeOwned;

use crate::{
    records::{PacketRecord, SenderRecord, PACKET_COLUMNS},
    util::{self, final_path},
    Error,
};

/// Header of the canonical sender-side capture, in column order.
pub const SENDER_COLUMNS: [&str; 4] = [
    "Timestamp",
    "Packet Size",
    "Packet ID",
    "TCP Sequence Number",
];

/// Fields of the first row that are malformed and reset to zero.
const ZEROED_FIRST_ROW: [&str; 5] = ["Packet ID", "IP ID", "DSCP", "ECN", "TCP Sequence Number"];
/// Fields of the first row that are taken from the second row.
const COPIED_FIRST_ROW: [&str; 2] = ["Flow ID", "Message ID"];

/// Raw capture layouts, versioned together with the simulator that writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Schema {
    /// Receiver-side packet capture of TCP traffic.
    CaptureV1,
    /// Sender-side transmit capture.
    SenderTxV1,
}

impl Schema {
    /// `(label, canonical column)` pairs in the order in which they appear in the raw file.
    pub fn fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Schema::CaptureV1 => &[
                ("Tx sent at:", "Timestamp"),
                ("Flow id is", "Flow ID"),
                ("Packet uid is", "Packet ID"),
                ("Packet size is", "Packet Size"),
                ("IP ID is", "IP ID"),
                ("DSCP is", "DSCP"),
                ("ECN is", "ECN"),
                ("TTL is", "TTL"),
                ("Payload size is", "Payload Size"),
                ("Protocol is", "Proto"),
                ("Source IP is", "Source IP"),
                ("Destination IP is", "Destination IP"),
                ("TCP source port is", "TCP Source Port"),
                ("TCP destination port is", "TCP Destination Port"),
                ("TCP sequence num is", "TCP Sequence Number"),
                ("TCP current window size is", "TCP Window Size"),
                ("Delay is", "Delay"),
                ("Workload id is", "Workload ID"),
                ("Application id is", "Application ID"),
                ("Message id is", "Message ID"),
            ],
            Schema::SenderTxV1 => &[
                ("Tx sent at:", "Timestamp"),
                ("Packet size is", "Packet Size"),
                ("Packet uid is", "Packet ID"),
                ("TCP sequence num is", "TCP Sequence Number"),
            ],
        }
    }

    /// Canonical column order of the normalized output.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Schema::CaptureV1 => &PACKET_COLUMNS,
            Schema::SenderTxV1 => &SENDER_COLUMNS,
        }
    }

    /// Check the labels of a raw row and return its values in canonical column order. Columns
    /// after the last labelled value (the packet dump, or the empty field left by the trailing
    /// separator) are ignored.
    pub fn canonicalize(
        &self,
        file: &Path,
        row: usize,
        raw: &StringRecord,
    ) -> Result<Vec<String>, Error> {
        let fields = self.fields();
        if raw.len() < 2 * fields.len() {
            return Err(Error::SchemaMismatch {
                file: file.to_path_buf(),
                row,
                reason: format!(
                    "{self} expects at least {} columns, found {}",
                    2 * fields.len(),
                    raw.len()
                ),
            });
        }

        let mut values: HashMap<&str, &str> = HashMap::with_capacity(fields.len());
        for (i, (label, column)) in fields.iter().enumerate() {
            let found = &raw[2 * i];
            if found != *label {
                return Err(Error::SchemaMismatch {
                    file: file.to_path_buf(),
                    row,
                    reason: format!(
                        "{self} expects label {label:?} in column {}, found {found:?}",
                        2 * i
                    ),
                });
            }
            values.insert(*column, &raw[2 * i + 1]);
        }

        Ok(self
            .columns()
            .iter()
            .map(|column| values.get(column).copied().unwrap_or_default().to_string())
            .collect())
    }

    /// Read and canonicalize all rows of a raw file.
    fn read(&self, path: &Path) -> Result<Vec<Vec<String>>, Error> {
        util::require_file(path)?;
        log::info!("Normalizing {path:?} ({self})");
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        csv.records()
            .enumerate()
            .map(|(row, raw)| self.canonicalize(path, row, &raw?))
            .collect()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == name)
    }
}

/// Replace the malformed values of the first row: the flow and message ids are taken from the
/// second row, the packet, IP, DSCP, ECN and sequence numbers are set to zero.
fn patch_first_row(file: &Path, rows: &mut [Vec<String>]) -> Result<(), Error> {
    let schema = Schema::CaptureV1;
    let num_rows = rows.len();
    let [first, second, ..] = rows else {
        return Err(Error::TooFewRows(file.to_path_buf(), num_rows));
    };
    for column in COPIED_FIRST_ROW.iter().filter_map(|c| schema.column(c)) {
        first[column] = second[column].clone();
    }
    for column in ZEROED_FIRST_ROW.iter().filter_map(|c| schema.column(c)) {
        first[column] = "0".to_string();
    }
    Ok(())
}

/// Deserialize canonical rows, reporting the offending column on failure.
fn deserialize<T: DeserializeOwned>(
    file: &Path,
    columns: &'static [&'static str],
    rows: Vec<Vec<String>>,
) -> Result<Vec<T>, Error> {
    let headers = StringRecord::from(columns.to_vec());
    rows.into_iter()
        .enumerate()
        .map(|(row, values)| {
            let record = StringRecord::from(values);
            record.deserialize(Some(&headers)).map_err(|e| {
                if let csv::ErrorKind::Deserialize { err, .. } = e.kind() {
                    if let Some(field) = err.field().map(|f| f as usize) {
                        return Error::InvalidValue {
                            file: file.to_path_buf(),
                            row,
                            column: columns.get(field).copied().unwrap_or("?"),
                            value: record.get(field).unwrap_or_default().to_string(),
                        };
                    }
                }
                Error::Csv(e)
            })
        })
        .collect()
}

/// Normalize the raw receiver-side capture at `path`. All packets are tagged with `sender` as
/// their flow id. The result is also written to `<stem>_final.csv` next to the input.
///
/// An empty capture results in an empty frame. A capture with a single row cannot be patched
/// and is rejected.
pub fn normalize_capture(path: impl AsRef<Path>, sender: u32) -> Result<Vec<PacketRecord>, Error> {
    let path = path.as_ref();
    let schema = Schema::CaptureV1;
    let mut rows = schema.read(path)?;

    if rows.is_empty() {
        log::warn!("Capture {path:?} is empty");
    } else {
        patch_first_row(path, &mut rows)?;
    }

    let mut records: Vec<PacketRecord> = deserialize(path, schema.columns(), rows)?;
    records.iter_mut().for_each(|r| r.flow_id = sender);

    util::write_csv(final_path(path), &records)?;
    Ok(records)
}

/// Load `<stem>_final.csv` if it exists, or normalize the raw capture at `path` otherwise.
pub fn load_or_normalize_capture(
    path: impl AsRef<Path>,
    sender: u32,
) -> Result<Vec<PacketRecord>, Error> {
    let path = path.as_ref();
    let cached = final_path(path);
    if cached.is_file() {
        log::debug!("Using normalized capture {cached:?}");
        util::read_csv(cached)
    } else {
        normalize_capture(path, sender)
    }
}

/// Normalize the raw sender-side transmit capture at `path`, writing the result to
/// `<stem>_final.csv` next to the input.
pub fn normalize_sender_tx(path: impl AsRef<Path>) -> Result<Vec<SenderRecord>, Error> {
    let path = path.as_ref();
    let schema = Schema::SenderTxV1;
    let rows = schema.read(path)?;
    let records: Vec<SenderRecord> = deserialize(path, schema.columns(), rows)?;
    util::write_csv(final_path(path), &records)?;
    Ok(records)
}

/// Load `<stem>_final.csv` if it exists, or normalize the sender capture at `path` otherwise.
pub fn load_or_normalize_sender_tx(path: impl AsRef<Path>) -> Result<Vec<SenderRecord>, Error> {
    let path = path.as_ref();
    let cached = final_path(path);
    if cached.is_file() {
        log::debug!("Using normalized sender capture {cached:?}");
        util::read_csv(cached)
    } else {
        normalize_sender_tx(path)
    }
}
