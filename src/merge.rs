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
//! Combine the normalized per-sender captures of a run into one frame.
use std::path::{Path, PathBuf};

use crate::{normalize, records::PacketRecord, util, Error};

/// Concatenate the frames in the given order. Rows are neither sorted nor deduplicated.
pub fn merge(frames: impl IntoIterator<Item = Vec<PacketRecord>>) -> Vec<PacketRecord> {
    frames.into_iter().flatten().collect()
}

/// Load the combined frame from `combined` if it exists. Otherwise, normalize every capture
/// (using its position as sender index), merge them and write the result to `combined`.
pub fn load_or_merge(
    combined: impl AsRef<Path>,
    captures: &[PathBuf],
) -> Result<Vec<PacketRecord>, Error> {
    let combined = combined.as_ref();
    if combined.is_file() {
        log::info!("Loading merged capture {combined:?}");
        return util::read_csv(combined);
    }

    let frames = captures
        .iter()
        .enumerate()
        .map(|(sender, path)| normalize::load_or_normalize_capture(path, sender as u32))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = merge(frames);
    log::info!(
        "Merged {} captures into {} packets, writing {combined:?}",
        captures.len(),
        merged.len()
    );
    util::write_csv(combined, &merged)?;
    Ok(merged)
}
