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
//! Queue occupancy and drop logs of the simulated devices.
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{
    device::{Bottleneck, DeviceId},
    records::{DropEvent, QueueSample, Timed},
    util::{self, TimeSeries},
    Error,
};

/// Read a headerless log, skipping (and logging) every line that cannot be parsed.
fn read_log<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Error> {
    util::require_file(path)?;
    log::debug!("Loading: {path:?}");
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut result = Vec::new();
    let mut skipped = 0;
    for (line, record) in csv.deserialize::<T>().enumerate() {
        match record {
            Ok(x) => result.push(x),
            Err(e) => {
                log::warn!("Skipping line {} of {path:?}: {e}", line + 1);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed lines in {path:?}");
    }
    Ok(result)
}

/// Read a queue log with lines `<device path>,<time>,<packets in queue>`.
pub fn read_queue_log(path: impl AsRef<Path>) -> Result<QueueLog, Error> {
    Ok(QueueLog {
        samples: read_log(path.as_ref())?,
    })
}

/// Read a drop log with lines `<device path>,<time>,<packet size>[,<sequence number>]`.
pub fn read_drop_log(path: impl AsRef<Path>) -> Result<Vec<DropEvent>, Error> {
    read_log(path.as_ref())
}

/// All queue samples of a run, in log order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueLog {
    pub samples: Vec<QueueSample>,
}

impl QueueLog {
    /// Queue occupancy over time of a single device. Empty if the device never appears.
    pub fn series(&self, device: &DeviceId) -> TimeSeries<u32> {
        let series: TimeSeries<u32> = self
            .samples
            .iter()
            .filter(|s| &s.source == device)
            .map(|s| (s.time, s.size))
            .collect();
        if series.is_empty() {
            log::debug!("No queue samples for {device}");
        }
        series
    }

    /// Queue occupancy of each bottleneck, in the given order.
    pub fn extract(&self, devices: &[Bottleneck]) -> Vec<(Bottleneck, TimeSeries<u32>)> {
        devices
            .iter()
            .map(|b| (b.clone(), self.series(&b.device)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Fraction of dropped packets among all packets, `drops / (drops + surviving)`.
pub fn drop_fraction(drops: usize, surviving: usize) -> f64 {
    let total = drops + surviving;
    if total == 0 {
        0.0
    } else {
        drops as f64 / total as f64
    }
}

/// Drops over time (packet size at the time of the drop).
pub fn drop_series(drops: &[DropEvent]) -> TimeSeries<u32> {
    drops.iter().map(|d| (d.time(), d.size())).collect()
}
