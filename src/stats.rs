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
//! Summary statistics of a run.
use std::{collections::BTreeMap, fs, net::Ipv4Addr, path::Path};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics};

use crate::{records::PacketRecord, util::TimeSeries, Error};

/// Empirical CDF: sorted values on x, cumulative fraction in `(0, 1]` on y.
pub fn ecdf(values: impl IntoIterator<Item = f64>) -> TimeSeries<f64> {
    let mut values = values.into_iter().collect_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len() as f64;
    values
        .into_iter()
        .enumerate()
        .map(|(i, x)| (x, (i + 1) as f64 / n))
        .collect()
}

/// Quantiles `taus` (each in `[0, 1]`) of `values`, or `None` if there are no values.
pub fn quantiles(values: &[f64], taus: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    let mut data = Data::new(values.to_vec());
    Some(taus.iter().map(|tau| data.quantile(*tau)).collect())
}

/// Mean throughput in MiB/s of all packets received after `after` seconds, assuming the
/// receiving phase lasts `duration` seconds.
pub fn mean_throughput(records: &[PacketRecord], after: f64, duration: f64) -> f64 {
    let bytes: u64 = records
        .iter()
        .filter(|r| r.timestamp > after)
        .map(|r| r.packet_size as u64)
        .sum();
    bytes as f64 / duration / (1024.0 * 1024.0)
}

/// Partition the packets by receiver, ordered by address.
pub fn group_by_destination(records: &[PacketRecord]) -> BTreeMap<Ipv4Addr, Vec<&PacketRecord>> {
    records
        .iter()
        .into_group_map_by(|r| r.dst_ip)
        .into_iter()
        .collect()
}

/// Key figures of a run, stored as `summary.json` next to the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub packets: usize,
    pub drops: usize,
    pub drop_fraction: f64,
    /// Median delay in seconds.
    pub delay_p50: Option<f64>,
    /// 99th percentile delay in seconds.
    pub delay_p99: Option<f64>,
    /// Throughput in MiB/s after the warm-up.
    pub throughput: f64,
}

impl RunSummary {
    /// Throughput is measured from `after` seconds on, over `duration` seconds.
    pub fn new(records: &[PacketRecord], drops: usize, after: f64, duration: f64) -> Self {
        let delays = records.iter().map(|r| r.delay).collect_vec();
        let (delay_p50, delay_p99) = match quantiles(&delays, &[0.5, 0.99]).as_deref() {
            Some([p50, p99]) => (Some(*p50), Some(*p99)),
            _ => (None, None),
        };
        Self {
            packets: records.len(),
            drops,
            drop_fraction: crate::queue::drop_fraction(drops, records.len()),
            delay_p50,
            delay_p99,
            throughput: mean_throughput(records, after, duration),
        }
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        log::debug!("Writing summary to {path:?}");
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
