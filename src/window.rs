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
//! Fixed-width, possibly overlapping time windows over irregularly timestamped records.
//!
//! Window `i` starts at `start + i * step` and covers `[t, t + width]`. With the default
//! [`Boundary::Closed`], a record whose timestamp is exactly on the border of two adjacent windows
//! is counted in both of them. [`Boundary::HalfOpen`] counts it only in the later one.
use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    records::{PacketRecord, Timed},
    util::TimeSeries,
    Error,
};

/// Which end of a window includes samples exactly on the border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Boundary {
    /// `[t, t + width]`
    #[default]
    Closed,
    /// `[t, t + width)`
    HalfOpen,
}

/// Upper bound on the number of windows of a [`WindowSpec`].
pub const MAX_WINDOWS: usize = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSpec {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    pub width: f64,
    pub boundary: Boundary,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            start: 1.0,
            stop: 60.0,
            step: 0.005,
            width: 1.0,
            boundary: Boundary::Closed,
        }
    }
}

impl WindowSpec {
    pub fn new(start: f64, stop: f64, step: f64, width: f64) -> Result<Self, Error> {
        let spec = Self {
            start,
            stop,
            step,
            width,
            boundary: Boundary::Closed,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_boundary(self, boundary: Boundary) -> Self {
        Self { boundary, ..self }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if ![self.start, self.stop, self.step, self.width]
            .iter()
            .all(|x| x.is_finite())
        {
            return Err(Error::InvalidWindow("all parameters must be finite"));
        }
        if self.step <= 0.0 {
            return Err(Error::InvalidWindow("step must be positive"));
        }
        if self.width <= 0.0 {
            return Err(Error::InvalidWindow("width must be positive"));
        }
        if self.stop < self.start {
            return Err(Error::InvalidWindow("stop must not be before start"));
        }
        if (self.stop - self.start) / self.step > MAX_WINDOWS as f64 {
            return Err(Error::InvalidWindow("too many windows"));
        }
        Ok(())
    }

    /// Number of windows, `floor((stop - start) / step)`. Quotients that are within rounding
    /// error of an integer are treated as that integer. A trailing partial step does not start
    /// another window, so `(0, 10, 3)` gives windows at 0, 3 and 6.
    pub fn len(&self) -> usize {
        let n = (self.stop - self.start) / self.step;
        let rounded = n.round();
        if (n - rounded).abs() <= 1e-9 * rounded.max(1.0) {
            rounded as usize
        } else {
            n.floor() as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregate of all samples in one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f64,
    pub count: usize,
    pub sum: f64,
}

/// `(time, value)` samples sorted by time.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    points: Vec<(f64, f64)>,
}

impl FromIterator<(f64, f64)> for Samples {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut points = iter.into_iter().collect_vec();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { points }
    }
}

impl Samples {
    /// Use the timestamp and size (in bytes) of each record.
    pub fn sizes<'a, R: Timed + 'a>(records: impl IntoIterator<Item = &'a R>) -> Self {
        records
            .into_iter()
            .map(|r| (r.time(), r.size() as f64))
            .collect()
    }

    /// Lazily aggregate the samples over all windows of `spec`. Each call starts over.
    pub fn windows(&self, spec: &WindowSpec) -> Result<Windows<'_>, Error> {
        spec.validate()?;
        Ok(Windows {
            points: &self.points,
            spec: *spec,
            next: 0,
            len: spec.len(),
        })
    }
}

/// Iterator over the windows of a [`WindowSpec`], see [`Samples::windows`].
pub struct Windows<'a> {
    points: &'a [(f64, f64)],
    spec: WindowSpec,
    next: usize,
    len: usize,
}

impl Iterator for Windows<'_> {
    type Item = Window;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let start = self.spec.start + self.next as f64 * self.spec.step;
        let end = start + self.spec.width;
        self.next += 1;

        let lo = self.points.partition_point(|(t, _)| *t < start);
        let hi = match self.spec.boundary {
            Boundary::Closed => self.points.partition_point(|(t, _)| *t <= end),
            Boundary::HalfOpen => self.points.partition_point(|(t, _)| *t < end),
        };
        let inside = &self.points[lo..hi.max(lo)];
        Some(Window {
            start,
            count: inside.len(),
            sum: inside.iter().map(|(_, v)| v).sum(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next.min(self.len);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows<'_> {}

/// Packets, bytes and rate per window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendingRate {
    pub t: Vec<f64>,
    pub counts: Vec<usize>,
    pub bytes: Vec<u64>,
    /// Rate in Mbit/s.
    pub rates: Vec<f64>,
}

impl SendingRate {
    pub fn rate_series(&self) -> TimeSeries<f64> {
        TimeSeries {
            t: self.t.clone(),
            y: self.rates.clone(),
        }
    }
}

/// Rate in Mbit/s of `bytes` transmitted within `width` seconds.
pub fn mbps(bytes: f64, width: f64) -> f64 {
    bytes * 8.0 / width / 1e6
}

/// Compute packet counts, byte totals and the rate in Mbit/s for every window.
pub fn sending_rate<R: Timed>(records: &[R], spec: &WindowSpec) -> Result<SendingRate, Error> {
    let samples = Samples::sizes(records);
    let mut result = SendingRate::default();
    for window in samples.windows(spec)? {
        result.t.push(window.start);
        result.counts.push(window.count);
        result.bytes.push(window.sum as u64);
        result.rates.push(mbps(window.sum, spec.width));
    }
    Ok(result)
}

/// Rate in Mbit/s for every window.
pub fn throughput<R: Timed>(records: &[R], spec: &WindowSpec) -> Result<TimeSeries<f64>, Error> {
    Ok(Samples::sizes(records)
        .windows(spec)?
        .map(|w| (w.start, mbps(w.sum, spec.width)))
        .collect())
}

/// Delay and rate series of a single application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowSeries {
    /// End-to-end delay (in seconds) of every packet.
    pub delay: TimeSeries<f64>,
    /// Windowed rate in Mbit/s.
    pub rate: TimeSeries<f64>,
}

/// Split the records by application id and compute the delay and rate series of each. The number
/// of distinct application ids must be exactly `expected`.
pub fn per_flow(
    records: &[PacketRecord],
    spec: &WindowSpec,
    expected: usize,
) -> Result<BTreeMap<u32, FlowSeries>, Error> {
    spec.validate()?;
    let flows: BTreeMap<u32, Vec<&PacketRecord>> = records
        .iter()
        .into_group_map_by(|r| r.application_id)
        .into_iter()
        .collect();
    if flows.len() != expected {
        return Err(Error::FlowCountMismatch {
            expected,
            found: flows.len(),
        });
    }

    flows
        .into_iter()
        .map(|(app, packets)| {
            let delay = packets.iter().map(|r| (r.timestamp, r.delay)).collect();
            let rate = Samples::sizes(packets.iter().copied())
                .windows(spec)?
                .map(|w| (w.start, mbps(w.sum, spec.width)))
                .collect();
            log::trace!("Application {app}: {} packets", packets.len());
            Ok((app, FlowSeries { delay, rate }))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::records::test::packet;

    fn packets(ts: &[f64], size: u32) -> Vec<PacketRecord> {
        ts.iter().map(|t| packet(*t, size, 0)).collect()
    }

    #[test]
    fn two_windows() {
        let records = packets(&[2.0, 4.0, 6.0, 8.0], 100);
        let spec = WindowSpec::new(0.0, 10.0, 5.0, 5.0).unwrap();
        let rate = sending_rate(&records, &spec).unwrap();
        assert_eq!(rate.t, vec![0.0, 5.0]);
        assert_eq!(rate.counts, vec![2, 2]);
        assert_eq!(rate.bytes, vec![200, 200]);
        assert_eq!(rate.rates, vec![mbps(200.0, 5.0); 2]);
        assert!((rate.rates[0] - 0.00032).abs() < 1e-12);
    }

    #[test]
    fn border_sample_counted_twice_when_closed() {
        let records = packets(&[2.0, 5.0, 8.0], 100);
        let spec = WindowSpec::new(0.0, 10.0, 5.0, 5.0).unwrap();

        let closed = sending_rate(&records, &spec).unwrap();
        assert_eq!(closed.counts, vec![2, 2]);

        let half_open = sending_rate(&records, &spec.with_boundary(Boundary::HalfOpen)).unwrap();
        assert_eq!(half_open.counts, vec![1, 2]);
    }

    #[test]
    fn overlapping_windows() {
        let records = packets(&[0.5, 1.5, 2.5], 10);
        let spec = WindowSpec::new(0.0, 3.0, 1.0, 2.0).unwrap();
        let rate = sending_rate(&records, &spec).unwrap();
        assert_eq!(rate.t, vec![0.0, 1.0, 2.0]);
        assert_eq!(rate.counts, vec![2, 2, 1]);
    }

    #[test]
    fn number_of_windows() {
        for (start, stop, step, n) in [
            (0.0, 10.0, 5.0, 2),
            (0.0, 10.0, 3.0, 3),
            (1.0, 60.0, 0.005, 11800),
            (0.0, 1.0, 0.1, 10),
            (2.0, 2.0, 1.0, 0),
        ] {
            let spec = WindowSpec::new(start, stop, step, 1.0).unwrap();
            assert_eq!(spec.len(), n, "{spec:?}");
            let samples = Samples::default();
            let windows = samples.windows(&spec).unwrap();
            assert_eq!(windows.len(), n);
            let starts = windows.map(|w| w.start).collect_vec();
            assert_eq!(starts.len(), n);
            assert_eq!(starts.first().copied(), (n > 0).then_some(start));
        }
    }

    #[test]
    fn windows_match_direct_sum() {
        // deterministic pseudo-random timestamps and sizes, in no particular order
        let mut x: u64 = 42;
        let mut next = || {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            x >> 33
        };
        let records = (0..500)
            .map(|_| {
                let t = (next() % 10_000) as f64 / 1000.0;
                let size = (next() % 1500) as u32 + 40;
                packet(t, size, 0)
            })
            .collect::<Vec<_>>();

        for boundary in [Boundary::Closed, Boundary::HalfOpen] {
            let spec = WindowSpec::new(0.5, 9.5, 0.25, 0.75)
                .unwrap()
                .with_boundary(boundary);
            let rate = sending_rate(&records, &spec).unwrap();
            assert_eq!(rate.t.len(), 36);
            for (i, t) in rate.t.iter().enumerate() {
                let inside = records.iter().filter(|r| match boundary {
                    Boundary::Closed => r.timestamp >= *t && r.timestamp <= t + spec.width,
                    Boundary::HalfOpen => r.timestamp >= *t && r.timestamp < t + spec.width,
                });
                let (count, bytes) =
                    inside.fold((0, 0), |(c, b), r| (c + 1, b + r.packet_size as u64));
                assert_eq!(rate.counts[i], count);
                assert_eq!(rate.bytes[i], bytes);
            }
        }
    }

    #[test]
    fn windows_restart() {
        let samples: Samples = [(1.0, 1.0), (2.0, 2.0)].into_iter().collect();
        let spec = WindowSpec::new(0.0, 4.0, 1.0, 1.0).unwrap();
        let first = samples.windows(&spec).unwrap().collect_vec();
        let second = samples.windows(&spec).unwrap().collect_vec();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|w| w.sum).collect_vec(),
            vec![1.0, 3.0, 2.0, 0.0]
        );
    }

    #[test]
    fn invalid_windows() {
        assert!(matches!(
            WindowSpec::new(0.0, 10.0, 0.0, 1.0),
            Err(Error::InvalidWindow(_))
        ));
        assert!(matches!(
            WindowSpec::new(0.0, 10.0, 1.0, -1.0),
            Err(Error::InvalidWindow(_))
        ));
        assert!(matches!(
            WindowSpec::new(10.0, 0.0, 1.0, 1.0),
            Err(Error::InvalidWindow(_))
        ));
        assert!(matches!(
            WindowSpec::new(0.0, f64::INFINITY, 1.0, 1.0),
            Err(Error::InvalidWindow(_))
        ));
        assert!(matches!(
            WindowSpec::new(1.0, 60.0, 1e-15, 1.0),
            Err(Error::InvalidWindow("too many windows"))
        ));
        assert!(matches!(
            WindowSpec::new(f64::MIN, f64::MAX, 1.0, 1.0),
            Err(Error::InvalidWindow("too many windows"))
        ));
        let spec = WindowSpec::new(0.0, MAX_WINDOWS as f64, 1.0, 1.0).unwrap();
        assert_eq!(spec.len(), MAX_WINDOWS);
        let spec = WindowSpec {
            step: -1.0,
            ..Default::default()
        };
        assert!(throughput::<PacketRecord>(&[], &spec).is_err());
    }

    #[test]
    fn per_flow_partitions_by_application() {
        let records = vec![
            packet(0.5, 100, 7),
            packet(0.6, 200, 3),
            packet(1.5, 100, 7),
            packet(1.6, 300, 3),
        ];
        let spec = WindowSpec::new(0.0, 2.0, 1.0, 1.0)
            .unwrap()
            .with_boundary(Boundary::HalfOpen);
        let flows = per_flow(&records, &spec, 2).unwrap();
        assert_eq!(flows.keys().copied().collect_vec(), vec![3, 7]);
        assert_eq!(flows[&3].delay.t, vec![0.6, 1.6]);
        assert_eq!(
            flows[&3].rate.y,
            vec![mbps(200.0, 1.0), mbps(300.0, 1.0)]
        );
        assert_eq!(flows[&7].rate.t, vec![0.0, 1.0]);

        assert!(matches!(
            per_flow(&records, &spec, 3),
            Err(Error::FlowCountMismatch {
                expected: 3,
                found: 2
            })
        ));
    }
}
