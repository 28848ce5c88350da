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
//! Library for reshaping packet-level simulator captures into per-flow datasets and deriving
//! windowed throughput, delay, queue and drop metrics from them.

pub mod device;
pub mod error;
pub mod experiment;
pub mod merge;
pub mod normalize;
pub mod plot;
pub mod queue;
pub mod records;
pub mod report;
pub mod stats;
pub mod util;
pub mod window;

#[cfg(test)]
mod test;

pub use error::Error;

pub mod prelude {
    pub use super::{
        device::{Bottleneck, DeviceId, Topology},
        error::Error,
        experiment::{EvalConfig, RunConfig},
        records::{DropEvent, PacketRecord, QueueSample, SenderRecord},
        report::ReportOptions,
        util::TimeSeries,
        window::{Boundary, WindowSpec},
    };
}
