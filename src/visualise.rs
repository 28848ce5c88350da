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
//! Time-series report of a single simulation run: sending rates, delay, throughput, bottleneck
//! queues and drops.

use clap::Parser;

use simtrace::{
    device::Topology,
    experiment::RunConfig,
    report::{self, ReportOptions},
    util,
    window::{Boundary, WindowSpec},
};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(flatten)]
    run: RunConfig,
    /// Start of the first window in seconds.
    #[arg(long, default_value_t = 1.0)]
    start: f64,
    /// No window starts at or after this time (in seconds).
    #[arg(long, default_value_t = 60.0)]
    stop: f64,
    /// Distance between the starts of two consecutive windows in seconds.
    #[arg(long, default_value_t = 0.005)]
    step: f64,
    /// Width of each window in seconds.
    #[arg(long = "bin", default_value_t = 1.0)]
    width: f64,
    /// Whether a window includes packets exactly at its end.
    #[arg(long, value_enum, default_value_t = Boundary::Closed)]
    boundary: Boundary,
    /// Simulated topology, which determines the bottleneck switches.
    #[arg(long, value_enum, default_value_t = Topology::Small)]
    topology: Topology,
    /// Also plot the rate of every application.
    #[arg(long)]
    per_flow: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();

    let options = ReportOptions {
        window: WindowSpec::new(args.start, args.stop, args.step, args.width)?
            .with_boundary(args.boundary),
        topology: args.topology,
        per_flow: args.per_flow,
    };

    let summary = report::visualise(&args.run, &options)?;
    log::info!(
        "Processed {} packets and {} drops (drop fraction {})",
        summary.packets,
        summary.drops,
        summary.drop_fraction
    );

    Ok(())
}
