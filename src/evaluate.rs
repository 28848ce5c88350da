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
//! Quick evaluation of a single capture: delay distribution, throughput, bottleneck queues and
//! the drop fraction.

use clap::Parser;

use simtrace::{experiment::EvalConfig, report, util};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(flatten)]
    eval: EvalConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();
    let summary = report::evaluate(&args.eval)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
