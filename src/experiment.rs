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
//! Layout of the result directories written by the simulation runs.
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    device::Topology,
    util::PathBufExt,
    Error,
};

/// File name prefix of all captures of a run.
pub const DEFAULT_PREFIX: &str = "small_test_no_disturbance_with_message_ids";

/// Sender counts of the large-scale scenarios, which all share the same naming scheme.
const LARGE_SCENARIOS: [usize; 9] = [30, 50, 60, 75, 80, 90, 100, 120, 125];

/// Sender counts for which the simulator writes sender-side transmit captures.
const TRACED_SENDERS: [usize; 3] = [1, 3, 6];

/// Node index of the first sender.
const FIRST_SENDER_NODE: usize = 4;

/// Parameters of a simulation run, which determine where its results are stored.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Directory that contains the results of all runs.
    #[arg(long = "path", default_value = "results_test/")]
    pub results: PathBuf,
    /// Base sending rate of the applications in Mbps.
    #[arg(long = "apprate")]
    pub app_rate: u32,
    /// Number of senders.
    #[arg(long = "n_senders")]
    pub n_senders: usize,
    /// Random seed of the run.
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
    /// TCP congestion control algorithm.
    #[arg(long, default_value = "cubic")]
    pub tcpcc: String,
    /// Bottleneck bandwidth in Mbps.
    #[arg(long, default_value_t = 5)]
    pub bw: u32,
    /// Bottleneck queue size in packets.
    #[arg(long, default_value_t = 10)]
    pub qs: u32,
    /// The applications send an infinite amount of data.
    #[arg(long = "infinitedata")]
    pub infinite_data: bool,
    /// Connections are reset during the run.
    #[arg(long)]
    pub rst: bool,
    /// File name prefix of the captures.
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub capture_prefix: String,
}

impl RunConfig {
    /// Name of the run directory.
    pub fn run_dir_name(&self) -> Result<String, Error> {
        let Self {
            app_rate,
            n_senders,
            seed,
            tcpcc,
            bw,
            qs,
            infinite_data,
            rst,
            ..
        } = self;
        let large = LARGE_SCENARIOS.contains(n_senders);
        Ok(match (*app_rate, *n_senders) {
            (1, 1) if *infinite_data => format!("1Mbps_1sender_inf_{tcpcc}_{seed}_{bw}mbps"),
            (1, 1) => format!("1Mbps_1sender_{tcpcc}_{seed}_{bw}mbps"),
            (10, 1) => "10Mbps_1sender".to_string(),
            (1, 3) if *infinite_data || *rst => {
                let cc = if tcpcc == "bbr" { "bbr" } else { "cubic" };
                format!("1Mbps_3senders_inf_rst_{cc}_{seed}_{bw}mbps")
            }
            (1, 3) => format!("1Mbps_3senders_{seed}"),
            (10, 3) => "10Mbps_3senders".to_string(),
            (1, 6) if *infinite_data => {
                format!("1Mbps_6senders_inf_rst_{tcpcc}_{seed}_{bw}mbps_qs_{qs}")
            }
            (1, 6) if *rst => format!("1Mbps_6senders_rst_{seed}"),
            (1, 6) => "1Mbps_6senders".to_string(),
            (10, 6) => "10Mbps_6senders".to_string(),
            (1, n) if large && !*rst => format!("1Mbps_{n}senders"),
            (1, n) if large && *infinite_data => {
                format!("1Mbps_{n}senders_inf_rst_{tcpcc}_{seed}_{bw}mbps_qs_{qs}")
            }
            (1, n) if large => format!("1Mbps_{n}senders_rst_{tcpcc}_{seed}_{bw}mbps_qs_{qs}"),
            (app_rate, n_senders) => {
                return Err(Error::UnknownScenario {
                    app_rate,
                    n_senders,
                })
            }
        })
    }

    /// Resolve the run directory and create it if it does not exist yet.
    pub fn prepare(&self) -> Result<RunLayout, Error> {
        let dir = self.results.as_path().then(self.run_dir_name()?);
        if !dir.is_dir() {
            log::info!("Creating run directory {dir:?}");
            fs::create_dir_all(&dir)?;
        }
        Ok(RunLayout {
            dir,
            seed: self.seed,
            prefix: self.capture_prefix.clone(),
            n_senders: self.n_senders,
        })
    }
}

/// Files of one run directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLayout {
    pub dir: PathBuf,
    pub seed: u64,
    pub prefix: String,
    pub n_senders: usize,
}

impl RunLayout {
    fn file(&self, suffix: &str) -> PathBuf {
        self.dir
            .as_path()
            .then_seed(format!("{}{{}}{suffix}", self.prefix), self.seed)
    }

    /// Raw receiver-side capture of all senders.
    pub fn captures(&self) -> Vec<PathBuf> {
        vec![self.file(".csv")]
    }

    /// Cached combined frame of all captures.
    pub fn merged(&self) -> PathBuf {
        self.file("_merged.csv")
    }

    /// Raw sender-side transmit captures, one per sender. Only written for small runs.
    pub fn sender_captures(&self) -> Vec<PathBuf> {
        if !TRACED_SENDERS.contains(&self.n_senders) {
            log::info!(
                "No sender captures for {} senders (too many to plot)",
                self.n_senders
            );
            return Vec::new();
        }
        (0..self.n_senders)
            .map(|i| self.file(&format!("_sender_{}.csv", FIRST_SENDER_NODE + i)))
            .collect()
    }

    /// Queue log of the run. The simulator writes `<prefix><seed>_queues.csv`, which is renamed
    /// to `queue.csv` the first time it is used.
    pub fn queue_log(&self) -> Result<PathBuf, Error> {
        let queue = self.dir.as_path().then("queue.csv");
        let raw = self.file("_queues.csv");
        if !queue.exists() && raw.exists() {
            log::info!("Renaming {raw:?} to {queue:?}");
            fs::rename(&raw, &queue)?;
        }
        Ok(queue)
    }

    pub fn drop_log(&self) -> PathBuf {
        self.file("_drops.csv")
    }

    pub fn timeseries_chart(&self, left: f64, right: f64) -> PathBuf {
        self.dir
            .as_path()
            .then(format!("plot_timeseries_start_{left}_stop_{right}.html"))
    }

    pub fn queue_chart(&self, switch: &str) -> PathBuf {
        self.dir
            .as_path()
            .then(format!("Queue_profile_on_switch_{switch}.html"))
    }

    pub fn drops_chart(&self) -> PathBuf {
        self.dir.as_path().then("packet_drops.html")
    }

    pub fn per_flow_chart(&self) -> PathBuf {
        self.dir.as_path().then("per_flow_rates.html")
    }

    pub fn summary(&self) -> PathBuf {
        self.dir.as_path().then("summary.json")
    }
}

/// Parameters of the quick evaluation of a single capture.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Random seed of the run, used to find the capture.
    pub seed: u64,
    /// Directory that contains the capture, `queue.csv` and `drops.csv`.
    #[arg(long, default_value = "results/")]
    pub results: PathBuf,
    /// Simulated topology.
    #[arg(long, value_enum, default_value_t = Topology::Small)]
    pub topology: Topology,
    /// Evaluate the run with a disturbance instead of the undisturbed one.
    #[arg(long)]
    pub disturbance: bool,
    /// Evaluate this capture instead of the one derived from topology and seed.
    #[arg(long)]
    pub capture: Option<PathBuf>,
}

impl EvalConfig {
    pub fn capture(&self) -> PathBuf {
        match &self.capture {
            Some(path) => path.clone(),
            None => evaluation_capture_path(
                &self.results,
                self.topology,
                self.disturbance,
                self.seed,
            ),
        }
    }

    pub fn queue_log(&self) -> PathBuf {
        self.results.as_path().then("queue.csv")
    }

    pub fn drop_log(&self) -> PathBuf {
        self.results.as_path().then("drops.csv")
    }

    pub fn chart(&self, name: &str) -> PathBuf {
        self.results.as_path().then(format!("{name}.html"))
    }

    pub fn summary(&self) -> PathBuf {
        self.results.as_path().then("summary.json")
    }
}

/// Name template (with `{}` for the seed) of the capture analyzed by the evaluation.
pub fn evaluation_capture(topology: Topology, disturbance: bool) -> &'static str {
    match (topology, disturbance) {
        (Topology::Small, false) => "small_test_no_disturbance_with_message_ids{}.csv",
        (Topology::Small, true) => "small_test_one_disturbance_with_message_ids{}.csv",
        (Topology::Large, _) => "large_test_disturbance_with_message_ids{}.csv",
    }
}

/// Path of the evaluated capture in `results`.
pub fn evaluation_capture_path(
    results: &Path,
    topology: Topology,
    disturbance: bool,
    seed: u64,
) -> PathBuf {
    results.then_seed(evaluation_capture(topology, disturbance), seed)
}
