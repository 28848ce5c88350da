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
//! End-to-end tests on synthetic run directories.

use std::{fs, path::Path};

use crate::{
    device::Topology,
    experiment::{EvalConfig, RunConfig, DEFAULT_PREFIX},
    normalize::test::{raw_line, write_raw},
    records::PacketRecord,
    report::{self, ReportOptions},
    util,
    window::WindowSpec,
    Error,
};

const QUEUES: &str = "\
/NodeList/2/DeviceList/0/$ns3::CsmaNetDevice/TxQueue/PacketsInQueue,0.5,1
/NodeList/3/DeviceList/0/$ns3::CsmaNetDevice/TxQueue/PacketsInQueue,0.6,1
/NodeList/2/DeviceList/0/$ns3::CsmaNetDevice/TxQueue/PacketsInQueue,0.7,0
/NodeList/0/DeviceList/0/$ns3::CsmaNetDevice/TxQueue/PacketsInQueue,0.8,3
";

const DROPS: &str = "/NodeList/2/DeviceList/0/$ns3::CsmaNetDevice/TxQueue/Drop,1.7,1078,2689\n";

fn run_config(results: &Path, n_senders: usize) -> RunConfig {
    RunConfig {
        results: results.to_path_buf(),
        app_rate: 1,
        n_senders,
        seed: 1,
        tcpcc: "cubic".to_string(),
        bw: 5,
        qs: 10,
        infinite_data: false,
        rst: false,
        capture_prefix: DEFAULT_PREFIX.to_string(),
    }
}

/// Write a capture with `n` packets (plus the sentinel row) of application `app`, and the queue
/// and drop logs, into `dir`.
fn write_run(dir: &Path, n: usize, app: u32) {
    fs::create_dir_all(dir).unwrap();
    let lines = (0..=n)
        .map(|i| {
            raw_line(
                0.5 + i as f64 * 0.5,
                &i.to_string(),
                1078,
                &(1 + i * 1024).to_string(),
                app,
                &(i / 2).to_string(),
            )
        })
        .collect::<Vec<_>>();
    write_raw(dir, &format!("{DEFAULT_PREFIX}1.csv"), &lines);
    fs::write(dir.join(format!("{DEFAULT_PREFIX}1_queues.csv")), QUEUES).unwrap();
    fs::write(dir.join(format!("{DEFAULT_PREFIX}1_drops.csv")), DROPS).unwrap();
}

fn options(per_flow: bool) -> ReportOptions {
    ReportOptions {
        window: WindowSpec::new(0.0, 4.0, 1.0, 1.0).unwrap(),
        topology: Topology::Small,
        per_flow,
    }
}

#[test]
fn visualise_single_sender_run() {
    let results = tempfile::tempdir().unwrap();
    let config = run_config(results.path(), 1);
    let dir = results.path().join("1Mbps_1sender_cubic_1_5mbps");
    write_run(&dir, 4, 1);
    write_raw(
        &dir,
        &format!("{DEFAULT_PREFIX}1_sender_4.csv"),
        &[
            "Tx sent at:, 0.4, Packet size is, 1078, Packet uid is, 0, TCP sequence num is, 1, \n"
                .to_string(),
            "Tx sent at:, 0.9, Packet size is, 1078, Packet uid is, 1, TCP sequence num is, 1025, \n"
                .to_string(),
        ],
    );

    let summary = report::visualise(&config, &options(true)).unwrap();
    assert_eq!(summary.packets, 5);
    assert_eq!(summary.drops, 1);
    assert_eq!(summary.drop_fraction, 1.0 / 6.0);
    assert_eq!(summary.delay_p50, Some(0.0125));

    for file in [
        format!("{DEFAULT_PREFIX}1_final.csv"),
        format!("{DEFAULT_PREFIX}1_merged.csv"),
        format!("{DEFAULT_PREFIX}1_sender_4_final.csv"),
        "queue.csv".to_string(),
        "plot_timeseries_start_0_stop_4.html".to_string(),
        "Queue_profile_on_switch_A.html".to_string(),
        "Queue_profile_on_switch_B.html".to_string(),
        "packet_drops.html".to_string(),
        "per_flow_rates.html".to_string(),
        "summary.json".to_string(),
    ] {
        assert!(dir.join(&file).is_file(), "{file} is missing");
    }
    assert!(!dir.join(format!("{DEFAULT_PREFIX}1_queues.csv")).exists());

    let merged: Vec<PacketRecord> =
        util::read_csv(dir.join(format!("{DEFAULT_PREFIX}1_merged.csv"))).unwrap();
    assert_eq!(merged.len(), 5);
    assert_eq!(merged[0].packet_id, 0);
    assert_eq!(merged[0].message_id, 0);
    assert!(merged.iter().all(|r| r.flow_id == 0));

    // the second run only reads the cached files
    fs::remove_file(dir.join(format!("{DEFAULT_PREFIX}1.csv"))).unwrap();
    let again = report::visualise(&config, &options(true)).unwrap();
    assert_eq!(again, summary);
}

#[test]
fn per_flow_requires_every_sender() {
    let results = tempfile::tempdir().unwrap();
    let config = run_config(results.path(), 30);
    write_run(&results.path().join("1Mbps_30senders"), 3, 2);

    // without per-flow series, the run is fine
    let summary = report::visualise(&config, &options(false)).unwrap();
    assert_eq!(summary.packets, 4);

    assert!(matches!(
        report::visualise(&config, &options(true)),
        Err(Error::FlowCountMismatch {
            expected: 30,
            found: 1
        })
    ));
}

#[test]
fn visualise_unknown_scenario() {
    let results = tempfile::tempdir().unwrap();
    let config = RunConfig {
        app_rate: 7,
        ..run_config(results.path(), 1)
    };
    assert!(matches!(
        report::visualise(&config, &options(false)),
        Err(Error::UnknownScenario {
            app_rate: 7,
            n_senders: 1
        })
    ));
    assert_eq!(fs::read_dir(results.path()).unwrap().count(), 0);
}

#[test]
fn visualise_without_drop_log() {
    let results = tempfile::tempdir().unwrap();
    let config = run_config(results.path(), 30);
    let dir = results.path().join("1Mbps_30senders");
    write_run(&dir, 2, 0);
    fs::remove_file(dir.join(format!("{DEFAULT_PREFIX}1_drops.csv"))).unwrap();
    assert!(matches!(
        report::visualise(&config, &options(false)),
        Err(Error::MissingFile(_))
    ));
}

#[test]
fn evaluate_large_topology() {
    let results = tempfile::tempdir().unwrap();
    let lines = (0..6)
        .map(|i| {
            let line = raw_line(18.0 + i as f64, &i.to_string(), 1078, "1", 1, "0");
            if i % 2 == 0 {
                line.replace("Destination IP is, 10.1.2.1", "Destination IP is, 10.1.3.1")
            } else {
                line
            }
        })
        .collect::<Vec<_>>();
    write_raw(
        results.path(),
        "large_test_disturbance_with_message_ids3.csv",
        &lines,
    );
    fs::write(results.path().join("queue.csv"), QUEUES).unwrap();
    fs::write(results.path().join("drops.csv"), DROPS).unwrap();

    let config = EvalConfig {
        seed: 3,
        results: results.path().to_path_buf(),
        topology: Topology::Large,
        disturbance: true,
        capture: None,
    };
    let summary = report::evaluate(&config).unwrap();
    assert_eq!(summary.packets, 6);
    assert_eq!(summary.drop_fraction, 1.0 / 7.0);
    // packets at 21, 22 and 23 seconds
    assert_eq!(
        summary.throughput,
        3.0 * 1078.0 / report::MEASUREMENT / (1024.0 * 1024.0)
    );

    for file in [
        "delay.html",
        "Queuesize.html",
        "Queue_profile_on_switch_A.html",
        "Queue_profile_on_switch_G.html",
        "delay_Receiver0.html",
        "delay_Receiver1.html",
        "delay_Receivers.html",
        "summary.json",
    ] {
        assert!(results.path().join(file).is_file(), "{file} is missing");
    }
    assert!(!results.path().join("delay_Receiver2.html").exists());
}
