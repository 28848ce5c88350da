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
//! The two analyses of a run: the full time-series report, and the quick evaluation of the delay,
//! queue and drop behavior.
use crate::{
    device::{Bottleneck, DeviceId, Topology},
    experiment::{EvalConfig, RunConfig},
    merge, normalize,
    plot::{self, Chart, Figure, Trace},
    queue::{self, QueueLog},
    records::PacketRecord,
    stats::{self, RunSummary},
    util::TimeSeries,
    window::{self, WindowSpec},
    Error,
};

/// Packets received before this time (in seconds) are part of the warm-up.
pub const WARMUP: f64 = 20.0;
/// Duration (in seconds) of the measurement after the warm-up.
pub const MEASUREMENT: f64 = 40.0;

/// Node whose queue holds the packets of all senders.
const SENDER_QUEUE_NODE: u32 = 0;

/// Options of the time-series report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub window: WindowSpec,
    pub topology: Topology,
    /// Also compute and plot the rate of every application.
    pub per_flow: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            window: WindowSpec::default(),
            topology: Topology::Small,
            per_flow: false,
        }
    }
}

/// All packets except the patched first row.
fn body(records: &[PacketRecord]) -> &[PacketRecord] {
    records.get(1..).unwrap_or_default()
}

/// End-to-end delay over time, in milliseconds.
fn delay_ms(records: &[PacketRecord]) -> TimeSeries<f64> {
    records
        .iter()
        .map(|r| (r.timestamp, r.delay * 1000.0))
        .collect()
}

/// Queue size over time. The x axis spans the samples, the y axis scales with the data.
fn queue_chart(bottleneck: &Bottleneck, series: &TimeSeries<u32>) -> Chart {
    let chart = Chart::new(format!("Queue on bottleneck switch {}", bottleneck.switch))
        .x_label("Simulation Time (seconds)")
        .y_label("Queue Size (packets)")
        .trace(Trace::line(bottleneck.switch, series));
    match series.t_range() {
        Some((first, last)) => chart.x_range(first, last),
        None => chart,
    }
}

/// Normalize and merge the captures of a run, compute all time series, and write the charts and
/// `summary.json` into the run directory.
pub fn visualise(config: &RunConfig, options: &ReportOptions) -> Result<RunSummary, Error> {
    let spec = &options.window;
    spec.validate()?;
    let layout = config.prepare()?;
    log::info!(
        "{} Mbps base rate for applications, {} senders in {:?}",
        config.app_rate,
        config.n_senders,
        layout.dir
    );

    let records = merge::load_or_merge(layout.merged(), &layout.captures())?;
    let senders = layout
        .sender_captures()
        .iter()
        .map(normalize::load_or_normalize_sender_tx)
        .collect::<Result<Vec<_>, _>>()?;

    let packets = body(&records);
    let delay = delay_ms(packets);
    let throughput = window::throughput(packets, spec)?;
    let sending_rates = senders
        .iter()
        .map(|s| window::sending_rate(s, spec))
        .collect::<Result<Vec<_>, _>>()?;

    let queues = queue::read_queue_log(layout.queue_log()?)?;
    let drops = queue::read_drop_log(layout.drop_log())?;
    let drop_fraction = queue::drop_fraction(drops.len(), records.len());
    log::info!("Drop fraction: {drop_fraction}");

    // stacked time series
    let (left, right) = (spec.start, spec.stop);
    let mut figure = Figure::new("Time series");
    for (i, rate) in sending_rates.iter().enumerate() {
        figure = figure.panel(
            Chart::new("Sending rate vs time")
                .x_label("Time (s)")
                .y_label("Sending rate (Mbps)")
                .x_range(left, right)
                .trace(
                    Trace::line(format!("Sending rate App {i}"), &rate.rate_series())
                        .color(plot::color(i)),
                ),
        );
    }
    let figure = figure
        .panel(
            Chart::new("End-to-end delay vs time")
                .x_label("Time (s)")
                .y_label("Delay (ms)")
                .x_range(left, right)
                .trace(Trace::line("End-to-end delay", &delay)),
        )
        .panel(
            Chart::new("Throughput vs time")
                .x_label("Time (s)")
                .y_label("Throughput (Mbps)")
                .x_range(left, right)
                .trace(Trace::line("Throughput", &throughput).color("#dc2626")),
        );
    plot::render_figure(&figure, layout.timeseries_chart(left, right))?;

    if options.per_flow {
        let flows = window::per_flow(packets, spec, config.n_senders)?;
        let chart = flows.iter().fold(
            Chart::new("Sending rate per application")
                .x_label("Time (s)")
                .y_label("Rate (Mbps)")
                .x_range(left, right),
            |chart, (app, flow)| chart.trace(Trace::line(format!("App {app}"), &flow.rate)),
        );
        plot::render(&chart, layout.per_flow_chart())?;
    }

    for (bottleneck, series) in queues.extract(&options.topology.bottlenecks()) {
        plot::render(
            &queue_chart(&bottleneck, &series),
            layout.queue_chart(bottleneck.switch),
        )?;
    }

    plot::render(
        &Chart::new("Packet drops")
            .x_label("Time (s)")
            .y_label("Packet Size (bytes)")
            .trace(Trace::markers("Packet drops", &queue::drop_series(&drops))),
        layout.drops_chart(),
    )?;

    let summary = RunSummary::new(&records, drops.len(), WARMUP, MEASUREMENT);
    summary.write(layout.summary())?;
    Ok(summary)
}

/// Evaluate the delay distribution, throughput, queues and drops of a single capture.
pub fn evaluate(config: &EvalConfig) -> Result<RunSummary, Error> {
    let records = normalize::load_or_normalize_capture(config.capture(), 0)?;
    let delays = records.iter().map(|r| r.delay).collect::<Vec<_>>();

    plot::render(
        &Chart::new("Delay plot with multiple senders")
            .x_label("Delay (seconds)")
            .y_label("Fraction of packets")
            .x_range(0.0, 0.5)
            .y_range(0.0, 1.0)
            .trace(Trace::ecdf("Delay", delays.iter().copied())),
        config.chart("delay"),
    )?;

    let queues: QueueLog = queue::read_queue_log(config.queue_log())?;
    let sender_queue = Bottleneck {
        switch: "sender",
        device: DeviceId::csma(SENDER_QUEUE_NODE),
    };
    plot::render(
        &Chart::new("Bottleneck queue plot with multiple senders")
            .x_label("Simulation Time (seconds)")
            .y_label("Queue Size (packets)")
            .trace(Trace::line(
                sender_queue.switch,
                &queues.series(&sender_queue.device),
            )),
        config.chart("Queuesize"),
    )?;
    for (bottleneck, series) in queues.extract(&config.topology.bottlenecks()) {
        plot::render(
            &queue_chart(&bottleneck, &series)
                .x_range(0.0, 10.0)
                .y_range(0.0, 100.0),
            config.chart(&format!("Queue_profile_on_switch_{}", bottleneck.switch)),
        )?;
    }

    let drops = queue::read_drop_log(config.drop_log())?;
    let summary = RunSummary::new(&records, drops.len(), WARMUP, MEASUREMENT);
    if let (Some(p50), Some(p99)) = (summary.delay_p50, summary.delay_p99) {
        log::info!("Delay quantiles: p50 = {p50} s, p99 = {p99} s");
    }
    log::info!("Throughput: {} MiB/s", summary.throughput);
    log::info!("Drop fraction: {}", summary.drop_fraction);

    if config.topology == Topology::Large {
        let receivers = stats::group_by_destination(&records);
        let mut overlay = Chart::new("Delay per receiver")
            .x_label("Delay")
            .y_label("Fraction of packets")
            .x_range(0.0, 0.5);
        for (idx, (addr, packets)) in receivers.iter().enumerate() {
            log::debug!("Receiver {} ({addr}): {} packets", idx + 1, packets.len());
            let trace = Trace::ecdf(
                format!("Receiver {}", idx + 1),
                packets.iter().map(|r| r.delay),
            )
            .color(plot::color(idx));
            plot::render(
                &Chart::new(format!("Delay plot on receiver {}", idx + 1))
                    .x_label("Delay")
                    .y_label("Fraction of packets")
                    .x_range(0.0, 0.5)
                    .trace(trace.clone()),
                config.chart(&format!("delay_Receiver{idx}")),
            )?;
            overlay = overlay.trace(trace);
        }
        plot::render(&overlay, config.chart("delay_Receivers"))?;
    }

    summary.write(config.summary())?;
    Ok(summary)
}
