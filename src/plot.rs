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
//! Chart descriptions and their rendering to self-contained HTML files.
//!
//! A [`Chart`] is a plain value that fully describes one plot. It is rendered with [`render`].
//! Several charts can be stacked vertically into a [`Figure`] sharing one file.
use std::{fs, path::Path};

use plotly::{
    common::{Line, LineShape, Marker, MarkerSymbol, Mode},
    layout::{Axis, GridPattern, Layout, LayoutGrid},
    Plot, Scatter,
};

use crate::{stats, util::TimeSeries, Error};

/// Maximum number of panels in a [`Figure`].
pub const MAX_PANELS: usize = 8;

const PALETTE: [&str; 10] = [
    "#2563eb", "#dc2626", "#16a34a", "#d97706", "#7c3aed", "#0891b2", "#c026d3", "#65a30d",
    "#e11d48", "#78716c",
];

/// Color of the `i`-th trace.
pub fn color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    /// Connected line.
    Line,
    /// Individual markers.
    Markers,
    /// Empirical CDF, drawn as a step function.
    Ecdf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: Option<&'static str>,
}

impl Trace {
    fn from_series<T: Into<f64> + Copy>(
        name: impl Into<String>,
        kind: TraceKind,
        series: &TimeSeries<T>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            x: series.t.clone(),
            y: series.y.iter().map(|y| (*y).into()).collect(),
            color: None,
        }
    }

    pub fn line<T: Into<f64> + Copy>(name: impl Into<String>, series: &TimeSeries<T>) -> Self {
        Self::from_series(name, TraceKind::Line, series)
    }

    pub fn markers<T: Into<f64> + Copy>(name: impl Into<String>, series: &TimeSeries<T>) -> Self {
        Self::from_series(name, TraceKind::Markers, series)
    }

    /// Empirical CDF of `values`.
    pub fn ecdf(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::from_series(name, TraceKind::Ecdf, &stats::ecdf(values))
    }

    pub fn color(self, color: &'static str) -> Self {
        Self {
            color: Some(color),
            ..self
        }
    }

    fn to_scatter(&self, axis: usize) -> Box<Scatter<f64, f64>> {
        let color = self.color.unwrap_or("#000000");
        let trace = Scatter::new(self.x.clone(), self.y.clone()).name(&self.name);
        let trace = match self.kind {
            TraceKind::Line => trace.mode(Mode::Lines).line(Line::new().color(color)),
            TraceKind::Markers => trace.mode(Mode::Markers).marker(
                Marker::new()
                    .color(color)
                    .symbol(MarkerSymbol::X)
                    .size(6),
            ),
            TraceKind::Ecdf => trace
                .mode(Mode::Lines)
                .line(Line::new().color(color).shape(LineShape::Hv)),
        };
        if axis > 1 {
            let (x, y) = (format!("x{axis}"), format!("y{axis}"));
            trace.x_axis(&x).y_axis(&y)
        } else {
            trace
        }
    }
}

/// A single plot with its axes and traces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub traces: Vec<Trace>,
}

impl Chart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn x_label(self, label: impl Into<String>) -> Self {
        Self {
            x_label: label.into(),
            ..self
        }
    }

    pub fn y_label(self, label: impl Into<String>) -> Self {
        Self {
            y_label: label.into(),
            ..self
        }
    }

    pub fn x_range(self, lo: f64, hi: f64) -> Self {
        Self {
            x_range: Some((lo, hi)),
            ..self
        }
    }

    pub fn y_range(self, lo: f64, hi: f64) -> Self {
        Self {
            y_range: Some((lo, hi)),
            ..self
        }
    }

    /// Add a trace. Traces without a color get the next one of the palette.
    pub fn trace(mut self, trace: Trace) -> Self {
        let trace = match trace.color {
            Some(_) => trace,
            None => trace.color(color(self.traces.len())),
        };
        self.traces.push(trace);
        self
    }

    fn x_axis(&self) -> Axis {
        axis(&self.x_label, self.x_range)
    }

    fn y_axis(&self) -> Axis {
        axis(&self.y_label, self.y_range)
    }
}

fn axis(label: &str, range: Option<(f64, f64)>) -> Axis {
    let axis = Axis::new().title(label.to_string()).show_grid(true);
    match range {
        Some((lo, hi)) => axis.range(vec![lo, hi]),
        None => axis,
    }
}

fn write(plot: &Plot, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    plot.write_html(path);
    log::info!("Written plot to: {}", path.as_os_str().to_string_lossy());
    Ok(())
}

/// Render a single chart to `path`.
pub fn render(chart: &Chart, path: impl AsRef<Path>) -> Result<(), Error> {
    let mut plot = Plot::new();
    plot.set_layout(
        Layout::new()
            .title(format!("<b>{}</b>", chart.title))
            .x_axis(chart.x_axis())
            .y_axis(chart.y_axis()),
    );
    for trace in &chart.traces {
        plot.add_trace(trace.to_scatter(1));
    }
    write(&plot, path.as_ref())
}

/// Several charts stacked on top of each other, each with its own axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Chart>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            panels: Vec::new(),
        }
    }

    pub fn panel(mut self, chart: Chart) -> Self {
        self.panels.push(chart);
        self
    }
}

fn with_axes(layout: Layout, panel: usize, x: Axis, y: Axis) -> Layout {
    match panel {
        1 => layout.x_axis(x).y_axis(y),
        2 => layout.x_axis2(x).y_axis2(y),
        3 => layout.x_axis3(x).y_axis3(y),
        4 => layout.x_axis4(x).y_axis4(y),
        5 => layout.x_axis5(x).y_axis5(y),
        6 => layout.x_axis6(x).y_axis6(y),
        7 => layout.x_axis7(x).y_axis7(y),
        8 => layout.x_axis8(x).y_axis8(y),
        _ => unreachable!("at most {MAX_PANELS} panels"),
    }
}

/// Render all panels of a figure into one file at `path`.
pub fn render_figure(figure: &Figure, path: impl AsRef<Path>) -> Result<(), Error> {
    let n = figure.panels.len();
    if n > MAX_PANELS {
        return Err(Error::TooManyPanels {
            found: n,
            max: MAX_PANELS,
        });
    }

    let mut layout = Layout::new()
        .title(format!("<b>{}</b>", figure.title))
        .height(300 * n.max(1));
    if n > 0 {
        layout = layout.grid(
            LayoutGrid::new()
                .rows(n)
                .columns(1)
                .pattern(GridPattern::Independent),
        );
    }

    let mut plot = Plot::new();
    for (i, chart) in figure.panels.iter().enumerate() {
        let panel = i + 1;
        let y_axis = axis(
            &format!("<b>{}</b><br>{}", chart.title, chart.y_label),
            chart.y_range,
        );
        layout = with_axes(layout, panel, chart.x_axis(), y_axis);
        for trace in &chart.traces {
            plot.add_trace(trace.to_scatter(panel));
        }
    }
    plot.set_layout(layout);
    write(&plot, path.as_ref())
}

#[cfg(test)]
mod test {
    use super::*;

    fn series() -> TimeSeries<u32> {
        [(0.0, 1), (1.0, 5), (2.0, 3)].into_iter().collect()
    }

    #[test]
    fn chart_builder() {
        let chart = Chart::new("Queue profile on switch A")
            .x_label("Time [s]")
            .y_label("Queue size [packets]")
            .x_range(0.0, 60.0)
            .y_range(0.0, 200.0)
            .trace(Trace::line("A", &series()))
            .trace(Trace::markers("drops", &series()).color("#000000"));
        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[0].color, Some(color(0)));
        assert_eq!(chart.traces[0].y, vec![1.0, 5.0, 3.0]);
        assert_eq!(chart.traces[1].kind, TraceKind::Markers);
        assert_eq!(chart.traces[1].color, Some("#000000"));
        assert_eq!(chart.y_range, Some((0.0, 200.0)));
    }

    #[test]
    fn ecdf_trace() {
        let trace = Trace::ecdf("delay", [0.3, 0.1, 0.2]);
        assert_eq!(trace.kind, TraceKind::Ecdf);
        assert_eq!(trace.x, vec![0.1, 0.2, 0.3]);
        assert_eq!(trace.y.last(), Some(&1.0));
    }

    #[test]
    fn render_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots").join("chart.html");
        let chart = Chart::new("Packet drops")
            .x_label("Time [s]")
            .trace(Trace::markers("drops", &series()));
        render(&chart, &path).unwrap();
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("Packet drops"));
    }

    #[test]
    fn render_empty_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.html");
        let chart = Chart::new("Nothing").trace(Trace::line("empty", &TimeSeries::<f64>::default()));
        render(&chart, &path).unwrap();
        assert!(path.is_file());
        render(&Chart::new("No traces"), &path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn render_stacked_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.html");
        let figure = (0..3).fold(Figure::new("Time series"), |f, i| {
            f.panel(Chart::new(format!("panel {i}")).trace(Trace::line("x", &series())))
        });
        render_figure(&figure, &path).unwrap();
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("panel 2"));
        assert!(html.contains("y3"));

        let figure = (0..9).fold(Figure::new("Too many"), |f, _| f.panel(Chart::new("")));
        assert!(matches!(
            render_figure(&figure, &path),
            Err(Error::TooManyPanels { found: 9, max: 8 })
        ));
    }
}
