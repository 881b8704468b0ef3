use serde::Serialize;

use super::format::format_indian_compact;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

/// Titles and badges shown around the two charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartUi {
    pub growth_title: String,
    pub growth_badge: String,
    pub breakdown_title: String,
    pub breakdown_badge: String,
}

/// Everything a renderer needs to redraw the growth and breakdown charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartUpdate {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub invested_series: Vec<f64>,
    pub returns_series: Vec<f64>,
    pub series_labels: [String; 2],
    pub pie_labels: [String; 2],
    pub pie_data: [f64; 2],
    pub ui: ChartUi,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// The main chart: a line or stacked bar chart over two datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthChart {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: [Dataset; 2],
    pub revision: u32,
}

impl GrowthChart {
    fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            labels: Vec::new(),
            datasets: [
                Dataset {
                    label: "Invested".to_string(),
                    data: Vec::new(),
                },
                Dataset {
                    label: "Returns".to_string(),
                    data: Vec::new(),
                },
            ],
            revision: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownChart {
    pub labels: [String; 2],
    pub data: [f64; 2],
    pub revision: u32,
}

/// Owns the growth and breakdown chart handles for one view.
///
/// Switching chart kind drops the old growth chart and builds a fresh one,
/// mirroring how a canvas chart has to be torn down to change type.
#[derive(Debug, Clone, Default)]
pub struct ChartBoard {
    growth: Option<GrowthChart>,
    breakdown: Option<BreakdownChart>,
    ui: ChartUi,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn growth(&self) -> Option<&GrowthChart> {
        self.growth.as_ref()
    }

    pub fn breakdown(&self) -> Option<&BreakdownChart> {
        self.breakdown.as_ref()
    }

    pub fn ui(&self) -> &ChartUi {
        &self.ui
    }

    pub fn apply(&mut self, update: &ChartUpdate) {
        let recreate = self
            .growth
            .as_ref()
            .is_none_or(|chart| chart.kind != update.kind);
        if recreate {
            self.growth = Some(GrowthChart::new(update.kind));
        }

        if let Some(chart) = self.growth.as_mut() {
            chart.labels = update.labels.clone();
            chart.datasets[0].data = update.invested_series.clone();
            chart.datasets[1].data = update.returns_series.clone();
            chart.datasets[0].label = update.series_labels[0].clone();
            chart.datasets[1].label = update.series_labels[1].clone();
            chart.revision += 1;
        }

        let breakdown = self.breakdown.get_or_insert_with(|| BreakdownChart {
            labels: ["Invested".to_string(), "Returns".to_string()],
            data: [0.0, 0.0],
            revision: 0,
        });
        breakdown.labels = update.pie_labels.clone();
        breakdown.data = update.pie_data;
        breakdown.revision += 1;

        self.ui = update.ui.clone();
    }

    /// Draws both charts as horizontal bars `width` cells wide.
    pub fn render_text(&self, width: usize) -> String {
        let width = width.max(10);
        let mut out = String::new();

        if let Some(chart) = &self.growth {
            out.push_str(&format!("{} [{}]\n", self.ui.growth_title, self.ui.growth_badge));
            let peak = chart
                .labels
                .iter()
                .enumerate()
                .map(|(i, _)| stacked_value(chart, i))
                .fold(0.0_f64, f64::max);
            let label_width = chart.labels.iter().map(|l| l.len()).max().unwrap_or(0);
            for (i, label) in chart.labels.iter().enumerate() {
                let first = chart.datasets[0].data.get(i).copied().unwrap_or(0.0);
                let second = chart.datasets[1].data.get(i).copied().unwrap_or(0.0);
                let (a, b) = bar_cells(first, second, peak, width);
                out.push_str(&format!(
                    "{label:>label_width$} |{}{}{} {}\n",
                    "#".repeat(a),
                    "+".repeat(b),
                    " ".repeat(width - a - b),
                    format_indian_compact(first + second, true)
                ));
            }
            out.push_str(&format!(
                "{:>label_width$}  # {}  + {}\n",
                "", chart.datasets[0].label, chart.datasets[1].label
            ));
        }

        if let Some(pie) = &self.breakdown {
            out.push_str(&format!(
                "{} [{}]\n",
                self.ui.breakdown_title, self.ui.breakdown_badge
            ));
            let total = pie.data[0] + pie.data[1];
            for (label, value) in pie.labels.iter().zip(pie.data) {
                let share = if total > 0.0 && total.is_finite() {
                    value / total * 100.0
                } else {
                    0.0
                };
                out.push_str(&format!(
                    "  {label}: {} ({share:.1}%)\n",
                    format_indian_compact(value, true)
                ));
            }
        }

        out
    }
}

fn stacked_value(chart: &GrowthChart, i: usize) -> f64 {
    let value = |d: &Dataset| d.data.get(i).copied().unwrap_or(0.0);
    let first = value(&chart.datasets[0]);
    let second = value(&chart.datasets[1]);
    if first.is_finite() && second.is_finite() {
        first + second
    } else {
        0.0
    }
}

fn bar_cells(first: f64, second: f64, peak: f64, width: usize) -> (usize, usize) {
    if peak.is_nan() || peak <= 0.0 || !first.is_finite() || !second.is_finite() {
        return (0, 0);
    }
    let scale = width as f64 / peak;
    let a = ((first.max(0.0) * scale).round() as usize).min(width);
    let b = ((second.max(0.0) * scale).round() as usize).min(width - a);
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(kind: ChartKind) -> ChartUpdate {
        ChartUpdate {
            kind,
            labels: vec!["Y1".to_string(), "Y2".to_string()],
            invested_series: vec![100.0, 200.0],
            returns_series: vec![10.0, 40.0],
            series_labels: ["Invested".to_string(), "Returns".to_string()],
            pie_labels: ["Invested".to_string(), "Returns".to_string()],
            pie_data: [200.0, 40.0],
            ui: ChartUi {
                growth_title: "Growth".to_string(),
                growth_badge: "badge".to_string(),
                breakdown_title: "Breakdown".to_string(),
                breakdown_badge: "Invested vs Returns".to_string(),
            },
        }
    }

    #[test]
    fn first_apply_creates_both_charts() {
        let mut board = ChartBoard::new();
        assert!(board.growth().is_none());
        board.apply(&update(ChartKind::Line));

        let growth = board.growth().expect("growth chart");
        assert_eq!(growth.kind, ChartKind::Line);
        assert_eq!(growth.revision, 1);
        assert_eq!(growth.datasets[1].data, vec![10.0, 40.0]);
        let pie = board.breakdown().expect("breakdown chart");
        assert_eq!(pie.data, [200.0, 40.0]);
        assert_eq!(board.ui().growth_title, "Growth");
    }

    #[test]
    fn same_kind_updates_in_place() {
        let mut board = ChartBoard::new();
        board.apply(&update(ChartKind::Line));
        board.apply(&update(ChartKind::Line));
        assert_eq!(board.growth().expect("growth").revision, 2);
        assert_eq!(board.breakdown().expect("pie").revision, 2);
    }

    #[test]
    fn kind_change_recreates_growth_chart() {
        let mut board = ChartBoard::new();
        board.apply(&update(ChartKind::Line));
        board.apply(&update(ChartKind::Line));
        board.apply(&update(ChartKind::Bar));

        let growth = board.growth().expect("growth");
        assert_eq!(growth.kind, ChartKind::Bar);
        assert_eq!(growth.revision, 1);
        assert_eq!(board.breakdown().expect("pie").revision, 3);
    }

    #[test]
    fn render_text_scales_bars_to_width() {
        let mut board = ChartBoard::new();
        board.apply(&update(ChartKind::Line));
        let text = board.render_text(24);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Growth [badge]");
        assert!(lines[2].starts_with("Y2 |####################++++"));
        assert!(text.contains("Invested: ₹200.00 (83.3%)"));
    }

    #[test]
    fn render_text_tolerates_non_finite_values() {
        let mut u = update(ChartKind::Bar);
        u.returns_series = vec![f64::INFINITY, f64::NAN];
        u.pie_data = [1.0, f64::INFINITY];
        let mut board = ChartBoard::new();
        board.apply(&u);
        let text = board.render_text(20);
        assert!(text.contains("∞"));
    }
}
