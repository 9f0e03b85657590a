//! PNG rendering of the three chart artifacts.
//!
//! Every panel is drawn from values the core already computed; nothing
//! here does statistics beyond picking axis ranges.

use churnlab_core::{
    cohort::{CohortMatrix, TenureBucket},
    customer::Contract,
    eda::{BoxSummary, EdaReport, GroupRate, SplitHistogram},
    engine::PipelineOutcome,
    metrics::{ConfusionMatrix, RocPoint},
    classifier::FeatureCoefficient,
    types::CLASS_NAMES,
};
use plotters::{coord::Shift, element::Pie, prelude::*};
use std::{error::Error, path::Path};

pub const EDA_FILE: &str = "eda_analysis.png";
pub const MODEL_FILE: &str = "model_results.png";
pub const COHORT_FILE: &str = "cohort_analysis.png";

const RETAINED: RGBColor = RGBColor(46, 204, 113);
const CHURNED: RGBColor = RGBColor(231, 76, 60);
const ACCENT: RGBColor = RGBColor(52, 152, 219);
const CONTRACT_COLORS: [RGBColor; 3] = [
    RGBColor(231, 76, 60),
    RGBColor(243, 156, 18),
    RGBColor(46, 204, 113),
];
const FONT: &str = "sans-serif";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn Error>>;

pub fn render_all(outcome: &PipelineOutcome, out_dir: &Path) -> anyhow::Result<()> {
    let targets: [(&str, &dyn Fn(&Path) -> DrawResult); 3] = [
        (EDA_FILE, &|p| eda_grid(&outcome.eda, p)),
        (MODEL_FILE, &|p| model_grid(outcome, p)),
        (COHORT_FILE, &|p| cohort_chart(&outcome.cohorts, p)),
    ];
    for (file, draw) in targets {
        let path = out_dir.join(file);
        draw(&path).map_err(|e| anyhow::anyhow!("rendering {}: {e}", path.display()))?;
        log::info!("chart written: {}", path.display());
    }
    Ok(())
}

// ── EDA grid (2 × 3) ───────────────────────────────────────────

fn eda_grid(eda: &EdaReport, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, (1800, 1100)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Customer Churn: Exploratory Analysis", (FONT, 30))?;
    let panels = root.split_evenly((2, 3));

    churn_pie(&panels[0], eda)?;
    tenure_histogram(&panels[1], &eda.tenure_histogram)?;
    charges_box_plot(&panels[2], &eda.charges_box)?;
    rate_bars(&panels[3], "Churn Rate by Contract", "Contract", &eda.by_contract, ACCENT)?;
    rate_line(&panels[4], "Churn Rate by Number of Products", "Products", &eda.by_num_products)?;
    count_rate_bars(&panels[5], "Churn Rate by Support Calls", "Support Calls", &eda.by_support_calls, CHURNED)?;

    root.present()?;
    Ok(())
}

fn churn_pie(area: &Area<'_>, eda: &EdaReport) -> DrawResult {
    let area = area.titled("Churn Distribution", (FONT, 20))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;
    let sizes = [eda.retained as f64, eda.churned as f64];
    let colors = [RETAINED, CHURNED];
    let labels = CLASS_NAMES;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style((FONT, 18).into_font().color(&BLACK));
    pie.percentages((FONT, 16).into_font().color(&WHITE));
    area.draw(&pie)?;
    Ok(())
}

fn tenure_histogram(area: &Area<'_>, hist: &SplitHistogram) -> DrawResult {
    let lo = hist.edges.first().copied().unwrap_or(0.0);
    let hi = hist.edges.last().copied().unwrap_or(1.0);
    let top = hist
        .retained
        .iter()
        .chain(&hist.churned)
        .copied()
        .max()
        .unwrap_or(1) as f64
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Tenure Distribution by Churn", (FONT, 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0.0..top)?;
    chart
        .configure_mesh()
        .x_desc("Tenure (months)")
        .y_desc("Customers")
        .draw()?;

    for (counts, color, name) in [
        (&hist.retained, RETAINED, CLASS_NAMES[0]),
        (&hist.churned, CHURNED, CLASS_NAMES[1]),
    ] {
        chart
            .draw_series(counts.iter().enumerate().map(|(i, &n)| {
                Rectangle::new(
                    [(hist.edges[i], 0.0), (hist.edges[i + 1], n as f64)],
                    color.mix(0.6).filled(),
                )
            }))?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    Ok(())
}

fn charges_box_plot(area: &Area<'_>, boxes: &[BoxSummary; 2]) -> DrawResult {
    let values = boxes
        .iter()
        .flat_map(|b| [b.lower_whisker, b.upper_whisker].into_iter().chain(b.outliers.iter().copied()));
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = (hi - lo).max(1.0) * 0.05;
    let names: Vec<String> = CLASS_NAMES.iter().map(|s| s.to_string()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption("Monthly Charges by Churn", (FONT, 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..1.5, (lo - pad)..(hi + pad))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(10)
        .x_label_formatter(&|x| index_label(&names, *x))
        .y_desc("Monthly Charges ($)")
        .draw()?;

    for (i, (b, color)) in boxes.iter().zip([RETAINED, CHURNED]).enumerate() {
        let x = i as f64;
        let (l, r) = (x - 0.3, x + 0.3);
        chart.draw_series([
            Rectangle::new([(l, b.q1), (r, b.q3)], color.mix(0.5).filled()),
            Rectangle::new([(l, b.q1), (r, b.q3)], BLACK.stroke_width(1)),
        ])?;
        chart.draw_series([
            PathElement::new(vec![(l, b.median), (r, b.median)], BLACK.stroke_width(2)),
            PathElement::new(vec![(x, b.q3), (x, b.upper_whisker)], BLACK.stroke_width(1)),
            PathElement::new(vec![(x, b.q1), (x, b.lower_whisker)], BLACK.stroke_width(1)),
            PathElement::new(vec![(x - 0.1, b.upper_whisker), (x + 0.1, b.upper_whisker)], BLACK.stroke_width(1)),
            PathElement::new(vec![(x - 0.1, b.lower_whisker), (x + 0.1, b.lower_whisker)], BLACK.stroke_width(1)),
        ])?;
        chart.draw_series(b.outliers.iter().map(|&v| Circle::new((x, v), 2, BLACK.filled())))?;
    }
    Ok(())
}

fn rate_bars(area: &Area<'_>, title: &str, x_desc: &str, groups: &[GroupRate], color: RGBColor) -> DrawResult {
    let names: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(groups.len() as f64 - 0.5), 0.0..rate_ceiling(groups))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(30)
        .x_label_formatter(&|x| index_label(&names, *x))
        .y_label_formatter(&|y| format!("{y:.0}%"))
        .x_desc(x_desc)
        .y_desc("Churn Rate (%)")
        .draw()?;
    chart.draw_series(groups.iter().enumerate().map(|(i, g)| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, 100.0 * g.churn_rate)], color.mix(0.85).filled())
    }))?;
    Ok(())
}

/// Bars at their numeric group value, so a count nobody has leaves a gap.
fn count_rate_bars(area: &Area<'_>, title: &str, x_desc: &str, groups: &[GroupRate], color: RGBColor) -> DrawResult {
    let points: Vec<(f64, f64)> = groups
        .iter()
        .filter_map(|g| g.group.parse::<f64>().ok().map(|x| (x, 100.0 * g.churn_rate)))
        .collect();
    let hi = points.iter().map(|p| p.0).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(hi + 0.5), 0.0..rate_ceiling(groups))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(hi as usize + 2)
        .x_label_formatter(&|x| {
            let r = x.round();
            if (x - r).abs() > 1e-6 || r < 0.0 { String::new() } else { format!("{r:.0}") }
        })
        .y_label_formatter(&|y| format!("{y:.0}%"))
        .x_desc(x_desc)
        .y_desc("Churn Rate (%)")
        .draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, rate)| Rectangle::new([(x - 0.35, 0.0), (x + 0.35, rate)], color.mix(0.85).filled())),
    )?;
    Ok(())
}

fn rate_line(area: &Area<'_>, title: &str, x_desc: &str, groups: &[GroupRate]) -> DrawResult {
    let names: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(groups.len() as f64 - 0.5), 0.0..rate_ceiling(groups))?;
    chart
        .configure_mesh()
        .x_labels(30)
        .x_label_formatter(&|x| index_label(&names, *x))
        .y_label_formatter(&|y| format!("{y:.0}%"))
        .x_desc(x_desc)
        .y_desc("Churn Rate (%)")
        .draw()?;
    let points: Vec<(f64, f64)> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (i as f64, 100.0 * g.churn_rate))
        .collect();
    chart.draw_series(LineSeries::new(points.iter().copied(), ACCENT.stroke_width(2)))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 5, ACCENT.filled())))?;
    Ok(())
}

// ── Model results (1 × 3) ──────────────────────────────────────

fn model_grid(outcome: &PipelineOutcome, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, (1800, 650)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Churn Model: Holdout Evaluation", (FONT, 30))?;
    let panels = root.split_evenly((1, 3));

    let eval = &outcome.evaluation;
    confusion_heatmap(&panels[0], &eval.confusion, eval.accuracy)?;
    roc_panel(&panels[1], &eval.roc_curve, eval.roc_auc)?;
    coefficient_bars(&panels[2], &eval.coefficients)?;

    root.present()?;
    Ok(())
}

fn confusion_heatmap(area: &Area<'_>, cm: &ConfusionMatrix, accuracy: f64) -> DrawResult {
    let grid = cm.as_grid();
    let peak = grid.iter().flatten().copied().max().unwrap_or(1).max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Confusion Matrix (Accuracy: {:.1}%)", 100.0 * accuracy), (FONT, 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..2.0, 0.0..2.0)?;
    // Row 0 (actual Retained) is drawn on top.
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&|x| half_label(*x, false))
        .y_label_formatter(&|y| half_label(*y, true))
        .x_desc("Predicted")
        .y_desc("Actual")
        .draw()?;

    for (actual, row) in grid.iter().enumerate() {
        for (predicted, &n) in row.iter().enumerate() {
            let t = n as f64 / peak;
            let shade = |full: u8| (255.0 - t * (255.0 - f64::from(full))) as u8;
            let fill = RGBColor(shade(31), shade(119), shade(180));
            let (x, y) = (predicted as f64, 1.0 - actual as f64);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x, y), (x + 1.0, y + 1.0)],
                fill.filled(),
            )))?;
            let ink = if t > 0.5 { WHITE } else { BLACK };
            chart.draw_series(std::iter::once(Text::new(
                n.to_string(),
                (x + 0.45, y + 0.55),
                (FONT, 28).into_font().color(&ink),
            )))?;
        }
    }
    Ok(())
}

fn roc_panel(area: &Area<'_>, curve: &[RocPoint], auc: f64) -> DrawResult {
    let mut chart = ChartBuilder::on(area)
        .caption(format!("ROC Curve (AUC = {auc:.3})"), (FONT, 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;
    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()?;
    chart
        .draw_series(LineSeries::new(
            curve.iter().map(|p| (p.false_positive_rate, p.true_positive_rate)),
            ACCENT.stroke_width(2),
        ))?
        .label("Logistic Regression")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ACCENT.stroke_width(2)));
    chart
        .draw_series(LineSeries::new([(0.0, 0.0), (1.0, 1.0)], BLACK.mix(0.4)))?
        .label("Random")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.mix(0.4)));
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    Ok(())
}

fn coefficient_bars(area: &Area<'_>, coefficients: &[FeatureCoefficient]) -> DrawResult {
    let mut sorted = coefficients.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
    let names: Vec<String> = sorted.iter().map(|c| c.feature.clone()).collect();
    let reach = sorted.iter().map(|c| c.value.abs()).fold(0.0, f64::max).max(0.1) * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Feature Coefficients", (FONT, 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(130)
        .build_cartesian_2d(-reach..reach, -0.5..(sorted.len() as f64 - 0.5))?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(30)
        .y_label_formatter(&|y| index_label(&names, *y))
        .x_desc("Coefficient (standardized)")
        .draw()?;
    chart.draw_series(sorted.iter().enumerate().map(|(i, c)| {
        let y = i as f64;
        let color = if c.value > 0.0 { CHURNED } else { RETAINED };
        Rectangle::new([(0.0, y - 0.35), (c.value, y + 0.35)], color.filled())
    }))?;
    Ok(())
}

// ── Cohort chart ───────────────────────────────────────────────

fn cohort_chart(cohorts: &CohortMatrix, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let names: Vec<String> = TenureBucket::ALL.iter().map(|b| b.label().to_string()).collect();
    let top = cohorts
        .cells
        .iter()
        .map(|c| 100.0 * c.churn_rate)
        .fold(0.0, f64::max)
        .max(10.0)
        * 1.15;

    let mut chart = ChartBuilder::on(&root)
        .caption("Churn Rate by Tenure Cohort and Contract", (FONT, 26))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(names.len() as f64 - 0.5), 0.0..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(30)
        .x_label_formatter(&|x| index_label(&names, *x))
        .y_label_formatter(&|y| format!("{y:.0}%"))
        .x_desc("Tenure Bucket")
        .y_desc("Churn Rate (%)")
        .draw()?;

    let width = 0.25;
    for (k, (contract, color)) in Contract::ALL.iter().zip(CONTRACT_COLORS).enumerate() {
        let offset = (k as f64 - 1.0) * width;
        // Empty cells have no rate and draw no bar.
        let bars = TenureBucket::ALL.iter().enumerate().filter_map(|(i, &bucket)| {
            cohorts.rate(bucket, *contract).map(|rate| {
                let x = i as f64 + offset;
                Rectangle::new(
                    [(x - width / 2.0, 0.0), (x + width / 2.0, 100.0 * rate)],
                    color.mix(0.85).filled(),
                )
            })
        });
        chart
            .draw_series(bars)?
            .label(contract.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

// ── Axis helpers ───────────────────────────────────────────────

/// Category name at integer positions, blank elsewhere.
fn index_label(names: &[String], x: f64) -> String {
    let r = x.round();
    if (x - r).abs() > 1e-6 || r < 0.0 {
        return String::new();
    }
    names.get(r as usize).cloned().unwrap_or_default()
}

/// Class name at cell centres of the 2 × 2 heatmap.
fn half_label(v: f64, flipped: bool) -> String {
    let cell = v - 0.5;
    let r = cell.round();
    if (cell - r).abs() > 1e-6 || !(0.0..=1.0).contains(&r) {
        return String::new();
    }
    let class = if flipped { 1 - r as usize } else { r as usize };
    CLASS_NAMES[class].to_string()
}

fn rate_ceiling(groups: &[GroupRate]) -> f64 {
    groups
        .iter()
        .map(|g| 100.0 * g.churn_rate)
        .fold(0.0, f64::max)
        .max(10.0)
        * 1.15
}
