//! churn-runner: headless runner for the churn analysis pipeline.
//!
//! Usage:
//!   churn-runner --seed 42 --customers 5000 --out-dir ./out
//!   churn-runner --config run.json --no-charts
//!
//! Flags given on the command line override values from `--config`.

mod charts;

use anyhow::{Context, Result};
use churnlab_core::{
    config::PipelineConfig,
    engine::{ChurnPipeline, PipelineOutcome},
    export::{write_at_risk_csv, write_customers_csv, AT_RISK_FILE, CUSTOMER_DATA_FILE, RUN_SUMMARY_FILE},
    risk::RiskSegment,
    summary::RunSummary,
    types::round2,
};
use std::{
    env,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match flag_value(&args, "--config") {
        Some(path) => PipelineConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => PipelineConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.customers = parse_arg(&args, "--customers", config.customers);
    let out_dir = PathBuf::from(flag_value(&args, "--out-dir").unwrap_or("."));
    let charts_enabled = !args.iter().any(|a| a == "--no-charts");

    println!("Churn Lab: churn-runner");
    println!("  seed:      {}", config.seed);
    println!("  customers: {}", config.customers);
    println!("  out_dir:   {}", out_dir.display());
    println!();

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let outcome = ChurnPipeline::new(config)?.run()?;

    write_artifacts(&outcome, &out_dir)?;
    if charts_enabled {
        charts::render_all(&outcome, &out_dir)?;
    }
    print_report(&outcome);
    Ok(())
}

fn write_artifacts(outcome: &PipelineOutcome, out_dir: &Path) -> Result<()> {
    let path = out_dir.join(CUSTOMER_DATA_FILE);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_customers_csv(BufWriter::new(file), &outcome.customers)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());

    let path = out_dir.join(AT_RISK_FILE);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_at_risk_csv(BufWriter::new(file), &outcome.at_risk)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());

    let path = out_dir.join(RUN_SUMMARY_FILE);
    let json = RunSummary::from_outcome(outcome, chrono::Utc::now()).to_json()?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn print_report(outcome: &PipelineOutcome) {
    let eda = &outcome.eda;
    println!("=== DATASET ===");
    println!("  shape: ({}, {})", eda.rows, eda.columns);
    println!();
    println!(
        "  {:<11} {:>6} {:>8} {:>8} {:>5} {:>5} {:<16} {:<17} {:<12} {:>6} {:>7} {:>5}",
        "CustomerID", "Tenure", "Monthly", "Total", "Prod", "Calls", "Contract", "Payment", "Internet",
        "Senior", "Partner", "Churn"
    );
    for c in &eda.preview {
        println!(
            "  {:<11} {:>6} {:>8.2} {:>8.2} {:>5} {:>5} {:<16} {:<17} {:<12} {:>6} {:>7} {:>5}",
            c.customer_id,
            c.tenure,
            c.monthly_charges,
            c.total_charges,
            c.num_products,
            c.support_calls,
            c.contract.label(),
            c.payment_method.label(),
            c.internet_service.label(),
            c.senior_citizen,
            c.partner,
            c.churn
        );
    }
    println!();
    println!(
        "  churn rate: {:.2}% ({} churned / {} retained)",
        100.0 * eda.churn_rate,
        eda.churned,
        eda.retained
    );

    println!();
    println!("=== DESCRIPTIVE STATISTICS ===");
    println!("  {:<16} {:>7} {:>10} {:>10} {:>10} {:>10}", "column", "count", "mean", "std", "min", "max");
    for s in &eda.column_stats {
        println!(
            "  {:<16} {:>7} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            s.column, s.count, s.mean, s.std, s.min, s.max
        );
    }

    let eval = &outcome.evaluation;
    let fit = outcome.classifier.fit_report();
    println!();
    println!("=== MODEL ===");
    println!("  train size: {}", outcome.split.train.len());
    println!("  test size:  {}", outcome.split.test.len());
    println!(
        "  solver:     {} iterations, converged={}, loss={:.4}",
        fit.iterations, fit.converged, fit.final_loss
    );
    println!("  accuracy:   {:.4}", eval.accuracy);
    println!("  roc-auc:    {:.4}", eval.roc_auc);
    println!(
        "  cv accuracy ({} folds): {:.4} ± {:.4}",
        eval.cross_validation.fold_scores.len(),
        eval.cross_validation.mean,
        eval.cross_validation.std
    );
    println!();
    print!("{}", eval.report.render());

    println!();
    println!("=== CHURN BY MONTHLY CHARGE ===");
    println!("  {:<8} {:>9} {:>10}", "bucket", "customers", "churn rate");
    for b in &outcome.charge_buckets {
        println!(
            "  {:<8} {:>9} {:>9.2}%",
            b.bucket.label(),
            b.customers,
            100.0 * b.churn_rate
        );
    }

    println!();
    println!("=== RISK SEGMENTS (in-sample scores) ===");
    println!(
        "  {:<12} {:>9} {:>10} {:>11} {:>10}",
        "segment", "customers", "avg prob", "avg charge", "avg tenure"
    );
    for s in &outcome.segments {
        let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", round2(v)));
        println!(
            "  {:<12} {:>9} {:>10} {:>11} {:>10}",
            s.segment.label(),
            s.customers,
            cell(s.avg_churn_probability),
            cell(s.avg_monthly_charge),
            cell(s.avg_tenure)
        );
    }
    println!(
        "  top {} {} customers exported",
        outcome.at_risk.len(),
        RiskSegment::High.label()
    );

    let impact = &outcome.impact;
    println!();
    println!("=== REVENUE IMPACT ===");
    println!("  high-risk customers:   {}", impact.high_risk_count);
    println!("  retention improvement: {:.0}%", 100.0 * impact.retention_improvement);
    println!("  customers saved:       {}", impact.saved_customers);
    println!("  avg monthly revenue:   ${:.2}", impact.avg_monthly_revenue);
    println!("  monthly revenue saved: ${:.2}", impact.monthly_revenue_saved);
    println!("  annual revenue saved:  ${:.2}", impact.annual_revenue_saved);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
