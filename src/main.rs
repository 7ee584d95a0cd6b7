//! vmpredict CLI - Main entry point.

use anyhow::Context;
use std::sync::Arc;
use vmpredict::campaign::{CampaignMode, CampaignReport};
use vmpredict::cancel::{self, CancelSignal};
use vmpredict::cli::{Cli, Commands};
use vmpredict::config::PredictorConfig;
use vmpredict::observability::{
    self, FanoutSink, InMemorySink, MetricsSink, RecorderSink, PREDICTIONS_TOTAL, SIMULATIONS_TOTAL,
    SIMULATION_FAILURES_TOTAL,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => PredictorConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PredictorConfig::default(),
    };

    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if cli.json_logs {
        config.observability.json_logs = true;
    }
    if let Some(url) = cli.api_url {
        config.backend.api_url = Some(url);
    }
    config.validate()?;

    observability::init(&config.observability)?;

    // Local counters feed the printed summary; the recorder feeds whatever exporter is installed.
    let sink = Arc::new(InMemorySink::new());
    let fanout = Arc::new(FanoutSink::new(vec![
        sink.clone() as Arc<dyn MetricsSink>,
        Arc::new(RecorderSink),
    ]));
    let signal = CancelSignal::new();
    let controller = vmpredict::build_controller(&config, fanout, signal.clone())?;

    let mode = match &cli.command {
        Commands::Predict { .. } => {
            let reading = cli
                .command
                .reading()
                .context("predict command without metrics")?;
            let result = controller.simulator().backend().predict(&reading).await?;

            println!("Metrics:            {}", reading);
            println!("Predicted downtime: {:.2} ms", result.predicted_downtime);
            println!("Confidence:         {:.2} ({})", result.confidence, result.source);
            return Ok(());
        }
        Commands::Health => {
            let report = controller.health_check().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        Commands::Single => CampaignMode::Single,
        Commands::Continuous => CampaignMode::continuous(&config.campaign),
        Commands::Stress => CampaignMode::stress(&config.campaign),
        Commands::Custom { duration, interval } => CampaignMode::Custom {
            duration: *duration,
            interval: *interval,
        },
    };

    tokio::spawn(cancel::listen_for_interrupt(signal));

    let report = controller.run(mode).await?;
    print_report(&report);
    println!("Predictions:        {}", sink.counter(PREDICTIONS_TOTAL));
    println!("Simulations:        {}", sink.counter(SIMULATIONS_TOTAL));
    println!("Failed simulations: {}", sink.counter(SIMULATION_FAILURES_TOTAL));

    Ok(())
}

fn print_report(report: &CampaignReport) {
    let summary = &report.summary;

    println!();
    println!("Campaign: {}{}", report.mode, if report.cancelled { " (cancelled)" } else { "" });
    println!("Runs:               {}", summary.run_count);
    println!("Skipped:            {}", report.skipped_runs);

    if !summary.is_empty() {
        println!("Mean accuracy:      {:.2}%", summary.mean_accuracy);
        println!(
            "Accuracy range:     {:.2}% - {:.2}%",
            summary.min_accuracy, summary.max_accuracy
        );
        println!("Mean predicted:     {:.2} ms", summary.mean_predicted_downtime);
        println!("Mean actual:        {:.2} ms", summary.mean_actual_downtime);
    }

    if let Some(path) = &report.results_path {
        println!("Results:            {}", path.display());
    }
}
