use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::MultiProgress;
use serde::Serialize;

use refresh_core::config::RefreshConfig;
use refresh_core::refresher::refresh_control::RefreshControl;
use refresh_core::refresher::strategy::launch_strategy::{DismissPolicy, LaunchStrategy};
use refresh_core::status::{RecordingObserver, TimelineEntry};
use refresh_core::types::types::RefreshError;
use refresh_core::view::{Capture, RefreshView};

mod terminal_observer;
use terminal_observer::TerminalStatusObserver;

#[derive(Parser)]
#[command(name = "refresh", about = "Pull-to-refresh cancellation lab")]
struct Args {
    /// How the control launches the refresh action
    #[arg(short, long, default_value = "direct-child")]
    strategy: LaunchStrategy,

    /// Run every launch strategy side by side (overrides --strategy)
    #[arg(short, long)]
    all: bool,

    /// What the handler captures: the view model or the owning view
    #[arg(short, long, default_value = "model")]
    capture: Capture,

    /// Tear the view down before the control invokes the handler
    #[arg(long)]
    release_owner: bool,

    /// Delay between enter and leave (overrides REFRESH_DELAY_MS)
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Dismiss the refresh indicator this long after the pull
    #[arg(long)]
    dismiss_after_ms: Option<u64>,

    /// Dismiss the indicator on every status change, like a re-rendering view
    #[arg(long)]
    dismiss_on_publish: bool,

    /// Print the timelines as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Everything one scenario produced, for printing.
#[derive(Serialize)]
struct ScenarioSummary {
    strategy: LaunchStrategy,
    capture: Capture,
    dismiss_policy: DismissPolicy,
    dismissed: bool,
    trigger_elapsed_ms: u128,
    /// Status at the moment the trigger reported completion.
    status_at_done: String,
    final_status: String,
    timeline: Vec<TimelineEntry>,
}

struct Scenario {
    config: RefreshConfig,
    capture: Capture,
    release_owner: bool,
    dismiss_after: Option<Duration>,
    dismiss_policy: DismissPolicy,
}

async fn run_scenario(
    scenario: &Scenario,
    strategy: LaunchStrategy,
    multi: &MultiProgress,
) -> Result<ScenarioSummary, RefreshError> {
    let view = RefreshView::new(scenario.config.clone());
    let status = Arc::clone(view.status());

    let recorder = Arc::new(RecordingObserver::new());
    status.add_observer(recorder.clone());
    status.add_observer(Arc::new(TerminalStatusObserver::new(
        multi,
        strategy.as_str(),
        &status.get_status(),
    )));

    let handler = view.handler(scenario.capture);
    if scenario.release_owner {
        log::info!("[refresh] {}: releasing view before invocation", strategy);
        drop(view);
    }

    let control = RefreshControl::new(handler, strategy)
        .with_status(Arc::clone(&status))
        .with_dismiss_policy(scenario.dismiss_policy);

    let cycle = control.pull();
    log::info!("[refresh] {}: pulled cycle={}", strategy, cycle.id());
    if let Some(after) = scenario.dismiss_after {
        tokio::time::sleep(after).await;
        cycle.dismiss();
    }

    let mut report = cycle.finished().await?;
    let status_at_done = status.get_status();

    // Let a fire-and-forget unit finish so the timeline is complete.
    report.join_detached().await?;

    Ok(ScenarioSummary {
        strategy,
        capture: scenario.capture,
        dismiss_policy: scenario.dismiss_policy,
        dismissed: report.dismissed,
        trigger_elapsed_ms: report.elapsed.as_millis(),
        status_at_done,
        final_status: status.get_status(),
        timeline: recorder.timeline(),
    })
}

fn print_summary(summary: &ScenarioSummary) {
    println!(
        "\n[{}] capture={} trigger done after {} ms (dismissed={}), status at done: \"{}\"",
        summary.strategy,
        summary.capture,
        summary.trigger_elapsed_ms,
        summary.dismissed,
        summary.status_at_done
    );
    for entry in &summary.timeline {
        println!("  {:>6} ms  {}", entry.at_ms, entry.snapshot.value);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = match RefreshConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    if let Some(ms) = args.delay_ms {
        config = config.with_delay(Duration::from_millis(ms));
    }

    let scenario = Scenario {
        config,
        capture: args.capture,
        release_owner: args.release_owner,
        dismiss_after: args.dismiss_after_ms.map(Duration::from_millis),
        dismiss_policy: if args.dismiss_on_publish {
            DismissPolicy::OnPublish
        } else {
            DismissPolicy::Manual
        },
    };

    let strategies: Vec<LaunchStrategy> = if args.all {
        LaunchStrategy::ALL.to_vec()
    } else {
        vec![args.strategy]
    };

    let multi = MultiProgress::new();
    if args.json {
        multi.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let results = futures::future::join_all(
        strategies
            .iter()
            .map(|strategy| run_scenario(&scenario, *strategy, &multi)),
    )
    .await;

    let mut summaries = Vec::with_capacity(results.len());
    let mut failed = false;
    for result in results {
        match result {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                eprintln!("Refresh cycle failed: {}", e);
                failed = true;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&summaries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Could not encode timelines: {}", e);
                failed = true;
            }
        }
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
    }

    if failed {
        std::process::exit(1);
    }
}
