use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use bullwhip_sim::io::report::generate_report;
use bullwhip_sim::io::reporting;
use bullwhip_sim::io::run_store::{RunStore, RunSummary};
use bullwhip_sim::simulation::analysis::{
    compare_policies, policy_heatmap, radar_scores, sensitivity_sweep,
};
use bullwhip_sim::{
    run_full_sim, LiveConfig, LiveSession, Policy, Result, RunResult, Scenario, ScenarioConfig,
};
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Three-tier supply chain simulator for measuring the bullwhip effect.
#[derive(Parser, Debug)]
#[command(name = "bullwhip-sim", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One 100-tick run with the same policy on every tier
    Run {
        #[arg(long, default_value = "NAIVE")]
        policy: Policy,
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Export the per-tick table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print the full result, history included, as JSON
        #[arg(long)]
        json: bool,
        /// Save a run summary into this directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Run all four policies on one scenario side by side
    Compare {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Factory bullwhip as the step-shock magnitude grows
    Sensitivity {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Factory bullwhip for every policy x scenario preset
    Heatmap,
    /// Narrative comparison report
    Report {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Write Markdown here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Tick a chain on a timer; press Enter to pause or resume
    Live {
        /// TOML file with live settings
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        retailer: Option<Policy>,
        #[arg(long)]
        wholesaler: Option<Policy>,
        #[arg(long)]
        factory: Option<Policy>,
        /// Milliseconds between ticks
        #[arg(long)]
        speed_ms: Option<u64>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value = "runs")]
        store: PathBuf,
        /// Don't save a summary when the session completes
        #[arg(long)]
        no_save: bool,
    },
    /// List or delete saved runs
    History {
        #[arg(long, default_value = "runs")]
        store: PathBuf,
        #[arg(long)]
        delete: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Built-in scenario preset
    #[arg(long, default_value = "COVID_SHOCK")]
    scenario: Scenario,
    /// TOML scenario file; overrides --scenario
    #[arg(long, conflicts_with = "scenario")]
    config: Option<PathBuf>,
}

impl ScenarioArgs {
    fn resolve(&self) -> Result<(Scenario, ScenarioConfig)> {
        match &self.config {
            Some(path) => {
                let config = ScenarioConfig::from_toml_file(path)?;
                Ok((Scenario::for_pattern(config.demand_pattern), config))
            }
            None => Ok((self.scenario, self.scenario.config())),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Run {
            policy,
            scenario,
            csv,
            json,
            store,
        } => {
            let (_, config) = scenario.resolve()?;
            let result = run_full_sim(policy, &config);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_results(std::slice::from_ref(&result));
            }
            if let Some(path) = csv {
                reporting::write_simulation_log(path, &result.history)?;
            }
            if let Some(dir) = store {
                RunStore::new(dir).save(&RunSummary::from_result(&result, &config))?;
            }
            Ok(())
        }
        Command::Compare { scenario } => {
            let (preset, config) = scenario.resolve()?;
            println!("=== {} ===", preset.label());
            let results = compare_policies(&config);
            print_results(&results);

            println!(
                "\n{:<16}{:>10}{:>10}{:>10}{:>12}{:>10}",
                "Scores", "Stability", "Service", "Low inv", "No stockout", "Peak"
            );
            for s in radar_scores(&results) {
                println!(
                    "{:<16}{:>10}{:>10}{:>10}{:>12}{:>10}",
                    s.policy.short_label(),
                    s.stability,
                    s.service_level,
                    s.low_inventory,
                    s.no_stockout,
                    s.peak_control
                );
            }
            Ok(())
        }
        Command::Sensitivity { scenario } => {
            let (_, config) = scenario.resolve()?;
            print!("{:<8}", "Shock");
            for p in Policy::ALL {
                print!("{:>12}", p.short_label());
            }
            println!();
            for row in sensitivity_sweep(&config) {
                print!("{:<8}", format!("x{}", row.magnitude));
                for value in row.factory_bullwhip.values() {
                    print!("{value:>12.2}");
                }
                println!();
            }
            Ok(())
        }
        Command::Heatmap => {
            print!("{:<12}", "Policy");
            for s in Scenario::ALL {
                print!("{:>14}", s.id());
            }
            println!();
            for row in policy_heatmap() {
                print!("{:<12}", row.policy.short_label());
                for value in row.cells.values() {
                    print!("{value:>14.2}");
                }
                println!();
            }
            Ok(())
        }
        Command::Report { scenario, out } => {
            let (preset, config) = scenario.resolve()?;
            let results = compare_policies(&config);
            let Some(report) = generate_report(&results, preset, &config) else {
                return Ok(());
            };
            match out {
                Some(path) => std::fs::write(path, report.to_markdown())?,
                None => println!("{}", report.to_markdown()),
            }
            Ok(())
        }
        Command::Live {
            config,
            retailer,
            wholesaler,
            factory,
            speed_ms,
            csv,
            store,
            no_save,
        } => {
            let mut live = match config {
                Some(path) => LiveConfig::from_toml_file(path)?,
                None => LiveConfig::default(),
            };
            live.retailer_policy = retailer.unwrap_or(live.retailer_policy);
            live.wholesaler_policy = wholesaler.unwrap_or(live.wholesaler_policy);
            live.factory_policy = factory.unwrap_or(live.factory_policy);
            live.speed_ms = speed_ms.unwrap_or(live.speed_ms);
            live.validate()?;

            let session = run_live(live)?;

            if let Some(path) = csv {
                reporting::write_simulation_log(path, session.history())?;
            }
            if !no_save {
                if let Some(summary) = session.summary() {
                    RunStore::new(store).save(&summary)?;
                }
            }
            Ok(())
        }
        Command::History { store, delete } => {
            let store = RunStore::new(store);
            if let Some(id) = delete {
                return store.delete(&id);
            }
            print_history(store.dir(), &store.list()?);
            Ok(())
        }
    }
}

fn run_live(config: LiveConfig) -> Result<LiveSession> {
    let speed = Duration::from_millis(config.speed_ms);
    let mut session = LiveSession::new(config);

    // Enter toggles pause; the reader thread ends with stdin.
    let (toggle_tx, toggle_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() || toggle_tx.send(()).is_err() {
                break;
            }
        }
    });

    session.resume();
    while !session.is_complete() {
        while toggle_rx.try_recv().is_ok() {
            if session.is_running() {
                session.pause();
                println!("-- paused at tick {} (Enter to resume)", session.tick());
            } else {
                session.resume();
                println!("-- resumed");
            }
        }

        if let Some(record) = session.on_timer() {
            if record.tick % 5 == 0 {
                println!(
                    "Tick {:>3}: demand {:>3} | inv R/W/F {:>4} {:>4} {:>4} | orders R/W/F {:>4} {:>4} {:>4}",
                    record.tick,
                    record.customer_demand,
                    record.retailer.inventory,
                    record.wholesaler.inventory,
                    record.factory.inventory,
                    record.retailer.last_order_placed,
                    record.wholesaler.last_order_placed,
                    record.factory.last_order_placed,
                );
            }
        }
        thread::sleep(speed);
    }

    let bw = session.bullwhip();
    println!(
        "\nBullwhip R/W/F: {:.2} / {:.2} / {:.2}",
        bw.retailer, bw.wholesaler, bw.factory
    );
    Ok(session)
}

fn print_results(results: &[RunResult]) {
    println!(
        "{:<16}{:>8}{:>8}{:>8}{:>10}{:>11}{:>10}{:>7}",
        "Policy", "BW R", "BW W", "BW F", "Avg inv", "Stockouts", "Service", "Peak"
    );
    for r in results {
        println!(
            "{:<16}{:>8.2}{:>8.2}{:>8.2}{:>10.1}{:>11}{:>9.1}%{:>7}",
            r.policy.label(),
            r.bullwhip.retailer,
            r.bullwhip.wholesaler,
            r.bullwhip.factory,
            r.avg_inv,
            r.stockouts,
            r.service_level,
            r.factory_peak
        );
    }
}

fn print_history(dir: &Path, runs: &[RunSummary]) {
    if runs.is_empty() {
        println!("No saved runs in {}", dir.display());
        return;
    }
    println!("{} saved runs", runs.len());
    for run in runs {
        let policies: Vec<&str> = run.policies.iter().map(|p| p.id()).collect();
        println!(
            "{}  {}  {:<20} {:<42} BW {:.2}  stockouts {}  service {:.1}%",
            run.id,
            run.timestamp.format("%Y-%m-%d %H:%M"),
            run.scenario.label(),
            policies.join(" / "),
            run.factory_bw,
            run.stockouts,
            run.service_level
        );
    }
}
