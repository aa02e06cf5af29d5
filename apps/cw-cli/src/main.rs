use clap::{Args, Parser, Subcommand};
use cw_app::{
    AppError, AppResult, RunOptions, RunRequest, RunResponse, UnitOutcome, project_service, query,
    run_service,
};
use cw_project::ModelChoice;
use cw_results::{WashLog, WashRecord, parse_timestamp};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coolwatch")]
#[command(about = "Acid cooler fouling, criticality and wash prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every command that analyses data.
#[derive(Args)]
struct RunArgs {
    /// Path to the plant configuration (YAML or JSON)
    config_path: PathBuf,
    /// JSON-lines file of wide sensor records
    data_path: PathBuf,
    /// JSON-lines wash log
    #[arg(long)]
    washes: Option<PathBuf>,
    /// Skip cache and force re-analysis
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plant configuration
    Validate { config_path: PathBuf },
    /// List configured units
    Units { config_path: PathBuf },
    /// Analyse units and print window reports
    Analyze {
        #[command(flatten)]
        run: RunArgs,
        /// Report only this unit
        #[arg(long)]
        unit: Option<String>,
    },
    /// Predict the need for a wash
    Predict {
        #[command(flatten)]
        run: RunArgs,
        /// Predict only this unit
        #[arg(long)]
        unit: Option<String>,
        /// auto | logistic | gradient_boosting | random_forest
        #[arg(long)]
        model: Option<ModelChoice>,
    },
    /// Compare wash triggers across units over a common window
    Fleet {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Export one variable of one unit as CSV
    ExportSeries {
        #[command(flatten)]
        run: RunArgs,
        unit: String,
        /// Variable name (e.g. rf_x1e4, u, criticality)
        variable: String,
        /// Include non-operating samples
        #[arg(long)]
        all: bool,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List cached runs for a configuration
    Runs { config_path: PathBuf },
    /// Wash log
    #[command(subcommand)]
    Washes(WashCommands),
}

#[derive(Subcommand)]
enum WashCommands {
    /// List recorded washes
    List {
        config_path: PathBuf,
        log_path: PathBuf,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Register a wash
    Add {
        config_path: PathBuf,
        log_path: PathBuf,
        /// Cooler name or unit key
        #[arg(long)]
        cooler: String,
        /// Wash time, e.g. "2024-05-02 08:00"
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "Chemical cleaning")]
        wash_type: String,
        #[arg(long, default_value = "")]
        comment: String,
        #[arg(long, default_value = "")]
        operator: String,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Units { config_path } => cmd_units(&config_path),
        Commands::Analyze { run, unit } => cmd_analyze(&run, unit.as_deref()),
        Commands::Predict { run, unit, model } => cmd_predict(&run, unit.as_deref(), model),
        Commands::Fleet { run } => cmd_fleet(&run),
        Commands::ExportSeries {
            run,
            unit,
            variable,
            all,
            output,
        } => cmd_export_series(&run, &unit, &variable, !all, output.as_deref()),
        Commands::Runs { config_path } => cmd_runs(&config_path),
        Commands::Washes(WashCommands::List {
            config_path,
            log_path,
            unit,
        }) => cmd_washes_list(&config_path, &log_path, unit.as_deref()),
        Commands::Washes(WashCommands::Add {
            config_path,
            log_path,
            cooler,
            date,
            wash_type,
            comment,
            operator,
        }) => cmd_washes_add(
            &config_path,
            &log_path,
            &cooler,
            &date,
            &wash_type,
            &comment,
            &operator,
        ),
    }
}

fn run(args: &RunArgs) -> AppResult<RunResponse> {
    let request = RunRequest {
        config_path: &args.config_path,
        data_path: &args.data_path,
        wash_log_path: args.washes.as_deref(),
        options: RunOptions {
            use_cache: !args.no_cache,
            ..RunOptions::default()
        },
    };
    let response = run_service::ensure_run(&request)?;
    tracing::debug!(run_id = %response.run_id, cached = response.loaded_from_cache, "run ready");
    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!(
            "✓ Analysis completed: {} ({:.2} s)",
            response.run_id, response.elapsed_s
        );
    }
    if response.skipped_records > 0 {
        println!("  Skipped records: {}", response.skipped_records);
    }
    for outcome in &response.outcomes {
        if let UnitOutcome::Failed { unit, reason } = outcome {
            println!("  ✗ {unit}: {reason}");
        }
    }
    Ok(response)
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map_or_else(|| "N/A".to_string(), |x| format!("{x:.decimals$}"))
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = project_service::load_config(config_path)?;
    project_service::validate_config(&config)?;
    println!("✓ Configuration is valid ({} units)", config.units.len());
    Ok(())
}

fn cmd_units(config_path: &Path) -> AppResult<()> {
    let config = project_service::load_config(config_path)?;
    println!("Units in {}:", config.name);
    for u in project_service::list_units(&config) {
        println!(
            "  {} - {} (A = {:.1} m², U clean = {:.0} W/m²K, T limit = {:.0}°C, Rf design = {:.2}×10⁻⁴)",
            u.key, u.name, u.area_m2, u.u_clean_w_m2k, u.t_limit_c, u.rf_design_x1e4
        );
    }
    Ok(())
}

fn selected<'a>(response: &'a RunResponse, unit: Option<&str>) -> AppResult<Vec<&'a str>> {
    match unit {
        Some(u) => Ok(vec![response.analysis(u)?.unit.as_str()]),
        None => Ok(response.analyses().iter().map(|a| a.unit.as_str()).collect()),
    }
}

fn cmd_analyze(args: &RunArgs, unit: Option<&str>) -> AppResult<()> {
    let response = run(args)?;
    for key in selected(&response, unit)? {
        let analysis = response.analysis(key)?;
        let report = query::unit_report(&response.config, analysis);

        println!("\n=== {} ===", report.unit);
        match (report.window_start, report.window_kind) {
            (Some(start), Some(cw_analysis::WindowKind::SinceLastWash)) => {
                println!("Window: since last wash ({start})")
            }
            (Some(start), Some(cw_analysis::WindowKind::LastDays(d))) => {
                println!("Window: last {d} days (from {start})")
            }
            _ => println!("Window: none"),
        }
        println!(
            "Samples: {} ({} operating in window)",
            report.samples, report.operating_samples
        );
        if let Some(stats) = &report.stats {
            for (name, value) in stats.named() {
                println!("  {name:<22} {}", fmt_opt(value, 2));
            }
        }
        for (title, interp) in [
            ("Thermal", &report.thermal),
            ("Fouling", &report.fouling),
            ("Criticality", &report.criticality),
        ] {
            println!("{title} [{}]", interp.status);
            for item in &interp.items {
                println!("  {item}");
            }
            for rec in &interp.recommendations {
                println!("  • {rec}");
            }
        }
        println!(
            "Washes: {} recorded, mean interval {} d, last {}",
            report.washes.count,
            fmt_opt(report.washes.mean_interval_days, 0),
            report
                .washes
                .last
                .map_or_else(|| "N/A".to_string(), |t| t.format("%Y-%m-%d").to_string())
        );
        println!(
            "Wash required: {} ({})",
            if report.trigger.required { "yes" } else { "no" },
            report.trigger.reason
        );
    }
    Ok(())
}

fn cmd_predict(args: &RunArgs, unit: Option<&str>, model: Option<ModelChoice>) -> AppResult<()> {
    let response = run(args)?;
    for key in selected(&response, unit)? {
        let p = cw_app::predict(&response, key, model)?;

        println!("\n=== {} ===", p.unit);
        println!(
            "Training data: n={}, pos={}, neg={}",
            p.rows, p.positives, p.negatives
        );
        match p.trainability.reason() {
            Some(reason) => println!("Classifier not trainable: {reason}"),
            None => {
                for c in &p.candidates {
                    println!(
                        "  {:<20} PR-AUC {}  ROC-AUC {}",
                        c.kind.label(),
                        fmt_opt(c.pr_auc, 3),
                        fmt_opt(c.roc_auc, 3)
                    );
                }
                if let Some(kind) = p.selected {
                    println!("Selected model: {kind}");
                }
            }
        }
        println!("Rule score: {:.2}", p.rule.score);
        for note in &p.rule.notes {
            println!("  {note}");
        }
        println!("ML probability: {}", fmt_opt(p.ml_probability, 3));
        println!(
            "Wash probability: {:.1}% ({})",
            p.probability * 100.0,
            p.decision
        );
        if !p.importances.is_empty() {
            println!("Feature importance:");
            for (name, v) in &p.importances {
                println!("  {name:<18} {v:.3}");
            }
        }
    }
    Ok(())
}

fn cmd_fleet(args: &RunArgs) -> AppResult<()> {
    let response = run(args)?;
    let report = query::fleet_report(&response.config, &response.analyses());
    println!("\nGlobal window: {} days", report.window_days);
    println!(
        "{:<6} {:>11} {:>7} {:>7}  {:<6} Reason",
        "Unit", "Criticality", "T P95", "Rf P95", "Wash?"
    );
    for row in report.rows {
        println!(
            "{:<6} {:>11} {:>7} {:>7}  {:<6} {}",
            row.unit,
            fmt_opt(row.crit_mean, 0),
            fmt_opt(row.t_out_p95, 1),
            fmt_opt(row.rf_p95, 2),
            if row.trigger.required { "yes" } else { "no" },
            row.trigger.reason
        );
    }
    Ok(())
}

fn cmd_export_series(
    args: &RunArgs,
    unit: &str,
    variable: &str,
    operating_only: bool,
    output: Option<&Path>,
) -> AppResult<()> {
    let response = run(args)?;
    let analysis = response.analysis(unit)?;
    let series = query::extract_series(analysis, variable, operating_only)?;

    let mut csv = format!("timestamp,{variable}\n");
    for (t, v) in &series {
        csv.push_str(&format!("{},{}\n", t.format("%Y-%m-%d %H:%M:%S"), v));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{csv}");
    }
    Ok(())
}

fn cmd_runs(config_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(config_path)?;
    if runs.is_empty() {
        println!("No cached runs found");
    } else {
        println!("Cached runs:");
        for m in runs {
            println!(
                "  {} ({}) units: {} failed: {}",
                m.run_id,
                m.timestamp,
                m.units.join(","),
                m.failed_units.len()
            );
        }
    }
    Ok(())
}

fn cmd_washes_list(config_path: &Path, log_path: &Path, unit: Option<&str>) -> AppResult<()> {
    let config = project_service::load_config(config_path)?;
    let events = WashLog::new(log_path).load(&config)?;
    let shown: Vec<_> = events
        .iter()
        .filter(|e| unit.is_none_or(|u| e.unit.as_deref() == Some(u)))
        .collect();
    if shown.is_empty() {
        println!("No washes recorded");
        return Ok(());
    }
    for e in shown {
        println!(
            "  {}  {:<5} {:<20} {:<20} {} {}",
            e.timestamp.format("%Y-%m-%d %H:%M"),
            e.unit.as_deref().unwrap_or("?"),
            e.cooler,
            e.wash_type,
            e.operator,
            e.comment
        );
    }
    Ok(())
}

fn cmd_washes_add(
    config_path: &Path,
    log_path: &Path,
    cooler: &str,
    date: &str,
    wash_type: &str,
    comment: &str,
    operator: &str,
) -> AppResult<()> {
    let config = project_service::load_config(config_path)?;
    let timestamp = parse_timestamp(date)
        .ok_or_else(|| AppError::InvalidInput(format!("Unrecognised wash date: {date}")))?;
    let Some(unit) = config.resolve_unit_name(cooler) else {
        return Err(AppError::UnitNotFound(cooler.to_string()));
    };
    WashLog::new(log_path).append(&WashRecord::new(
        timestamp, unit, wash_type, comment, operator,
    ))?;
    println!("✓ Wash registered for {unit} at {timestamp}");
    Ok(())
}
