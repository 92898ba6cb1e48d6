use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use am_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, project_service, query,
    run_service,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "am-cli")]
#[command(about = "AeroMission CLI - aircraft mission segment solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax, structure, and models
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// List missions in a project
    Missions {
        /// Path to the project file
        project_path: PathBuf,
    },
    /// Fly every mission of a project
    Run {
        /// Path to the project file
        project_path: PathBuf,
        /// Mission days to fly, aging batteries in between
        #[arg(long, default_value_t = 1)]
        days: u32,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a project
    Runs {
        /// Path to the project file
        project_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// List stored paths of one segment
    Paths {
        project_path: PathBuf,
        run_id: String,
        mission: String,
        segment: String,
        /// Mission day (defaults to the last day flown)
        #[arg(long)]
        day: Option<u32>,
    },
    /// Export a time series from a run
    ExportSeries {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Mission tag
        mission: String,
        /// Segment-qualified path, e.g. cruise.weights.total_mass or *.freestream.altitude
        path: String,
        /// Column of the series to export
        #[arg(long, default_value_t = 0)]
        column: usize,
        /// Mission day (defaults to the last day flown)
        #[arg(long)]
        day: Option<u32>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Missions { project_path } => cmd_missions(&project_path),
        Commands::Run {
            project_path,
            days,
            no_cache,
        } => cmd_run(&project_path, days, !no_cache),
        Commands::Runs { project_path } => cmd_runs(&project_path),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::Paths {
            project_path,
            run_id,
            mission,
            segment,
            day,
        } => cmd_paths(&project_path, &run_id, &mission, &segment, day),
        Commands::ExportSeries {
            project_path,
            run_id,
            mission,
            path,
            column,
            day,
            output,
        } => cmd_export_series(
            &project_path,
            &run_id,
            &mission,
            &path,
            column,
            day,
            output.as_deref(),
        ),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_missions(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let missions = project_service::list_missions(&project);

    if missions.is_empty() {
        println!("No missions found in project");
    } else {
        println!("Missions in project:");
        for mission in missions {
            println!(
                "  {} ({} segments: {})",
                mission.tag,
                mission.segment_count,
                mission.segment_tags.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_run(project_path: &Path, days: u32, use_cache: bool) -> AppResult<()> {
    println!("Flying missions of: {}", project_path.display());

    let request = RunRequest {
        project_path,
        options: RunOptions {
            use_cache,
            days,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| {
            let emit_now = last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Run completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);
    print_mission_table(&response.manifest);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(day) = event.day {
        line.push_str(&format!("  day={}", day));
    }
    if let Some(mission) = &event.mission {
        line.push_str(&format!("  mission={}", mission));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &am_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);

    println!("\nTiming summary:");
    println!(
        "  Compile: {:.3}s ({:.1}%)",
        timing.compile_time_s,
        100.0 * timing.compile_time_s / total
    );
    println!(
        "  Solve:   {:.3}s ({:.1}%)",
        timing.solve_time_s,
        100.0 * timing.solve_time_s / total
    );
    println!(
        "  Save:    {:.3}s ({:.1}%)",
        timing.save_time_s,
        100.0 * timing.save_time_s / total
    );
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
    if timing.total_evaluations > 0 {
        println!("  Residual evaluations: {}", timing.total_evaluations);
    }
}

fn print_mission_table(manifest: &am_app::RunManifest) {
    println!("\nSegments:");
    for mission in &manifest.missions {
        for segment in &mission.segments {
            println!(
                "  day {:>3}  {:<16} {:<20} {:<10} evals={:<6} residual={:.3e}",
                mission.day,
                mission.tag,
                segment.tag,
                if segment.converged { "converged" } else { "FAILED" },
                segment.evaluations,
                segment.residual_norm
            );
        }
    }
}

fn cmd_runs(project_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(project_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", project_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {} day(s){})",
                manifest.run_id,
                manifest.timestamp,
                manifest.days,
                if manifest.all_converged() { "" } else { ", not converged" }
            );
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, results) = run_service::load_run(project_path, run_id)?;
    let summary = query::get_run_summary(&results, None)?;

    println!("\nRun Summary:");
    println!("  Project: {}", manifest.project_name);
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Days: {}", manifest.days);
    println!(
        "  Time range (day {}): {:.3} - {:.3} s",
        summary.day, summary.time_range.0, summary.time_range.1
    );
    println!("  Missions: {}", summary.mission_count);
    println!("  Segments: {}", summary.segment_count);
    print_mission_table(&manifest);
    Ok(())
}

fn cmd_paths(
    project_path: &Path,
    run_id: &str,
    mission: &str,
    segment: &str,
    day: Option<u32>,
) -> AppResult<()> {
    let (_manifest, results) = run_service::load_run(project_path, run_id)?;
    for path in query::list_paths(&results, day, mission, segment)? {
        println!("{}", path);
    }
    Ok(())
}

fn cmd_export_series(
    project_path: &Path,
    run_id: &str,
    mission: &str,
    path: &str,
    column: usize,
    day: Option<u32>,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, results) = run_service::load_run(project_path, run_id)?;
    let series = query::extract_series(&results, day, mission, path, column)?;
    let csv = query::series_to_csv(&series, path);

    if let Some(output_path) = output {
        std::fs::write(output_path, csv)?;
        println!("✓ Exported {} points to: {}", series.len(), output_path.display());
    } else {
        print!("{}", csv);
    }
    Ok(())
}
