use shape_from_shading::config::reconstruct::{load_config, ReconstructConfig};
use shape_from_shading::diagnostics::SolveReport;
use shape_from_shading::image::io::{load_normalized_image, save_normalized_f64, write_json_file};
use shape_from_shading::{ShapeFromShading, StatisticalEstimator};
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let image = load_normalized_image(&config.input)?;
    let illumination = config.illumination.to_illumination()?;

    let mut solver = ShapeFromShading::new(config.solver);
    let report = solver
        .solve_with_diagnostics(&image, illumination, &StatisticalEstimator)
        .map_err(|e| format!("Reconstruction failed: {e}"))?;

    write_outputs(&config, &report)?;
    print_summary(&report);
    Ok(())
}

fn write_outputs(config: &ReconstructConfig, report: &SolveReport) -> Result<(), String> {
    let rec = &report.reconstruction;
    save_normalized_f64(&rec.height, &config.output.height_image)?;
    println!("Height map written to {}", config.output.height_image.display());
    if let Some(path) = &config.output.p_image {
        save_normalized_f64(&rec.p, path)?;
        println!("p gradient written to {}", path.display());
    }
    if let Some(path) = &config.output.q_image {
        save_normalized_f64(&rec.q, path)?;
        println!("q gradient written to {}", path.display());
    }
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report.trace)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &SolveReport) {
    let trace = &report.trace;
    println!("Reconstruction summary");
    println!("  input: {}x{}", trace.input.width, trace.input.height);
    println!(
        "  illumination: slant={:.4} rad tilt={:.4} rad ({})",
        trace.illumination.slant,
        trace.illumination.tilt,
        if trace.estimate.is_some() {
            "estimated"
        } else {
            "given"
        }
    );
    if let Some(est) = &trace.estimate {
        println!(
            "  estimate: albedo={:.4} mean_intensity={:.4}",
            est.albedo, est.mean_intensity
        );
    }
    println!(
        "  sweeps: {}/{} final mean |f|={}",
        trace.iterations_run,
        trace.iterations_requested,
        trace
            .final_residual()
            .map(|v| format!("{v:.6e}"))
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  height: min={:.4} max={:.4} mean={:.4}",
        trace.height.min, trace.height.max, trace.height.mean
    );
    let stages: Vec<String> = trace
        .timings
        .stages
        .iter()
        .map(|s| format!("{}={:.3}", s.label, s.elapsed_ms))
        .collect();
    println!(
        "  timings (ms): {} total={:.3}",
        stages.join(" "),
        trace.timings.total_ms
    );
}

fn usage() -> String {
    "Usage: reconstruct <config.json>".to_string()
}
