use shape_from_shading::illumination::{IlluminationEstimator, StatisticalEstimator};
use shape_from_shading::synthetic::lambertian_sphere;
use shape_from_shading::{Illumination, ShapeFromShading, SolverParams};
use std::env;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn parse_arg(idx: usize, default: usize) -> Result<usize, String> {
    match env::args().nth(idx) {
        Some(s) => s
            .parse()
            .map_err(|e| format!("Invalid argument '{s}': {e}\n{}", usage())),
        None => Ok(default),
    }
}

fn run() -> Result<(), String> {
    let size = parse_arg(1, 64)?;
    let iterations = parse_arg(2, 200)?;

    let truth = Illumination::new(30f64.to_radians(), 45f64.to_radians());
    let image = lambertian_sphere(size, 0.4, &truth, 0.9);

    let estimate = StatisticalEstimator
        .estimate(&image)
        .map_err(|e| format!("Estimation failed: {e}"))?;
    println!(
        "True light: slant={:.2}° tilt={:.2}°",
        truth.slant.to_degrees(),
        truth.tilt.to_degrees()
    );
    println!(
        "Estimated:  slant={:.2}° tilt={:.2}° albedo={:.3}",
        estimate.slant.to_degrees(),
        estimate.tilt.to_degrees(),
        estimate.albedo
    );

    let mut solver = ShapeFromShading::new(SolverParams::default().with_iterations(iterations));
    let report = solver
        .solve_with_diagnostics(&image, Some(truth), &StatisticalEstimator)
        .map_err(|e| format!("Reconstruction failed: {e}"))?;
    let trace = &report.trace;
    println!(
        "Solved {}x{} in {:.3} ms ({} sweeps)",
        size, size, trace.timings.total_ms, trace.iterations_run
    );
    println!(
        "Height: min={:.4} max={:.4} mean={:.4}",
        trace.height.min, trace.height.max, trace.height.mean
    );
    if let (Some(first), Some(last)) = (trace.residual_trace.first(), trace.residual_trace.last()) {
        println!("Mean |f|: first={first:.4} last={last:.4}");
    }
    Ok(())
}

fn usage() -> String {
    "Usage: sphere_demo [size] [iterations]".to_string()
}
