use shape_from_shading::config::reconstruct::parse_config;
use shape_from_shading::image::io::{load_normalized_image, save_normalized_f64, write_json_file};
use shape_from_shading::image::ImageView;
use shape_from_shading::synthetic::lambertian_sphere;
use shape_from_shading::{Illumination, ShapeFromShading, StatisticalEstimator};
use std::fs;

#[test]
fn png_in_height_map_and_report_out() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = std::env::temp_dir().join(format!("sfs-pipeline-{}", std::process::id()));
    let input = dir.join("sphere.png");
    let light = Illumination::new(0.5, 0.8);
    save_normalized_f64(&lambertian_sphere(24, 0.4, &light, 0.9), &input).unwrap();

    let config_json = format!(
        r#"{{
            "input": {input:?},
            "illumination": {{ "slant": 0.5, "tilt": 0.8 }},
            "solver": {{ "iterations": 8, "smoothing": {{ "window": 5 }} }},
            "output": {{
                "height_image": {height:?},
                "p_image": {p:?},
                "report_json": {report:?}
            }}
        }}"#,
        input = input.to_string_lossy(),
        height = dir.join("out/height.png").to_string_lossy(),
        p = dir.join("out/p.png").to_string_lossy(),
        report = dir.join("out/report.json").to_string_lossy(),
    );
    let config = parse_config(&config_json).unwrap();
    assert_eq!(config.solver.iterations, 8);
    assert_eq!(config.solver.smoothing.window, 5);

    let image = load_normalized_image(&config.input).unwrap();
    assert_eq!(image.shape(), (24, 24));
    assert!(image.data.iter().all(|v| (0.0..=1.0).contains(v)));

    let illumination = config.illumination.to_illumination().unwrap();
    assert_eq!(illumination, Some(light));

    let report = ShapeFromShading::new(config.solver)
        .solve_with_diagnostics(&image, illumination, &StatisticalEstimator)
        .unwrap();
    assert!(report.trace.estimate.is_none());
    assert_eq!(report.trace.iterations_run, 8);

    let out = &config.output;
    save_normalized_f64(&report.reconstruction.height, &out.height_image).unwrap();
    if let Some(path) = &out.p_image {
        save_normalized_f64(&report.reconstruction.p, path).unwrap();
    }
    if let Some(path) = &out.report_json {
        write_json_file(path, &report.trace).unwrap();
    }

    let height = load_normalized_image(&out.height_image).unwrap();
    assert_eq!(height.shape(), (24, 24));
    assert!(out.p_image.as_ref().unwrap().exists());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.report_json.as_ref().unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["input"]["width"], 24);
    assert_eq!(json["iterationsRequested"], 8);

    let _ = fs::remove_dir_all(&dir);
}
