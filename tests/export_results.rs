//! Export judging results to JSON for offline inspection.
//!
//! Run with: cargo test --test export_results -- --ignored --nocapture

use aero_judge::elements::{Line, Loop};
use aero_judge::{
    Collector, Criterion, ErrorMode, Exponential, JudgingConfig, ManParm, ManParms, Manoeuvre, ManoeuvreDefinition,
    ManoeuvreResults, ParameterKind, Transformation,
};
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;
use std::f64::consts::PI;
use std::fs::File;
use std::io::Write;

#[derive(Serialize)]
struct CriterionExport {
    element: String,
    criterion: String,
    raw: f64,
    downgrade: f64,
    indices: Vec<usize>,
}

#[derive(Serialize)]
struct FlightExport {
    label: String,
    radii: [f64; 2],
    distance: f64,
    low_confidence: bool,
    score: f64,
    criteria: Vec<CriterionExport>,
}

#[derive(Serialize)]
struct ExportData {
    flights: Vec<FlightExport>,
    template_freq: f64,
    lowpass_cutoff: f64,
}

fn definition() -> ManoeuvreDefinition {
    ManoeuvreDefinition::new(
        double_loop(70.0, 70.0),
        ManParms::new(vec![ManParm::new(
            "loop_radius",
            Criterion::Comparison {
                lookup: Exponential::ratio(),
                mode: ErrorMode::Ratio,
            },
            70.0,
            vec![
                Collector::new("loop1", ParameterKind::Radius),
                Collector::new("loop2", ParameterKind::Radius),
            ],
        )])
        .unwrap(),
        Transformation::new(Vector3::new(-100.0, 150.0, -60.0), UnitQuaternion::identity()),
    )
}

fn double_loop(r1: f64, r2: f64) -> Manoeuvre {
    Manoeuvre::new(
        "double_loop",
        3.0,
        vec![
            Line::new("entry", 30.0, 60.0).into(),
            Loop::new("loop1", 30.0, r1, 2.0 * PI).into(),
            Line::new("mid", 30.0, 90.0).into(),
            Loop::new("loop2", 30.0, r2, 2.0 * PI).into(),
            Line::new("exit", 30.0, 60.0).into(),
        ],
    )
    .unwrap()
}

fn export_flight(label: String, radii: [f64; 2], results: &ManoeuvreResults) -> FlightExport {
    let mut criteria = Vec::new();
    for element in std::iter::once(&results.inter).chain(results.intra.results.iter()) {
        for result in &element.results {
            criteria.push(CriterionExport {
                element: element.name.clone(),
                criterion: result.name.clone(),
                raw: result.raw,
                downgrade: result.downgrade(),
                indices: result.indices.clone(),
            });
        }
    }
    FlightExport {
        label,
        radii,
        distance: results.distance,
        low_confidence: results.low_confidence,
        score: results.score(),
        criteria,
    }
}

#[test]
#[ignore] // Run manually with: cargo test --test export_results -- --ignored --nocapture
fn export_results_to_json() {
    let config = JudgingConfig::default();
    let def = definition();

    let mut flights = Vec::new();
    for (i, radii) in [[70.0, 70.0], [65.0, 75.0], [60.0, 80.0], [50.0, 90.0]].iter().enumerate() {
        let flown = double_loop(radii[0], radii[1])
            .create_template(&def.initial, config.template_freq)
            .expect("template");
        let results = def.analyse(&flown, &config).expect("analysis");
        flights.push(export_flight(format!("double_loop_{}", i), *radii, &results));
    }

    let export_data = ExportData {
        flights,
        template_freq: config.template_freq,
        lowpass_cutoff: config.lowpass_cutoff,
    };
    let json = serde_json::to_string_pretty(&export_data).expect("Failed to serialize");

    let output_path = std::env::temp_dir().join("aero_judge_results.json");
    let mut file = File::create(&output_path).expect("Failed to create file");
    file.write_all(json.as_bytes()).expect("Failed to write file");

    println!("Exported {} flights to {}", export_data.flights.len(), output_path.display());
    for flight in &export_data.flights {
        println!("  {:<14} score {:>5.1}", flight.label, flight.score);
    }
}

#[cfg(feature = "serde")]
#[test]
fn test_results_serde_round_trip() {
    let config = JudgingConfig::default();
    let def = definition();
    let flown = double_loop(60.0, 80.0)
        .create_template(&def.initial, config.template_freq)
        .unwrap();
    let results = def.analyse(&flown, &config).unwrap();

    let json = serde_json::to_string(&results).unwrap();
    let restored: ManoeuvreResults = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.summary(), results.summary());
    assert_eq!(restored.corrected.elements.ids().count(), 5);

    let json = serde_json::to_string(&def).unwrap();
    let restored: ManoeuvreDefinition = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.mps.len(), 1);
    assert_eq!(restored.manoeuvre.elements.len(), 5);
}
