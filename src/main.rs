//! CamOn CLI - Run a framing scenario from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::time::Instant;

use camon::{
    compute::{
        Camera, CameraOperator, ColliderId, DEFAULT_LAYER, Shot, Solver, StaticScene,
        SubjectBinding, TrackedPose, Transition,
    },
    schema::{ColliderShape, Scenario},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.json>", args[0]);
        eprintln!();
        eprintln!("Run an autonomous camera over a simulated scenario.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  scenario.json  Path to scenario file (subjects, obstacles, shot, solver)");
        eprintln!();
        eprintln!("Example scenario is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_scenario();
        return;
    }

    let scenario_path = PathBuf::from(&args[1]);
    let scenario = Scenario::load(&scenario_path).unwrap_or_else(|e| {
        eprintln!("Error loading scenario: {}", e);
        std::process::exit(1);
    });

    let shot = Shot::from_config(&scenario.shot).unwrap_or_else(|e| {
        eprintln!("Error building shot: {}", e);
        std::process::exit(1);
    });

    println!("CamOn Scenario");
    println!("==============");
    println!("Subjects: {}", scenario.subjects.len());
    println!("Obstacles: {}", scenario.obstacles.len());
    println!("Properties: {}", shot.properties().len());
    println!("Ticks: {} (dt {:.4}s)", scenario.ticks, scenario.dt);
    println!();

    // Static obstacles plus one moving collider per subject that asks for it
    let mut scene = StaticScene::from_obstacles(&scenario.obstacles);
    let mut positions: Vec<_> = scenario.subjects.iter().map(|s| s.position).collect();
    let colliders: Vec<Option<ColliderId>> = scenario
        .subjects
        .iter()
        .map(|s| {
            s.collider_radius.map(|radius| {
                scene.add(
                    ColliderShape::Sphere {
                        center: s.position,
                        radius,
                    },
                    DEFAULT_LAYER,
                )
            })
        })
        .collect();
    let bindings = scenario
        .subjects
        .iter()
        .zip(&colliders)
        .map(|(s, collider)| SubjectBinding {
            collider: *collider,
            ignore_rotation: s.ignore_rotation,
            ..SubjectBinding::new(TrackedPose::new(s.position).with_heading(s.heading))
        })
        .collect();

    let camera = Camera::looking_at(
        scenario.camera.position,
        &scenario.camera.look_at,
        scenario.camera.lens,
    );
    let solver = Solver::from_config(&scenario.solver);
    println!("Strategy: {}", solver.strategy_name());

    let mut operator = CameraOperator::new(scenario.operator, camera, solver);
    operator
        .select_shot(shot, Transition::Cut, bindings, &scene)
        .unwrap_or_else(|e| {
            eprintln!("Error selecting shot: {}", e);
            std::process::exit(1);
        });

    let start = Instant::now();
    let report_interval = (scenario.ticks / 10).max(1);
    let mut total = 0.0;

    for tick in 0..scenario.ticks {
        for (i, subject) in scenario.subjects.iter().enumerate() {
            if subject.velocity == nalgebra::Vector3::zeros() {
                continue;
            }
            let delta = subject.velocity * scenario.dt;
            positions[i] += delta;
            if let Some(id) = colliders[i] {
                scene.translate(id, &delta);
            }
            operator.set_subject_pose(
                i,
                TrackedPose::new(positions[i]).with_heading(subject.heading),
            );
        }

        let satisfaction = operator.tick(scenario.dt, &scene);
        total += satisfaction;

        if tick % report_interval == 0 || tick + 1 == scenario.ticks {
            let camera = operator.camera();
            println!(
                "Tick {:4}: satisfaction={:.4}, budget={:>6.1}ms, camera=({:.2}, {:.2}, {:.2})",
                tick,
                satisfaction,
                operator.time_limit().as_secs_f64() * 1000.0,
                camera.position.x,
                camera.position.y,
                camera.position.z
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Completed {} ticks in {:.2?}", scenario.ticks, elapsed);
    println!(
        "Mean satisfaction: {:.4}",
        total / scenario.ticks.max(1) as f32
    );
    println!("Candidates evaluated: {}", operator.solver().iterations());
    if let Some(best) = operator.solver().trace().best() {
        println!("Best recent candidate: {:.4}", best.fitness);
    }
}

fn print_example_scenario() {
    let scenario = Scenario::default();
    match serde_json::to_string_pretty(&scenario) {
        Ok(json) => {
            println!("Example scenario (scenario.json):");
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Error serializing scenario: {}", e);
            std::process::exit(1);
        }
    }
}
