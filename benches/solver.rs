//! Benchmarks for shot evaluation and search strategies.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nalgebra::{Point3, Vector3};

use camon::{
    compute::{
        Camera, Candidate, DEFAULT_LAYER, GeneticAlgorithm, Greedy, HillClimber, ParticleSwarm,
        Pose, PoseRng, PotentialField, Property, ProxyVolume, SearchContext, SearchStrategy, Shot,
        StaticScene, SubjectEvaluator, TrackedPose,
    },
    schema::{AxisLocks, ColliderShape, Lens, ProxyShape, Relation, SubjectConfig},
};

fn scene() -> StaticScene {
    let mut scene = StaticScene::new();
    scene.add(
        ColliderShape::Cuboid {
            min: Point3::new(-0.5, 0.0, -3.0),
            max: Point3::new(0.5, 2.0, -2.5),
        },
        DEFAULT_LAYER,
    );
    scene
}

fn subjects(shape: ProxyShape) -> Vec<Option<SubjectEvaluator>> {
    [Point3::new(-1.0, 0.5, 0.0), Point3::new(1.0, 0.5, 1.0)]
        .into_iter()
        .map(|p| {
            Some(SubjectEvaluator::new(
                TrackedPose::new(p),
                ProxyVolume::new(shape, Vector3::zeros(), Vector3::new(0.6, 1.8, 0.6)),
            ))
        })
        .collect()
}

fn shot() -> Shot {
    Shot::new(
        vec![SubjectConfig::default(); 2],
        vec![
            Property::projection_size(0, 0.5, 1.0),
            Property::vantage_angle(0, 20.0, 10.0, 0.8),
            Property::position_on_screen(1, 0.6, 0.5, 0.5),
            Property::relative_position(0, Relation::LeftOf, 1, 0.5),
        ],
        AxisLocks::default(),
    )
    .unwrap()
}

fn bench_shot_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("shot_quality");
    let scene = scene();
    let camera = Camera::looking_at(Point3::new(0.0, 1.5, -6.0), &Point3::origin(), Lens::default());

    for shape in [
        ProxyShape::Cube,
        ProxyShape::Quad,
        ProxyShape::Cylinder,
        ProxyShape::Capsule,
        ProxyShape::Sphere,
    ] {
        let mut subjects = subjects(shape);
        let mut shot = shot();
        let mut rng = PoseRng::new(42);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", shape)),
            &shape,
            |b, _| {
                b.iter(|| {
                    black_box(shot.quality_at(
                        black_box(&mut subjects),
                        &camera,
                        &scene,
                        &mut rng,
                    ))
                });
            },
        );
    }

    group.finish();
}

fn bench_strategy_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_step");
    let scene = scene();

    let strategies: Vec<Box<dyn SearchStrategy>> = vec![
        Box::new(PotentialField::default()),
        Box::new(HillClimber::new()),
        Box::new(ParticleSwarm::default()),
        Box::new(GeneticAlgorithm::default()),
        Box::new(Greedy::default()),
    ];

    for mut strategy in strategies {
        let mut camera =
            Camera::looking_at(Point3::new(0.0, 1.5, -6.0), &Point3::origin(), Lens::default());
        let mut subjects = subjects(ProxyShape::Cube);
        let mut shot = shot();
        let mut rng = PoseRng::new(42);
        let seed = Pose::from_camera(&camera);
        let mut ctx = SearchContext {
            camera: &mut camera,
            subjects: &mut subjects,
            shot: &mut shot,
            scene: &scene,
        };
        strategy.reset(&mut ctx, &seed, &mut rng);
        let fitness = ctx.evaluate(&seed, &mut rng);
        let best = Candidate::new(seed, fitness);
        strategy.begin_frame(&mut ctx, &best, 1, &mut rng);

        group.bench_function(BenchmarkId::from_parameter(strategy.name()), |b| {
            b.iter(|| {
                let pose = strategy.propose(&mut ctx, &best, &mut rng);
                let fitness = ctx.evaluate(&pose, &mut rng);
                strategy.observe(&pose, fitness, &best, &mut rng);
                black_box(fitness)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shot_quality, bench_strategy_step);
criterion_main!(benches);
