//! # Drive Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drive_lib::drive_base::{DriveKinematics, KinematicsParams, WheelDeltas};

fn kinematics_benchmark(c: &mut Criterion) {
    let tank = DriveKinematics::from_params(&KinematicsParams::Tank).unwrap();
    let mecanum = DriveKinematics::from_params(&KinematicsParams::Mecanum).unwrap();
    let swerve = DriveKinematics::from_params(&KinematicsParams::Swerve {
        width: 22.0,
        length: 28.0,
    })
    .unwrap();

    // ---- Wheel outputs ----

    c.bench_function("tank wheel outputs", |b| {
        b.iter(|| tank.compute_wheel_outputs(0.0, black_box(0.7), black_box(-0.3), 0.0))
    });

    c.bench_function("mecanum wheel outputs", |b| {
        b.iter(|| {
            mecanum.compute_wheel_outputs(
                black_box(0.6),
                black_box(0.8),
                black_box(0.5),
                black_box(35.0),
            )
        })
    });

    c.bench_function("swerve wheel outputs", |b| {
        b.iter(|| {
            swerve.compute_wheel_outputs(
                black_box(0.6),
                black_box(0.8),
                black_box(0.5),
                black_box(35.0),
            )
        })
    });

    // ---- Odometry ----

    let deltas = WheelDeltas {
        distances: [1.2, 0.8, 1.1, 0.9],
        steer_angles_deg: Some([10.0, 12.0, 8.0, 11.0]),
    };

    c.bench_function("swerve odometry delta", |b| {
        b.iter(|| swerve.odometry_delta(black_box(&deltas)))
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
