//! Ballbot CLI - Command line interface for batch simulation.

use anyhow::Result;
use ballbot_sim::{generate_imu_data, simulate, BotParams, ImuConfig, ImuData, SimTrace};
use clap::{Parser, ValueEnum};
use nalgebra::Vector3;
use std::path::PathBuf;

/// Public function that can be called from the main binary
pub fn run_cli_main(args: &[&str]) -> Result<()> {
    let args = Args::parse_from(args);
    main_inner(args)
}

#[derive(Parser, Debug)]
#[command(name = "ballbot-cli")]
#[command(about = "Self-balancing spherical robot simulator")]
#[command(version)]
pub struct Args {
    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Run a single simulation
    #[arg(long)]
    single: bool,

    // ── Robot parameters ──────────────────────────────────────
    #[arg(long, default_value_t = 1.0)]
    radius: f64,

    #[arg(long, default_value_t = 9.0)]
    sphere_mass: f64,

    #[arg(long, default_value_t = 50.0)]
    pendulum_mass: f64,

    #[arg(long, default_value_t = 0.7)]
    pendulum_length: f64,

    #[arg(long, default_value_t = 2e-4)]
    time_step: f64,

    // ── Drive parameters ──────────────────────────────────────
    #[arg(long, default_value_t = 2.0)]
    drive_voltage: f64,

    /// Tilt setpoint (rad); defaults to 0.4π
    #[arg(long, default_value_t = 1.2566370614359172)]
    tilt_setpoint: f64,

    // ── Run options ───────────────────────────────────────────
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    #[arg(long, default_value_t = 60.0)]
    frame_rate: f64,

    // ── IMU options ───────────────────────────────────────────
    #[arg(long)]
    no_imu: bool,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 1.0)]
    noise_scale: f64,

    // ── Sweep options ─────────────────────────────────────────
    /// Parameter swept in batch mode
    #[arg(long, value_enum, default_value = "drive-voltage")]
    sweep_param: SweepParam,

    #[arg(long, default_value_t = 5)]
    sweep_steps: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SweepParam {
    DriveVoltage,
    PendulumMass,
}

fn main_inner(args: Args) -> Result<()> {
    println!("Ballbot Simulator");
    println!("=================\n");

    if args.single {
        run_single(&args)?;
    } else {
        run_sweep(&args)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Single Run
// ---------------------------------------------------------------------------
fn run_single(args: &Args) -> Result<()> {
    println!("Running single simulation...");

    // 1. Setup & Simulate
    let params = build_bot_params(args);
    let trace = simulate(
        params,
        start_position(args),
        args.duration,
        args.frame_rate,
    )?;

    print_sim_stats(&trace, &params);

    // 2. Generate IMU trace (if requested)
    let imu = if !args.no_imu {
        let config = ImuConfig {
            noise_scale: args.noise_scale,
            seed: args.seed,
            ..ImuConfig::default()
        };
        Some(generate_imu_data(&trace, &config))
    } else {
        None
    };

    // 3. Export
    write_output(args, &trace, &params, imu.as_ref())?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Sweep Run
// ---------------------------------------------------------------------------
fn run_sweep(args: &Args) -> Result<()> {
    println!("Sweeping {:?} over {} steps", args.sweep_param, args.sweep_steps);

    let steps = args.sweep_steps.max(2);
    let mut summary_rows = Vec::new();

    let (name, base) = match args.sweep_param {
        SweepParam::DriveVoltage => ("drive_voltage", args.drive_voltage),
        SweepParam::PendulumMass => ("pendulum_mass", args.pendulum_mass),
    };
    let start = base * 0.5;
    let end = base * 1.5;

    for i in 0..steps {
        let value = start + (end - start) * (i as f64 / (steps - 1) as f64);

        let mut params = build_bot_params(args);
        match args.sweep_param {
            SweepParam::DriveVoltage => params.drive_voltage = value,
            SweepParam::PendulumMass => params.pendulum_mass = value,
        }

        let trace = simulate(
            params,
            start_position(args),
            args.duration,
            args.frame_rate,
        )?;
        let distance = travel_distance(&trace);

        println!(
            "Run {}/{} | {}: {:.3} -> Distance: {:.2} m",
            i + 1,
            steps,
            name,
            value,
            distance
        );

        summary_rows.push((value, distance));
    }

    // Write summary
    let path = args.output_dir.join("sweep_summary.csv");
    std::fs::create_dir_all(&args.output_dir)?;
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record([name, "distance"])?;
    for (value, distance) in summary_rows {
        wtr.write_record(&[format!("{:.4}", value), format!("{:.4}", distance)])?;
    }
    wtr.flush()?;

    println!("\nSweep complete. Summary at {:?}", path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_bot_params(args: &Args) -> BotParams {
    BotParams {
        radius: args.radius,
        sphere_mass: args.sphere_mass,
        pendulum_mass: args.pendulum_mass,
        pendulum_length: args.pendulum_length,
        time_step: args.time_step,
        drive_voltage: args.drive_voltage,
        tilt_setpoint: args.tilt_setpoint,
    }
}

fn start_position(args: &Args) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, args.radius)
}

fn travel_distance(trace: &SimTrace) -> f64 {
    match (trace.position.first(), trace.position.last()) {
        (Some(first), Some(last)) => (last - first).norm(),
        _ => 0.0,
    }
}

fn print_sim_stats(trace: &SimTrace, params: &BotParams) {
    let final_heading = trace.heading.last().copied().unwrap_or(0.0);
    let peak_speed = trace
        .angular_velocity
        .iter()
        .zip(&trace.tilt)
        .map(|(w, tilt)| (w * tilt.sin() * params.radius).abs())
        .fold(0.0, f64::max);

    println!("\nSimulation Stats:");
    println!("  Frames:        {}", trace.len());
    println!("  Sim Time:      {:.2} s", trace.time.last().copied().unwrap_or(0.0));
    println!("  Distance:      {:.2} m", travel_distance(trace));
    println!("  Final Heading: {:.3} rad", final_heading);
    println!("  Peak Speed:    {:.3} m/s", peak_speed);
    println!("-----------------------------");
}

fn write_output(
    args: &Args,
    trace: &SimTrace,
    params: &BotParams,
    imu: Option<&ImuData>,
) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;
    let path = args.output_dir.join("simulation.csv");
    let mut wtr = csv::Writer::from_path(&path)?;

    wtr.write_record([
        "time",
        // Sim truth
        "pos_x",
        "pos_y",
        "heading",
        "roll",
        "tilt",
        "tilt_velocity",
        "platform_angle",
        "pendulum_angle",
        "angular_velocity",
        "ground_speed",
        // IMU measurements (if available)
        "meas_heading",
        "meas_tilt",
        "meas_tilt_velocity",
        "meas_angular_velocity",
    ])?;

    let n = trace.len();
    for i in 0..n {
        let position = trace.position[i];
        let ground_speed = trace.angular_velocity[i] * trace.tilt[i].sin() * params.radius;

        // Default "empty" values if the IMU didn't run
        let (mh, mt, mtv, mav) = if let Some(data) = imu {
            (
                data.heading[i],
                data.tilt[i],
                data.tilt_velocity[i],
                data.angular_velocity[i],
            )
        } else {
            (0.0, 0.0, 0.0, 0.0)
        };

        wtr.write_record(&[
            format!("{:.4}", trace.time[i]),
            // Truth
            format!("{:.6}", position.x),
            format!("{:.6}", position.y),
            format!("{:.6}", trace.heading[i]),
            format!("{:.6}", trace.roll[i]),
            format!("{:.6}", trace.tilt[i]),
            format!("{:.6}", trace.tilt_velocity[i]),
            format!("{:.6}", trace.platform_angle[i]),
            format!("{:.6}", trace.pendulum_angle[i]),
            format!("{:.6}", trace.angular_velocity[i]),
            format!("{:.6}", ground_speed),
            // IMU
            format!("{:.6}", mh),
            format!("{:.6}", mt),
            format!("{:.6}", mtv),
            format!("{:.6}", mav),
        ])?;
    }

    wtr.flush()?;
    println!("Data written to {:?}", path);
    Ok(())
}
