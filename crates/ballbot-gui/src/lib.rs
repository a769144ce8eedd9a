//! Ballbot GUI - Web interface for the ballbot simulator
//!
//! Features:
//! - Configuration panel (robot, drive, IMU)
//! - Trajectory and channel charts via API
//! - Server-side wireframe rendering of the sphere/platform/pendulum scene
//!
//! Every request re-runs the simulation from its query parameters; the
//! server holds no session state.

pub mod camera;
pub mod scene;

use axum::{extract::Query, routing::get, Json, Router};
use ballbot_sim::{
    generate_imu_data, simulate, BotParams, ImuConfig, SimTrace,
};
use camera::Camera;
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;
use std::collections::HashMap;
use tower_http::services::ServeDir;

/// Creates the Axum router with all routes
pub fn create_router() -> Router {
    Router::new()
        .route("/api/simulate", get(handle_simulate))
        .route("/api/chart/{chart_type}", get(handle_chart_data))
        .route("/api/render", get(handle_render))
        .route("/api/params", get(handle_params))
        .nest_service("/static", ServeDir::new("crates/ballbot-gui/static"))
        .fallback_service(ServeDir::new("crates/ballbot-gui/templates"))
}

/// Simulation configuration from query params
#[derive(Debug, Clone)]
struct SimConfig {
    // Robot params
    radius: f64,
    sphere_mass: f64,
    pendulum_mass: f64,
    pendulum_length: f64,
    time_step: f64,
    // Drive params
    drive_voltage: f64,
    tilt_setpoint: f64,
    // Run params
    duration: f64,
    frame_rate: f64,
    // IMU params
    no_imu: bool,
    noise_scale: f64,
    seed: u64,
    // Render params
    time: f64,
    cam_distance: f64,
    cam_theta: f64,
    cam_phi: f64,
    aspect_ratio: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        let params = BotParams::default();
        Self {
            radius: params.radius,
            sphere_mass: params.sphere_mass,
            pendulum_mass: params.pendulum_mass,
            pendulum_length: params.pendulum_length,
            time_step: params.time_step,
            drive_voltage: params.drive_voltage,
            tilt_setpoint: params.tilt_setpoint,
            duration: 10.0,
            frame_rate: 60.0,
            no_imu: false,
            noise_scale: 1.0,
            seed: 42,
            time: 0.0,
            cam_distance: 10.0,
            cam_theta: 0.0,
            cam_phi: std::f64::consts::FRAC_PI_4,
            aspect_ratio: 1.3,
        }
    }
}

/// Parse config from query parameters
fn parse_config(params: &HashMap<String, String>) -> SimConfig {
    let mut config = SimConfig::default();

    macro_rules! parse_param {
        ($field:ident, $name:expr, $type:ty) => {
            if let Some(val) = params.get($name).and_then(|v| v.parse::<$type>().ok()) {
                config.$field = val;
            }
        };
    }

    parse_param!(radius, "radius", f64);
    parse_param!(sphere_mass, "sphere_mass", f64);
    parse_param!(pendulum_mass, "pendulum_mass", f64);
    parse_param!(pendulum_length, "pendulum_length", f64);
    parse_param!(time_step, "time_step", f64);
    parse_param!(drive_voltage, "drive_voltage", f64);
    parse_param!(tilt_setpoint, "tilt_setpoint", f64);
    parse_param!(duration, "duration", f64);
    parse_param!(frame_rate, "frame_rate", f64);
    parse_param!(no_imu, "no_imu", bool);
    parse_param!(noise_scale, "noise_scale", f64);
    parse_param!(seed, "seed", u64);
    parse_param!(time, "time", f64);
    parse_param!(cam_distance, "cam_distance", f64);
    parse_param!(cam_theta, "cam_theta", f64);
    parse_param!(cam_phi, "cam_phi", f64);
    parse_param!(aspect_ratio, "aspect_ratio", f64);

    config
}

fn bot_params(config: &SimConfig) -> BotParams {
    BotParams {
        radius: config.radius,
        sphere_mass: config.sphere_mass,
        pendulum_mass: config.pendulum_mass,
        pendulum_length: config.pendulum_length,
        time_step: config.time_step,
        drive_voltage: config.drive_voltage,
        tilt_setpoint: config.tilt_setpoint,
    }
}

fn start_position(config: &SimConfig) -> Vector3<f64> {
    // The sphere rests on the ground plane.
    Vector3::new(0.0, 0.0, config.radius)
}

/// Handle simulation request
async fn handle_simulate(
    Query(params): Query<HashMap<String, String>>,
) -> Json<FullSimulationResponse> {
    let config = parse_config(&params);
    Json(run_full_simulation(&config))
}

/// Handle specific chart data requests
async fn handle_chart_data(
    axum::extract::Path(chart_type): axum::extract::Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<ChartData> {
    let config = parse_config(&params);
    Json(generate_chart_data(&chart_type, &config))
}

/// Handle a single-frame wireframe render
async fn handle_render(
    Query(params): Query<HashMap<String, String>>,
) -> Json<RenderResponse> {
    let config = parse_config(&params);
    Json(render_frame(&config))
}

/// Slider specifications for the configuration panel
async fn handle_params() -> Json<Vec<ParamSpecDto>> {
    Json(param_specs())
}

#[derive(Serialize)]
struct ParamSpecDto {
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    step: f64,
}

fn param_specs() -> Vec<ParamSpecDto> {
    use ballbot_sim::{drive, imu, robot, ParamSpec};

    fn dto(name: &'static str, spec: ParamSpec) -> ParamSpecDto {
        ParamSpecDto {
            name,
            label: spec.label,
            min: spec.min,
            max: spec.max,
            step: spec.step,
        }
    }

    vec![
        dto("radius", robot::RADIUS),
        dto("sphere_mass", robot::SPHERE_MASS),
        dto("pendulum_mass", robot::PENDULUM_MASS),
        dto("pendulum_length", robot::PENDULUM_LENGTH),
        dto("time_step", robot::TIME_STEP),
        dto("drive_voltage", drive::DRIVE_VOLTAGE),
        dto("tilt_setpoint", drive::TILT_SETPOINT),
        dto("duration", drive::DURATION),
        dto("noise_scale", imu::NOISE_SCALE),
    ]
}

/// Full simulation response with all data
#[derive(Serialize)]
struct FullSimulationResponse {
    time: Vec<f64>,
    position_x: Vec<f64>,
    position_y: Vec<f64>,
    heading: Vec<f64>,
    roll: Vec<f64>,
    tilt: Vec<f64>,
    platform_angle: Vec<f64>,
    pendulum_angle: Vec<f64>,
    angular_velocity: Vec<f64>,
    ground_speed: Vec<f64>,
    imu: Option<ImuChannels>,
    success: bool,
}

#[derive(Serialize)]
struct ImuChannels {
    heading: Vec<f64>,
    tilt: Vec<f64>,
    tilt_velocity: Vec<f64>,
    angular_velocity: Vec<f64>,
}

#[derive(Serialize)]
struct ChartData {
    time: Vec<f64>,
    data: Vec<f64>,
    data_2d: Option<(Vec<f64>, Vec<f64>)>,
    title: String,
    y_label: String,
    chart_type: String,
}

#[derive(Serialize)]
struct RenderResponse {
    /// Normalized-coordinate segments [x1, y1, x2, y2] per body.
    bodies: Vec<BodySegments>,
    success: bool,
}

#[derive(Serialize)]
struct BodySegments {
    name: String,
    segments: Vec<[f64; 4]>,
}

fn ground_speed(trace: &SimTrace, params: &BotParams, i: usize) -> f64 {
    trace.angular_velocity[i] * trace.tilt[i].sin() * params.radius
}

/// Run the simulation described by `config` and package every channel.
fn run_full_simulation(config: &SimConfig) -> FullSimulationResponse {
    let params = bot_params(config);

    let trace = match simulate(
        params,
        start_position(config),
        config.duration,
        config.frame_rate,
    ) {
        Ok(trace) => trace,
        Err(_) => {
            return FullSimulationResponse {
                time: vec![],
                position_x: vec![],
                position_y: vec![],
                heading: vec![],
                roll: vec![],
                tilt: vec![],
                platform_angle: vec![],
                pendulum_angle: vec![],
                angular_velocity: vec![],
                ground_speed: vec![],
                imu: None,
                success: false,
            }
        }
    };

    let imu = if config.no_imu {
        None
    } else {
        let imu_config = ImuConfig {
            noise_scale: config.noise_scale,
            seed: config.seed,
            ..ImuConfig::default()
        };
        let data = generate_imu_data(&trace, &imu_config);

        Some(ImuChannels {
            heading: data.heading,
            tilt: data.tilt,
            tilt_velocity: data.tilt_velocity,
            angular_velocity: data.angular_velocity,
        })
    };

    let n = trace.len();
    FullSimulationResponse {
        time: trace.time.clone(),
        position_x: trace.position.iter().map(|p| p.x).collect(),
        position_y: trace.position.iter().map(|p| p.y).collect(),
        heading: trace.heading.clone(),
        roll: trace.roll.clone(),
        tilt: trace.tilt.clone(),
        platform_angle: trace.platform_angle.clone(),
        pendulum_angle: trace.pendulum_angle.clone(),
        angular_velocity: trace.angular_velocity.clone(),
        ground_speed: (0..n).map(|i| ground_speed(&trace, &params, i)).collect(),
        imu,
        success: true,
    }
}

fn generate_chart_data(chart_type: &str, config: &SimConfig) -> ChartData {
    let results = run_full_simulation(config);

    match chart_type {
        "path" => ChartData {
            time: results.time.clone(),
            data: vec![],
            data_2d: Some((results.position_x, results.position_y)),
            title: "Ground Path".to_string(),
            y_label: "Y (m)".to_string(),
            chart_type: "2d".to_string(),
        },
        "heading" => ChartData {
            time: results.time.clone(),
            data: results.heading,
            data_2d: None,
            title: "Heading vs Time".to_string(),
            y_label: "Heading (rad)".to_string(),
            chart_type: "series".to_string(),
        },
        "speed" => ChartData {
            time: results.time.clone(),
            data: results.ground_speed,
            data_2d: None,
            title: "Ground Speed vs Time".to_string(),
            y_label: "Speed (m/s)".to_string(),
            chart_type: "series".to_string(),
        },
        "platform" => ChartData {
            time: results.time.clone(),
            data: results.platform_angle,
            data_2d: None,
            title: "Platform Angle vs Time".to_string(),
            y_label: "Angle (rad)".to_string(),
            chart_type: "series".to_string(),
        },
        "pendulum" => ChartData {
            time: results.time.clone(),
            data: results.pendulum_angle,
            data_2d: None,
            title: "Pendulum Angle vs Time".to_string(),
            y_label: "Angle (rad)".to_string(),
            chart_type: "series".to_string(),
        },
        _ => ChartData {
            time: results.time.clone(),
            data: results.tilt,
            data_2d: None,
            title: "Tilt vs Time".to_string(),
            y_label: "Tilt (rad)".to_string(),
            chart_type: "series".to_string(),
        },
    }
}

/// Advance a fresh simulation to `config.time` and project the scene.
fn render_frame(config: &SimConfig) -> RenderResponse {
    let params = bot_params(config);
    let trace = match simulate(
        params,
        start_position(config),
        config.time.max(0.0),
        config.frame_rate,
    ) {
        Ok(trace) => trace,
        Err(_) => {
            return RenderResponse {
                bodies: vec![],
                success: false,
            }
        }
    };

    let last = trace.len() - 1;
    let position = trace.position[last];

    let mut camera = Camera::new();
    camera.move_to(config.cam_distance, config.cam_theta, config.cam_phi);
    camera.point_at(position);
    let transform = camera.view_transform(config.aspect_ratio);

    let sphere_mesh = scene::sphere(config.radius, 12);
    let platform_mesh = scene::platform(0.9 * config.radius, 0.1);
    let pendulum_mesh = scene::pendulum(0.1, config.pendulum_length);
    let ground_mesh = scene::ground(2.0, 10);

    let bodies = vec![
        project_body(&camera, &transform, "ground", &ground_mesh, &UnitQuaternion::identity(), Vector3::zeros()),
        project_body(&camera, &transform, "sphere", &sphere_mesh, &trace.rotation[last], position),
        project_body(&camera, &transform, "platform", &platform_mesh, &trace.platform_rotation[last], position),
        project_body(&camera, &transform, "pendulum", &pendulum_mesh, &trace.pendulum_rotation[last], position),
    ];

    RenderResponse {
        bodies,
        success: true,
    }
}

fn project_body(
    camera: &Camera,
    transform: &nalgebra::Matrix4<f64>,
    name: &str,
    mesh: &scene::Wireframe,
    rotation: &UnitQuaternion<f64>,
    translation: Vector3<f64>,
) -> BodySegments {
    let placed = mesh.placed(rotation, translation);
    let projected: Vec<Option<(f64, f64)>> = placed
        .iter()
        .map(|&point| camera.project(transform, point))
        .collect();

    let mut segments = Vec::new();
    for &(a, b) in &mesh.edges {
        // Drop any edge with an endpoint behind the near plane.
        if let (Some((x1, y1)), Some((x2, y2))) = (projected[a], projected[b]) {
            segments.push([x1, y1, x2, y2]);
        }
    }

    BodySegments {
        name: name.to_string(),
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> SimConfig {
        SimConfig {
            duration: 0.2,
            frame_rate: 30.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_simulation_runs() {
        let results = run_full_simulation(&quick_config());

        assert!(results.success);
        assert!(!results.time.is_empty());
        assert_eq!(results.time.len(), results.position_x.len());
        assert_eq!(results.time.len(), results.tilt.len());
        assert!(results.imu.is_some());
    }

    #[test]
    fn no_imu_flag_suppresses_measurements() {
        let config = SimConfig {
            no_imu: true,
            ..quick_config()
        };
        let results = run_full_simulation(&config);

        assert!(results.success);
        assert!(results.imu.is_none());
    }

    #[test]
    fn test_chart_generation() {
        let chart = generate_chart_data("speed", &quick_config());

        assert!(!chart.time.is_empty());
        assert!(!chart.data.is_empty());
        assert_eq!(chart.title, "Ground Speed vs Time");
    }

    #[test]
    fn path_chart_is_two_dimensional() {
        let chart = generate_chart_data("path", &quick_config());

        assert!(chart.data_2d.is_some());
        let (x, y) = chart.data_2d.unwrap();
        assert_eq!(x.len(), y.len());
    }

    #[test]
    fn render_projects_every_body() {
        let config = SimConfig {
            time: 0.1,
            ..quick_config()
        };
        let frame = render_frame(&config);

        assert!(frame.success);
        assert_eq!(frame.bodies.len(), 4);
        for body in &frame.bodies {
            assert!(!body.segments.is_empty(), "{}", body.name);
        }
    }

    #[test]
    fn parse_config_overrides_defaults() {
        let mut query = HashMap::new();
        query.insert("radius".to_string(), "0.5".to_string());
        query.insert("no_imu".to_string(), "true".to_string());
        query.insert("seed".to_string(), "7".to_string());

        let config = parse_config(&query);

        assert_eq!(config.radius, 0.5);
        assert!(config.no_imu);
        assert_eq!(config.seed, 7);
        assert_eq!(config.duration, SimConfig::default().duration);
    }

    #[test]
    fn param_specs_cover_the_query_surface() {
        let specs = param_specs();

        assert!(specs.iter().any(|s| s.name == "radius"));
        assert!(specs.iter().any(|s| s.name == "drive_voltage"));
        for spec in &specs {
            assert!(spec.min < spec.max, "{}", spec.name);
        }
    }

    #[test]
    fn router_builds() {
        let _router = create_router();
    }
}
