//! Wall Scanner CLI
//!
//! Runs a simulated scan: synthetic wall frames are analyzed and passed
//! through a scripted detector, walls are assembled into a room, and the
//! preview draw order is printed.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use wall_scanner::{
    capture::{FrameSource, SyntheticWall},
    config::ScannerConfig,
    detection::{Detector, Element, ScriptedEngine},
    encoding::Tensor,
    metrics::{MetricsRegistry, MetricsSnapshot},
    projection::{Rotation, SceneProjector},
    room::{texture, RoomAssembler},
};

#[derive(Debug, Parser)]
#[command(name = "wall-scanner", version, about = "Simulated AR wall scan")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of walls to capture
    #[arg(long, default_value_t = 4)]
    walls: usize,

    /// Frames sampled per wall before capturing it
    #[arg(long, default_value_t = 3)]
    frames: u32,

    /// Auto-rotate ticks to preview after assembly
    #[arg(long, default_value_t = 3)]
    rotate_ticks: u32,

    /// Write the room model JSON here
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print Prometheus metrics when done
    #[arg(long)]
    print_metrics: bool,
}

/// Base colors and stripe periods for successive synthetic walls.
const WALLS: [([u8; 3], Option<u32>); 4] = [
    ([242, 240, 236], None),
    ([214, 196, 170], Some(9)),
    ([180, 180, 185], Some(6)),
    ([230, 225, 215], Some(3)),
];

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Wall Scanner v{}", wall_scanner::VERSION);

    if let Err(e) = run(args).await {
        eprintln!("Scan failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => ScannerConfig::from_file(path)?,
        None => ScannerConfig::default(),
    };

    let engine = ScriptedEngine::with_output(scripted_output(config.detection.input_size)?);
    let detector = Detector::from_config(engine, &config.detection);
    let mut monitor = config.analysis.monitor();
    let mut room = RoomAssembler::new(config.room.clone());

    info!(walls = args.walls, frames = args.frames, "Starting simulated scan");

    for index in 0..args.walls {
        let (base, stripes) = WALLS[index % WALLS.len()];
        let mut source = SyntheticWall::new(320, 240, base);
        if let Some(period) = stripes {
            source = source.with_stripes(period);
        }
        source.open()?;
        monitor.reset();
        detector.begin_scan();

        let mut elements: Vec<Element> = Vec::new();
        for _ in 0..args.frames.max(1) {
            let frame = source.next_frame()?;
            monitor.sample(&frame);
            if let Some(detection) = detector.detect_latest(&frame).await {
                elements = detection.elements;
            }
        }
        source.close();

        let texture_id = texture::CATALOG[index % texture::CATALOG.len()].id;
        room.select_texture(texture_id)?;
        let wall = room.capture_wall(elements, monitor.latest());
        println!(
            "Wall {}: {} ({}% quality, {} elements, {})",
            wall.position + 1,
            wall.surface_type,
            wall.quality,
            wall.elements.len(),
            wall.texture_id
        );
    }

    let Some(model) = room.model() else {
        warn!(
            captured = room.walls().len(),
            required = config.room.min_walls,
            "Not enough walls for a room model"
        );
        return Ok(());
    };

    let projector = SceneProjector::from_config(&config.projection);
    let mut rotation = Rotation::new(config.projection.pitch, config.projection.yaw);
    let mut ticker = tokio::time::interval(Duration::from_millis(
        config.projection.auto_rotate_interval_ms.max(1),
    ));

    for _ in 0..=args.rotate_ticks {
        ticker.tick().await;
        let order: Vec<String> = projector
            .project(model, rotation)
            .iter()
            .map(|face| format!("{}({})", face.face, face.markers.len()))
            .collect();
        println!("yaw {:>5.1}°: {}", rotation.yaw, order.join(" → "));
        rotation.advance_yaw(config.projection.auto_rotate_step);
    }

    if let Some(path) = &args.export {
        std::fs::write(path, room.export_json()?)?;
        info!(path = %path.display(), "Room model exported");
    }

    let snapshot = MetricsSnapshot::from_components(
        &monitor,
        &detector.stats(),
        detector.session().state().await,
        &room,
    );
    detector.release().await;

    if args.print_metrics {
        let registry = MetricsRegistry::new()?;
        registry.update(&snapshot);
        print!("{}", registry.encode()?);
    }

    info!(
        walls = snapshot.walls_captured,
        elements = snapshot.elements_detected,
        "Scan complete"
    );
    Ok(())
}

/// A detector output with an outlet, a window, a weaker duplicate outlet
/// and one sub-threshold switch, in model input pixels.
fn scripted_output(input_size: u32) -> Result<Tensor, Box<dyn std::error::Error>> {
    let s = input_size as f32 / 640.0;
    let record = |cx: f32, cy: f32, w: f32, h: f32, conf: f32, class: usize| {
        let mut scores = vec![0.02_f32; 4];
        scores[class] = 0.9;
        let mut values = vec![cx * s, cy * s, w * s, h * s, conf];
        values.extend(scores);
        values
    };

    Ok(Tensor::from_records(&[
        record(200.0, 400.0, 30.0, 50.0, 0.92, 0),
        record(420.0, 220.0, 180.0, 160.0, 0.88, 2),
        record(204.0, 402.0, 30.0, 50.0, 0.71, 0),
        record(520.0, 380.0, 24.0, 40.0, 0.31, 1),
    ])?)
}
