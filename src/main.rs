use std::path::PathBuf;

use aven_wheel::{PhysicsWorld, SimConfig, StepSummary};
use clap::Parser;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "wheel-sim", version, about = "Drive one vehicle on flat ground with the per-tick wheel model")]
struct Args {
    /// JSON SimConfig (default preset when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of fixed ticks to run (overrides the config)
    #[arg(long)]
    ticks: Option<u64>,

    /// Pace ticks at the configured dt instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Throttle in [-1, 1]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    throttle: f32,

    /// Steering in [-1, 1] (+ = right)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    steer: f32,

    /// Log a JSON debug snapshot every N ticks (0 = never)
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

const VEHICLE_ID: &str = "car";

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn report(phys: &PhysicsWorld, tick: u64, summary: StepSummary) -> Result<(), serde_json::Error> {
    let snapshot = serde_json::to_string(&phys.debug_snapshot())?;
    let (position, speed) = phys
        .chassis(VEHICLE_ID)
        .map(|b| (*b.translation(), b.linvel().norm()))
        .unwrap_or((nalgebra::Vector3::zeros(), 0.0));

    info!(
        tick,
        applied = summary.applied,
        skipped = summary.skipped,
        x = position.x,
        y = position.y,
        z = position.z,
        speed,
        "tick report"
    );
    debug!(tick, %snapshot, "debug overlay");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let ticks = args.ticks.unwrap_or(config.ticks);
    info!(dt = config.dt, ticks, realtime = args.realtime, "starting wheel-sim");

    let mut phys = PhysicsWorld::new(&config);
    phys.spawn_vehicle(VEHICLE_ID, config.vehicle.clone())?;
    phys.set_input(VEHICLE_ID, args.throttle, args.steer);

    let mut ticker = interval(Duration::from_secs_f32(config.dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    for tick in 1..=ticks {
        if args.realtime {
            ticker.tick().await;
        }

        let summary = phys.step(config.dt);

        if args.report_every > 0 && tick % args.report_every == 0 {
            report(&phys, tick, summary)?;
        }
    }

    let grounded = phys.vehicle(VEHICLE_ID).map(|v| v.grounded_wheels()).unwrap_or(0);
    info!(grounded, "finished");
    Ok(())
}
