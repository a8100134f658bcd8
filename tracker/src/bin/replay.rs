//! Replay a recorded accelerometer session through a tracker and report
//! the steps, metrics and rewards it produces.

use std::{fs::File, path::PathBuf, time::Duration};

use progress_store::{JsonFileStore, MemoryStore, ProgressStore};
use step_detection::Accelerometer;
use time::OffsetDateTime;
use tracker::{Tracker, TrackerEvent};

#[derive(Debug, serde::Deserialize)]
struct SampleCsv {
    timestamp_ms: u64,
    x: f64,
    y: f64,
    z: f64,
}

impl From<SampleCsv> for Accelerometer {
    fn from(SampleCsv { timestamp_ms, x, y, z }: SampleCsv) -> Self {
        Self {
            timestamp: Duration::from_millis(timestamp_ms),
            x,
            y,
            z,
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Input csv file with `timestamp_ms,x,y,z` samples
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("session.csv"), required = false)]
    pub input: PathBuf,
    /// Progress record json file. Omit to replay against an in-memory store
    #[arg(short, long)]
    pub store: Option<PathBuf>,
    /// Print every event as it happens
    #[arg(short, long, default_value_t = false, required = false)]
    pub print: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let Args {
        input,
        store,
        print,
    } = <Args as clap::Parser>::parse();

    let store: Box<dyn ProgressStore> = match store {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };

    let mut rdr = csv::Reader::from_reader(
        File::open(input).map_err(|e| format!("Failed to read input file. Reason: {e}"))?,
    );

    let samples = rdr
        .deserialize::<SampleCsv>()
        .filter_map(|this| this.ok())
        .map(Accelerometer::from)
        .collect::<Vec<_>>();

    println!("Total: {} samples", samples.len());

    let mut tracker = Tracker::new(store);

    if let Some(event) = tracker.check_streak(OffsetDateTime::now_utc().date()) {
        println!("Streak bonus: {event:?}");
    }

    tracker.start();

    for sample in samples {
        for event in tracker.on_sample(sample) {
            match event {
                TrackerEvent::Step(metrics) if print => {
                    println!(
                        "step {:5} | {:4} kcal | {:.2} km",
                        metrics.steps, metrics.calories, metrics.distance_km
                    );
                }
                TrackerEvent::Step(_) => {}
                TrackerEvent::Reward(reward) => println!("Reward: {reward:?}"),
            }
        }
    }

    tracker.stop();

    let metrics = tracker.metrics();
    let progression = tracker.progression();

    println!(
        "Session: {} steps, {} kcal, {:.2} km",
        metrics.steps, metrics.calories, metrics.distance_km
    );
    println!(
        "Ledger: level {} | {} xp | {} coins | {} day streak | {} achievements",
        progression.level,
        progression.experience,
        progression.coins,
        progression.streak_days,
        progression.completed_achievements.len()
    );

    Ok(())
}
