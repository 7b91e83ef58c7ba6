use std::env::args;
use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use queued_rwlock::{demo, stress};

fn main() -> Result<(), String> {
    env_logger::init();

    let mut args = args().skip(1);
    let selector = args.next().ok_or(format!(
        "no demo supplied, use one of {} (stress takes optional [threads] [iterations])",
        Demo::iter()
            .map(|d| d.to_string())
            .collect::<Vec<String>>()
            .join(",")
    ))?;
    let selected = Demo::from_str(&selector).map_err(|e| format!("{selector}: {e}"))?;

    let outcome = match selected {
        Demo::FastPath => demo::fast_path(),
        Demo::HandOff => demo::hand_off(),
        Demo::Batching => demo::batching(),
        Demo::Stress => {
            let mut config = stress::StressConfig::default();
            if let Some(threads) = args.next() {
                config.threads = threads.parse::<usize>().map_err(|e| format!("threads: {e}"))?;
            }
            if let Some(iterations) = args.next() {
                config.iterations = iterations.parse::<usize>().map_err(|e| format!("iterations: {e}"))?;
            }
            stress::run(&config).map(|report| {
                println!("{report:?}");
                if !report.is_consistent() {
                    println!("the lock let somebody in it shouldn't have");
                }
            })
        }
    };
    outcome.map_err(|e| e.to_string())
}

#[derive(EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
enum Demo {
    FastPath,
    HandOff,
    Batching,
    Stress,
}
