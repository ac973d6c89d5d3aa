//! Demo client: concurrent weather fetches over the cooperative loop.
//!
//! Fires three requests at a slow JSON endpoint, joins them with `all`, and
//! decodes each `{"temperature": .., "humidity": ..}` payload. An interval
//! ticks while the fetches poll, to make the interleaving visible. Pass the
//! endpoint URL as the first argument; defaults to a local stub server.

use looper::{SchedulerBuilder, all, fetch, interval, stop_on_signals};

use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct Weather {
    temperature: i32,
    humidity: i32,
}

fn main() {
    env_logger::init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8000/".to_string());

    let scheduler = SchedulerBuilder::new()
        .connect_timeout(Duration::from_secs(2))
        .build();
    stop_on_signals(scheduler.stop_handle());

    let started = Instant::now();
    interval(&scheduler, Duration::from_millis(500), move |_| {
        println!("... waiting ({:?} elapsed)", started.elapsed());
    });

    let batch = all(
        &scheduler,
        vec![
            fetch(&scheduler, &endpoint),
            fetch(&scheduler, &endpoint),
            fetch(&scheduler, &endpoint),
        ],
    );

    match scheduler.block_on(&batch) {
        Ok(bodies) => {
            for body in bodies {
                match serde_json::from_str::<Weather>(&body) {
                    Ok(weather) => println!(
                        "{}°C at {}% humidity",
                        weather.temperature, weather.humidity
                    ),
                    Err(err) => eprintln!("bad payload {body:?}: {err}"),
                }
            }
        }
        Err(err) => eprintln!("fetch failed: {err}"),
    }
}
