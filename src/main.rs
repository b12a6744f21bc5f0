//! Tilt Deck entry point
//!
//! On the web the library's `#[wasm_bindgen(start)]` hook and the exported
//! `TiltDeckApp` do the work. Natively this replays a scripted sensor trace
//! through a full round and prints the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilt Deck (native) starting...");

    let mut args = std::env::args().skip(1);
    let catalog_path = args.next();
    let key = args.next();

    if let Err(e) = native::run(catalog_path.as_deref(), key.as_deref()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start hook, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use tilt_deck::catalog::{Catalog, Category};
    use tilt_deck::consts::TIMER_INTERVAL_MS;
    use tilt_deck::motion::{RawSample, ScreenRotation};
    use tilt_deck::platform::PermissionStatus;
    use tilt_deck::round::{Round, RoundResult};
    use tilt_deck::settings::Settings;

    /// Sensor rate of the simulated device
    const SAMPLE_INTERVAL_MS: f64 = 20.0;
    /// Resting front-back angle with the device held to the forehead
    const FOREHEAD_BETA: f64 = 85.0;

    fn demo_category() -> Category {
        Category::new(
            "kids",
            "Kids",
            ["Dinosaur", "Unicorn", "Pirate", "Robot", "Dragon", "Penguin"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
        )
    }

    /// Scripted player: hold still, then alternate down/up tilts with a
    /// return to neutral in between. One cycle every 2.4 s.
    fn scripted_beta(t_ms: f64) -> f64 {
        let phase = t_ms % 2400.0;
        let cycle = (t_ms / 2400.0) as u64;
        let tilt = if cycle % 3 == 2 { -45.0 } else { 45.0 };
        if (1200.0..1600.0).contains(&phase) {
            FOREHEAD_BETA + tilt
        } else {
            FOREHEAD_BETA
        }
    }

    pub fn run(catalog_path: Option<&str>, key: Option<&str>) -> Result<(), Box<dyn Error>> {
        let category = match catalog_path {
            Some(path) => {
                let catalog = Catalog::from_path(path)?;
                match key {
                    Some(key) => catalog.get(key)?.clone(),
                    None => {
                        let first = catalog.entries().into_iter().next().ok_or("catalog is empty")?;
                        catalog.get(&first.key)?.clone()
                    }
                }
            }
            None => demo_category(),
        };

        let settings = Settings::load();
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let mut round = Round::new(category, &settings, seed)?;
        round.begin_calibration(PermissionStatus::Granted)?;

        let result = simulate(&mut round).ok_or("round did not finish")?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }

    /// Drive the round with interleaved samples and timer ticks until it ends
    fn simulate(round: &mut Round) -> Option<RoundResult> {
        let tick_ms = f64::from(TIMER_INTERVAL_MS);
        let mut now = 0.0;
        let mut next_tick = tick_ms;
        // Generous bound: the round cannot outlive its own countdown
        let limit = (f64::from(round.config().seconds) + 5.0) * 1000.0;

        while now < limit {
            let sample = RawSample::new(scripted_beta(now), 0.0);
            if let Some(result) = round.on_sample(&sample, ScreenRotation::Upright, now) {
                return Some(result);
            }
            if round.timer_running() && now >= next_tick {
                next_tick += tick_ms;
                if let Some(result) = round.on_timer_tick() {
                    return Some(result);
                }
            }
            now += SAMPLE_INTERVAL_MS;
        }
        None
    }
}
