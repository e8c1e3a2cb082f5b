//! Momentum Lab entry point
//!
//! Headless runner: records three trials of each collision type, fills the
//! worksheet from the readings and prints the graded submission as JSON.
//!
//! Usage: momentum-lab [SEED] [--settings PATH] [--store PATH]

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use momentum_lab::consts::{FRAME_RATE_HZ, TRIALS_PER_MODE};
    use momentum_lab::lab::{
        AnalysisEntries, AnalysisField, Axis, EntryField, FieldStatus, InstrumentReadings,
        LabSession, Phase, Puck, axes,
    };
    use momentum_lab::LabSettings;
    use momentum_lab::persistence::JsonFileStore;
    use momentum_lab::sim::{CollisionMode, SimPhase};

    /// Give up on a run that has not settled after this many ticks
    const MAX_RUN_TICKS: u64 = 60 * FRAME_RATE_HZ as u64;

    /// Launch angles used for the three 2-D trials
    const TWO_D_ANGLES: [f64; 3] = [5.0, 9.0, 13.0];

    struct Args {
        seed: Option<u64>,
        settings: Option<PathBuf>,
        store: Option<PathBuf>,
    }

    fn parse_args() -> Args {
        let mut args = Args {
            seed: None,
            settings: None,
            store: None,
        };
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--settings" => args.settings = iter.next().map(PathBuf::from),
                "--store" => args.store = iter.next().map(PathBuf::from),
                other => match other.parse::<u64>() {
                    Ok(seed) => args.seed = Some(seed),
                    Err(_) => log::warn!("Ignoring unknown argument: {other}"),
                },
            }
        }
        args
    }

    /// Run one launch until it settles (or times out)
    fn run_once(session: &mut LabSession) {
        session.reset();
        session.start();
        let mut ticks = 0;
        while session.is_running() && ticks < MAX_RUN_TICKS {
            session.tick();
            ticks += 1;
        }
        if session.state().phase != SimPhase::Settled {
            log::warn!("Run did not settle after {ticks} ticks; stopping");
            session.stop();
        }
        session.flush_persistence();
    }

    /// Type the readings into the worksheet the way a careful student would
    fn fill_worksheet(
        session: &mut LabSession,
        mode: CollisionMode,
        number: u32,
        readings: &InstrumentReadings,
    ) {
        for &axis in axes(mode) {
            for phase in Phase::BOTH {
                for puck in Puck::BOTH {
                    if let Some(p) = readings.body(phase, puck).momentum(axis) {
                        let field = EntryField::Momentum { puck, phase, axis };
                        session.enter_value(mode, number, field, &format!("{p:.4}"));
                    }
                }
                if let Some(total) = readings.total(phase, axis) {
                    let field = EntryField::Total { phase, axis };
                    session.enter_value(mode, number, field, &format!("{total:.4}"));
                }
            }
            if let Some(diff) = readings.percent_difference(axis) {
                let field = EntryField::PercentDifference { axis };
                session.enter_value(mode, number, field, &format!("{diff:.4}"));
            }
        }
    }

    fn print_readings(mode: CollisionMode, number: u32, readings: &InstrumentReadings) {
        println!("{} trial {number} (collision at frame {})", mode.as_str(), readings.frame);
        for phase in Phase::BOTH {
            for puck in Puck::BOTH {
                let r = readings.body(phase, puck);
                let angle = r
                    .angle_deg
                    .map(|a| format!(", {a:.1} deg"))
                    .unwrap_or_default();
                println!(
                    "  {phase:?} {puck:?}: {:.1} g, spacing {:.2} cm, {:.2} cm/s{angle}",
                    r.mass_grams, r.spacing_cm, r.speed_cm_s
                );
            }
        }
        if let Some(diff) = readings.percent_difference(Axis::X) {
            println!("  x momentum difference: {diff:.2}%");
        }
    }

    pub fn run() {
        env_logger::init();
        let args = parse_args();

        let mut settings = match &args.settings {
            Some(path) => LabSettings::load(path),
            None => LabSettings::default(),
        };
        if let Some(seed) = args.seed {
            settings.seed = seed;
        }
        log::info!("Momentum Lab (headless) starting with seed {}", settings.seed);

        let mut session = LabSession::new(settings);
        if let Some(path) = args.store {
            session.connect_store(Box::new(JsonFileStore::new(path)));
            session.flush_persistence();
        }

        for mode in [CollisionMode::OneD, CollisionMode::TwoD] {
            session.reset();
            session.set_mode(mode);
            for number in 1..=TRIALS_PER_MODE {
                if mode == CollisionMode::TwoD {
                    session.set_launch_angle(TWO_D_ANGLES[(number - 1) as usize]);
                }
                run_once(&mut session);
                if let Err(e) = session.commit_to_trial(number) {
                    log::error!("Could not record {} trial {number}: {e}", mode.as_str());
                    continue;
                }
                let Some(readings) = session.trial(mode, number).and_then(|t| t.readings) else {
                    continue;
                };
                print_readings(mode, number, &readings);
                fill_worksheet(&mut session, mode, number, &readings);
            }
        }

        for field in AnalysisEntries::fields() {
            if let Some(average) = AnalysisEntries::correct_value(field, session.trials()) {
                session.enter_analysis(field, &format!("{average:.4}"));
            }
            let AnalysisField::AveragePercentDifference { mode, axis } = field;
            let status = session.analysis_status(field);
            if status != FieldStatus::Correct {
                log::warn!("Average for {} {axis:?} is {status:?}", mode.as_str());
            }
        }
        session.flush_persistence();

        for note in session.take_notifications() {
            log::warn!("{:?}: {}", note.level, note.message);
        }

        match serde_json::to_string_pretty(&session.submission()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Could not encode submission: {e}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm
}
