//! Ring Arena entry point
//!
//! Headless driver: runs one match on a fixed timestep and logs what a HUD
//! would show.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec3;

use ring_arena::consts::*;
use ring_arena::sim::{ArenaEvent, ArenaSequencer, CloudMirror};
use ring_arena::ui::{CountdownDisplay, CountdownStyle};
use ring_arena::{ArenaSettings, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "ring-arena", about = "Run a shrinking-ring match headlessly")]
struct Args {
    /// JSON settings file (defaults to the two-ring layout)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated frame length in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f32,

    /// Print the planned timeline and exit
    #[arg(long)]
    timeline: bool,
}

/// Match instance plus the fixed-step bookkeeping
struct Driver {
    arena: ArenaSequencer,
    accumulator: f32,
    cloud: CloudMirror,
    cloud_alive: bool,
    last_shown: Option<(String, CountdownStyle)>,
}

impl Driver {
    fn new(arena: ArenaSequencer, cloud: CloudMirror) -> Self {
        Self {
            arena,
            accumulator: 0.0,
            cloud_alive: cloud.ring().is_some(),
            cloud,
            last_shown: None,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.arena.advance(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.follow_cloud();
        }

        self.draw_hud();
    }

    fn follow_cloud(&mut self) {
        if !self.cloud_alive {
            return;
        }
        let Some(ring) = self.cloud.ring().and_then(|i| self.arena.ring(i)) else {
            return;
        };
        if self.cloud.update(ring).despawn {
            self.cloud_alive = false;
            log::info!("Cloud over {} dissolved", ring.name());
        }
    }

    /// Print the countdown whenever its text or tier changes
    fn draw_hud(&mut self) {
        let display = CountdownDisplay::for_arena(&self.arena);
        let shown = (display.text.clone(), display.style);
        if self.last_shown.as_ref() == Some(&shown) {
            return;
        }
        println!(
            "[{:>6.2}s] {:<8} {:?} | {}",
            self.arena.match_elapsed(),
            display.text,
            display.style,
            self.arena.phase()
        );
        for ring in self.arena.rings() {
            log::debug!("  {}", ring.status_line());
        }
        self.last_shown = Some(shown);
    }
}

fn check_frame_dt(frame_dt: f32) -> Result<(), ConfigError> {
    if frame_dt.is_nan() || frame_dt < MIN_FRAME_DT {
        return Err(ConfigError::invalid(
            "frame_dt",
            frame_dt,
            format!("at least {MIN_FRAME_DT} seconds"),
        ));
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let settings = match &args.config {
        Some(path) => ArenaSettings::load(path)?,
        None => ArenaSettings::default(),
    };
    check_frame_dt(args.frame_dt)?;

    let mut arena = ArenaSequencer::from_settings(&settings)?;
    let timeline = arena.timeline();
    print!("{timeline}");
    if !timeline.fits_match() {
        log::warn!("Rings do not finish before the match timer runs out");
    }
    if args.timeline {
        return Ok(());
    }

    arena.subscribe(|event| match event {
        ArenaEvent::PhaseChanged(phase) => println!("== {phase}"),
        ArenaEvent::MatchEnded => println!("== Match over"),
        _ => log::trace!("{event:?}"),
    });

    let mut cloud = CloudMirror::new(Vec3::splat(3.0), settings.cloud.clone());
    let above_first = settings.rings[0].position + Vec3::Y * 5.0;
    cloud.bind_below(above_first, arena.rings());

    let mut driver = Driver::new(arena, cloud);
    while !driver.arena.is_settled() {
        driver.update(args.frame_dt);
    }

    for ring in driver.arena.rings() {
        println!("{}", ring.status_line());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Ring Arena (headless) starting...");

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> Driver {
        let arena = ArenaSequencer::from_settings(&ArenaSettings::default()).unwrap();
        Driver::new(arena, CloudMirror::new(Vec3::ONE, Default::default()))
    }

    #[test]
    fn tiny_frames_are_rejected() {
        assert!(check_frame_dt(1e-12).is_err());
        assert!(check_frame_dt(0.0).is_err());
        assert!(check_frame_dt(-1.0).is_err());
        assert!(check_frame_dt(f32::NAN).is_err());
        assert!(check_frame_dt(MIN_FRAME_DT).is_ok());
        assert!(check_frame_dt(1.0 / 60.0).is_ok());
    }

    #[test]
    fn smallest_accepted_frame_still_advances_the_match() {
        let mut d = driver();
        for _ in 0..1_000 {
            d.update(MIN_FRAME_DT);
        }
        assert!(d.arena.match_elapsed() > 0.0);
    }

    #[test]
    fn default_frames_run_the_match_to_settled() {
        let mut d = driver();
        let mut frames = 0;
        while !d.arena.is_settled() && frames < 10_000 {
            d.update(SIM_DT);
            frames += 1;
        }
        assert!(d.arena.is_settled());
    }
}
