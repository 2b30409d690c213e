//! Gesture pilot
//!
//! Connects to a Tello, starts its video stream, and turns held hand gestures
//! into flight commands until `q`, Esc or Ctrl-C. The annotated feed is shown
//! in a window; without one (`--no-window`, no graphical session) the
//! terminal shows a status line instead.
//!
//! # Usage
//!
//! ```bash
//! gesture_pilot --snapshot-dir Drone_images
//! gesture_pilot --simulate --video-source test.mp4
//! ```

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use gesture_pilot::config::Cli;
use gesture_pilot::display::{Display, LogDisplay, TerminalDisplay, WindowDisplay};
use gesture_pilot::drone::{DroneControl, SimulatedDrone, TelloLink};
use gesture_pilot::vision::{FfmpegStream, SidecarDetector};
use gesture_pilot::{logging, DroneSession, LoopControl, Pilot};
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{error, info, warn};

/// Video window first, then the terminal, then plain logs.
fn open_display(cli: &Cli, battery: u8) -> Result<Box<dyn Display>> {
    if !cli.no_window {
        match WindowDisplay::open(cli.frame_width, cli.frame_height) {
            Ok(mut window) => {
                window.set_battery(battery);
                return Ok(Box::new(window));
            }
            Err(e) => warn!("No video window, using terminal display: {e}"),
        }
    }
    if io::stdout().is_terminal() {
        let mut terminal = TerminalDisplay::open().context("Failed to open terminal display")?;
        terminal.set_battery(battery);
        Ok(Box::new(terminal))
    } else {
        Ok(Box::new(LogDisplay::new(Some(battery))))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());
    cli.validate().context("Invalid configuration")?;

    let drone: Box<dyn DroneControl> = if cli.simulate {
        info!("Flying a simulated drone");
        Box::new(SimulatedDrone::default())
    } else {
        let link = TelloLink::new(cli.tello()).context("Failed to open drone link")?;
        info!("Drone link on {} -> {}", link.local_addr()?, cli.drone_addr);
        Box::new(link)
    };
    let session = DroneSession::open(drone).context("Failed to connect to drone")?;
    let battery = session.battery();

    let stream = FfmpegStream::spawn(&cli.stream()).context("Failed to start video decoder")?;
    let detector =
        SidecarDetector::spawn(&cli.detector()).context("Failed to start hand detector")?;

    let display = open_display(&cli, battery)?;

    let mut pilot = Pilot::new(session, stream, detector, display, cli.pilot())?;
    pilot.start().context("Auto-takeoff failed")?;
    info!("Hold a gesture for {} frames; q or Esc quits", cli.threshold);

    let mut interval = tokio::time::interval(Duration::from_millis(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                info!("Shutdown requested");
                break Ok(());
            }
            _ = interval.tick() => {
                match pilot.tick() {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Stop(reason)) => {
                        info!("Stopping: {reason:?}");
                        break Ok(());
                    }
                    Err(e) => {
                        error!("Gesture loop failed: {e}");
                        break Err(e);
                    }
                }
            }
        }
    };

    pilot.shutdown();
    info!("Processed {} frames", pilot.frame_index());
    outcome.context("Gesture loop failed")
}
