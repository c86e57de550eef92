use crate::tray::{
    self, CYCLE_TIMEOUT, DICE_COUNT, DiePhase, FLICKER_PERIOD, PlannedDie, Tray,
};
use crate::ui;
use color_eyre::eyre::{Result, WrapErr};
use futures::StreamExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Seed for the value RNG; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug)]
pub struct DieView {
    pub value: Option<u8>,
    pub held: bool,
    pub rolling: bool,
    pub flicker: Option<u8>,
}

/// Immutable view handed to the renderer; the UI never touches the tray.
#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub dice: Vec<DieView>,
    pub sum: Option<u16>,
    pub trigger_enabled: bool,
    pub status: String,
}

/// Messages the timer tasks send back to the main loop. All tray mutation
/// happens on the loop when these are applied, so the tasks share nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimEvent {
    /// Cosmetic face shown mid-roll; never committed.
    Flicker { die: usize, face: u8 },
    /// Final value for one die; returns it to idle.
    Commit { die: usize, value: u8 },
    /// The cycle's bound timeout elapsed; re-enable the trigger.
    CycleDone,
}

pub struct AppController {
    tray: Tray,
    rng: StdRng,
    trigger_enabled: bool,
    status: String,
}

impl AppController {
    pub fn new(config: &AppConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let tray = Tray::new(&mut rng);
        AppController {
            tray,
            rng,
            trigger_enabled: true,
            status: String::from("Ready"),
        }
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    pub fn toggle_hold(&mut self, index: usize) {
        if index >= DICE_COUNT {
            return;
        }
        let held = self.tray.toggle_hold(index);
        self.status = format!(
            "Die {} {}",
            index + 1,
            if held { "held" } else { "released" }
        );
        debug!(die = index, held, "hold toggled");
    }

    /// Starts a roll cycle over the dice that are not held right now.
    /// Returns false while a cycle is already running; the trigger stays
    /// disabled until `CycleDone` regardless of when the dice settle.
    pub fn start_roll(&mut self, anim_tx: &mpsc::UnboundedSender<AnimEvent>) -> bool {
        if !self.trigger_enabled {
            return false;
        }
        let plan = tray::plan_roll(&self.tray, &mut self.rng);
        info!(participants = plan.dice.len(), "roll cycle started");
        self.trigger_enabled = false;
        self.status = String::from("Rolling…");
        self.tray.begin_roll(&plan);
        for planned in plan.dice {
            tokio::spawn(die_roller(planned, anim_tx.clone()));
        }
        tokio::spawn(cycle_timer(anim_tx.clone()));
        true
    }

    pub fn apply(&mut self, event: AnimEvent) {
        match event {
            AnimEvent::Flicker { die, face } => {
                self.tray.set_flicker(die, face);
            }
            AnimEvent::Commit { die, value } => {
                self.tray.commit(die, value);
                debug!(die, value, "die settled");
            }
            AnimEvent::CycleDone => {
                self.trigger_enabled = true;
                self.status = match self.tray.sum() {
                    Some(total) => format!("Rolled, total {total}"),
                    None => String::from("Ready"),
                };
                info!("roll cycle finished");
            }
        }
    }

    pub fn build_snapshot(&self) -> AppSnapshot {
        let dice = self
            .tray
            .dice()
            .iter()
            .map(|die| DieView {
                value: die.value,
                held: die.held,
                rolling: die.phase == DiePhase::Rolling,
                flicker: die.flicker,
            })
            .collect();
        AppSnapshot {
            dice,
            sum: self.tray.sum(),
            trigger_enabled: self.trigger_enabled,
            status: self.status.clone(),
        }
    }
}

/// One timer chain per rolling die: flicker on a short interval, then a
/// single commit at the die's own deadline.
async fn die_roller(planned: PlannedDie, tx: mpsc::UnboundedSender<AnimEvent>) {
    let commit_at = time::Instant::now() + planned.delay;
    let mut ticker = time::interval(FLICKER_PERIOD);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    let commit_sleep = time::sleep_until(commit_at);
    tokio::pin!(commit_sleep);
    loop {
        tokio::select! {
            _ = &mut commit_sleep => {
                let _ = tx.send(AnimEvent::Commit {
                    die: planned.die,
                    value: planned.value,
                });
                break;
            }
            _ = ticker.tick() => {
                let face = tray::draw_face(&mut rand::rng());
                let _ = tx.send(AnimEvent::Flicker {
                    die: planned.die,
                    face,
                });
            }
        }
    }
}

async fn cycle_timer(tx: mpsc::UnboundedSender<AnimEvent>) {
    time::sleep(CYCLE_TIMEOUT).await;
    let _ = tx.send(AnimEvent::CycleDone);
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let mut controller = AppController::new(&config);
    let mut ui_state = ui::UiState::default();
    ui::terminal_enter(&mut ui_state).wrap_err("terminal setup failed")?;
    let res = run_loop(&mut controller, &mut ui_state).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    controller: &mut AppController,
    ui_state: &mut ui::UiState,
) -> Result<()> {
    let (anim_tx, mut anim_rx) = mpsc::unbounded_channel();
    let mut input_events = crossterm::event::EventStream::new();

    let mut snapshot = controller.build_snapshot();
    ui::draw(ui_state, &snapshot).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            maybe_anim = anim_rx.recv() => {
                let Some(event) = maybe_anim else {
                    warn!("animation channel closed");
                    break;
                };
                controller.apply(event);
                // Coalesce whatever else is already queued into one draw.
                while let Ok(event) = anim_rx.try_recv() {
                    controller.apply(event);
                }
                snapshot = controller.build_snapshot();
                ui::draw(ui_state, &snapshot)
                    .wrap_err("draw after animation event failed")?;
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            maybe_raw = input_events.next() => {
                let Some(raw) = maybe_raw else {
                    warn!("input event stream ended");
                    break;
                };
                let raw = raw.wrap_err("reading terminal input failed")?;
                let Some(event) = ui::interpret_event(ui_state, &raw) else {
                    continue;
                };
                match event {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::ToggleHold(i) => controller.toggle_hold(i),
                    ui::UserEvent::Roll => {
                        controller.start_roll(&anim_tx);
                    }
                    ui::UserEvent::Redraw => {}
                }
                snapshot = controller.build_snapshot();
                ui::draw(ui_state, &snapshot).wrap_err("draw after input failed")?;
            }
        }
    }
    Ok(())
}
