use itertools::Itertools;
use rand::Rng;
use std::time::Duration;

pub const DICE_COUNT: usize = 5;
pub const FACE_MIN: u8 = 1;
pub const FACE_MAX: u8 = 6;

/// Cosmetic flicker cadence while a die is rolling.
pub const FLICKER_PERIOD: Duration = Duration::from_millis(80);
/// Each rolling die commits after a delay drawn from [MIN, MAX).
pub const COMMIT_DELAY_MIN: Duration = Duration::from_millis(420);
pub const COMMIT_DELAY_MAX: Duration = Duration::from_millis(740);
/// The roll trigger stays disabled for this long; must cover the largest
/// possible commit delay.
pub const CYCLE_TIMEOUT: Duration = Duration::from_millis(900);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiePhase {
    #[default]
    Idle,
    Rolling,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Die {
    /// Current face, in [1,6] once set. `None` until the first assignment.
    pub value: Option<u8>,
    /// Held dice are excluded from the next roll cycle.
    pub held: bool,
    pub phase: DiePhase,
    /// Transient face shown while rolling; never summed, never committed.
    pub flicker: Option<u8>,
}

/// The fixed set of dice for a session. All mutation goes through the
/// methods here so the invariants (value range, phase transitions) live in
/// one place.
#[derive(Clone, Debug)]
pub struct Tray {
    dice: [Die; DICE_COUNT],
}

impl Tray {
    /// A tray with no values assigned yet; the sum is unavailable.
    pub fn unrolled() -> Self {
        Tray {
            dice: [Die::default(); DICE_COUNT],
        }
    }

    /// A tray with random starting values, the normal startup state.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut tray = Self::unrolled();
        for die in &mut tray.dice {
            die.value = Some(draw_face(rng));
        }
        tray
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn die(&self, index: usize) -> &Die {
        &self.dice[index]
    }

    /// Flips the hold flag and returns the new state. Allowed at any time;
    /// holding a die mid-cycle does not cancel its pending commit.
    pub fn toggle_hold(&mut self, index: usize) -> bool {
        let die = &mut self.dice[index];
        die.held = !die.held;
        die.held
    }

    /// Marks the plan's participants as rolling.
    pub fn begin_roll(&mut self, plan: &RollPlan) {
        for planned in &plan.dice {
            self.dice[planned.die].phase = DiePhase::Rolling;
        }
    }

    /// Shows a transient face on a rolling die. Ignored once the die has
    /// settled, since a late flicker must not resurrect the rolling state.
    pub fn set_flicker(&mut self, index: usize, face: u8) {
        let die = &mut self.dice[index];
        if die.phase == DiePhase::Rolling {
            die.flicker = Some(face);
        }
    }

    /// Writes the final value for a rolling die and returns it to idle.
    pub fn commit(&mut self, index: usize, value: u8) {
        debug_assert!((FACE_MIN..=FACE_MAX).contains(&value));
        let die = &mut self.dice[index];
        if die.phase != DiePhase::Rolling {
            return;
        }
        die.value = Some(value);
        die.phase = DiePhase::Idle;
        die.flicker = None;
    }

    pub fn any_rolling(&self) -> bool {
        self.dice.iter().any(|d| d.phase == DiePhase::Rolling)
    }

    /// Total of all values, or `None` while any die is unset.
    pub fn sum(&self) -> Option<u16> {
        self.dice.iter().map(|d| d.value.map(u16::from)).sum()
    }
}

pub fn draw_face(rng: &mut impl Rng) -> u8 {
    rng.random_range(FACE_MIN..=FACE_MAX)
}

#[derive(Clone, Copy, Debug)]
pub struct PlannedDie {
    pub die: usize,
    pub delay: Duration,
    pub value: u8,
}

/// Everything a roll cycle needs, fixed at the moment the trigger fires:
/// which dice participate, when each one settles, and what it settles to.
#[derive(Clone, Debug, Default)]
pub struct RollPlan {
    pub dice: Vec<PlannedDie>,
}

impl RollPlan {
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }
}

/// Plans a cycle over the dice that are not held right now. Final values are
/// drawn here rather than at commit time so seeded sessions replay the same
/// faces regardless of timer interleaving.
pub fn plan_roll(tray: &Tray, rng: &mut impl Rng) -> RollPlan {
    let dice = tray
        .dice
        .iter()
        .positions(|d| !d.held)
        .map(|die| PlannedDie {
            die,
            delay: Duration::from_millis(rng.random_range(
                COMMIT_DELAY_MIN.as_millis() as u64..COMMIT_DELAY_MAX.as_millis() as u64,
            )),
            value: draw_face(rng),
        })
        .collect();
    RollPlan { dice }
}
