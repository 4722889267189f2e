//! Session state and the per-frame simulation step.
//!
//! Everything here is pure Rust with no browser dependency: the frame loop
//! in [`super`] feeds it timestamps and input snapshots, and tests drive it
//! with a fixed-timestep loop instead. Spawn and ramp timers are wall-clock
//! period counters drained by the caller at the top of each frame; periods
//! that pass while the session is not running are consumed without effect.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::input::{InputState, steer_basket};
use crate::consts::*;

/// Loop driver phase. `Over` waits for an external restart signal; restart
/// always re-enters `Running`, never `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Over,
}

/// Active simulated area, in canvas units. Construction floors degenerate
/// viewport signals to the minimum playable size instead of propagating them.
#[derive(Debug, Clone, Copy)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
}

impl Playfield {
    pub fn floored(width: f64, height: f64) -> Self {
        Self {
            width: width.max(MIN_PLAYFIELD_WIDTH),
            height: height.max(MIN_PLAYFIELD_HEIGHT),
        }
    }

    /// Responsive basket width: two size classes keyed on playfield width.
    pub fn basket_width(&self) -> f64 {
        if self.width < NARROW_FIELD_WIDTH {
            BASKET_WIDTH_NARROW
        } else {
            BASKET_WIDTH_WIDE
        }
    }
}

/// Player-controlled catcher. `x` is the left edge; height and vertical
/// position are fixed (the basket sits on the playfield bottom).
#[derive(Debug, Clone, Copy)]
pub struct Basket {
    pub x: f64,
    pub width: f64,
}

impl Basket {
    fn centered(field: &Playfield) -> Self {
        let width = field.basket_width();
        Self {
            x: (field.width - width) / 2.0,
            width,
        }
    }

    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Invariant: 0 <= x <= field.width - width, re-applied after every move.
    pub(crate) fn clamp_to(&mut self, field: &Playfield) {
        self.x = self.x.clamp(0.0, field.width - self.width);
    }
}

/// A falling item. Spawned at the top edge, removed on catch or miss.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    pub x: f64,
    pub y: f64,
}

/// Wall-clock period counter in whole-period indices. The caller feeds it
/// `performance.now()`-style timestamps; `advance` reports how many period
/// boundaries were crossed since the previous call.
#[derive(Debug)]
pub struct IntervalClock {
    period_ms: f64,
    start_ms: f64,
    last_idx: i64,
}

impl IntervalClock {
    pub fn new(period_ms: f64, now_ms: f64) -> Self {
        debug_assert!(period_ms > 0.0);
        Self {
            period_ms,
            start_ms: now_ms,
            last_idx: 0,
        }
    }

    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let idx = ((now_ms - self.start_ms) / self.period_ms).floor() as i64;
        if idx <= self.last_idx {
            return 0;
        }
        let crossed = idx - self.last_idx;
        self.last_idx = idx;
        crossed as u32
    }

    /// Consume every boundary crossed so far without reporting it. Used when
    /// a session (re)starts: ticks that fell while not running are no-ops,
    /// not deferred.
    pub fn skip_to(&mut self, now_ms: f64) {
        self.advance(now_ms);
    }
}

/// Final summary handed to the session-end callback, once per terminal
/// transition.
#[derive(Debug, Clone, Copy)]
pub struct SessionEnd {
    pub score: u32,
    pub high_score: u32,
}

/// The single owning context for one game session: entities, counters and
/// phase. The high score outlives individual sessions (page lifetime only).
pub struct Session {
    playfield: Playfield,
    basket: Basket,
    items: Vec<Item>,
    score: u32,
    lives: u32,
    item_speed: f64,
    high_score: u32,
    phase: Phase,
    rng: Pcg32,
}

impl Session {
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        let playfield = Playfield::floored(width, height);
        Self {
            playfield,
            basket: Basket::centered(&playfield),
            items: Vec::new(),
            score: 0,
            lives: START_LIVES,
            item_speed: BASE_ITEM_SPEED,
            high_score: 0,
            phase: Phase::Idle,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn item_speed(&self) -> f64 {
        self.item_speed
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn basket(&self) -> Basket {
        self.basket
    }

    pub fn playfield(&self) -> Playfield {
        self.playfield
    }

    /// Full reset and transition into `Running`. Serves both Idle -> Running
    /// and Over -> Running; the high score is deliberately left alone.
    pub fn start(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.item_speed = BASE_ITEM_SPEED;
        self.items.clear();
        self.basket = Basket::centered(&self.playfield);
        self.phase = Phase::Running;
    }

    /// Viewport signal: adopt new playfield dimensions (floored to the
    /// playable minimum), reclassify the basket width and re-center the
    /// basket. Score, lives, items and speed are untouched.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width < MIN_PLAYFIELD_WIDTH || height < MIN_PLAYFIELD_HEIGHT {
            log::warn!("viewport {width:.0}x{height:.0} below playable minimum, flooring");
        }
        self.playfield = Playfield::floored(width, height);
        self.basket = Basket::centered(&self.playfield);
    }

    /// Spawn timer effect: one new item at the top edge, uniformly random x.
    /// No-op unless running.
    pub fn on_spawn_tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let x = self.rng.random_range(0.0..self.playfield.width - ITEM_DIAMETER);
        self.items.push(Item { x, y: 0.0 });
    }

    /// Ramp timer effect: raise the fall speed one notch. No-op unless
    /// running, so the speed never moves while Idle or Over.
    pub fn on_ramp_tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.item_speed += ITEM_SPEED_INCREMENT;
        log::debug!("item speed ramped to {}", self.item_speed);
    }

    /// One simulation frame: steer the basket, advance every item, resolve
    /// misses and catches, detect the terminal condition. Returns the
    /// session summary on the Running -> Over transition, `None` otherwise.
    pub fn step(&mut self, input: &InputState) -> Option<SessionEnd> {
        if self.phase != Phase::Running {
            return None;
        }

        steer_basket(input, &mut self.basket, &self.playfield);

        let mut out_of_lives = false;
        let mut i = 0;
        while i < self.items.len() {
            self.items[i].y += self.item_speed;
            let Item { x, y } = self.items[i];

            // Miss is checked before catch: an item past the bottom edge
            // costs a life even if it also overlaps the basket span this
            // frame. Remaining items are still evaluated after the last
            // life is gone.
            if y > self.playfield.height {
                self.items.remove(i);
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    out_of_lives = true;
                }
                continue;
            }

            let in_catch_band = y + ITEM_DIAMETER >= self.playfield.height - BASKET_HEIGHT;
            let over_basket =
                x + ITEM_DIAMETER > self.basket.x && x < self.basket.x + self.basket.width;
            if in_catch_band && over_basket {
                self.items.remove(i);
                self.score += 1;
                continue;
            }

            i += 1;
        }

        if out_of_lives { Some(self.finish()) } else { None }
    }

    fn finish(&mut self) -> SessionEnd {
        self.phase = Phase::Over;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
        SessionEnd {
            score: self.score,
            high_score: self.high_score,
        }
    }
}
