//! Sky Catch core crate.
//!
//! A basket slides along the bottom of the playfield and catches items
//! falling from the top. Caught items score, missed items cost a life, and
//! three misses end the session. `start_game()` wires the canvas, input and
//! frame loop; the simulation itself lives in [`catch::session`] and runs
//! the same under a browser frame callback or a fixed-timestep test driver.

use wasm_bindgen::prelude::*;

pub mod catch;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Gameplay tuning constants. All coordinates are canvas units; speeds are
/// units per frame unless a period in milliseconds is named.
pub mod consts {
    /// Basket height (the catch band at the bottom of the playfield).
    pub const BASKET_HEIGHT: f64 = 30.0;
    /// Horizontal basket travel per active movement source, per frame.
    pub const BASKET_SPEED: f64 = 10.0;
    /// Basket width on wide playfields.
    pub const BASKET_WIDTH_WIDE: f64 = 250.0;
    /// Basket width once the playfield drops below [`NARROW_FIELD_WIDTH`].
    pub const BASKET_WIDTH_NARROW: f64 = 100.0;
    /// Playfield width below which the narrow basket is used.
    pub const NARROW_FIELD_WIDTH: f64 = 500.0;

    /// Item extent used for spawn range and collision.
    pub const ITEM_DIAMETER: f64 = 20.0;
    /// Item radius used when painting.
    pub const ITEM_RADIUS: f64 = 10.0;
    /// Fall speed at session start.
    pub const BASE_ITEM_SPEED: f64 = 4.0;
    /// Fall speed added on every ramp tick.
    pub const ITEM_SPEED_INCREMENT: f64 = 1.0;

    /// One new item per period while running.
    pub const SPAWN_PERIOD_MS: f64 = 1_000.0;
    /// One speed increment per period while running.
    pub const RAMP_PERIOD_MS: f64 = 20_000.0;

    /// Pointer must sit farther than this from the basket center to move it.
    pub const POINTER_DEAD_ZONE: f64 = 50.0;

    /// Lives at session start.
    pub const START_LIVES: u32 = 3;

    /// Floor for viewport signals: narrow basket plus travel room.
    pub const MIN_PLAYFIELD_WIDTH: f64 = 120.0;
    /// Floor for viewport signals: catch band plus fall distance.
    pub const MIN_PLAYFIELD_HEIGHT: f64 = 160.0;
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    // Launch catch mode (the only gameplay path)
    catch::start_catch_mode()
}
