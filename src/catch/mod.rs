//! Catch mode: canvas, input and overlay wiring plus the frame loop.
//!
//! This module owns the single page-wide game context and everything that
//! touches the browser. The rules themselves live in [`session`]; the code
//! here feeds the session timestamps, input snapshots and external signals
//! (start/restart clicks, resize, key and touch events) and paints the
//! result each animation frame. The frame loop stops rescheduling itself on
//! the frame that ends the session and is rebuilt by the next start signal.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, window};

pub mod input;
pub mod render;
pub mod session;

use crate::consts::*;
use input::InputState;
use session::{IntervalClock, Phase, Session, SessionEnd};

/// Share of the window given to the playfield, both axes.
const VIEWPORT_FRACTION: f64 = 0.8;

const START_STYLE: &str = "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); font:18px 'Fira Code', monospace; padding:10px 24px; border-radius:8px; border:1px solid #333; background:#ffd166; z-index:30; cursor:pointer;";
const MODAL_STYLE: &str = "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); padding:24px 36px; text-align:center; font-family:'Fira Code', monospace; background:rgba(0,0,0,0.82); border:1px solid #333; border-radius:12px; color:#ffd166; z-index:40;";

/// Everything the frame loop and the event listeners share: the session,
/// the raw input state and the two wall-clock timers. Single instance,
/// single-threaded; no concurrent sessions.
struct CatchState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    session: Session,
    input: InputState,
    spawn_clock: IntervalClock,
    ramp_clock: IntervalClock,
    loop_active: bool,
}

thread_local! {
    static CATCH_STATE: std::cell::RefCell<Option<CatchState>> = std::cell::RefCell::new(None);
}

pub fn start_catch_mode() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Create / reuse the playfield canvas.
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id("sc-canvas") {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("sc-canvas");
        c.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); border:2px solid #222; border-radius:12px; background:#101018; z-index:10; touch-action:none;")?;
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };

    let (field_w, field_h) = viewport_playfield(&win);
    canvas.set_width(field_w as u32);
    canvas.set_height(field_h as u32);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    ensure_overlays(&doc)?;

    let now = performance_now();
    CATCH_STATE.with(|cell| {
        cell.replace(Some(CatchState {
            canvas: canvas.clone(),
            ctx,
            session: Session::new(field_w, field_h, now as u64),
            input: InputState::default(),
            // Both timers live for the whole page; session starts only skip
            // them forward, so their phase is never re-aligned to a session.
            spawn_clock: IntervalClock::new(SPAWN_PERIOD_MS, now),
            ramp_clock: IntervalClock::new(RAMP_PERIOD_MS, now),
            loop_active: false,
        }))
    });

    attach_keyboard(&doc)?;
    attach_pointer(&canvas)?;
    attach_resize(&win)?;
    attach_session_controls(&doc)?;

    log::info!("catch mode ready, playfield {field_w:.0}x{field_h:.0}");
    Ok(())
}

/// Playfield dimensions for the current window, floored to the playable
/// minimum so degenerate viewports never reach the simulation.
fn viewport_playfield(win: &web_sys::Window) -> (f64, f64) {
    let w = win
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(MIN_PLAYFIELD_WIDTH);
    let h = win
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(MIN_PLAYFIELD_HEIGHT);
    (
        (w * VIEWPORT_FRACTION).max(MIN_PLAYFIELD_WIDTH),
        (h * VIEWPORT_FRACTION).max(MIN_PLAYFIELD_HEIGHT),
    )
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Create the start button and the game-over modal if the page does not
/// provide them. The modal starts hidden.
fn ensure_overlays(doc: &Document) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    if doc.get_element_by_id("sc-start").is_none() {
        let btn = doc.create_element("button")?;
        btn.set_id("sc-start");
        btn.set_text_content(Some("Start Game"));
        btn.set_attribute("style", START_STYLE)?;
        body.append_child(&btn)?;
    }

    if doc.get_element_by_id("sc-modal").is_none() {
        let modal = doc.create_element("div")?;
        modal.set_id("sc-modal");
        modal.set_attribute("style", &format!("{MODAL_STYLE} display:none;"))?;

        let final_score = doc.create_element("p")?;
        final_score.set_id("sc-final-score");
        modal.append_child(&final_score)?;

        let high_score = doc.create_element("p")?;
        high_score.set_id("sc-high-score");
        modal.append_child(&high_score)?;

        let restart = doc.create_element("button")?;
        restart.set_id("sc-restart");
        restart.set_text_content(Some("Play Again"));
        restart.set_attribute(
            "style",
            "font:16px 'Fira Code', monospace; padding:8px 20px; border-radius:8px; border:1px solid #333; background:#ffd166; cursor:pointer;",
        )?;
        modal.append_child(&restart)?;

        body.append_child(&modal)?;
    }

    Ok(())
}

fn show_element(doc: &Document, id: &str, base_style: &str, visible: bool) {
    if let Some(el) = doc.get_element_by_id(id) {
        let style = if visible {
            base_style.to_string()
        } else {
            format!("{base_style} display:none;")
        };
        el.set_attribute("style", &style).ok();
    }
}

/// Direction keys held / released update the shared input flags.
fn attach_keyboard(doc: &Document) -> Result<(), JsValue> {
    let down = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        CATCH_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.input.press(&evt.key());
            }
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", down.as_ref().unchecked_ref())?;
    down.forget();

    let up = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        CATCH_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.input.release(&evt.key());
            }
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keyup", up.as_ref().unchecked_ref())?;
    up.forget();

    Ok(())
}

/// Touch start/move record the last-known pointer x in playfield
/// coordinates and suppress the default scroll behavior.
fn attach_pointer(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    for event in ["touchstart", "touchmove"] {
        let canvas_for_rect = canvas.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::TouchEvent| {
            evt.prevent_default();
            if let Some(touch) = evt.touches().get(0) {
                let rect = canvas_for_rect.get_bounding_client_rect();
                let x = touch.client_x() as f64 - rect.left();
                CATCH_STATE.with(|cell| {
                    if let Some(state) = cell.borrow_mut().as_mut() {
                        state.input.point_at(x);
                    }
                });
            }
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Window resize recomputes the playfield, resizes the canvas element and
/// forwards the viewport signal to the session (which preserves score,
/// lives and items).
fn attach_resize(win: &web_sys::Window) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        let Some(win) = window() else { return };
        let (w, h) = viewport_playfield(&win);
        CATCH_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.canvas.set_width(w as u32);
                state.canvas.set_height(h as u32);
                state.session.resize(w, h);
                render::draw(&state.ctx, &state.session);
            }
        });
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Start button and modal restart button run the same reset-and-run path.
fn attach_session_controls(doc: &Document) -> Result<(), JsValue> {
    for id in ["sc-start", "sc-restart"] {
        if let Some(btn) = doc.get_element_by_id(id) {
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                begin_session();
            }) as Box<dyn FnMut(_)>);
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
    }
    Ok(())
}

/// Start signal (Idle -> Running or Over -> Running): reset the session,
/// discard timer periods that elapsed while not running, hide the overlays
/// and make sure a frame chain is scheduled.
fn begin_session() {
    let needs_loop = CATCH_STATE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else {
            return None;
        };
        let now = performance_now();
        state.spawn_clock.skip_to(now);
        state.ramp_clock.skip_to(now);
        state.session.start();
        let needs_loop = !state.loop_active;
        state.loop_active = true;
        Some(needs_loop)
    });
    let Some(needs_loop) = needs_loop else { return };

    if let Some(doc) = window().and_then(|w| w.document()) {
        show_element(&doc, "sc-start", START_STYLE, false);
        show_element(&doc, "sc-modal", MODAL_STYLE, false);
    }
    log::info!("session started");

    if needs_loop {
        start_catch_loop();
    }
}

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Animation-frame chain. Each callback reschedules itself while the
/// session is running; on the terminal frame it simply stops asking for
/// another frame. The chain keeps itself alive through the Rc cycle and is
/// abandoned; the next start signal builds a fresh one.
fn start_catch_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let keep_going = CATCH_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                frame_tick(state, ts)
            } else {
                false
            }
        });
        if keep_going {
            if let Some(w) = window() {
                let _ =
                    w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

/// One display frame: drain the wall-clock timers, step the simulation,
/// paint, and surface the session summary on the terminal transition. The
/// terminal frame still renders once before the loop stops.
fn frame_tick(state: &mut CatchState, now: f64) -> bool {
    for _ in 0..state.spawn_clock.advance(now) {
        state.session.on_spawn_tick();
    }
    for _ in 0..state.ramp_clock.advance(now) {
        state.session.on_ramp_tick();
    }

    let ended = state.session.step(&state.input);
    render::draw(&state.ctx, &state.session);

    if let Some(end) = ended {
        session_over(&end);
    }

    if state.session.phase() == Phase::Running {
        true
    } else {
        state.loop_active = false;
        false
    }
}

/// Session-end callback: present the summary and log it. Runs exactly once
/// per terminal transition.
fn session_over(end: &SessionEnd) {
    log::info!("session over, score {} (high score {})", end.score, end.high_score);
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(el) = doc.get_element_by_id("sc-final-score") {
            el.set_text_content(Some(&format!("Your Score: {}", end.score)));
        }
        if let Some(el) = doc.get_element_by_id("sc-high-score") {
            el.set_text_content(Some(&format!("High Score: {}", end.high_score)));
        }
        show_element(&doc, "sc-modal", MODAL_STYLE, true);
    }
}
