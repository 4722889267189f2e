//! Canvas painting. Pure read of session state, draw calls only.

use web_sys::CanvasRenderingContext2d;

use super::session::Session;
use crate::consts::*;

/// Paint one frame: clear, basket, items, score/lives overlay.
pub fn draw(ctx: &CanvasRenderingContext2d, session: &Session) {
    let field = session.playfield();
    ctx.clear_rect(0.0, 0.0, field.width, field.height);

    let basket = session.basket();
    ctx.set_fill_style_str("green");
    ctx.fill_rect(
        basket.x,
        field.height - BASKET_HEIGHT,
        basket.width,
        BASKET_HEIGHT,
    );

    ctx.set_fill_style_str("red");
    for item in session.items() {
        ctx.begin_path();
        ctx.arc(item.x, item.y, ITEM_RADIUS, 0.0, std::f64::consts::TAU).ok();
        ctx.fill();
        ctx.close_path();
    }

    ctx.set_fill_style_str("white");
    ctx.set_font("20px Arial");
    ctx.fill_text(&format!("Score: {}", session.score()), 10.0, 30.0)
        .ok();
    ctx.fill_text(
        &format!("Lives: {}", session.lives()),
        field.width - 100.0,
        30.0,
    )
    .ok();
}
