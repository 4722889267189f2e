//! Input state: keyboard and pointer signals fused into basket steering.
//!
//! Event listeners only write fields here; the simulation step consumes one
//! snapshot per frame through [`steer_basket`]. Key flags follow key-down /
//! key-up, the pointer x is the last-known touch position (never cleared).

use super::session::{Basket, Playfield};
use crate::consts::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub left_held: bool,
    pub right_held: bool,
    pub pointer_x: Option<f64>,
}

impl InputState {
    pub fn press(&mut self, key: &str) {
        match key {
            "ArrowLeft" => self.left_held = true,
            "ArrowRight" => self.right_held = true,
            _ => {}
        }
    }

    pub fn release(&mut self, key: &str) {
        match key {
            "ArrowLeft" => self.left_held = false,
            "ArrowRight" => self.right_held = false,
            _ => {}
        }
    }

    pub fn point_at(&mut self, x: f64) {
        self.pointer_x = Some(x);
    }
}

/// One frame of basket movement. The pointer move runs first, then the key
/// flags unconditionally after it, so keys can override or compound with a
/// pointer-driven move within the same frame. The bounds clamp is re-applied
/// after every mutation, not once at the end.
pub fn steer_basket(input: &InputState, basket: &mut Basket, field: &Playfield) {
    if let Some(pointer_x) = input.pointer_x {
        let center = basket.center();
        if pointer_x < center - POINTER_DEAD_ZONE {
            basket.x -= BASKET_SPEED;
        } else if pointer_x > center + POINTER_DEAD_ZONE {
            basket.x += BASKET_SPEED;
        }
        basket.clamp_to(field);
    }
    if input.left_held {
        basket.x -= BASKET_SPEED;
        basket.clamp_to(field);
    }
    if input.right_held {
        basket.x += BASKET_SPEED;
        basket.clamp_to(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Playfield {
        Playfield::floored(800.0, 600.0)
    }

    fn basket_at(x: f64) -> Basket {
        Basket { x, width: 250.0 }
    }

    #[test]
    fn pointer_inside_dead_zone_does_not_move() {
        let field = field();
        for offset in [-POINTER_DEAD_ZONE, 0.0, POINTER_DEAD_ZONE] {
            let mut basket = basket_at(275.0);
            let input = InputState {
                pointer_x: Some(basket.center() + offset),
                ..Default::default()
            };
            steer_basket(&input, &mut basket, &field);
            assert_eq!(basket.x, 275.0, "offset {offset}");
        }
    }

    #[test]
    fn pointer_beyond_dead_zone_moves_one_step_toward_it() {
        let field = field();
        let mut basket = basket_at(275.0);
        let center = basket.center();

        let input = InputState {
            pointer_x: Some(center - POINTER_DEAD_ZONE - 1.0),
            ..Default::default()
        };
        steer_basket(&input, &mut basket, &field);
        assert_eq!(basket.x, 275.0 - BASKET_SPEED);

        let mut basket = basket_at(275.0);
        let input = InputState {
            pointer_x: Some(center + POINTER_DEAD_ZONE + 1.0),
            ..Default::default()
        };
        steer_basket(&input, &mut basket, &field);
        assert_eq!(basket.x, 275.0 + BASKET_SPEED);
    }

    #[test]
    fn keys_move_and_cancel_out_when_both_held() {
        let field = field();
        let mut basket = basket_at(275.0);
        let input = InputState {
            left_held: true,
            ..Default::default()
        };
        steer_basket(&input, &mut basket, &field);
        assert_eq!(basket.x, 275.0 - BASKET_SPEED);

        let input = InputState {
            left_held: true,
            right_held: true,
            ..Default::default()
        };
        let mut basket = basket_at(275.0);
        steer_basket(&input, &mut basket, &field);
        assert_eq!(basket.x, 275.0);
    }

    #[test]
    fn key_compounds_with_pointer_in_one_frame() {
        let field = field();
        let mut basket = basket_at(275.0);
        // Pointer far to the right pulls one step, the right key adds another.
        let input = InputState {
            right_held: true,
            pointer_x: Some(700.0),
            ..Default::default()
        };
        steer_basket(&input, &mut basket, &field);
        assert_eq!(basket.x, 275.0 + 2.0 * BASKET_SPEED);

        // An opposing key cancels the pointer move instead of stacking.
        let mut basket = basket_at(275.0);
        let input = InputState {
            left_held: true,
            pointer_x: Some(700.0),
            ..Default::default()
        };
        steer_basket(&input, &mut basket, &field);
        assert_eq!(basket.x, 275.0);
    }

    #[test]
    fn basket_never_leaves_the_field() {
        let field = field();
        let mut basket = basket_at(3.0);
        let input = InputState {
            left_held: true,
            pointer_x: Some(0.0),
            ..Default::default()
        };
        for _ in 0..10 {
            steer_basket(&input, &mut basket, &field);
            assert!(basket.x >= 0.0);
        }
        assert_eq!(basket.x, 0.0);

        let max = field.width - basket.width;
        let mut basket = basket_at(max - 3.0);
        let input = InputState {
            right_held: true,
            pointer_x: Some(field.width),
            ..Default::default()
        };
        for _ in 0..10 {
            steer_basket(&input, &mut basket, &field);
            assert!(basket.x <= max);
        }
        assert_eq!(basket.x, max);
    }

    #[test]
    fn key_release_clears_only_its_flag() {
        let mut input = InputState::default();
        input.press("ArrowLeft");
        input.press("ArrowRight");
        input.press("Escape");
        assert!(input.left_held && input.right_held);

        input.release("ArrowLeft");
        assert!(!input.left_held);
        assert!(input.right_held);
    }
}
