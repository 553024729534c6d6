//! The power-button gesture state machine.
//!
//! A single button powers the device off, and shutting down takes a
//! deliberate two-part gesture: hold the button through a full countdown
//! (the power LED lights to acknowledge), then let go and leave it released
//! through a second countdown of the same length. Short taps, and re-presses
//! inside the release window, abort back to idle. The same machine also
//! finishes the wake gesture: after the wake interrupt has forced a
//! [`PowerRequest::PowerUp`], it keeps the power LED lit until the button is
//! let go, then returns to idle.
//!
//! The button level is sampled fresh on every tick, so the countdowns double
//! as debounce: nothing is acted on until the level has held for the full
//! window.

use crate::bitmap::LedBitmap;
use crate::state::SharedState;

/// Ticks the button must stay held to register a deliberate press, and then
/// stay released to commit the shutdown.
pub const LONG_PRESS_TICKS: u16 = 4000;

/// Progress of the power gesture, shared across the tick loop, the sleep
/// task and the wake interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, defmt::Format)]
#[repr(u8)]
pub enum PowerRequest {
    /// Idle; the button is up and nothing is pending.
    #[default]
    None = 0,
    /// The button went down; the hold countdown is running.
    ButtonPressed = 1,
    /// The hold countdown expired with the button still down; the power LED
    /// acknowledges the press while the machine waits for the release.
    ButtonPressedLong = 2,
    /// Acknowledged-press marker kept for vocabulary parity; the gesture
    /// sequence never produces it.
    ButtonConfirmed = 3,
    /// The button came back up after a long press; the release countdown is
    /// running.
    ButtonReleased = 4,
    /// Shutdown committed; the face is blanked and the sleep task may stop
    /// the core. Terminal until the wake interrupt fires.
    PowerDown = 5,
    /// Forced by the wake interrupt; cleared once the button is released.
    PowerUp = 6,
}

impl PowerRequest {
    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::ButtonPressed,
            2 => Self::ButtonPressedLong,
            3 => Self::ButtonConfirmed,
            4 => Self::ButtonReleased,
            5 => Self::PowerDown,
            6 => Self::PowerUp,
            _ => Self::None,
        }
    }
}

/// Driver for the power gesture.
///
/// Owns the countdown; the request cell itself is in [`SharedState`] because
/// the wake interrupt overrides it.
pub struct PowerButton {
    countdown: u16,
}

impl PowerButton {
    pub const fn new() -> Self {
        Self { countdown: 0 }
    }

    /// Advances the gesture by one tick with the freshly sampled button
    /// level (`true` = pressed).
    pub fn tick(&mut self, shared: &SharedState, pressed: bool) {
        match shared.power_request() {
            PowerRequest::None => {
                if pressed {
                    // The arming tick counts as the first held tick.
                    self.countdown = LONG_PRESS_TICKS - 1;
                    shared.request_power(PowerRequest::ButtonPressed);
                } else {
                    shared.set_power_led(false);
                }
            }
            PowerRequest::ButtonPressed => {
                if pressed {
                    self.countdown = self.countdown.wrapping_sub(1);
                    if self.countdown == 0 {
                        shared.set_power_led(true);
                        shared.request_power(PowerRequest::ButtonPressedLong);
                    }
                } else {
                    shared.request_power(PowerRequest::None);
                }
            }
            PowerRequest::ButtonPressedLong => {
                if !pressed {
                    // The releasing tick counts as the first released tick.
                    self.countdown = LONG_PRESS_TICKS - 1;
                    shared.request_power(PowerRequest::ButtonReleased);
                }
            }
            PowerRequest::ButtonReleased => {
                if !pressed {
                    self.countdown = self.countdown.wrapping_sub(1);
                    if self.countdown == 0 {
                        shared.set_power_led(false);
                        shared.set_led_bitmap(LedBitmap::OFF);
                        shared.request_power(PowerRequest::PowerDown);
                    }
                } else {
                    shared.request_power(PowerRequest::None);
                }
            }
            PowerRequest::PowerUp => {
                if pressed {
                    // Keep the indicator lit while the wake press is held.
                    shared.set_power_led(true);
                } else {
                    shared.set_power_led(false);
                    shared.request_power(PowerRequest::None);
                }
            }
            // Terminal until the wake interrupt; ButtonConfirmed has no
            // gesture of its own.
            PowerRequest::PowerDown | PowerRequest::ButtonConfirmed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FACE_GREEN_EAST_WEST;

    fn press(button: &mut PowerButton, shared: &SharedState, ticks: u32) {
        for _ in 0..ticks {
            button.tick(shared, true);
        }
    }

    fn release(button: &mut PowerButton, shared: &SharedState, ticks: u32) {
        for _ in 0..ticks {
            button.tick(shared, false);
        }
    }

    #[test]
    fn short_tap_is_rejected_without_lighting_the_led() {
        let shared = SharedState::new();
        let mut button = PowerButton::new();

        for _ in 0..u32::from(LONG_PRESS_TICKS) - 1 {
            button.tick(&shared, true);
            assert!(!shared.power_led());
        }
        assert_eq!(shared.power_request(), PowerRequest::ButtonPressed);

        button.tick(&shared, false);
        assert_eq!(shared.power_request(), PowerRequest::None);
        assert!(!shared.power_led());
    }

    #[test]
    fn full_hold_confirms_exactly_once() {
        let shared = SharedState::new();
        let mut button = PowerButton::new();

        press(&mut button, &shared, u32::from(LONG_PRESS_TICKS) - 1);
        assert_eq!(shared.power_request(), PowerRequest::ButtonPressed);
        assert!(!shared.power_led());

        button.tick(&shared, true);
        assert_eq!(shared.power_request(), PowerRequest::ButtonPressedLong);
        assert!(shared.power_led());

        // Holding longer changes nothing.
        press(&mut button, &shared, 500);
        assert_eq!(shared.power_request(), PowerRequest::ButtonPressedLong);
        assert!(shared.power_led());
    }

    #[test]
    fn hold_then_release_hold_commits_the_shutdown() {
        let shared = SharedState::new();
        let mut button = PowerButton::new();
        shared.set_led_bitmap(FACE_GREEN_EAST_WEST);

        press(&mut button, &shared, u32::from(LONG_PRESS_TICKS));
        assert_eq!(shared.power_request(), PowerRequest::ButtonPressedLong);

        release(&mut button, &shared, u32::from(LONG_PRESS_TICKS) - 1);
        assert_eq!(shared.power_request(), PowerRequest::ButtonReleased);

        button.tick(&shared, false);
        assert_eq!(shared.power_request(), PowerRequest::PowerDown);
        assert_eq!(shared.led_bitmap(), LedBitmap::OFF);
        assert!(!shared.power_led());
    }

    #[test]
    fn repress_during_the_release_window_aborts() {
        let shared = SharedState::new();
        let mut button = PowerButton::new();

        press(&mut button, &shared, u32::from(LONG_PRESS_TICKS));
        release(&mut button, &shared, 2000);
        assert_eq!(shared.power_request(), PowerRequest::ButtonReleased);

        button.tick(&shared, true);
        assert_eq!(shared.power_request(), PowerRequest::None);
    }

    #[test]
    fn power_down_ignores_the_button() {
        let shared = SharedState::new();
        let mut button = PowerButton::new();

        press(&mut button, &shared, u32::from(LONG_PRESS_TICKS));
        release(&mut button, &shared, u32::from(LONG_PRESS_TICKS));
        assert_eq!(shared.power_request(), PowerRequest::PowerDown);

        press(&mut button, &shared, 10_000);
        release(&mut button, &shared, 10_000);
        assert_eq!(shared.power_request(), PowerRequest::PowerDown);
        assert!(!shared.power_led());
    }

    #[test]
    fn wake_request_clears_only_after_the_release() {
        let shared = SharedState::new();
        let mut button = PowerButton::new();
        // As the wake interrupt leaves things.
        shared.set_power_led(true);
        shared.request_power(PowerRequest::PowerUp);

        press(&mut button, &shared, 300);
        assert_eq!(shared.power_request(), PowerRequest::PowerUp);
        assert!(shared.power_led());

        button.tick(&shared, false);
        assert_eq!(shared.power_request(), PowerRequest::None);
        assert!(!shared.power_led());
    }
}
