//! The repeating light-pattern state machine.
//!
//! The face alternates between two steady phases: green on the east/west
//! arms with red on north/south, then the mirror image with the colors on
//! swapped axes. Each steady phase ends in a blink tail that strobes the
//! green arms, followed by an amber handover face (yellow standing in for
//! green) before the axes swap. The whole cycle repeats bit-identically.
//!
//! All timing is in ticks of the periodic tick loop. The machine advances
//! exactly one rule per tick, driven by a private countdown; the current
//! state lives in [`SharedState`] because the wake interrupt resets it.

use crate::bitmap::LedBitmap;
use crate::state::SharedState;

/// Ticks spent holding each steady face.
pub const HOLD_TICKS: u16 = 15000;
/// Ticks spent in each blink tail.
pub const BLINK_TICKS: u16 = 4000;
/// Ticks spent on each amber handover face.
pub const SWAP_TICKS: u16 = 3000;
/// Blink modulus; the countdown's remainder selects the bright half.
pub const BLINK_PERIOD: u16 = 800;
/// Countdown remainders above this value light the bright face.
pub const BLINK_BRIGHT_ABOVE: u16 = 400;

/// Green on east/west, red on north/south.
pub const FACE_GREEN_EAST_WEST: LedBitmap = LedBitmap::from_raw(0x050A);
/// The east/west face with its green arms dark (blink half).
pub const FACE_GREEN_EAST_WEST_DIM: LedBitmap = LedBitmap::from_raw(0x0500);
/// Handover out of the east/west face: yellow replaces green.
pub const FACE_AMBER_EAST_WEST: LedBitmap = LedBitmap::from_raw(0x05A0);
/// Green on north/south, red on east/west.
pub const FACE_GREEN_NORTH_SOUTH: LedBitmap = LedBitmap::from_raw(0x0A05);
/// The north/south face with its green arms dark (blink half).
pub const FACE_GREEN_NORTH_SOUTH_DIM: LedBitmap = LedBitmap::from_raw(0x0A00);
/// Handover out of the north/south face: yellow replaces green.
pub const FACE_AMBER_NORTH_SOUTH: LedBitmap = LedBitmap::from_raw(0x0A50);

/// Position in the light-pattern cycle.
///
/// `Off` is the restart point: its only job is to load the first face and
/// re-arm the countdown, which is why the wake interrupt resets to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, defmt::Format)]
#[repr(u8)]
pub enum AnimationState {
    /// Restart point; loads the east/west face on the next tick.
    #[default]
    Off = 0,
    /// Steady green east/west face.
    HoldEastWest = 1,
    /// Blink tail of the east/west face.
    BlinkEastWest = 2,
    /// Amber handover before the axes swap.
    SwapToNorthSouth = 3,
    /// Steady green north/south face.
    HoldNorthSouth = 4,
    /// Blink tail of the north/south face.
    BlinkNorthSouth = 5,
    /// Amber handover back to the east/west face.
    SwapToEastWest = 6,
}

impl AnimationState {
    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::HoldEastWest,
            2 => Self::BlinkEastWest,
            3 => Self::SwapToNorthSouth,
            4 => Self::HoldNorthSouth,
            5 => Self::BlinkNorthSouth,
            6 => Self::SwapToEastWest,
            _ => Self::Off,
        }
    }
}

/// Driver for the light-pattern cycle.
///
/// Owns the countdown; the state cell itself is in [`SharedState`]. The tick
/// loop must not call [`Animation::tick`] while a power-down request is
/// pending, so the pattern cannot fight the blanked face.
pub struct Animation {
    timer: u16,
}

impl Animation {
    pub const fn new() -> Self {
        Self { timer: 0 }
    }

    /// Advances the cycle by one tick.
    ///
    /// The countdown decrements first (wrapping; every entry rule re-arms it
    /// before it is read), then exactly one rule for the current state runs.
    pub fn tick(&mut self, shared: &SharedState) {
        self.timer = self.timer.wrapping_sub(1);

        match shared.animation_state() {
            AnimationState::Off => {
                self.timer = HOLD_TICKS;
                shared.set_led_bitmap(FACE_GREEN_EAST_WEST);
                shared.set_animation_state(AnimationState::HoldEastWest);
            }
            AnimationState::HoldEastWest => {
                if self.timer == 0 {
                    self.timer = BLINK_TICKS;
                    shared.set_animation_state(AnimationState::BlinkEastWest);
                }
            }
            AnimationState::BlinkEastWest => {
                if self.timer != 0 {
                    shared.set_led_bitmap(blink_face(
                        self.timer,
                        FACE_GREEN_EAST_WEST,
                        FACE_GREEN_EAST_WEST_DIM,
                    ));
                } else {
                    self.timer = SWAP_TICKS;
                    shared.set_led_bitmap(FACE_AMBER_EAST_WEST);
                    shared.set_animation_state(AnimationState::SwapToNorthSouth);
                }
            }
            AnimationState::SwapToNorthSouth => {
                if self.timer == 0 {
                    self.timer = HOLD_TICKS;
                    shared.set_led_bitmap(FACE_GREEN_NORTH_SOUTH);
                    shared.set_animation_state(AnimationState::HoldNorthSouth);
                }
            }
            AnimationState::HoldNorthSouth => {
                if self.timer == 0 {
                    self.timer = BLINK_TICKS;
                    shared.set_animation_state(AnimationState::BlinkNorthSouth);
                }
            }
            AnimationState::BlinkNorthSouth => {
                if self.timer != 0 {
                    shared.set_led_bitmap(blink_face(
                        self.timer,
                        FACE_GREEN_NORTH_SOUTH,
                        FACE_GREEN_NORTH_SOUTH_DIM,
                    ));
                } else {
                    self.timer = SWAP_TICKS;
                    shared.set_led_bitmap(FACE_AMBER_NORTH_SOUTH);
                    shared.set_animation_state(AnimationState::SwapToEastWest);
                }
            }
            AnimationState::SwapToEastWest => {
                if self.timer == 0 {
                    shared.set_animation_state(AnimationState::Off);
                }
            }
        }
    }
}

/// Selects the bright or dimmed face for the blink tails.
///
/// Of every [`BLINK_PERIOD`] countdown values, 399 land above
/// [`BLINK_BRIGHT_ABOVE`] and light the bright face, giving a near-even
/// strobe.
const fn blink_face(timer: u16, bright: LedBitmap, dim: LedBitmap) -> LedBitmap {
    if timer % BLINK_PERIOD > BLINK_BRIGHT_ABOVE {
        bright
    } else {
        dim
    }
}
