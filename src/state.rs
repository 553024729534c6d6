//! Cross-context device state.
//!
//! The tick loop, the sleep task and the wake interrupt all touch this
//! state, so every cell is a single machine word behind atomic load/store:
//! an interrupt arriving between any two operations sees whole values only,
//! never a torn one. Ordering is relaxed throughout; the core is single and
//! each cell is an independent value, no cell publishes another.
//!
//! Components get narrow accessors instead of the raw cells, which keeps the
//! cross-context contract in one place.

use portable_atomic::{AtomicBool, AtomicU8, AtomicU16, Ordering};

use crate::animation::AnimationState;
use crate::bitmap::LedBitmap;
use crate::power::PowerRequest;

/// The process-wide mutable state of the device.
///
/// The firmware uses the single [`SHARED`] instance; tests build their own.
pub struct SharedState {
    led_bitmap: AtomicU16,
    power_led: AtomicBool,
    power_request: AtomicU8,
    animation_state: AtomicU8,
}

/// The one device state instance shared by the firmware's contexts.
pub static SHARED: SharedState = SharedState::new();

impl SharedState {
    pub const fn new() -> Self {
        Self {
            led_bitmap: AtomicU16::new(LedBitmap::OFF.raw()),
            power_led: AtomicBool::new(false),
            power_request: AtomicU8::new(PowerRequest::None.as_u8()),
            animation_state: AtomicU8::new(AnimationState::Off.as_u8()),
        }
    }

    /// Current face, as last written by the animation or power machine.
    pub fn led_bitmap(&self) -> LedBitmap {
        LedBitmap::from_raw(self.led_bitmap.load(Ordering::Relaxed))
    }

    pub fn set_led_bitmap(&self, bitmap: LedBitmap) {
        self.led_bitmap.store(bitmap.raw(), Ordering::Relaxed);
    }

    /// Whether the power indicator LED is lit.
    pub fn power_led(&self) -> bool {
        self.power_led.load(Ordering::Relaxed)
    }

    pub fn set_power_led(&self, lit: bool) {
        self.power_led.store(lit, Ordering::Relaxed);
    }

    /// Progress of the power gesture.
    pub fn power_request(&self) -> PowerRequest {
        PowerRequest::from_u8(self.power_request.load(Ordering::Relaxed))
    }

    pub fn request_power(&self, request: PowerRequest) {
        self.power_request.store(request.as_u8(), Ordering::Relaxed);
    }

    /// Position in the light-pattern cycle.
    pub fn animation_state(&self) -> AnimationState {
        AnimationState::from_u8(self.animation_state.load(Ordering::Relaxed))
    }

    pub fn set_animation_state(&self, state: AnimationState) {
        self.animation_state.store(state.as_u8(), Ordering::Relaxed);
    }
}
