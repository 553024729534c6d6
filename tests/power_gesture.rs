//! Whole-gesture simulation of the power path.
//!
//! Recreates the firmware tick loop's composition (animation gate, gesture
//! machine, multiplexer) on the host and drives it tick by tick through
//! boot, shutdown and wake scenarios. Run with:
//!
//! ```text
//! cargo test --no-default-features
//! ```

use waymark::animation::{Animation, AnimationState, FACE_GREEN_EAST_WEST};
use waymark::bitmap::LedBitmap;
use waymark::mux::{Frame, MUX_FACTOR, Multiplexer, POWER_LED_BIT};
use waymark::power::{LONG_PRESS_TICKS, PowerButton, PowerRequest};
use waymark::state::SharedState;

/// Host-side stand-in for the firmware tick loop: same call order as the
/// device, with driven frames captured instead of hitting GPIO.
struct Device {
    shared: SharedState,
    animation: Animation,
    button: PowerButton,
    mux: Multiplexer,
    last_frame: Option<Frame>,
}

impl Device {
    fn new() -> Self {
        Self {
            shared: SharedState::new(),
            animation: Animation::new(),
            button: PowerButton::new(),
            mux: Multiplexer::new(MUX_FACTOR),
            last_frame: None,
        }
    }

    fn tick(&mut self, pressed: bool) {
        let powering_down = self.shared.power_request() == PowerRequest::PowerDown;
        if !powering_down {
            self.animation.tick(&self.shared);
        }
        self.button.tick(&self.shared, pressed);
        if let Some(frame) = self
            .mux
            .tick(self.shared.led_bitmap(), self.shared.power_led())
        {
            self.last_frame = Some(frame);
        }
    }

    fn run(&mut self, pressed: bool, ticks: u32) {
        for _ in 0..ticks {
            self.tick(pressed);
        }
    }

    /// The wake handler's shared-state writes, in its documented order.
    fn wake(&mut self) {
        self.shared.set_power_led(true);
        self.shared.request_power(PowerRequest::PowerUp);
        self.shared.set_animation_state(AnimationState::Off);
    }
}

const HOLD: u32 = LONG_PRESS_TICKS as u32;

#[test]
fn boot_starts_the_pattern_with_the_button_up() {
    let mut device = Device::new();

    device.run(false, 10);

    assert_eq!(device.shared.power_request(), PowerRequest::None);
    assert_eq!(device.shared.led_bitmap(), FACE_GREEN_EAST_WEST);
    assert!(!device.shared.power_led());
    assert!(device.last_frame.is_some());
}

#[test]
fn short_tap_does_not_interrupt_the_pattern() {
    let mut device = Device::new();
    device.run(false, 100);

    device.run(true, HOLD - 1);
    device.run(false, 1);

    assert_eq!(device.shared.power_request(), PowerRequest::None);
    assert!(!device.shared.power_led());
    // The pattern kept running throughout.
    assert_eq!(device.shared.animation_state(), AnimationState::HoldEastWest);
}

#[test]
fn full_gesture_shuts_down_and_blanks_every_frame() {
    let mut device = Device::new();
    device.run(false, 100);

    // Hold through the press window; the power LED acknowledges.
    device.run(true, HOLD);
    assert_eq!(
        device.shared.power_request(),
        PowerRequest::ButtonPressedLong
    );
    assert!(device.shared.power_led());

    // Release and stay released through the second window.
    device.run(false, HOLD);
    assert_eq!(device.shared.power_request(), PowerRequest::PowerDown);
    assert_eq!(device.shared.led_bitmap(), LedBitmap::OFF);
    assert!(!device.shared.power_led());

    // Powered down: the rotation keeps running but every frame is dark and
    // the animation is frozen in place.
    let frozen = device.shared.animation_state();
    for _ in 0..1000 {
        device.tick(false);
        let frame = device.last_frame.unwrap();
        assert_eq!(frame.data & 0x0F, 0);
        assert_eq!(frame.data & POWER_LED_BIT, 0);
    }
    assert_eq!(device.shared.animation_state(), frozen);
    assert_eq!(device.shared.power_request(), PowerRequest::PowerDown);
}

#[test]
fn repress_during_the_release_window_keeps_the_device_on() {
    let mut device = Device::new();
    device.run(false, 100);

    device.run(true, HOLD);
    device.run(false, HOLD / 2);
    assert_eq!(device.shared.power_request(), PowerRequest::ButtonReleased);

    device.run(true, 1);
    assert_eq!(device.shared.power_request(), PowerRequest::None);

    // Still animating.
    device.run(false, 10);
    assert_ne!(device.shared.led_bitmap(), LedBitmap::OFF);
}

#[test]
fn wake_restarts_the_pattern_and_holds_the_led_until_release() {
    let mut device = Device::new();
    device.run(false, 100);
    device.run(true, HOLD);
    device.run(false, HOLD);
    assert_eq!(device.shared.power_request(), PowerRequest::PowerDown);

    // Button press fires the wake interrupt; the finger is still down for a
    // while afterwards.
    device.wake();
    device.run(true, 500);

    assert_eq!(device.shared.power_request(), PowerRequest::PowerUp);
    assert!(device.shared.power_led());
    // The pattern restarted from its beginning.
    assert_eq!(device.shared.animation_state(), AnimationState::HoldEastWest);
    assert_eq!(device.shared.led_bitmap(), FACE_GREEN_EAST_WEST);

    // Letting go finishes the wake gesture.
    device.run(false, 1);
    assert_eq!(device.shared.power_request(), PowerRequest::None);
    assert!(!device.shared.power_led());

    // And the rotation carries live LED data again: the green rail's frame
    // shows the east/west arms within one full rotation.
    let mut lit = false;
    for _ in 0..4 {
        device.tick(false);
        let frame = device.last_frame.unwrap();
        if frame.select == Some(0) {
            lit = frame.data & 0x0F != 0;
        }
    }
    assert!(lit);
}

#[test]
fn wake_press_shorter_than_the_hold_window_stays_awake() {
    let mut device = Device::new();
    device.run(false, 100);
    device.run(true, HOLD);
    device.run(false, HOLD);

    device.wake();
    // A brief wake press, nowhere near the shutdown hold.
    device.run(true, 50);
    device.run(false, 1);
    assert_eq!(device.shared.power_request(), PowerRequest::None);

    // The device keeps running afterwards.
    device.run(false, 2000);
    assert_eq!(device.shared.power_request(), PowerRequest::None);
    assert_ne!(device.shared.led_bitmap(), LedBitmap::OFF);
}
