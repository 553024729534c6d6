//! Sleep and wake control.
//!
//! Shutdown stops the core in STOP mode with only the power button's EXTI
//! line armed as a wake source. The wake interrupt masks itself (one wake
//! per power cycle), drops the core back to light sleep before the executor
//! resumes, and replays the power-up request into the shared state.
//!
//! # Wake Ordering
//!
//! Two orderings carry the correctness of this module:
//! - The wake line is armed (pending cleared, line unmasked) before `wfi`
//!   executes, so a press landing in between leaves the line pending and
//!   `wfi` falls straight through instead of missing the edge.
//! - The wake handler masks its own line and clears `SLEEPDEEP` before it
//!   touches any shared state, so the executor's idle `wfi` cannot drop the
//!   device back into STOP while the wake gesture is still being processed.

use embassy_stm32::pac;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use pac::interrupt;

use crate::animation::AnimationState;
use crate::power::PowerRequest;
use crate::state::SHARED;

/// EXTI line wired to the power button (PA0).
const WAKE_EXTI_LINE: usize = 0;

/// Register bank index for EXTI lines 0..=31.
const EXTI_REG_IDX: usize = 0;

/// Static signal carrying the shutdown handshake from the tick loop to
/// [`sleep_task`]. Signalled only after a blanking frame has been driven.
static SLEEP_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Called by the tick loop once the shutdown gesture has completed and the
/// LED lines are blank.
pub fn request_sleep() {
    SLEEP_REQUEST.signal(());
}

/// One-time wake plumbing.
///
/// Routes EXTI line 0 to PA0, selects the falling (press) edge, leaves the
/// line masked until sleep entry arms it, and unmasks the interrupt in the
/// NVIC.
///
/// # Safety
///
/// Directly accesses PAC registers and unmasks an NVIC interrupt.
pub fn setup_wake() {
    let exti = pac::EXTI;
    let syscfg = pac::SYSCFG;

    // Enable the SYSCFG clock for the EXTI routing below
    pac::RCC.apb2enr().modify(|w| w.set_syscfgen(true));

    // Route EXTI line 0 to port A
    syscfg.exticr(0).modify(|w| w.set_exti(0, 0));

    // Falling edge only: the button input is pulled up and active-low
    exti.ftsr(EXTI_REG_IDX)
        .modify(|w| w.set_line(WAKE_EXTI_LINE, true));
    exti.rtsr(EXTI_REG_IDX)
        .modify(|w| w.set_line(WAKE_EXTI_LINE, false));

    // Masked until sleep entry arms it
    exti.imr(EXTI_REG_IDX)
        .modify(|w| w.set_line(WAKE_EXTI_LINE, false));

    // Enable the wake interrupt in the NVIC
    unsafe {
        cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::EXTI0_1);
    };
}

/// Background task that stops the core once the shutdown gesture completes.
///
/// Runs continuously; each handshake from the tick loop produces one STOP
/// period, ended only by the wake interrupt.
#[embassy_executor::task]
pub async fn sleep_task() {
    loop {
        SLEEP_REQUEST.wait().await;

        #[cfg(feature = "debug-mode")]
        defmt::info!("entering STOP mode");

        enter_power_down();

        #[cfg(feature = "debug-mode")]
        defmt::info!("woke from STOP mode");
    }
}

/// Stops the core until the wake interrupt fires.
///
/// Step order mirrors the wake-ordering contract in the module docs: arm the
/// wake line, configure the deep-sleep mode, clear the pending request, then
/// halt. Execution resumes here only after the wake handler has run.
fn enter_power_down() {
    arm_wake_interrupt();

    // STOP-mode configuration: clear a stale wakeup flag and switch the
    // regulator to ultra-low power. PDDS stays at its reset value, so deep
    // sleep is STOP (state retained), not standby (which would reset).
    pac::RCC.apb1enr().modify(|w| w.set_pwren(true));
    pac::PWR.cr().modify(|w| {
        w.set_cwuf(true);
        w.set_ulp(true);
    });

    // SAFETY: single-core device; the core peripheral registers are only
    // touched here and in the wake handler, which cannot preempt this point
    // while its EXTI line is the sole enabled wake source.
    unsafe { cortex_m::Peripherals::steal() }.SCB.set_sleepdeep();

    SHARED.request_power(PowerRequest::None);

    cortex_m::asm::wfi();
}

/// Arms the button's EXTI line as the wake source.
///
/// Clears any stale pending edge first; a press landing after this point
/// pends the line and makes the following `wfi` fall through immediately.
fn arm_wake_interrupt() {
    let exti = pac::EXTI;
    exti.pr(EXTI_REG_IDX)
        .modify(|w| w.set_line(WAKE_EXTI_LINE, true));
    exti.imr(EXTI_REG_IDX)
        .modify(|w| w.set_line(WAKE_EXTI_LINE, true));
}

/// Wake interrupt handler (EXTI line 0, power button press).
///
/// Masks its own line first so the button edge wakes the device exactly once
/// per power cycle, restores light sleep, then replays the wake into the
/// shared state: power LED on, power-up pending, animation restarted.
///
/// # Safety
///
/// This interrupt handler accesses PAC registers directly.
#[interrupt]
fn EXTI0_1() {
    let exti = pac::EXTI;

    // Disarm and acknowledge the wake line
    exti.imr(EXTI_REG_IDX)
        .modify(|w| w.set_line(WAKE_EXTI_LINE, false));
    exti.pr(EXTI_REG_IDX)
        .modify(|w| w.set_line(WAKE_EXTI_LINE, true));

    // Back to light sleep before the executor resumes, so its idle wfi
    // cannot re-enter STOP
    // SAFETY: single-core write of an architectural SCB bit; see
    // enter_power_down for the only other writer.
    unsafe { cortex_m::Peripherals::steal() }.SCB.clear_sleepdeep();

    SHARED.set_power_led(true);
    SHARED.request_power(PowerRequest::PowerUp);
    SHARED.set_animation_state(AnimationState::Off);
}
