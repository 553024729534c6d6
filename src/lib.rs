//! Device logic for a battery-powered four-direction LED waymark.
//!
//! The waymark shows a repeating color pattern on four directional LED arms
//! (South/East/North/West), each arm carrying a green, a yellow and a red
//! LED. The three color rails share a common set of direction lines and are
//! lit one at a time by a fast multiplex rotation.
//!
//! Everything in this library is a deterministic function of ticks and the
//! sampled button level, so the whole device can be simulated on the host:
//!
//! ```text
//! cargo test --no-default-features
//! ```
//!
//! # Module Organization
//!
//! Pure logic (always compiled, no hardware dependencies):
//! - [`bitmap`] - packed LED on/off state and the animation face constants
//! - [`animation`] - the repeating light-pattern state machine
//! - [`power`] - the power-button gesture state machine
//! - [`mux`] - the time-division multiplexer
//! - [`state`] - cross-context shared state cells
//!
//! Hardware layer (`hardware` feature, STM32L031 target):
//! - [`hardware`] - pin mappings and peripheral initialization
//! - [`display`] - the LED line driver and the periodic tick loop
//! - [`sleep`] - STOP-mode entry and the wake interrupt

#![no_std]

pub mod animation;
pub mod bitmap;
pub mod mux;
pub mod power;
pub mod state;

#[cfg(feature = "hardware")]
pub mod display;
#[cfg(feature = "hardware")]
pub mod hardware;
#[cfg(feature = "hardware")]
pub mod sleep;

pub use animation::{Animation, AnimationState};
pub use bitmap::LedBitmap;
pub use mux::{Frame, Multiplexer};
pub use power::{PowerButton, PowerRequest};
pub use state::SharedState;
