//! # Driver for key-protected independent watchdog (IWDG) peripherals.
//!
//! ## Overview
//! The independent watchdog is a 12-bit down-counter fed by a low-speed
//! internal oscillator through a seven-step prescaler. Once started it
//! cannot be stopped; the application keeps feeding it on schedule or
//! the chip resets. The same key-protected register model ships in
//! several microcontroller families under different names, and this
//! crate drives all of them through one code path:
//!
//! - [`countdown`] turns a timeout in seconds into the finest prescaler
//!   and reload pair the range allows.
//! - [`profile`] carries every per-family constant (keys, bounds, base
//!   clock) as plain data instead of inline literals.
//! - [`watchdog`] sequences the registers through the [`Instance`]
//!   trait and reports whether the previous reset was the watchdog's
//!   own doing.
//! - [`mmio`] is the memory-mapped [`Instance`] for bare-metal targets.
//!
//! ## Usage
//! ```rust, no_run
//! use iwdg_hal::{
//!     mmio::{MmioWatchdog, RegisterMap},
//!     profile::Profile,
//!     Watchdog,
//! };
//!
//! let instance = MmioWatchdog::take(RegisterMap::STM32F1, Profile::STM32F1).unwrap();
//! let mut watchdog = Watchdog::new(instance);
//!
//! if watchdog.caused_last_reset() {
//!     // The previous boot ended in a watchdog timeout.
//! }
//!
//! watchdog.configure(3.0).unwrap();
//! loop {
//!     watchdog.feed();
//!     // do other work, shorter than the armed timeout
//! }
//! ```
//!
//! ## Feature Flags
#![doc = document_features::document_features!()]
#![deny(missing_docs, rust_2018_idioms)]
#![no_std]

// MUST be the first module
mod fmt;

pub mod countdown;
pub mod mmio;
pub mod profile;
pub mod watchdog;

pub use self::watchdog::{Instance, Watchdog};

/// Watchdog driver errors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The requested timeout is non-positive or not a finite number.
    InvalidTimeout,
    /// The watchdog peripheral is absent or already owned elsewhere in
    /// this program.
    HardwareUnavailable,
}
