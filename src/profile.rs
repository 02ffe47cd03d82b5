//! # Watchdog Family Profiles
//!
//! ## Overview
//! Every supported independent watchdog shares one programming model: a
//! key register guarding access, a seven-step prescaler, a 12-bit
//! reload counter fed by a low-speed internal oscillator. What differs
//! between chip families is numbers, not logic, and a [`Profile`]
//! carries those numbers as plain data. The countdown arithmetic and
//! the driver read profile fields and never branch on chip identity.
//!
//! ## Configuration
//! Start from a family constant and override what your board knows
//! better. The low-speed oscillators feeding these watchdogs drift a
//! long way from their datasheet value, so boards that have measured
//! theirs should say so:
//!
//! ```rust, no_run
//! use fugit::HertzU32;
//! use iwdg_hal::profile::Profile;
//!
//! // Nominal 40 kHz part whose oscillator was measured at 45 kHz.
//! let profile = Profile::STM32F1.with_base_clock(HertzU32::Hz(45_000));
//! ```

use fugit::HertzU32;

/// Numeric description of one independent-watchdog family.
///
/// A profile is the complete set of constants the driver needs: the
/// key values, the counter bounds, and the clock feeding the counter.
/// Custom hardware with the same register model can construct its own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Profile {
    /// Clock feeding the down-counter before prescaling. Nonzero; a
    /// clock that never ticks describes no realizable watchdog.
    pub base_clock: HertzU32,
    /// Key that opens the prescaler and reload registers for writing.
    pub unlock_key: u16,
    /// Key that reloads the down-counter from the reload register (the
    /// feed operation).
    pub refresh_key: u16,
    /// Key that starts the countdown. There is no stop key; the
    /// hardware runs until the next system reset.
    pub start_key: u16,
    /// Largest programmable reload value. The counter is 12 bits wide
    /// on every supported family.
    pub reload_max: u16,
    /// Count bound for the finest prescaler. The reference hardware
    /// keeps a tighter margin here than for the coarser settings.
    pub strict_count_limit: u16,
    /// Count bound for the intermediate prescalers.
    pub count_limit: u16,
}

impl Profile {
    /// STM32F1 series, 40 kHz nominal LSI.
    pub const STM32F1: Self = Self::key_protected(HertzU32::Hz(40_000));

    /// STM32F4 series, 32 kHz nominal LSI.
    pub const STM32F4: Self = Self::key_protected(HertzU32::Hz(32_000));

    /// GD32F1x0 series, 40 kHz IRC40K.
    pub const GD32F1X0: Self = Self::key_protected(HertzU32::Hz(40_000));

    const fn key_protected(base_clock: HertzU32) -> Self {
        Self {
            base_clock,
            unlock_key: 0x5555,
            refresh_key: 0xAAAA,
            start_key: 0xCCCC,
            reload_max: 0x0FFF,
            strict_count_limit: 0x7FF,
            count_limit: 0xFF0,
        }
    }

    /// Returns the profile with its base clock replaced by a measured
    /// value.
    ///
    /// Timeout accuracy is proportional to how well this rate matches
    /// the oscillator actually fitted.
    ///
    /// # Panics
    ///
    /// A zero rate is refused here rather than carried into the timeout
    /// arithmetic.
    pub const fn with_base_clock(mut self, base_clock: HertzU32) -> Self {
        ::core::assert!(base_clock.to_Hz() > 0, "base clock must be nonzero");
        self.base_clock = base_clock;
        self
    }
}
