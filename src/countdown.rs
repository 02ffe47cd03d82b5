//! # Timeout Arithmetic
//!
//! ## Overview
//! Translates a requested timeout in seconds into the two values the
//! hardware understands: a [`Prescaler`] selecting the clock divider
//! and a 12-bit reload count. Prescalers are probed finest first, so
//! the realized timeout keeps as much resolution as its range allows,
//! and fractional counts are truncated rather than rounded, so the
//! hardware never waits longer than asked.
//!
//! Everything in this module is plain arithmetic over a [`Profile`];
//! no hardware is touched, which keeps the selection testable on any
//! host.

use fugit::MicrosDurationU64;
use strum::FromRepr;

use crate::{profile::Profile, Error};

/// Clock divider between the base clock and the down-counter.
///
/// Discriminants are the hardware prescaler register codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Prescaler {
    /// Divide the base clock by 4.
    Div4   = 0,
    /// Divide the base clock by 8.
    Div8   = 1,
    /// Divide the base clock by 16.
    Div16  = 2,
    /// Divide the base clock by 32.
    Div32  = 3,
    /// Divide the base clock by 64.
    Div64  = 4,
    /// Divide the base clock by 128.
    Div128 = 5,
    /// Divide the base clock by 256.
    Div256 = 6,
}

impl Prescaler {
    /// Every setting, finest divider first.
    pub const ALL: [Self; 7] = [
        Self::Div4,
        Self::Div8,
        Self::Div16,
        Self::Div32,
        Self::Div64,
        Self::Div128,
        Self::Div256,
    ];

    /// The division factor applied to the base clock.
    pub const fn divisor(self) -> u32 {
        4 << self as u32
    }

    /// The code programmed into the prescaler register.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// A prescaler and reload pair realizing one timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown {
    prescaler: Prescaler,
    reload: u16,
}

impl Countdown {
    /// Computes the countdown for a requested timeout in seconds.
    ///
    /// The finest prescaler whose count fits its bound wins. Counts
    /// are truncated toward zero, which makes the realized timeout at
    /// most one prescaled clock tick shorter than the request. A
    /// request beyond the coarsest prescaler's range is clamped to the
    /// longest realizable countdown instead of rejected; the shortfall
    /// shows up in [`timeout`](Self::timeout) and in a logged warning.
    ///
    /// Non-positive and non-finite requests return
    /// [`Error::InvalidTimeout`].
    pub fn for_timeout(timeout_secs: f64, profile: &Profile) -> Result<Self, Error> {
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(Error::InvalidTimeout);
        }

        let base_clock = profile.base_clock.to_Hz() as f64;

        for (index, prescaler) in Prescaler::ALL.into_iter().enumerate() {
            let counts = timeout_secs * (base_clock / prescaler.divisor() as f64);
            // The finest setting keeps a tighter margin than the rest.
            let limit = if index == 0 {
                profile.strict_count_limit
            } else {
                profile.count_limit
            };
            if counts < f64::from(limit) {
                return Ok(Self {
                    prescaler,
                    reload: counts as u16,
                });
            }
        }

        // Nothing bounded fits: coarsest divider, reload capped at the
        // counter width.
        let prescaler = Prescaler::Div256;
        let counts = (timeout_secs * (base_clock / prescaler.divisor() as f64)) as u32;
        if counts > u32::from(profile.reload_max) {
            warn!(
                "timeout {} s not realizable, clamping reload {} to {}",
                timeout_secs, counts, profile.reload_max
            );
        }
        let reload = counts.min(u32::from(profile.reload_max)) as u16;

        Ok(Self { prescaler, reload })
    }

    /// The chosen clock divider.
    pub const fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// The reload value the counter restarts from.
    pub const fn reload(&self) -> u16 {
        self.reload
    }

    /// The timeout the hardware will realize.
    ///
    /// `prescaler * reload / base_clock`, truncated to microseconds.
    pub const fn timeout(&self, profile: &Profile) -> MicrosDurationU64 {
        let ticks = self.prescaler.divisor() as u64 * self.reload as u64;
        MicrosDurationU64::micros(ticks * 1_000_000 / profile.base_clock.to_Hz() as u64)
    }
}
