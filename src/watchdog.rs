//! # Watchdog Driver
//!
//! ## Overview
//! [`Watchdog`] walks a key-protected independent watchdog through its
//! one-way life: sample the reset cause, arm with the closest
//! realizable timeout, feed on schedule or reset. Register access goes
//! through the [`Instance`] trait, so one driver body serves
//! memory-mapped hardware and test doubles alike.
//!
//! The driver owns its instance for the rest of the program. The
//! hardware offers no stop and no hand-back, and the API mirrors that:
//! construction consumes the instance and nothing returns it.
//!
//! ## Usage
//! ```rust, no_run
//! use iwdg_hal::{
//!     mmio::{MmioWatchdog, RegisterMap},
//!     profile::Profile,
//!     Watchdog,
//! };
//!
//! let instance = MmioWatchdog::take(RegisterMap::STM32F4, Profile::STM32F4).unwrap();
//! let mut watchdog = Watchdog::new(instance);
//!
//! // The hardware realizes the closest value it can and reports it.
//! let timeout = watchdog.configure(0.5).unwrap();
//! assert!(timeout.to_millis() <= 500);
//!
//! watchdog.feed();
//! ```

use fugit::MicrosDurationU64;

use crate::{countdown::Countdown, profile::Profile, Error};

/// Register-level access to one independent watchdog.
///
/// Implementations move values to and from registers and nothing more;
/// sequencing lives in [`Watchdog`]. [`MmioWatchdog`](crate::mmio::MmioWatchdog)
/// covers memory-mapped families, and anything register-compatible can
/// plug in its own.
pub trait Instance {
    /// The family description this instance is wired to.
    fn profile(&self) -> &Profile;

    /// Writes a key into the key register.
    fn write_key(&mut self, key: u16);

    /// Writes a prescaler code into the prescaler register.
    fn write_prescaler(&mut self, code: u8);

    /// Writes a reload value into the reload register.
    fn write_reload(&mut self, reload: u16);

    /// Reads whether the previous reset was raised by the watchdog,
    /// clearing the underlying flag where the hardware keeps one.
    ///
    /// The driver calls this exactly once, before any other register
    /// access.
    fn reset_latched(&mut self) -> bool;
}

/// Driver for one independent watchdog peripheral.
///
/// Once [`configure`](Self::configure) has armed the hardware, the only
/// way to avoid a reset is to keep [`feed`](Self::feed) arriving faster
/// than the armed timeout. `&mut self` on every operation leaves
/// serialization of callers to the owner; the driver keeps no lock.
pub struct Watchdog<I: Instance> {
    instance: I,
    caused_reset: bool,
    countdown: Option<Countdown>,
}

impl<I: Instance> Watchdog<I> {
    /// Takes exclusive ownership of the peripheral.
    ///
    /// Samples the reset-cause flag before anything else touches the
    /// watchdog registers; arming or feeding does not preserve the
    /// flag on every family.
    pub fn new(mut instance: I) -> Self {
        let caused_reset = instance.reset_latched();
        if caused_reset {
            info!("previous reset was raised by the watchdog");
        }
        Self {
            instance,
            caused_reset,
            countdown: None,
        }
    }

    /// Arms the watchdog with the closest realizable timeout.
    ///
    /// Computes the prescaler and reload for `timeout_secs`, programs
    /// them, and starts the countdown from the full reload value. The
    /// returned duration is what the hardware will actually enforce:
    /// truncation makes it at most one prescaled tick short of the
    /// request, and an unrealizably long request is clamped to the
    /// longest countdown the coarsest prescaler reaches. Callers that
    /// need a guaranteed minimum should ask for slightly more than it.
    ///
    /// Arming again later is allowed and simply programs new values;
    /// the counter is refreshed during the sequence and never runs out
    /// mid-update.
    pub fn configure(&mut self, timeout_secs: f64) -> Result<MicrosDurationU64, Error> {
        let countdown = Countdown::for_timeout(timeout_secs, self.instance.profile())?;
        let profile = *self.instance.profile();

        // Unlock, program, load, start, then one service pulse so the
        // counter leaves from the full reload value. An interleaved
        // register write here would corrupt the key sequence; the
        // unlock itself is fire-and-forget, there is no re-lock key.
        critical_section::with(|_| {
            self.instance.write_key(profile.unlock_key);
            self.instance.write_prescaler(countdown.prescaler().code());
            self.instance.write_reload(countdown.reload());
            self.instance.write_key(profile.refresh_key);
            self.instance.write_key(profile.start_key);
            self.instance.write_key(profile.refresh_key);
        });

        let timeout = countdown.timeout(&profile);
        info!(
            "watchdog armed: divisor {} reload {} timeout {} us",
            countdown.prescaler().divisor(),
            countdown.reload(),
            timeout.to_micros()
        );
        self.countdown = Some(countdown);

        Ok(timeout)
    }

    /// Feeds the watchdog, restarting the countdown from the full
    /// reload value.
    ///
    /// A single key write that takes effect immediately. Feeding
    /// before the first [`configure`](Self::configure) is harmless;
    /// stopped hardware ignores the key.
    pub fn feed(&mut self) {
        let key = self.instance.profile().refresh_key;
        self.instance.write_key(key);
    }

    /// Whether the previous system reset was raised by this watchdog.
    ///
    /// Captured once at construction; the answer never changes for the
    /// life of the driver.
    pub fn caused_last_reset(&self) -> bool {
        self.caused_reset
    }

    /// The values armed by the last successful
    /// [`configure`](Self::configure), if any.
    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    /// The timeout the hardware currently enforces, `None` before the
    /// first successful [`configure`](Self::configure).
    pub fn timeout(&self) -> Option<MicrosDurationU64> {
        let countdown = self.countdown?;
        Some(countdown.timeout(self.instance.profile()))
    }
}

#[cfg(feature = "embedded-hal-02")]
impl<I: Instance> embedded_hal_02::watchdog::Watchdog for Watchdog<I> {
    fn feed(&mut self) {
        Watchdog::feed(self);
    }
}

#[cfg(feature = "embedded-hal-02")]
impl<I: Instance> embedded_hal_02::watchdog::WatchdogEnable for Watchdog<I> {
    type Time = MicrosDurationU64;

    /// Panics on a zero period; the underlying hardware cannot
    /// realize it and the trait has no error path.
    fn start<T: Into<Self::Time>>(&mut self, period: T) {
        let secs = period.into().to_micros() as f64 / 1_000_000.0;
        unwrap!(self.configure(secs));
    }
}
