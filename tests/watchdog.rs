//! Driver sequencing tests against a recording register double.

use std::{cell::RefCell, rc::Rc};

use fugit::HertzU32;
use iwdg_hal::{profile::Profile, Error, Instance, Watchdog};

/// One observed hardware access, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    ResetRead,
    Key(u16),
    Prescaler(u8),
    Reload(u16),
}

/// Register double wired to the 45 kHz reference profile.
struct Recording {
    profile: Profile,
    reset_latched: bool,
    events: Rc<RefCell<Vec<Event>>>,
}

fn recording(reset_latched: bool) -> (Recording, Rc<RefCell<Vec<Event>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let instance = Recording {
        profile: Profile::STM32F1.with_base_clock(HertzU32::Hz(45_000)),
        reset_latched,
        events: events.clone(),
    };
    (instance, events)
}

impl Instance for Recording {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn write_key(&mut self, key: u16) {
        self.events.borrow_mut().push(Event::Key(key));
    }

    fn write_prescaler(&mut self, code: u8) {
        self.events.borrow_mut().push(Event::Prescaler(code));
    }

    fn write_reload(&mut self, reload: u16) {
        self.events.borrow_mut().push(Event::Reload(reload));
    }

    fn reset_latched(&mut self) -> bool {
        self.events.borrow_mut().push(Event::ResetRead);
        // Reading clears the hardware flag.
        std::mem::replace(&mut self.reset_latched, false)
    }
}

#[test]
fn configure_programs_the_exact_register_sequence() {
    let (instance, events) = recording(false);
    let mut watchdog = Watchdog::new(instance);

    let timeout = watchdog.configure(1.0).unwrap();

    assert_eq!(timeout.to_micros(), 999_822);
    assert_eq!(
        *events.borrow(),
        [
            Event::ResetRead,
            Event::Key(0x5555),
            Event::Prescaler(2),
            Event::Reload(2812),
            Event::Key(0xAAAA),
            Event::Key(0xCCCC),
            Event::Key(0xAAAA),
        ]
    );
}

#[test]
fn configure_is_deterministic_for_the_same_request() {
    let (instance, events) = recording(false);
    let mut watchdog = Watchdog::new(instance);

    watchdog.configure(1.0).unwrap();
    let first = watchdog.countdown().unwrap();
    let first_events = events.borrow().clone();
    events.borrow_mut().clear();

    watchdog.configure(1.0).unwrap();
    let second = watchdog.countdown().unwrap();

    assert_eq!(first, second);
    // Minus the construction-time flag read, the register traffic
    // repeats exactly.
    assert_eq!(*events.borrow(), first_events[1..]);
}

#[test]
fn reset_cause_is_sampled_once_and_stays_fixed() {
    let (instance, events) = recording(true);
    let mut watchdog = Watchdog::new(instance);

    assert!(watchdog.caused_last_reset());
    watchdog.configure(0.5).unwrap();
    watchdog.feed();
    assert!(watchdog.caused_last_reset());

    let reads = events
        .borrow()
        .iter()
        .filter(|event| **event == Event::ResetRead)
        .count();
    assert_eq!(reads, 1);
    // The flag was read before any register write.
    assert_eq!(events.borrow()[0], Event::ResetRead);
}

#[test]
fn clean_boot_reports_no_watchdog_reset() {
    let (instance, _events) = recording(false);
    let watchdog = Watchdog::new(instance);

    assert!(!watchdog.caused_last_reset());
}

#[test]
fn feed_repeats_the_refresh_key_and_nothing_else() {
    let (instance, events) = recording(false);
    let mut watchdog = Watchdog::new(instance);
    watchdog.configure(0.05).unwrap();
    events.borrow_mut().clear();

    watchdog.feed();
    watchdog.feed();

    assert_eq!(*events.borrow(), [Event::Key(0xAAAA), Event::Key(0xAAAA)]);
}

#[test]
fn feed_before_configure_is_harmless() {
    let (instance, events) = recording(false);
    let mut watchdog = Watchdog::new(instance);

    watchdog.feed();

    assert_eq!(*events.borrow(), [Event::ResetRead, Event::Key(0xAAAA)]);
    assert_eq!(watchdog.timeout(), None);
}

#[test]
fn invalid_timeout_leaves_the_registers_untouched() {
    let (instance, events) = recording(false);
    let mut watchdog = Watchdog::new(instance);

    assert_eq!(watchdog.configure(-1.0).unwrap_err(), Error::InvalidTimeout);
    assert_eq!(watchdog.configure(0.0).unwrap_err(), Error::InvalidTimeout);

    assert_eq!(*events.borrow(), [Event::ResetRead]);
    assert_eq!(watchdog.timeout(), None);
}

#[test]
fn rearming_overwrites_prescaler_and_reload() {
    let (instance, events) = recording(false);
    let mut watchdog = Watchdog::new(instance);

    watchdog.configure(1.0).unwrap();
    events.borrow_mut().clear();

    let timeout = watchdog.configure(0.05).unwrap();

    assert_eq!(timeout.to_micros(), 49_955);
    assert_eq!(watchdog.timeout(), Some(timeout));
    assert_eq!(
        *events.borrow(),
        [
            Event::Key(0x5555),
            Event::Prescaler(0),
            Event::Reload(562),
            Event::Key(0xAAAA),
            Event::Key(0xCCCC),
            Event::Key(0xAAAA),
        ]
    );
}

#[test]
fn oversized_request_arms_the_clamped_countdown() {
    let (instance, events) = recording(false);
    let mut watchdog = Watchdog::new(instance);

    let timeout = watchdog.configure(60.0).unwrap();

    // 256 * 0x0FFF / 45 kHz, well short of the request.
    assert_eq!(timeout.to_micros(), 23_296_000);
    assert!(events.borrow().contains(&Event::Prescaler(6)));
    assert!(events.borrow().contains(&Event::Reload(0x0FFF)));
}

#[cfg(feature = "embedded-hal-02")]
mod embedded_hal_02_traits {
    use embedded_hal_02::watchdog::{Watchdog as _, WatchdogEnable as _};
    use fugit::MicrosDurationU64;

    use super::*;

    #[test]
    fn start_arms_and_feed_kicks() {
        let (instance, events) = recording(false);
        let mut watchdog = Watchdog::new(instance);

        watchdog.start(MicrosDurationU64::secs(1));
        assert_eq!(watchdog.timeout().map(|t| t.to_micros()), Some(999_822));
        events.borrow_mut().clear();

        watchdog.feed();

        assert_eq!(*events.borrow(), [Event::Key(0xAAAA)]);
    }
}
