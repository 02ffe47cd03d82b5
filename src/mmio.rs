//! # Memory-Mapped Register Access
//!
//! ## Overview
//! [`MmioWatchdog`] implements [`Instance`] with volatile loads and
//! stores against a [`RegisterMap`], the address block of one family's
//! watchdog. [`take`](MmioWatchdog::take) hands out the single allowed
//! instance per program run; [`steal`](MmioWatchdog::steal) bypasses
//! the bookkeeping for callers that can guarantee exclusivity
//! themselves.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::{profile::Profile, watchdog::Instance, Error};

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Address block of one family's watchdog registers.
///
/// The peripheral keeps its key register at offset 0x00, the prescaler
/// at 0x04 and the reload at 0x08 on every supported family; the
/// reset-status register lives in the clock controller and moves
/// around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// Watchdog peripheral base address.
    pub iwdg: usize,
    /// Address of the reset-status register.
    pub reset_status: usize,
    /// Mask of the "watchdog raised the reset" flag in the status
    /// register.
    pub reset_flag: u32,
    /// Write-one mask that clears the reset-cause flags.
    pub remove_flag: u32,
}

impl RegisterMap {
    /// STM32F1 series: IWDG, with the flag in RCC_CSR.
    pub const STM32F1: Self = Self {
        iwdg: 0x4000_3000,
        reset_status: 0x4002_1024,
        reset_flag: 1 << 29,
        remove_flag: 1 << 24,
    };

    /// STM32F4 series: IWDG, with the flag in RCC_CSR.
    pub const STM32F4: Self = Self {
        iwdg: 0x4000_3000,
        reset_status: 0x4002_3874,
        reset_flag: 1 << 29,
        remove_flag: 1 << 24,
    };

    /// GD32F1x0 series: FWDGT, with the flag in RCU_RSTSCK.
    pub const GD32F1X0: Self = Self {
        iwdg: 0x4000_3000,
        reset_status: 0x4002_1024,
        reset_flag: 1 << 29,
        remove_flag: 1 << 24,
    };

    const KEY_OFFSET: usize = 0x00;
    const PRESCALER_OFFSET: usize = 0x04;
    const RELOAD_OFFSET: usize = 0x08;
}

/// Memory-mapped watchdog instance.
#[derive(Debug)]
pub struct MmioWatchdog {
    map: RegisterMap,
    profile: Profile,
}

impl MmioWatchdog {
    /// Claims the watchdog registers.
    ///
    /// At most one instance exists per program run; a second call
    /// returns [`Error::HardwareUnavailable`].
    pub fn take(map: RegisterMap, profile: Profile) -> Result<Self, Error> {
        critical_section::with(|_| {
            if TAKEN.load(Ordering::Relaxed) {
                Err(Error::HardwareUnavailable)
            } else {
                TAKEN.store(true, Ordering::Relaxed);
                Ok(Self { map, profile })
            }
        })
    }

    /// Creates an instance without the singleton bookkeeping.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that no other instance over the same
    /// registers is alive, and that `map` points at a watchdog with
    /// `profile`'s register model.
    pub const unsafe fn steal(map: RegisterMap, profile: Profile) -> Self {
        Self { map, profile }
    }

    fn write_register(&mut self, address: usize, value: u32) {
        unsafe { (address as *mut u32).write_volatile(value) }
    }

    fn read_register(&self, address: usize) -> u32 {
        unsafe { (address as *const u32).read_volatile() }
    }
}

impl Instance for MmioWatchdog {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn write_key(&mut self, key: u16) {
        self.write_register(self.map.iwdg + RegisterMap::KEY_OFFSET, u32::from(key));
    }

    fn write_prescaler(&mut self, code: u8) {
        self.write_register(
            self.map.iwdg + RegisterMap::PRESCALER_OFFSET,
            u32::from(code),
        );
    }

    fn write_reload(&mut self, reload: u16) {
        self.write_register(self.map.iwdg + RegisterMap::RELOAD_OFFSET, u32::from(reload));
    }

    fn reset_latched(&mut self) -> bool {
        let status = self.read_register(self.map.reset_status);
        let latched = status & self.map.reset_flag != 0;
        if latched {
            // Write-one-to-clear wipes every reset-cause flag at once;
            // keep the rest of the register as read.
            self.write_register(self.map.reset_status, status | self.map.remove_flag);
        }
        latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_enforces_the_singleton() {
        // Construction only; nothing dereferences the addresses.
        let first = MmioWatchdog::take(RegisterMap::STM32F1, Profile::STM32F1);
        assert!(first.is_ok());
        assert_eq!(
            MmioWatchdog::take(RegisterMap::STM32F1, Profile::STM32F1).unwrap_err(),
            Error::HardwareUnavailable
        );
    }
}
