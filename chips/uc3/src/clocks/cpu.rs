// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! CPU (main) clock selection.
//!
//! The main clock can run from the internal slow clock, OSC0 or PLL0. The
//! flash wait state is derived from the frequency of the new source and is
//! programmed before the source is switched.

use crate::clocks::ClockSource;
use crate::flashc::{FlashWaitState, Flashc, FLASH_WAIT_STATE_THRESHOLD_HZ};
use crate::pm::{MainClock, Pm};

use kernel::debug;
use kernel::ErrorCode;

/// Flash wait state required to run the CPU at `freq` Hz.
pub fn flash_wait_state_for(freq: u32) -> FlashWaitState {
    if freq > FLASH_WAIT_STATE_THRESHOLD_HZ {
        FlashWaitState::OneWaitState
    } else {
        FlashWaitState::ZeroWaitState
    }
}

pub struct CpuClock<'a> {
    pm: &'a Pm,
    flashc: &'a Flashc,
}

impl<'a> CpuClock<'a> {
    pub(in crate::clocks) fn new(pm: &'a Pm, flashc: &'a Flashc) -> Self {
        Self { pm, flashc }
    }

    /// Switch the main clock to `source`, running at `source_freq` Hz.
    ///
    /// The source must already be running: the switch does not wait.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): `source` is OSC1 or PLL1. The flash
    /// wait state has already been updated for `source_freq`, but the main
    /// clock is left untouched.
    pub fn set_source(&self, source: ClockSource, source_freq: u32) -> Result<(), ErrorCode> {
        self.flashc.set_wait_state(flash_wait_state_for(source_freq));

        let main_clock = match source {
            ClockSource::SlowClock => MainClock::SlowClock,
            ClockSource::Osc0 => MainClock::Osc0,
            ClockSource::Pll0 => MainClock::Pll0,
            ClockSource::Osc1 | ClockSource::Pll1 => {
                debug!("cpu: {:?} cannot drive the main clock", source);
                return Err(ErrorCode::INVAL);
            }
        };
        self.pm.select_main_clock(main_clock);

        Ok(())
    }

    /// Source the main clock currently runs from.
    pub fn source(&self) -> Option<ClockSource> {
        self.pm.get_main_clock().map(|clock| match clock {
            MainClock::SlowClock => ClockSource::SlowClock,
            MainClock::Osc0 => ClockSource::Osc0,
            MainClock::Pll0 => ClockSource::Pll0,
        })
    }

    pub fn flash_wait_state(&self) -> FlashWaitState {
        self.flashc.get_wait_state()
    }
}

#[cfg(test)]
mod tests {
    use super::{flash_wait_state_for, CpuClock};
    use crate::clocks::ClockSource;
    use crate::flashc::{FlashWaitState, Flashc};
    use crate::pm::offsets::*;
    use crate::pm::Pm;
    use kernel::ErrorCode;

    const FWS: u32 = 1 << 6;

    #[test]
    fn wait_state_threshold() {
        assert_eq!(flash_wait_state_for(0), FlashWaitState::ZeroWaitState);
        assert_eq!(
            flash_wait_state_for(30_000_000),
            FlashWaitState::ZeroWaitState
        );
        assert_eq!(
            flash_wait_state_for(30_000_001),
            FlashWaitState::OneWaitState
        );
        assert_eq!(
            flash_wait_state_for(66_000_000),
            FlashWaitState::OneWaitState
        );
    }

    #[test]
    fn pll0_at_48mhz_needs_a_wait_state() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let cpu = CpuClock::new(&pm, &flashc);

        assert_eq!(cpu.set_source(ClockSource::Pll0, 48_000_000), Ok(()));
        assert_eq!(flash_memory.word(0), FWS);
        assert_eq!(pm_memory.word(MCCTRL), 2);
        assert_eq!(cpu.source(), Some(ClockSource::Pll0));
        assert_eq!(cpu.flash_wait_state(), FlashWaitState::OneWaitState);
    }

    #[test]
    fn osc0_at_8mhz_runs_without_wait_state() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let cpu = CpuClock::new(&pm, &flashc);
        flash_memory.set_word(0, FWS);

        assert_eq!(cpu.set_source(ClockSource::Osc0, 8_000_000), Ok(()));
        assert_eq!(flash_memory.word(0), 0);
        assert_eq!(pm_memory.word(MCCTRL), 1);
        assert_eq!(cpu.source(), Some(ClockSource::Osc0));
    }

    #[test]
    fn switch_keeps_oscillator_enables() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, _flash_memory) = Flashc::in_memory();
        let cpu = CpuClock::new(&pm, &flashc);
        pm_memory.set_word(MCCTRL, (1 << 2) | (1 << 3) | 2);

        assert_eq!(cpu.set_source(ClockSource::SlowClock, 115_000), Ok(()));
        assert_eq!(pm_memory.word(MCCTRL), (1 << 2) | (1 << 3));
        assert_eq!(cpu.source(), Some(ClockSource::SlowClock));
    }

    #[test]
    fn unsupported_source_still_sets_wait_state() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let cpu = CpuClock::new(&pm, &flashc);
        let before = pm_memory.snapshot();

        assert_eq!(
            cpu.set_source(ClockSource::Pll1, 60_000_000),
            Err(ErrorCode::INVAL)
        );
        assert_eq!(flash_memory.word(0), FWS);
        assert_eq!(
            cpu.set_source(ClockSource::Osc1, 12_000_000),
            Err(ErrorCode::INVAL)
        );
        assert_eq!(flash_memory.word(0), 0);
        assert_eq!(pm_memory.snapshot(), before);
    }

    #[test]
    fn reserved_mcsel_has_no_source() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, _flash_memory) = Flashc::in_memory();
        let cpu = CpuClock::new(&pm, &flashc);
        pm_memory.set_word(MCCTRL, 3);

        assert_eq!(cpu.source(), None);
    }
}
