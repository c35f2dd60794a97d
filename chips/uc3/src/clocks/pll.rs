// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Phase-locked loop (PLL) driver for the UC3.
//!
//! Both PLLs take one of the two external oscillators as input. The driver
//! derives the multiplier from the ratio between the requested output
//! frequency and the input frequency; the divider is always left at unity.
//!
//! The multiplier is not checked against the operating range of the PLL. A
//! target frequency far from what the hardware supports yields a register
//! value the hardware clamps or refuses to lock on.
//!
//! # Usage
//!
//! ```rust,ignore
//! // 12MHz crystal on OSC0, PLL0 for the CPU
//! clocks.pll.start(0, ClockSource::Osc0, 12_000_000, 66_000_000)?;
//! // ...
//! clocks.pll.stop(0);
//! ```

use crate::clocks::ClockSource;
use crate::pm::{OscillatorChannel, PllChannel, Pm};

use kernel::debug;
use kernel::ErrorCode;

/// Compute the PLLMUL value for a given input and output frequency.
///
/// Returns `((target / source) - 1) / 2` using integer division, or 0 when
/// the target is lower than the source.
///
/// # Errors
///
/// + [Err]\([ErrorCode::INVAL]\): `source_freq` is zero.
pub fn compute_multiplier(source_freq: u32, target_freq: u32) -> Result<u32, ErrorCode> {
    let ratio = target_freq.checked_div(source_freq).ok_or(ErrorCode::INVAL)?;
    if ratio == 0 {
        Ok(0)
    } else {
        Ok((ratio - 1) / 2)
    }
}

/// PLL controller.
pub struct Pll<'a> {
    pm: &'a Pm,
}

impl<'a> Pll<'a> {
    pub(in crate::clocks) fn new(pm: &'a Pm) -> Self {
        Self { pm }
    }

    fn configure_and_enable(
        &self,
        channel: usize,
        source: ClockSource,
        source_freq: u32,
        target_freq: u32,
    ) -> Result<PllChannel, ErrorCode> {
        // PLLs can only be fed from an external oscillator.
        let osc = match source {
            ClockSource::Osc0 => OscillatorChannel::Osc0,
            ClockSource::Osc1 => OscillatorChannel::Osc1,
            ClockSource::SlowClock | ClockSource::Pll0 | ClockSource::Pll1 => {
                debug!("pll: {:?} cannot drive a PLL", source);
                return Err(ErrorCode::INVAL);
            }
        };
        let pll = PllChannel::try_from(channel).inspect_err(|_| {
            debug!("pll: rejecting start of invalid channel {}", channel);
        })?;
        let multiplier = compute_multiplier(source_freq, target_freq).inspect_err(|_| {
            debug!("pll{}: source frequency must be non-zero", channel);
        })?;

        self.pm.configure_pll(pll, osc, multiplier, 0);
        self.pm.enable_pll(pll);

        Ok(pll)
    }

    /// Start a PLL and wait until it locks.
    ///
    /// The wait is unbounded: a PLL that never locks hangs the caller.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): `source` is not OSC0 or OSC1, `channel`
    /// is not 0 or 1, or `source_freq` is zero. No register is written.
    pub fn start(
        &self,
        channel: usize,
        source: ClockSource,
        source_freq: u32,
        target_freq: u32,
    ) -> Result<(), ErrorCode> {
        let pll = self.configure_and_enable(channel, source, source_freq, target_freq)?;

        while !self.pm.is_locked_pll(pll) {}

        Ok(())
    }

    /// Start a PLL, polling its lock bit at most `max_polls` times.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): see [Pll::start].
    /// + [Err]\([ErrorCode::BUSY]\): the PLL did not lock within `max_polls`
    /// polls. It is left enabled.
    pub fn start_with_timeout(
        &self,
        channel: usize,
        source: ClockSource,
        source_freq: u32,
        target_freq: u32,
        max_polls: usize,
    ) -> Result<(), ErrorCode> {
        let pll = self.configure_and_enable(channel, source, source_freq, target_freq)?;

        for _ in 0..max_polls {
            if self.pm.is_locked_pll(pll) {
                return Ok(());
            }
        }

        debug!("pll{}: not locked after {} polls", channel, max_polls);
        Err(ErrorCode::BUSY)
    }

    /// Stop a PLL. Out-of-range channels are ignored.
    pub fn stop(&self, channel: usize) {
        match PllChannel::try_from(channel) {
            Ok(pll) => self.pm.disable_pll(pll),
            Err(_) => debug!("pll: ignoring stop of invalid channel {}", channel),
        }
    }

    pub fn is_enabled(&self, channel: usize) -> bool {
        PllChannel::try_from(channel).is_ok_and(|pll| self.pm.is_enabled_pll(pll))
    }

    pub fn is_locked(&self, channel: usize) -> bool {
        PllChannel::try_from(channel).is_ok_and(|pll| self.pm.is_locked_pll(pll))
    }

    /// Multiplier currently programmed into a PLL.
    pub fn multiplier(&self, channel: usize) -> Option<u32> {
        PllChannel::try_from(channel)
            .ok()
            .map(|pll| self.pm.get_pll_multiplier(pll))
    }
}
