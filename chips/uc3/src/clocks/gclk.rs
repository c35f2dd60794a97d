// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Generic clock driver for the UC3.
//!
//! A generic clock routes an oscillator or PLL output, optionally divided,
//! to a peripheral (USB, audio DAC) or to a GCLK pin. It can only divide its
//! input, never multiply it. Generic clocks have no ready flag, so starting
//! one returns as soon as the enable bit is written.

use crate::clocks::ClockSource;
use crate::pm::{GenericClockChannel, GenericClockSource, Pm};

use kernel::debug;
use kernel::ErrorCode;

/// Divider settings of a generic clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenericClockDivider {
    /// DIVEN: the output is the input divided by `2 * (divisor + 1)`.
    pub divide: bool,
    /// DIV field value.
    pub divisor: u32,
}

/// Compute the divider settings that bring `source_freq` down to
/// `target_freq`.
///
/// # Errors
///
/// + [Err]\([ErrorCode::INVAL]\): `source_freq` is lower than `target_freq`,
/// or `target_freq` is zero.
pub fn compute_divider(
    source_freq: u32,
    target_freq: u32,
) -> Result<GenericClockDivider, ErrorCode> {
    if source_freq < target_freq {
        return Err(ErrorCode::INVAL);
    }
    let ratio = source_freq.checked_div(target_freq).ok_or(ErrorCode::INVAL)?;
    Ok(GenericClockDivider {
        divide: source_freq > target_freq,
        divisor: (ratio - 1) / 2,
    })
}

pub struct GenericClock<'a> {
    pm: &'a Pm,
}

impl<'a> GenericClock<'a> {
    pub(in crate::clocks) fn new(pm: &'a Pm) -> Self {
        Self { pm }
    }

    /// Route `source` to a generic clock output and enable it.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): `source` is the slow clock, `channel`
    /// is out of range, `source_freq < target_freq`, or `target_freq` is
    /// zero. No register is written.
    pub fn start(
        &self,
        channel: usize,
        source: ClockSource,
        source_freq: u32,
        target_freq: u32,
    ) -> Result<(), ErrorCode> {
        let input = match source {
            ClockSource::Osc0 => GenericClockSource::Osc0,
            ClockSource::Osc1 => GenericClockSource::Osc1,
            ClockSource::Pll0 => GenericClockSource::Pll0,
            ClockSource::Pll1 => GenericClockSource::Pll1,
            ClockSource::SlowClock => {
                debug!("gclk: slow clock cannot drive a generic clock");
                return Err(ErrorCode::INVAL);
            }
        };
        let gclk = GenericClockChannel::try_from(channel).inspect_err(|_| {
            debug!("gclk: rejecting start of invalid channel {}", channel);
        })?;
        let divider = compute_divider(source_freq, target_freq).inspect_err(|_| {
            debug!(
                "gclk{}: cannot derive {}Hz from {}Hz",
                channel, target_freq, source_freq
            );
        })?;

        self.pm.set_generic_clock_source(gclk, input);
        self.pm.set_generic_clock_divider(gclk, divider.divide, divider.divisor);
        self.pm.enable_generic_clock(gclk);

        Ok(())
    }

    /// Stop a generic clock. Out-of-range channels are ignored.
    pub fn stop(&self, channel: usize) {
        match GenericClockChannel::try_from(channel) {
            Ok(gclk) => self.pm.disable_generic_clock(gclk),
            Err(_) => debug!("gclk: ignoring stop of invalid channel {}", channel),
        }
    }

    pub fn is_enabled(&self, channel: usize) -> bool {
        GenericClockChannel::try_from(channel)
            .is_ok_and(|gclk| self.pm.is_enabled_generic_clock(gclk))
    }
}
