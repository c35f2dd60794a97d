// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! External oscillator driver for the UC3.
//!
//! The UC3 has two external oscillator channels, OSC0 and OSC1. Each one is
//! configured with the kind of clock attached to its pins and the number of
//! cycles the PM counts before declaring it ready.
//!
//! # Usage
//!
//! First, get a reference to the [ExternalOscillator] struct:
//! ```rust,ignore
//! let osc = &clocks.osc;
//! ```
//!
//! ## Start an oscillator
//!
//! Blocks until the PM reports the oscillator as ready:
//! ```rust,ignore
//! osc.start(0, OscillatorMode::CrystalAbove8MHz, OscillatorStartup::Cycles0)?;
//! ```
//!
//! ## Start an oscillator with a bounded wait
//!
//! ```rust,ignore
//! let mode = OscillatorMode::CrystalAbove8MHz;
//! match osc.start_with_timeout(0, mode, OscillatorStartup::Cycles2048, 10_000) {
//!     Ok(()) => { /* ready */ }
//!     Err(ErrorCode::BUSY) => { /* still starting, poll osc.is_ready(0) */ }
//!     Err(_) => { /* invalid channel */ }
//! }
//! ```
//!
//! ## Stop an oscillator
//!
//! ```rust,ignore
//! osc.stop(1);
//! ```

use crate::pm::{OscillatorChannel, OscillatorMode, OscillatorStartup, Pm};

use kernel::debug;
use kernel::ErrorCode;

/// External oscillator controller.
pub struct ExternalOscillator<'a> {
    pm: &'a Pm,
}

impl<'a> ExternalOscillator<'a> {
    pub(in crate::clocks) fn new(pm: &'a Pm) -> Self {
        Self { pm }
    }

    /// Validate the channel, program its mode and startup time and set its
    /// enable bit. Nothing is written for an invalid channel.
    fn configure_and_enable(
        &self,
        channel: usize,
        mode: OscillatorMode,
        startup: OscillatorStartup,
    ) -> Result<OscillatorChannel, ErrorCode> {
        let osc = OscillatorChannel::try_from(channel).inspect_err(|_| {
            debug!("osc: rejecting start of invalid channel {}", channel);
        })?;

        self.pm.configure_oscillator(osc, mode, startup);
        self.pm.enable_oscillator(osc);

        Ok(osc)
    }

    /// Start an external oscillator and wait until it is ready.
    ///
    /// The wait is unbounded: an oscillator that never stabilizes hangs the
    /// caller. Use [ExternalOscillator::start_with_timeout] to bound it.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): `channel` is not 0 or 1. No register is
    /// written.
    pub fn start(
        &self,
        channel: usize,
        mode: OscillatorMode,
        startup: OscillatorStartup,
    ) -> Result<(), ErrorCode> {
        let osc = self.configure_and_enable(channel, mode, startup)?;

        while !self.pm.is_ready_oscillator(osc) {}

        Ok(())
    }

    /// Start an external oscillator, polling its ready bit at most
    /// `max_polls` times.
    ///
    /// The oscillator stays enabled when the wait runs out, so the caller may
    /// keep polling [ExternalOscillator::is_ready].
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): `channel` is not 0 or 1. No register is
    /// written.
    /// + [Err]\([ErrorCode::BUSY]\): the oscillator was not ready after
    /// `max_polls` polls.
    pub fn start_with_timeout(
        &self,
        channel: usize,
        mode: OscillatorMode,
        startup: OscillatorStartup,
        max_polls: usize,
    ) -> Result<(), ErrorCode> {
        let osc = self.configure_and_enable(channel, mode, startup)?;

        for _ in 0..max_polls {
            if self.pm.is_ready_oscillator(osc) {
                return Ok(());
            }
        }

        debug!(
            "osc{}: not ready after {} polls ({} startup cycles)",
            channel,
            max_polls,
            startup.cycles()
        );
        Err(ErrorCode::BUSY)
    }

    /// Stop an external oscillator. Out-of-range channels are ignored.
    pub fn stop(&self, channel: usize) {
        match OscillatorChannel::try_from(channel) {
            Ok(osc) => self.pm.disable_oscillator(osc),
            Err(_) => debug!("osc: ignoring stop of invalid channel {}", channel),
        }
    }

    pub fn is_enabled(&self, channel: usize) -> bool {
        OscillatorChannel::try_from(channel).is_ok_and(|osc| self.pm.is_enabled_oscillator(osc))
    }

    pub fn is_ready(&self, channel: usize) -> bool {
        OscillatorChannel::try_from(channel).is_ok_and(|osc| self.pm.is_ready_oscillator(osc))
    }
}
