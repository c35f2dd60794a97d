// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! UC3 clock management.
//!
//! The clock tree is driven by four controllers sharing the power manager:
//!
//! + [ExternalOscillator]: the OSC0/OSC1 crystal or external clock inputs
//! + [Pll]: the two PLLs, fed from an external oscillator
//! + [GenericClock]: divided copies of an oscillator or PLL for peripherals
//! + [CpuClock]: the main clock mux and the matching flash wait state
//!
//! A clock must be running before anything is switched onto it. The usual
//! bring-up order is: oscillator, PLL, flash wait state and CPU source, then
//! generic clocks. [Clocks::setup_system_clock] applies that order.
//!
//! # Usage
//!
//! ```rust,ignore
//! let pm = Pm::new();
//! let flashc = Flashc::new();
//! let clocks = Clocks::new(&pm, &flashc);
//!
//! let cpu_freq = clocks.setup_system_clock(&SystemClockConfig {
//!     oscillator: OscillatorConfig {
//!         channel: 0,
//!         mode: OscillatorMode::CrystalAbove8MHz,
//!         startup: OscillatorStartup::Cycles2048,
//!         frequency: 12_000_000,
//!     },
//!     // CPU on PLL0, USB on PLL1
//!     plls: &[
//!         PllConfig {
//!             channel: 0,
//!             frequency: 66_000_000,
//!         },
//!         PllConfig {
//!             channel: 1,
//!             frequency: 48_000_000,
//!         },
//!     ],
//!     cpu_pll: Some(0),
//!     generic_clocks: &[GenericClockConfig {
//!         channel: 4,
//!         source: ClockSource::Pll1,
//!         frequency: 48_000_000,
//!     }],
//! })?;
//! ```

pub mod cpu;
pub mod gclk;
pub mod osc;
pub mod pll;

pub use crate::clocks::cpu::CpuClock;
pub use crate::clocks::gclk::GenericClock;
pub use crate::clocks::osc::ExternalOscillator;
pub use crate::clocks::pll::Pll;

use crate::flashc::Flashc;
use crate::pm::{OscillatorChannel, OscillatorMode, OscillatorStartup, PllChannel, Pm};

use kernel::debug;
use kernel::ErrorCode;

/// A clock in the UC3 clock tree.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockSource {
    /// Internal RC oscillator
    SlowClock = 0,
    Osc0 = 1,
    Osc1 = 2,
    Pll0 = 3,
    Pll1 = 4,
}

impl TryFrom<u8> for ClockSource {
    type Error = ErrorCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClockSource::SlowClock),
            1 => Ok(ClockSource::Osc0),
            2 => Ok(ClockSource::Osc1),
            3 => Ok(ClockSource::Pll0),
            4 => Ok(ClockSource::Pll1),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

impl From<OscillatorChannel> for ClockSource {
    fn from(channel: OscillatorChannel) -> Self {
        match channel {
            OscillatorChannel::Osc0 => ClockSource::Osc0,
            OscillatorChannel::Osc1 => ClockSource::Osc1,
        }
    }
}

impl From<PllChannel> for ClockSource {
    fn from(channel: PllChannel) -> Self {
        match channel {
            PllChannel::Pll0 => ClockSource::Pll0,
            PllChannel::Pll1 => ClockSource::Pll1,
        }
    }
}

/// External oscillator to start, and the frequency of the clock on its pins.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OscillatorConfig {
    pub channel: usize,
    pub mode: OscillatorMode,
    pub startup: OscillatorStartup,
    pub frequency: u32,
}

/// PLL to start from the configured oscillator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PllConfig {
    pub channel: usize,
    pub frequency: u32,
}

/// Generic clock to start once the CPU clock is switched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenericClockConfig {
    pub channel: usize,
    /// Must be the configured oscillator or one of the configured PLLs.
    pub source: ClockSource,
    pub frequency: u32,
}

/// Board clock configuration applied by [Clocks::setup_system_clock].
#[derive(Copy, Clone, Debug)]
pub struct SystemClockConfig<'c> {
    pub oscillator: OscillatorConfig,
    /// PLLs to start from the oscillator, in order.
    pub plls: &'c [PllConfig],
    /// Index into `plls` of the PLL the CPU runs from. Without one, the CPU
    /// runs from the oscillator.
    pub cpu_pll: Option<usize>,
    pub generic_clocks: &'c [GenericClockConfig],
}

impl SystemClockConfig<'_> {
    /// Frequency of `source` once this configuration is applied, or `None`
    /// if the configuration does not start it.
    fn frequency_of(&self, source: ClockSource) -> Option<u32> {
        let osc_source =
            OscillatorChannel::try_from(self.oscillator.channel).map(ClockSource::from);
        if osc_source == Ok(source) {
            return Some(self.oscillator.frequency);
        }
        // A PLL listed twice ends up with its last configuration.
        self.plls
            .iter()
            .rev()
            .find(|pll| PllChannel::try_from(pll.channel).map(ClockSource::from) == Ok(source))
            .map(|pll| pll.frequency)
    }
}

/// The UC3 clock controllers.
pub struct Clocks<'a> {
    /// External oscillators
    pub osc: ExternalOscillator<'a>,
    /// Phase-locked loops
    pub pll: Pll<'a>,
    /// Generic clocks
    pub gclk: GenericClock<'a>,
    /// Main clock and flash wait state
    pub cpu: CpuClock<'a>,
}

impl<'a> Clocks<'a> {
    pub fn new(pm: &'a Pm, flashc: &'a Flashc) -> Self {
        Self {
            osc: ExternalOscillator::new(pm),
            pll: Pll::new(pm),
            gclk: GenericClock::new(pm),
            cpu: CpuClock::new(pm, flashc),
        }
    }

    /// Bring up the clock tree described by `config` and return the CPU
    /// frequency in Hz.
    ///
    /// The oscillator is started first, then every configured PLL. The CPU
    /// is switched to the selected PLL, or to the oscillator, and finally each
    /// generic clock is started. Channels and the CPU PLL index are checked
    /// before anything is written. After that, the first step that fails
    /// stops the sequence; clocks started before it are left running.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): a channel is out of range, `cpu_pll`
    /// is not an index into `plls`, the CPU cannot run from the chosen clock
    /// (PLL1), or a generic clock names a source this configuration does not
    /// start or a frequency it cannot divide down to.
    pub fn setup_system_clock(&self, config: &SystemClockConfig) -> Result<u32, ErrorCode> {
        let oscillator = &config.oscillator;
        let osc_source = ClockSource::from(OscillatorChannel::try_from(oscillator.channel)?);
        for pll in config.plls {
            PllChannel::try_from(pll.channel)?;
        }
        let cpu_pll = config
            .cpu_pll
            .map(|index| config.plls.get(index).ok_or(ErrorCode::INVAL))
            .transpose()
            .inspect_err(|_| debug!("clocks: no PLL at index {:?}", config.cpu_pll))?;

        self.osc.start(oscillator.channel, oscillator.mode, oscillator.startup)?;

        for pll in config.plls {
            self.pll.start(pll.channel, osc_source, oscillator.frequency, pll.frequency)?;
        }

        let (cpu_source, cpu_freq) = match cpu_pll {
            Some(pll) => (ClockSource::from(PllChannel::try_from(pll.channel)?), pll.frequency),
            None => (osc_source, oscillator.frequency),
        };

        self.cpu.set_source(cpu_source, cpu_freq)?;
        debug!("clocks: CPU running from {:?} at {}Hz", cpu_source, cpu_freq);

        for gclk in config.generic_clocks {
            let source_freq = config.frequency_of(gclk.source).ok_or_else(|| {
                debug!(
                    "clocks: gclk{} source {:?} is not running",
                    gclk.channel, gclk.source
                );
                ErrorCode::INVAL
            })?;
            self.gclk.start(gclk.channel, gclk.source, source_freq, gclk.frequency)?;
        }

        Ok(cpu_freq)
    }
}

/// On-target clock tests.
///
/// They reprogram the clock tree of the running chip and put the CPU back on
/// the slow clock when they finish, so console output that depends on the
/// main clock may be garbled while they run.
///
/// # Usage
///
/// ```rust,ignore
/// // EVK1100: 12MHz crystal on OSC0
/// uc3::clocks::tests::run(&clocks, 12_000_000);
/// ```
pub mod tests {
    use super::{ClockSource, Clocks};
    use crate::flashc::FlashWaitState;
    use crate::pm::{OscillatorMode, OscillatorStartup};
    use kernel::debug;
    use kernel::ErrorCode;

    const MAX_POLLS: usize = 1_000_000;

    pub fn test_oscillator(clocks: &Clocks, crystal_freq: u32) {
        debug!("Testing OSC0...");

        assert_eq!(
            Ok(()),
            clocks.osc.start_with_timeout(
                0,
                OscillatorMode::CrystalAbove8MHz,
                OscillatorStartup::Cycles2048,
                MAX_POLLS
            )
        );
        assert!(clocks.osc.is_enabled(0));
        assert!(clocks.osc.is_ready(0));

        assert_eq!(Ok(()), clocks.cpu.set_source(ClockSource::Osc0, crystal_freq));
        assert_eq!(Some(ClockSource::Osc0), clocks.cpu.source());

        assert_eq!(
            Err(ErrorCode::INVAL),
            clocks.osc.start(
                2,
                OscillatorMode::CrystalAbove8MHz,
                OscillatorStartup::Cycles2048
            )
        );

        debug!("OSC0 tests passed.");
    }

    pub fn test_pll(clocks: &Clocks, crystal_freq: u32) {
        debug!("Testing PLL0...");

        assert_eq!(
            Ok(()),
            clocks.pll.start_with_timeout(
                0,
                ClockSource::Osc0,
                crystal_freq,
                4 * crystal_freq,
                MAX_POLLS
            )
        );
        assert!(clocks.pll.is_locked(0));
        assert_eq!(Some(1), clocks.pll.multiplier(0));

        assert_eq!(
            Err(ErrorCode::INVAL),
            clocks
                .pll
                .start(0, ClockSource::Pll1, crystal_freq, 4 * crystal_freq)
        );

        assert_eq!(
            Ok(()),
            clocks.cpu.set_source(ClockSource::Pll0, 4 * crystal_freq)
        );
        assert_eq!(Some(ClockSource::Pll0), clocks.cpu.source());
        assert_eq!(FlashWaitState::OneWaitState, clocks.cpu.flash_wait_state());

        debug!("PLL0 tests passed.");
    }

    pub fn test_generic_clock(clocks: &Clocks, crystal_freq: u32) {
        debug!("Testing GCLK0...");

        assert_eq!(
            Ok(()),
            clocks
                .gclk
                .start(0, ClockSource::Osc0, crystal_freq, crystal_freq / 2)
        );
        assert!(clocks.gclk.is_enabled(0));
        clocks.gclk.stop(0);
        assert!(!clocks.gclk.is_enabled(0));

        assert_eq!(
            Err(ErrorCode::INVAL),
            clocks
                .gclk
                .start(0, ClockSource::Osc0, crystal_freq, 2 * crystal_freq)
        );
        assert!(!clocks.gclk.is_enabled(0));

        debug!("GCLK0 tests passed.");
    }

    fn restore_slow_clock(clocks: &Clocks) {
        assert_eq!(Ok(()), clocks.cpu.set_source(ClockSource::SlowClock, 115_000));
        clocks.pll.stop(0);
        clocks.osc.stop(0);
        assert!(!clocks.pll.is_enabled(0));
        assert!(!clocks.osc.is_enabled(0));
        assert_eq!(FlashWaitState::ZeroWaitState, clocks.cpu.flash_wait_state());
    }

    /// Run all clock tests. `crystal_freq` is the frequency of the crystal
    /// on OSC0, at most 15MHz.
    pub fn run(clocks: &Clocks, crystal_freq: u32) {
        debug!("");
        debug!("===============================================");
        debug!("Testing clocks...");

        test_oscillator(clocks, crystal_freq);
        test_pll(clocks, crystal_freq);
        test_generic_clock(clocks, crystal_freq);
        restore_slow_clock(clocks);

        debug!("Finished testing clocks. Everything is alright!");
        debug!("===============================================");
        debug!("");
    }
}

#[cfg(test)]
mod setup_tests {
    use super::*;
    use crate::pm::offsets::*;

    const FWS: u32 = 1 << 6;

    fn crystal_12mhz() -> OscillatorConfig {
        OscillatorConfig {
            channel: 0,
            mode: OscillatorMode::CrystalAbove8MHz,
            startup: OscillatorStartup::Cycles2048,
            frequency: 12_000_000,
        }
    }

    #[test]
    fn clock_source_raw_values() {
        for raw in 0u8..=4 {
            let source = ClockSource::try_from(raw);
            assert_eq!(source.map(|s| s as u8), Ok(raw));
        }
        assert_eq!(ClockSource::try_from(5u8), Err(ErrorCode::INVAL));
        assert_eq!(ClockSource::try_from(u8::MAX), Err(ErrorCode::INVAL));
    }

    #[test]
    fn oscillator_only() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        pm_memory.set_bits(POSCSR, OSC0RDY);

        let config = SystemClockConfig {
            oscillator: crystal_12mhz(),
            plls: &[],
            cpu_pll: None,
            generic_clocks: &[],
        };
        assert_eq!(clocks.setup_system_clock(&config), Ok(12_000_000));
        // OSC0EN, MCSEL = OSC0
        assert_eq!(pm_memory.word(MCCTRL), (1 << 2) | 1);
        assert_eq!(flash_memory.word(0), 0);
        assert_eq!(pm_memory.word(PLL0), 0);
    }

    #[test]
    fn pll_with_usb_generic_clock() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        pm_memory.set_bits(POSCSR, OSC0RDY | LOCK0);

        let config = SystemClockConfig {
            oscillator: crystal_12mhz(),
            plls: &[PllConfig {
                channel: 0,
                frequency: 48_000_000,
            }],
            cpu_pll: Some(0),
            generic_clocks: &[
                GenericClockConfig {
                    channel: 3,
                    source: ClockSource::Pll0,
                    frequency: 48_000_000,
                },
                GenericClockConfig {
                    channel: 5,
                    source: ClockSource::Osc0,
                    frequency: 6_000_000,
                },
            ],
        };
        assert_eq!(clocks.setup_system_clock(&config), Ok(48_000_000));

        assert_eq!(pm_memory.word(PLL0), (1 << 16) | 1);
        assert_eq!(pm_memory.word(MCCTRL), (1 << 2) | 2);
        assert_eq!(flash_memory.word(0), FWS);
        // PLLSEL, CEN
        assert_eq!(pm_memory.word(GCCTRL0 + 3 * 4), (1 << 1) | (1 << 2));
        // OSCSEL = 0, DIVEN, CEN, DIV = 0
        assert_eq!(pm_memory.word(GCCTRL0 + 5 * 4), (1 << 4) | (1 << 2));
        assert_eq!(clocks.cpu.source(), Some(ClockSource::Pll0));
    }

    #[test]
    fn cpu_cannot_run_from_pll1() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, _flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        pm_memory.set_bits(POSCSR, OSC0RDY | LOCK1);

        let config = SystemClockConfig {
            oscillator: crystal_12mhz(),
            plls: &[PllConfig {
                channel: 1,
                frequency: 48_000_000,
            }],
            cpu_pll: Some(0),
            generic_clocks: &[GenericClockConfig {
                channel: 0,
                source: ClockSource::Pll1,
                frequency: 48_000_000,
            }],
        };
        assert_eq!(clocks.setup_system_clock(&config), Err(ErrorCode::INVAL));
        // The PLL was started, the CPU switch and generic clocks were not.
        assert!(clocks.pll.is_enabled(1));
        assert_eq!(pm_memory.word(MCCTRL), 1 << 2);
        assert!(!clocks.gclk.is_enabled(0));
    }

    #[test]
    fn invalid_oscillator_channel_writes_nothing() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        let before = pm_memory.snapshot();

        let config = SystemClockConfig {
            oscillator: OscillatorConfig {
                channel: 2,
                ..crystal_12mhz()
            },
            plls: &[],
            cpu_pll: None,
            generic_clocks: &[],
        };
        assert_eq!(clocks.setup_system_clock(&config), Err(ErrorCode::INVAL));
        assert_eq!(pm_memory.snapshot(), before);
        assert_eq!(flash_memory.word(0), 0);
    }

    #[test]
    fn generic_clock_from_stopped_source_is_rejected() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, _flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        pm_memory.set_bits(POSCSR, OSC0RDY);

        let config = SystemClockConfig {
            oscillator: crystal_12mhz(),
            plls: &[],
            cpu_pll: None,
            generic_clocks: &[
                GenericClockConfig {
                    channel: 1,
                    source: ClockSource::Osc0,
                    frequency: 12_000_000,
                },
                GenericClockConfig {
                    channel: 2,
                    source: ClockSource::Osc1,
                    frequency: 12_000_000,
                },
            ],
        };
        assert_eq!(clocks.setup_system_clock(&config), Err(ErrorCode::INVAL));
        assert!(clocks.gclk.is_enabled(1));
        assert!(!clocks.gclk.is_enabled(2));
    }

    #[test]
    fn cpu_on_pll0_and_usb_on_pll1() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        pm_memory.set_bits(POSCSR, OSC0RDY | LOCK0 | LOCK1);

        let config = SystemClockConfig {
            oscillator: crystal_12mhz(),
            plls: &[
                PllConfig {
                    channel: 0,
                    frequency: 66_000_000,
                },
                PllConfig {
                    channel: 1,
                    frequency: 48_000_000,
                },
            ],
            cpu_pll: Some(0),
            generic_clocks: &[GenericClockConfig {
                channel: 4,
                source: ClockSource::Pll1,
                frequency: 48_000_000,
            }],
        };
        assert_eq!(clocks.setup_system_clock(&config), Ok(66_000_000));

        // 66 / 12 = 5, (5 - 1) / 2 = 2
        assert_eq!(pm_memory.word(PLL0), (2 << 16) | 1);
        // 48 / 12 = 4, (4 - 1) / 2 = 1
        assert_eq!(pm_memory.word(PLL1), (1 << 16) | 1);
        assert_eq!(pm_memory.word(MCCTRL), (1 << 2) | 2);
        assert_eq!(flash_memory.word(0), FWS);
        // PLLSEL, OSCSEL, CEN, no division
        assert_eq!(pm_memory.word(GCCTRL0 + 4 * 4), 0b11 | (1 << 2));
        assert_eq!(clocks.cpu.source(), Some(ClockSource::Pll0));
    }

    #[test]
    fn bad_pll_entries_write_nothing() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        pm_memory.set_bits(POSCSR, OSC0RDY | LOCK0 | LOCK1);
        let before = pm_memory.snapshot();

        let plls = [
            PllConfig {
                channel: 0,
                frequency: 48_000_000,
            },
            PllConfig {
                channel: 2,
                frequency: 48_000_000,
            },
        ];
        let config = SystemClockConfig {
            oscillator: crystal_12mhz(),
            plls: &plls,
            cpu_pll: Some(0),
            generic_clocks: &[],
        };
        assert_eq!(clocks.setup_system_clock(&config), Err(ErrorCode::INVAL));

        let config = SystemClockConfig {
            plls: &plls[..1],
            cpu_pll: Some(1),
            ..config
        };
        assert_eq!(clocks.setup_system_clock(&config), Err(ErrorCode::INVAL));

        assert_eq!(pm_memory.snapshot(), before);
        assert_eq!(flash_memory.word(0), 0);
    }

    #[test]
    fn on_target_tests_pass_against_ready_hardware() {
        let (pm, pm_memory) = Pm::in_memory();
        let (flashc, flash_memory) = Flashc::in_memory();
        let clocks = Clocks::new(&pm, &flashc);
        pm_memory.set_bits(POSCSR, OSC0RDY | LOCK0);

        tests::run(&clocks, 12_000_000);

        assert_eq!(clocks.cpu.source(), Some(ClockSource::SlowClock));
        assert_eq!(flash_memory.word(0), 0);
    }
}
