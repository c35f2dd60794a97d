// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Power manager (PM) register interface for the UC3.
//!
//! The PM owns the clock generation hardware of the chip: the two external
//! oscillators, the two PLLs, the generic clock outputs and the main clock
//! multiplexer. This module only knows how to read and write those fields;
//! parameter validation and the start/stop sequences live in
//! [`crate::clocks`].
//!
//! The register block is shared, process-wide state. `Pm` hands out no
//! locking: it is intended for the single execution context that brings the
//! system up before interrupts are enabled. Because it holds a
//! [`StaticRef`], `Pm` is neither `Send` nor `Sync`.

use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

register_structs! {
    PmRegisters {
        /// Main clock control
        (0x000 => mcctrl: ReadWrite<u32, MCCTRL::Register>),
        (0x004 => _reserved0),
        /// PLL0 and PLL1 control
        (0x020 => pll: [ReadWrite<u32, PLL::Register>; PLL_COUNT]),
        /// Oscillator 0 and oscillator 1 control
        (0x028 => oscctrl: [ReadWrite<u32, OSCCTRL::Register>; OSCILLATOR_COUNT]),
        (0x030 => _reserved1),
        /// Power and oscillators status
        (0x054 => poscsr: ReadOnly<u32, POSCSR::Register>),
        (0x058 => _reserved2),
        /// Generic clock control
        (0x060 => gcctrl: [ReadWrite<u32, GCCTRL::Register>; GENERIC_CLOCK_COUNT]),
        (0x078 => @END),
    }
}

register_bitfields![u32,
    MCCTRL [
        /// Oscillator 1 enable
        OSC1EN OFFSET(3) NUMBITS(1) [],
        /// Oscillator 0 enable
        OSC0EN OFFSET(2) NUMBITS(1) [],
        /// Main clock select
        MCSEL OFFSET(0) NUMBITS(2) [
            SlowClock = 0,
            Osc0 = 1,
            Pll0 = 2
        ]
    ],
    PLL [
        /// PLL count
        PLLCOUNT OFFSET(24) NUMBITS(6) [],
        /// PLL multiply factor
        PLLMUL OFFSET(16) NUMBITS(4) [],
        /// PLL division factor
        PLLDIV OFFSET(8) NUMBITS(4) [],
        /// PLL options
        PLLOPT OFFSET(2) NUMBITS(3) [],
        /// PLL oscillator select
        PLLOSC OFFSET(1) NUMBITS(1) [
            Osc0 = 0,
            Osc1 = 1
        ],
        /// PLL enable
        PLLEN OFFSET(0) NUMBITS(1) []
    ],
    OSCCTRL [
        /// Oscillator startup time
        STARTUP OFFSET(8) NUMBITS(3) [],
        /// Oscillator mode
        MODE OFFSET(0) NUMBITS(3) []
    ],
    POSCSR [
        /// 32 kHz oscillator ready
        OSC32RDY OFFSET(9) NUMBITS(1) [],
        /// Oscillator 1 ready
        OSC1RDY OFFSET(8) NUMBITS(1) [],
        /// Oscillator 0 ready
        OSC0RDY OFFSET(7) NUMBITS(1) [],
        /// Clock ready
        CKRDY OFFSET(5) NUMBITS(1) [],
        /// PLL1 locked
        LOCK1 OFFSET(1) NUMBITS(1) [],
        /// PLL0 locked
        LOCK0 OFFSET(0) NUMBITS(1) []
    ],
    GCCTRL [
        /// Division factor
        DIV OFFSET(8) NUMBITS(8) [],
        /// Divide enable
        DIVEN OFFSET(4) NUMBITS(1) [],
        /// Clock enable
        CEN OFFSET(2) NUMBITS(1) [],
        /// PLL select
        PLLSEL OFFSET(1) NUMBITS(1) [],
        /// Oscillator select
        OSCSEL OFFSET(0) NUMBITS(1) []
    ]
];

const PM_BASE: StaticRef<PmRegisters> =
    unsafe { StaticRef::new(0xFFFF_0C00 as *const PmRegisters) };

/// Number of external oscillator channels.
pub const OSCILLATOR_COUNT: usize = 2;
/// Number of PLLs.
pub const PLL_COUNT: usize = 2;
/// Number of generic clock outputs.
pub const GENERIC_CLOCK_COUNT: usize = 6;

/// External oscillator channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum OscillatorChannel {
    Osc0 = 0,
    Osc1 = 1,
}

impl TryFrom<usize> for OscillatorChannel {
    type Error = ErrorCode;

    fn try_from(channel: usize) -> Result<Self, Self::Error> {
        match channel {
            0 => Ok(OscillatorChannel::Osc0),
            1 => Ok(OscillatorChannel::Osc1),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// PLL channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum PllChannel {
    Pll0 = 0,
    Pll1 = 1,
}

impl TryFrom<usize> for PllChannel {
    type Error = ErrorCode;

    fn try_from(channel: usize) -> Result<Self, Self::Error> {
        match channel {
            0 => Ok(PllChannel::Pll0),
            1 => Ok(PllChannel::Pll1),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// Generic clock output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum GenericClockChannel {
    Gclk0 = 0,
    Gclk1 = 1,
    Gclk2 = 2,
    Gclk3 = 3,
    Gclk4 = 4,
    Gclk5 = 5,
}

impl TryFrom<usize> for GenericClockChannel {
    type Error = ErrorCode;

    fn try_from(channel: usize) -> Result<Self, Self::Error> {
        match channel {
            0 => Ok(GenericClockChannel::Gclk0),
            1 => Ok(GenericClockChannel::Gclk1),
            2 => Ok(GenericClockChannel::Gclk2),
            3 => Ok(GenericClockChannel::Gclk3),
            4 => Ok(GenericClockChannel::Gclk4),
            5 => Ok(GenericClockChannel::Gclk5),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// Kind of clock attached to an external oscillator channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OscillatorMode {
    /// External clock signal, not a crystal.
    ExternalClock = 0,
    /// Crystal at or below 900 kHz.
    CrystalUpTo900kHz = 1,
    /// Crystal at or below 3 MHz.
    CrystalUpTo3MHz = 2,
    /// Crystal at or below 8 MHz.
    CrystalUpTo8MHz = 3,
    /// Crystal at or above 8 MHz.
    CrystalAbove8MHz = 4,
}

impl TryFrom<u8> for OscillatorMode {
    type Error = ErrorCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OscillatorMode::ExternalClock),
            1 => Ok(OscillatorMode::CrystalUpTo900kHz),
            2 => Ok(OscillatorMode::CrystalUpTo3MHz),
            3 => Ok(OscillatorMode::CrystalUpTo8MHz),
            4 => Ok(OscillatorMode::CrystalAbove8MHz),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// Number of oscillator cycles the PM waits before reporting an external
/// oscillator as ready.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OscillatorStartup {
    Cycles0 = 0,
    Cycles64 = 1,
    Cycles128 = 2,
    Cycles2048 = 3,
    Cycles4096 = 4,
    Cycles8192 = 5,
    Cycles16384 = 6,
}

impl OscillatorStartup {
    /// Startup delay in oscillator cycles.
    pub fn cycles(&self) -> u32 {
        match self {
            OscillatorStartup::Cycles0 => 0,
            OscillatorStartup::Cycles64 => 64,
            OscillatorStartup::Cycles128 => 128,
            OscillatorStartup::Cycles2048 => 2048,
            OscillatorStartup::Cycles4096 => 4096,
            OscillatorStartup::Cycles8192 => 8192,
            OscillatorStartup::Cycles16384 => 16384,
        }
    }
}

impl TryFrom<u8> for OscillatorStartup {
    type Error = ErrorCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OscillatorStartup::Cycles0),
            1 => Ok(OscillatorStartup::Cycles64),
            2 => Ok(OscillatorStartup::Cycles128),
            3 => Ok(OscillatorStartup::Cycles2048),
            4 => Ok(OscillatorStartup::Cycles4096),
            5 => Ok(OscillatorStartup::Cycles8192),
            6 => Ok(OscillatorStartup::Cycles16384),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// Input of a generic clock, as encoded by the PLLSEL/OSCSEL pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenericClockSource {
    Osc0,
    Osc1,
    Pll0,
    Pll1,
}

/// Source of the main (CPU and bus) clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MainClock {
    SlowClock,
    Osc0,
    Pll0,
}

/// Register-level access to the power manager.
pub struct Pm {
    registers: StaticRef<PmRegisters>,
}

impl Pm {
    pub const fn new() -> Pm {
        Pm {
            registers: PM_BASE,
        }
    }

    pub fn configure_oscillator(
        &self,
        channel: OscillatorChannel,
        mode: OscillatorMode,
        startup: OscillatorStartup,
    ) {
        self.registers.oscctrl[channel as usize].modify(
            OSCCTRL::STARTUP.val(startup as u32) + OSCCTRL::MODE.val(mode as u32),
        );
    }

    pub fn enable_oscillator(&self, channel: OscillatorChannel) {
        match channel {
            OscillatorChannel::Osc0 => self.registers.mcctrl.modify(MCCTRL::OSC0EN::SET),
            OscillatorChannel::Osc1 => self.registers.mcctrl.modify(MCCTRL::OSC1EN::SET),
        }
    }

    pub fn disable_oscillator(&self, channel: OscillatorChannel) {
        match channel {
            OscillatorChannel::Osc0 => self.registers.mcctrl.modify(MCCTRL::OSC0EN::CLEAR),
            OscillatorChannel::Osc1 => self.registers.mcctrl.modify(MCCTRL::OSC1EN::CLEAR),
        }
    }

    pub fn is_enabled_oscillator(&self, channel: OscillatorChannel) -> bool {
        match channel {
            OscillatorChannel::Osc0 => self.registers.mcctrl.is_set(MCCTRL::OSC0EN),
            OscillatorChannel::Osc1 => self.registers.mcctrl.is_set(MCCTRL::OSC1EN),
        }
    }

    pub fn is_ready_oscillator(&self, channel: OscillatorChannel) -> bool {
        match channel {
            OscillatorChannel::Osc0 => self.registers.poscsr.is_set(POSCSR::OSC0RDY),
            OscillatorChannel::Osc1 => self.registers.poscsr.is_set(POSCSR::OSC1RDY),
        }
    }

    /// Program the PLL input, multiplier and divider. Values wider than
    /// their register fields are truncated by the field encoding.
    pub fn configure_pll(
        &self,
        channel: PllChannel,
        source: OscillatorChannel,
        multiplier: u32,
        divider: u32,
    ) {
        let pllosc = match source {
            OscillatorChannel::Osc0 => PLL::PLLOSC::Osc0,
            OscillatorChannel::Osc1 => PLL::PLLOSC::Osc1,
        };
        self.registers.pll[channel as usize]
            .modify(pllosc + PLL::PLLMUL.val(multiplier) + PLL::PLLDIV.val(divider));
    }

    pub fn enable_pll(&self, channel: PllChannel) {
        self.registers.pll[channel as usize].modify(PLL::PLLEN::SET);
    }

    pub fn disable_pll(&self, channel: PllChannel) {
        self.registers.pll[channel as usize].modify(PLL::PLLEN::CLEAR);
    }

    pub fn is_enabled_pll(&self, channel: PllChannel) -> bool {
        self.registers.pll[channel as usize].is_set(PLL::PLLEN)
    }

    pub fn is_locked_pll(&self, channel: PllChannel) -> bool {
        match channel {
            PllChannel::Pll0 => self.registers.poscsr.is_set(POSCSR::LOCK0),
            PllChannel::Pll1 => self.registers.poscsr.is_set(POSCSR::LOCK1),
        }
    }

    pub fn get_pll_multiplier(&self, channel: PllChannel) -> u32 {
        self.registers.pll[channel as usize].read(PLL::PLLMUL)
    }

    pub fn set_generic_clock_source(
        &self,
        channel: GenericClockChannel,
        source: GenericClockSource,
    ) {
        let select = match source {
            GenericClockSource::Osc0 => GCCTRL::PLLSEL::CLEAR + GCCTRL::OSCSEL::CLEAR,
            GenericClockSource::Osc1 => GCCTRL::PLLSEL::CLEAR + GCCTRL::OSCSEL::SET,
            GenericClockSource::Pll0 => GCCTRL::PLLSEL::SET + GCCTRL::OSCSEL::CLEAR,
            GenericClockSource::Pll1 => GCCTRL::PLLSEL::SET + GCCTRL::OSCSEL::SET,
        };
        self.registers.gcctrl[channel as usize].modify(select);
    }

    /// Program the divide-enable flag and the division factor. The divisor
    /// is truncated to the 8-bit DIV field.
    pub fn set_generic_clock_divider(
        &self,
        channel: GenericClockChannel,
        divide: bool,
        divisor: u32,
    ) {
        let diven = if divide {
            GCCTRL::DIVEN::SET
        } else {
            GCCTRL::DIVEN::CLEAR
        };
        self.registers.gcctrl[channel as usize].modify(diven + GCCTRL::DIV.val(divisor));
    }

    pub fn enable_generic_clock(&self, channel: GenericClockChannel) {
        self.registers.gcctrl[channel as usize].modify(GCCTRL::CEN::SET);
    }

    pub fn disable_generic_clock(&self, channel: GenericClockChannel) {
        self.registers.gcctrl[channel as usize].modify(GCCTRL::CEN::CLEAR);
    }

    pub fn is_enabled_generic_clock(&self, channel: GenericClockChannel) -> bool {
        self.registers.gcctrl[channel as usize].is_set(GCCTRL::CEN)
    }

    pub fn select_main_clock(&self, clock: MainClock) {
        let mcsel = match clock {
            MainClock::SlowClock => MCCTRL::MCSEL::SlowClock,
            MainClock::Osc0 => MCCTRL::MCSEL::Osc0,
            MainClock::Pll0 => MCCTRL::MCSEL::Pll0,
        };
        self.registers.mcctrl.modify(mcsel);
    }

    /// Current main clock source, or `None` for the reserved MCSEL encoding.
    pub fn get_main_clock(&self) -> Option<MainClock> {
        match self.registers.mcctrl.read_as_enum(MCCTRL::MCSEL) {
            Some(MCCTRL::MCSEL::Value::SlowClock) => Some(MainClock::SlowClock),
            Some(MCCTRL::MCSEL::Value::Osc0) => Some(MainClock::Osc0),
            Some(MCCTRL::MCSEL::Value::Pll0) => Some(MainClock::Pll0),
            None => None,
        }
    }
}

#[cfg(test)]
impl Pm {
    /// A power manager backed by a zeroed register block in host memory.
    pub(crate) fn in_memory() -> (Pm, crate::test_util::InMemoryRegisters) {
        let (memory, registers) = crate::test_util::InMemoryRegisters::new::<PmRegisters>();
        (Pm { registers }, memory)
    }
}
