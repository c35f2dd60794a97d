// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Flash controller (FLASHC) wait-state control.
//!
//! Only the flash wait-state bit of the control register is exposed. Above
//! [`FLASH_WAIT_STATE_THRESHOLD_HZ`] the flash array needs one extra access
//! cycle, so the wait state must be in place before the CPU is switched to a
//! faster clock.

use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    FlashcRegisters {
        /// Flash control register
        (0x000 => fcr: ReadWrite<u32, FCR::Register>),
        (0x004 => @END),
    }
}

register_bitfields![u32,
    FCR [
        /// Sense amplifier sampling disable
        SASD OFFSET(8) NUMBITS(1) [],
        /// Flash wait state
        FWS OFFSET(6) NUMBITS(1) [
            ZeroWaitState = 0,
            OneWaitState = 1
        ],
        /// Programming error interrupt enable
        PROGE OFFSET(3) NUMBITS(1) [],
        /// Lock error interrupt enable
        LOCKE OFFSET(2) NUMBITS(1) [],
        /// Flash ready interrupt enable
        FRDY OFFSET(0) NUMBITS(1) []
    ]
];

const FLASHC_BASE: StaticRef<FlashcRegisters> =
    unsafe { StaticRef::new(0xFFFE_1400 as *const FlashcRegisters) };

/// Highest CPU frequency, in Hz, the flash supports without a wait state.
pub const FLASH_WAIT_STATE_THRESHOLD_HZ: u32 = 30_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlashWaitState {
    ZeroWaitState,
    OneWaitState,
}

pub struct Flashc {
    registers: StaticRef<FlashcRegisters>,
}

impl Flashc {
    pub const fn new() -> Flashc {
        Flashc {
            registers: FLASHC_BASE,
        }
    }

    pub fn set_wait_state(&self, wait_state: FlashWaitState) {
        let fws = match wait_state {
            FlashWaitState::ZeroWaitState => FCR::FWS::ZeroWaitState,
            FlashWaitState::OneWaitState => FCR::FWS::OneWaitState,
        };
        self.registers.fcr.modify(fws);
    }

    pub fn get_wait_state(&self) -> FlashWaitState {
        if self.registers.fcr.is_set(FCR::FWS) {
            FlashWaitState::OneWaitState
        } else {
            FlashWaitState::ZeroWaitState
        }
    }
}

#[cfg(test)]
impl Flashc {
    pub(crate) fn in_memory() -> (Flashc, crate::test_util::InMemoryRegisters) {
        let (memory, registers) = crate::test_util::InMemoryRegisters::new::<FlashcRegisters>();
        (Flashc { registers }, memory)
    }
}
