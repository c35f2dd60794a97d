// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral implementations for the AVR32 UC3 clock system.
//!
//! The power manager ([`pm`]) and flash controller ([`flashc`]) register
//! blocks are wrapped by thin register-level types. The [`clocks`] module
//! builds the oscillator, PLL, generic clock and CPU clock drivers on top of
//! them, along with a bring-up helper for boards.
//!
//! All of this is meant to run once, from the reset handler, before
//! interrupts are enabled. None of the types here are `Sync`.

#![crate_name = "uc3"]
#![crate_type = "rlib"]
#![no_std]

#[cfg(test)]
extern crate std;

pub mod clocks;
pub mod flashc;
pub mod pm;

#[cfg(test)]
pub(crate) mod test_util;
