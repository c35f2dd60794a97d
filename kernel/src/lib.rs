// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Shared support for chip crates.
//!
//! This crate holds the pieces every chip driver in the workspace leans on:
//! the register interface re-exports and [`StaticRef`](utilities::StaticRef)
//! for reaching memory-mapped peripherals, the standard [`ErrorCode`] used in
//! `Result` returns, and the [`debug!`] macro for kernel console output.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod debug;
pub mod utilities;

mod errorcode;

pub use crate::errorcode::ErrorCode;
