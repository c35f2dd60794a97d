// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host-side stand-in for memory-mapped register blocks.

use core::mem::size_of;
use kernel::utilities::StaticRef;
use std::vec;
use std::vec::Vec;

/// A zero-initialised register block living in host memory.
///
/// Drivers see it through an ordinary `StaticRef`, so the exact same
/// bit-field code that runs on hardware runs in tests. The test side keeps
/// word-level access to play the part of the hardware, for instance by
/// raising ready bits in a read-only status register.
///
/// The backing memory is leaked, which keeps the `StaticRef` valid for the
/// rest of the test process.
pub(crate) struct InMemoryRegisters {
    base: *mut u32,
    words: usize,
}

impl InMemoryRegisters {
    pub(crate) fn new<T>() -> (InMemoryRegisters, StaticRef<T>) {
        assert_eq!(size_of::<T>() % 4, 0);
        let words = size_of::<T>() / 4;
        let base = vec![0u32; words].leak().as_mut_ptr();
        let registers = unsafe { StaticRef::new(base.cast_const().cast::<T>()) };
        (InMemoryRegisters { base, words }, registers)
    }

    pub(crate) fn word(&self, offset: usize) -> u32 {
        assert!(offset / 4 < self.words);
        unsafe { self.base.add(offset / 4).read_volatile() }
    }

    pub(crate) fn set_word(&self, offset: usize, value: u32) {
        assert!(offset / 4 < self.words);
        unsafe { self.base.add(offset / 4).write_volatile(value) }
    }

    pub(crate) fn set_bits(&self, offset: usize, mask: u32) {
        self.set_word(offset, self.word(offset) | mask);
    }

    /// Every word of the block, in address order.
    pub(crate) fn snapshot(&self) -> Vec<u32> {
        (0..self.words).map(|i| self.word(i * 4)).collect()
    }
}
