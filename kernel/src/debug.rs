// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for in-kernel debugging.
//!
//! For printing, this module provides the `debug!()` macro. Output goes to
//! whatever [`IoWrite`] sink the board registered with [`set_debug_writer`].
//! Until a board does so, messages are dropped, which lets chip code log
//! freely during early bring-up before any console exists.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! use kernel::{debug, debug_verbose};
//!
//! debug!("Yes the code gets here with value {}", i);
//! debug_verbose!("got here"); // includes message count and location
//! ```

use core::fmt::{self, Arguments, Write};
use core::ptr::addr_of_mut;

/// Byte sink for debug output.
///
/// Boards implement this on top of whatever console they have (a UART, a
/// semihosting channel, RTT, ...). Returns the number of bytes consumed.
pub trait IoWrite {
    fn write(&mut self, buf: &[u8]) -> usize;
}

struct DebugWriter {
    sink: Option<&'static mut dyn IoWrite>,
    count: usize,
}

impl Write for DebugWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(sink) = self.sink.as_mut() {
            let mut remaining = s.as_bytes();
            while !remaining.is_empty() {
                let written = sink.write(remaining);
                if written == 0 {
                    return Err(fmt::Error);
                }
                remaining = &remaining[written.min(remaining.len())..];
            }
        }
        Ok(())
    }
}

static mut DEBUG_WRITER: DebugWriter = DebugWriter {
    sink: None,
    count: 0,
};

/// Register the sink `debug!()` writes to.
///
/// ## Safety
///
/// Must be called from the single execution context that also issues
/// `debug!()` calls, before any of them run concurrently with this call.
pub unsafe fn set_debug_writer(sink: &'static mut dyn IoWrite) {
    let writer = &mut *addr_of_mut!(DEBUG_WRITER);
    writer.sink = Some(sink);
    writer.count = 0;
}

/// Write a formatted message followed by a line break.
pub fn debug_println(args: Arguments) {
    let writer = unsafe { &mut *addr_of_mut!(DEBUG_WRITER) };
    if writer.sink.is_none() {
        return;
    }
    writer.count += 1;
    let _ = writer.write_fmt(args);
    let _ = writer.write_str("\r\n");
}

/// Write a formatted message prefixed with the message count and source
/// location.
pub fn debug_verbose_println(args: Arguments, file_line: &(&'static str, u32)) {
    let writer = unsafe { &mut *addr_of_mut!(DEBUG_WRITER) };
    if writer.sink.is_none() {
        return;
    }
    writer.count += 1;
    let count = writer.count;
    let (file, line) = *file_line;
    let _ = writer.write_fmt(format_args!("TOCK_DEBUG({}): {}:{}: ", count, file, line));
    let _ = writer.write_fmt(args);
    let _ = writer.write_str("\r\n");
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to mark that a line was hit
        $crate::debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!($msg));
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+));
    });
}

/// In-kernel `println()` debugging that includes the message count and the
/// file and line of the call.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        $crate::debug_verbose!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_verbose_println(format_args!($msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}
