//! crates/fd_io/src/stream/mod.rs
//!
//! `std::io` façades over the descriptor buffers.
//!
//! Each façade binds exactly one buffer and carries [`StreamFlags`], the
//! sticky end-of-file and failure bits consumers inspect after a read or
//! write. The helpers in this module implement the trait plumbing once for
//! any buffer exposing the [`Refill`] or [`WriteThrough`] capability.

mod duplex;
mod input;
mod output;

pub use duplex::{CountedDuplexStream, DuplexStream};
pub use input::{CountedInputStream, InputStream};
pub use output::{CountedOutputStream, OutputStream};

use std::io;

use crate::error::FdError;
use crate::read_buffer::{Fill, Refill};
use crate::write_buffer::WriteThrough;

/// Sticky stream state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamFlags {
    /// A read hit end of file, or the stream was read while detached.
    pub eof: bool,
    /// An operation failed.
    pub fail: bool,
}

impl StreamFlags {
    /// Neither flag is set.
    pub const fn good(self) -> bool {
        !self.eof && !self.fail
    }
}

fn fail(flags: &mut StreamFlags, err: FdError) -> io::Error {
    flags.fail = true;
    err.into()
}

pub(super) fn read_with<B>(buffer: &mut B, flags: &mut StreamFlags, out: &mut [u8]) -> io::Result<usize>
where
    B: Refill,
{
    match buffer.read_into(out) {
        Ok(0) if !out.is_empty() => {
            flags.eof = true;
            Ok(0)
        }
        Ok(read) => Ok(read),
        Err(err) => Err(fail(flags, err)),
    }
}

pub(super) fn fill_with<'a, B>(buffer: &'a mut B, flags: &mut StreamFlags) -> io::Result<&'a [u8]>
where
    B: Refill,
{
    if buffer.window().available() == 0 {
        match buffer.refill() {
            Ok(Fill::Ready(_)) => {}
            Ok(Fill::Eof | Fill::Detached) => flags.eof = true,
            Err(err) => return Err(fail(flags, err)),
        }
    }
    Ok(buffer.window().buffered())
}

pub(super) fn get_with<B>(buffer: &mut B, flags: &mut StreamFlags) -> io::Result<Option<u8>>
where
    B: Refill,
{
    match buffer.next_byte() {
        Ok(None) => {
            flags.eof = true;
            Ok(None)
        }
        Ok(byte) => Ok(byte),
        Err(err) => Err(fail(flags, err)),
    }
}

pub(super) fn peek_with<B>(buffer: &mut B, flags: &mut StreamFlags) -> io::Result<Option<u8>>
where
    B: Refill,
{
    match buffer.peek_byte() {
        Ok(None) => {
            flags.eof = true;
            Ok(None)
        }
        Ok(byte) => Ok(byte),
        Err(err) => Err(fail(flags, err)),
    }
}

pub(super) fn unget_with<B>(buffer: &mut B, flags: &mut StreamFlags) -> bool
where
    B: Refill,
{
    let stepped = buffer.window_mut().unget();
    if stepped {
        flags.eof = false;
    } else {
        flags.fail = true;
    }
    stepped
}

pub(super) fn putback_with<B>(buffer: &mut B, flags: &mut StreamFlags, byte: u8) -> bool
where
    B: Refill,
{
    let stepped = buffer.window_mut().putback(byte);
    if stepped {
        flags.eof = false;
    } else {
        flags.fail = true;
    }
    stepped
}

pub(super) fn write_with<B>(buffer: &mut B, flags: &mut StreamFlags, bytes: &[u8]) -> io::Result<usize>
where
    B: WriteThrough,
{
    buffer
        .write_through(bytes)
        .map_err(|err| fail(flags, err))
}

pub(super) fn put_with<B>(buffer: &mut B, flags: &mut StreamFlags, byte: u8) -> io::Result<()>
where
    B: WriteThrough,
{
    buffer.write_byte(byte).map_err(|err| fail(flags, err))
}
