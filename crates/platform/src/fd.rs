//! crates/platform/src/fd.rs
//! Single-shot descriptor syscalls.

use std::io;
use std::os::fd::RawFd;

/// Reads up to `buf.len()` bytes from `fd` with one `read(2)` call.
///
/// Returns `Ok(0)` at end of file.
pub fn read(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    // SAFETY: `buf` is a valid, writable slice for `buf.len()` bytes. An
    // invalid descriptor is reported by the kernel as EBADF.
    let result = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result as usize)
    }
}

/// Writes `buf` to `fd` with one `write(2)` call and returns the count the
/// kernel accepted, which may be short.
pub fn write(fd: RawFd, buf: &[u8]) -> io::Result<usize> {
    // SAFETY: `buf` is a valid, readable slice for `buf.len()` bytes.
    let result = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result as usize)
    }
}

/// Closes `fd`.
pub fn close(fd: RawFd) -> io::Result<()> {
    // SAFETY: closing an integer descriptor has no memory-safety
    // preconditions; ownership is tracked by the caller.
    let result = unsafe { libc::close(fd) };
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Duplicates `fd` onto the lowest free descriptor number.
pub fn dup(fd: RawFd) -> io::Result<RawFd> {
    // SAFETY: `dup` only inspects the descriptor table.
    let result = unsafe { libc::dup(fd) };
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result)
    }
}

/// Creates an anonymous pipe and returns `(read_end, write_end)`.
pub fn pipe() -> io::Result<(RawFd, RawFd)> {
    let mut fds = [-1 as libc::c_int; 2];
    // SAFETY: `fds` provides storage for exactly the two descriptors
    // `pipe(2)` writes.
    let result = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok((fds[0], fds[1]))
    }
}

/// Creates a connected pair of Unix stream sockets.
///
/// Both ends are bidirectional, which makes the pair the natural fixture for
/// duplex streams.
pub fn socketpair() -> io::Result<(RawFd, RawFd)> {
    let mut fds = [-1 as libc::c_int; 2];
    // SAFETY: `fds` provides storage for the two descriptors written by
    // `socketpair(2)`.
    let result =
        unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, fds.as_mut_ptr()) };
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok((fds[0], fds[1]))
    }
}

/// Reports whether `fd` currently names an open descriptor.
pub fn is_open(fd: RawFd) -> bool {
    if fd < 0 {
        return false;
    }
    // SAFETY: F_GETFD only queries descriptor flags.
    unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};
    use std::os::fd::AsRawFd;

    #[test]
    fn pipe_transfers_bytes() {
        let (rd, wr) = pipe().unwrap();
        assert_eq!(write(wr, b"hello").unwrap(), 5);

        let mut buf = [0u8; 16];
        let n = read(rd, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");

        close(rd).unwrap();
        close(wr).unwrap();
    }

    #[test]
    fn read_returns_zero_after_writer_closes() {
        let (rd, wr) = pipe().unwrap();
        close(wr).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(read(rd, &mut buf).unwrap(), 0);
        close(rd).unwrap();
    }

    /// Descriptor number no process can hold.
    const BOGUS_FD: RawFd = RawFd::MAX;

    #[test]
    fn read_on_invalid_descriptor_reports_ebadf() {
        let mut buf = [0u8; 4];
        let err = read(BOGUS_FD, &mut buf).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn write_on_invalid_descriptor_reports_ebadf() {
        let err = write(BOGUS_FD, b"x").unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn close_on_invalid_descriptor_fails() {
        assert!(close(BOGUS_FD).is_err());
    }

    #[test]
    fn is_open_distinguishes_live_descriptors() {
        let (rd, wr) = pipe().unwrap();
        assert!(is_open(rd));
        assert!(is_open(wr));
        assert!(!is_open(-1));
        assert!(!is_open(BOGUS_FD));
        close(rd).unwrap();
        close(wr).unwrap();
    }

    #[test]
    fn socketpair_is_bidirectional() {
        let (a, b) = socketpair().unwrap();
        write(a, b"ping").unwrap();
        write(b, b"pong").unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(read(b, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"ping");
        assert_eq!(read(a, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"pong");

        close(a).unwrap();
        close(b).unwrap();
    }

    #[test]
    fn dup_shares_file_offset() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let copy = dup(file.as_raw_fd()).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(read(copy, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(file.stream_position().unwrap(), 4);
        close(copy).unwrap();
    }
}
