//! crates/platform/src/lib.rs
//!
//! # Overview
//!
//! `platform` isolates every unsafe system call used by the workspace. Higher
//! crates (`fd_io`, `logging-sink`) deny `unsafe_code` and reach the kernel
//! only through the safe wrappers exported here.
//!
//! # Design
//!
//! Each wrapper issues exactly one system call and translates a negative
//! return value into [`std::io::Error::last_os_error`]. Nothing here retries,
//! loops over partial transfers, or swallows `EINTR`: the callers own those
//! policies.
//!
//! # Platform Support
//!
//! Raw descriptors are a Unix concept, so the crate is empty on other targets.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

#[cfg(unix)]
pub mod fd;

#[cfg(unix)]
pub use fd::{close, dup, is_open, pipe, read, socketpair, write};
