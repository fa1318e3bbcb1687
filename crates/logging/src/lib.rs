#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` holds the vocabulary shared by every log sink in the workspace:
//! the ten-level [`Priority`] scale, the per-sink [`SinkConfig`], the
//! millisecond [`Timestamp`] stamped on each line, and the [`ReentrantLock`]
//! that serialises line assembly and emission.
//!
//! The sinks themselves live in the `logging-sink` crate so this crate stays
//! free of I/O.
//!
//! # Design
//!
//! - [`Priority`] is ordered most severe first. A sink whose threshold is `T`
//!   emits a message of priority `P` exactly when `P.ordinal() <= T.ordinal()`;
//!   [`Priority::passes`] encodes that rule once.
//! - Priority names live in a `const` table owned by the type, so no runtime
//!   registration step is needed before a sink is constructed.
//! - [`ReentrantLock`] lets one thread acquire the same lock repeatedly, which
//!   a message assembled across several calls requires, while still excluding
//!   other threads.
//!
//! # Errors
//!
//! [`LogError`] covers unknown priority names, use of a closed sink, log-file
//! open failures, and write failures. [`LockError`] reports a thread
//! releasing a [`ReentrantLock`] it does not own.
//!
//! # Examples
//!
//! ```
//! use logging::{Priority, SinkConfig};
//!
//! let config = SinkConfig::default().with_threshold(Priority::Warn);
//! assert!(Priority::Error.passes(config.threshold));
//! assert!(!Priority::Notice.passes(config.threshold));
//!
//! let parsed: Priority = "DEBUG1".parse().unwrap();
//! assert_eq!(parsed, Priority::Debug1);
//! assert!("debug1".parse::<Priority>().is_err());
//! ```

mod config;
mod error;
mod priority;
mod reentrant_lock;
mod timestamp;

pub use config::SinkConfig;
pub use error::{LockError, LogError, LogResult};
pub use priority::Priority;
pub use reentrant_lock::{ReentrantGuard, ReentrantLock};
pub use timestamp::Timestamp;
