//! The `deferredregex` crate provides [`DeferredRegex`], a regular
//! expression which is compiled the first time it is used rather
//! than when it is declared.
//!
//! Compiling a regular expression is not free, and programs often
//! declare many more of them than any single run will execute.  A
//! `DeferredRegex` can be declared in a `static`, or loaded from a
//! configuration file or a command-line flag, without paying for the
//! compilation until a match is actually attempted.
//!
//! ```
//! use deferredregex::DeferredRegex;
//!
//! static VERSION: DeferredRegex = DeferredRegex::new(r"([0-9]+)\.([0-9]+)\.([0-9]+)");
//!
//! assert!(!VERSION.is_compiled());
//! assert_eq!(VERSION.find_str("release 1.2.3"), Some("1.2.3"));
//! assert!(VERSION.is_compiled());
//! ```
//!
//! Like `Regex::new(...).unwrap()` the operations which trigger
//! compilation panic if the pattern is invalid, so a `DeferredRegex`
//! is intended for patterns which are known to be valid.  Use
//! [`DeferredRegex::try_compiled`] when the pattern comes from
//! somewhere less trustworthy.
#![deny(unreachable_pub)]
#![deny(unsafe_code)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::wildcard_imports)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // fix soon
#![allow(clippy::missing_panics_doc)] // fix soon

mod bytes;
mod compile;
mod deferred;
mod error;
mod prefix;
mod text;

pub use compile::Compile;
pub use deferred::DeferredRegex;
pub use error::Unsupported;

/// A [`DeferredRegex`] which searches byte strings instead of `&str`.
pub type DeferredBytesRegex = DeferredRegex<regex::bytes::Regex>;
