// Low-level I/O readiness and event notification library for Unix-like systems
//
// SPDX-License-Identifier: Apache-2.0
//
// Copyright 2024-2025 iopoll contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Low-level I/O readiness for Unix-like systems.
//!
//! The library multiplexes readiness notifications for a heterogeneous set of
//! kernel descriptors: stream and datagram sockets, Unix-domain sockets,
//! anonymous pipes, and any descriptor the caller brings along. It never
//! performs I/O on the caller's behalf; a [`Poll::poll`] call reports *which*
//! registered descriptors are ready and the caller does the reads and writes
//! on the owning wrapper.
//!
//! # Edge-triggered semantics
//!
//! All registrations are edge-triggered. An event signals the *transition*
//! into readiness, not the state itself: once a source has been reported
//! readable, no further readable event arrives until the caller has drained
//! it to `WouldBlock` and new data comes in. The same holds for writability.
//! Code that stops reading while bytes are still buffered in the kernel will
//! wait forever. Drain every source you are woken for.
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Write};
//! use std::time::Duration;
//!
//! use iopoll::{Events, Interest, Poll, Token};
//!
//! const CHANNEL: Token = Token(0);
//!
//! # fn main() -> std::io::Result<()> {
//! let mut poll = Poll::new()?;
//! let (mut tx, mut rx) = iopoll::pipe::new()?;
//! poll.registry().register(&mut rx, CHANNEL, Interest::READABLE)?;
//!
//! tx.write_all(b"ping")?;
//!
//! let mut events = Events::with_capacity(16);
//! poll.poll(&mut events, Some(Duration::from_millis(500)))?;
//!
//! for event in &events {
//!     if event.token() == CHANNEL && event.is_readable() {
//!         let mut buf = [0u8; 16];
//!         let n = rx.read(&mut buf)?;
//!         assert_eq!(&buf[..n], b"ping");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Threads
//!
//! A single [`Poll`] may only be driven from one thread at a time, but
//! registrations through its [`Registry`] (or a [`Registry::try_clone`]) and
//! [`Waker::wake`] calls are safe from any thread; the kernel instance is the
//! synchronization point. A parked poll is interrupted by waking a [`Waker`]
//! registered with it.
//!
//! # Errors
//!
//! Every fallible operation returns [`std::io::Result`]. Short reads and
//! writes are not errors, end-of-stream is a zero-length read, and
//! `WouldBlock` means "come back after the next readiness event". Nothing in
//! this crate panics on kernel errors; misuse such as registering a closed
//! descriptor surfaces whatever the kernel reports.

#![deny(missing_debug_implementations)]

#[cfg(not(unix))]
compile_error!("this library speaks to Unix kernel facilities and only builds on Unix targets");

mod event;
mod fd;
mod interest;
mod poll;
mod source;
mod sys;
mod token;
mod waker;

pub mod net;
pub mod pipe;
pub mod uds;

pub use event::{Event, Events, Iter};
pub use fd::Fd;
pub use interest::Interest;
pub use poll::{Poll, Registry};
pub use source::{Source, SourceFd};
pub use token::Token;
pub use waker::Waker;
