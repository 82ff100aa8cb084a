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

use std::fmt;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

use crate::event::Events;
use crate::source::Source;
use crate::sys;
use crate::{Interest, Token};

/// The caller's single point of suspension.
///
/// A poll owns one selector. Each [`Poll::poll`] call blocks the invoking
/// thread until at least one registered descriptor becomes ready, the
/// timeout elapses, or a [`Waker`] fires, and fills the event batch with
/// what the kernel reported.
///
/// Registrations are edge-triggered without exception: an event reports a
/// *transition* into readiness, so the caller must drain the source (read or
/// write until `WouldBlock`) before another event for the same interest can
/// be expected. See the crate-level documentation.
///
/// Only one thread may call `poll` on a given instance at a time, which the
/// `&mut self` receiver enforces; registrations and wakes may come from any
/// thread concurrently.
///
/// [`Waker`]: crate::Waker
pub struct Poll {
    registry: Registry,
}

/// Handle to a selector's registration operations.
///
/// Obtained from [`Poll::registry`]. A registry can be handed to other
/// threads by reference, or duplicated with [`Registry::try_clone`] when it
/// must outlive the borrow; either way the kernel instance is shared and
/// serializes concurrent use.
pub struct Registry {
    selector: sys::Selector,
}

impl Poll {
    /// Creates a poll with a fresh selector.
    pub fn new() -> io::Result<Poll> {
        let selector = sys::Selector::new()?;
        Ok(Poll { registry: Registry { selector } })
    }

    pub fn registry(&self) -> &Registry { &self.registry }

    /// Blocks until readiness events arrive or `timeout` elapses, then
    /// stores them in `events`.
    ///
    /// The batch is cleared first; afterwards its length is exactly the
    /// number of events the kernel delivered, which is zero on timeout and
    /// bounded by the batch capacity. `None` blocks indefinitely, and a zero
    /// timeout turns the call into a non-blocking readiness check. A wait
    /// interrupted by a signal is transparently restarted.
    pub fn poll(&mut self, events: &mut Events, timeout: Option<Duration>) -> io::Result<()> {
        events.clear();
        self.registry.selector.select(events.sys(), timeout).map(|_| ())
    }
}

impl AsRawFd for Poll {
    fn as_raw_fd(&self) -> RawFd { self.registry.as_raw_fd() }
}

impl fmt::Debug for Poll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poll").field("fd", &self.as_raw_fd()).finish()
    }
}

impl Registry {
    /// Registers a source for the given interest under `token`.
    ///
    /// At most one registration per descriptor exists on a selector;
    /// registering the same descriptor twice fails with `AlreadyExists`.
    pub fn register<S>(&self, source: &mut S, token: Token, interest: Interest) -> io::Result<()>
    where
        S: Source + ?Sized,
    {
        source.register(self, token, interest)
    }

    /// Atomically replaces the token and interest of an existing
    /// registration. Fails with `NotFound` if the source's descriptor is not
    /// registered.
    pub fn reregister<S>(&self, source: &mut S, token: Token, interest: Interest) -> io::Result<()>
    where
        S: Source + ?Sized,
    {
        source.reregister(self, token, interest)
    }

    /// Removes the source's registration. Fails with `NotFound` if it is not
    /// registered.
    ///
    /// Deregister before closing a descriptor that should stay usable;
    /// closing while registered removes the entry as a side effect of the
    /// kernel's own bookkeeping, not as a guarantee of this library.
    pub fn deregister<S>(&self, source: &mut S) -> io::Result<()>
    where
        S: Source + ?Sized,
    {
        source.deregister(self)
    }

    /// Registers a bare descriptor. The caller keeps ownership and must keep
    /// the descriptor open while registered.
    pub fn register_fd(&self, fd: RawFd, token: Token, interest: Interest) -> io::Result<()> {
        self.selector.register(fd, token, interest)
    }

    pub fn reregister_fd(&self, fd: RawFd, token: Token, interest: Interest) -> io::Result<()> {
        self.selector.reregister(fd, token, interest)
    }

    pub fn deregister_fd(&self, fd: RawFd) -> io::Result<()> { self.selector.deregister(fd) }

    /// Duplicates the underlying selector handle.
    ///
    /// The clone owns its descriptor outright and stays valid after the
    /// parent [`Poll`] is gone, while still addressing the same kernel
    /// instance: a registration made through the clone is observed by polls
    /// on the original.
    pub fn try_clone(&self) -> io::Result<Registry> {
        Ok(Registry { selector: self.selector.try_clone()? })
    }
}

impl AsRawFd for Registry {
    fn as_raw_fd(&self) -> RawFd { self.selector.raw() }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("fd", &self.as_raw_fd()).finish()
    }
}
