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

use std::io;
use std::sync::Arc;

use crate::source::Source;
use crate::sys;
use crate::{Interest, Registry, Token};

/// Cross-thread interrupt for a parked [`Poll::poll`].
///
/// The waker owns an event-counter descriptor registered with
/// [`Interest::READABLE`] under the caller's token. [`Waker::wake`] may be
/// called from any thread and makes the descriptor readable, ending the
/// peer's wait; cloning is cheap and shares the same descriptor.
///
/// Wakes coalesce: because the underlying counter sums writes, any number of
/// `wake` calls before a [`Waker::drain`] delivers at most one readiness
/// event.
///
/// [`Poll::poll`]: crate::Poll::poll
#[derive(Clone, Debug)]
pub struct Waker {
    inner: Arc<sys::WakerFd>,
}

impl Waker {
    /// Creates the wakeup descriptor and registers it with `registry` under
    /// `token`.
    pub fn new(registry: &Registry, token: Token) -> io::Result<Waker> {
        let inner = sys::WakerFd::new()?;
        registry.register_fd(inner.raw(), token, Interest::READABLE)?;
        Ok(Waker { inner: Arc::new(inner) })
    }

    /// Makes the waker's descriptor readable.
    ///
    /// Safe to call from any thread. A saturated counter is success; any
    /// other write failure means the descriptor is broken and is surfaced.
    pub fn wake(&self) -> io::Result<()> { self.inner.wake() }

    /// Clears the readiness signal so later wakes produce a fresh event.
    /// Read errors are ignored; there may simply be nothing pending.
    pub fn drain(&self) { self.inner.drain() }
}

impl Source for Waker {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interest: Interest,
    ) -> io::Result<()> {
        registry.register_fd(self.inner.raw(), token, interest)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interest: Interest,
    ) -> io::Result<()> {
        registry.reregister_fd(self.inner.raw(), token, interest)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        registry.deregister_fd(self.inner.raw())
    }
}
