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

use crate::sys::RawEvent;
use crate::Token;

/// Batch of readiness notifications filled by one [`Poll::poll`] call.
///
/// The batch owns a buffer of kernel-native event records with the capacity
/// chosen at construction. Each poll clears and refills it; at most
/// `capacity` events are delivered per call, so a small capacity on a busy
/// poll simply spreads delivery over more calls.
///
/// [`Poll::poll`]: crate::Poll::poll
pub struct Events {
    inner: Vec<RawEvent>,
}

impl Events {
    pub fn with_capacity(capacity: usize) -> Events {
        Events { inner: Vec::with_capacity(capacity) }
    }

    pub fn capacity(&self) -> usize { self.inner.capacity() }

    /// Number of events delivered by the last poll.
    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    pub fn clear(&mut self) { self.inner.clear() }

    pub fn iter(&self) -> Iter<'_> {
        Iter { events: self, pos: 0 }
    }

    /// The event at `index`, if the last poll delivered that many.
    pub fn get(&self, index: usize) -> Option<Event<'_>> {
        self.inner.get(index).map(Event::new)
    }

    /// The raw buffer the selector fills.
    pub(crate) fn sys(&mut self) -> &mut Vec<RawEvent> { &mut self.inner }
}

impl<'a> IntoIterator for &'a Events {
    type Item = Event<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> { self.iter() }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over the events of a batch.
#[derive(Debug)]
pub struct Iter<'a> {
    events: &'a Events,
    pos: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        let raw = self.events.inner.get(self.pos)?;
        self.pos += 1;
        Some(Event::new(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.events.inner.len() - self.pos;
        (rest, Some(rest))
    }
}

/// Read-only view of a single readiness notification.
///
/// Views borrow from the [`Events`] batch and go stale at the next poll on
/// the same batch; the borrow checker enforces that they are not kept around
/// across it.
#[derive(Copy, Clone)]
pub struct Event<'a> {
    raw: &'a RawEvent,
}

impl<'a> Event<'a> {
    pub(crate) fn new(raw: &'a RawEvent) -> Event<'a> { Event { raw } }

    /// The token supplied when the descriptor was registered.
    pub fn token(&self) -> Token { Token(self.raw.u64) }

    pub fn is_readable(&self) -> bool { self.contains(libc::EPOLLIN) }

    pub fn is_writable(&self) -> bool { self.contains(libc::EPOLLOUT) }

    pub fn is_error(&self) -> bool { self.contains(libc::EPOLLERR) }

    /// The peer shut down its writing side, or the connection is gone.
    pub fn is_read_closed(&self) -> bool {
        self.contains(libc::EPOLLHUP) || self.contains(libc::EPOLLRDHUP)
    }

    /// The writing side is no longer usable.
    ///
    /// Also true on a bare error condition; combine with [`Event::is_error`]
    /// to tell an orderly hang-up from a failure.
    pub fn is_write_closed(&self) -> bool {
        self.contains(libc::EPOLLHUP) || self.contains(libc::EPOLLERR)
    }

    pub fn is_priority(&self) -> bool { self.contains(libc::EPOLLPRI) }

    fn contains(&self, flag: libc::c_int) -> bool {
        let events = self.raw.events;
        events & flag as u32 != 0
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("token", &self.token())
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .field("error", &self.is_error())
            .field("read_closed", &self.is_read_closed())
            .field("write_closed", &self.is_write_closed())
            .field("priority", &self.is_priority())
            .finish()
    }
}
