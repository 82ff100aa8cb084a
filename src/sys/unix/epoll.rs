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
use std::os::unix::io::RawFd;
use std::ptr;
use std::time::Duration;

use crate::fd::Fd;
use crate::sys::syscall;
use crate::{Interest, Token};

pub(crate) type RawEvent = libc::epoll_event;

/// Reactor over a kernel epoll instance.
///
/// Registrations are unconditionally edge-triggered; the wait call retries
/// on signal interruption. All operations take `&self` since the kernel
/// instance is the serialization point.
#[derive(Debug)]
pub(crate) struct Selector {
    ep: Fd,
}

impl Selector {
    pub(crate) fn new() -> io::Result<Selector> {
        let ep = syscall!(epoll_create1(libc::EPOLL_CLOEXEC))?;
        #[cfg(feature = "log")]
        log::debug!(target: "iopoll", "created selector, epoll fd {}", ep);
        Ok(Selector { ep: Fd::from_raw(ep) })
    }

    /// Duplicates the epoll descriptor. Both handles address the same kernel
    /// instance and therefore the same registration set.
    pub(crate) fn try_clone(&self) -> io::Result<Selector> {
        let ep = syscall!(fcntl(self.ep.raw(), libc::F_DUPFD_CLOEXEC, 3))?;
        Ok(Selector { ep: Fd::from_raw(ep) })
    }

    pub(crate) fn register(&self, fd: RawFd, token: Token, interest: Interest) -> io::Result<()> {
        #[cfg(feature = "log")]
        log::trace!(
            target: "iopoll",
            "registering fd {} with {:?}, interest {:?}", fd, token, interest
        );
        let mut ev = RawEvent { events: interest_to_epoll(interest), u64: token.0 };
        syscall!(epoll_ctl(self.ep.raw(), libc::EPOLL_CTL_ADD, fd, &mut ev)).map(|_| ())
    }

    pub(crate) fn reregister(&self, fd: RawFd, token: Token, interest: Interest) -> io::Result<()> {
        #[cfg(feature = "log")]
        log::trace!(
            target: "iopoll",
            "re-registering fd {} with {:?}, interest {:?}", fd, token, interest
        );
        let mut ev = RawEvent { events: interest_to_epoll(interest), u64: token.0 };
        syscall!(epoll_ctl(self.ep.raw(), libc::EPOLL_CTL_MOD, fd, &mut ev)).map(|_| ())
    }

    pub(crate) fn deregister(&self, fd: RawFd) -> io::Result<()> {
        #[cfg(feature = "log")]
        log::trace!(target: "iopoll", "deregistering fd {}", fd);
        syscall!(epoll_ctl(self.ep.raw(), libc::EPOLL_CTL_DEL, fd, ptr::null_mut())).map(|_| ())
    }

    /// Waits for events and fills `events` up to its capacity, returning the
    /// number delivered. `None` waits indefinitely. Interruption by a signal
    /// restarts the wait.
    pub(crate) fn select(
        &self,
        events: &mut Vec<RawEvent>,
        timeout: Option<Duration>,
    ) -> io::Result<usize> {
        events.clear();
        if events.capacity() == 0 {
            // The kernel rejects a zero-sized wait with EINVAL; the contract
            // here is an empty batch.
            return Ok(0);
        }

        let timeout_ms = match timeout {
            None => -1,
            Some(to) => duration_to_ms(to),
        };
        let capacity = events.capacity().min(libc::c_int::MAX as usize) as libc::c_int;

        loop {
            let res = syscall!(epoll_wait(
                self.ep.raw(),
                events.as_mut_ptr(),
                capacity,
                timeout_ms,
            ));
            match res {
                Ok(n) => {
                    unsafe { events.set_len(n as usize) };
                    return Ok(n as usize);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub(crate) fn raw(&self) -> RawFd { self.ep.raw() }
}

/// Sub-millisecond remainders round up so a short timeout cannot degrade
/// into a busy spin at zero.
fn duration_to_ms(to: Duration) -> libc::c_int {
    let ms = to
        .as_secs()
        .saturating_mul(1_000)
        .saturating_add((u64::from(to.subsec_nanos()) + 999_999) / 1_000_000);
    ms.min(libc::c_int::MAX as u64) as libc::c_int
}

fn interest_to_epoll(interest: Interest) -> u32 {
    let mut flags = libc::EPOLLET;
    if interest.is_readable() {
        flags |= libc::EPOLLIN | libc::EPOLLRDHUP;
    }
    if interest.is_writable() {
        flags |= libc::EPOLLOUT;
    }
    if interest.is_priority() {
        flags |= libc::EPOLLPRI;
    }
    flags as u32
}

#[cfg(test)]
mod test {
    use super::{duration_to_ms, interest_to_epoll};
    use crate::Interest;
    use std::time::Duration;

    #[test]
    fn edge_triggered_is_unconditional() {
        let et = libc::EPOLLET as u32;
        assert_eq!(interest_to_epoll(Interest::NONE), et);
        assert_ne!(interest_to_epoll(Interest::READABLE) & et, 0);
    }

    #[test]
    fn interest_translation() {
        let read = interest_to_epoll(Interest::READABLE);
        assert_ne!(read & libc::EPOLLIN as u32, 0);
        assert_ne!(read & libc::EPOLLRDHUP as u32, 0);
        assert_eq!(read & libc::EPOLLOUT as u32, 0);

        let write = interest_to_epoll(Interest::WRITABLE);
        assert_ne!(write & libc::EPOLLOUT as u32, 0);
        assert_eq!(write & libc::EPOLLIN as u32, 0);

        let pri = interest_to_epoll(Interest::PRIORITY);
        assert_ne!(pri & libc::EPOLLPRI as u32, 0);
    }

    #[test]
    fn timeout_conversion_rounds_up() {
        assert_eq!(duration_to_ms(Duration::from_millis(10)), 10);
        assert_eq!(duration_to_ms(Duration::from_micros(100)), 1);
        assert_eq!(duration_to_ms(Duration::ZERO), 0);
        assert_eq!(duration_to_ms(Duration::from_secs(u64::MAX)), libc::c_int::MAX);
    }
}
