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
use std::mem;
use std::os::unix::io::RawFd;

use crate::fd::Fd;
use crate::sys::syscall;

/// Wakeup object over an eventfd counter.
///
/// Writes increment the counter, a read returns and zeroes it, so any number
/// of wakes between drains collapses into a single readable state.
#[derive(Debug)]
pub(crate) struct WakerFd {
    fd: Fd,
}

impl WakerFd {
    pub(crate) fn new() -> io::Result<WakerFd> {
        let fd = syscall!(eventfd(0, libc::EFD_CLOEXEC | libc::EFD_NONBLOCK))?;
        #[cfg(feature = "log")]
        log::debug!(target: "iopoll", "created waker, eventfd {}", fd);
        Ok(WakerFd { fd: Fd::from_raw(fd) })
    }

    pub(crate) fn raw(&self) -> RawFd { self.fd.raw() }

    pub(crate) fn wake(&self) -> io::Result<()> {
        let val: u64 = 1;
        let res = syscall!(write(
            self.fd.raw(),
            &val as *const u64 as *const libc::c_void,
            mem::size_of::<u64>(),
        ));
        match res {
            Ok(_) => Ok(()),
            // A saturated counter means the descriptor is already readable,
            // which is all a wake has to guarantee.
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn drain(&self) {
        let mut val: u64 = 0;
        let _ = syscall!(read(
            self.fd.raw(),
            &mut val as *mut u64 as *mut libc::c_void,
            mem::size_of::<u64>(),
        ));
    }
}
