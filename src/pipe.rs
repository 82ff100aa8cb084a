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

//! Anonymous pipe endpoints.
//!
//! [`new`] produces both ends non-blocking and close-on-exec. Dropping the
//! [`Sender`] makes the [`Receiver`] observe end-of-stream: a read-closed
//! event followed by a zero-length read.

use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};

use crate::fd::Fd;
use crate::source::Source;
use crate::sys::syscall;
use crate::{Interest, Registry, Token};

/// Creates an anonymous pipe, returning the write and read ends.
pub fn new() -> io::Result<(Sender, Receiver)> {
    let mut fds = [0 as libc::c_int; 2];
    syscall!(pipe2(fds.as_mut_ptr(), libc::O_NONBLOCK | libc::O_CLOEXEC))?;
    Ok((Sender { fd: Fd::from_raw(fds[1]) }, Receiver { fd: Fd::from_raw(fds[0]) }))
}

/// The writing end of a pipe.
#[derive(Debug)]
pub struct Sender {
    fd: Fd,
}

/// The reading end of a pipe.
#[derive(Debug)]
pub struct Receiver {
    fd: Fd,
}

fn set_nonblocking(fd: RawFd, enable: bool) -> io::Result<()> {
    let flags = syscall!(fcntl(fd, libc::F_GETFL))?;
    let flags = if enable { flags | libc::O_NONBLOCK } else { flags & !libc::O_NONBLOCK };
    syscall!(fcntl(fd, libc::F_SETFL, flags)).map(|_| ())
}

impl Sender {
    pub fn set_nonblocking(&self, enable: bool) -> io::Result<()> {
        set_nonblocking(self.fd.raw(), enable)
    }
}

impl Receiver {
    pub fn set_nonblocking(&self, enable: bool) -> io::Result<()> {
        set_nonblocking(self.fd.raw(), enable)
    }
}

impl Write for Sender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { (&*self).write(buf) }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Write for &Sender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n =
            syscall!(write(self.fd.raw(), buf.as_ptr() as *const libc::c_void, buf.len()))?;
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Read for Receiver {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { (&*self).read(buf) }
}

impl Read for &Receiver {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n =
            syscall!(read(self.fd.raw(), buf.as_mut_ptr() as *mut libc::c_void, buf.len()))?;
        Ok(n as usize)
    }
}

impl AsRawFd for Sender {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for Sender {
    unsafe fn from_raw_fd(fd: RawFd) -> Sender { Sender { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for Sender {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl AsRawFd for Receiver {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for Receiver {
    unsafe fn from_raw_fd(fd: RawFd) -> Receiver { Receiver { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for Receiver {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl Source for Sender {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interest: Interest,
    ) -> io::Result<()> {
        registry.register_fd(self.fd.raw(), token, interest)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interest: Interest,
    ) -> io::Result<()> {
        registry.reregister_fd(self.fd.raw(), token, interest)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        registry.deregister_fd(self.fd.raw())
    }
}

impl Source for Receiver {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interest: Interest,
    ) -> io::Result<()> {
        registry.register_fd(self.fd.raw(), token, interest)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interest: Interest,
    ) -> io::Result<()> {
        registry.reregister_fd(self.fd.raw(), token, interest)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        registry.deregister_fd(self.fd.raw())
    }
}
