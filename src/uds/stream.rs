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

use std::io::{self, IoSlice, IoSliceMut, Read, Write};
use std::net::Shutdown;
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::path::Path;

use socket2::{Domain, SockAddr, Socket, Type};

use crate::fd::Fd;
use crate::net;
use crate::source::Source;
use crate::sys::syscall;
use crate::{Interest, Registry, Token};

/// Non-blocking Unix-domain stream.
#[derive(Debug)]
pub struct UnixStream {
    fd: Fd,
}

impl UnixStream {
    /// Starts a non-blocking connect to the socket file at `path`.
    pub fn connect<P: AsRef<Path>>(path: P) -> io::Result<UnixStream> {
        let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
        socket.set_nonblocking(true)?;
        match socket.connect(&SockAddr::unix(path)?) {
            Ok(()) => {}
            Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(e),
        }
        Ok(UnixStream { fd: Fd::from_raw(socket.into_raw_fd()) })
    }

    /// A pair of connected, non-blocking streams.
    pub fn pair() -> io::Result<(UnixStream, UnixStream)> {
        let mut fds = [0 as libc::c_int; 2];
        syscall!(socketpair(
            libc::AF_UNIX,
            libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            0,
            fds.as_mut_ptr(),
        ))?;
        Ok((UnixStream { fd: Fd::from_raw(fds[0]) }, UnixStream { fd: Fd::from_raw(fds[1]) }))
    }

    pub fn peek(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = syscall!(recv(
            self.fd.raw(),
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
            libc::MSG_PEEK,
        ))?;
        Ok(n as usize)
    }

    pub fn shutdown(&self, how: Shutdown) -> io::Result<()> { net::shutdown(self.fd.raw(), how) }

    pub fn peer_addr(&self) -> io::Result<SockAddr> { net::peer_addr(self.fd.raw()) }

    pub fn local_addr(&self) -> io::Result<SockAddr> { net::local_addr(self.fd.raw()) }

    pub fn take_error(&self) -> io::Result<Option<io::Error>> { net::take_error(self.fd.raw()) }
}

impl Read for UnixStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { (&*self).read(buf) }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        (&*self).read_vectored(bufs)
    }
}

impl Read for &UnixStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = syscall!(recv(self.fd.raw(), buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0))?;
        Ok(n as usize)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        let n = syscall!(readv(
            self.fd.raw(),
            bufs.as_mut_ptr() as *mut libc::iovec,
            bufs.len().min(libc::c_int::MAX as usize) as libc::c_int,
        ))?;
        Ok(n as usize)
    }
}

impl Write for UnixStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { (&*self).write(buf) }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        (&*self).write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Write for &UnixStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = syscall!(send(
            self.fd.raw(),
            buf.as_ptr() as *const libc::c_void,
            buf.len(),
            libc::MSG_NOSIGNAL,
        ))?;
        Ok(n as usize)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let n = syscall!(writev(
            self.fd.raw(),
            bufs.as_ptr() as *const libc::iovec,
            bufs.len().min(libc::c_int::MAX as usize) as libc::c_int,
        ))?;
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl AsRawFd for UnixStream {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for UnixStream {
    unsafe fn from_raw_fd(fd: RawFd) -> UnixStream { UnixStream { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for UnixStream {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl Source for UnixStream {
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
