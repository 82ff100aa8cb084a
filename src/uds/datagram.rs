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
use std::net::Shutdown;
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::path::Path;

use socket2::{Domain, SockAddr, Socket, Type};

use crate::fd::Fd;
use crate::net;
use crate::source::Source;
use crate::sys::syscall;
use crate::{Interest, Registry, Token};

/// Non-blocking Unix-domain datagram socket.
#[derive(Debug)]
pub struct UnixDatagram {
    fd: Fd,
}

impl UnixDatagram {
    pub fn bind<P: AsRef<Path>>(path: P) -> io::Result<UnixDatagram> {
        let socket = Socket::new(Domain::UNIX, Type::DGRAM, None)?;
        socket.set_nonblocking(true)?;
        socket.bind(&SockAddr::unix(path)?)?;
        Ok(UnixDatagram { fd: Fd::from_raw(socket.into_raw_fd()) })
    }

    /// A socket bound to no address; it can send but only receive replies
    /// through a connected peer.
    pub fn unbound() -> io::Result<UnixDatagram> {
        let socket = Socket::new(Domain::UNIX, Type::DGRAM, None)?;
        socket.set_nonblocking(true)?;
        Ok(UnixDatagram { fd: Fd::from_raw(socket.into_raw_fd()) })
    }

    /// A pair of connected, non-blocking datagram sockets.
    pub fn pair() -> io::Result<(UnixDatagram, UnixDatagram)> {
        let mut fds = [0 as libc::c_int; 2];
        syscall!(socketpair(
            libc::AF_UNIX,
            libc::SOCK_DGRAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            0,
            fds.as_mut_ptr(),
        ))?;
        Ok((UnixDatagram { fd: Fd::from_raw(fds[0]) }, UnixDatagram { fd: Fd::from_raw(fds[1]) }))
    }

    pub fn connect<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let addr = SockAddr::unix(path)?;
        syscall!(connect(self.fd.raw(), addr.as_ptr(), addr.len())).map(|_| ())
    }

    pub fn send_to<P: AsRef<Path>>(&self, buf: &[u8], path: P) -> io::Result<usize> {
        let addr = SockAddr::unix(path)?;
        let n = syscall!(sendto(
            self.fd.raw(),
            buf.as_ptr() as *const libc::c_void,
            buf.len(),
            libc::MSG_NOSIGNAL,
            addr.as_ptr(),
            addr.len(),
        ))?;
        Ok(n as usize)
    }

    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SockAddr)> {
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;
        let n = syscall!(recvfrom(
            self.fd.raw(),
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
            0,
            &mut storage as *mut _ as *mut libc::sockaddr,
            &mut len,
        ))?;
        Ok((n as usize, unsafe { SockAddr::new(storage, len) }))
    }

    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        let n = syscall!(send(
            self.fd.raw(),
            buf.as_ptr() as *const libc::c_void,
            buf.len(),
            libc::MSG_NOSIGNAL,
        ))?;
        Ok(n as usize)
    }

    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = syscall!(recv(self.fd.raw(), buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0))?;
        Ok(n as usize)
    }

    pub fn shutdown(&self, how: Shutdown) -> io::Result<()> { net::shutdown(self.fd.raw(), how) }

    pub fn local_addr(&self) -> io::Result<SockAddr> { net::local_addr(self.fd.raw()) }

    pub fn peer_addr(&self) -> io::Result<SockAddr> { net::peer_addr(self.fd.raw()) }

    pub fn take_error(&self) -> io::Result<Option<io::Error>> { net::take_error(self.fd.raw()) }
}

impl AsRawFd for UnixDatagram {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for UnixDatagram {
    unsafe fn from_raw_fd(fd: RawFd) -> UnixDatagram { UnixDatagram { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for UnixDatagram {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl Source for UnixDatagram {
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
