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
use std::mem;
use std::net::{Shutdown, SocketAddr};
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};

use socket2::{Domain, SockAddr, Socket, Type};

use crate::fd::Fd;
use crate::net::{self, BACKLOG};
use crate::source::Source;
use crate::sys::syscall;
use crate::{Interest, Registry, Token};

/// Non-blocking TCP listener.
///
/// Register with [`Interest::READABLE`]; a readable event means pending
/// connections, which must be accepted until `WouldBlock` under the
/// edge-triggered contract.
#[derive(Debug)]
pub struct TcpListener {
    fd: Fd,
}

impl TcpListener {
    /// Binds a listening socket to `addr` with `SO_REUSEADDR` set.
    pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
        socket.set_nonblocking(true)?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(BACKLOG)?;
        #[cfg(feature = "log")]
        log::debug!(target: "iopoll", "listening on {}", addr);
        Ok(TcpListener { fd: Fd::from_raw(socket.into_raw_fd()) })
    }

    /// Accepts one pending connection. The returned stream is already
    /// non-blocking and close-on-exec.
    pub fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        let fd = syscall!(accept4(
            self.fd.raw(),
            &mut storage as *mut _ as *mut libc::sockaddr,
            &mut len,
            libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
        ))?;
        let stream = TcpStream { fd: Fd::from_raw(fd) };
        let peer = net::to_socket_addr(&unsafe { SockAddr::new(storage, len) })?;
        Ok((stream, peer))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        net::to_socket_addr(&net::local_addr(self.fd.raw())?)
    }

    pub fn set_reuseaddr(&self, enable: bool) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::SOL_SOCKET, libc::SO_REUSEADDR, enable as libc::c_int)
    }

    pub fn set_reuse_port(&self, enable: bool) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::SOL_SOCKET, libc::SO_REUSEPORT, enable as libc::c_int)
    }

    pub fn set_ttl(&self, ttl: u32) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_TTL, ttl as libc::c_int)
    }

    pub fn ttl(&self) -> io::Result<u32> {
        let val: libc::c_int = net::getsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_TTL)?;
        Ok(val as u32)
    }

    pub fn take_error(&self) -> io::Result<Option<io::Error>> { net::take_error(self.fd.raw()) }
}

impl AsRawFd for TcpListener {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for TcpListener {
    unsafe fn from_raw_fd(fd: RawFd) -> TcpListener { TcpListener { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for TcpListener {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl Source for TcpListener {
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

/// Non-blocking TCP stream.
///
/// [`TcpStream::connect`] returns before the handshake completes; register
/// with [`Interest::WRITABLE`] and treat the first writable event as
/// connection establishment, checking [`TcpStream::take_error`] when it
/// reports an error condition.
#[derive(Debug)]
pub struct TcpStream {
    fd: Fd,
}

impl TcpStream {
    /// Starts a non-blocking connect to `addr`.
    pub fn connect(addr: SocketAddr) -> io::Result<TcpStream> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
        socket.set_nonblocking(true)?;
        match socket.connect(&addr.into()) {
            Ok(()) => {
                #[cfg(feature = "log")]
                log::debug!(target: "iopoll", "connected to {}", addr);
            }
            Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {
                #[cfg(feature = "log")]
                log::debug!(target: "iopoll", "connecting to {} in the background", addr);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(e),
        }
        Ok(TcpStream { fd: Fd::from_raw(socket.into_raw_fd()) })
    }

    /// Reads without consuming the received data.
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

    pub fn set_nodelay(&self, enable: bool) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::IPPROTO_TCP, libc::TCP_NODELAY, enable as libc::c_int)
    }

    pub fn nodelay(&self) -> io::Result<bool> {
        let val: libc::c_int =
            net::getsockopt(self.fd.raw(), libc::IPPROTO_TCP, libc::TCP_NODELAY)?;
        Ok(val != 0)
    }

    pub fn set_ttl(&self, ttl: u32) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_TTL, ttl as libc::c_int)
    }

    pub fn ttl(&self) -> io::Result<u32> {
        let val: libc::c_int = net::getsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_TTL)?;
        Ok(val as u32)
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        net::to_socket_addr(&net::peer_addr(self.fd.raw())?)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        net::to_socket_addr(&net::local_addr(self.fd.raw())?)
    }

    pub fn take_error(&self) -> io::Result<Option<io::Error>> { net::take_error(self.fd.raw()) }
}

impl Read for TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { (&*self).read(buf) }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        (&*self).read_vectored(bufs)
    }
}

impl Read for &TcpStream {
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

impl Write for TcpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { (&*self).write(buf) }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        (&*self).write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Write for &TcpStream {
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

impl AsRawFd for TcpStream {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for TcpStream {
    unsafe fn from_raw_fd(fd: RawFd) -> TcpStream { TcpStream { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for TcpStream {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl Source for TcpStream {
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
