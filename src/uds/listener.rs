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
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::path::Path;

use socket2::{Domain, SockAddr, Socket, Type};

use crate::fd::Fd;
use crate::net::{self, BACKLOG};
use crate::source::Source;
use crate::sys::syscall;
use crate::uds::UnixStream;
use crate::{Interest, Registry, Token};

/// Non-blocking Unix-domain stream listener.
///
/// The socket file is not removed on drop; the caller decides when the path
/// is reusable.
#[derive(Debug)]
pub struct UnixListener {
    fd: Fd,
}

impl UnixListener {
    pub fn bind<P: AsRef<Path>>(path: P) -> io::Result<UnixListener> {
        let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
        socket.set_nonblocking(true)?;
        socket.bind(&SockAddr::unix(path)?)?;
        socket.listen(BACKLOG)?;
        Ok(UnixListener { fd: Fd::from_raw(socket.into_raw_fd()) })
    }

    /// Accepts one pending connection; the stream comes back non-blocking
    /// and close-on-exec. The peer address of an unbound client is unnamed.
    pub fn accept(&self) -> io::Result<(UnixStream, SockAddr)> {
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;
        let fd = syscall!(accept4(
            self.fd.raw(),
            &mut storage as *mut _ as *mut libc::sockaddr,
            &mut len,
            libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
        ))?;
        Ok((unsafe { UnixStream::from_raw_fd(fd) }, unsafe { SockAddr::new(storage, len) }))
    }

    pub fn local_addr(&self) -> io::Result<SockAddr> { net::local_addr(self.fd.raw()) }

    pub fn take_error(&self) -> io::Result<Option<io::Error>> { net::take_error(self.fd.raw()) }
}

impl AsRawFd for UnixListener {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for UnixListener {
    unsafe fn from_raw_fd(fd: RawFd) -> UnixListener { UnixListener { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for UnixListener {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl Source for UnixListener {
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
