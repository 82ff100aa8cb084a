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

//! Non-blocking TCP and UDP wrappers.
//!
//! The wrappers never block and never buffer: they are thin owned shims over
//! the socket system calls, meant to be driven by readiness events from a
//! [`Poll`](crate::Poll).

use std::io;
use std::mem;
use std::net::{Shutdown, SocketAddr};
use std::os::unix::io::RawFd;

use socket2::SockAddr;

use crate::sys::syscall;

mod tcp;
mod udp;

pub use tcp::{TcpListener, TcpStream};
pub use udp::UdpSocket;

// This is the default used by std::net::TcpListener at the time of writing.
// The standard library doesn't export the value so it is hard-coded here.
pub(crate) const BACKLOG: libc::c_int = 128;

pub(crate) fn setsockopt<T>(
    fd: RawFd,
    level: libc::c_int,
    opt: libc::c_int,
    val: T,
) -> io::Result<()> {
    syscall!(setsockopt(
        fd,
        level,
        opt,
        &val as *const T as *const libc::c_void,
        mem::size_of::<T>() as libc::socklen_t,
    ))
    .map(|_| ())
}

pub(crate) fn getsockopt<T: Copy>(fd: RawFd, level: libc::c_int, opt: libc::c_int) -> io::Result<T> {
    let mut val: T = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<T>() as libc::socklen_t;
    syscall!(getsockopt(
        fd,
        level,
        opt,
        &mut val as *mut T as *mut libc::c_void,
        &mut len,
    ))?;
    Ok(val)
}

/// Fetches and clears the pending socket error, `None` when there is none.
pub(crate) fn take_error(fd: RawFd) -> io::Result<Option<io::Error>> {
    let code: libc::c_int = getsockopt(fd, libc::SOL_SOCKET, libc::SO_ERROR)?;
    if code == 0 {
        Ok(None)
    } else {
        Ok(Some(io::Error::from_raw_os_error(code)))
    }
}

pub(crate) fn local_addr(fd: RawFd) -> io::Result<SockAddr> {
    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
    syscall!(getsockname(fd, &mut storage as *mut _ as *mut libc::sockaddr, &mut len))?;
    Ok(unsafe { SockAddr::new(storage, len) })
}

pub(crate) fn peer_addr(fd: RawFd) -> io::Result<SockAddr> {
    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
    syscall!(getpeername(fd, &mut storage as *mut _ as *mut libc::sockaddr, &mut len))?;
    Ok(unsafe { SockAddr::new(storage, len) })
}

pub(crate) fn to_socket_addr(addr: &SockAddr) -> io::Result<SocketAddr> {
    addr.as_socket().ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))
}

pub(crate) fn shutdown(fd: RawFd, how: Shutdown) -> io::Result<()> {
    let how = match how {
        Shutdown::Read => libc::SHUT_RD,
        Shutdown::Write => libc::SHUT_WR,
        Shutdown::Both => libc::SHUT_RDWR,
    };
    syscall!(shutdown(fd, how)).map(|_| ())
}
