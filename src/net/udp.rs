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
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};

use socket2::{Domain, SockAddr, Socket, Type};

use crate::fd::Fd;
use crate::net;
use crate::source::Source;
use crate::sys::syscall;
use crate::{Interest, Registry, Token};

/// Non-blocking UDP socket.
///
/// Datagram sockets are almost always writable, so a registration is
/// typically [`Interest::READABLE`] only; add the write interest when a send
/// actually returned `WouldBlock`.
#[derive(Debug)]
pub struct UdpSocket {
    fd: Fd,
}

impl UdpSocket {
    pub fn bind(addr: SocketAddr) -> io::Result<UdpSocket> {
        let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, None)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        Ok(UdpSocket { fd: Fd::from_raw(socket.into_raw_fd()) })
    }

    /// Fixes the peer address so [`UdpSocket::send`] and [`UdpSocket::recv`]
    /// can be used, and stray datagrams from other peers are filtered out.
    pub fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        let addr = SockAddr::from(addr);
        syscall!(connect(self.fd.raw(), addr.as_ptr(), addr.len())).map(|_| ())
    }

    pub fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        let target = SockAddr::from(target);
        let n = syscall!(sendto(
            self.fd.raw(),
            buf.as_ptr() as *const libc::c_void,
            buf.len(),
            libc::MSG_NOSIGNAL,
            target.as_ptr(),
            target.len(),
        ))?;
        Ok(n as usize)
    }

    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let (n, addr) = self.recv_from_flags(buf, 0)?;
        Ok((n, net::to_socket_addr(&addr)?))
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

    /// Receives without consuming the datagram.
    pub fn peek(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = syscall!(recv(
            self.fd.raw(),
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
            libc::MSG_PEEK,
        ))?;
        Ok(n as usize)
    }

    pub fn peek_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let (n, addr) = self.recv_from_flags(buf, libc::MSG_PEEK)?;
        Ok((n, net::to_socket_addr(&addr)?))
    }

    fn recv_from_flags(&self, buf: &mut [u8], flags: libc::c_int) -> io::Result<(usize, SockAddr)> {
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        let n = syscall!(recvfrom(
            self.fd.raw(),
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
            flags,
            &mut storage as *mut _ as *mut libc::sockaddr,
            &mut len,
        ))?;
        Ok((n as usize, unsafe { SockAddr::new(storage, len) }))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        net::to_socket_addr(&net::local_addr(self.fd.raw())?)
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        net::to_socket_addr(&net::peer_addr(self.fd.raw())?)
    }

    pub fn set_broadcast(&self, enable: bool) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::SOL_SOCKET, libc::SO_BROADCAST, enable as libc::c_int)
    }

    pub fn broadcast(&self) -> io::Result<bool> {
        let val: libc::c_int =
            net::getsockopt(self.fd.raw(), libc::SOL_SOCKET, libc::SO_BROADCAST)?;
        Ok(val != 0)
    }

    pub fn set_ttl(&self, ttl: u32) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_TTL, ttl as libc::c_int)
    }

    pub fn ttl(&self) -> io::Result<u32> {
        let val: libc::c_int = net::getsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_TTL)?;
        Ok(val as u32)
    }

    pub fn only_v6(&self) -> io::Result<bool> {
        let val: libc::c_int =
            net::getsockopt(self.fd.raw(), libc::IPPROTO_IPV6, libc::IPV6_V6ONLY)?;
        Ok(val != 0)
    }

    pub fn take_error(&self) -> io::Result<Option<io::Error>> { net::take_error(self.fd.raw()) }

    pub fn join_multicast_v4(&self, group: Ipv4Addr, iface: Ipv4Addr) -> io::Result<()> {
        let mreq = libc::ip_mreq {
            imr_multiaddr: to_in_addr(group),
            imr_interface: to_in_addr(iface),
        };
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_ADD_MEMBERSHIP, mreq)
    }

    pub fn leave_multicast_v4(&self, group: Ipv4Addr, iface: Ipv4Addr) -> io::Result<()> {
        let mreq = libc::ip_mreq {
            imr_multiaddr: to_in_addr(group),
            imr_interface: to_in_addr(iface),
        };
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_DROP_MEMBERSHIP, mreq)
    }

    pub fn set_multicast_ttl_v4(&self, ttl: u32) -> io::Result<()> {
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_MULTICAST_TTL, ttl as libc::c_int)
    }

    pub fn multicast_ttl_v4(&self) -> io::Result<u32> {
        let val: libc::c_int =
            net::getsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_MULTICAST_TTL)?;
        Ok(val as u32)
    }

    pub fn set_multicast_loop_v4(&self, enable: bool) -> io::Result<()> {
        net::setsockopt(
            self.fd.raw(),
            libc::IPPROTO_IP,
            libc::IP_MULTICAST_LOOP,
            enable as libc::c_int,
        )
    }

    pub fn multicast_loop_v4(&self) -> io::Result<bool> {
        let val: libc::c_int =
            net::getsockopt(self.fd.raw(), libc::IPPROTO_IP, libc::IP_MULTICAST_LOOP)?;
        Ok(val != 0)
    }

    pub fn join_multicast_v6(&self, group: Ipv6Addr, iface: u32) -> io::Result<()> {
        let mreq = libc::ipv6_mreq {
            ipv6mr_multiaddr: to_in6_addr(group),
            ipv6mr_interface: iface,
        };
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IPV6, libc::IPV6_ADD_MEMBERSHIP, mreq)
    }

    pub fn leave_multicast_v6(&self, group: Ipv6Addr, iface: u32) -> io::Result<()> {
        let mreq = libc::ipv6_mreq {
            ipv6mr_multiaddr: to_in6_addr(group),
            ipv6mr_interface: iface,
        };
        net::setsockopt(self.fd.raw(), libc::IPPROTO_IPV6, libc::IPV6_DROP_MEMBERSHIP, mreq)
    }

    pub fn set_multicast_loop_v6(&self, enable: bool) -> io::Result<()> {
        net::setsockopt(
            self.fd.raw(),
            libc::IPPROTO_IPV6,
            libc::IPV6_MULTICAST_LOOP,
            enable as libc::c_int,
        )
    }

    pub fn multicast_loop_v6(&self) -> io::Result<bool> {
        let val: libc::c_int =
            net::getsockopt(self.fd.raw(), libc::IPPROTO_IPV6, libc::IPV6_MULTICAST_LOOP)?;
        Ok(val != 0)
    }
}

fn to_in_addr(addr: Ipv4Addr) -> libc::in_addr {
    // in_addr is stored in network byte order; the octets already are.
    libc::in_addr { s_addr: u32::from_ne_bytes(addr.octets()) }
}

fn to_in6_addr(addr: Ipv6Addr) -> libc::in6_addr {
    let mut raw: libc::in6_addr = unsafe { mem::zeroed() };
    raw.s6_addr = addr.octets();
    raw
}

impl AsRawFd for UdpSocket {
    fn as_raw_fd(&self) -> RawFd { self.fd.raw() }
}

impl FromRawFd for UdpSocket {
    unsafe fn from_raw_fd(fd: RawFd) -> UdpSocket { UdpSocket { fd: Fd::from_raw(fd) } }
}

impl IntoRawFd for UdpSocket {
    fn into_raw_fd(self) -> RawFd { self.fd.into_raw_fd() }
}

impl Source for UdpSocket {
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
