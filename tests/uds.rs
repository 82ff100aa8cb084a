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

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use iopoll::uds::{UnixDatagram, UnixListener, UnixStream};
use iopoll::{Events, Interest, Poll, Token};

const SERVER: Token = Token(0);
const CLIENT: Token = Token(1);

/// Per-test socket path under the system temp directory; removed up front so
/// repeated runs do not collide.
fn sock_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("iopoll-{}-{}.sock", std::process::id(), name));
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn listener_accepts_and_streams_exchange() {
    let path = sock_path("accept");
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut listener = UnixListener::bind(&path).unwrap();
    poll.registry().register(&mut listener, SERVER, Interest::READABLE).unwrap();
    assert_eq!(listener.local_addr().unwrap().as_pathname(), Some(path.as_path()));

    let mut client = UnixStream::connect(&path).unwrap();
    poll.registry().register(&mut client, CLIENT, Interest::READABLE).unwrap();

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == SERVER && ev.is_readable()));

    let (mut peer, _) = listener.accept().unwrap();
    peer.write_all(b"hi there").unwrap();

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == CLIENT && ev.is_readable()));

    let mut buf = [0u8; 16];
    let n = client.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"hi there");

    let _ = fs::remove_file(&path);
}

#[test]
fn stream_pair_is_connected() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let (mut a, mut b) = UnixStream::pair().unwrap();
    poll.registry().register(&mut b, CLIENT, Interest::READABLE).unwrap();

    a.write_all(b"pair").unwrap();

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == CLIENT && ev.is_readable()));

    let mut buf = [0u8; 8];
    let n = b.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"pair");

    // peek leaves the bytes for read.
    a.write_all(b"more").unwrap();
    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert_eq!(b.peek(&mut buf).unwrap(), 4);
    assert_eq!(b.read(&mut buf).unwrap(), 4);
}

#[test]
fn stream_eof_after_peer_drop() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let (a, mut b) = UnixStream::pair().unwrap();
    poll.registry().register(&mut b, CLIENT, Interest::READABLE).unwrap();

    drop(a);

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == CLIENT && ev.is_read_closed()));

    let mut buf = [0u8; 8];
    assert_eq!(b.read(&mut buf).unwrap(), 0);
}

#[test]
fn datagram_pair_send_recv() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let (a, mut b) = UnixDatagram::pair().unwrap();
    poll.registry().register(&mut b, CLIENT, Interest::READABLE).unwrap();

    assert_eq!(a.send(b"dgram").unwrap(), 5);

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == CLIENT && ev.is_readable()));

    let mut buf = [0u8; 16];
    assert_eq!(b.recv(&mut buf).unwrap(), 5);
    assert_eq!(&buf[..5], b"dgram");
}

#[test]
fn datagram_send_to_bound_path() {
    let path = sock_path("dgram");
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut receiver = UnixDatagram::bind(&path).unwrap();
    poll.registry().register(&mut receiver, SERVER, Interest::READABLE).unwrap();
    assert_eq!(receiver.local_addr().unwrap().as_pathname(), Some(path.as_path()));

    let sender = UnixDatagram::unbound().unwrap();
    assert_eq!(sender.send_to(b"hello", &path).unwrap(), 5);

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == SERVER && ev.is_readable()));

    let mut buf = [0u8; 16];
    let (n, from) = receiver.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"hello");
    // The sender never bound a path.
    assert!(from.as_pathname().is_none());

    let _ = fs::remove_file(&path);
}

#[test]
fn datagram_connect_routes_send() {
    let path = sock_path("connected");

    let receiver = UnixDatagram::bind(&path).unwrap();
    let sender = UnixDatagram::unbound().unwrap();
    sender.connect(&path).unwrap();
    assert_eq!(sender.send(b"routed").unwrap(), 6);

    // The datagram is already queued locally; no poll needed.
    let mut buf = [0u8; 16];
    assert_eq!(receiver.recv(&mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], b"routed");

    let _ = fs::remove_file(&path);
}
