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

use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::time::{Duration, Instant};

use iopoll::net::{TcpListener, TcpStream};
use iopoll::{Event, Events, Interest, Poll, Token};

const SERVER: Token = Token(0);
const CLIENT: Token = Token(1);
const PEER: Token = Token(2);

/// Polls until an event for `token` satisfies `pred`, with a hard deadline.
///
/// The current batch is scanned first: edge-triggered events for one source
/// may have been delivered alongside an earlier wait's target and must not
/// be lost by re-polling.
fn wait_for(
    poll: &mut Poll,
    events: &mut Events,
    token: Token,
    pred: impl Fn(Event<'_>) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        for event in &*events {
            if event.token() == token && pred(event) {
                return;
            }
        }
        let now = Instant::now();
        assert!(now < deadline, "timed out waiting for {:?}", token);
        poll.poll(events, Some(deadline - now)).unwrap();
    }
}

fn addr() -> std::net::SocketAddr { "127.0.0.1:0".parse().unwrap() }

#[test]
fn accept_and_exchange() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut listener = TcpListener::bind(addr()).unwrap();
    poll.registry().register(&mut listener, SERVER, Interest::READABLE).unwrap();

    let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    poll.registry()
        .register(&mut client, CLIENT, Interest::READABLE | Interest::WRITABLE)
        .unwrap();

    wait_for(&mut poll, &mut events, SERVER, |ev| ev.is_readable());
    let (mut peer, peer_addr) = listener.accept().unwrap();
    assert_eq!(peer_addr, client.local_addr().unwrap());
    poll.registry().register(&mut peer, PEER, Interest::READABLE).unwrap();

    // Writable means the connect handshake finished.
    wait_for(&mut poll, &mut events, CLIENT, |ev| ev.is_writable());
    assert!(client.take_error().unwrap().is_none());

    client.write_all(b"request").unwrap();
    wait_for(&mut poll, &mut events, PEER, |ev| ev.is_readable());

    let mut buf = [0u8; 32];
    let n = peer.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"request");

    peer.write_all(b"response").unwrap();
    wait_for(&mut poll, &mut events, CLIENT, |ev| ev.is_readable());

    let n = client.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"response");
}

#[test]
fn accepted_stream_is_nonblocking() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut listener = TcpListener::bind(addr()).unwrap();
    poll.registry().register(&mut listener, SERVER, Interest::READABLE).unwrap();
    let _client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();

    wait_for(&mut poll, &mut events, SERVER, |ev| ev.is_readable());
    let (mut peer, _) = listener.accept().unwrap();

    let mut buf = [0u8; 8];
    let err = peer.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
}

#[test]
fn accept_without_pending_connection_would_block() {
    let listener = TcpListener::bind(addr()).unwrap();
    let err = listener.accept().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
}

#[test]
fn shutdown_write_signals_eof() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut listener = TcpListener::bind(addr()).unwrap();
    poll.registry().register(&mut listener, SERVER, Interest::READABLE).unwrap();
    let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    poll.registry().register(&mut client, CLIENT, Interest::READABLE).unwrap();

    wait_for(&mut poll, &mut events, SERVER, |ev| ev.is_readable());
    let (peer, _) = listener.accept().unwrap();

    peer.shutdown(Shutdown::Write).unwrap();
    wait_for(&mut poll, &mut events, CLIENT, |ev| ev.is_read_closed() || ev.is_readable());

    let mut buf = [0u8; 8];
    assert_eq!(client.read(&mut buf).unwrap(), 0);
}

#[test]
fn socket_options_round_trip() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut listener = TcpListener::bind(addr()).unwrap();
    listener.set_ttl(64).unwrap();
    assert_eq!(listener.ttl().unwrap(), 64);
    listener.set_reuseaddr(true).unwrap();
    listener.set_reuse_port(true).unwrap();
    assert!(listener.take_error().unwrap().is_none());

    poll.registry().register(&mut listener, SERVER, Interest::READABLE).unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();

    client.set_nodelay(true).unwrap();
    assert!(client.nodelay().unwrap());
    client.set_nodelay(false).unwrap();
    assert!(!client.nodelay().unwrap());
    client.set_ttl(42).unwrap();
    assert_eq!(client.ttl().unwrap(), 42);

    wait_for(&mut poll, &mut events, SERVER, |ev| ev.is_readable());
    let (peer, _) = listener.accept().unwrap();
    assert_eq!(peer.local_addr().unwrap(), client.peer_addr().unwrap());
}

#[test]
fn peek_does_not_consume() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut listener = TcpListener::bind(addr()).unwrap();
    poll.registry().register(&mut listener, SERVER, Interest::READABLE).unwrap();
    let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    poll.registry().register(&mut client, CLIENT, Interest::READABLE).unwrap();

    wait_for(&mut poll, &mut events, SERVER, |ev| ev.is_readable());
    let (mut peer, _) = listener.accept().unwrap();

    peer.write_all(b"data").unwrap();
    wait_for(&mut poll, &mut events, CLIENT, |ev| ev.is_readable());

    let mut buf = [0u8; 16];
    assert_eq!(client.peek(&mut buf).unwrap(), 4);
    assert_eq!(client.read(&mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"data");
}

#[test]
fn vectored_io() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let mut listener = TcpListener::bind(addr()).unwrap();
    poll.registry().register(&mut listener, SERVER, Interest::READABLE).unwrap();
    let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    poll.registry().register(&mut client, CLIENT, Interest::READABLE).unwrap();

    wait_for(&mut poll, &mut events, SERVER, |ev| ev.is_readable());
    let (mut peer, _) = listener.accept().unwrap();

    let bufs = [io::IoSlice::new(b"head"), io::IoSlice::new(b"tail")];
    assert_eq!(peer.write_vectored(&bufs).unwrap(), 8);

    wait_for(&mut poll, &mut events, CLIENT, |ev| ev.is_readable());
    let mut head = [0u8; 4];
    let mut tail = [0u8; 4];
    let mut bufs = [io::IoSliceMut::new(&mut head), io::IoSliceMut::new(&mut tail)];
    assert_eq!(client.read_vectored(&mut bufs).unwrap(), 8);
    assert_eq!(&head, b"head");
    assert_eq!(&tail, b"tail");
}
