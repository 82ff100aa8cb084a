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
use std::time::Duration;

use iopoll::{pipe, Events, Interest, Poll, Token};

const RX: Token = Token(1);
const TX: Token = Token(2);

#[test]
fn read_on_empty_pipe_would_block() {
    let (_tx, mut rx) = pipe::new().unwrap();
    let mut buf = [0u8; 8];
    let err = rx.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
}

#[test]
fn dropped_sender_means_eof() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let (tx, mut rx) = pipe::new().unwrap();
    poll.registry().register(&mut rx, RX, Interest::READABLE).unwrap();

    drop(tx);

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == RX && ev.is_read_closed()));

    let mut buf = [0u8; 8];
    assert_eq!(rx.read(&mut buf).unwrap(), 0);
}

#[test]
fn writable_after_reader_drains_full_pipe() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(64);

    let (mut tx, mut rx) = pipe::new().unwrap();

    // Fill the kernel buffer until the writer stalls.
    let chunk = [0u8; 4096];
    loop {
        match tx.write(&chunk) {
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => panic!("unexpected write error: {}", e),
        }
    }

    poll.registry().register(&mut tx, TX, Interest::WRITABLE).unwrap();
    poll.poll(&mut events, Some(Duration::from_millis(50))).unwrap();
    assert_eq!(events.len(), 0);

    // Free up space; the writer becomes ready again.
    let mut drain = vec![0u8; 65536];
    let _ = rx.read(&mut drain).unwrap();

    poll.poll(&mut events, Some(Duration::from_secs(2))).unwrap();
    assert!(events.iter().any(|ev| ev.token() == TX && ev.is_writable()));
}

#[test]
fn toggling_blocking_mode() {
    let (tx, rx) = pipe::new().unwrap();
    // Both ends start non-blocking; flipping the flag twice must not error.
    tx.set_nonblocking(false).unwrap();
    tx.set_nonblocking(true).unwrap();
    rx.set_nonblocking(false).unwrap();
    rx.set_nonblocking(true).unwrap();
}
