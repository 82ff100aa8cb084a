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

//! Single-threaded edge-triggered echo server.
//!
//! Try it with `nc 127.0.0.1 7878`.

use std::collections::HashMap;
use std::io::{self, Read, Write};

use iopoll::net::{TcpListener, TcpStream};
use iopoll::{Events, Interest, Poll, Token};

const SERVER: Token = Token(0);

fn main() -> io::Result<()> {
    let mut poll = Poll::new()?;
    let mut events = Events::with_capacity(128);

    let mut listener = TcpListener::bind("127.0.0.1:7878".parse().unwrap())?;
    poll.registry().register(&mut listener, SERVER, Interest::READABLE)?;
    println!("echoing on {}", listener.local_addr()?);

    let mut connections: HashMap<Token, TcpStream> = HashMap::new();
    let mut next_token = 1u64;

    loop {
        poll.poll(&mut events, None)?;

        for event in &events {
            match event.token() {
                // Edge-triggered: accept until the backlog is empty.
                SERVER => loop {
                    match listener.accept() {
                        Ok((mut stream, peer)) => {
                            let token = Token(next_token);
                            next_token += 1;
                            poll.registry().register(&mut stream, token, Interest::READABLE)?;
                            println!("+ {} ({:?})", peer, token);
                            connections.insert(token, stream);
                        }
                        Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                        Err(e) => return Err(e),
                    }
                },
                token => {
                    let closed = match connections.get_mut(&token) {
                        Some(stream) => echo(stream)?,
                        None => continue,
                    };
                    if closed {
                        let mut stream = connections.remove(&token).unwrap();
                        poll.registry().deregister(&mut stream)?;
                        println!("- {:?}", token);
                    }
                }
            }
        }
    }
}

/// Drains the stream, echoing everything back. Returns true when the peer is
/// done.
fn echo(stream: &mut TcpStream) -> io::Result<bool> {
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return Ok(true),
            Ok(n) => match stream.write_all(&buf[..n]) {
                Ok(()) => {}
                // A slow peer filled the kernel buffer; the rest of this
                // chunk is dropped, which is fine for a demo.
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(e),
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
