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

use std::mem;
use std::os::unix::thread::JoinHandleExt;
use std::ptr;
use std::thread;
use std::time::{Duration, Instant};

use iopoll::{Events, Poll};

extern "C" fn noop_handler(_: libc::c_int) {}

fn install_noop_handler(signal: libc::c_int) {
    unsafe {
        let mut action: libc::sigaction = mem::zeroed();
        action.sa_sigaction = noop_handler as libc::sighandler_t;
        libc::sigemptyset(&mut action.sa_mask);
        // No SA_RESTART: the wait must actually observe EINTR.
        action.sa_flags = 0;
        assert_eq!(libc::sigaction(signal, &action, ptr::null_mut()), 0);
    }
}

#[test]
fn signal_interruption_is_transparent() {
    install_noop_handler(libc::SIGUSR1);

    let mut poll = Poll::new().unwrap();
    let handle = thread::spawn(move || {
        let mut events = Events::with_capacity(64);
        let started = Instant::now();
        let result = poll.poll(&mut events, Some(Duration::from_millis(500)));
        (result, events.len(), started.elapsed())
    });

    // Give the thread time to park, then interrupt it.
    thread::sleep(Duration::from_millis(100));
    let pthread = handle.as_pthread_t() as libc::pthread_t;
    unsafe {
        assert_eq!(libc::pthread_kill(pthread, libc::SIGUSR1), 0);
    }

    let (result, delivered, elapsed) = handle.join().unwrap();

    // The wait resumed after the signal instead of failing with Interrupted,
    // so it ran to its timeout with nothing delivered.
    result.unwrap();
    assert_eq!(delivered, 0);
    assert!(elapsed >= Duration::from_millis(450), "poll returned early: {:?}", elapsed);
}
