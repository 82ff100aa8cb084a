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

//! Kernel-facing plumbing. The selector backend is chosen at build time
//! through a Cargo feature; building with no backend is an error, not a
//! silent fallback.

/// Runs a libc function and converts its `-1`/`errno` convention into
/// `io::Result`.
macro_rules! syscall {
    ($fn:ident ( $($arg:expr),* $(,)? )) => {{
        let res = unsafe { libc::$fn($($arg),*) };
        if res == -1 {
            Err(std::io::Error::last_os_error())
        } else {
            Ok(res)
        }
    }};
}

pub(crate) use syscall;

#[cfg(feature = "epoll")]
mod unix;
#[cfg(feature = "epoll")]
pub(crate) use unix::{RawEvent, Selector, WakerFd};

#[cfg(feature = "io-uring")]
compile_error!("the io-uring selector backend is reserved but not implemented");

#[cfg(not(any(feature = "epoll", feature = "io-uring")))]
compile_error!("no selector backend selected; enable the `epoll` feature");
