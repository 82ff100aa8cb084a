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

/// Caller-chosen identifier attached to a registration.
///
/// The library never interprets the value; it travels through the kernel's
/// 64-bit user-data field and comes back verbatim on every [`Event`] for the
/// registered descriptor. Zero is an ordinary value, not a sentinel.
///
/// [`Event`]: crate::Event
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Token(pub u64);
