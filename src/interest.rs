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

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

const READABLE: u8 = 0b0001;
const WRITABLE: u8 = 0b0010;
const PRIORITY: u8 = 0b0100;

/// The readiness conditions a registration subscribes to.
///
/// Interests combine with `|` and shrink with [`Interest::remove`]. The empty
/// set is legal: the descriptor stays registered but only error and hang-up
/// conditions, which the kernel always reports, will produce events.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Interest(u8);

impl Interest {
    /// Interest in read readiness, including peer read shutdown.
    pub const READABLE: Interest = Interest(READABLE);
    /// Interest in write readiness.
    pub const WRITABLE: Interest = Interest(WRITABLE);
    /// Interest in out-of-band/priority readiness.
    pub const PRIORITY: Interest = Interest(PRIORITY);
    /// No readiness interest at all.
    pub const NONE: Interest = Interest(0);

    pub const fn is_readable(self) -> bool { self.0 & READABLE != 0 }

    pub const fn is_writable(self) -> bool { self.0 & WRITABLE != 0 }

    pub const fn is_priority(self) -> bool { self.0 & PRIORITY != 0 }

    pub const fn is_empty(self) -> bool { self.0 == 0 }

    /// The set difference `self \ other`.
    pub const fn remove(self, other: Interest) -> Interest { Interest(self.0 & !other.0) }

    /// Raw bit pattern. Only meaningful for debug formatting.
    pub const fn bits(self) -> u8 { self.0 }
}

impl BitOr for Interest {
    type Output = Interest;

    fn bitor(self, rhs: Interest) -> Interest { Interest(self.0 | rhs.0) }
}

impl BitOrAssign for Interest {
    fn bitor_assign(&mut self, rhs: Interest) { self.0 |= rhs.0 }
}

impl fmt::Debug for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        let mut first = true;
        if self.is_readable() {
            write!(f, "READABLE")?;
            first = false;
        }
        if self.is_writable() {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "WRITABLE")?;
            first = false;
        }
        if self.is_priority() {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "PRIORITY")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Interest;

    #[test]
    fn union_is_idempotent() {
        let rw = Interest::READABLE | Interest::WRITABLE;
        assert_eq!(rw | rw, rw);
        assert!(rw.is_readable());
        assert!(rw.is_writable());
        assert!(!rw.is_priority());
    }

    #[test]
    fn in_place_union() {
        let mut i = Interest::READABLE;
        i |= Interest::PRIORITY;
        assert!(i.is_readable());
        assert!(i.is_priority());
    }

    #[test]
    fn remove_subset() {
        let all = Interest::READABLE | Interest::WRITABLE | Interest::PRIORITY;
        let rest = all.remove(Interest::WRITABLE);
        assert!(rest.is_readable());
        assert!(!rest.is_writable());
        assert!(rest.is_priority());
        assert!(all.remove(all).is_empty());
    }

    #[test]
    fn removing_absent_bits_is_a_no_op() {
        assert_eq!(Interest::READABLE.remove(Interest::WRITABLE), Interest::READABLE);
    }

    #[test]
    fn empty_set() {
        assert!(Interest::NONE.is_empty());
        assert_eq!(Interest::NONE.bits(), 0);
        assert!(!(Interest::NONE | Interest::READABLE).is_empty());
    }

    #[test]
    fn debug_formatting() {
        assert_eq!(format!("{:?}", Interest::READABLE), "READABLE");
        assert_eq!(
            format!("{:?}", Interest::READABLE | Interest::WRITABLE),
            "READABLE | WRITABLE"
        );
        assert_eq!(format!("{:?}", Interest::NONE), "NONE");
    }
}
