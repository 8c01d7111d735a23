// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte-count value type with human-readable parsing and formatting.
//!
//! A [`Size`] is what every memory quantity in the calculator is expressed
//! in: bucket bounds, assigned bucket sizes, the total budget. Rendering
//! always uses the largest exact unit so that the output is directly usable
//! as a JVM switch value.

use crate::SizeError;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Bytes in a kibibyte.
pub const KIBI: i64 = 1024;
/// Bytes in a mebibyte.
pub const MEBI: i64 = 1024 * KIBI;
/// Bytes in a gibibyte.
pub const GIBI: i64 = 1024 * MEBI;
/// Bytes in a tebibyte.
pub const TEBI: i64 = 1024 * GIBI;

/// An immutable, signed byte count.
///
/// # Parsing
/// `<integer>[b|k|m|g|t]`, case-insensitive, surrounding whitespace ignored:
/// - `"512M"` → 512 × 1024² bytes
/// - `"2g"` → 2 × 1024³ bytes
/// - `"1048576"` or `"1048576b"` → raw byte count
///
/// # Formatting
/// Rounded toward zero to whole kilobytes and expressed in the largest unit
/// that is exact. Anything under one kilobyte renders as `"0"`.
///
/// # Examples
/// ```
/// use memory_model::Size;
///
/// let s = Size::parse("1024m").unwrap();
/// assert_eq!(s.to_string(), "1G");
/// assert_eq!(Size::from_bytes(1023).to_string(), "0");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Size {
    /// Size in bytes.
    bytes: i64,
}

impl Size {
    /// The empty size.
    pub const ZERO: Size = Size { bytes: 0 };

    /// Creates a size from a byte count.
    pub const fn from_bytes(bytes: i64) -> Self {
        Self { bytes }
    }

    /// Creates a size from kibibytes.
    pub const fn from_kb(kb: i64) -> Self {
        Self { bytes: kb * KIBI }
    }

    /// Creates a size from mebibytes.
    pub const fn from_mb(mb: i64) -> Self {
        Self { bytes: mb * MEBI }
    }

    /// Creates a size from gibibytes.
    pub const fn from_gb(gb: i64) -> Self {
        Self { bytes: gb * GIBI }
    }

    /// Parses a human-readable size string.
    pub fn parse(s: &str) -> Result<Self, SizeError> {
        let t = s.trim();
        if t.is_empty() {
            return Err(SizeError::Empty);
        }

        let (digits, multiplier) = match t.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => {
                let multiplier = match c.to_ascii_lowercase() {
                    'b' => 1,
                    'k' => KIBI,
                    'm' => MEBI,
                    'g' => GIBI,
                    't' => TEBI,
                    _ => return Err(SizeError::InvalidSize(t.to_string())),
                };
                (&t[..t.len() - 1], multiplier)
            }
            _ => (t, 1),
        };

        let unsigned = digits.strip_prefix('-').unwrap_or(digits);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SizeError::InvalidSize(t.to_string()));
        }

        let value: i64 = digits
            .parse()
            .map_err(|_| SizeError::Overflow(t.to_string()))?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| SizeError::Overflow(t.to_string()))?;

        Ok(Self { bytes })
    }

    /// Returns the size in bytes.
    pub const fn bytes(&self) -> i64 {
        self.bytes
    }

    /// Returns the number of whole kilobytes (truncated toward zero).
    pub const fn kilos(&self) -> i64 {
        self.bytes / KIBI
    }

    /// Returns the number of whole megabytes (truncated toward zero).
    pub const fn megas(&self) -> i64 {
        self.bytes / MEBI
    }

    /// Returns the number of whole gigabytes (truncated toward zero).
    pub const fn gigas(&self) -> i64 {
        self.bytes / GIBI
    }

    /// Returns `true` if this size holds exactly zero bytes.
    pub const fn is_zero(&self) -> bool {
        self.bytes == 0
    }

    /// Returns the difference of two sizes.
    pub const fn subtract(self, other: Size) -> Size {
        Size {
            bytes: self.bytes - other.bytes,
        }
    }

    /// Multiplies the size by `factor`, rounding to the nearest byte.
    ///
    /// Halves round away from zero.
    pub fn scale(self, factor: f64) -> Size {
        Size {
            bytes: (self.bytes as f64 * factor).round() as i64,
        }
    }

    /// Returns `true` if this size is strictly smaller than `other`.
    pub const fn less_than(&self, other: &Size) -> bool {
        self.bytes < other.bytes
    }

    /// Returns the ratio `self / other` as a floating point number.
    pub fn divided_by(&self, other: &Size) -> f64 {
        self.bytes as f64 / other.bytes as f64
    }
}

impl Add for Size {
    type Output = Size;

    fn add(self, rhs: Size) -> Size {
        Size {
            bytes: self.bytes + rhs.bytes,
        }
    }
}

impl Sub for Size {
    type Output = Size;

    fn sub(self, rhs: Size) -> Size {
        self.subtract(rhs)
    }
}

impl Sum for Size {
    fn sum<I: Iterator<Item = Size>>(iter: I) -> Size {
        iter.fold(Size::ZERO, |acc, s| acc + s)
    }
}

impl std::str::FromStr for Size {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Size::parse(s)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kilos = self.kilos();
        if kilos == 0 {
            write!(f, "0")
        } else if kilos % GIBI == 0 {
            write!(f, "{}T", kilos / GIBI)
        } else if kilos % MEBI == 0 {
            write!(f, "{}G", kilos / MEBI)
        } else if kilos % KIBI == 0 {
            write!(f, "{}M", kilos / KIBI)
        } else {
            write!(f, "{kilos}K")
        }
    }
}
