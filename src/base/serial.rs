//! Serial numbers.
//!
//! DNS uses 32 bit serial numbers that are conceptually viewed as the 32
//! bit modulus of a larger number space. Because of that, special rules
//! apply when comparing them. This module provides the type [`Serial`]
//! that implements these rules.

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{cmp, fmt};

//------------ Serial --------------------------------------------------------

/// A serial number.
///
/// Serial numbers are used to track changes to resources. The SOA record
/// carries one expressing the version of a zone, and an incremental zone
/// transfer asks for the changes between such a version and the server's
/// current one. Since the numbers are only 32 bits long, they can wrap.
/// [RFC 1982] defines the semantics for arithmetic in the face of these
/// wrap-arounds. This type implements those semantics atop a native `u32`.
///
/// The RFC defines two operations: addition and comparison. The amount
/// added can only be a positive number of up to `2^31 - 1`, so rather than
/// implementing the `Add` trait there is a dedicated method [`add`] that
/// documents its panic.
///
/// Serial numbers only implement a partial ordering: there are pairs of
/// values that are not equal but where neither is larger than the other.
///
/// [RFC 1982]: https://tools.ietf.org/html/rfc1982
/// [`add`]: Self::add
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Serial(pub u32);

impl Serial {
    /// Returns a serial number for the current Unix time.
    pub fn now() -> Self {
        let now = SystemTime::now();
        let value = match now.duration_since(UNIX_EPOCH) {
            Ok(value) => value.as_secs(),
            Err(_) => 0,
        };
        Self(value as u32)
    }

    /// Returns the serial number as a raw integer.
    pub fn into_int(self) -> u32 {
        self.0
    }

    /// Adds `other` to `self`.
    ///
    /// Serial numbers only allow values of up to `2^31 - 1` to be added to
    /// them, which is why `other` is a `u32` rather than another serial.
    ///
    /// # Panics
    ///
    /// This method panics if `other` is greater than `2^31 - 1`.
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: u32) -> Self {
        assert!(other <= 0x7FFF_FFFF);
        Serial(self.0.wrapping_add(other))
    }
}

//--- From

impl From<u32> for Serial {
    fn from(value: u32) -> Self {
        Serial(value)
    }
}

impl From<Serial> for u32 {
    fn from(value: Serial) -> Self {
        value.0
    }
}

//--- Display

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

//--- PartialOrd

impl cmp::PartialOrd for Serial {
    fn partial_cmp(&self, other: &Serial) -> Option<Ordering> {
        match self.0.cmp(&other.0) {
            Ordering::Equal => Some(Ordering::Equal),
            Ordering::Less => {
                let sub = other.0 - self.0;
                match sub.cmp(&0x8000_0000) {
                    Ordering::Less => Some(Ordering::Less),
                    Ordering::Greater => Some(Ordering::Greater),
                    Ordering::Equal => None,
                }
            }
            Ordering::Greater => {
                let sub = self.0 - other.0;
                match sub.cmp(&0x8000_0000) {
                    Ordering::Less => Some(Ordering::Greater),
                    Ordering::Greater => Some(Ordering::Less),
                    Ordering::Equal => None,
                }
            }
        }
    }
}

//============ Tests =========================================================
