//! Strongly-typed identifiers used across keygate.
//!
//! Identifiers are assigned by storage (users) or provisioned out-of-band
//! (applications); this crate never generates them.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Identifier of a user in the shared directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a calling application (tenant).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(i32);

macro_rules! impl_int_newtype {
    ($t:ty, $inner:ty) => {
        impl $t {
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$inner> for $t {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $inner {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(<$inner>::from_str(s)?))
            }
        }
    };
}

impl_int_newtype!(UserId, i64);
impl_int_newtype!(AppId, i32);
