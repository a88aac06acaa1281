//! Signs and the validated sign roster
//!
//! The roster is fetched once from the sign driver. Every sign must share
//! the same dimensions so that any bitmap can be shown on any sign.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use flipapps_protocol::SignInfo;

use super::bitmap::Bitmap;

/// Roster validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Driver reported no signs
    Empty,
    /// A sign's dimensions differ from the first sign's
    SizeMismatch {
        name: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::Empty => f.write_str("sign driver reported no signs"),
            RosterError::SizeMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "sign {name} is {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

impl core::error::Error for RosterError {}

/// One physical sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sign {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Sign {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn to_info(&self) -> SignInfo {
        SignInfo {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

impl From<&SignInfo> for Sign {
    fn from(info: &SignInfo) -> Self {
        Sign::new(info.name.as_str(), info.width, info.height)
    }
}

/// Non-empty list of equally sized signs, in driver order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRoster {
    signs: Vec<Sign>,
}

impl SignRoster {
    /// Validate and wrap a sign list
    pub fn new(signs: Vec<Sign>) -> Result<Self, RosterError> {
        let first = signs.first().ok_or(RosterError::Empty)?;
        let expected = first.size();
        if let Some(odd) = signs.iter().find(|sign| sign.size() != expected) {
            return Err(RosterError::SizeMismatch {
                name: odd.name.clone(),
                expected,
                actual: odd.size(),
            });
        }
        Ok(Self { signs })
    }

    /// Build a roster from driver-reported sign descriptions
    pub fn from_infos(infos: &[SignInfo]) -> Result<Self, RosterError> {
        Self::new(infos.iter().map(Sign::from).collect())
    }

    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    /// Always false; a roster holds at least one sign
    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// Shared (width, height) of every sign
    pub fn size(&self) -> (u32, u32) {
        self.signs[0].size()
    }

    /// All-false bitmap of sign size
    pub fn blank(&self) -> Bitmap {
        let (width, height) = self.size();
        Bitmap::blank(width, height)
    }

    pub fn infos(&self) -> Vec<SignInfo> {
        self.signs.iter().map(Sign::to_info).collect()
    }
}
