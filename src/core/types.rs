//! core::types
//!
//! Strong types for instance addressing.
//!
//! # Types
//!
//! - [`Kind`] - The three container kinds
//! - [`InstanceName`] - Validated `list<N>` / `hash<N>` / `bm<N>` name
//!
//! # Validation
//!
//! Names are validated at construction time, so a malformed name is
//! rejected before any slot is looked at. Slot-count bounds depend on
//! configuration and are checked by the registry.
//!
//! # Examples
//!
//! ```
//! use slotwise::core::types::{InstanceName, Kind};
//!
//! let name: InstanceName = "bm3".parse().unwrap();
//! assert_eq!(name.kind(), Kind::Bitmap);
//! assert_eq!(name.index(), 3);
//! assert_eq!(name.to_string(), "bm3");
//!
//! assert!("list".parse::<InstanceName>().is_err());
//! assert!(InstanceName::parse_as(Kind::List, "hash0").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid instance name '{0}': expected list<N>, hash<N> or bm<N>")]
    InvalidName(String),

    #[error("'{name}' is not a {expected} name")]
    WrongKind { name: String, expected: Kind },

    #[error("unknown container type '{0}': expected list, hashtable or bitmap")]
    UnknownKind(String),

    #[error("'{name}' is out of range: slots run from 0 to {}", .slots.saturating_sub(1))]
    SlotOutOfRange { name: String, slots: usize },
}

/// Container kind, fixed by an instance name's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    List,
    Hash,
    Bitmap,
}

impl Kind {
    /// Every kind, in prefix-matching order.
    pub const ALL: [Kind; 3] = [Kind::List, Kind::Hash, Kind::Bitmap];

    /// Name prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Kind::List => "list",
            Kind::Hash => "hash",
            Kind::Bitmap => "bm",
        }
    }

    /// Type token used by `create`.
    pub fn type_token(self) -> &'static str {
        match self {
            Kind::List => "list",
            Kind::Hash => "hashtable",
            Kind::Bitmap => "bitmap",
        }
    }

    /// Parses a `create` type token.
    pub fn from_type_token(token: &str) -> Result<Self, TypeError> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.type_token() == token)
            .ok_or_else(|| TypeError::UnknownKind(token.to_string()))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::List => "list",
            Kind::Hash => "hash table",
            Kind::Bitmap => "bitmap",
        })
    }
}

/// A validated instance name: kind prefix followed by a decimal slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceName {
    kind: Kind,
    index: usize,
}

impl InstanceName {
    /// Builds a name from its parts.
    pub fn new(kind: Kind, index: usize) -> Self {
        Self { kind, index }
    }

    /// Parses a name of any kind.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidName` unless the text is a known prefix
    /// followed by one or more ASCII digits.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidName(text.to_string());
        let (kind, digits) = Kind::ALL
            .into_iter()
            .find_map(|kind| text.strip_prefix(kind.prefix()).map(|rest| (kind, rest)))
            .ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let index = digits.parse().map_err(|_| invalid())?;
        Ok(Self { kind, index })
    }

    /// Parses a name that must be of `kind`.
    pub fn parse_as(kind: Kind, text: &str) -> Result<Self, TypeError> {
        let name = Self::parse(text)?;
        if name.kind != kind {
            return Err(TypeError::WrongKind {
                name: text.to_string(),
                expected: kind,
            });
        }
        Ok(name)
    }

    /// The container kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The slot index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Checks the index against a registry of `slots` slots per kind.
    pub fn check_slot(&self, slots: usize) -> Result<usize, TypeError> {
        if self.index < slots {
            Ok(self.index)
        } else {
            Err(TypeError::SlotOutOfRange {
                name: self.to_string(),
                slots,
            })
        }
    }
}

impl FromStr for InstanceName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.index)
    }
}
