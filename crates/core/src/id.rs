// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numeric identifiers assigned by the store on insert.

use thiserror::Error;

/// Error returned when a string does not hold a valid numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id: {value:?}")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub value: String,
}

/// Define a newtype ID wrapper around `u64`.
///
/// Generates `new()`, `get()`, `Display`, `FromStr`, and `From<u64>`
/// implementations. IDs serialize as bare numbers so they match the wire
/// format the agent and operator UI expect.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct HostId("host");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($kind:literal);
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const KIND: &'static str = $kind;

            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::id::ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self).map_err(|_| $crate::id::ParseIdError {
                    kind: Self::KIND,
                    value: s.to_string(),
                })
            }
        }
    };
}

define_id! {
    /// Identifier of an enrolled host.
    pub struct HostId("host");
}

define_id! {
    /// Identifier of a label.
    pub struct LabelId("label");
}

define_id! {
    /// Identifier of a saved or ephemeral query.
    pub struct QueryId("query");
}

define_id! {
    /// Identifier of a query pack.
    pub struct PackId("pack");
}

define_id! {
    /// Identifier of a distributed query campaign.
    pub struct CampaignId("campaign");
}

define_id! {
    /// Identifier of an operator account.
    pub struct UserId("user");
}

define_id! {
    /// Identifier of an operator session.
    pub struct SessionId("session");
}

define_id! {
    /// Identifier of a config decorator query.
    pub struct DecoratorId("decorator");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
