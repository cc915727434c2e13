// 🔑 Typed identifiers
//
// Rows are keyed by SQLite integer ids. Each entity gets its own newtype so a
// sale id can never be handed to a quota lookup.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(id) if id > 0 => Ok($name(id)),
                    _ => Err(Error::InvalidId(s.to_string())),
                }
            }
        }
    };
}

entity_id!(
    /// Client row id
    ClientId
);
entity_id!(
    /// Sale row id
    SaleId
);
entity_id!(
    /// Quota (installment) row id
    QuotaId
);
entity_id!(
    /// Payment row id
    PaymentId
);
