// 👤 Client Entity
//
// A client's state is the worst state among all of their sales, paid or not.

use super::ids::ClientId;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub lastname: String,

    /// National id document number
    pub dni: String,

    pub state: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub lastname: String,
    #[serde(default)]
    pub dni: String,
}

/// Number of clients currently in one state (dashboard pie chart)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientStatusCount {
    pub state: Severity,
    pub client_count: u64,
}

/// Zero-fill missing states so every severity is always reported, in severity order
pub fn complete_status_counts(counts: &[(Severity, u64)]) -> Vec<ClientStatusCount> {
    Severity::ALL
        .iter()
        .map(|&state| ClientStatusCount {
            state,
            client_count: counts
                .iter()
                .filter(|(s, _)| *s == state)
                .map(|(_, n)| n)
                .sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_status_counts_zero_fills() {
        let counts = complete_status_counts(&[(Severity::Suspended, 2)]);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0], ClientStatusCount { state: Severity::Ok, client_count: 0 });
        assert_eq!(counts[1], ClientStatusCount { state: Severity::Warning, client_count: 0 });
        assert_eq!(counts[2], ClientStatusCount { state: Severity::Suspended, client_count: 2 });
    }
}
