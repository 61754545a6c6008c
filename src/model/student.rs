use serde::{Deserialize, Serialize};

/// Read model over the user table; only the fields the leave workflow needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub dept: String,
}
