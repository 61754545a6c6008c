use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin = 1,
    Faculty = 2,
    Warden = 3,
    Student = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Faculty),
            3 => Some(Role::Warden),
            4 => Some(Role::Student),
            _ => None,
        }
    }

    /// Roles allowed to approve or reject leave requests.
    pub fn can_decide_leave(self) -> bool {
        matches!(self, Role::Admin | Role::Faculty | Role::Warden)
    }

    pub fn can_mark_attendance(self) -> bool {
        matches!(self, Role::Admin | Role::Faculty | Role::Warden)
    }
}
