use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    Manager = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::Manager),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Roles whose users receive every new PTO request.
    pub fn receives_pto_requests(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for role in [Role::Admin, Role::Hr, Role::Employee, Role::Manager] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn only_hr_and_admin_receive_requests() {
        assert!(Role::Admin.receives_pto_requests());
        assert!(Role::Hr.receives_pto_requests());
        assert!(!Role::Manager.receives_pto_requests());
        assert!(!Role::Employee.receives_pto_requests());
    }
}
