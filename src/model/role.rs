#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    HrAdmin = 1,
    Employee = 2,
}

/// Operations guarded by the capability table below.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    CreateLeave,
    ViewOwnLeaves,
    ViewPendingQueue,
    DecideLeave,
    ViewAllLeaves,
    ManageEmployees,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::HrAdmin),
            2 => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Capability lookup consulted at the start of every operation.
    /// Self-approval is blocked separately by the approval engine.
    pub fn allows(self, action: Action) -> bool {
        match (self, action) {
            (Role::HrAdmin, _) => true,
            (Role::Employee, Action::CreateLeave) => true,
            (Role::Employee, Action::ViewOwnLeaves) => true,
            (Role::Employee, _) => false,
        }
    }

    /// Whether the caller may see a request owned by `owner_id`.
    /// Every read path applies this same rule: HR sees everything,
    /// everyone else only their own records.
    pub fn may_view(self, caller_id: u64, owner_id: u64) -> bool {
        self.allows(Action::ViewAllLeaves) || caller_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hr_admin_holds_every_capability() {
        for action in [
            Action::CreateLeave,
            Action::ViewOwnLeaves,
            Action::ViewPendingQueue,
            Action::DecideLeave,
            Action::ViewAllLeaves,
            Action::ManageEmployees,
        ] {
            assert!(Role::HrAdmin.allows(action));
        }
    }

    #[test]
    fn employee_is_limited_to_own_requests() {
        assert!(Role::Employee.allows(Action::CreateLeave));
        assert!(Role::Employee.allows(Action::ViewOwnLeaves));
        assert!(!Role::Employee.allows(Action::DecideLeave));
        assert!(!Role::Employee.allows(Action::ViewPendingQueue));
        assert!(!Role::Employee.allows(Action::ViewAllLeaves));
        assert!(!Role::Employee.allows(Action::ManageEmployees));
    }

    #[test]
    fn employee_never_sees_another_employees_request() {
        // employee A (id 1) vs a request owned by employee B (id 2)
        assert!(!Role::Employee.may_view(1, 2));
        assert!(Role::Employee.may_view(1, 1));
    }

    #[test]
    fn hr_admin_sees_any_request() {
        assert!(Role::HrAdmin.may_view(1, 2));
        assert!(Role::HrAdmin.may_view(1, 1));
    }

    #[test]
    fn unknown_role_id_is_rejected() {
        assert_eq!(Role::from_id(1), Some(Role::HrAdmin));
        assert_eq!(Role::from_id(2), Some(Role::Employee));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }
}
