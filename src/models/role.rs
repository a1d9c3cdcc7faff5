use serde::{Deserialize, Serialize};

/// User role. Immutable after account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages users, courses, papers and payouts
    Admin,
    /// Authors questions against a claimed paper
    Maker,
    /// Reviews pending questions (approve / reject)
    Checker,
    /// Finalizes approved questions
    Expert,
}

/// A single permitted operation class.
///
/// Authorization is a capability set per role rather than per-endpoint
/// conditionals; handlers require one capability each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Claim papers and author/resubmit/delete own questions
    AuthorQuestions,
    /// Work the pending queue: approve, reject, bulk approve
    ReviewQuestions,
    /// Finalize approved questions
    FinalizeQuestions,
    /// Manage users, courses, papers; release claims
    ManageCatalog,
    /// View org-wide dashboards and trigger payouts
    ManagePayouts,
    /// Read a single question (all roles participate in the workflow)
    ViewQuestions,
}

impl Role {
    /// Standard display name.
    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Maker => "maker",
            Role::Checker => "checker",
            Role::Expert => "expert",
        }
    }

    /// Parse a role from its path/wire form (exact match).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "maker" => Some(Role::Maker),
            "checker" => Some(Role::Checker),
            "expert" => Some(Role::Expert),
            _ => None,
        }
    }

    /// Whether this role holds the given capability.
    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::AuthorQuestions => self == Role::Maker,
            Capability::ReviewQuestions => self == Role::Checker,
            Capability::FinalizeQuestions => self == Role::Expert,
            Capability::ManageCatalog | Capability::ManagePayouts => self == Role::Admin,
            Capability::ViewQuestions => true,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_names() {
        for role in [Role::Admin, Role::Maker, Role::Checker, Role::Expert] {
            assert_eq!(Role::parse(role.name()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn capabilities_are_disjoint_by_role() {
        assert!(Role::Maker.allows(Capability::AuthorQuestions));
        assert!(!Role::Maker.allows(Capability::ReviewQuestions));
        assert!(Role::Checker.allows(Capability::ReviewQuestions));
        assert!(!Role::Checker.allows(Capability::FinalizeQuestions));
        assert!(Role::Expert.allows(Capability::FinalizeQuestions));
        assert!(Role::Admin.allows(Capability::ManageCatalog));
        assert!(Role::Admin.allows(Capability::ManagePayouts));
        assert!(!Role::Admin.allows(Capability::AuthorQuestions));
    }
}
