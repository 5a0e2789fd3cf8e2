//! User roles and the gates built from them.

use serde::{Deserialize, Serialize};

/// Role assigned to a user.
///
/// Roles are strictly ordered: `User < Checker < Admin`. A user without a
/// role row is a plain `User`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can browse, buy and submit sell requests.
    #[default]
    User,
    /// Can additionally review sell requests.
    Checker,
    /// Full access, including account, game and role management.
    Admin,
}

impl Role {
    /// All roles, lowest first.
    pub const ALL: [Self; 3] = [Self::User, Self::Checker, Self::Admin];

    /// Lower-case token stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Checker => "checker",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may review sell requests.
    #[must_use]
    pub const fn can_review(&self) -> bool {
        matches!(self, Self::Checker | Self::Admin)
    }

    /// Whether this role may use the admin screens.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "checker" => Ok(Self::Checker),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// The set of roles allowed through a gated screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    /// Sell-request review queue.
    pub const REVIEWERS: Self = Self {
        allowed: &[Role::Checker, Role::Admin],
    };

    /// Admin management screens.
    pub const ADMINS: Self = Self {
        allowed: &[Role::Admin],
    };

    /// Whether `role` may pass.
    #[must_use]
    pub fn admits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_ordered() {
        assert!(Role::User < Role::Checker);
        assert!(Role::Checker < Role::Admin);
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Checker".parse::<Role>().unwrap(), Role::Checker);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_gates() {
        assert!(!RoleGate::REVIEWERS.admits(Role::User));
        assert!(RoleGate::REVIEWERS.admits(Role::Checker));
        assert!(RoleGate::REVIEWERS.admits(Role::Admin));
        assert!(!RoleGate::ADMINS.admits(Role::Checker));
        assert!(RoleGate::ADMINS.admits(Role::Admin));
    }

    #[test]
    fn test_capabilities_match_gates() {
        for role in Role::ALL {
            assert_eq!(role.can_review(), RoleGate::REVIEWERS.admits(role));
            assert_eq!(role.is_admin(), RoleGate::ADMINS.admits(role));
        }
    }
}
