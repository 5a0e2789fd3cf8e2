//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use gamehub_core::{Email, Role, UserId};

/// A storefront user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Name shown in the navigation; falls back to the email.
    pub display_name: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name to greet the user with.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.email.as_str())
    }
}

/// A user and their role, for the admin role screen.
#[derive(Debug, Clone)]
pub struct UserWithRole {
    pub user: User,
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        let mut user = User {
            id: UserId::generate(),
            email: Email::parse("seller@example.com").unwrap(),
            display_name: None,
            created_at: Utc::now(),
        };
        assert_eq!(user.greeting_name(), "seller@example.com");

        user.display_name = Some("Ace".to_string());
        assert_eq!(user.greeting_name(), "Ace");
    }
}
