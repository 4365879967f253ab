//! Authenticated user identity.

/// Profile of the signed-in user, held in memory by the auth facade.
///
/// The id is opaque and provider-issued; session persistence is the
/// provider's concern, so nothing here is written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-issued unique user id
    pub id: String,
    /// Email address (may be None for some federated accounts)
    pub email: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Avatar/profile picture URL
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Name to greet the user with: display name, then email, then a fallback.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("User")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_name_prefers_display_name() {
        let identity = Identity {
            id: "u1".to_string(),
            email: Some("a@x.com".to_string()),
            display_name: Some("Alice".to_string()),
            avatar_url: None,
        };
        assert_eq!(identity.greeting_name(), "Alice");
    }

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        let identity = Identity {
            id: "u1".to_string(),
            email: Some("a@x.com".to_string()),
            display_name: None,
            avatar_url: None,
        };
        assert_eq!(identity.greeting_name(), "a@x.com");
    }
}
