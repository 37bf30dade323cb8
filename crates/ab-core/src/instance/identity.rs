use serde::{Deserialize, Serialize};

/// Key shared by every launch that competes for the same exclusivity token.
///
/// Derived from the application name and the current user so that two users
/// on one machine each get their own primary instance. The value is safe to
/// use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceIdentity(String);

impl InstanceIdentity {
    /// Build an identity from an explicit key, sanitising it for file names.
    pub fn new(key: &str) -> Self {
        Self(sanitize(key))
    }

    /// Derive the identity from app name and user name.
    pub fn derive(app_name: &str, user: &str) -> Self {
        if user.is_empty() {
            return Self::new(app_name);
        }
        Self::new(&format!("{app_name}-{user}"))
    }

    /// Derive the identity for the user running this process.
    ///
    /// Falls back to the app name alone when no user can be determined.
    pub fn for_current_user(app_name: &str) -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();
        #[cfg(feature = "tracing")]
        if user.is_empty() {
            tracing::debug!(app_name, "No user name in environment, identity uses app name only");
        }
        Self::derive(app_name, &user)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitize(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "app".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_combines_app_and_user() {
        let id = InstanceIdentity::derive("demo", "alice");
        assert_eq!(id.as_str(), "demo-alice");
    }

    #[test]
    fn derive_without_user_uses_app_name() {
        assert_eq!(InstanceIdentity::derive("demo", "").as_str(), "demo");
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let id = InstanceIdentity::derive("My App/../x", "DOMAIN\\bob");
        assert_eq!(id.as_str(), "My_App_.._x-DOMAIN_bob");
        assert!(!id.as_str().contains('/'));
    }

    #[test]
    fn leading_dots_and_empty_keys_are_normalised() {
        assert_eq!(InstanceIdentity::new("..hidden").as_str(), "hidden");
        assert_eq!(InstanceIdentity::new("").as_str(), "app");
    }
}
