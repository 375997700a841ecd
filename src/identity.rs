use serde::{Deserialize, Serialize};
use std::fmt;

pub const NOT_CONFIGURED_NOTICE: &str = "Cloud identity is not configured. Using guest mode.";
pub const AUTH_FAILED_NOTICE: &str = "Authentication failed. Using guest mode.";

/// Profile of an authenticated coach.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// Who is using the planner. Only forwarded to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    User(UserProfile),
}

impl Identity {
    pub fn uid(&self) -> Option<&str> {
        match self {
            Identity::Guest => None,
            Identity::User(p) => Some(&p.uid),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }

    /// Short label for the status bar.
    pub fn label(&self) -> String {
        match self {
            Identity::Guest => "Guest (local only)".to_string(),
            Identity::User(p) => p
                .display_name
                .clone()
                .or_else(|| p.email.clone())
                .unwrap_or_else(|| p.uid.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    NotConfigured,
    Rejected(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotConfigured => write!(f, "identity provider is not configured"),
            AuthError::Rejected(reason) => write!(f, "sign-in rejected: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {}

pub trait IdentityProvider {
    fn sign_in(&self) -> Result<UserProfile, AuthError>;
}

/// Identity taken from the coach profile stored in the settings file.
pub struct ConfiguredIdentity {
    profile: Option<UserProfile>,
}

impl ConfiguredIdentity {
    pub fn new(profile: Option<UserProfile>) -> Self {
        Self { profile }
    }
}

impl IdentityProvider for ConfiguredIdentity {
    fn sign_in(&self) -> Result<UserProfile, AuthError> {
        let profile = self.profile.clone().ok_or(AuthError::NotConfigured)?;
        if profile.uid.trim().is_empty() {
            return Err(AuthError::Rejected("profile has no uid".into()));
        }
        Ok(profile)
    }
}

/// Sign in, falling back to guest mode with a notice on any failure.
pub fn sign_in_or_guest(provider: &dyn IdentityProvider) -> (Identity, Option<&'static str>) {
    match provider.sign_in() {
        Ok(profile) => {
            log::info!("Signed in as {}", profile.uid);
            (Identity::User(profile), None)
        }
        Err(AuthError::NotConfigured) => {
            log::warn!("No identity configured, continuing as guest");
            (Identity::Guest, Some(NOT_CONFIGURED_NOTICE))
        }
        Err(e) => {
            log::warn!("{e}");
            (Identity::Guest, Some(AUTH_FAILED_NOTICE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(uid: &str) -> UserProfile {
        UserProfile {
            uid: uid.into(),
            display_name: Some("Coach Ana".into()),
            ..UserProfile::default()
        }
    }

    #[test]
    fn configured_profile_signs_in() {
        let provider = ConfiguredIdentity::new(Some(profile("u-1")));
        let (identity, notice) = sign_in_or_guest(&provider);
        assert_eq!(identity.uid(), Some("u-1"));
        assert_eq!(identity.label(), "Coach Ana");
        assert!(notice.is_none());
    }

    #[test]
    fn missing_profile_falls_back_to_guest() {
        let (identity, notice) = sign_in_or_guest(&ConfiguredIdentity::new(None));
        assert!(identity.is_guest());
        assert_eq!(notice, Some(NOT_CONFIGURED_NOTICE));
    }

    #[test]
    fn blank_uid_is_rejected() {
        let (identity, notice) = sign_in_or_guest(&ConfiguredIdentity::new(Some(profile(" "))));
        assert!(identity.is_guest());
        assert_eq!(notice, Some(AUTH_FAILED_NOTICE));
        assert_eq!(identity.uid(), None);
    }
}
