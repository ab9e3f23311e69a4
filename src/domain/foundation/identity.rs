//! Who is making a request, for quota purposes.
//!
//! Guests are keyed by a client address taken from request headers. That
//! address is spoofable, so guest quotas are best-effort rather than a
//! security boundary.

use std::fmt;

use super::{AuthenticatedUser, UserId};

/// Sentinel used when no client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// The caller as seen by the rate limiter and the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientIdentity {
    /// A caller with a validated account.
    User(UserId),
    /// An anonymous caller, identified by network address.
    Guest { ip: String },
}

/// Quota class derived from an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityClass {
    Guest,
    Authenticated,
}

impl ClientIdentity {
    /// Resolves the identity, preferring the authenticated account.
    pub fn resolve(user: Option<&AuthenticatedUser>, client_ip: Option<&str>) -> Self {
        match user {
            Some(user) => ClientIdentity::User(user.id.clone()),
            None => ClientIdentity::guest(client_ip.unwrap_or(UNKNOWN_CLIENT)),
        }
    }

    /// Creates a guest identity; blank addresses collapse to the sentinel.
    pub fn guest(ip: impl Into<String>) -> Self {
        let ip = ip.into();
        let ip = ip.trim();
        ClientIdentity::Guest {
            ip: if ip.is_empty() {
                UNKNOWN_CLIENT.to_string()
            } else {
                ip.to_string()
            },
        }
    }

    pub fn class(&self) -> IdentityClass {
        match self {
            ClientIdentity::User(_) => IdentityClass::Authenticated,
            ClientIdentity::Guest { .. } => IdentityClass::Guest,
        }
    }

    /// The bare identifier (user id or address).
    pub fn identifier(&self) -> &str {
        match self {
            ClientIdentity::User(id) => id.as_str(),
            ClientIdentity::Guest { ip } => ip,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            ClientIdentity::User(id) => Some(id),
            ClientIdentity::Guest { .. } => None,
        }
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientIdentity::User(id) => write!(f, "user:{}", id),
            ClientIdentity::Guest { ip } => write!(f, "ip:{}", ip),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_user_wins_over_address() {
        let user = AuthenticatedUser::new(UserId::new("cook-1").unwrap(), None);
        let identity = ClientIdentity::resolve(Some(&user), Some("10.0.0.1"));
        assert_eq!(identity.class(), IdentityClass::Authenticated);
        assert_eq!(identity.identifier(), "cook-1");
    }

    #[test]
    fn missing_address_uses_sentinel() {
        let identity = ClientIdentity::resolve(None, None);
        assert_eq!(identity, ClientIdentity::guest(UNKNOWN_CLIENT));
        assert_eq!(ClientIdentity::guest("  "), identity);
    }

    #[test]
    fn display_prefixes_scope() {
        assert_eq!(ClientIdentity::guest("1.2.3.4").to_string(), "ip:1.2.3.4");
        let user = ClientIdentity::User(UserId::new("u").unwrap());
        assert_eq!(user.to_string(), "user:u");
    }
}
