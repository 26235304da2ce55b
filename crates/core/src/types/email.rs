//! Email addresses as typed into the sign-in and registration forms.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a form value is not an email address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email cannot contain spaces")]
    ContainsWhitespace,
    #[error("email must look like name@domain")]
    Malformed,
    #[error("email domain must contain a dot")]
    DomainWithoutDot,
}

/// A loosely validated email address.
///
/// The backend owns account lookup, so this only catches typos worth a
/// toast before a round trip. Surrounding whitespace is trimmed and the
/// domain is lowercased; the local part is kept as typed.
///
/// ```
/// use emporium_core::Email;
///
/// let email = Email::parse(" Sam@Emporium.TEST ").unwrap();
/// assert_eq!(email.as_str(), "Sam@emporium.test");
///
/// assert!(Email::parse("sam").is_err());
/// assert!(Email::parse("sam@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and normalize a form value.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] that applies.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EmailError::Empty);
        }
        if input.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if input.contains(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let Some((local, domain)) = input.split_once('@') else {
            return Err(EmailError::Malformed);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(EmailError::Malformed);
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(EmailError::DomainWithoutDot);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_domain_only() {
        let email = Email::parse("\tNoor+Lamps@Emporium.Test\n").unwrap();
        assert_eq!(email.as_str(), "Noor+Lamps@emporium.test");
    }

    #[test]
    fn test_parse_rejects_typos() {
        assert_eq!(Email::parse("  "), Err(EmailError::Empty));
        assert_eq!(Email::parse("noor"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@emporium.test"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("noor@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@b@c.d"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("noor@localhost"), Err(EmailError::DomainWithoutDot));
        assert_eq!(Email::parse("noor@test."), Err(EmailError::DomainWithoutDot));
        assert_eq!(
            Email::parse("no or@emporium.test"),
            Err(EmailError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_parse_length_limit() {
        let long = format!("{}@emporium.test", "n".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_user_facing_message() {
        assert_eq!(
            EmailError::Malformed.to_string(),
            "email must look like name@domain"
        );
    }
}
