//! LDAP-specific error types and conversions.

use grove_core::error::GroveError;

/// LDAP result code for `noSuchObject`.
const RC_NO_SUCH_OBJECT: u32 = 32;
/// LDAP result code for `entryAlreadyExists`.
const RC_ALREADY_EXISTS: u32 = 68;

/// Directory-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum LdapError {
    #[error("LDAP error: {0}")]
    Protocol(#[from] ldap3::LdapError),

    #[error("No such object: {dn}")]
    NoSuchObject { dn: String },

    #[error("Entry already exists: {dn}")]
    AlreadyExists { dn: String },

    #[error("Malformed entry {dn}: {reason}")]
    MalformedEntry { dn: String, reason: String },
}

impl LdapError {
    /// Classify a client error raised while operating on `dn`, pulling
    /// out the result codes callers branch on.
    pub(crate) fn at(dn: &str, err: ldap3::LdapError) -> Self {
        match err {
            ldap3::LdapError::LdapResult { result } if result.rc == RC_NO_SUCH_OBJECT => {
                Self::NoSuchObject { dn: dn.to_string() }
            }
            ldap3::LdapError::LdapResult { result } if result.rc == RC_ALREADY_EXISTS => {
                Self::AlreadyExists { dn: dn.to_string() }
            }
            other => Self::Protocol(other),
        }
    }
}

impl From<LdapError> for GroveError {
    fn from(err: LdapError) -> Self {
        match err {
            LdapError::NoSuchObject { dn } => GroveError::NotFound {
                entity: "directory entry".into(),
                id: dn,
            },
            LdapError::AlreadyExists { dn } => GroveError::AlreadyExists {
                entity: "directory entry".into(),
                id: dn,
            },
            LdapError::MalformedEntry { dn, reason } => GroveError::MalformedEntry { dn, reason },
            other => GroveError::Directory(other.to_string()),
        }
    }
}
