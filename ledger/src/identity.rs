//! Resolution of the calling party into an `OwnerId`.
use utxo_data_structures::chain::OwnerId;

use crate::{LedgerError, Result};

/// Maps the authenticated caller of an invocation to a stable owner identifier.
///
/// Authentication itself happens before the ledger is invoked: an implementation only has to
/// report who the caller is, or fail with `LedgerError::Unauthenticated` if nobody is.
pub trait IdentityResolver {
    fn resolve_caller_identity(&self) -> Result<OwnerId>;
}

impl<T: IdentityResolver + ?Sized> IdentityResolver for &T {
    fn resolve_caller_identity(&self) -> Result<OwnerId> {
        (**self).resolve_caller_identity()
    }
}

/// An already resolved identity
impl IdentityResolver for OwnerId {
    fn resolve_caller_identity(&self) -> Result<OwnerId> {
        Ok(*self)
    }
}

/// Identity given by the raw credential of the creator of an invocation.
///
/// The owner identifier is the SHA-256 digest of the credential.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreatorIdentity {
    creator: Option<Vec<u8>>,
}

impl CreatorIdentity {
    pub fn new<T: Into<Vec<u8>>>(creator: T) -> Self {
        Self {
            creator: Some(creator.into()),
        }
    }

    /// An invocation with no identity context
    pub fn anonymous() -> Self {
        Self { creator: None }
    }
}

impl IdentityResolver for CreatorIdentity {
    fn resolve_caller_identity(&self) -> Result<OwnerId> {
        match &self.creator {
            Some(creator) if !creator.is_empty() => Ok(OwnerId::from_credential(creator)),
            _ => Err(LedgerError::Unauthenticated),
        }
    }
}
