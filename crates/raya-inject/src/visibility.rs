//! Visibility validation for reflective targets

use tracing::debug;

use crate::error::{InjectError, InjectResult};
use crate::member::{Member, Visibility};

/// Ensure `member` can be called from the resolver.
///
/// - Private and protected members are rejected with
///   [`InjectError::AccessViolation`] and left untouched.
/// - Package-visible members get their access override granted.
/// - Public members are left alone.
///
/// Calling this again on an already validated member has no further effect.
pub fn validate_visibility<M: Member + ?Sized>(member: &M) -> InjectResult<()> {
    match member.visibility() {
        Visibility::Private | Visibility::Protected => {
            debug!(member = %member, visibility = %member.visibility(), "rejecting reflective target");
            Err(InjectError::AccessViolation {
                member: member.to_string(),
                visibility: member.visibility(),
            })
        }
        Visibility::Package => {
            if !member.access_flag().is_granted() {
                debug!(member = %member, "granting access override");
            }
            member.access_flag().grant();
            Ok(())
        }
        Visibility::Public => Ok(()),
    }
}
