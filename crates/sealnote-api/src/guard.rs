//! Object-level authorization for by-id note routes.
//!
//! `decide` is the whole policy. `enforce` wraps it with the log events and
//! the error the handlers return. Neither touches the store: callers look up
//! the owner first and answer 404 themselves when the note is missing.

use std::fmt;

use tracing::warn;

use crate::error::ApiError;
use crate::token::Caller;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Caller owns the note.
    Owner,
    /// Bypass flag is on; allowed without looking at ownership.
    Bypassed,
    Denied,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Access::Denied)
    }
}

pub fn decide(owner_id: i64, caller_id: i64, bypass: bool) -> Access {
    if bypass {
        Access::Bypassed
    } else if owner_id == caller_id {
        Access::Owner
    } else {
        Access::Denied
    }
}

pub fn enforce(
    action: Action,
    note_id: i64,
    owner_id: i64,
    caller: Caller,
    bypass: bool,
) -> Result<(), ApiError> {
    match decide(owner_id, caller.user_id, bypass) {
        Access::Owner => Ok(()),
        Access::Bypassed => {
            warn!(
                "IDOR bypass active: skipping owner check for {} of note {} by user {}",
                action, note_id, caller.user_id
            );
            Ok(())
        }
        Access::Denied => {
            warn!(
                "Access denied: user {} attempted to {} note {} owned by user {}",
                caller.user_id, action, note_id, owner_id
            );
            Err(ApiError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn owner_allowed() {
        assert_eq!(decide(1, 1, false), Access::Owner);
        assert!(enforce(Action::Read, 10, 1, Caller { user_id: 1 }, false).is_ok());
    }

    #[test]
    fn stranger_denied() {
        assert_eq!(decide(1, 2, false), Access::Denied);
        assert!(matches!(
            enforce(Action::Delete, 10, 1, Caller { user_id: 2 }, false),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn bypass_allows_stranger() {
        assert_eq!(decide(1, 2, true), Access::Bypassed);
        assert!(enforce(Action::Update, 10, 1, Caller { user_id: 2 }, true).is_ok());
    }

    proptest! {
        #[test]
        fn allows_iff_bypass_or_owner(owner in any::<i64>(), caller in any::<i64>(), bypass in any::<bool>()) {
            let allowed = decide(owner, caller, bypass).is_allowed();
            prop_assert_eq!(allowed, bypass || owner == caller);

            let enforced = enforce(Action::Read, 1, owner, Caller { user_id: caller }, bypass).is_ok();
            prop_assert_eq!(enforced, allowed);
        }

        #[test]
        fn same_id_always_allowed(id in any::<i64>(), bypass in any::<bool>()) {
            prop_assert!(decide(id, id, bypass).is_allowed());
        }
    }
}
