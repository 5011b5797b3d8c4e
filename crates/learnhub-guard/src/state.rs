//! Guard state machine.

use learnhub_session::Session;

/// What a protected view may do right now.
///
/// ```text
///            hydrated, no token
///   Pending ───────────────────→ Unauthenticated
///      │                            ↑       │
///      │ hydrated, token   logout / │       │ login
///      ▼                   expiry   │       ▼
///   Authenticated ──────────────────┘  Authenticated
/// ```
///
/// - **Pending**: persisted state hasn't been loaded. Nothing protected
///   may render, whatever the token says.
/// - **Unauthenticated**: hydrated with no token. The user belongs on the
///   login page.
/// - **Authenticated**: hydrated with a token. Protected content renders.
///
/// Nothing ever returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Pending,
    Unauthenticated,
    Authenticated,
}

impl GuardState {
    /// Derives the state a session puts the guard in.
    pub fn from_session(session: &Session) -> Self {
        if !session.has_hydrated {
            Self::Pending
        } else if session.is_authenticated() {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }

    /// Returns `true` once hydration has finished.
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns `true` if moving to `target` is a valid transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Authenticated | Self::Unauthenticated)
                | (Self::Authenticated, Self::Unauthenticated)
                | (Self::Unauthenticated, Self::Authenticated)
        )
    }
}

impl std::fmt::Display for GuardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authenticated => write!(f, "Authenticated"),
        }
    }
}

/// A state change the guard has applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GuardState,
    pub to: GuardState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(has_hydrated: bool, token: Option<&str>) -> Session {
        Session {
            token: token.map(String::from),
            has_hydrated,
            ..Session::default()
        }
    }

    #[test]
    fn test_from_session_not_hydrated_is_pending_even_with_token() {
        assert_eq!(GuardState::from_session(&session(false, None)), GuardState::Pending);
        assert_eq!(
            GuardState::from_session(&session(false, Some("tok"))),
            GuardState::Pending
        );
    }

    #[test]
    fn test_from_session_hydrated() {
        assert_eq!(
            GuardState::from_session(&session(true, None)),
            GuardState::Unauthenticated
        );
        assert_eq!(
            GuardState::from_session(&session(true, Some("tok"))),
            GuardState::Authenticated
        );
    }

    #[test]
    fn test_can_transition_to() {
        use GuardState::*;

        assert!(Pending.can_transition_to(Authenticated));
        assert!(Pending.can_transition_to(Unauthenticated));
        assert!(Authenticated.can_transition_to(Unauthenticated));
        assert!(Unauthenticated.can_transition_to(Authenticated));

        assert!(!Authenticated.can_transition_to(Pending));
        assert!(!Unauthenticated.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Authenticated.can_transition_to(Authenticated));
    }

    #[test]
    fn test_is_settled() {
        assert!(!GuardState::Pending.is_settled());
        assert!(GuardState::Unauthenticated.is_settled());
        assert!(GuardState::Authenticated.is_settled());
    }

    #[test]
    fn test_display() {
        assert_eq!(GuardState::Pending.to_string(), "Pending");
        assert_eq!(GuardState::Unauthenticated.to_string(), "Unauthenticated");
    }
}
