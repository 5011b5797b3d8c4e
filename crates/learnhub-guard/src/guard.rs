//! The route guard and its task handle.

use std::sync::Arc;

use learnhub_session::{Navigator, Session};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{GuardState, Transition};

/// What a protected view should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<V> {
    /// Hydration hasn't finished. Show a non-interactive placeholder.
    Loading,
    /// No session. The guard has already redirected; show nothing.
    Nothing,
    /// Signed in. The protected content.
    Content(V),
}

impl<V> Rendered<V> {
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    pub fn into_content(self) -> Option<V> {
        match self {
            Self::Content(content) => Some(content),
            _ => None,
        }
    }
}

fn render_for<V>(state: GuardState, children: impl FnOnce() -> V) -> Rendered<V> {
    match state {
        GuardState::Pending => Rendered::Loading,
        GuardState::Unauthenticated => Rendered::Nothing,
        GuardState::Authenticated => Rendered::Content(children()),
    }
}

/// Gates a protected view on session state.
///
/// Feed it sessions with [`observe`](Self::observe) (or let
/// [`spawn`](Self::spawn) do it from the store's watch channel). The
/// redirect to the login route happens when the guard *enters*
/// `Unauthenticated`, never from [`render`](Self::render), so rendering
/// the same state twice can't redirect twice.
pub struct RouteGuard {
    state: GuardState,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl RouteGuard {
    /// Creates a guard in the `Pending` state.
    pub fn new(navigator: Arc<dyn Navigator>, login_route: impl Into<String>) -> Self {
        Self {
            state: GuardState::Pending,
            navigator,
            login_route: login_route.into(),
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Applies a session snapshot.
    ///
    /// Returns the transition if the state changed. Entering
    /// `Unauthenticated` navigates to the login route.
    pub fn observe(&mut self, session: &Session) -> Option<Transition> {
        let next = GuardState::from_session(session);
        if next == self.state {
            return None;
        }
        if !self.state.can_transition_to(next) {
            tracing::warn!(from = %self.state, to = %next, "ignoring invalid guard transition");
            return None;
        }

        let transition = Transition {
            from: self.state,
            to: next,
        };
        self.state = next;
        tracing::debug!(from = %transition.from, to = %transition.to, "guard transition");

        if next == GuardState::Unauthenticated {
            tracing::info!(route = %self.login_route, "no session, redirecting");
            self.navigator.navigate(&self.login_route);
        }

        Some(transition)
    }

    /// Decides what a protected view shows. `children` only runs when
    /// signed in.
    pub fn render<V>(&self, children: impl FnOnce() -> V) -> Rendered<V> {
        render_for(self.state, children)
    }

    /// Runs the guard as a Tokio task following `sessions`.
    ///
    /// The task ends when the session store (the sender) is dropped or the
    /// returned handle is dropped.
    pub fn spawn(mut self, mut sessions: watch::Receiver<Session>) -> GuardHandle {
        let (state_tx, state_rx) = watch::channel(self.state);

        let task = tokio::spawn(async move {
            loop {
                let snapshot = sessions.borrow_and_update().clone();
                if let Some(transition) = self.observe(&snapshot) {
                    state_tx.send_replace(transition.to);
                }

                if sessions.changed().await.is_err() {
                    break;
                }
            }
            tracing::debug!("session store dropped, route guard stopped");
        });

        GuardHandle {
            state: state_rx,
            task: Some(task),
        }
    }
}

/// A running [`RouteGuard`].
///
/// Dropping the handle stops the guard.
pub struct GuardHandle {
    state: watch::Receiver<GuardState>,

    /// `None` only after `join` has taken it.
    task: Option<JoinHandle<()>>,
}

impl GuardHandle {
    /// The guard's current state.
    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    /// A receiver that sees every guard state change.
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.clone()
    }

    /// See [`RouteGuard::render`].
    pub fn render<V>(&self, children: impl FnOnce() -> V) -> Rendered<V> {
        render_for(self.state(), children)
    }

    /// Waits until hydration has finished and returns the settled state.
    ///
    /// Returns `None` if the guard stopped first.
    pub async fn settled(&mut self) -> Option<GuardState> {
        self.state
            .wait_for(|state| state.is_settled())
            .await
            .ok()
            .map(|state| *state)
    }

    /// Stops the guard task.
    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Waits for the guard task to finish without stopping it.
    pub async fn join(mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(e) = task.await {
            if e.is_panic() {
                tracing::error!(error = %e, "route guard task panicked");
            }
        }
    }
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use learnhub_session::{Role, User};

    use super::*;

    fn recording() -> (Arc<dyn Navigator>, Arc<Mutex<Vec<String>>>) {
        let routes = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&routes);
        let navigator: Arc<dyn Navigator> =
            Arc::new(move |route: &str| log.lock().unwrap().push(route.to_string()));
        (navigator, routes)
    }

    fn pending_with_token() -> Session {
        Session {
            token: Some("tok".into()),
            user: Some(User {
                id: "1".into(),
                email: "ada@example.com".into(),
                role: Role::Student,
            }),
            ..Session::default()
        }
    }

    fn hydrated(session: Session) -> Session {
        Session {
            has_hydrated: true,
            ..session
        }
    }

    #[test]
    fn test_render_pending_never_renders_content() {
        let (navigator, routes) = recording();
        let mut guard = RouteGuard::new(navigator, "/login");

        assert_eq!(guard.observe(&pending_with_token()), None);
        let mut rendered_children = false;
        let view = guard.render(|| rendered_children = true);

        assert_eq!(view, Rendered::Loading);
        assert!(!rendered_children);
        assert!(routes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_observe_hydrated_without_token_redirects_once() {
        let (navigator, routes) = recording();
        let mut guard = RouteGuard::new(navigator, "/login");
        let signed_out = hydrated(Session::default());

        let transition = guard.observe(&signed_out);
        guard.observe(&signed_out);

        assert_eq!(
            transition,
            Some(Transition {
                from: GuardState::Pending,
                to: GuardState::Unauthenticated
            })
        );
        assert_eq!(guard.render(|| "secret"), Rendered::Nothing);
        assert_eq!(*routes.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_observe_hydrated_with_token_renders_without_redirect() {
        let (navigator, routes) = recording();
        let mut guard = RouteGuard::new(navigator, "/login");

        guard.observe(&hydrated(pending_with_token()));

        assert_eq!(guard.state(), GuardState::Authenticated);
        assert_eq!(guard.render(|| "dashboard"), Rendered::Content("dashboard"));
        assert!(routes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_observe_logout_after_authenticated_redirects() {
        let (navigator, routes) = recording();
        let mut guard = RouteGuard::new(navigator, "/signin");
        guard.observe(&hydrated(pending_with_token()));

        guard.observe(&hydrated(Session::default()));

        assert_eq!(guard.state(), GuardState::Unauthenticated);
        assert_eq!(*routes.lock().unwrap(), vec!["/signin".to_string()]);
    }

    #[test]
    fn test_observe_never_returns_to_pending() {
        let (navigator, _routes) = recording();
        let mut guard = RouteGuard::new(navigator, "/login");
        guard.observe(&hydrated(pending_with_token()));

        assert_eq!(guard.observe(&pending_with_token()), None);
        assert_eq!(guard.state(), GuardState::Authenticated);
    }

    #[test]
    fn test_rendered_into_content() {
        assert_eq!(Rendered::Content(3).into_content(), Some(3));
        assert_eq!(Rendered::<i32>::Loading.into_content(), None);
        assert!(!Rendered::<i32>::Nothing.is_content());
    }
}
