/// Moves the UI to another route.
///
/// The store calls this on logout; the route guard calls it when a
/// protected view loses its session. Navigating to the route the UI is
/// already on must be harmless, because both can fire for the same
/// logout.
///
/// Any `Fn(&str)` closure is a navigator:
///
/// ```rust
/// use learnhub_session::Navigator;
///
/// let nav = |route: &str| println!("go to {route}");
/// nav.navigate("/login");
/// ```
pub trait Navigator: Send + Sync + 'static {
    /// Navigates to `route`.
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, route: &str) {
        self(route);
    }
}
