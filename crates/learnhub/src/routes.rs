//! Client routes the session layer navigates to.

/// The landing page.
pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const FORGOT_PASSWORD: &str = "/forgot-password";
pub const RESET_PASSWORD: &str = "/reset-password";
pub const VERIFY_EMAIL: &str = "/verify-email";

/// Where a successful login lands.
pub const STUDENT_DASHBOARD: &str = "/dashboard/student";

/// Routes that render without a session.
pub const PUBLIC: [&str; 6] = [
    HOME,
    LOGIN,
    REGISTER,
    FORGOT_PASSWORD,
    RESET_PASSWORD,
    VERIFY_EMAIL,
];

/// Returns `true` if `route` needs a signed-in user.
///
/// Matches on the path only; a query string or fragment is ignored.
/// [`LearnhubClient::guard_for`](crate::LearnhubClient::guard_for) uses
/// this to decide whether a view gets a guard.
pub fn is_protected(route: &str) -> bool {
    let path = route.split(['?', '#']).next().unwrap_or(route);
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    !PUBLIC.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_protected() {
        assert!(is_protected(STUDENT_DASHBOARD));
        assert!(is_protected("/dashboard/student/courses"));
        assert!(!is_protected(LOGIN));
        assert!(!is_protected("/login/"));
        assert!(!is_protected("/reset-password?token=abc"));
        assert!(!is_protected("/verify-email#top"));
        assert!(!is_protected(HOME));
        assert!(!is_protected("/?lang=en"));
        assert!(is_protected("/profile"));
    }
}
