//! Navigation guard.
//!
//! Decides, before a navigation target renders, whether the current session
//! may see it or must be sent elsewhere. Session validity is judged by the
//! presence of the refresh credential, which lives in restricted storage,
//! rather than by anything a page script could forge.

use serde::{Deserialize, Serialize};

/// Paths the guard knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    /// The login view.
    pub login: String,
    /// Where signed-in users land, and where privileged users are sent
    /// instead of personal-account pages.
    pub landing: String,
    /// Where sessions lacking privilege are sent from privileged sections.
    pub unprivileged_landing: String,
    /// Prefixes that need a signed-in session.
    pub authenticated: Vec<String>,
    /// Prefixes that need the privilege flag.
    pub privileged: Vec<String>,
    /// Personal-account pages reserved for non-privileged users.
    pub personal: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            landing: "/store/movies".to_string(),
            unprivileged_landing: "/store/movies".to_string(),
            authenticated: vec!["/store".to_string(), "/admin".to_string()],
            privileged: vec!["/admin".to_string()],
            personal: vec!["/store/profile".to_string(), "/store/account".to_string()],
        }
    }
}

/// Session facts the guard may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardState {
    /// A refresh credential is stored.
    pub has_refresh: bool,
    /// The current access token decodes with the privilege flag.
    pub is_privileged: bool,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "location", rename_all = "lowercase")]
pub enum GuardDecision {
    /// Render the target.
    Allow,
    /// Navigate to this path instead.
    Redirect(String),
}

impl GuardDecision {
    /// The redirect location, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::Redirect(path) => Some(path),
        }
    }
}

/// Evaluates navigation targets against a [`RouteTable`].
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    routes: RouteTable,
}

impl RouteGuard {
    /// Create a guard over the given routes.
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    /// Returns the route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide what to do with `target`. The first matching rule wins:
    ///
    /// 1. no refresh credential on an authenticated path: go to login
    /// 2. refresh credential on the login view: go to the landing page
    /// 3. privileged path without privilege: go to the unprivileged landing
    /// 4. privileged session on a personal-account page: go to the landing page
    pub fn evaluate(&self, target: &str, state: GuardState) -> GuardDecision {
        let path = strip_query(target);
        let routes = &self.routes;

        if !state.has_refresh && matches_any(path, &routes.authenticated) {
            return GuardDecision::Redirect(routes.login.clone());
        }

        if state.has_refresh && matches_prefix(path, &routes.login) {
            return GuardDecision::Redirect(routes.landing.clone());
        }

        if !state.is_privileged && matches_any(path, &routes.privileged) {
            return GuardDecision::Redirect(routes.unprivileged_landing.clone());
        }

        if state.is_privileged && matches_any(path, &routes.personal) {
            return GuardDecision::Redirect(routes.landing.clone());
        }

        GuardDecision::Allow
    }
}

fn strip_query(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

fn matches_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| matches_prefix(path, prefix))
}

/// Segment-aware prefix match: `/store` covers `/store` and `/store/x`
/// but not `/storefront`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANONYMOUS: GuardState = GuardState {
        has_refresh: false,
        is_privileged: false,
    };
    const MEMBER: GuardState = GuardState {
        has_refresh: true,
        is_privileged: false,
    };
    const ADMIN: GuardState = GuardState {
        has_refresh: true,
        is_privileged: true,
    };

    fn redirect(path: &str) -> GuardDecision {
        GuardDecision::Redirect(path.to_string())
    }

    #[test]
    fn anonymous_store_visit_goes_to_login() {
        let guard = RouteGuard::default();
        assert_eq!(guard.evaluate("/store/movies", ANONYMOUS), redirect("/login"));
        assert_eq!(guard.evaluate("/admin/panel", ANONYMOUS), redirect("/login"));
    }

    #[test]
    fn signed_in_login_visit_goes_to_landing() {
        let guard = RouteGuard::default();
        assert_eq!(guard.evaluate("/login", MEMBER), redirect("/store/movies"));
        assert_eq!(guard.evaluate("/login", ADMIN), redirect("/store/movies"));
    }

    #[test]
    fn unprivileged_admin_visit_goes_to_landing() {
        let guard = RouteGuard::default();
        assert_eq!(guard.evaluate("/admin/panel", MEMBER), redirect("/store/movies"));
    }

    #[test]
    fn privileged_personal_page_goes_to_shared_landing() {
        let guard = RouteGuard::default();
        assert_eq!(guard.evaluate("/store/profile", ADMIN), redirect("/store/movies"));
        assert_eq!(guard.evaluate("/store/account", ADMIN), redirect("/store/movies"));
        assert_eq!(guard.evaluate("/store/profile", MEMBER), GuardDecision::Allow);
    }

    #[test]
    fn allowed_navigation() {
        let guard = RouteGuard::default();
        assert_eq!(guard.evaluate("/login", ANONYMOUS), GuardDecision::Allow);
        assert_eq!(guard.evaluate("/store/movies", MEMBER), GuardDecision::Allow);
        assert_eq!(guard.evaluate("/admin/panel", ADMIN), GuardDecision::Allow);
        assert_eq!(guard.evaluate("/", ANONYMOUS), GuardDecision::Allow);
    }

    #[test]
    fn privilege_without_refresh_still_goes_to_login() {
        // A forged access token cannot stand in for the refresh credential.
        let forged = GuardState {
            has_refresh: false,
            is_privileged: true,
        };
        assert_eq!(
            RouteGuard::default().evaluate("/admin/panel", forged),
            redirect("/login")
        );
    }

    #[test]
    fn prefixes_match_whole_segments() {
        let guard = RouteGuard::default();
        assert_eq!(guard.evaluate("/storefront", ANONYMOUS), GuardDecision::Allow);
        assert_eq!(guard.evaluate("/store", ANONYMOUS), redirect("/login"));
        assert_eq!(guard.evaluate("/login-help", MEMBER), GuardDecision::Allow);
    }

    #[test]
    fn query_and_fragment_are_ignored() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.evaluate("/store/movies?page=2", ANONYMOUS),
            redirect("/login")
        );
        assert_eq!(guard.evaluate("/login#top", MEMBER), redirect("/store/movies"));
    }

    #[test]
    fn partial_route_table_keeps_defaults() {
        let routes: RouteTable =
            serde_json::from_str(r#"{ "login": "/signin", "authenticated": ["/library"] }"#)
                .unwrap();
        assert_eq!(routes.login, "/signin");
        assert_eq!(routes.authenticated, vec!["/library".to_string()]);
        assert_eq!(routes.landing, RouteTable::default().landing);
        assert_eq!(routes.privileged, RouteTable::default().privileged);
    }

    #[test]
    fn decision_serializes_with_location() {
        let json = serde_json::to_value(redirect("/login")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "decision": "redirect", "location": "/login" })
        );
        assert_eq!(redirect("/login").location(), Some("/login"));
        assert_eq!(GuardDecision::Allow.location(), None);
    }
}
