/// Route Access Controller
///
/// Pure decision logic for every incoming request path. The controller never
/// touches the response object: it classifies a path plus an optional
/// principal role into a `Decision`, and the middleware in `lib.rs` translates
/// that decision into either forwarding the request or an HTTP redirect.
/// Keeping this as a plain function makes the whole access policy unit-testable
/// without spinning up a router.

// --- Decision Type ---

/// Decision
///
/// The output of the access controller. `Redirect` carries the target path the
/// client should be sent to; `Allow` lets the request proceed to routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(&'static str),
}

// --- Policy Tables ---

/// Marketing pages served without any session. Exact-match only: nested paths
/// (e.g. /events/{id}) fall through to the open-by-default rule instead.
const PUBLIC_PAGES: &[&str] = &[
    "/",
    "/about",
    "/programs",
    "/donate",
    "/donors",
    "/sponsors",
    "/events",
    "/contact",
    "/health",
];

/// API namespaces open to unauthenticated callers (payment provider callbacks
/// and the donation capture endpoints). Prefix-match.
const PUBLIC_API_PREFIXES: &[&str] = &["/api/donations", "/api/webhooks"];

/// Login/registration entry points. A principal that already holds a session
/// is bounced to their dashboard instead of being shown the form again.
const AUTH_ENTRY_PREFIXES: &[&str] = &["/login", "/register"];

/// The authenticated portal namespace and its role-gated subtrees.
const PORTAL_ROOT: &str = "/portal";
const ADMIN_SUBTREE: &str = "/portal/admin";
const BOARD_SUBTREE: &str = "/portal/board";

/// Redirect targets.
pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/portal/unauthorized";

/// Role → dashboard mapping, kept as an ordered data table rather than nested
/// conditionals. Roles missing from the table (including unknown or future
/// role strings) fall back to the volunteer dashboard. That silent default is
/// intentional, not an error path.
const DASHBOARDS: &[(&str, &str)] = &[
    ("admin", "/portal/admin"),
    ("board_member", "/portal/board"),
];

pub const DEFAULT_DASHBOARD: &str = "/portal/volunteer";

// --- Path Helpers ---

/// under
///
/// Prefix check that respects path segment boundaries: `/portal/admin` covers
/// `/portal/admin` and `/portal/admin/events`, but not `/portal/administrivia`.
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// dashboard_for
///
/// Resolves the landing dashboard for a role via the `DASHBOARDS` table.
pub fn dashboard_for(role: &str) -> &'static str {
    DASHBOARDS
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, path)| *path)
        .unwrap_or(DEFAULT_DASHBOARD)
}

// --- The Controller ---

/// decide
///
/// Classifies a request path against the access policy. Rules are evaluated in
/// order:
///
/// 1. Public pages (exact) and open API namespaces (prefix) always allow.
/// 2. Auth-entry paths allow anonymous visitors and redirect authenticated
///    principals to their role's dashboard.
/// 3. Portal paths require a session: anonymous visitors go to the login page,
///    the bare portal root (with or without trailing slash) resolves to the
///    role dashboard, and the admin/board subtrees reject under-privileged
///    roles with the unauthorized page.
/// 4. Everything else is open by default.
pub fn decide(path: &str, role: Option<&str>) -> Decision {
    // Rule 1: unconditional public surface.
    if PUBLIC_PAGES.contains(&path) {
        return Decision::Allow;
    }
    if PUBLIC_API_PREFIXES.iter().any(|p| under(path, p)) {
        return Decision::Allow;
    }

    // Rule 2: auth entry namespace.
    if AUTH_ENTRY_PREFIXES.iter().any(|p| under(path, p)) {
        return match role {
            // Already signed in: never show the login/register forms again.
            Some(role) => Decision::Redirect(dashboard_for(role)),
            None => Decision::Allow,
        };
    }

    // Rule 3: the protected portal namespace.
    if under(path, PORTAL_ROOT) {
        let Some(role) = role else {
            return Decision::Redirect(LOGIN_PATH);
        };

        // The portal root is a dispatcher, not a page. Trailing-slash form
        // must behave identically.
        if path == PORTAL_ROOT || path == "/portal/" {
            return Decision::Redirect(dashboard_for(role));
        }

        if under(path, ADMIN_SUBTREE) && role != "admin" {
            return Decision::Redirect(UNAUTHORIZED_PATH);
        }

        if under(path, BOARD_SUBTREE) && role != "admin" && role != "board_member" {
            return Decision::Redirect(UNAUTHORIZED_PATH);
        }

        return Decision::Allow;
    }

    // Rule 4: open by default.
    Decision::Allow
}
