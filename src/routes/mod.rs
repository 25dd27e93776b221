/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. This structure ensures that
/// access control is applied explicitly at the module level (via Axum layers
/// and the route access controller), preventing accidental exposure of
/// protected endpoints.
///
/// The modules map directly to the path namespaces the access controller
/// reasons about.

/// Routes accessible to all users (anonymous, read-only, plus the auth entry
/// points and the donation webhook namespace).
/// Handlers must enforce visibility checks (`is_public` / `is_published` /
/// `is_active`) at the Repository level.
pub mod public;

/// Portal routes available to every authenticated role (volunteer features).
/// Protected by the `AuthUser` extractor middleware.
pub mod portal;

/// Routes under /portal/board, restricted to 'admin' and 'board_member'.
pub mod board;

/// Routes under /portal/admin, restricted exclusively to users with the
/// 'admin' role. Implements mandatory authorization checks.
pub mod admin;
