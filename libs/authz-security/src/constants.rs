//! Well-known identifiers shared by the authorization gates and the
//! user-management service.

/// Role implicitly held by requests that carry no verified identity.
pub const ANONYMOUS_USERS_ROLE_ID: &str = "00000000-0000-0001-0000-000000000000";

/// Role implicitly held by every verified identity.
pub const AUTHENTICATED_USERS_ROLE_ID: &str = "00000000-0000-0002-0000-000000000000";

/// Role whose assignment grants access through the legacy admin gate.
pub const ADMIN_USERS_ROLE_ID: &str = "00000000-0000-0003-0000-000000000000";

/// Built-in administrator account. Internal service calls to user management
/// act as this user unless configured otherwise.
pub const DEFAULT_ADMIN_USER_ID: &str = "00000000-0000-4000-8000-000000000000";

/// Claim carrying the legacy admin flag.
pub const IS_ADMIN_CLAIM: &str = "isAdmin";

/// Claim carrying the user identifier in session tokens.
pub const USER_ID_CLAIM: &str = "userId";
