#![allow(clippy::unwrap_used, clippy::expect_used)]

use authz_security::constants::{
    ADMIN_USERS_ROLE_ID, ANONYMOUS_USERS_ROLE_ID, AUTHENTICATED_USERS_ROLE_ID,
    DEFAULT_ADMIN_USER_ID,
};

#[test]
fn well_known_ids_are_valid_uuids() {
    for id in [
        ANONYMOUS_USERS_ROLE_ID,
        AUTHENTICATED_USERS_ROLE_ID,
        ADMIN_USERS_ROLE_ID,
        DEFAULT_ADMIN_USER_ID,
    ] {
        let parsed = uuid::Uuid::parse_str(id).unwrap();
        assert_eq!(parsed.to_string(), id);
    }
}

#[test]
fn role_ids_are_distinct() {
    assert_ne!(ADMIN_USERS_ROLE_ID, AUTHENTICATED_USERS_ROLE_ID);
    assert_ne!(ADMIN_USERS_ROLE_ID, ANONYMOUS_USERS_ROLE_ID);
    assert_ne!(AUTHENTICATED_USERS_ROLE_ID, ANONYMOUS_USERS_ROLE_ID);
}
