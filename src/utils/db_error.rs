//! Mapping of database constraint names to API field names.

/// Returns the request field behind a unique constraint, if it is one a
/// client can fix by choosing a different value.
pub fn unique_violation_field(constraint: Option<&str>) -> Option<&'static str> {
    match constraint? {
        "users_username_key" => Some("username"),
        "users_email_key" => Some("email"),
        _ => None,
    }
}
