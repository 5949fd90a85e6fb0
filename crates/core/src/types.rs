/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The caller identity every mutating operation receives.
///
/// Resolved by the authentication layer before any decision logic runs:
/// `user_id` comes from the session token, `is_elevated` from the user row
/// (platform staff who may approve clubs and see pending content), and
/// `role` is the caller's membership role in the club being mutated, if any.
/// There is no ambient "current user" — every function that needs the caller
/// takes an `Actor` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub is_elevated: bool,
    pub role: Option<crate::roles::Role>,
}

impl Actor {
    /// An actor with no membership in the club under mutation.
    pub fn outsider(user_id: DbId, is_elevated: bool) -> Self {
        Self {
            user_id,
            is_elevated,
            role: None,
        }
    }

    /// An actor holding the given membership role in the club.
    pub fn member(user_id: DbId, role: crate::roles::Role) -> Self {
        Self {
            user_id,
            is_elevated: false,
            role: Some(role),
        }
    }
}

/// The viewer identity read operations receive.
///
/// `is_active_member` refers to the club being viewed; anonymous visitors
/// are `Viewer { is_elevated: false, is_active_member: false }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer {
    pub is_elevated: bool,
    pub is_active_member: bool,
}
