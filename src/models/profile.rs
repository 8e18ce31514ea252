use serde::{Deserialize, Serialize};

/// Role carried by the `profiles` record of a user. Purely an
/// authorization predicate input; not part of the unlock workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "profile_role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    Recruiter,
    Driver,
}
