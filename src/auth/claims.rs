use serde::Serialize;
use serde_json::Value;

use crate::models::domain::user::{Role, User};
use crate::models::dto::wire::{self, FromWire};

/// Fields the client reads from the JWT payload. The backend signs with
/// `id` or `_id` and `role` or `type` depending on its version.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub user_id: Option<String>,
    pub role: Role,
    pub school_id: Option<String>,
    pub exp: Option<i64>,
}

impl TokenPayload {
    /// The user described by the token, if it names one.
    pub fn to_user(&self) -> Option<User> {
        let id = self.user_id.as_deref()?;
        let mut user = User::new(id, self.role.clone());
        user.school_id = self.school_id.clone();
        Some(user)
    }
}

impl FromWire for TokenPayload {
    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(TokenPayload {
            user_id: wire::id_of(value),
            role: wire::string_field(value, &["role", "type"])
                .map(|r| Role::parse(&r))
                .unwrap_or(Role::Unknown),
            school_id: wire::reference_id(value, "schoolId"),
            exp: wire::optional_number(value, &["exp"]).map(|e| e as i64),
        })
    }
}
