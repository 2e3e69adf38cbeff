use crate::{
    auth::session::SessionState,
    errors::{AppError, AppResult},
    models::domain::user::{Role, User},
};

pub fn require_user(state: &SessionState) -> AppResult<&User> {
    state
        .user()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

pub fn require_role<'a>(state: &'a SessionState, role: &Role) -> AppResult<&'a User> {
    let user = require_user(state)?;
    if &user.role != role {
        return Err(AppError::Unauthorized(format!(
            "Only {} accounts can perform this action",
            role
        )));
    }
    Ok(user)
}

pub fn require_teacher(state: &SessionState) -> AppResult<&User> {
    require_role(state, &Role::Teacher)
}

pub fn require_student(state: &SessionState) -> AppResult<&User> {
    require_role(state, &Role::Student)
}
