use serde::Serialize;
use validator::Validate;

pub const MIN_PASSWORD_LEN: u64 = 6;

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email invalide"))]
    pub email: String,

    #[validate(length(min = 1, message = "Mot de passe requis"))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> Self {
        LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// Same endpoint as login; the backend sets the password on first use.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SetPasswordRequest {
    #[validate(email(message = "Email manquant"))]
    pub email: String,

    #[validate(length(min = "MIN_PASSWORD_LEN", message = "6 caractères minimum"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ClassNameRequest {
    #[validate(length(min = 1, max = 100, message = "Nom de classe requis"))]
    pub name: String,
}

impl ClassNameRequest {
    pub fn new(name: &str) -> Self {
        ClassNameRequest {
            name: name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateNameRequest {
    #[validate(length(min = 1, max = 100, message = "Nom vide"))]
    pub name: String,
}

impl UpdateNameRequest {
    pub fn new(name: &str) -> Self {
        UpdateNameRequest {
            name: name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdsRequest {
    #[validate(length(min = 1, message = "Sélectionne au moins un élève."))]
    pub student_ids: Vec<String>,
}

/// A file picked by the user, before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    /// Empty when the platform could not tell.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        UploadFile {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
