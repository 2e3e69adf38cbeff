//! Checks run before a request leaves the client.

use crate::{
    errors::{AppError, AppResult},
    models::dto::request::{UploadFile, MIN_PASSWORD_LEN},
};

pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];
pub const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

pub fn validate_document(file: &UploadFile) -> AppResult<()> {
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation("Fichier trop lourd (max 4MB)."));
    }

    let mime = file.mime.trim();
    let supported = if mime.is_empty() {
        let name = file.file_name.to_lowercase();
        DOCUMENT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    } else {
        DOCUMENT_MIME_TYPES.contains(&mime)
    };

    if !supported {
        return Err(AppError::validation("Format non supporté (PDF, DOC, DOCX)."));
    }
    Ok(())
}

pub fn validate_profile_image(file: &UploadFile) -> AppResult<()> {
    if !IMAGE_MIME_TYPES.contains(&file.mime.trim()) {
        return Err(AppError::validation("Format invalide (JPG, PNG, WEBP)"));
    }
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation("Image > 4MB"));
    }
    Ok(())
}

pub fn validate_new_password(password: &str, confirmation: &str) -> AppResult<()> {
    if password.is_empty() || confirmation.is_empty() {
        return Err(AppError::validation("Champs requis"));
    }
    if (password.chars().count() as u64) < MIN_PASSWORD_LEN {
        return Err(AppError::validation("6 caractères minimum"));
    }
    if password != confirmation {
        return Err(AppError::validation("Confirmation incorrecte"));
    }
    Ok(())
}

pub fn require_text(value: &str, message: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_rules() {
        let pdf = UploadFile::new("cours.pdf", "application/pdf", vec![0; 10]);
        let unknown_mime_docx = UploadFile::new("Cours.DOCX", "", vec![0; 10]);
        let png = UploadFile::new("photo.png", "image/png", vec![0; 10]);
        let unknown_txt = UploadFile::new("notes.txt", "", vec![0; 10]);
        let too_big = UploadFile::new("big.pdf", "application/pdf", vec![0; MAX_UPLOAD_BYTES + 1]);

        assert!(validate_document(&pdf).is_ok());
        assert!(validate_document(&unknown_mime_docx).is_ok());
        assert!(validate_document(&png).is_err());
        assert!(validate_document(&unknown_txt).is_err());
        assert_eq!(
            validate_document(&too_big).unwrap_err().to_string(),
            "Validation error: Fichier trop lourd (max 4MB)."
        );
    }

    #[test]
    fn test_profile_image_rules() {
        assert!(validate_profile_image(&UploadFile::new("a.webp", "image/webp", vec![1])).is_ok());
        assert!(validate_profile_image(&UploadFile::new("a.gif", "image/gif", vec![1])).is_err());
        assert!(validate_profile_image(&UploadFile::new("a.jpg", "image/jpeg", vec![0; MAX_UPLOAD_BYTES + 1])).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_new_password("", "").is_err());
        assert!(validate_new_password("abc", "abc").is_err());
        assert!(validate_new_password("abcdef", "abcdeg").is_err());
        assert!(validate_new_password("abcdef", "abcdef").is_ok());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("  3M2 ", "Nom requis").unwrap(), "3M2");
        assert!(require_text("   ", "Nom requis").is_err());
    }
}
