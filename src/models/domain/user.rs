use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::dto::wire::{self, FromWire};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Teacher,
    Student,
    Other(String),
    Unknown,
}

impl Role {
    /// Trimmed, case-insensitive.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "" => Role::Unknown,
            "teacher" => Role::Teacher,
            "student" => Role::Student,
            _ => Role::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Other(other) => other,
            Role::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Unknown)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::parse(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl User {
    pub fn new(id: &str, role: Role) -> Self {
        User {
            id: id.to_string(),
            role,
            email: None,
            name: None,
            school_id: None,
            profile_image: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    /// Greeting name: the part of the email before `@`, cut at 12 chars.
    pub fn short_handle(&self) -> Option<String> {
        let local = self.email.as_deref()?.split('@').next()?.trim();
        if local.is_empty() {
            return None;
        }
        if local.chars().count() > 12 {
            Some(format!("{}…", local.chars().take(12).collect::<String>()))
        } else {
            Some(local.to_string())
        }
    }
}

impl FromWire for User {
    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        let id = wire::id_of(value)?;
        let role = wire::string_field(value, &["role", "type"])
            .map(|r| Role::parse(&r))
            .unwrap_or(Role::Unknown);

        Some(User {
            id,
            role,
            email: wire::text_field(value, &["email"]),
            name: wire::text_field(value, &["name", "fullName"]),
            school_id: wire::reference_id(value, "schoolId"),
            profile_image: wire::text_field(value, &["profileImage", "avatar"]),
        })
    }
}

/// A student row in a roster or invitation list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub in_class: bool,
}

impl StudentSummary {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Élève")
    }
}

impl FromWire for StudentSummary {
    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        Some(StudentSummary {
            id: wire::id_of(value)?,
            name: wire::text_field(value, &["name", "fullName"]),
            email: wire::text_field(value, &["email"]),
            in_class: wire::bool_field(value, &["inClass", "alreadyInClass", "isInClass"]),
        })
    }
}

#[cfg(test)]
impl User {
    pub fn test_teacher(id: &str) -> Self {
        User::new(id, Role::Teacher).with_email(&format!("{}@school.ch", id))
    }

    pub fn test_student(id: &str) -> Self {
        User::new(id, Role::Student).with_email(&format!("{}@school.ch", id))
    }
}
