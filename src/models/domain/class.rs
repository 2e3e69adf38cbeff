use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::dto::wire::{self, FromWire};

pub const DEFAULT_CLASS_NAME: &str = "Classe";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub subject_ids: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Class {
    pub fn new(id: &str, name: &str) -> Self {
        Class {
            id: id.to_string(),
            name: name.to_string(),
            subject_ids: Vec::new(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn subject_count(&self) -> usize {
        self.subject_ids.len()
    }
}

impl FromWire for Class {
    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        let subject_ids = value
            .get("subjects")
            .and_then(Value::as_array)
            .map(|subjects| subjects.iter().filter_map(wire::id_of).collect())
            .unwrap_or_default();

        Some(Class {
            id: wire::id_of(value)?,
            name: wire::text_field(value, &["name", "title"])
                .unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string()),
            subject_ids,
            created_at: wire::date_field(value, &["createdAt"]),
        })
    }
}

/// The `limit` newest classes; undated ones sort last.
pub fn most_recent(classes: &[Class], limit: usize) -> Vec<Class> {
    let mut sorted = classes.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Outcome of `POST /classes/:id/invite-students`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteOutcome {
    pub added: Vec<String>,
    pub already_in_class: Vec<String>,
    pub invalid: Vec<String>,
}

impl InviteOutcome {
    pub fn from_response(value: &Value) -> Self {
        let results = value.get("results").unwrap_or(&Value::Null);
        let ids = |key: &str| -> Vec<String> {
            results
                .get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(wire::id_of).collect())
                .unwrap_or_default()
        };

        InviteOutcome {
            added: ids("added"),
            already_in_class: ids("alreadyInClass"),
            invalid: ids("invalid"),
        }
    }

    pub fn added_any(&self) -> bool {
        !self.added.is_empty()
    }

    /// One-line summary for the invitation banner.
    pub fn summary(&self) -> String {
        let mut skipped = Vec::new();
        if !self.already_in_class.is_empty() {
            skipped.push(format!("{} déjà dans la classe", self.already_in_class.len()));
        }
        if !self.invalid.is_empty() {
            skipped.push(format!("{} invalides", self.invalid.len()));
        }

        if self.added.is_empty() {
            if skipped.is_empty() {
                "Aucun élève ajouté.".to_string()
            } else {
                format!("Aucun élève ajouté : {}.", skipped.join(", "))
            }
        } else {
            let mut parts = vec![format!("{} ajouté(s)", self.added.len())];
            parts.extend(skipped);
            parts.join(" · ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_class_from_wire_with_populated_subjects() {
        let class = Class::from_wire(&json!({
            "_id": "c1",
            "name": "3M2",
            "subjects": [{"_id": "s1", "title": "Optique"}, "s2"]
        }))
        .unwrap();

        assert_eq!(class.id, "c1");
        assert_eq!(class.name, "3M2");
        assert_eq!(class.subject_ids, vec!["s1", "s2"]);
        assert_eq!(class.subject_count(), 2);
    }

    #[test]
    fn test_bare_string_is_not_a_class() {
        assert_eq!(Class::from_wire(&json!("Created")), None);
        assert_eq!(Class::from_wire(&json!(42)), None);
    }

    #[test]
    fn test_class_name_falls_back() {
        let class = Class::from_wire(&json!({"id": "c1", "title": "Physique"})).unwrap();
        assert_eq!(class.name, "Physique");
        let unnamed = Class::from_wire(&json!({"id": "c2"})).unwrap();
        assert_eq!(unnamed.name, DEFAULT_CLASS_NAME);
    }

    #[test]
    fn test_most_recent_classes() {
        let classes: Vec<Class> = ["2024-09-01T08:00:00Z", "2025-02-10T08:00:00Z", "bad"]
            .iter()
            .enumerate()
            .map(|(i, at)| Class::from_wire(&json!({"_id": format!("c{}", i), "createdAt": at})).unwrap())
            .collect();
        assert!(classes[2].created_at.is_none());

        let recent = most_recent(&classes, 2);
        let ids: Vec<&str> = recent.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c0"]);
        assert_eq!(most_recent(&classes, 5)[2].id, "c2");
    }

    #[test]
    fn test_invite_outcome_summary() {
        let none_added = InviteOutcome::from_response(&json!({
            "results": {"added": [], "alreadyInClass": ["a", "b"], "invalid": ["x"]}
        }));
        assert!(!none_added.added_any());
        assert_eq!(
            none_added.summary(),
            "Aucun élève ajouté : 2 déjà dans la classe, 1 invalides."
        );

        let some_added = InviteOutcome::from_response(&json!({
            "results": {"added": ["a"], "alreadyInClass": ["b"]}
        }));
        assert_eq!(some_added.summary(), "1 ajouté(s) · 1 déjà dans la classe");

        assert_eq!(InviteOutcome::from_response(&json!({})).summary(), "Aucun élève ajouté.");
    }
}
