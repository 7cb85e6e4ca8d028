//! Primary and foreign key declarations

use serde::{Deserialize, Serialize};

/// One field name or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyFields {
    Single(String),
    Composite(Vec<String>),
}

impl KeyFields {
    pub fn names(&self) -> Vec<&str> {
        match self {
            KeyFields::Single(name) => vec![name.as_str()],
            KeyFields::Composite(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            KeyFields::Single(_) => 1,
            KeyFields::Composite(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for KeyFields {
    fn from(name: &str) -> Self {
        KeyFields::Single(name.to_string())
    }
}

impl From<String> for KeyFields {
    fn from(name: String) -> Self {
        KeyFields::Single(name)
    }
}

impl<S: Into<String>> From<Vec<S>> for KeyFields {
    fn from(names: Vec<S>) -> Self {
        KeyFields::Composite(names.into_iter().map(Into::into).collect())
    }
}

/// Target of a foreign key. An empty `resource` refers to the same table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyReference {
    pub resource: String,
    pub fields: KeyFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub fields: KeyFields,
    pub reference: ForeignKeyReference,
}

impl ForeignKey {
    pub fn new(
        fields: impl Into<KeyFields>,
        resource: impl Into<String>,
        reference_fields: impl Into<KeyFields>,
    ) -> Self {
        Self {
            fields: fields.into(),
            reference: ForeignKeyReference {
                resource: resource.into(),
                fields: reference_fields.into(),
            },
        }
    }

    /// Whether the key points back into the table that declares it
    pub fn is_self_reference(&self) -> bool {
        self.reference.resource.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_fields_serde_shapes() {
        let single: KeyFields = serde_json::from_value(json!("id")).unwrap();
        assert_eq!(single, KeyFields::Single("id".to_string()));

        let composite: KeyFields = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(composite.names(), vec!["a", "b"]);
        assert_eq!(composite.len(), 2);
    }

    #[test]
    fn test_foreign_key_serde() {
        let fk: ForeignKey = serde_json::from_value(json!({
            "fields": "state",
            "reference": {"resource": "states", "fields": "code"}
        }))
        .unwrap();
        assert_eq!(fk, ForeignKey::new("state", "states", "code"));
        assert!(!fk.is_self_reference());
        assert!(ForeignKey::new("parent", "", "id").is_self_reference());
    }
}
