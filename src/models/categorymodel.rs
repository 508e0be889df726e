use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::HashMap;
use uuid::Uuid;

/// Attribute schema is a map of attribute name to a comma-separated list of
/// allowed values, e.g. {"pipe_type": "copper,pvc,steel"}.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub attribute_schema: Json<HashMap<String, String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    /// Validates job attributes against this category's schema. Returns the
    /// first offending attribute as an error message, if any.
    pub fn check_attributes(&self, attributes: &HashMap<String, String>) -> Result<(), String> {
        for (name, value) in attributes {
            match self.attribute_schema.get(name) {
                None => {
                    return Err(format!(
                        "Attribute '{}' is not defined for category '{}'",
                        name, self.name
                    ));
                }
                Some(allowed) => {
                    let ok = allowed.split(',').map(str::trim).any(|v| v == value);
                    if !ok {
                        return Err(format!(
                            "Value '{}' is not allowed for attribute '{}'",
                            value, name
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_with_schema(pairs: &[(&str, &str)]) -> Category {
        let schema = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Category {
            id: Uuid::new_v4(),
            name: "Plumbing".to_string(),
            description: "Pipes and fittings".to_string(),
            attribute_schema: Json(schema),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn accepts_attributes_within_schema() {
        let category = category_with_schema(&[("pipe_type", "copper,pvc,steel")]);
        let mut attrs = HashMap::new();
        attrs.insert("pipe_type".to_string(), "pvc".to_string());
        assert!(category.check_attributes(&attrs).is_ok());
    }

    #[test]
    fn rejects_unknown_attribute() {
        let category = category_with_schema(&[("pipe_type", "copper,pvc")]);
        let mut attrs = HashMap::new();
        attrs.insert("voltage".to_string(), "220".to_string());
        assert!(category.check_attributes(&attrs).is_err());
    }

    #[test]
    fn rejects_disallowed_value() {
        let category = category_with_schema(&[("pipe_type", "copper,pvc")]);
        let mut attrs = HashMap::new();
        attrs.insert("pipe_type".to_string(), "lead".to_string());
        assert!(category.check_attributes(&attrs).is_err());
    }

    #[test]
    fn empty_attributes_always_pass() {
        let category = category_with_schema(&[]);
        assert!(category.check_attributes(&HashMap::new()).is_ok());
    }
}
