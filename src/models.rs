use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A cashbook returned by `GET r1/cashbooks`.
///
/// Only `id` is typed; every other field the API sends is kept in `fields`.
/// A numeric id is kept in its decimal form, a missing or null one is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, deserialize_with = "scalar_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Book {
    /// Get a field by a slash-separated path, e.g. `"address/city"`
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.fields, path)
    }

    /// Get a string field by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

/// A customer or supplier returned by `GET r1/{bookId}/contacts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "scalar_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Contact {
    /// Get a field by a slash-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.fields, path)
    }

    /// Get a string field by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

/// Accept a string or number id; null becomes `None`.
fn scalar_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

/// Walk a slash-separated path through nested objects and arrays.
/// Numeric parts index into arrays.
fn lookup<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('/').filter(|s| !s.is_empty());

    let mut current = fields.get(parts.next()?)?;

    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                arr.get(index)?
            }
            _ => return None,
        };
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_deserialization() {
        let json = r#"[{"id": "b1", "bookName": "Main", "countryCode": "AU"}]"#;

        let books: Vec<Book> = serde_json::from_str(json).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id.as_deref(), Some("b1"));
        assert_eq!(books[0].get_string("bookName"), Some("Main".to_string()));
        assert!(!books[0].fields.contains_key("id"));
    }

    #[test]
    fn test_contact_nested_get() {
        let json = r#"{
            "id": "c7",
            "name": "Acme Pty Ltd",
            "addresses": [{"type": "postal", "city": "Sydney"}]
        }"#;

        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.id.as_deref(), Some("c7"));
        assert_eq!(contact.get_string("addresses/0/city"), Some("Sydney".to_string()));
        assert_eq!(contact.get("addresses/1/city"), None);
        assert_eq!(contact.get("name/first"), None);
        assert_eq!(contact.get(""), None);
    }

    #[test]
    fn test_record_without_id() {
        let contact: Contact = serde_json::from_str(r#"{"name": "Walk-in"}"#).unwrap();
        assert_eq!(contact.id, None);
        assert_eq!(contact.get_string("name"), Some("Walk-in".to_string()));
    }

    #[test]
    fn test_numeric_and_null_ids() {
        let json = r#"[{"id": 42, "bookName": "x"}, {"id": null, "bookName": "y"}, {"id": "b3"}]"#;

        let books: Vec<Book> = serde_json::from_str(json).unwrap();
        assert_eq!(books.len(), 3);
        assert_eq!(books[0].id.as_deref(), Some("42"));
        assert_eq!(books[0].get_string("bookName"), Some("x".to_string()));
        assert_eq!(books[1].id, None);
        assert_eq!(books[2].id.as_deref(), Some("b3"));

        let contacts: Vec<Contact> = serde_json::from_str(r#"[{"id": null, "name": "y"}]"#).unwrap();
        assert_eq!(contacts[0].id, None);
        assert_eq!(contacts[0].get_string("name"), Some("y".to_string()));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(serde_json::from_str::<Vec<Book>>(r#"["b1"]"#).is_err());
    }
}
