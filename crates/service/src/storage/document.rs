use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use models::user::{Record, ID_FIELD};

use crate::errors::ServiceError;

/// The whole persisted document: `{"<resource>": {"<id>": {..record..}}, ..}`.
///
/// Top-level keys other than the resource are kept as-is and written back
/// unchanged. Every mutation happens on this in-memory copy; backends are
/// responsible for reading and writing it in full.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDocument {
    resource: String,
    entries: Map<String, Value>,
    rest: Map<String, Value>,
}

impl CollectionDocument {
    /// An empty document holding only the resource map.
    pub fn empty(resource: &str) -> Self {
        Self { resource: resource.to_string(), entries: Map::new(), rest: Map::new() }
    }

    /// Parse a raw document. A non-object root or a missing/non-object
    /// resource key is malformed.
    pub fn parse(bytes: &[u8], resource: &str) -> Result<Self, ServiceError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::MalformedData(format!("document is not valid JSON: {}", e)))?;
        let Value::Object(mut rest) = value else {
            return Err(ServiceError::MalformedData("document root must be a JSON object".into()));
        };
        let entries = match rest.remove(resource) {
            Some(Value::Object(entries)) => entries,
            Some(_) => {
                return Err(ServiceError::MalformedData(format!("`{}` must be a JSON object", resource)));
            }
            None => {
                return Err(ServiceError::MalformedData(format!("document has no `{}` key", resource)));
            }
        };
        Ok(Self { resource: resource.to_string(), entries, rest })
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// All records, in map iteration order.
    pub fn records(&self) -> Result<Vec<Record>, ServiceError> {
        self.entries
            .iter()
            .map(|(id, v)| as_record(id, v).cloned())
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<Record, ServiceError> {
        let value = self.entries.get(id).ok_or_else(|| ServiceError::not_found(id))?;
        as_record(id, value).cloned()
    }

    /// Assign a fresh id to `data`, insert it and return the stored record.
    /// A caller-supplied `id` is overwritten.
    pub fn insert_new(&mut self, mut data: Record) -> Record {
        let id = Uuid::new_v4().to_string();
        data.insert(ID_FIELD.into(), Value::String(id.clone()));
        self.entries.insert(id, Value::Object(data.clone()));
        data
    }

    /// Shallow-merge `partial` onto the record. `id` is never overwritten.
    pub fn merge(&mut self, id: &str, partial: Record) -> Result<Record, ServiceError> {
        let value = self.entries.get_mut(id).ok_or_else(|| ServiceError::not_found(id))?;
        let Value::Object(record) = value else {
            return Err(malformed_entry(id));
        };
        for (field, v) in partial {
            if field == ID_FIELD {
                continue;
            }
            record.insert(field, v);
        }
        Ok(record.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<(), ServiceError> {
        self.entries.remove(id).map(|_| ()).ok_or_else(|| ServiceError::not_found(id))
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, ServiceError> {
        serde_json::to_vec(self).map_err(|e| ServiceError::MalformedData(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ServiceError> {
        serde_json::to_string(self).map_err(|e| ServiceError::MalformedData(e.to_string()))
    }
}

impl Serialize for CollectionDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rest.len() + 1))?;
        for (k, v) in &self.rest {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry(&self.resource, &self.entries)?;
        map.end()
    }
}

fn as_record<'a>(id: &str, value: &'a Value) -> Result<&'a Record, ServiceError> {
    value.as_object().ok_or_else(|| malformed_entry(id))
}

fn malformed_entry(id: &str) -> ServiceError {
    ServiceError::MalformedData(format!("entry {} is not a JSON object", id))
}
