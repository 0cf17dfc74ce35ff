use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A discovered instance paired with the identity derived for it during
/// discovery. The attribute map is the provider's raw record; it is consumed
/// read-only after discovery, and the identity is carried alongside rather
/// than patched into the map.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Instance {
    pub identity: String,
    pub attributes: Value,
}

impl Instance {
    pub fn new(identity: String, attributes: Value) -> Self {
        Instance {
            identity,
            attributes,
        }
    }

    /// Value of the configured alarm dimension attribute, e.g. the instance id.
    pub fn dimension_value(&self, dim_name: &str) -> Option<&str> {
        self.attributes.get(dim_name).and_then(Value::as_str)
    }
}

/// One tag returned by a secondary tag lookup call.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TagEntry {
    pub key: String,
    pub value: String,
}
