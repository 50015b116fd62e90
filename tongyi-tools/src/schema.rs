//! JSON Schema for tool parameters.
//!
//! [`ObjectJsonSchema`] is the serde representation attached to a
//! [`ToolDefinition`](crate::ToolDefinition); [`SchemaBuilder`] is a fluent way
//! to assemble one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// JSON Schema for an object type (tool parameters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectJsonSchema {
    /// The schema type (always "object" for tool parameters).
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Property definitions, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, JsonValue>,

    /// List of required property names.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,

    /// Description of the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether additional properties are allowed.
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,
}

impl Default for ObjectJsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectJsonSchema {
    /// Create a new empty object schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: IndexMap::new(),
            required: Vec::new(),
            description: None,
            additional_properties: None,
        }
    }

    /// Add a property to the schema.
    #[must_use]
    pub fn with_property(mut self, name: &str, schema: JsonValue, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required && !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Forbid or allow properties beyond the declared ones.
    #[must_use]
    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    /// Get a property schema by name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&JsonValue> {
        self.properties.get(name)
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Fluent builder for [`ObjectJsonSchema`].
///
/// ```rust
/// use tongyi_tools::SchemaBuilder;
///
/// let schema = SchemaBuilder::new()
///     .string("city", "City name", true)
///     .enum_values("unit", "Temperature unit", &["celsius", "fahrenheit"], false)
///     .build();
///
/// assert_eq!(schema.required, vec!["city".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    schema: ObjectJsonSchema,
}

impl SchemaBuilder {
    /// Create a new empty schema builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn typed(self, name: &str, ty: &str, desc: &str, required: bool) -> Self {
        self.raw(
            name,
            serde_json::json!({ "type": ty, "description": desc }),
            required,
        )
    }

    /// Add a string property.
    #[must_use]
    pub fn string(self, name: &str, desc: &str, required: bool) -> Self {
        self.typed(name, "string", desc, required)
    }

    /// Add an integer property.
    #[must_use]
    pub fn integer(self, name: &str, desc: &str, required: bool) -> Self {
        self.typed(name, "integer", desc, required)
    }

    /// Add a number property.
    #[must_use]
    pub fn number(self, name: &str, desc: &str, required: bool) -> Self {
        self.typed(name, "number", desc, required)
    }

    /// Add a boolean property.
    #[must_use]
    pub fn boolean(self, name: &str, desc: &str, required: bool) -> Self {
        self.typed(name, "boolean", desc, required)
    }

    /// Add a string property restricted to fixed values.
    #[must_use]
    pub fn enum_values(self, name: &str, desc: &str, values: &[&str], required: bool) -> Self {
        self.raw(
            name,
            serde_json::json!({ "type": "string", "description": desc, "enum": values }),
            required,
        )
    }

    /// Add a property with a custom schema.
    #[must_use]
    pub fn raw(mut self, name: &str, schema: JsonValue, required: bool) -> Self {
        self.schema = self.schema.with_property(name, schema, required);
        self
    }

    /// Set the schema description.
    #[must_use]
    pub fn description(mut self, desc: &str) -> Self {
        self.schema = self.schema.with_description(desc);
        self
    }

    /// Finish the schema.
    #[must_use]
    pub fn build(self) -> ObjectJsonSchema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_properties() {
        let schema = SchemaBuilder::new()
            .string("s", "string", true)
            .integer("i", "integer", false)
            .number("n", "number", true)
            .boolean("b", "boolean", false)
            .description("all kinds")
            .build();

        assert_eq!(schema.properties.len(), 4);
        assert_eq!(schema.required, vec!["s".to_string(), "n".to_string()]);
        assert_eq!(schema.get_property("i").unwrap()["type"], "integer");
        assert_eq!(schema.description.as_deref(), Some("all kinds"));
    }

    #[test]
    fn test_required_not_duplicated() {
        let schema = ObjectJsonSchema::new()
            .with_property("a", serde_json::json!({"type": "string"}), true)
            .with_property("a", serde_json::json!({"type": "integer"}), true);
        assert_eq!(schema.required.len(), 1);
        assert_eq!(schema.get_property("a").unwrap()["type"], "integer");
    }

    #[test]
    fn test_to_json_shape() {
        let json = SchemaBuilder::new()
            .enum_values("unit", "Unit", &["c", "f"], true)
            .build()
            .with_additional_properties(false)
            .to_json()
            .unwrap();

        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["unit"]["enum"][1], "f");
        assert_eq!(json["additionalProperties"], false);
        assert!(json.get("description").is_none());
    }
}
