//! Structured events and the recursive merge that assembles them.

use serde::Serialize;
use serde_json::{Map, Value};

/// One extractor's contribution to an event, keyed by semantic field name.
pub type Fragment = Map<String, Value>;

/// A parsed log line, ready to be serialized for clients.
///
/// Always carries a `command` entry. Every other entry is a nested mapping
/// or a string copied verbatim from the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StructuredEvent {
    fields: Map<String, Value>,
}

impl StructuredEvent {
    /// Starts an event holding only its command name.
    pub fn new(command: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("command".to_string(), Value::String(command.to_string()));
        Self { fields }
    }

    /// The command that produced this event.
    pub fn command(&self) -> &str {
        self.fields
            .get("command")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Top-level entry for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Folds a fragment into the event using [`deep_merge`].
    pub fn merge(&mut self, fragment: Fragment) {
        deep_merge(&mut self.fields, fragment);
    }

    /// Name of the map this event reports, if any (`map.name`).
    pub fn map_name(&self) -> Option<&str> {
        self.fields
            .get("map")
            .and_then(|map| map.get("name"))
            .and_then(Value::as_str)
    }

    /// Serializes the event as the JSON text sent to clients.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.fields)
    }

    /// Consumes the event into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Merges `incoming` into `target` key by key.
///
/// Where both sides hold a mapping the merge recurses; in every other case
/// the incoming value replaces whatever was there.
pub fn deep_merge(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => deep_merge(existing, nested),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_new_event_has_command() {
        let event = StructuredEvent::new("bomb_beep");
        assert_eq!(event.command(), "bomb_beep");
        assert_eq!(event.to_json().unwrap(), r#"{"command":"bomb_beep"}"#);
    }

    #[test]
    fn test_disjoint_keys_union() {
        let mut target = object(json!({ "a": { "x": "1" } }));
        deep_merge(&mut target, object(json!({ "b": "2" })));
        assert_eq!(Value::Object(target), json!({ "a": { "x": "1" }, "b": "2" }));
    }

    #[test]
    fn test_nested_keys_union() {
        let mut target = object(json!({ "victim": { "clientId": "3", "team": "2" } }));
        deep_merge(&mut target, object(json!({ "victim": { "name": "bob" } })));
        assert_eq!(
            Value::Object(target),
            json!({ "victim": { "clientId": "3", "team": "2", "name": "bob" } })
        );
    }

    #[test]
    fn test_deep_nesting_recurses() {
        let mut target = object(json!({ "a": { "b": { "c": "1" } } }));
        deep_merge(&mut target, object(json!({ "a": { "b": { "d": "2" } } })));
        assert_eq!(
            Value::Object(target),
            json!({ "a": { "b": { "c": "1", "d": "2" } } })
        );
    }

    #[test]
    fn test_scalar_overwrites() {
        let mut target = object(json!({ "hitbox": "1", "victim": { "team": "2" } }));
        deep_merge(
            &mut target,
            object(json!({ "hitbox": "3", "victim": { "team": "3" } })),
        );
        assert_eq!(
            Value::Object(target),
            json!({ "hitbox": "3", "victim": { "team": "3" } })
        );
    }

    #[test]
    fn test_mapping_replaces_scalar_and_back() {
        let mut target = object(json!({ "a": "flat", "b": { "x": "1" } }));
        deep_merge(&mut target, object(json!({ "a": { "x": "1" }, "b": "flat" })));
        assert_eq!(Value::Object(target), json!({ "a": { "x": "1" }, "b": "flat" }));
    }

    #[test]
    fn test_map_name() {
        let mut event = StructuredEvent::new("round_end");
        assert_eq!(event.map_name(), None);
        event.merge(object(json!({ "map": { "name": "de_dust2" } })));
        assert_eq!(event.map_name(), Some("de_dust2"));
    }
}
