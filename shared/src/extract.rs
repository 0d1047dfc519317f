//! Field extractors: each consumes a fixed number of tokens and yields a fragment.

use crate::event::Fragment;
use crate::tokenizer::Tokens;
use serde_json::{Map, Value};

const POSITION: [&str; 3] = ["x", "y", "z"];
const ORIENTATION: [&str; 3] = ["ang0", "ang1", "ang2"];
const HEALTH_ARMOUR: [&str; 2] = ["health", "armour"];

/// The field layouts a parser table entry can be built from.
///
/// The string is the key the extracted fragment is stored under; for
/// [`FieldExtractor::Entity`] it is the entity type tag instead, since
/// entities always land under `entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldExtractor {
    /// `clientId`, `x,y,z` position, `a,b,c` orientation.
    Actor(&'static str),
    /// Entity id and `x,y,z` position.
    Entity(&'static str),
    /// A bare `x,y,z` position.
    Coordinates(&'static str),
    /// `health,armour` pair.
    HealthArmour(&'static str),
    Team(&'static str),
    Name(&'static str),
    Int(&'static str),
}

impl FieldExtractor {
    /// Number of tokens consumed.
    pub fn arity(&self) -> usize {
        match self {
            FieldExtractor::Actor(_) => 3,
            FieldExtractor::Entity(_) => 2,
            _ => 1,
        }
    }

    /// Label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match *self {
            FieldExtractor::Actor(name)
            | FieldExtractor::Entity(name)
            | FieldExtractor::Coordinates(name)
            | FieldExtractor::HealthArmour(name)
            | FieldExtractor::Team(name)
            | FieldExtractor::Name(name)
            | FieldExtractor::Int(name) => name,
        }
    }

    /// Reads this extractor's tokens and builds its fragment.
    ///
    /// Tokens are copied as strings; values that are not valid numbers pass
    /// through untouched. Returns `None` if the line runs out of tokens.
    pub fn extract(&self, tokens: &mut Tokens<'_>) -> Option<Fragment> {
        let fragment = match *self {
            FieldExtractor::Actor(name) => {
                let client_id = tokens.next()?;
                let position = tokens.next()?;
                let orientation = tokens.next()?;

                let mut actor = Map::new();
                actor.insert("clientId".to_string(), text(client_id));
                actor.insert("coordinates".to_string(), tuple(position, &POSITION));
                actor.insert("orientation".to_string(), tuple(orientation, &ORIENTATION));
                single(name, Value::Object(actor))
            }
            FieldExtractor::Entity(kind) => {
                let id = tokens.next()?;
                let position = tokens.next()?;

                let mut entity = Map::new();
                entity.insert("type".to_string(), text(kind));
                entity.insert("id".to_string(), text(id));
                entity.insert("coordinates".to_string(), tuple(position, &POSITION));
                single("entity", Value::Object(entity))
            }
            FieldExtractor::Coordinates(name) => {
                let position = tokens.next()?;
                single(name, single_value("coordinates", tuple(position, &POSITION)))
            }
            FieldExtractor::HealthArmour(name) => single(name, tuple(tokens.next()?, &HEALTH_ARMOUR)),
            FieldExtractor::Team(name) => single(name, single_value("team", text(tokens.next()?))),
            FieldExtractor::Name(name) => single(name, single_value("name", text(tokens.next()?))),
            FieldExtractor::Int(name) => single(name, text(tokens.next()?)),
        };
        Some(fragment)
    }
}

fn text(token: &str) -> Value {
    Value::String(token.to_string())
}

fn single(key: &str, value: Value) -> Fragment {
    let mut fragment = Map::new();
    fragment.insert(key.to_string(), value);
    fragment
}

fn single_value(key: &str, value: Value) -> Value {
    Value::Object(single(key, value))
}

/// Splits a comma-separated tuple onto `names`. Missing components are left
/// out and surplus ones ignored.
fn tuple(token: &str, names: &[&str]) -> Value {
    Value::Object(
        names
            .iter()
            .zip(token.split(','))
            .map(|(name, component)| (name.to_string(), text(component)))
            .collect(),
    )
}
