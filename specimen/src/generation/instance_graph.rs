//! Arena of generated instances
//!
//! Composite values live in the arena and are referenced by [`InstanceId`], so a back-reference
//! bound to an ancestor is just another `Ref` to an existing instance. JSON materialization breaks
//! such cycles by emitting `null` where an instance would contain itself.

use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::error::Result;
use crate::schema::TypeExpr;

/// Handle of an instance inside its [`InstanceGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

impl InstanceId {
    /// Position in the arena
    pub const fn index(self) -> usize { self.0 }
}

/// The value held by one slot
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nothing: null, skipped, or cut off
    Null,
    /// A generated or supplied leaf
    Leaf(JsonValue),
    /// A composite instance in the graph
    Ref(InstanceId),
}

impl Value {
    /// Leaf for anything but JSON `null`
    pub fn from_json(json: JsonValue) -> Self {
        if json.is_null() {
            Self::Null
        } else {
            Self::Leaf(json)
        }
    }

    /// Whether this is [`Value::Null`]
    pub const fn is_null(&self) -> bool { matches!(self, Self::Null) }

    /// Instance id of a composite value
    pub const fn as_ref_id(&self) -> Option<InstanceId> {
        match self {
            Self::Ref(id) => Some(*id),
            Self::Null | Self::Leaf(_) => None,
        }
    }
}

/// A composite value under construction or finished
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    /// A struct; fields appear in generation order, ignored fields are absent
    Object {
        /// Struct type
        ty:     TypeExpr,
        /// Field values by name
        fields: Vec<(String, Value)>,
    },
    /// Elements in generation order
    List(Vec<Value>),
    /// Distinct elements
    Set(Vec<Value>),
    /// Fixed-length elements; positions may be null
    Array(Vec<Value>),
    /// Entries with distinct keys
    Map(Vec<(Value, Value)>),
}

/// A position a value is written to
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Root,
    Field { owner: InstanceId, name: String },
    Element { owner: InstanceId, index: usize },
    MapKey { owner: InstanceId, index: usize },
    MapValue { owner: InstanceId, index: usize },
}

/// Arena of every instance built by a call
#[derive(Debug, Clone, Default)]
pub struct InstanceGraph {
    instances: Vec<Instance>,
}

impl InstanceGraph {
    /// Empty graph
    pub fn new() -> Self { Self::default() }

    pub(crate) fn alloc(&mut self, instance: Instance) -> InstanceId {
        let id = InstanceId(self.instances.len());
        self.instances.push(instance);
        id
    }

    /// Instance by id
    pub fn get(&self, id: InstanceId) -> Option<&Instance> { self.instances.get(id.0) }

    /// Number of instances, including those only reachable through back-references
    pub fn len(&self) -> usize { self.instances.len() }

    /// Whether no instance was built
    pub fn is_empty(&self) -> bool { self.instances.is_empty() }

    /// Instances in allocation order
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(index, instance)| (InstanceId(index), instance))
    }

    /// Value of a struct field, if the instance is an object that has it
    pub fn field(&self, id: InstanceId, name: &str) -> Option<&Value> {
        match self.get(id)? {
            Instance::Object { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Whether a list or set already holds this leaf value
    pub(crate) fn contains_element(&self, id: InstanceId, value: &Value) -> bool {
        match self.get(id) {
            Some(Instance::Set(items) | Instance::List(items)) => items.contains(value),
            _ => false,
        }
    }

    /// Whether a map already has this key
    pub(crate) fn contains_key(&self, id: InstanceId, key: &Value) -> bool {
        match self.get(id) {
            Some(Instance::Map(entries)) => entries.iter().any(|(existing, _)| existing == key),
            _ => false,
        }
    }

    pub(crate) fn push_entry(&mut self, id: InstanceId, key: Value, value: Value) -> Result<()> {
        match self.instances.get_mut(id.0) {
            Some(Instance::Map(entries)) => {
                entries.push((key, value));
                Ok(())
            }
            _ => Err(Error::InvalidState(format!("instance {} is not a map", id.0)).into()),
        }
    }

    /// Write `value` into `slot`; element slots one past the end append
    pub(crate) fn write(&mut self, slot: &Slot, value: Value) -> Result<()> {
        let (owner, written) = match slot {
            Slot::Root => {
                return Err(Error::InvalidState("the root slot lives outside the graph".to_string()).into());
            }
            Slot::Field { owner, name } => (*owner, self.write_field(*owner, name, value)),
            Slot::Element { owner, index } => (*owner, self.write_element(*owner, *index, value)),
            Slot::MapKey { owner, index } => (*owner, self.write_entry(*owner, *index, value, true)),
            Slot::MapValue { owner, index } => {
                (*owner, self.write_entry(*owner, *index, value, false))
            }
        };
        if written {
            Ok(())
        } else {
            Err(Error::failed_to("write slot", format!("{slot:?} does not fit instance {}", owner.0)).into())
        }
    }

    fn write_field(&mut self, owner: InstanceId, name: &str, value: Value) -> bool {
        let Some(Instance::Object { fields, .. }) = self.instances.get_mut(owner.0) else {
            return false;
        };
        match fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, existing)) => *existing = value,
            None => fields.push((name.to_string(), value)),
        }
        true
    }

    fn write_element(&mut self, owner: InstanceId, index: usize, value: Value) -> bool {
        let Some(Instance::List(items) | Instance::Set(items) | Instance::Array(items)) =
            self.instances.get_mut(owner.0)
        else {
            return false;
        };
        if index < items.len() {
            items[index] = value;
            true
        } else if index == items.len() {
            items.push(value);
            true
        } else {
            false
        }
    }

    fn write_entry(&mut self, owner: InstanceId, index: usize, value: Value, key: bool) -> bool {
        let Some(Instance::Map(entries)) = self.instances.get_mut(owner.0) else {
            return false;
        };
        let Some(entry) = entries.get_mut(index) else {
            return false;
        };
        if key {
            entry.0 = value;
        } else {
            entry.1 = value;
        }
        true
    }

    /// JSON form of a value; an instance nested inside itself becomes `null`
    pub fn to_json(&self, value: &Value) -> JsonValue {
        let mut path = Vec::new();
        self.materialize(value, &mut path)
    }

    fn materialize(&self, value: &Value, path: &mut Vec<InstanceId>) -> JsonValue {
        let id = match value {
            Value::Null => return JsonValue::Null,
            Value::Leaf(json) => return json.clone(),
            Value::Ref(id) => *id,
        };
        if path.contains(&id) {
            return JsonValue::Null;
        }
        let Some(instance) = self.get(id) else {
            return JsonValue::Null;
        };
        path.push(id);
        let json = match instance {
            Instance::Object { fields, .. } => JsonValue::Object(
                fields
                    .iter()
                    .map(|(name, field)| (name.clone(), self.materialize(field, path)))
                    .collect(),
            ),
            Instance::List(items) | Instance::Set(items) | Instance::Array(items) => {
                JsonValue::Array(items.iter().map(|item| self.materialize(item, path)).collect())
            }
            Instance::Map(entries) => self.materialize_map(entries, path),
        };
        path.pop();
        json
    }

    /// Maps with scalar keys become objects; any other key shape becomes `[key, value]` pairs
    fn materialize_map(&self, entries: &[(Value, Value)], path: &mut Vec<InstanceId>) -> JsonValue {
        let pairs: Vec<(JsonValue, JsonValue)> = entries
            .iter()
            .map(|(key, value)| (self.materialize(key, path), self.materialize(value, path)))
            .collect();
        let scalar_keys = pairs
            .iter()
            .all(|(key, _)| key.is_string() || key.is_number() || key.is_boolean());
        if scalar_keys {
            let mut object = JsonMap::with_capacity(pairs.len());
            for (key, value) in pairs {
                let key = match key {
                    JsonValue::String(text) => text,
                    other => other.to_string(),
                };
                object.insert(key, value);
            }
            JsonValue::Object(object)
        } else {
            JsonValue::Array(
                pairs
                    .into_iter()
                    .map(|(key, value)| JsonValue::Array(vec![key, value]))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(graph: &mut InstanceGraph, name: &str) -> InstanceId {
        graph.alloc(Instance::Object {
            ty:     TypeExpr::named(name),
            fields: Vec::new(),
        })
    }

    #[test]
    fn test_fields_keep_generation_order_and_overwrite_in_place() {
        let mut graph = InstanceGraph::new();
        let person = object(&mut graph, "Person");
        let name = Slot::Field {
            owner: person,
            name:  "name".to_string(),
        };
        graph.write(&name, Value::Null).unwrap();
        graph
            .write(
                &Slot::Field {
                    owner: person,
                    name:  "age".to_string(),
                },
                Value::Leaf(json!(30)),
            )
            .unwrap();
        graph.write(&name, Value::Leaf(json!("Ada"))).unwrap();

        assert_eq!(
            serde_json::to_string(&graph.to_json(&Value::Ref(person))).unwrap(),
            r#"{"name":"Ada","age":30}"#
        );
    }

    #[test]
    fn test_self_reference_materializes_as_null() {
        let mut graph = InstanceGraph::new();
        let node = object(&mut graph, "Node");
        graph
            .write(
                &Slot::Field {
                    owner: node,
                    name:  "next".to_string(),
                },
                Value::Ref(node),
            )
            .unwrap();
        assert_eq!(graph.to_json(&Value::Ref(node)), json!({ "next": null }));
        assert_eq!(graph.field(node, "next"), Some(&Value::Ref(node)));
    }

    #[test]
    fn test_maps_with_scalar_keys_become_objects() {
        let mut graph = InstanceGraph::new();
        let map = graph.alloc(Instance::Map(Vec::new()));
        graph.push_entry(map, Value::Leaf(json!(1)), Value::Leaf(json!("one"))).unwrap();
        graph
            .push_entry(map, Value::Leaf(json!(2)), Value::Leaf(json!("two")))
            .unwrap();
        assert_eq!(graph.to_json(&Value::Ref(map)), json!({ "1": "one", "2": "two" }));
        assert!(graph.contains_key(map, &Value::Leaf(json!(2))));
    }

    #[test]
    fn test_element_writes_append_only_at_the_end() {
        let mut graph = InstanceGraph::new();
        let list = graph.alloc(Instance::List(Vec::new()));
        let slot = |index| Slot::Element { owner: list, index };
        graph.write(&slot(0), Value::Leaf(json!("a"))).unwrap();
        assert!(graph.write(&slot(5), Value::Leaf(json!("b"))).is_err());
        graph.write(&slot(0), Value::Leaf(json!("c"))).unwrap();
        assert_eq!(graph.to_json(&Value::Ref(list)), json!(["c"]));
        assert!(graph.write(&Slot::Root, Value::Null).is_err());
    }
}
