//! Entity state: ordered property descriptors, accessor table and the bound gateway.

use crate::error::EntityError;
use crate::gateway::{PersistenceGateway, Row};
use crate::property::{coerce, decode_json, Field, PropertyDescriptor, PropertyKind, PropertyType, TypedValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Schema under declaration. Only reachable while a `Record` is being built.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    properties: Vec<PropertyDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property. Declaring an existing name replaces it in place.
    pub fn property(&mut self, name: &str) -> &mut PropertyDescriptor {
        let descriptor = PropertyDescriptor::new(name);
        let slot = match self.by_name.get(name) {
            Some(&slot) => {
                self.properties[slot] = descriptor;
                slot
            }
            None => {
                self.properties.push(descriptor);
                let slot = self.properties.len() - 1;
                self.by_name.insert(name.to_string(), slot);
                slot
            }
        };
        &mut self.properties[slot]
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AccessorKind {
    Get,
    Set,
}

#[derive(Clone, Copy, Debug)]
struct Accessor {
    slot: usize,
    kind: AccessorKind,
}

/// State shared by every entity: declared properties (fixed after construction),
/// their value slots, the accessor table and the lazily bound gateway.
#[derive(Clone)]
pub struct Record {
    properties: Vec<PropertyDescriptor>,
    by_name: HashMap<String, usize>,
    accessors: HashMap<String, Accessor>,
    gateway: OnceCell<Rc<dyn PersistenceGateway>>,
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("properties", &self.properties)
            .field("gateway_bound", &self.has_gateway())
            .finish()
    }
}

impl Record {
    /// Build a record by declaring its schema once.
    ///
    /// ```ignore
    /// let record = Record::declare(|s| {
    ///     s.property("id").int().primary().generated();
    ///     s.property("email").string().unique();
    /// });
    /// ```
    pub fn declare(f: impl FnOnce(&mut Schema)) -> Self {
        let mut schema = Schema::new();
        f(&mut schema);
        Self::from_schema(schema)
    }

    pub fn from_schema(schema: Schema) -> Self {
        let mut accessors = HashMap::with_capacity(schema.properties.len() * 2);
        for (slot, p) in schema.properties.iter().enumerate() {
            accessors.insert(p.getter_name().to_string(), Accessor { slot, kind: AccessorKind::Get });
            accessors.insert(p.setter_name().to_string(), Accessor { slot, kind: AccessorKind::Set });
        }
        Record {
            properties: schema.properties,
            by_name: schema.by_name,
            accessors,
            gateway: OnceCell::new(),
        }
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.by_name.get(name).map(|&slot| &self.properties[slot])
    }

    fn slot(&self, name: &str) -> Result<usize, EntityError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| EntityError::UnknownProperty(name.to_string()))
    }

    /// assigned value, else computed getter, else default.
    pub(crate) fn resolve_slot(&self, slot: usize) -> Option<Value> {
        let p = &self.properties[slot];
        p.assigned_value()
            .cloned()
            .or_else(|| p.computed().and_then(|f| f(self)).filter(|v| !v.is_null()))
            .or_else(|| p.default_value().cloned())
    }

    fn read_slot(&self, slot: usize) -> Result<Option<TypedValue>, EntityError> {
        let p = &self.properties[slot];
        match self.resolve_slot(slot) {
            None => Ok(None),
            Some(v) => coerce(p.property_type(), v).map(Some).map_err(|message| EntityError::Coercion {
                property: p.name().to_string(),
                expected: p.property_type().as_str(),
                message,
            }),
        }
    }

    /// Resolved value without coercion.
    pub fn value(&self, name: &str) -> Result<Option<Value>, EntityError> {
        Ok(self.resolve_slot(self.slot(name)?))
    }

    /// Resolved value coerced to the declared type.
    pub fn read(&self, name: &str) -> Result<Option<TypedValue>, EntityError> {
        self.read_slot(self.slot(name)?)
    }

    pub fn get<T: PropertyKind>(&self, field: Field<T>) -> Result<Option<T>, EntityError> {
        match self.read(field.name())? {
            None => Ok(None),
            Some(typed) => T::from_typed(typed).map(Some).map_err(|message| EntityError::Coercion {
                property: field.name().to_string(),
                expected: T::EXPECTED,
                message,
            }),
        }
    }

    pub fn set<T: PropertyKind>(&mut self, field: Field<T>, value: T) -> Result<(), EntityError> {
        self.assign(field.name(), value.into_value())
    }

    /// Setter path by property name. Null empties the slot.
    pub fn assign(&mut self, name: &str, value: impl Into<Value>) -> Result<(), EntityError> {
        let slot = self.slot(name)?;
        self.properties[slot].assign(value.into());
        Ok(())
    }

    /// Dynamic getter call through the accessor table (e.g. `"getEmail"`).
    pub fn call_getter(&self, accessor: &str) -> Result<Option<TypedValue>, EntityError> {
        match self.accessors.get(accessor) {
            Some(a) if a.kind == AccessorKind::Get => self.read_slot(a.slot),
            _ => Err(EntityError::UnknownAccessor(accessor.to_string())),
        }
    }

    /// Dynamic setter call through the accessor table (e.g. `"setEmail"`).
    pub fn call_setter(&mut self, accessor: &str, value: impl Into<Value>) -> Result<(), EntityError> {
        match self.accessors.get(accessor).copied() {
            Some(a) if a.kind == AccessorKind::Set => {
                self.properties[a.slot].assign(value.into());
                Ok(())
            }
            _ => Err(EntityError::UnknownAccessor(accessor.to_string())),
        }
    }

    /// Assign every declared property whose name is a key of `data`. Other keys are ignored.
    pub fn from_map(&mut self, data: &Row) {
        for p in &mut self.properties {
            if let Some(v) = data.get(p.name()) {
                p.assign(v.clone());
            }
        }
    }

    /// All declared properties in declaration order; JSON text is decoded.
    pub fn to_map(&self) -> Row {
        let mut out = Row::new();
        for (slot, p) in self.properties.iter().enumerate() {
            let mut value = self.resolve_slot(slot).unwrap_or(Value::Null);
            if p.property_type() == PropertyType::Json && value.is_string() {
                value = decode_json(value).unwrap_or_else(|e| {
                    tracing::warn!(property = %p.name(), error = %e, "undecodable json text, exported as null");
                    Value::Null
                });
            }
            out.insert(p.name().to_string(), value);
        }
        out
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    pub fn from_value(&mut self, value: &Value) -> Result<(), EntityError> {
        match value {
            Value::Object(map) => {
                self.from_map(map);
                Ok(())
            }
            other => Err(EntityError::InvalidSchema(format!(
                "cannot hydrate from a non-object value: {}",
                other
            ))),
        }
    }

    /// Deserialize the exported mapping into any serde type.
    pub fn to_object<T: DeserializeOwned>(&self) -> Result<T, EntityError> {
        Ok(serde_json::from_value(self.to_value())?)
    }

    /// Hydrate from any serde type that serializes to a map.
    pub fn from_object<T: Serialize>(&mut self, object: &T) -> Result<(), EntityError> {
        let value = serde_json::to_value(object)?;
        self.from_value(&value)
    }

    /// JSON text of `to_map()`. Infallible: strings are valid UTF-8 by the time they get here.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Reset every assigned value, identity properties included.
    pub fn clear(&mut self) {
        for p in &mut self.properties {
            p.reset();
        }
    }

    pub fn bind_gateway(&self, gateway: Rc<dyn PersistenceGateway>) -> Result<(), EntityError> {
        self.gateway.set(gateway).map_err(|_| EntityError::GatewayAlreadyBound)
    }

    pub fn has_gateway(&self) -> bool {
        self.gateway.get().is_some()
    }

    pub fn gateway(&self) -> Result<Rc<dyn PersistenceGateway>, EntityError> {
        self.gateway
            .get()
            .cloned()
            .ok_or_else(|| EntityError::AdapterNotConfigured("no gateway bound to entity".into()))
    }

    /// Slots that receive a freshly generated autoincrement id after an insert.
    pub(crate) fn generated_id_slots(&self) -> Vec<usize> {
        self.properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_primary() && p.property_type().accepts_generated_id())
            .map(|(slot, _)| slot)
            .collect()
    }

    pub(crate) fn assign_slot(&mut self, slot: usize, value: Value) {
        self.properties[slot].assign(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        Record::declare(|s| {
            s.property("id").int().primary();
            s.property("name").string().default("anonymous");
            s.property("tags").json();
            s.property("label").string().compute(|r| {
                r.value("name").ok().flatten().map(|n| Value::String(format!("<{}>", crate::property::to_text(n))))
            });
        })
    }

    #[test]
    fn resolution_precedence() {
        let mut r = sample();
        assert_eq!(r.value("name").unwrap(), Some(json!("anonymous")));
        assert_eq!(r.value("label").unwrap(), Some(json!("<anonymous>")));
        r.assign("label", "fixed").unwrap();
        assert_eq!(r.value("label").unwrap(), Some(json!("fixed")));
        r.assign("label", Value::Null).unwrap();
        assert_eq!(r.value("label").unwrap(), Some(json!("<anonymous>")));
    }

    #[test]
    fn redeclaring_replaces_in_place() {
        let r = Record::declare(|s| {
            s.property("a").int();
            s.property("b");
            s.property("a").string();
        });
        let names: Vec<_> = r.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(r.descriptor("a").unwrap().property_type(), PropertyType::String);
    }

    #[test]
    fn accessor_table_dispatch() {
        let mut r = sample();
        r.call_setter("setId", "12").unwrap();
        assert_eq!(r.call_getter("getId").unwrap(), Some(TypedValue::Int(12)));
        assert!(matches!(r.call_getter("setId"), Err(EntityError::UnknownAccessor(_))));
        assert!(matches!(r.call_getter("getNope"), Err(EntityError::UnknownAccessor(_))));
    }

    #[test]
    fn null_coerces_to_null() {
        let r = sample();
        assert_eq!(r.read("id").unwrap(), None);
        assert_eq!(r.get(Field::<i64>::new("id")).unwrap(), None);
    }

    #[test]
    fn unknown_property_is_an_error() {
        let mut r = sample();
        assert!(matches!(r.assign("missing", 1), Err(EntityError::UnknownProperty(_))));
    }

    #[test]
    fn persistence_requires_bound_gateway() {
        let r = sample();
        assert!(matches!(r.gateway(), Err(EntityError::AdapterNotConfigured(_))));
    }
}
