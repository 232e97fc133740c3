//! One declared entity field: type, accessor names, identity flags and value slot.

use crate::case::{getter_name, setter_name};
use crate::entity::Record;
use crate::property::PropertyType;
use serde_json::Value;

/// Computed getter registered at declaration time. Consulted when no value is assigned.
pub type ComputeFn = fn(&Record) -> Option<Value>;

#[derive(Clone)]
pub struct PropertyDescriptor {
    name: String,
    kind: PropertyType,
    getter: String,
    setter: String,
    primary: bool,
    unique: bool,
    generated: bool,
    default: Option<Value>,
    compute: Option<ComputeFn>,
    value: Option<Value>,
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("primary", &self.primary)
            .field("unique", &self.unique)
            .field("generated", &self.generated)
            .field("default", &self.default)
            .field("computed", &self.compute.is_some())
            .field("value", &self.value)
            .finish()
    }
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        PropertyDescriptor {
            getter: getter_name(&name),
            setter: setter_name(&name),
            name,
            kind: PropertyType::Raw,
            primary: false,
            unique: false,
            generated: false,
            default: None,
            compute: None,
            value: None,
        }
    }

    pub fn kind(&mut self, kind: PropertyType) -> &mut Self {
        self.kind = kind;
        self
    }

    pub fn string(&mut self) -> &mut Self {
        self.kind(PropertyType::String)
    }

    pub fn int(&mut self) -> &mut Self {
        self.kind(PropertyType::Int)
    }

    pub fn float(&mut self) -> &mut Self {
        self.kind(PropertyType::Float)
    }

    pub fn bool(&mut self) -> &mut Self {
        self.kind(PropertyType::Bool)
    }

    /// Date/time stored as text (`YYYY-MM-DD HH:MM:SS`), read back as `NaiveDateTime`.
    pub fn date(&mut self) -> &mut Self {
        self.kind(PropertyType::Date)
    }

    /// JSON stored as text, read back as a structured value.
    pub fn json(&mut self) -> &mut Self {
        self.kind(PropertyType::Json)
    }

    pub fn raw(&mut self) -> &mut Self {
        self.kind(PropertyType::Raw)
    }

    pub fn primary(&mut self) -> &mut Self {
        self.primary_if(true)
    }

    /// Set or clear the primary flag.
    pub fn primary_if(&mut self, primary: bool) -> &mut Self {
        self.primary = primary;
        self
    }

    pub fn unique(&mut self) -> &mut Self {
        self.unique_if(true)
    }

    pub fn unique_if(&mut self, unique: bool) -> &mut Self {
        self.unique = unique;
        self
    }

    /// Value computed by the storage engine (autoincrement key, generated column,
    /// `DEFAULT CURRENT_TIMESTAMP`). Non-primary generated properties are never written.
    pub fn generated(&mut self) -> &mut Self {
        self.generated_if(true)
    }

    pub fn generated_if(&mut self, generated: bool) -> &mut Self {
        self.generated = generated;
        self
    }

    pub fn default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = non_null(value.into());
        self
    }

    /// Override the getter name used by dynamic accessor calls.
    pub fn getter(&mut self, name: impl Into<String>) -> &mut Self {
        self.getter = name.into();
        self
    }

    /// Override the setter name used by dynamic accessor calls.
    pub fn setter(&mut self, name: impl Into<String>) -> &mut Self {
        self.setter = name.into();
        self
    }

    pub fn compute(&mut self, f: ComputeFn) -> &mut Self {
        self.compute = Some(f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> PropertyType {
        self.kind
    }

    pub fn getter_name(&self) -> &str {
        &self.getter
    }

    pub fn setter_name(&self) -> &str {
        &self.setter
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn assigned_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub(crate) fn computed(&self) -> Option<ComputeFn> {
        self.compute
    }

    /// Setter path. Null empties the slot so resolution falls through to the default.
    pub(crate) fn assign(&mut self, value: Value) {
        self.value = non_null(value);
    }

    pub(crate) fn reset(&mut self) {
        self.value = None;
    }
}

fn non_null(value: Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}
