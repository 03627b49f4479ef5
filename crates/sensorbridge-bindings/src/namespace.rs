//! Host namespace model.
//!
//! A [`Module`] is the host-agnostic description of everything published to
//! the scripting side: classes with their attributes and methods, enums with
//! their named constants, and free functions.  A concrete host adapter walks
//! the module to create its own class objects; the CLI simply prints it.
//!
//! Proxy records implement [`HostObject`] so that generic attribute access
//! (`obj.name`, `obj.name = value`) can be served through serde without a
//! hand-written getter/setter per field.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::BindingError;

// ────────────────────────────────────────────────────────────────────────────
// Attribute access
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// One host-visible attribute of a proxy.
///
/// `field` is the key under which the value appears in the proxy's serde
/// representation; it differs from `name` only for aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: &'static str,
    pub field: &'static str,
    pub access: Access,
}

impl AttrSpec {
    pub const fn ro(name: &'static str) -> Self {
        Self {
            name,
            field: name,
            access: Access::ReadOnly,
        }
    }

    pub const fn rw(name: &'static str) -> Self {
        Self {
            name,
            field: name,
            access: Access::ReadWrite,
        }
    }

    /// A read-write attribute that forwards to another field.
    pub const fn alias(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            field,
            access: Access::ReadWrite,
        }
    }
}

/// A proxy record whose attributes are reachable from the host by name.
pub trait HostObject: Serialize + DeserializeOwned {
    /// Name of the host class this record is published as.
    fn host_class(&self) -> &'static str;

    /// Attribute table of the host class.
    fn attributes(&self) -> &'static [AttrSpec];

    fn attribute(&self, name: &str) -> Result<AttrSpec, BindingError> {
        self.attributes()
            .iter()
            .find(|a| a.name == name)
            .copied()
            .ok_or_else(|| BindingError::UnknownAttribute {
                class: self.host_class().to_string(),
                name: name.to_string(),
            })
    }

    /// Read attribute `name` as a host value.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownAttribute`] if the class has no such attribute.
    fn get_attr(&self, name: &str) -> Result<Value, BindingError> {
        let spec = self.attribute(name)?;
        let mut value = serde_json::to_value(self)?;
        value
            .get_mut(spec.field)
            .map(Value::take)
            .ok_or_else(|| BindingError::UnknownAttribute {
                class: self.host_class().to_string(),
                name: name.to_string(),
            })
    }

    /// Assign host value `value` to attribute `name`.
    ///
    /// The record is rebuilt from its serde representation, so a value of the
    /// wrong shape leaves the record untouched.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownAttribute`], [`BindingError::ReadOnly`], or
    /// [`BindingError::BadArgument`] when `value` does not fit the field.
    fn set_attr(&mut self, name: &str, value: Value) -> Result<(), BindingError> {
        let spec = self.attribute(name)?;
        if spec.access == Access::ReadOnly {
            return Err(BindingError::ReadOnly {
                class: self.host_class().to_string(),
                name: name.to_string(),
            });
        }
        let mut object = serde_json::to_value(&*self)?;
        let Some(map) = object.as_object_mut() else {
            return Err(BindingError::bad_argument(
                name,
                format!("{} is not an attribute container", self.host_class()),
            ));
        };
        map.insert(spec.field.to_string(), value);
        *self = serde_json::from_value(object)
            .map_err(|e| BindingError::bad_argument(name, e.to_string()))?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Definitions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttrDef {
    pub name: String,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDef {
    pub name: String,
    /// Value bound when the host omits the argument; `None` makes the
    /// parameter required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default: None,
        }
    }

    pub fn optional(name: &str, default: Value) -> Self {
        Self {
            name: name.to_string(),
            default: Some(default),
        }
    }
}

/// A host-callable method or free function signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
    pub params: Vec<ParamDef>,
}

impl MethodDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: String::new(),
            params: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }

    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    /// Bind positional host arguments to this signature, filling defaults.
    ///
    /// # Errors
    ///
    /// [`BindingError::BadArgument`] for surplus or missing arguments.
    pub fn bind(&self, args: &[Value]) -> Result<Vec<Value>, BindingError> {
        if args.len() > self.params.len() {
            return Err(BindingError::bad_argument(
                &self.name,
                format!(
                    "takes at most {} arguments ({} given)",
                    self.params.len(),
                    args.len()
                ),
            ));
        }
        self.params
            .iter()
            .enumerate()
            .map(|(i, p)| match (args.get(i), &p.default) {
                (Some(v), _) => Ok(v.clone()),
                (None, Some(d)) => Ok(d.clone()),
                (None, None) => Err(BindingError::bad_argument(
                    &self.name,
                    format!("missing required argument '{}'", p.name),
                )),
            })
            .collect()
    }
}

/// A host class: attributes, methods, optional base class and JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub attributes: Vec<AttrDef>,
    pub methods: Vec<MethodDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl ClassDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: String::new(),
            base: None,
            attributes: Vec::new(),
            methods: Vec::new(),
            schema: None,
        }
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }

    pub fn base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    /// Publish every attribute in `specs`.
    pub fn attrs(mut self, specs: &[AttrSpec]) -> Self {
        self.attributes.extend(specs.iter().map(|s| AttrDef {
            name: s.name.to_string(),
            access: s.access,
        }));
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Attach the JSON schema of the record backing this class.
    pub fn schema_of<T: JsonSchema>(mut self) -> Self {
        self.schema = serde_json::to_value(schemars::schema_for!(T)).ok();
        self
    }

    pub fn find_method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_attr(&self, name: &str) -> Option<&AttrDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A host enum: named integer constants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
    pub values: Vec<(String, i32)>,
}

impl EnumDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: String::new(),
            values: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }

    pub fn value(mut self, name: &str, raw: i32) -> Self {
        self.values.push((name.to_string(), raw));
        self
    }

    pub fn lookup(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, raw)| *raw)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Module
// ────────────────────────────────────────────────────────────────────────────

/// A host namespace.  Names are unique per kind; re-registering a name
/// replaces the previous definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Module {
    pub name: String,
    pub classes: BTreeMap<String, ClassDef>,
    pub enums: BTreeMap<String, EnumDef>,
    pub functions: BTreeMap<String, MethodDef>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn add_class(&mut self, class: ClassDef) -> &mut Self {
        if let Some(base) = &class.base
            && !self.classes.contains_key(base)
        {
            warn!(class = %class.name, base = %base, "base class registered after subclass");
        }
        if self.classes.insert(class.name.clone(), class).is_some() {
            warn!(module = %self.name, "class re-registered");
        }
        self
    }

    pub fn add_enum(&mut self, def: EnumDef) -> &mut Self {
        if self.enums.insert(def.name.clone(), def).is_some() {
            warn!(module = %self.name, "enum re-registered");
        }
        self
    }

    pub fn add_function(&mut self, def: MethodDef) -> &mut Self {
        if self.functions.insert(def.name.clone(), def).is_some() {
            warn!(module = %self.name, "function re-registered");
        }
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&MethodDef> {
        self.functions.get(name)
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        let mut current = Some(class);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.classes.get(name).and_then(|c| c.base.as_deref());
        }
        false
    }

    /// Resolve `method` on `class`, searching base classes.
    pub fn resolve_method(&self, class: &str, method: &str) -> Option<&MethodDef> {
        let mut current = self.classes.get(class);
        while let Some(def) = current {
            if let Some(m) = def.find_method(method) {
                return Some(m);
            }
            current = def.base.as_deref().and_then(|b| self.classes.get(b));
        }
        None
    }

    /// Serializable description of the whole namespace.
    pub fn describe(&self) -> Result<Value, BindingError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
    struct Probe {
        gain: f64,
        label: String,
    }

    const PROBE_ATTRS: &[AttrSpec] = &[
        AttrSpec::rw("gain"),
        AttrSpec::ro("label"),
        AttrSpec::alias("amplification", "gain"),
    ];

    impl HostObject for Probe {
        fn host_class(&self) -> &'static str {
            "Probe"
        }
        fn attributes(&self) -> &'static [AttrSpec] {
            PROBE_ATTRS
        }
    }

    fn probe() -> Probe {
        Probe {
            gain: 2.0,
            label: "p".to_string(),
        }
    }

    #[test]
    fn get_attr_reads_field_and_alias() {
        let p = probe();
        assert_eq!(p.get_attr("gain").unwrap(), json!(2.0));
        assert_eq!(p.get_attr("amplification").unwrap(), json!(2.0));
        assert_eq!(p.get_attr("label").unwrap(), json!("p"));
    }

    #[test]
    fn set_attr_writes_through_alias() {
        let mut p = probe();
        p.set_attr("amplification", json!(4.5)).unwrap();
        assert_eq!(p.gain, 4.5);
    }

    #[test]
    fn set_attr_rejects_read_only() {
        let mut p = probe();
        let err = p.set_attr("label", json!("q")).unwrap_err();
        assert!(matches!(err, BindingError::ReadOnly { .. }));
        assert_eq!(p.label, "p");
    }

    #[test]
    fn unknown_attribute_is_reported() {
        let mut p = probe();
        assert!(matches!(
            p.get_attr("nope").unwrap_err(),
            BindingError::UnknownAttribute { .. }
        ));
        assert!(matches!(
            p.set_attr("nope", json!(1)).unwrap_err(),
            BindingError::UnknownAttribute { .. }
        ));
    }

    #[test]
    fn set_attr_with_wrong_shape_leaves_record_untouched() {
        let mut p = probe();
        let err = p.set_attr("gain", json!("loud")).unwrap_err();
        assert!(matches!(err, BindingError::BadArgument { .. }));
        assert_eq!(p, probe());
    }

    #[test]
    fn bind_fills_defaults_and_rejects_surplus() {
        let m = MethodDef::new("Configure")
            .param(ParamDef::required("command"))
            .param(ParamDef::optional("blocking", json!(false)));
        assert_eq!(m.bind(&[json!(16)]).unwrap(), vec![json!(16), json!(false)]);
        assert!(m.bind(&[]).is_err());
        assert!(m.bind(&[json!(1), json!(true), json!(3)]).is_err());
    }

    #[test]
    fn module_resolves_inherited_methods() {
        let mut module = Module::new("test");
        module
            .add_class(ClassDef::new("Base").method(MethodDef::new("GetType")))
            .add_class(ClassDef::new("Derived").base("Base"));
        assert!(module.is_subclass("Derived", "Base"));
        assert!(!module.is_subclass("Base", "Derived"));
        assert!(module.resolve_method("Derived", "GetType").is_some());
        assert!(module.resolve_method("Derived", "Missing").is_none());
    }

    #[test]
    fn enum_lookup_by_name() {
        let e = EnumDef::new("Mode").value("On", 1).value("Off", 0);
        assert_eq!(e.lookup("On"), Some(1));
        assert_eq!(e.lookup("Maybe"), None);
    }

    #[test]
    fn class_schema_is_attached() {
        let class = ClassDef::new("Probe").schema_of::<Probe>();
        let schema = class.schema.unwrap();
        assert!(schema["properties"]["gain"].is_object());
    }
}
