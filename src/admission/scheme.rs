//! Kind registration.
//!
//! # Responsibilities
//! - Map `apiVersion` + `kind` to the decode and validation routine of a type
//! - Register the list form of every kind alongside it
//! - Admit untyped objects (manifest documents, review payloads) through the
//!   routine registered for their kind
//!
//! # Design Decisions
//! - Built once at process start, then shared immutably via `Arc`
//! - Lists are flattened: admitting a list yields its items, in order
//! - Unknown kinds are rejected rather than passed through

use std::collections::HashMap;

use kube::core::Resource;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::admission::validation::{self, ValidationError, ValidationOptions};
use crate::api::v1alpha1::{DirectResponseRoute, DirectResponseRouteStatus};

/// A resource that can be checked at admission.
pub trait Admissible: Resource<DynamicType = ()> + DeserializeOwned {
    /// Prepare the wire form for decoding.
    ///
    /// Fills in parts that may be omitted and rejects values the typed form
    /// cannot hold but validation still has a verdict on.
    fn normalize(_value: &mut Value) -> Result<(), Vec<ValidationError>> {
        Ok(())
    }

    /// Semantic checks on the decoded object.
    fn admit(&self, options: &ValidationOptions) -> Result<(), Vec<ValidationError>>;
}

impl Admissible for DirectResponseRoute {
    fn normalize(value: &mut Value) -> Result<(), Vec<ValidationError>> {
        let Some(object) = value.as_object_mut() else {
            return Ok(());
        };

        // `spec` is optional on the wire; a missing spec is a missing code
        if object.get("spec").map_or(true, Value::is_null) {
            object.insert("spec".to_string(), Value::Object(Map::new()));
        }

        // status is advisory and never part of the verdict
        let status_decodes = object
            .get("status")
            .map_or(true, |status| DirectResponseRouteStatus::deserialize(status).is_ok());
        if !status_decodes {
            tracing::debug!("Dropping undecodable status");
            object.remove("status");
        }

        // integer codes too wide for the typed field are still out of range
        match object.get("spec").and_then(|spec| spec.get("code")) {
            Some(Value::Number(code))
                if (code.is_i64() || code.is_u64()) && code.as_i64().and_then(|c| i32::try_from(c).ok()).is_none() =>
            {
                let code = code.as_i64().unwrap_or(i64::MAX);
                Err(vec![ValidationError::CodeOutOfRange { code }])
            }
            _ => Ok(()),
        }
    }

    fn admit(&self, options: &ValidationOptions) -> Result<(), Vec<ValidationError>> {
        validation::validate_all(&self.spec, options)
    }
}

/// Reasons an object is not admitted.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The object has no `apiVersion` or `kind`.
    #[error("object is missing apiVersion or kind")]
    MissingTypeMeta,

    /// No routine is registered for the object's type.
    #[error("no kind \"{kind}\" is registered for version \"{api_version}\"")]
    UnknownKind { api_version: String, kind: String },

    /// The object does not match the registered type's shape.
    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// The object decoded but failed validation.
    #[error("{kind} \"{name}\" is invalid: {}", describe(.errors))]
    Invalid {
        kind: String,
        name: String,
        errors: Vec<ValidationError>,
    },

    /// A list whose `items` is not an array.
    #[error("{kind}: items must be an array")]
    MalformedList { kind: String },

    /// A list item was rejected.
    #[error("items[{index}]: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<AdmissionError>,
    },
}

impl AdmissionError {
    /// Validation failures behind this error, if it is a validation rejection.
    pub fn violations(&self) -> &[ValidationError] {
        match self {
            AdmissionError::Invalid { errors, .. } => errors,
            AdmissionError::Item { source, .. } => source.violations(),
            _ => &[],
        }
    }
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|err| format!("{err} ({})", err.kind()))
        .collect::<Vec<_>>()
        .join("; ")
}

type AdmitFn = fn(Value, &ValidationOptions) -> Result<Value, AdmissionError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct TypeKey {
    api_version: String,
    kind: String,
}

impl TypeKey {
    fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    fn of(value: &Value) -> Option<Self> {
        let api_version = value.get("apiVersion")?.as_str()?;
        let kind = value.get("kind")?.as_str()?;
        Some(Self::new(api_version, kind))
    }
}

#[derive(Clone, Copy)]
enum Registration {
    Object(AdmitFn),
    List,
}

/// Registry of admissible kinds.
#[derive(Clone)]
pub struct Scheme {
    kinds: HashMap<TypeKey, Registration>,
}

impl Scheme {
    /// Create an empty scheme. Only the generic `v1/List` is known.
    pub fn new() -> Self {
        let mut kinds = HashMap::new();
        kinds.insert(TypeKey::new("v1", "List"), Registration::List);
        Self { kinds }
    }

    /// Register a kind and its list form.
    pub fn register<K: Admissible>(&mut self) -> &mut Self {
        let api_version = K::api_version(&()).into_owned();
        let kind = K::kind(&()).into_owned();

        self.kinds
            .insert(TypeKey::new(api_version.clone(), kind.clone()), Registration::Object(admit_as::<K>));
        self.kinds
            .insert(TypeKey::new(api_version.clone(), format!("{kind}List")), Registration::List);

        tracing::debug!(api_version = %api_version, kind = %kind, "Registered kind");
        self
    }

    /// Whether `apiVersion`/`kind` is known.
    pub fn recognizes(&self, api_version: &str, kind: &str) -> bool {
        self.kinds.contains_key(&TypeKey::new(api_version, kind))
    }

    /// Registered kinds as `apiVersion/Kind`, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut keys: Vec<&TypeKey> = self.kinds.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| format!("{}/{}", key.api_version, key.kind))
            .collect()
    }

    /// Admit an untyped object, returning the admitted objects.
    ///
    /// A plain object yields itself; a list yields its items in order.
    pub fn admit(&self, value: Value, options: &ValidationOptions) -> Result<Vec<Value>, AdmissionError> {
        let key = TypeKey::of(&value).ok_or(AdmissionError::MissingTypeMeta)?;

        match self.kinds.get(&key) {
            Some(Registration::Object(admit)) => Ok(vec![admit(value, options)?]),
            Some(Registration::List) => self.admit_list(key, value, options),
            None => Err(AdmissionError::UnknownKind {
                api_version: key.api_version,
                kind: key.kind,
            }),
        }
    }

    fn admit_list(&self, key: TypeKey, mut value: Value, options: &ValidationOptions) -> Result<Vec<Value>, AdmissionError> {
        let items = match value.get_mut("items").map(Value::take) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(AdmissionError::MalformedList { kind: key.kind }),
        };

        // items of a typed list may omit their own type
        let item_kind = key.kind.strip_suffix("List").filter(|kind| !kind.is_empty());

        let mut admitted = Vec::with_capacity(items.len());
        for (index, mut item) in items.into_iter().enumerate() {
            if let (Some(object), Some(item_kind)) = (item.as_object_mut(), item_kind) {
                object
                    .entry("apiVersion")
                    .or_insert_with(|| Value::String(key.api_version.clone()));
                object
                    .entry("kind")
                    .or_insert_with(|| Value::String(item_kind.to_string()));
            }

            let objects = self.admit(item, options).map_err(|source| AdmissionError::Item {
                index,
                source: Box::new(source),
            })?;
            admitted.extend(objects);
        }

        Ok(admitted)
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::new()
    }
}

fn admit_as<K: Admissible>(mut value: Value, options: &ValidationOptions) -> Result<Value, AdmissionError> {
    let kind = K::kind(&()).into_owned();
    let name = qualified_name(&value);

    if let Err(errors) = K::normalize(&mut value) {
        return Err(AdmissionError::Invalid { kind, name, errors });
    }

    let object: K = serde_json::from_value(value.clone()).map_err(|source| AdmissionError::Decode {
        kind: kind.clone(),
        source,
    })?;

    object
        .admit(options)
        .map_err(|errors| AdmissionError::Invalid { kind, name, errors })?;

    Ok(value)
}

/// `namespace/name` of an untyped object, falling back to `generateName`.
fn qualified_name(value: &Value) -> String {
    let metadata = &value["metadata"];
    let name = metadata["name"]
        .as_str()
        .or_else(|| metadata["generateName"].as_str())
        .unwrap_or_default();
    match metadata["namespace"].as_str() {
        Some(namespace) => format!("{namespace}/{name}"),
        None => name.to_string(),
    }
}

/// Scheme with every kind served by this crate.
pub fn default_scheme() -> Scheme {
    let mut scheme = Scheme::new();
    scheme.register::<DirectResponseRoute>();
    scheme
}
