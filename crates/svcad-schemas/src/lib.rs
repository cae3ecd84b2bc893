//! svcad-schemas
//!
//! Shared data model for catalog offerings and their plans.
//!
//! The same `Service` / `Plan` shape is used for both sides of a
//! reconciliation pass: the broker catalog (guids absent) and the registry
//! snapshot (guids assigned by the registry). Serialized field names are the
//! registry's v2 wire names, so write payloads are derived directly from
//! these structs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_true() -> bool {
    true
}

/// A catalog offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Stable identifier supplied by the broker. May be absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// Registry-assigned identifier. Never part of a write body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub label: String,
    pub provider: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(default = "default_true")]
    pub bindable: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque broker metadata, passed through as a JSON-encoded string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// Which registry write an offering body is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferingWrite {
    /// `POST /v2/services`
    Create,
    /// `PUT /v2/services/{guid}`
    Update,
}

impl Service {
    pub fn new(
        label: impl Into<String>,
        provider: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: None,
            guid: None,
            label: label.into(),
            provider: provider.into(),
            version: version.into(),
            description: String::new(),
            url: None,
            info_url: None,
            documentation_url: None,
            bindable: true,
            tags: Vec::new(),
            extra: None,
            active: true,
            plans: Vec::new(),
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    /// `unique_id` when present and non-empty.
    pub fn stable_id(&self) -> Option<&str> {
        non_empty(self.unique_id.as_deref())
    }

    /// `(label, version, provider)` identity tuple.
    pub fn tuple(&self) -> (&str, &str, &str) {
        (&self.label, &self.version, &self.provider)
    }

    /// Short human-readable identity for log lines.
    pub fn display_name(&self) -> String {
        match self.stable_id() {
            Some(id) => format!("{}/{}/{} ({id})", self.label, self.version, self.provider),
            None => format!("{}/{}/{}", self.label, self.version, self.provider),
        }
    }

    /// Registry write body for this offering.
    ///
    /// Plans never travel with the offering (they have their own endpoint)
    /// and the guid never travels in a body. Updates additionally drop
    /// `unique_id`, which the registry treats as immutable.
    pub fn offering_body(&self, write: OfferingWrite) -> Value {
        let mut body = to_object(self);
        body.remove("plans");
        body.remove("guid");
        if write == OfferingWrite::Update {
            body.remove("unique_id");
        }
        Value::Object(body)
    }
}

/// A plan variant of a [`Service`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub free: bool,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl Plan {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            guid: None,
            unique_id: None,
            name: name.into(),
            description: description.into(),
            free: true,
            public: true,
            extra: None,
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn stable_id(&self) -> Option<&str> {
        non_empty(self.unique_id.as_deref())
    }

    /// True when every attribute except the registry guid is equal.
    ///
    /// `self` is the catalog side: without a stable id of its own it takes
    /// no position on `unique_id`, so a registry-assigned id is not a change.
    pub fn same_attributes(&self, other: &Plan) -> bool {
        let same_id = match self.stable_id() {
            Some(id) => other.stable_id() == Some(id),
            None => true,
        };
        same_id
            && self.name == other.name
            && self.description == other.description
            && self.free == other.free
            && self.public == other.public
            && self.extra == other.extra
    }

    /// Registry write body (create and update share a shape): plan
    /// attributes keyed by the owning service's registry guid.
    pub fn write_body(&self, service_guid: &str) -> Value {
        let mut body = to_object(self);
        body.remove("guid");
        body.insert(
            "service_guid".to_string(),
            Value::String(service_guid.to_string()),
        );
        Value::Object(body)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

fn to_object<T: Serialize>(v: &T) -> Map<String, Value> {
    // Derived Serialize for a struct with string keys always yields an object.
    match serde_json::to_value(v) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_service() -> Service {
        Service::new("db", "core", "1.0")
            .with_unique_id("svc-A")
            .with_guid("g1")
            .with_plan(Plan::new("small", "a small plan").with_unique_id("plan-1"))
    }

    #[test]
    fn create_body_excludes_plans_and_guid() {
        let body = sample_service().offering_body(OfferingWrite::Create);
        assert!(body.get("plans").is_none());
        assert!(body.get("guid").is_none());
        assert_eq!(body["unique_id"], "svc-A");
        assert_eq!(body["label"], "db");
        assert_eq!(body["active"], true);
    }

    #[test]
    fn update_body_also_excludes_unique_id() {
        let body = sample_service().offering_body(OfferingWrite::Update);
        assert!(body.get("plans").is_none());
        assert!(body.get("guid").is_none());
        assert!(body.get("unique_id").is_none());
        assert_eq!(body["provider"], "core");
        assert_eq!(body["version"], "1.0");
    }

    #[test]
    fn plan_body_carries_service_guid_not_plan_guid() {
        let plan = Plan::new("small", "desc").with_guid("pg1");
        let body = plan.write_body("g1");
        assert_eq!(body["service_guid"], "g1");
        assert_eq!(body["name"], "small");
        assert!(body.get("guid").is_none());
    }

    #[test]
    fn empty_unique_id_is_not_a_stable_id() {
        let svc = Service::new("db", "core", "1.0").with_unique_id("");
        assert_eq!(svc.stable_id(), None);
    }

    #[test]
    fn same_attributes_ignores_guid() {
        let a = Plan::new("small", "desc").with_guid("x");
        let b = Plan::new("small", "desc").with_guid("y");
        assert!(a.same_attributes(&b));

        let mut c = b.clone();
        c.free = false;
        assert!(!a.same_attributes(&c));
    }

    #[test]
    fn registry_assigned_plan_id_is_not_a_difference() {
        let catalog = Plan::new("small", "desc");
        let registered = Plan::new("small", "desc").with_unique_id("cc-assigned");
        assert!(catalog.same_attributes(&registered));

        let pinned = Plan::new("small", "desc").with_unique_id("mine");
        assert!(!pinned.same_attributes(&registered));
    }

    #[test]
    fn catalog_defaults_apply_on_deserialize() {
        let svc: Service = serde_json::from_value(serde_json::json!({
            "label": "db",
            "provider": "core",
            "version": "1.0",
            "plans": [{ "name": "small" }]
        }))
        .unwrap();
        assert!(svc.active);
        assert!(svc.bindable);
        assert!(svc.plans[0].free);
        assert_eq!(svc.guid, None);
    }
}
