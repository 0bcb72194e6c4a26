//! CustomResourceDefinition generation.
//!
//! The schema derived from the Rust types cannot express the admission
//! rules (required code, code bounds, 2xx body rule), so they are written
//! into the generated definition here. The API server then enforces the same
//! checks as `admission::validation`.

use std::collections::BTreeMap;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, JSONSchemaProps, ValidationRule,
};
use kube::CustomResourceExt;

use crate::admission::validation::{BODY_REQUIRED_MESSAGE, CODE_RANGE};
use crate::api::v1alpha1::DirectResponseRoute;

/// CEL form of the 2xx body rule.
pub const BODY_REQUIRED_RULE: &str = "self.code < 200 || self.code >= 300 || has(self.body)";

/// Labels attached to the definition.
const LABELS: [(&str, &str); 2] = [("app", "gloo-gateway"), ("app.kubernetes.io/name", "gloo-gateway")];

/// The DirectResponseRoute CRD with admission rules applied.
pub fn crd() -> CustomResourceDefinition {
    let mut crd = DirectResponseRoute::crd();

    crd.metadata
        .labels
        .get_or_insert_with(BTreeMap::new)
        .extend(LABELS.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    for version in &mut crd.spec.versions {
        let spec = version
            .schema
            .as_mut()
            .and_then(|schema| schema.open_api_v3_schema.as_mut())
            .and_then(|root| root.properties.as_mut())
            .and_then(|properties| properties.get_mut("spec"));

        if let Some(spec) = spec {
            apply_spec_rules(spec);
        }
    }

    crd
}

/// The CRD rendered as a YAML document.
pub fn crd_yaml() -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&crd())
}

fn apply_spec_rules(spec: &mut JSONSchemaProps) {
    spec.required = Some(vec!["code".to_string()]);
    spec.x_kubernetes_validations = Some(vec![ValidationRule {
        rule: BODY_REQUIRED_RULE.to_string(),
        message: Some(BODY_REQUIRED_MESSAGE.to_string()),
        ..ValidationRule::default()
    }]);

    if let Some(code) = spec.properties.as_mut().and_then(|properties| properties.get_mut("code")) {
        code.minimum = Some(f64::from(*CODE_RANGE.start()));
        code.maximum = Some(f64::from(*CODE_RANGE.end()));
        code.nullable = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_schema(crd: &CustomResourceDefinition) -> &JSONSchemaProps {
        crd.spec.versions[0]
            .schema
            .as_ref()
            .and_then(|s| s.open_api_v3_schema.as_ref())
            .and_then(|root| root.properties.as_ref())
            .and_then(|p| p.get("spec"))
            .unwrap()
    }

    #[test]
    fn test_crd_identity() {
        let crd = crd();
        assert_eq!(crd.metadata.name.as_deref(), Some("directresponseroutes.gateway.gloo.solo.io"));
        assert_eq!(crd.spec.group, "gateway.gloo.solo.io");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(crd.spec.names.kind, "DirectResponseRoute");
        assert_eq!(crd.spec.names.short_names, Some(vec!["drr".to_string()]));
        assert_eq!(crd.spec.names.categories, Some(vec!["gloo-gateway".to_string()]));
        assert_eq!(crd.spec.versions[0].name, "v1alpha1");
        assert!(crd.spec.versions[0].subresources.as_ref().and_then(|s| s.status.as_ref()).is_some());

        let labels = crd.metadata.labels.unwrap();
        assert_eq!(labels.get("app").map(String::as_str), Some("gloo-gateway"));
        assert_eq!(labels.get("app.kubernetes.io/name").map(String::as_str), Some("gloo-gateway"));
    }

    #[test]
    fn test_crd_carries_admission_rules() {
        let crd = crd();
        let spec = spec_schema(&crd);

        assert_eq!(spec.required, Some(vec!["code".to_string()]));

        let code = spec.properties.as_ref().and_then(|p| p.get("code")).unwrap();
        assert_eq!(code.minimum, Some(100.0));
        assert_eq!(code.maximum, Some(599.0));

        let rules = spec.x_kubernetes_validations.as_ref().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule, BODY_REQUIRED_RULE);
        assert_eq!(rules[0].message.as_deref(), Some(BODY_REQUIRED_MESSAGE));
    }

    #[test]
    fn test_crd_yaml_renders() {
        let yaml = crd_yaml().unwrap();
        assert!(yaml.contains("kind: CustomResourceDefinition"));
        assert!(yaml.contains("x-kubernetes-validations"));
        assert!(yaml.contains(BODY_REQUIRED_RULE));
    }
}
