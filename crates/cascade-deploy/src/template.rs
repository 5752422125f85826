//! Template rendering
//!
//! Templates are JSON documents. A string value consisting only of a
//! placeholder `{{ .name }}` is replaced by the resolved parameter `name`,
//! keeping its JSON type. Any other text is left as is.

use crate::entity::Properties;
use crate::error::DeployError;
use serde_json::Value;

/// Render `template` with resolved `properties`
///
/// An empty template renders as an empty object.
///
/// # Errors
/// [`DeployError::InvalidTemplate`] if the template is not JSON or a
/// placeholder names an unknown parameter.
pub fn render(template: &str, properties: &Properties) -> Result<Value, DeployError> {
    if template.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let document: Value = serde_json::from_str(template)
        .map_err(|err| DeployError::InvalidTemplate(err.to_string()))?;
    substitute(document, properties)
}

fn substitute(value: Value, properties: &Properties) -> Result<Value, DeployError> {
    match value {
        Value::String(text) => match placeholder(&text) {
            Some(name) => properties.get(name).cloned().ok_or_else(|| {
                DeployError::InvalidTemplate(format!("unknown parameter {name} in template"))
            }),
            None => Ok(Value::String(text)),
        },
        Value::Array(items) => items
            .into_iter()
            .map(|item| substitute(item, properties))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, item)| substitute(item, properties).map(|item| (key, item)))
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(Value::Object),
        other => Ok(other),
    }
}

/// Parameter name of a `{{ .name }}` string
fn placeholder(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix("{{")?.strip_suffix("}}")?.trim();
    let name = inner.strip_prefix('.')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn properties() -> Properties {
        Properties::from([
            ("name".to_string(), json!("Overview")),
            ("tags".to_string(), json!(["a", "b"])),
        ])
    }

    #[test]
    fn placeholders_are_replaced_with_typed_values() {
        let rendered = render(
            r#"{"title": "{{ .name }}", "tags": "{{.tags}}", "nested": [{"n": "{{ .name }}"}], "n": 3}"#,
            &properties(),
        )
        .unwrap();

        assert_eq!(
            rendered,
            json!({
                "title": "Overview",
                "tags": ["a", "b"],
                "nested": [{ "n": "Overview" }],
                "n": 3
            })
        );
    }

    #[test]
    fn plain_text_is_kept() {
        let rendered = render(r#"{"text": "hello {{ .name }} world"}"#, &properties()).unwrap();
        assert_eq!(rendered, json!({ "text": "hello {{ .name }} world" }));
    }

    #[test]
    fn empty_template_is_empty_object() {
        assert_eq!(render("  ", &properties()).unwrap(), json!({}));
    }

    #[test]
    fn invalid_templates_fail() {
        assert!(matches!(
            render("{not json", &properties()),
            Err(DeployError::InvalidTemplate(_))
        ));
        assert!(matches!(
            render(r#"{"x": "{{ .missing }}"}"#, &properties()),
            Err(DeployError::InvalidTemplate(_))
        ));
    }
}
