//! Command templates rendered with minijinja.

use minijinja::Environment;
use serde::Serialize;

use crate::command::parser::quote;

const TEMPLATES: [(&str, &str); 10] = [
    ("git:commit", "@git:commit -m {{ message | quote }}"),
    (
        "git:push",
        "@git:push origin {{ branch | quote }}{% if set_upstream %} --set-upstream{% endif %}",
    ),
    (
        "git:pull",
        "@git:pull origin {{ branch | quote }}{% if set_upstream %} --set-upstream{% endif %}",
    ),
    ("git:checkout", "@git:checkout {{ branch | quote }}"),
    ("git:branch", "@git:branch {{ name | quote }}"),
    ("jira:issue", "@jira:issue {{ key }}"),
    (
        "swdp:build",
        "@swdp:build --target={{ target }}{% if watch %} --watch{% endif %}",
    ),
    ("pocket:load", "@pocket:load {{ repository | quote }}"),
    ("pocket:search", "@pocket:search {{ repository | quote }}"),
    ("doc:search", "@doc:search {{ query | quote }}"),
];

/// Returns `true` when a template exists for the `domain:command` key.
#[must_use]
pub fn has_template(key: &str) -> bool {
    TEMPLATES.iter().any(|(name, _)| *name == key)
}

/// Renders the template registered under `key`.
///
/// Returns `None` for unknown keys and render failures.
pub fn render(key: &str, context: impl Serialize) -> Option<String> {
    let (_, source) = TEMPLATES.iter().find(|(name, _)| *name == key)?;
    let mut environment = Environment::new();
    environment.add_filter("quote", |value: String| quote(&value));
    match environment.render_str(source, context) {
        Ok(rendered) => Some(rendered),
        Err(error) => {
            tracing::warn!(template = key, %error, "failed to render contextual command");
            None
        }
    }
}
