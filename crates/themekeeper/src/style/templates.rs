//! CSS snippets rendered with MiniJinja.

use minijinja::{context, Environment};
use once_cell::sync::Lazy;

const PRELOAD: &str = "preload.css";
const TRANSITION: &str = "transition.css";

const PRELOAD_SOURCE: &str = ":root {
{%- for name, value in vars %}
  {{ name }}: {{ value }};
{%- endfor %}
}";

const TRANSITION_SOURCE: &str = ".theme-transition,
.theme-transition * {
  transition: {% for property in properties -%}
    {{ property }} var({{ duration_var }}) ease{% if not loop.last %}, {% endif %}
  {%- endfor %};
}";

/// Properties animated while switching themes.
const TRANSITION_PROPERTIES: [&str; 4] = ["background-color", "color", "border-color", "box-shadow"];

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [(PRELOAD, PRELOAD_SOURCE), (TRANSITION, TRANSITION_SOURCE)] {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!(template = name, error = %e, "failed to compile stylesheet template");
        }
    }
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Option<String> {
    let rendered = TEMPLATES
        .get_template(name)
        .and_then(|template| template.render(ctx));
    match rendered {
        Ok(css) => Some(css),
        Err(e) => {
            tracing::warn!(template = name, error = %e, "failed to render stylesheet");
            None
        }
    }
}

/// `:root { name: value; ... }` for the given custom properties.
pub(crate) fn root_block(vars: &[(String, String)]) -> Option<String> {
    render(PRELOAD, context! { vars => vars })
}

/// Transition rules for the `theme-transition` class.
pub(crate) fn transition_rules(duration_var: &str) -> Option<String> {
    render(
        TRANSITION,
        context! { properties => TRANSITION_PROPERTIES, duration_var => duration_var },
    )
}
