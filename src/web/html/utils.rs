use std::collections::HashMap;

use html_minifier::HTMLMinifier;
use tera::Context;
use thiserror::Error;
use tide::http::StatusCode;
use tide::Response;

use crate::State;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("rendering error")]
    Tera(#[from] tera::Error),
}

pub(super) fn render(
    state: &State,
    template: &'static str,
    context: &Context,
) -> Result<String, TemplateError> {
    let rendered = state.tera.render(template, context)?;

    let mut html_minifier = HTMLMinifier::new();
    if let Err(err) = html_minifier.digest(&rendered) {
        tracing::error!("Failed to minify HTML: {}", err);
        return Ok(rendered);
    };

    let minified = match std::str::from_utf8(html_minifier.get_html()) {
        Ok(minified) => minified.to_string(),
        Err(err) => {
            tracing::error!("Failed to parse minified HTML as UTF-8: {}", err);
            rendered
        },
    };

    Ok(minified)
}

pub(super) fn html_response(
    state: &State,
    status: StatusCode,
    template: &'static str,
    context: &Context,
) -> tide::Result<Response> {
    let body = render(state, template, context)?;
    Ok(Response::builder(status)
        .content_type("text/html")
        .body(body)
        .build())
}

/// Escapes a value for use inside a quoted HTML attribute.
///
/// Same as Tera's autoescaping, except `/` is left alone so URLs stay readable in the markup.
pub(crate) struct AttributeEscape;

impl tera::Filter for AttributeEscape {
    fn filter(
        &self,
        value: &tera::Value,
        _args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        let raw = match value {
            tera::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let escaped = tera::escape_html(&raw).replace("&#x2F;", "/");
        Ok(tera::Value::String(escaped))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_escape_keeps_slashes() {
        let escaped = tera::Filter::filter(
            &AttributeEscape,
            &tera::Value::from("http://x/1.jpg?a=1&b=\"2\""),
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(escaped, tera::Value::from("http://x/1.jpg?a=1&amp;b=&quot;2&quot;"));
    }

    #[test]
    fn attribute_escape_still_escapes_markup() {
        let escaped = tera::Filter::filter(
            &AttributeEscape,
            &tera::Value::from("\"><script>'"),
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(escaped, tera::Value::from("&quot;&gt;&lt;script&gt;&#x27;"));
    }
}
