use crate::domain::model::{ContentItem, Selector};
use crate::domain::ports::{Document, Fetcher};
use crate::utils::error::{RenderError, Result};
use std::collections::HashMap;

/// Fetches `path` and returns its body, treating a non-success status as an
/// error. Every failure is logged here.
async fn fetch_body<F: Fetcher + ?Sized>(fetcher: &F, path: &str) -> Result<String> {
    let response = match fetcher.get(path).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Error loading {}: {}", path, e);
            return Err(e);
        }
    };

    if !response.is_success() {
        let err = RenderError::StatusError {
            path: path.to_string(),
            status: response.status,
        };
        tracing::error!("Error loading {}: {}", path, err);
        return Err(err);
    }

    Ok(response.body)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn into_item(value: serde_json::Value) -> ContentItem {
    match value {
        serde_json::Value::Object(obj) => ContentItem {
            data: obj.into_iter().collect(),
        },
        // Scalars are reachable from templates as {{value}}.
        other => ContentItem {
            data: HashMap::from([("value".to_string(), other)]),
        },
    }
}

/// Loads an HTML fragment into `mount`, replacing whatever it held.
/// On any failure the mount is left as it was. Returns the fragment size.
pub async fn load_component<F, D>(
    fetcher: &F,
    document: &mut D,
    mount: &Selector,
    path: &str,
) -> Result<usize>
where
    F: Fetcher + ?Sized,
    D: Document + ?Sized,
{
    let html = fetch_body(fetcher, path).await?;

    if !document.exists(mount) {
        let err = RenderError::MissingMountError {
            selector: mount.to_string(),
        };
        tracing::warn!("Dropping {}: {}", path, err);
        return Err(err);
    }

    document.set_inner_html(mount, &html).inspect_err(|e| {
        tracing::error!("Error loading component {}: {}", path, e);
    })?;
    tracing::debug!("Loaded {} ({} bytes) into {}", path, html.len(), mount);
    Ok(html.len())
}

/// Loads a JSON array of content items. `Err` stands in for "no data": the
/// caller renders nothing.
pub async fn load_json<F: Fetcher + ?Sized>(fetcher: &F, path: &str) -> Result<Vec<ContentItem>> {
    let body = fetch_body(fetcher, path).await?;

    let value: serde_json::Value = serde_json::from_str(&body).map_err(|source| {
        let err = RenderError::ParseError {
            path: path.to_string(),
            source,
        };
        tracing::error!("Error loading JSON: {}", err);
        err
    })?;

    match value {
        serde_json::Value::Array(items) => {
            tracing::debug!("Loaded {} items from {}", items.len(), path);
            Ok(items.into_iter().map(into_item).collect())
        }
        other => {
            let err = RenderError::NotAnArrayError {
                path: path.to_string(),
                found: json_kind(&other).to_string(),
            };
            tracing::error!("Error loading JSON: {}", err);
            Err(err)
        }
    }
}
