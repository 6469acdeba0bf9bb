//! `PUT /setProperty?<prop>` and `GET /getProperty?<prop>` (spec.md SS4.F).
//!
//! The property name rides as a bare query key with no value
//! (`?selectedMediaArray`, not `?prop=selectedMediaArray`), so this can't
//! use axum's `Query` extractor (which expects `key=value` pairs) — the raw
//! query string is inspected directly instead.

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::Response;
use plist::{Dictionary, Value};

use crate::errors::AppError;
use crate::web::extractors::Plist;
use crate::web::handlers::current_session;
use crate::web::plist_ext;
use crate::web::responses::{empty_response, xml_plist_response};
use crate::web::AppState;

const NOOP_PROPERTIES: &[&str] = &["reverseEndTime", "forwardEndTime", "actionAtItemEnd"];

fn property_name(query: &Option<String>) -> &str {
    let raw = query.as_deref().unwrap_or("");
    let first = raw.split('&').next().unwrap_or("");
    first.split('=').next().unwrap_or("")
}

pub async fn set_property(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    Plist(body): Plist,
) -> Result<Response, AppError> {
    let prop = property_name(&query);

    if prop == "selectedMediaArray" {
        let session = current_session(&state).await?;
        let array = body
            .as_array()
            .ok_or_else(|| AppError::validation("selectedMediaArray body is not an array"))?;

        let selected = array.iter().find_map(|entry| {
            let dict = entry.as_dictionary()?;
            let name = plist_ext::optional_string(dict, "MediaSelectionOptionsName")?;
            let language = plist_ext::optional_string(
                dict,
                "MediaSelectionOptionsUnicodeLanguageIdentifier",
            )?;
            Some((name, language))
        });

        if let Some((name, language)) = selected {
            session.set_language(name, language).await;
        }

        return Ok(error_code_zero());
    }

    if NOOP_PROPERTIES.contains(&prop) {
        return Ok(error_code_zero());
    }

    Err(AppError::validation(format!(
        "unsupported setProperty target {prop:?}"
    )))
}

pub async fn get_property(RawQuery(query): RawQuery) -> Response {
    let prop = property_name(&query);
    tracing::debug!(property = prop, "getProperty (accepted, no-op)");
    empty_response(StatusCode::OK)
}

fn error_code_zero() -> Response {
    let mut dict = Dictionary::new();
    dict.insert("errorCode".to_string(), Value::Integer(0.into()));
    xml_plist_response(StatusCode::OK, Value::Dictionary(dict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_name_strips_any_value_and_leading_amp() {
        assert_eq!(property_name(&Some("selectedMediaArray".to_string())), "selectedMediaArray");
        assert_eq!(property_name(&Some("foo=bar".to_string())), "foo");
        assert_eq!(property_name(&None), "");
    }
}
