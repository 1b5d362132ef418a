//! Request body checks for the link-token endpoint.
//!
//! Every validator runs and all problems are reported together, so a client
//! fixes its request in one round trip.

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use serde_json::Value;

use crate::provider::types::{CountryCode, Product};

pub const COUNTRY_CODES_FIELD: &str = "countryCodes";
pub const PRODUCTS_FIELD: &str = "products";
pub const BODY_FIELD: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validated, canonical and de-duplicated link-token inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTokenInput {
    pub country_codes: Vec<CountryCode>,
    pub products: Vec<Product>,
}

pub fn validate_link_token_body(body: &Value) -> Result<LinkTokenInput, Vec<FieldError>> {
    let mut errors = Vec::new();

    let country_codes = validate_enum_array(
        body,
        COUNTRY_CODES_FIELD,
        |raw| raw.to_uppercase(),
        "countryCodes must be a valid plaid recognized country code",
        &mut errors,
    );
    let products = validate_enum_array(
        body,
        PRODUCTS_FIELD,
        |raw| raw.to_lowercase(),
        "products must be a valid plaid recognized product",
        &mut errors,
    );

    if errors.is_empty() {
        Ok(LinkTokenInput {
            country_codes,
            products,
        })
    } else {
        Err(errors)
    }
}

/// Body that never reached validation: wrong content type or unreadable JSON.
pub fn body_rejection(rejection: &JsonRejection) -> FieldError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "request body must be sent with content-type application/json"
        }
        JsonRejection::JsonSyntaxError(_) => "request body must be valid JSON",
        JsonRejection::JsonDataError(_) => "request body must be a JSON object",
        _ => "request body could not be read",
    };
    FieldError::new(BODY_FIELD, message)
}

fn validate_enum_array<T, N>(
    body: &Value,
    field: &str,
    normalize: N,
    unknown_message: &str,
    errors: &mut Vec<FieldError>,
) -> Vec<T>
where
    T: FromStr + PartialEq,
    N: Fn(&str) -> String,
{
    let mut values = Vec::new();

    let Some(raw) = body.get(field) else {
        errors.push(FieldError::new(field, format!("{} is required", field)));
        return values;
    };
    let items = match raw.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            errors.push(FieldError::new(
                field,
                format!("{} must be a non-empty array", field),
            ));
            return values;
        }
    };

    for (index, item) in items.iter().enumerate() {
        let element = format!("{}[{}]", field, index);
        let Some(text) = item.as_str() else {
            errors.push(FieldError::new(element, "all elements should be strings"));
            continue;
        };
        match T::from_str(&normalize(text.trim())) {
            Ok(value) if !values.contains(&value) => values.push(value),
            Ok(_) => {}
            Err(_) => errors.push(FieldError::new(element, unknown_message)),
        }
    }

    values
}
