pub mod accounts;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod issues;
pub mod otp;
pub mod reports;
pub mod staff;

use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::error::ServiceError;

/// Decode a raw query string with `serde_qs`; a missing query yields the default.
pub(crate) fn parse_query<T: DeserializeOwned + Default>(
    raw: Option<String>,
) -> Result<T, ServiceError> {
    raw.as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| ServiceError::field("query", e.to_string()))
        .map(Option::unwrap_or_default)
}

/// `None` for absent or blank form values.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parse an optional choice field; blank means "not chosen".
pub(crate) fn parse_choice<T: FromStr>(
    value: Option<String>,
    field: &str,
) -> Result<Option<T>, ServiceError> {
    non_blank(value)
        .map(|v| {
            v.parse::<T>().map_err(|_| {
                ServiceError::field(
                    field,
                    format!("Select a valid choice. {v} is not one of the available choices."),
                )
            })
        })
        .transpose()
}
