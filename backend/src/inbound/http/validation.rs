//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes a `400` whose details name the offending
//! field, so forms can attach the message to the right input.

use serde_json::json;

use crate::domain::{
    AccountValidationError, Error, OrganizationId, OrganizationValidationError, SiteId,
    SiteValidationError, SlugError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidId,
    InvalidValue,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidId => "invalid_id",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(field, ErrorCode::MissingField, format!("missing required field: {name}"))
}

/// Unwrap an optional body field or report it as missing.
pub(crate) fn required(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_organization_id(value: &str, field: FieldName) -> Result<OrganizationId, Error> {
    value.parse().map_err(|_| {
        let name = field.as_str();
        field_error(field, ErrorCode::InvalidUuid, format!("{name} must be a valid UUID"))
    })
}

pub(crate) fn parse_site_id(value: String, field: FieldName) -> Result<SiteId, Error> {
    SiteId::parse(value).map_err(|err| field_error(field, ErrorCode::InvalidId, err.to_string()))
}

pub(crate) fn account_error(err: &AccountValidationError) -> Error {
    field_error(FieldName::new(err.field()), ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn organization_error(err: &OrganizationValidationError, field: FieldName) -> Error {
    field_error(field, ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn site_error(err: &SiteValidationError, field: FieldName) -> Error {
    field_error(field, ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn slug_error(err: &SlugError, field: FieldName) -> Error {
    field_error(field, ErrorCode::InvalidValue, err.to_string())
}
