//! Parsed service replies.
//!
//! Every operation yields an `ApiResponse` carrying the raw status and the
//! body, decoded as JSON when possible and kept as text otherwise. Typed views
//! (`pets`, `pet`, `auth_key`) are opt-in so that tests can still inspect error
//! pages and unexpected payloads.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{AuthKey, Pet, PetList};

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Top-level JSON field, if the body is a JSON object holding it.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => value.get(name),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Whether the body refers to `name`: a JSON key, or a word in a text body.
    pub fn mentions(&self, name: &str) -> bool {
        match &self.body {
            ResponseBody::Json(_) => self.field(name).is_some(),
            ResponseBody::Text(text) => text.contains(name),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match &self.body {
            ResponseBody::Json(value) => {
                T::deserialize(value).map_err(|e| ApiError::Deserialization(e.to_string()))
            }
            ResponseBody::Text(text) => Err(ApiError::Deserialization(format!(
                "expected JSON, got text: {}",
                truncate(text)
            ))),
        }
    }

    pub fn auth_key(&self) -> Result<AuthKey, ApiError> {
        self.decode()
    }

    pub fn pets(&self) -> Result<PetList, ApiError> {
        self.decode()
    }

    pub fn pet(&self) -> Result<Pet, ApiError> {
        self.decode()
    }

    /// Require `expected`, mapping anything else to an `ApiError`.
    pub fn expect_status(&self, expected: u16) -> Result<&Self, ApiError> {
        if self.status == expected {
            return Ok(self);
        }
        if self.status == 404 {
            return Err(ApiError::NotFound);
        }
        let body = match &self.body {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text.clone(),
        };
        Err(ApiError::HttpError {
            status: self.status,
            body,
        })
    }
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(120) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
