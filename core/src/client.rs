//! Stateless HTTP request builder and response parser for the PetFriends API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation has a `build_*` method that produces an
//! `HttpRequest`; every reply goes through the single `parse_response`, since
//! the suite inspects status and body of failures as much as of successes.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartForm;
use crate::response::{ApiResponse, ResponseBody};
use crate::types::{AuthKey, NewPet, PetFilter, PetUpdate, Photo};

/// Base URL of the public PetFriends deployment.
pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous, stateless client for the PetFriends API.
#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    base_url: String,
}

impl Default for PetFriendsClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl PetFriendsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_api_key(&self, email: &str, password: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/key", self.base_url),
            headers: vec![
                ("email".to_string(), email.to_string()),
                ("password".to_string(), password.to_string()),
            ],
            body: None,
        }
    }

    pub fn build_get_list_of_pets(&self, auth: &AuthKey, filter: PetFilter) -> Result<HttpRequest, ApiError> {
        let query = serde_urlencoded::to_string(&[("filter", filter.as_str())])
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/pets?{query}", self.base_url),
            headers: vec![auth_header(auth)],
            body: None,
        })
    }

    pub fn build_add_new_pet(&self, auth: &AuthKey, pet: &NewPet, photo: &Photo) -> HttpRequest {
        let form = MultipartForm::new()
            .text("name", &pet.name)
            .text("animal_type", &pet.animal_type)
            .text("age", &pet.age)
            .file("pet_photo", photo);
        multipart_request(format!("{}/api/pets", self.base_url), auth, form)
    }

    pub fn build_add_new_pet_simple(&self, auth: &AuthKey, pet: &NewPet) -> Result<HttpRequest, ApiError> {
        form_request(
            HttpMethod::Post,
            format!("{}/api/create_pet_simple", self.base_url),
            auth,
            pet,
        )
    }

    pub fn build_update_pet_info(
        &self,
        auth: &AuthKey,
        pet_id: &str,
        update: &PetUpdate,
    ) -> Result<HttpRequest, ApiError> {
        form_request(
            HttpMethod::Put,
            format!("{}/api/pets/{pet_id}", self.base_url),
            auth,
            update,
        )
    }

    pub fn build_delete_pet(&self, auth: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}/api/pets/{pet_id}", self.base_url),
            headers: vec![auth_header(auth)],
            body: None,
        }
    }

    pub fn build_set_photo(&self, auth: &AuthKey, pet_id: &str, photo: &Photo) -> HttpRequest {
        let form = MultipartForm::new().file("pet_photo", photo);
        multipart_request(format!("{}/api/pets/set_photo/{pet_id}", self.base_url), auth, form)
    }

    /// Turn a raw reply into an `ApiResponse`. Never fails: bodies that are
    /// not JSON are kept as text.
    pub fn parse_response(&self, response: HttpResponse) -> ApiResponse {
        ApiResponse {
            status: response.status,
            body: ResponseBody::parse(response.body),
        }
    }
}

fn auth_header(auth: &AuthKey) -> (String, String) {
    ("auth_key".to_string(), auth.key.clone())
}

fn multipart_request(url: String, auth: &AuthKey, form: MultipartForm) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Post,
        url,
        headers: vec![
            auth_header(auth),
            ("content-type".to_string(), form.content_type()),
        ],
        body: Some(form.into_body()),
    }
}

fn form_request<T: serde::Serialize>(
    method: HttpMethod,
    url: String,
    auth: &AuthKey,
    fields: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_urlencoded::to_string(fields).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![
            auth_header(auth),
            ("content-type".to_string(), FORM_CONTENT_TYPE.to_string()),
        ],
        body: Some(body.into_bytes()),
    })
}
