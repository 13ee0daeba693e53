//! One-call-per-operation facade over `PetFriendsClient` and a `Transport`.

use std::path::Path;

use crate::client::PetFriendsClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::response::ApiResponse;
use crate::transport::{Transport, UreqTransport};
use crate::types::{AuthKey, NewPet, PetFilter, PetUpdate, Photo};

/// PetFriends API client performing real round-trips.
///
/// Each method sends exactly one request and returns whatever the service
/// answered as an `ApiResponse`; non-2xx statuses are not errors. There is no
/// retry and no pagination.
#[derive(Debug, Clone)]
pub struct PetFriends<T = UreqTransport> {
    client: PetFriendsClient,
    transport: T,
}

impl PetFriends<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }
}

impl<T: Transport> PetFriends<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: PetFriendsClient::new(base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    #[tracing::instrument(name = "get_api_key", skip_all, fields(email = %email))]
    pub fn get_api_key(&self, email: &str, password: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_get_api_key(email, password))
    }

    #[tracing::instrument(name = "get_list_of_pets", skip_all, fields(filter = filter.as_str()))]
    pub fn get_list_of_pets(&self, auth: &AuthKey, filter: PetFilter) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_get_list_of_pets(auth, filter)?)
    }

    /// Upload a new pet with a photo read from `photo_path`. A missing file
    /// fails before any request is sent.
    #[tracing::instrument(name = "add_new_pet", skip_all, fields(name = %pet.name))]
    pub fn add_new_pet(
        &self,
        auth: &AuthKey,
        pet: &NewPet,
        photo_path: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = Photo::from_path(photo_path)?;
        self.send(self.client.build_add_new_pet(auth, pet, &photo))
    }

    #[tracing::instrument(name = "add_new_pet_simple", skip_all, fields(name = %pet.name))]
    pub fn add_new_pet_simple(&self, auth: &AuthKey, pet: &NewPet) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_add_new_pet_simple(auth, pet)?)
    }

    #[tracing::instrument(name = "update_pet_info", skip_all, fields(pet_id = %pet_id))]
    pub fn update_pet_info(
        &self,
        auth: &AuthKey,
        pet_id: &str,
        update: &PetUpdate,
    ) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_update_pet_info(auth, pet_id, update)?)
    }

    #[tracing::instrument(name = "delete_pet", skip_all, fields(pet_id = %pet_id))]
    pub fn delete_pet(&self, auth: &AuthKey, pet_id: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_delete_pet(auth, pet_id))
    }

    #[tracing::instrument(name = "set_photo", skip_all, fields(pet_id = %pet_id))]
    pub fn set_photo(
        &self,
        auth: &AuthKey,
        pet_id: &str,
        photo_path: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = Photo::from_path(photo_path)?;
        self.send(self.client.build_set_photo(auth, pet_id, &photo))
    }

    fn send(&self, request: HttpRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method;
        let response = self.transport.execute(request)?;
        tracing::debug!(method = method.as_str(), status = response.status, "service replied");
        Ok(self.client.parse_response(response))
    }
}
