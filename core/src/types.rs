//! Domain DTOs for the PetFriends API.
//!
//! # Design
//! These types mirror the service's JSON schema but are defined independently
//! from the mock-server crate; integration tests catch schema drift.
//! Identifiers stay `String` because the service assigns them and makes no
//! promise about their format.

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_string_from_number;

use crate::error::ApiError;

/// Session key issued by `GET /api/key`, sent back as the `auth_key` header.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthKey {
    pub key: String,
}

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKey").field("key", &"[REDACTED]").finish()
    }
}

/// Which pets a list query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PetFilter {
    /// Every pet visible on the service.
    #[default]
    All,
    /// Only pets owned by the authenticated user.
    MyPets,
}

impl PetFilter {
    /// Wire value of the `filter` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

/// A pet record as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    /// Echoed as sent, so it may be any string ("2000", "-2", "").
    #[serde(deserialize_with = "deserialize_string_from_number")]
    pub age: String,
    /// Empty, or a `data:<mime>;base64,<payload>` URI.
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Pet {
    pub fn has_photo(&self) -> bool {
        !self.pet_photo.is_empty()
    }

    /// Decode `pet_photo` into raw image bytes. `None` when the pet has no
    /// photo.
    pub fn decode_photo(&self) -> Result<Option<Vec<u8>>, ApiError> {
        if !self.has_photo() {
            return Ok(None);
        }
        let payload = match self.pet_photo.split_once(";base64,") {
            Some((_, payload)) => payload,
            None => self.pet_photo.as_str(),
        };
        STANDARD
            .decode(payload)
            .map(Some)
            .map_err(|e| ApiError::Deserialization(format!("pet_photo: {e}")))
    }
}

/// Body of `GET /api/pets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn contains(&self, id: &str) -> bool {
        self.pets.iter().any(|pet| pet.id == id)
    }

    pub fn first(&self) -> Option<&Pet> {
        self.pets.first()
    }

    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pets.len()
    }
}

/// Fields of a pet being created. The service does not validate them, so
/// empty strings and out-of-range ages are representable on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub animal_type: String,
    pub age: String,
}

impl NewPet {
    pub fn new(name: impl Into<String>, animal_type: impl Into<String>, age: impl ToString) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.to_string(),
        }
    }
}

/// Payload for updating an existing pet. Only the fields present are sent;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

impl PetUpdate {
    /// Replace all three fields.
    pub fn all(name: impl Into<String>, animal_type: impl Into<String>, age: impl ToString) -> Self {
        Self {
            name: Some(name.into()),
            animal_type: Some(animal_type.into()),
            age: Some(age.to_string()),
        }
    }
}

/// An image file ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        }
    }

    /// Read a photo from disk. The content type follows the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ApiError::Photo {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_accepts_numeric_age() {
        let pet: Pet = serde_json::from_str(
            r#"{"id":"p1","name":"Rex","animal_type":"dog","age":3,"pet_photo":""}"#,
        )
        .unwrap();
        assert_eq!(pet.age, "3");
        assert!(pet.created_at.is_none());
    }

    #[test]
    fn pet_without_photo_field_has_no_photo() {
        let pet: Pet =
            serde_json::from_str(r#"{"id":"p1","name":"Rex","animal_type":"dog","age":"3"}"#).unwrap();
        assert!(!pet.has_photo());
        assert_eq!(pet.decode_photo().unwrap(), None);
    }

    #[test]
    fn decode_photo_strips_data_uri_prefix() {
        let pet = Pet {
            id: "p1".to_string(),
            name: "Rex".to_string(),
            animal_type: "dog".to_string(),
            age: "3".to_string(),
            pet_photo: format!("data:image/jpeg;base64,{}", STANDARD.encode([0xFF, 0xD8, 0xFF])),
            created_at: None,
            user_id: None,
        };
        assert_eq!(pet.decode_photo().unwrap(), Some(vec![0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn decode_photo_rejects_garbage() {
        let pet: Pet = serde_json::from_str(
            r#"{"id":"p1","name":"Rex","animal_type":"dog","age":"3","pet_photo":"data:image/png;base64,@@@"}"#,
        )
        .unwrap();
        assert!(matches!(pet.decode_photo(), Err(ApiError::Deserialization(_))));
    }

    #[test]
    fn pet_filter_wire_values() {
        assert_eq!(PetFilter::All.as_str(), "");
        assert_eq!(PetFilter::MyPets.as_str(), "my_pets");
        assert_eq!(PetFilter::default(), PetFilter::All);
    }

    #[test]
    fn photo_content_type_follows_extension() {
        assert_eq!(Photo::new("biver.JPEG", Vec::new()).content_type, "image/jpeg");
        assert_eq!(Photo::new("cat.png", Vec::new()).content_type, "image/png");
        assert_eq!(Photo::new("biver.txt", Vec::new()).content_type, "text/plain");
        assert_eq!(Photo::new("blob", Vec::new()).content_type, "application/octet-stream");
    }

    #[test]
    fn photo_from_missing_path_is_a_photo_error() {
        let err = Photo::from_path("definitely/not/here.jpeg").unwrap_err();
        assert!(matches!(err, ApiError::Photo { .. }));
    }

    #[test]
    fn auth_key_debug_hides_the_key() {
        let rendered = format!("{:?}", AuthKey::new("s3cr3t"));
        assert!(!rendered.contains("s3cr3t"));
    }

    #[test]
    fn pet_update_omits_absent_fields() {
        let update = PetUpdate {
            name: Some("Murzik".to_string()),
            ..PetUpdate::default()
        };
        let encoded = serde_urlencoded::to_string(&update).unwrap();
        assert_eq!(encoded, "name=Murzik");
    }
}
