use std::{future::Future, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "demo@petfriends.test";
pub const DEMO_PASSWORD: &str = "demo-password";

const USER_NOT_FOUND: &str =
    "This user wasn't found in database. Provided combination of user email and password is incorrect";
const MISSING_AUTH_KEY: &str = "Please provide 'auth_key' Header";
const INVALID_AUTH_KEY: &str = "Provided 'auth_key' is incorrect";
const BAD_FILTER: &str = "Filter value is incorrect";
const MISSING_FIELD: &str = "Required form field is missing";
const MALFORMED_FORM: &str = "Malformed multipart body";
const NOT_AN_IMAGE: &str = "Unsupported media type: pet_photo must be a JPEG, PNG or GIF image";
const PET_NOT_FOUND: &str = "Pet with this id wasn't found";
const NOT_YOUR_PET: &str = "This pet belongs to another user";

type Rejection = (StatusCode, &'static str);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub created_at: String,
    pub user_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyReply {
    pub key: String,
}

/// Form fields shared by create and update. All optional at the wire level;
/// create requires them, update applies whichever are present.
#[derive(Debug, Default, Deserialize)]
pub struct PetFields {
    pub name: Option<String>,
    pub animal_type: Option<String>,
    pub age: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: String,
}

/// An account the emulated service accepts.
#[derive(Clone, Debug)]
pub struct User {
    pub email: String,
    pub password: String,
}

impl User {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

struct Account {
    user_id: String,
    email: String,
    password: String,
    key: String,
}

impl Account {
    fn register(user: User) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            email: user.email,
            password: user.password,
            key: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
        }
    }
}

#[derive(Default)]
pub struct Store {
    accounts: Vec<Account>,
    /// Newest first.
    pets: Vec<Pet>,
}

pub type Db = Arc<RwLock<Store>>;

/// Router emulating the PetFriends API for the given accounts.
///
/// Pet fields are stored as sent without validation, matching the live
/// service. Photos are checked by content sniffing only.
pub fn app(users: impl IntoIterator<Item = User>) -> Router {
    let store = Store {
        accounts: users.into_iter().map(Account::register).collect(),
        pets: Vec::new(),
    };
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/{pet_id}", put(update_pet).delete(delete_pet))
        .route("/api/pets/set_photo/{pet_id}", post(set_photo))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener, users: Vec<User>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(users)).await
}

/// Serve until `shutdown` resolves.
pub async fn run_until<F>(listener: TcpListener, users: Vec<User>, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(users))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn get_api_key(State(db): State<Db>, headers: HeaderMap) -> Result<Json<KeyReply>, Rejection> {
    let email = header_value(&headers, "email");
    let password = header_value(&headers, "password");
    let store = db.read().await;
    store
        .accounts
        .iter()
        .find(|account| Some(account.email.as_str()) == email && Some(account.password.as_str()) == password)
        .map(|account| Json(KeyReply { key: account.key.clone() }))
        .ok_or((StatusCode::FORBIDDEN, USER_NOT_FOUND))
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<PetList>, Rejection> {
    let store = db.read().await;
    let user_id = authenticate(&store, &headers)?;
    let pets = match query.filter.as_str() {
        "" => store.pets.clone(),
        "my_pets" => store
            .pets
            .iter()
            .filter(|pet| pet.user_id == user_id)
            .cloned()
            .collect(),
        _ => return Err((StatusCode::BAD_REQUEST, BAD_FILTER)),
    };
    Ok(Json(PetList { pets }))
}

async fn create_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authenticate(&*db.read().await, &headers)?;

    let mut fields = PetFields::default();
    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| (StatusCode::BAD_REQUEST, MALFORMED_FORM))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => fields.name = Some(field_text(field).await?),
            "animal_type" => fields.animal_type = Some(field_text(field).await?),
            "age" => fields.age = Some(field_text(field).await?),
            "pet_photo" => photo = Some(field_bytes(field).await?),
            _ => {}
        }
    }
    let photo = photo.ok_or((StatusCode::BAD_REQUEST, MISSING_FIELD))?;
    let pet_photo = photo_data_uri(&photo)?;

    let pet = new_pet(fields, user_id, pet_photo)?;
    db.write().await.pets.insert(0, pet.clone());
    tracing::info!(pet_id = %pet.id, "pet created");
    Ok(Json(pet))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(fields): Form<PetFields>,
) -> Result<Json<Pet>, Rejection> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let pet = new_pet(fields, user_id, String::new())?;
    store.pets.insert(0, pet.clone());
    tracing::info!(pet_id = %pet.id, "pet created without photo");
    Ok(Json(pet))
}

async fn update_pet(
    State(db): State<Db>,
    Path(pet_id): Path<String>,
    headers: HeaderMap,
    Form(fields): Form<PetFields>,
) -> Result<Json<Pet>, Rejection> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let pet = owned_pet_mut(&mut store, &pet_id, &user_id)?;
    if let Some(name) = fields.name {
        pet.name = name;
    }
    if let Some(animal_type) = fields.animal_type {
        pet.animal_type = animal_type;
    }
    if let Some(age) = fields.age {
        pet.age = age;
    }
    Ok(Json(pet.clone()))
}

/// Always 200 with an empty body, including for ids that do not exist.
async fn delete_pet(
    State(db): State<Db>,
    Path(pet_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    store
        .pets
        .retain(|pet| !(pet.id == pet_id && pet.user_id == user_id));
    Ok(StatusCode::OK)
}

async fn set_photo(
    State(db): State<Db>,
    Path(pet_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authenticate(&*db.read().await, &headers)?;

    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| (StatusCode::BAD_REQUEST, MALFORMED_FORM))?
    {
        if field.name() == Some("pet_photo") {
            photo = Some(field_bytes(field).await?);
        }
    }
    let photo = photo.ok_or((StatusCode::BAD_REQUEST, MISSING_FIELD))?;
    let pet_photo = photo_data_uri(&photo)?;

    let mut store = db.write().await;
    let pet = owned_pet_mut(&mut store, &pet_id, &user_id)?;
    pet.pet_photo = pet_photo;
    Ok(Json(pet.clone()))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, Rejection> {
    let key = header_value(headers, "auth_key").ok_or((StatusCode::FORBIDDEN, MISSING_AUTH_KEY))?;
    store
        .accounts
        .iter()
        .find(|account| account.key == key)
        .map(|account| account.user_id.clone())
        .ok_or((StatusCode::FORBIDDEN, INVALID_AUTH_KEY))
}

fn owned_pet_mut<'a>(store: &'a mut Store, pet_id: &str, user_id: &str) -> Result<&'a mut Pet, Rejection> {
    let pet = store
        .pets
        .iter_mut()
        .find(|pet| pet.id == pet_id)
        .ok_or((StatusCode::NOT_FOUND, PET_NOT_FOUND))?;
    if pet.user_id != user_id {
        return Err((StatusCode::FORBIDDEN, NOT_YOUR_PET));
    }
    Ok(pet)
}

fn new_pet(fields: PetFields, user_id: String, pet_photo: String) -> Result<Pet, Rejection> {
    let missing = (StatusCode::BAD_REQUEST, MISSING_FIELD);
    Ok(Pet {
        id: Uuid::new_v4().to_string(),
        name: fields.name.ok_or(missing)?,
        animal_type: fields.animal_type.ok_or(missing)?,
        age: fields.age.ok_or(missing)?,
        pet_photo,
        created_at: timestamp(),
        user_id,
    })
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, Rejection> {
    field
        .text()
        .await
        .map_err(|_| (StatusCode::BAD_REQUEST, MALFORMED_FORM))
}

async fn field_bytes(field: axum::extract::multipart::Field<'_>) -> Result<Vec<u8>, Rejection> {
    field
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|_| (StatusCode::BAD_REQUEST, MALFORMED_FORM))
}

/// Image type by magic number; the declared content type is ignored.
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else {
        None
    }
}

fn photo_data_uri(bytes: &[u8]) -> Result<String, Rejection> {
    let mime = sniff_image(bytes).ok_or((StatusCode::UNSUPPORTED_MEDIA_TYPE, NOT_AN_IMAGE))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Seconds since the epoch with millisecond fraction, the shape the live
/// service uses for `created_at`.
fn timestamp() -> String {
    let now = Utc::now();
    format!("{}.{:03}", now.timestamp(), now.timestamp_subsec_millis())
}
