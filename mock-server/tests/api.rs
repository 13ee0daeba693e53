use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mock_server::{app, KeyReply, Pet, PetList, User};
use tower::ServiceExt;

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9];
const BOUNDARY: &str = "test-boundary";

fn service() -> Router {
    app(vec![
        User::new("alice@example.test", "alice-pw"),
        User::new("bob@example.test", "bob-pw"),
    ])
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn key_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/key")
        .header("email", email)
        .header("password", password)
        .body(Body::empty())
        .unwrap()
}

fn authed(method: &str, uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("auth_key", key)
        .body(Body::empty())
        .unwrap()
}

fn form_request(method: &str, uri: &str, key: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("auth_key", key)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `files` are `(field, filename, bytes)`.
fn multipart_request(uri: &str, key: &str, texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("auth_key", key)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let resp = app.clone().oneshot(key_request(email, password)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let reply: KeyReply = body_json(resp).await;
    reply.key
}

async fn create_simple(app: &Router, key: &str, body: &str) -> Pet {
    let resp = app
        .clone()
        .oneshot(form_request("POST", "/api/create_pet_simple", key, body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

async fn list(app: &Router, key: &str, filter: &str) -> PetList {
    let resp = app
        .clone()
        .oneshot(authed("GET", &format!("/api/pets?filter={filter}"), key))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- key ---

#[tokio::test]
async fn key_issued_for_valid_credentials() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    assert!(!key.is_empty());
    // Same account, same key.
    assert_eq!(login(&app, "alice@example.test", "alice-pw").await, key);
}

#[tokio::test]
async fn key_refused_for_wrong_password() {
    let resp = service()
        .oneshot(key_request("alice@example.test", "nope"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_bytes(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("wasn't found"));
}

#[tokio::test]
async fn key_refused_without_headers() {
    let resp = service()
        .oneshot(Request::builder().uri("/api/key").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- list ---

#[tokio::test]
async fn list_requires_known_key() {
    let resp = service()
        .oneshot(authed("GET", "/api/pets?filter=", "12345"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = service()
        .oneshot(Request::builder().uri("/api/pets").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_rejects_unknown_filter() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    let resp = app
        .oneshot(authed("GET", "/api/pets?filter=everything", &key))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn my_pets_only_lists_own_pets() {
    let app = service();
    let alice = login(&app, "alice@example.test", "alice-pw").await;
    let bob = login(&app, "bob@example.test", "bob-pw").await;

    let alices = create_simple(&app, &alice, "name=Rex&animal_type=dog&age=3").await;
    let bobs = create_simple(&app, &bob, "name=Tom&animal_type=cat&age=2").await;

    let all = list(&app, &alice, "").await;
    assert_eq!(all.pets.len(), 2);
    // Newest first.
    assert_eq!(all.pets[0].id, bobs.id);

    let mine = list(&app, &alice, "my_pets").await;
    assert_eq!(mine.pets.len(), 1);
    assert_eq!(mine.pets[0].id, alices.id);
}

// --- create ---

#[tokio::test]
async fn create_with_photo_stores_data_uri() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    let resp = app
        .oneshot(multipart_request(
            "/api/pets",
            &key,
            &[("name", "Бэтти"), ("animal_type", "биверйорк"), ("age", "1")],
            &[("pet_photo", "biver.jpeg", JPEG)],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let pet: Pet = body_json(resp).await;
    assert_eq!(pet.name, "Бэтти");
    assert_eq!(pet.age, "1");
    assert!(pet.pet_photo.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn create_with_text_photo_returns_415() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    let resp = app
        .oneshot(multipart_request(
            "/api/pets",
            &key,
            &[("name", "Бэтти"), ("animal_type", "биверйорк"), ("age", "1")],
            &[("pet_photo", "biver.txt", &b"not an image"[..])],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn create_without_photo_part_returns_400() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    let resp = app
        .oneshot(multipart_request(
            "/api/pets",
            &key,
            &[("name", "Rex"), ("animal_type", "dog"), ("age", "1")],
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_accepts_values_a_stricter_service_would_refuse() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    for body in ["name=Rex&animal_type=dog&age=2000", "name=Rex&animal_type=dog&age=-2", "name=&animal_type=&age="] {
        create_simple(&app, &key, body).await;
    }
    assert_eq!(list(&app, &key, "my_pets").await.pets.len(), 3);
}

#[tokio::test]
async fn create_simple_missing_field_returns_400() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    let resp = app
        .oneshot(form_request("POST", "/api/create_pet_simple", &key, "name=Rex&age=1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_unknown_pet_returns_404() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    let resp = app
        .oneshot(form_request("PUT", "/api/pets/no-such-pet", &key, "name=Nope"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_foreign_pet_returns_403() {
    let app = service();
    let alice = login(&app, "alice@example.test", "alice-pw").await;
    let bob = login(&app, "bob@example.test", "bob-pw").await;
    let pet = create_simple(&app, &alice, "name=Rex&animal_type=dog&age=3").await;

    let resp = app
        .oneshot(form_request("PUT", &format!("/api/pets/{}", pet.id), &bob, "name=Stolen"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- delete ---

#[tokio::test]
async fn delete_unknown_pet_is_still_200() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;
    let resp = app
        .oneshot(authed("DELETE", "/api/pets/no-such-pet", &key))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

// --- full lifecycle ---

#[tokio::test]
async fn pet_lifecycle() {
    let app = service();
    let key = login(&app, "alice@example.test", "alice-pw").await;

    // create
    let created = create_simple(&app, &key, "name=Сырник&animal_type=кот&age=5").await;
    assert_eq!(created.name, "Сырник");
    assert!(created.pet_photo.is_empty());
    let id = created.id;

    // update - partial: only name
    let resp = app
        .clone()
        .oneshot(form_request("PUT", &format!("/api/pets/{id}"), &key, "name=Мурзик"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Pet = body_json(resp).await;
    assert_eq!(updated.name, "Мурзик");
    assert_eq!(updated.animal_type, "кот"); // unchanged

    // set photo
    let resp = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/pets/set_photo/{id}"),
            &key,
            &[],
            &[("pet_photo", "cheese.jpeg", JPEG)],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let with_photo: Pet = body_json(resp).await;
    assert!(with_photo.pet_photo.starts_with("data:image/jpeg;base64,"));

    // delete
    let resp = app
        .clone()
        .oneshot(authed("DELETE", &format!("/api/pets/{id}"), &key))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // list after delete - gone
    let mine = list(&app, &key, "my_pets").await;
    assert!(mine.pets.iter().all(|pet| pet.id != id));
}
