//! Synchronous API client for the PetFriends pet-management service.
//!
//! # Overview
//! `PetFriendsClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). `PetFriends`
//! pairs it with a `Transport` so each operation is a single call returning
//! the service's status and body.
//!
//! # Design
//! - `PetFriendsClient` is stateless; it holds only `base_url`.
//! - Status codes are data. Only transport, codec and local-file failures
//!   surface as `ApiError`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod multipart;
pub mod pet_friends;
pub mod response;
pub mod transport;
pub mod types;

pub use client::{PetFriendsClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pet_friends::PetFriends;
pub use response::{ApiResponse, ResponseBody};
pub use transport::{Transport, UreqTransport};
pub use types::{AuthKey, NewPet, Pet, PetFilter, PetList, PetUpdate, Photo};
