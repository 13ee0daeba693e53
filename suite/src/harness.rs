//! Per-test fixtures: a client bound to the target service, the credential
//! fixtures, and pets provisioned for the duration of one scenario.

use std::path::{Path, PathBuf};

use mock_server::User;
use petfriends_core::{ApiResponse, AuthKey, NewPet, Pet, PetFriends};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::oneshot;

use crate::error::SuiteError;
use crate::settings::{get_settings, CredentialSettings, Settings};
use crate::telemetry::init_test_tracing;

/// The pet provisioned when a scenario needs one to exist.
pub fn sample_pet() -> NewPet {
    NewPet::new("Бэтти", "йорк", 1)
}

/// Everything one scenario needs, built fresh for each test.
///
/// Without a configured `base_url`, an emulated service seeded with the
/// configured valid account is started on a random port and stopped when
/// the harness is dropped.
pub struct TestHarness {
    pf: PetFriends,
    credentials: CredentialSettings,
    service: Option<EmulatedService>,
}

impl TestHarness {
    pub fn spawn() -> Result<Self, SuiteError> {
        init_test_tracing();
        Self::from_settings(get_settings()?)
    }

    pub fn from_settings(settings: Settings) -> Result<Self, SuiteError> {
        let Settings { target, credentials } = settings;
        if let Some(base_url) = target.live_base_url() {
            let pf = PetFriends::new(base_url);
            tracing::info!(base_url = pf.base_url(), "testing live service");
            return Ok(Self {
                pf,
                credentials,
                service: None,
            });
        }

        let user = User::new(credentials.email.clone(), credentials.password.expose_secret().clone());
        let (service, base_url) = EmulatedService::start(vec![user])?;
        let pf = PetFriends::new(&base_url);
        tracing::info!(base_url = pf.base_url(), "testing emulated service");
        Ok(Self {
            pf,
            credentials,
            service: Some(service),
        })
    }

    pub fn pf(&self) -> &PetFriends {
        &self.pf
    }

    pub fn credentials(&self) -> &CredentialSettings {
        &self.credentials
    }

    pub fn is_emulated(&self) -> bool {
        self.service.is_some()
    }

    pub fn login(&self, email: &str, password: &Secret<String>) -> Result<ApiResponse, SuiteError> {
        Ok(self.pf.get_api_key(email, password.expose_secret())?)
    }

    /// Log in with the valid credentials. Anything but 200 is a setup failure.
    pub fn auth_key(&self) -> Result<AuthKey, SuiteError> {
        let response = self.login(&self.credentials.email, &self.credentials.password)?;
        if response.status != 200 {
            return Err(SuiteError::Setup(format!(
                "login as {} returned {}",
                self.credentials.email, response.status
            )));
        }
        Ok(response.auth_key()?)
    }

    /// Create `pet` without a photo and delete it again when the guard drops.
    pub fn provision_pet(&self, auth: &AuthKey, pet: &NewPet) -> Result<ProvisionedPet<'_>, SuiteError> {
        let response = self.pf.add_new_pet_simple(auth, pet)?;
        if response.status != 200 {
            return Err(SuiteError::Setup(format!(
                "provisioning pet {:?} returned {}",
                pet.name, response.status
            )));
        }
        let pet = response.pet()?;
        tracing::debug!(pet_id = %pet.id, "pet provisioned");
        Ok(ProvisionedPet::new(&self.pf, auth.clone(), pet))
    }

    /// Put a pet created by the scenario itself under teardown. `None` when
    /// the response did not create one.
    pub fn adopt(&self, auth: &AuthKey, response: &ApiResponse) -> Option<ProvisionedPet<'_>> {
        if !response.is_success() {
            return None;
        }
        let pet = response.pet().ok()?;
        Some(ProvisionedPet::new(&self.pf, auth.clone(), pet))
    }

    /// Path of an image fixture under `tests/images/`.
    pub fn fixture(&self, name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("images").join(name)
    }
}

/// A pet that exists for the duration of a scenario.
pub struct ProvisionedPet<'a> {
    pf: &'a PetFriends,
    auth: AuthKey,
    pet: Pet,
    armed: bool,
}

impl<'a> ProvisionedPet<'a> {
    fn new(pf: &'a PetFriends, auth: AuthKey, pet: Pet) -> Self {
        Self {
            pf,
            auth,
            pet,
            armed: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.pet.id
    }

    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    /// Skip teardown, for scenarios that delete the pet themselves.
    pub fn release(mut self) -> Pet {
        self.armed = false;
        self.pet.clone()
    }
}

impl Drop for ProvisionedPet<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.pf.delete_pet(&self.auth, &self.pet.id) {
            Ok(response) if response.is_success() => {
                tracing::debug!(pet_id = %self.pet.id, "pet torn down")
            }
            Ok(response) => {
                tracing::warn!(pet_id = %self.pet.id, status = response.status, "teardown refused")
            }
            Err(e) => tracing::warn!(pet_id = %self.pet.id, error = %e, "teardown failed"),
        }
    }
}

/// The mock service running on its own thread and runtime.
struct EmulatedService {
    shutdown: Option<oneshot::Sender<()>>,
}

impl EmulatedService {
    fn start(users: Vec<User>) -> Result<(Self, String), SuiteError> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (shutdown, stopped) = oneshot::channel::<()>();

        std::thread::spawn(move || {
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(std_listener) {
                    Ok(listener) => listener,
                    Err(e) => {
                        tracing::error!(error = %e, "cannot adopt listener");
                        return;
                    }
                };
                let signal = async move {
                    let _ = stopped.await;
                };
                if let Err(e) = mock_server::run_until(listener, users, signal).await {
                    tracing::error!(error = %e, "emulated service stopped");
                }
            });
        });

        Ok((
            Self {
                shutdown: Some(shutdown),
            },
            format!("http://{addr}"),
        ))
    }
}

impl Drop for EmulatedService {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
