use petfriends_core::ApiError;
use thiserror::Error;

/// Why a scenario could not run or did not hold.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A precondition of the scenario was not met, e.g. login refused.
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("emulated service failed to start: {0}")]
    Service(#[from] std::io::Error),

    /// The service answered neither the asserted nor the recorded status.
    #[error("{name}: unexpected status {status} (asserted {asserted}, recorded {recorded:?})")]
    Deviation {
        name: &'static str,
        status: u16,
        asserted: u16,
        recorded: Option<u16>,
    },
}
