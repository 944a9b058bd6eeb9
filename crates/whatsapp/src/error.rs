use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Dispatch failure taxonomy.
///
/// Provider-reported rejections are normalized into a failed
/// `DeliveryResult` by the adapters; the variants here are the failures
/// that cross layers, and the dispatcher converts every one of them into a
/// structured result at its boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Token refresh failed — fatal for the current dispatch, not retried.
    #[error("credential refresh failed: {reason}")]
    Credential { reason: String },

    /// Session-window check failed — the dispatch is aborted (fail-closed).
    #[error("window check failed: {reason}")]
    PolicyCheck { reason: String },

    /// The platform returned a structured failure for a send.
    #[error("provider rejected the request ({status}): {detail}")]
    ProviderRejected { status: u16, detail: String },

    /// The remote call could not be completed.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

impl Error {
    #[must_use]
    pub fn credential(reason: impl Into<String>) -> Self {
        Self::Credential {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn policy_check(reason: impl Into<String>) -> Self {
        Self::PolicyCheck {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn provider_rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::ProviderRejected {
            status,
            detail: detail.into(),
        }
    }
}
