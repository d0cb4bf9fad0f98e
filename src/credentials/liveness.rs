use tracing::{info, warn};

use super::Credential;
use crate::error::{classify_liveness_failure, AppError};
use crate::openai::OpenAiClient;

/// Confirm the service currently accepts `credential` with one lightweight call.
/// On success the credential is marked validated.
pub async fn check_liveness(
    client: &OpenAiClient,
    credential: &mut Credential,
) -> Result<(), AppError> {
    match client.list_models(credential).await {
        Ok(()) => {
            credential.mark_validated();
            info!(source = ?credential.source(), "credential accepted by service");
            Ok(())
        }
        Err(failure) => {
            let err = classify_liveness_failure(&failure);
            warn!(
                source = ?credential.source(),
                code = err.code(),
                status = failure.status,
                "credential check failed"
            );
            Err(err)
        }
    }
}
