//! User-interaction seam between the login protocol and whatever UI hosts
//! it.

use async_trait::async_trait;

use crate::api::{CreateAccountRequest, LoginRequest};
use crate::connectivity::OfflinePrompt;

/// Everything the login protocol needs from the user.
///
/// The gather methods may resolve to `None` when the user backs out; the
/// protocol then aborts the operation without a network call. The offline
/// prompt comes in through the [`OfflinePrompt`] supertrait so the
/// connectivity gate can reuse the same implementation.
#[async_trait]
pub trait UserInterface: OfflinePrompt {
    /// Gather login credentials, pre-filling `default_email` when present.
    async fn for_login(&self, default_email: Option<&str>) -> Option<LoginRequest>;

    /// Gather the fields for a new developer account.
    async fn for_create_account(&self) -> Option<CreateAccountRequest>;

    /// Ask for a two-factor code and attach it to the original request.
    async fn for_two_factor(&self, request: LoginRequest) -> Option<LoginRequest>;

    /// One-shot error notification with the backend-provided message.
    fn show_error(&self, message: &str);
}
