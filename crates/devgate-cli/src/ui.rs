//! Terminal prompts for the login flow.
//!
//! Implements the core's user-interaction seam over stdin/stdout: email and
//! password prompts (with the password offered from the OS keychain when one
//! is stored), the two-factor code prompt, and the offline keep-waiting
//! prompt. Blocking reads run on the blocking thread pool so the session
//! manager's timers keep ticking underneath them.

use std::io::{self, Write};

use async_trait::async_trait;
use devgate_core::api::{CreateAccountRequest, LoginRequest};
use devgate_core::connectivity::{OfflinePrompt, WaitDecision};
use devgate_core::input::UserInterface;
use tracing::warn;

/// Keychain service name for stored passwords.
const SERVICE_NAME: &str = "devgate";

pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Read one trimmed line from stdin without blocking the runtime.
pub async fn read_line(prompt: &str) -> Option<String> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || prompt_line(&prompt).ok())
        .await
        .ok()
        .flatten()
}

/// Fetch the password for `email`, offering the one stored in the OS
/// keychain when present. A freshly typed password is stored for next time.
fn gather_password(email: &str) -> Option<String> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, email) {
        if let Ok(stored) = entry.get_password() {
            let answer = prompt_line("Use stored password? [Y/n]: ").ok()?;
            if !answer.eq_ignore_ascii_case("n") {
                return Some(stored);
            }
        }
    }

    let password = rpassword::prompt_password("Password: ").ok()?;
    if password.is_empty() {
        return None;
    }

    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, email) {
        if let Err(err) = entry.set_password(&password) {
            warn!(error = %err, "Failed to store password in keychain");
        }
    }
    Some(password)
}

#[async_trait]
impl OfflinePrompt for TerminalUi {
    async fn offer_cancel(&self, message: &str) -> WaitDecision {
        let prompt = format!("{} [press Enter to keep waiting, c to cancel]: ", message);
        tokio::task::spawn_blocking(move || match prompt_line(&prompt) {
            Ok(line) if line.eq_ignore_ascii_case("c") => WaitDecision::Cancel,
            _ => WaitDecision::KeepWaiting,
        })
        .await
        .unwrap_or(WaitDecision::KeepWaiting)
    }
}

#[async_trait]
impl UserInterface for TerminalUi {
    async fn for_login(&self, default_email: Option<&str>) -> Option<LoginRequest> {
        let default_email = default_email.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let prompt = match default_email.as_deref() {
                Some(email) => format!("Email [{}]: ", email),
                None => "Email: ".to_string(),
            };
            let typed = prompt_line(&prompt).ok()?;
            let email = if typed.is_empty() { default_email? } else { typed };
            let password = gather_password(&email)?;
            Some(LoginRequest::new(email, password))
        })
        .await
        .ok()
        .flatten()
    }

    async fn for_create_account(&self) -> Option<CreateAccountRequest> {
        tokio::task::spawn_blocking(move || {
            let email = prompt_line("Email: ").ok()?;
            if email.is_empty() {
                return None;
            }
            let password = rpassword::prompt_password("Password: ").ok()?;
            if password.is_empty() {
                return None;
            }
            let studio = prompt_line("Studio name (optional): ").ok()?;
            Some(CreateAccountRequest {
                email,
                password,
                studio_name: if studio.is_empty() {
                    None
                } else {
                    Some(studio)
                },
            })
        })
        .await
        .ok()
        .flatten()
    }

    async fn for_two_factor(&self, request: LoginRequest) -> Option<LoginRequest> {
        let code = read_line("Two-factor code: ").await?;
        if code.is_empty() {
            return None;
        }
        Some(request.with_two_factor_code(code))
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}
