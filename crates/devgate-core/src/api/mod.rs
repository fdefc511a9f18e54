//! Backend API layer: typed errors, request/response records, and the
//! transport seam used to reach the DevGate backend.

pub mod error;
pub mod requests;
pub mod transport;

pub use error::{ApiError, ErrorKind, CODE_TWO_FACTOR_REQUIRED};
pub use requests::{paths, AuthResponse, CreateAccountRequest, LoginRequest, LogoutRequest};
pub use transport::{HttpTransport, Transport, DEFAULT_TIMEOUT};
