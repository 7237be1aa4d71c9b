//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → echo.rs (validate count/body, build context)
//!     → fanout::Dispatcher
//!     → 200 text | 400 validation | 500 combined error
//! ```

pub mod echo;
pub mod request;
pub mod server;

pub use echo::EchoRequestError;
pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
