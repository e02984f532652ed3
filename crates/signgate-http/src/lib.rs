//! HTTP service layer for SignGate.
//!
//! - **Buffering**: reads each request body once into memory, with a limit
//! - **Authentication**: `SignedRequest` verification before dispatch
//! - **Handler trait**: the boundary between HTTP and application logic
//! - **Service**: hyper `Service` implementation tying it together
//! - **Response helpers**: JSON success/error formatting

pub mod body;
pub mod buffered;
pub mod dispatch;
pub mod error;
pub mod response;
pub mod service;

pub use body::SignGateResponseBody;
pub use buffered::BufferedRequest;
pub use dispatch::{HandlerFuture, SignedHandler};
pub use error::{GatewayError, GatewayErrorCode};
pub use service::{SignGateHttpConfig, SignGateHttpService};
