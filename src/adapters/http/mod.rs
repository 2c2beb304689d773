//! HTTP adapter - axum routes over the application handlers.
//!
//! - `cases` - list, fetch and pre-screen cases
//! - `ai` - streamed analysis and chat, plus reconciliation
//! - `sse` - wire framing for the streamed endpoints

pub mod ai;
pub mod cases;
mod error;
mod router;
pub mod sse;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{api_router, cors_layer, health, HealthResponse, HttpSettings, SERVICE_NAME};
pub use sse::{decode_frame, encode_frame, SseDecoder, StreamProtocolError};
pub use state::{AppState, EngineParts};
