//! AI Proxy Module
//!
//! Forwards user questions to the external AI service and relays the
//! answers. When the service is unreachable or returns an error status the
//! handlers answer from a local simulator instead, so the client always gets
//! a reply.
//!
//! - **`upstream`** - `reqwest` client for the service
//! - **`fallback`** - simulated replies and the character stream
//! - **`handlers`** - `/api/ai/stream` and `/api/ai/chat`

pub mod fallback;
pub mod handlers;
pub mod upstream;

pub use handlers::{chat_handler, stream_handler};
pub use upstream::{AiQuery, AiUpstream, UpstreamError};
