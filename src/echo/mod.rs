//! TCP echo subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection (net::Listener)
//!     → service.rs (accept loop, one task per connection)
//!     → handler.rs (read chunk → write same chunk, until EOF/error)
//!     → connection dropped (socket closed, tracker decremented)
//! ```
//!
//! # Design Decisions
//! - Connection tasks are detached: closing the listener never cancels them
//! - A closed listener ends the loop as "stopped", any other accept error as "failed"

pub mod handler;
pub mod service;

pub use service::{EchoExit, EchoHandle, EchoService};
