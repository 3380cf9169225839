//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, close from another task)
//!     → connection.rs (connection ID, open-connection tracking)
//!     → Hand off to the echo handler
//!
//! Listener States:
//!     Open → Closed (pending accept fails with AcceptError::Closed)
//! ```
//!
//! # Design Decisions
//! - Close is a message, not a shared mutex: the owning task drops the socket
//! - Closing cancels pending accepts but never touches accepted connections
//! - "Closed" is a distinct error variant so callers can tell it from I/O failures

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{bind_tcp, AcceptError, Listener, ListenerCloser, ListenerError};
