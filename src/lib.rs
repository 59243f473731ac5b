//! Client core for the coderunner workbench.
//!
//! Everything here is I/O free: front ends (the browser app and the terminal
//! client) translate user events into [`workbench::Command`]s, perform the HTTP
//! round-trip the workbench asks for, and hand the reply back.

pub mod config;
pub mod editor;
pub mod error;
pub mod language;
pub mod protocol;
pub mod tabs;
pub mod view;
pub mod workbench;

pub use config::ClientConfig;
pub use editor::{BufferEditor, EditorHandle, EditorHost, EditorWidget};
pub use error::{ConfigError, EditorError, InitError, TransportError};
pub use protocol::{Action, HttpReply, OutgoingRequest};
pub use workbench::{Command, Workbench};
