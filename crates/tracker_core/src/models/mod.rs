//! Data models for persistence and the proxy wire format.

/// Creatives, personas, phases and edit overlays.
pub mod creative;
/// Project registry records.
pub mod project;
/// Proxy request/response envelopes.
pub mod proxy;
/// Completion status records.
pub mod status;

pub use creative::{Creative, CreativeEdit, EditField, EditMap, Persona, Phase};
pub use project::{Project, ProjectMap};
pub use proxy::{ProxyRequest, ProxyResponse, SheetAction};
pub use status::{CreativeStatus, StatusEntry, StatusMap};
