//! Output collaborators: digest rendering, archiving, and email delivery.
//!
//! Everything here consumes a finished [`crate::DigestRun`]; no pipeline
//! logic lives on this side of the boundary.

pub mod archive;
pub mod email;
pub mod markdown;

pub use archive::archive_digest;
pub use email::send_digest;
pub use markdown::render_digest;
