//! Output document generation
//!
//! Both builders are pure: they take the fetched stations (and, for the
//! playlist, the group mapping) and return the full document text.

pub mod m3u;
pub mod xmltv;

pub use m3u::{PlaylistBuilder, PlaylistEntry};
pub use xmltv::GuideBuilder;
