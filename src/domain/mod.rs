//! Domain logic - pure versioning rules independent of git or the release API

pub mod calculator;
pub mod intent;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use calculator::{calculate_next, increment_existing_prerelease, prerelease_covers};
pub use intent::{ReleaseIntent, ReleaseType};
pub use prerelease::PreRelease;
pub use tag::{Tag, TagKind};
pub use version::Version;
