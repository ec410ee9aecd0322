//! Source resolver adapters
//!
//! Implementations of [`SourceResolverPort`](wikiscript_application::SourceResolverPort):
//!
//! - [`InMemorySourceResolver`]: a thread-safe title → text map, for tests
//!   and for hosts that already hold page text in memory
//! - [`DirectorySourceResolver`]: one `.lua` file per module under a root
//!   directory

mod directory;
mod memory;

pub use directory::DirectorySourceResolver;
pub use memory::InMemorySourceResolver;
