//! Session-scoped module cache.
//!
//! A [`ModuleCache`] lives exactly as long as its render session. Entries are
//! keyed by identifier and validated against the content identity on every
//! lookup, so a changed module is reloaded and an unchanged one never is.
//!
//! There is no eviction. Instead the cache refuses to hold more than
//! `max_modules` distinct modules, which bounds memory without ever forcing
//! a second load of a module the session already saw.

mod module_cache;

pub use module_cache::{CacheEntry, CacheError, ModuleCache};
