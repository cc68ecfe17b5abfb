//! Core Document Lifecycle
//!
//! Disposable ownership, package documents, and the registry that tracks
//! which document is active.

pub mod dispose;
pub mod document;
pub mod error;
pub mod event;
pub mod registry;
pub mod storage;

pub use dispose::{Disposable, DisposableStore, DisposeFn, dispose_all};
pub use document::PackageDocument;
pub use error::{Error, Result};
pub use event::{EventEmitter, Subscription};
pub use registry::{ACTIVE_CONTEXT_KEY, PackageRegistry, Registration};
pub use storage::{FileStorage, MemoryStorage, Storage};
