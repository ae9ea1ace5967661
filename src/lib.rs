pub mod error;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod rewrite;
pub mod tag;

// Re-export main engine types for convenience
pub use error::{BumpError, Result};
pub use reference::{ImageReference, ReferenceMatch, find_references};
pub use registry::{Manifest, ManifestEntry, RegistryClient};
pub use resolver::{Bumper, FixedTagResolver, TagResolver};
pub use rewrite::{rewrite_all, update_file};
pub use tag::{CommitDescriptor, DecomposedTag, decompose_commit, decompose_tag};
