pub mod codec;
pub mod config;
pub mod error;
pub mod namespace;
pub mod node;
pub mod path;
pub mod search;
pub mod shell;
pub mod tree;

pub use error::VfsError;
pub use namespace::FileSystem;
pub use tree::Tree;
