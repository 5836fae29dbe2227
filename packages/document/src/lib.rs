pub mod document;
pub mod element;
pub mod error;
pub mod iter;
pub mod token;

pub use document::{CopyMap, Document};
pub use element::{DocNode, ElementKind};
pub use error::DocumentError;
pub use id_tree::NodeId;
pub use iter::{SiblingTextLeaves, TextLeaf, TextLeaves};
