use crate::element::ElementKind;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("expected `{expected}` element, found `{found}`.")]
    UnexpectedElement {
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("`{kind}` element is not attached to the document body.")]
    Detached { kind: ElementKind },

    #[error("node id have some problem: {0}")]
    NodeId(#[from] id_tree::NodeIdError),
}
