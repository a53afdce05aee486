use super::node::NodeKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid node name: {0:?}")]
    InvalidName(String),
    #[error("node `{name}` is not a container (kind: {kind})")]
    NotAContainer { name: String, kind: NodeKind },
    #[error("node `{child}` is already a child of `{parent}`")]
    AlreadyAdded { parent: String, child: String },
    #[error("node `{child}` is not a child of `{parent}`")]
    NotAChild { parent: String, child: String },
}
pub type Result<T> = std::result::Result<T, Error>;
