use crate::graph::NodeKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot monitor `{name}` as a container (kind: {kind})")]
    NotAContainer { name: String, kind: NodeKind },
}
pub type Result<T> = std::result::Result<T, Error>;
