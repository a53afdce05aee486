mod cursor;
mod error;
mod node;

pub use cursor::{ChildCursor, CursorStep};
pub use error::{Error, Result};
pub use node::{ListenerId, Node, NodeId, NodeKind};
