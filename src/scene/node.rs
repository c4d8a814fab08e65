use glam::Affine3A;

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// A scene graph node: its place in the hierarchy and its transform.
///
/// Names and skin bindings live in the [`Scene`](crate::scene::Scene)'s
/// side tables keyed by [`NodeHandle`]. A joint is an ordinary node that
/// some skeleton lists among its bones.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub transform: Transform,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transform(transform: Transform) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix as of the last transform pass.
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        self.transform.world_matrix()
    }
}
