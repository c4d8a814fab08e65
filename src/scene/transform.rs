use glam::{Affine3A, Quat, Vec3};

/// TRS values a cached local matrix was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BuiltFrom {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

/// Local placement of a node relative to its parent.
///
/// The public TRS fields are the source of truth. `local_matrix` and
/// `world_matrix` are caches refreshed by the transform system; the local
/// cache is rebuilt whenever the TRS fields differ from the values it was
/// last built from.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    /// `None` forces the next rebuild.
    built_from: Option<BuiltFrom>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            built_from: None,
        }
    }

    fn current(&self) -> BuiltFrom {
        BuiltFrom {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Rebuilds the cached local matrix when the TRS fields moved since the
    /// last build. Returns whether it was rebuilt.
    pub fn update_local_matrix(&mut self) -> bool {
        let now = self.current();
        if self.built_from == Some(now) {
            return false;
        }
        self.local_matrix = self.trs_matrix();
        self.built_from = Some(now);
        true
    }

    /// Local matrix straight from the TRS fields, bypassing the cache.
    ///
    /// Joints written by the animation mixer have fresh TRS values but a
    /// stale cache until the next transform pass.
    #[inline]
    #[must_use]
    pub fn trs_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// Overrides the cached world matrix until the next transform pass.
    ///
    /// The node is marked dirty, so that pass rebuilds the world matrix
    /// from the hierarchy again.
    pub fn set_world_matrix(&mut self, world: Affine3A) {
        self.world_matrix = world;
        self.mark_dirty();
    }

    /// Replaces the TRS fields with the decomposition of `local`.
    ///
    /// Shear does not survive the decomposition. The node stays dirty so the
    /// next transform pass propagates the new placement to its subtree.
    pub fn apply_local_matrix(&mut self, local: Affine3A) {
        let (scale, rotation, position) = local.to_scale_rotation_translation();
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self.local_matrix = local;
        self.mark_dirty();
    }

    pub fn mark_dirty(&mut self) {
        self.built_from = None;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
