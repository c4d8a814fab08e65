use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;

use crate::errors::{Result, RetargetError};
use crate::retarget::options::{NameMap, source_name_for};
use crate::scene::{NodeHandle, Scene, SkeletonKey, Skeleton};

#[inline]
pub(crate) fn joint_name(names: &SecondaryMap<NodeHandle, String>, handle: NodeHandle) -> &str {
    names.get(handle).map_or("", String::as_str)
}

/// Name -> joint index for one skeleton. The first joint with a name wins.
pub(crate) struct JointLookup<'a> {
    indices: FxHashMap<&'a str, usize>,
}

impl<'a> JointLookup<'a> {
    pub(crate) fn new(skeleton: &Skeleton, names: &'a SecondaryMap<NodeHandle, String>) -> Self {
        let mut indices = FxHashMap::default();
        for (i, &bone) in skeleton.bones.iter().enumerate() {
            if let Some(name) = names.get(bone) {
                indices.entry(name.as_str()).or_insert(i);
            }
        }
        Self { indices }
    }

    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Index of the designated root joint.
    pub(crate) fn root(&self, name: &str) -> Result<usize> {
        self.get(name).ok_or_else(|| RetargetError::RootNotFound {
            name: name.to_string(),
        })
    }
}

/// A target joint and the source joint that drives it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JointPair {
    pub target: usize,
    pub source: usize,
}

/// Pairs target joints with source joints through the rename map.
///
/// Target joints without a counterpart are left out.
pub(crate) fn pair_joints(
    target: &Skeleton,
    names: &SecondaryMap<NodeHandle, String>,
    source: &JointLookup<'_>,
    renames: &NameMap,
) -> Vec<JointPair> {
    target
        .bones
        .iter()
        .enumerate()
        .filter_map(|(t, &bone)| {
            let target_name = joint_name(names, bone);
            let source_name = source_name_for(renames, target_name);
            match source.get(source_name) {
                Some(s) => Some(JointPair { target: t, source: s }),
                None => {
                    log::debug!("Target joint '{target_name}' has no source joint '{source_name}'");
                    None
                }
            }
        })
        .collect()
}

/// Finds a joint of `skeleton` by name.
#[must_use]
pub fn find_bone_by_name(scene: &Scene, skeleton: SkeletonKey, name: &str) -> Option<NodeHandle> {
    scene
        .skeletons
        .get(skeleton)?
        .bones
        .iter()
        .copied()
        .find(|&bone| scene.get_name(bone) == Some(name))
}
