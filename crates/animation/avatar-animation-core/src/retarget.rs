//! Cross-skeleton retargeting of keyframe clips.
//!
//! A [`RetargetMap`] names the canonical bone behind each source-rig joint;
//! a [`BoneResolver`] names the destination node behind each canonical bone.
//! Retargeting renames tracks through both and drops whatever does not map.

use hashbrown::HashMap;
use log::{debug, warn};
use once_cell::sync::Lazy;

use crate::clip::{AnimationClip, KeyframeTrack};
use crate::skeleton::{BoneResolver, HumanoidBone};

/// Source joint name → canonical bone. Built once, read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetargetMap {
    entries: HashMap<String, HumanoidBone>,
}

static MIXAMO: Lazy<RetargetMap> = Lazy::new(|| {
    use HumanoidBone::*;
    RetargetMap::from_pairs([
        ("mixamorigHips", Hips),
        ("mixamorigSpine", Spine),
        ("mixamorigSpine1", Chest),
        ("mixamorigSpine2", UpperChest),
        ("mixamorigNeck", Neck),
        ("mixamorigHead", Head),
        ("mixamorigLeftUpLeg", LeftUpperLeg),
        ("mixamorigLeftLeg", LeftLowerLeg),
        ("mixamorigLeftFoot", LeftFoot),
        ("mixamorigLeftToeBase", LeftToes),
        ("mixamorigRightUpLeg", RightUpperLeg),
        ("mixamorigRightLeg", RightLowerLeg),
        ("mixamorigRightFoot", RightFoot),
        ("mixamorigRightToeBase", RightToes),
        ("mixamorigLeftShoulder", LeftShoulder),
        ("mixamorigLeftArm", LeftUpperArm),
        ("mixamorigLeftForeArm", LeftLowerArm),
        ("mixamorigLeftHand", LeftHand),
        ("mixamorigRightShoulder", RightShoulder),
        ("mixamorigRightArm", RightUpperArm),
        ("mixamorigRightForeArm", RightLowerArm),
        ("mixamorigRightHand", RightHand),
        ("mixamorigLeftHandThumb1", LeftThumbMetacarpal),
        ("mixamorigLeftHandThumb2", LeftThumbProximal),
        ("mixamorigLeftHandThumb3", LeftThumbDistal),
        ("mixamorigLeftHandIndex1", LeftIndexProximal),
        ("mixamorigLeftHandIndex2", LeftIndexIntermediate),
        ("mixamorigLeftHandIndex3", LeftIndexDistal),
        ("mixamorigLeftHandMiddle1", LeftMiddleProximal),
        ("mixamorigLeftHandMiddle2", LeftMiddleIntermediate),
        ("mixamorigLeftHandMiddle3", LeftMiddleDistal),
        ("mixamorigLeftHandRing1", LeftRingProximal),
        ("mixamorigLeftHandRing2", LeftRingIntermediate),
        ("mixamorigLeftHandRing3", LeftRingDistal),
        ("mixamorigLeftHandPinky1", LeftLittleProximal),
        ("mixamorigLeftHandPinky2", LeftLittleIntermediate),
        ("mixamorigLeftHandPinky3", LeftLittleDistal),
        ("mixamorigRightHandThumb1", RightThumbMetacarpal),
        ("mixamorigRightHandThumb2", RightThumbProximal),
        ("mixamorigRightHandThumb3", RightThumbDistal),
        ("mixamorigRightHandIndex1", RightIndexProximal),
        ("mixamorigRightHandIndex2", RightIndexIntermediate),
        ("mixamorigRightHandIndex3", RightIndexDistal),
        ("mixamorigRightHandMiddle1", RightMiddleProximal),
        ("mixamorigRightHandMiddle2", RightMiddleIntermediate),
        ("mixamorigRightHandMiddle3", RightMiddleDistal),
        ("mixamorigRightHandRing1", RightRingProximal),
        ("mixamorigRightHandRing2", RightRingIntermediate),
        ("mixamorigRightHandRing3", RightRingDistal),
        ("mixamorigRightHandPinky1", RightLittleProximal),
        ("mixamorigRightHandPinky2", RightLittleIntermediate),
        ("mixamorigRightHandPinky3", RightLittleDistal),
    ])
});

impl RetargetMap {
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, HumanoidBone)>) -> Self {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Mixamo rig naming. Exports that keep the namespace colon
    /// (`mixamorig:Hips`) are matched too.
    pub fn mixamo() -> &'static RetargetMap {
        &MIXAMO
    }

    /// Canonical bone for a source joint name.
    pub fn bone_for_source_name(&self, name: &str) -> Option<HumanoidBone> {
        if let Some(bone) = self.entries.get(name) {
            return Some(*bone);
        }
        if name.contains(':') {
            let flat = name.replace(':', "");
            return self.entries.get(flat.as_str()).copied();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rename `clip`'s tracks from source joints to destination nodes.
///
/// Tracks whose joint has no map entry, or whose bone the destination lacks,
/// are dropped. Timing, values and clip duration are unchanged. When nothing
/// survives the input clip is returned as-is.
pub fn retarget_clip(clip: &AnimationClip, map: &RetargetMap, resolver: &dyn BoneResolver) -> AnimationClip {
    let mut tracks: Vec<KeyframeTrack> = Vec::with_capacity(clip.tracks.len());
    for track in &clip.tracks {
        let (joint, property) = track.target();
        let Some(bone) = map.bone_for_source_name(joint) else {
            continue;
        };
        let Some(node) = resolver.resolve(bone) else {
            debug!("retarget: destination has no node for {bone}; dropping '{}'", track.name);
            continue;
        };
        let name = if property.is_empty() {
            node
        } else {
            format!("{node}.{property}")
        };
        tracks.push(KeyframeTrack {
            name,
            ..track.clone()
        });
    }

    if tracks.is_empty() {
        warn!(
            "retarget: no tracks of '{}' map onto the destination skeleton; using the clip unchanged",
            clip.name
        );
        return clip.clone();
    }
    debug!(
        "retarget: '{}' kept {}/{} tracks",
        clip.name,
        tracks.len(),
        clip.tracks.len()
    );
    AnimationClip {
        name: clip.name.clone(),
        duration: clip.duration,
        tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::TrackKind;
    use crate::skeleton::NodeNameTable;

    fn quat_track(name: &str) -> KeyframeTrack {
        KeyframeTrack::new(name, TrackKind::Quaternion, vec![0.0], vec![0.0, 0.0, 0.0, 1.0])
    }

    #[test]
    fn mixamo_table_covers_body_and_fingers() {
        let map = RetargetMap::mixamo();
        assert_eq!(map.len(), 52);
        assert_eq!(map.bone_for_source_name("mixamorigSpine1"), Some(HumanoidBone::Chest));
        assert_eq!(map.bone_for_source_name("mixamorig:Hips"), Some(HumanoidBone::Hips));
        assert_eq!(map.bone_for_source_name("Armature"), None);
    }

    #[test]
    fn renames_and_drops() {
        let mut nodes = NodeNameTable::default();
        nodes.insert(HumanoidBone::Hips, "J_Bip_C_Hips");
        let clip = AnimationClip::new(
            "walk",
            1.0,
            vec![
                quat_track("mixamorigHips.quaternion"),
                quat_track("mixamorigHead.quaternion"),
                quat_track("Armature.quaternion"),
            ],
        );
        let out = retarget_clip(&clip, RetargetMap::mixamo(), &nodes);
        assert_eq!(out.tracks.len(), 1);
        assert_eq!(out.tracks[0].name, "J_Bip_C_Hips.quaternion");
        assert_eq!(out.tracks[0].values, clip.tracks[0].values);
        assert_eq!(out.duration, 1.0);
    }

    #[test]
    fn nothing_mapped_returns_original() {
        let clip = AnimationClip::new("odd", 2.0, vec![quat_track("Bone001.quaternion")]);
        let out = retarget_clip(&clip, RetargetMap::mixamo(), &NodeNameTable::default());
        assert_eq!(out, clip);
    }
}
