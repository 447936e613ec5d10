//! Skeletal Animation Provider
//!
//! Keyframed clips over a bone hierarchy:
//! - Pose sampling at a discrete frame or a continuous time
//! - Pose blending (offset/scale lerp, rotation slerp)
//! - Model-space bone matrices for skinning
//! - One-frame "Null" clips standing in for missing assets

use bevy::math::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;

// ============================================================================
// Bone transforms & poses
// ============================================================================

/// Local transform of one bone relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneTransform {
    pub offset: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl BoneTransform {
    pub fn blend(&self, other: &BoneTransform, factor: f32) -> BoneTransform {
        BoneTransform {
            offset: self.offset.lerp(other.offset, factor),
            rotation: self.rotation.slerp(other.rotation, factor),
            scale: self.scale.lerp(other.scale, factor),
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.offset)
    }
}

/// One local transform per armature bone
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub bones: Vec<BoneTransform>,
}

impl Pose {
    pub fn new(bones: Vec<BoneTransform>) -> Self {
        Self { bones }
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Blend toward `other`; factors outside (0, 1) return an exact copy of an endpoint.
    pub fn blend(&self, other: &Pose, factor: f32) -> Pose {
        if factor <= 0.0 {
            return self.clone();
        }
        if factor >= 1.0 {
            return other.clone();
        }
        debug_assert_eq!(self.len(), other.len(), "blending poses of different armatures");
        Pose {
            bones: self
                .bones
                .iter()
                .zip(&other.bones)
                .map(|(a, b)| a.blend(b, factor))
                .collect(),
        }
    }

    pub fn root(&self) -> Option<&BoneTransform> {
        self.bones.first()
    }
}

// ============================================================================
// Clips
// ============================================================================

/// A pose held for `duration` ticks while blending toward the next keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub duration: u32,
    pub pose: Pose,
}

/// Keyframed animation clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub looping: bool,
}

impl Animation {
    /// Total clip length in ticks (never zero)
    pub fn total_time(&self) -> u32 {
        self.keyframes
            .iter()
            .map(|k| k.duration)
            .sum::<u32>()
            .max(1)
    }

    pub fn first_pose(&self) -> Option<&Pose> {
        self.keyframes.first().map(|k| &k.pose)
    }

    pub fn last_pose(&self) -> Option<&Pose> {
        self.keyframes.last().map(|k| &k.pose)
    }

    /// Sample the clip at `time` ticks. Looping clips wrap, others clamp.
    pub fn sample(&self, time: f32) -> Pose {
        let Some(last) = self.keyframes.len().checked_sub(1) else {
            return Pose::default();
        };

        let total = self.total_time() as f32;
        let mut t = if self.looping {
            time.rem_euclid(total)
        } else {
            time.clamp(0.0, total)
        };

        for (index, key) in self.keyframes.iter().enumerate() {
            let duration = key.duration as f32;
            if t < duration || index == last {
                let next = match self.keyframes.get(index + 1) {
                    Some(next) => &next.pose,
                    None if self.looping => &self.keyframes[0].pose,
                    None => &key.pose,
                };
                let factor = if duration > 0.0 { (t / duration).min(1.0) } else { 0.0 };
                return key.pose.blend(next, factor);
            }
            t -= duration;
        }

        self.keyframes[last].pose.clone()
    }

    /// Sample at an integer frame
    pub fn sample_frame(&self, frame: u32) -> Pose {
        self.sample(frame as f32)
    }
}

// ============================================================================
// Armature
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
}

/// Bone hierarchy plus rest pose. Parents always precede their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armature {
    bones: Vec<Bone>,
    rest_pose: Pose,
}

impl Armature {
    pub fn new(bones: Vec<Bone>, rest_pose: Pose) -> Result<Self, ConfigError> {
        if bones.is_empty() {
            return Err(ConfigError::invalid("armature has no bones"));
        }
        if bones.len() != rest_pose.len() {
            return Err(ConfigError::invalid(format!(
                "armature has {} bones but rest pose has {}",
                bones.len(),
                rest_pose.len()
            )));
        }
        for (index, bone) in bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= index {
                    return Err(ConfigError::invalid(format!(
                        "bone '{}' has parent {} which does not precede it",
                        bone.name, parent
                    )));
                }
            }
        }
        Ok(Self { bones, rest_pose })
    }

    /// Single root bone at the origin
    pub fn single_bone() -> Self {
        Self {
            bones: vec![Bone {
                name: "root".to_string(),
                parent: None,
            }],
            rest_pose: Pose::new(vec![BoneTransform::default()]),
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn rest_pose(&self) -> &Pose {
        &self.rest_pose
    }

    /// One-frame clip holding the rest pose
    pub fn make_null_animation(&self, looping: bool) -> Animation {
        Animation {
            keyframes: vec![Keyframe {
                duration: 1,
                pose: self.rest_pose.clone(),
            }],
            looping,
        }
    }

    /// Clips must have exactly one transform per bone in every keyframe
    pub fn check_animation(&self, animation: &Animation) -> Result<(), ConfigError> {
        if animation.keyframes.is_empty() {
            return Err(ConfigError::invalid("animation has no keyframes"));
        }
        match animation
            .keyframes
            .iter()
            .find(|k| k.pose.len() != self.bone_count())
        {
            Some(bad) => Err(ConfigError::invalid(format!(
                "keyframe has {} bones, armature has {}",
                bad.pose.len(),
                self.bone_count()
            ))),
            None => Ok(()),
        }
    }

    /// Write model-space matrices for `pose` into `out`.
    ///
    /// Panics if `out` or `pose` does not match the bone count.
    pub fn compute_bone_matrices(&self, pose: &Pose, out: &mut [Mat4]) {
        assert_eq!(out.len(), self.bone_count(), "bone matrix buffer length");
        assert_eq!(pose.len(), self.bone_count(), "pose bone count");

        for (index, bone) in self.bones.iter().enumerate() {
            let local = pose.bones[index].to_matrix();
            out[index] = match bone.parent {
                Some(parent) => out[parent] * local,
                None => local,
            };
        }
    }
}

/// Armature plus named clips for one fighter, as produced by the asset layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipLibrary {
    pub armature: Armature,
    #[serde(default)]
    pub clips: BTreeMap<String, Animation>,
}

impl ClipLibrary {
    /// Library with no clips; every animation degrades to Null
    pub fn empty(armature: Armature) -> Self {
        Self {
            armature,
            clips: BTreeMap::new(),
        }
    }
}
