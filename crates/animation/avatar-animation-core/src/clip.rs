//! Keyframe clip data: the JSON interchange format for externally authored
//! animation, plus sampling.

use avatar_api_core::{slerp, Quat};
use serde::{Deserialize, Serialize};

use crate::error::ClipError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Vector,
    Quaternion,
    Number,
}

impl TrackKind {
    /// Floats per keyframe.
    pub fn value_size(self) -> usize {
        match self {
            TrackKind::Vector => 3,
            TrackKind::Quaternion => 4,
            TrackKind::Number => 1,
        }
    }
}

/// One animated property: `"<node>.<property>"`, keyframe times in seconds and
/// the flattened values (`times.len() * kind.value_size()` floats).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTrack {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub times: Vec<f32>,
    pub values: Vec<f32>,
}

impl KeyframeTrack {
    pub fn new(name: impl Into<String>, kind: TrackKind, times: Vec<f32>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            kind,
            times,
            values,
        }
    }

    /// `(node, property)`, split on the first `.`. Names without a dot have an
    /// empty property.
    pub fn target(&self) -> (&str, &str) {
        match self.name.split_once('.') {
            Some((node, prop)) => (node, prop),
            None => (self.name.as_str(), ""),
        }
    }

    pub fn validate(&self) -> Result<(), ClipError> {
        let bad = |reason: String| ClipError::InvalidTrack {
            track: self.name.clone(),
            reason,
        };
        let size = self.kind.value_size();
        if self.values.len() != self.times.len() * size {
            return Err(bad(format!(
                "expected {} values for {} keyframes, found {}",
                self.times.len() * size,
                self.times.len(),
                self.values.len()
            )));
        }
        if self.times.windows(2).any(|w| w[1] < w[0]) {
            return Err(bad("keyframe times are not sorted".into()));
        }
        if self.times.iter().any(|t| !t.is_finite()) {
            return Err(bad("non-finite keyframe time".into()));
        }
        Ok(())
    }

    fn key(&self, i: usize) -> Option<&[f32]> {
        let n = self.kind.value_size();
        self.values.get(i * n..(i + 1) * n)
    }

    /// Value at `t`: held before the first and after the last keyframe,
    /// linearly interpolated between (quaternions slerped). Empty when the
    /// track has no keys or too few values to cover them.
    pub fn sample(&self, t: f32) -> Vec<f32> {
        let Some(last) = self.times.len().checked_sub(1) else {
            return Vec::new();
        };
        let hold = |i: usize| self.key(i).map(<[f32]>::to_vec).unwrap_or_default();
        if t <= self.times[0] {
            return hold(0);
        }
        if t >= self.times[last] {
            return hold(last);
        }
        let hi = self.times.partition_point(|k| *k <= t).clamp(1, last);
        let lo = hi - 1;
        let span = self.times[hi] - self.times[lo];
        let u = if span > 0.0 {
            (t - self.times[lo]) / span
        } else {
            1.0
        };
        let (Some(a), Some(b)) = (self.key(lo), self.key(hi)) else {
            return Vec::new();
        };
        match (self.kind, a, b) {
            (TrackKind::Quaternion, &[ax, ay, az, aw], &[bx, by, bz, bw]) => {
                let qa: Quat = [ax, ay, az, aw];
                let qb: Quat = [bx, by, bz, bw];
                slerp(qa, qb, u).to_vec()
            }
            _ => a.iter().zip(b).map(|(x, y)| x + (y - x) * u).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

#[derive(Deserialize)]
struct RawClip {
    #[serde(default)]
    name: String,
    #[serde(default)]
    duration: Option<f32>,
    #[serde(default)]
    tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32, tracks: Vec<KeyframeTrack>) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Check every track; see [`KeyframeTrack::validate`].
    pub fn validate(&self) -> Result<(), ClipError> {
        self.tracks.iter().try_for_each(KeyframeTrack::validate)
    }

    /// Parse and validate clip JSON. A missing or negative duration is taken
    /// from the latest keyframe time.
    pub fn from_json(s: &str) -> Result<Self, ClipError> {
        let raw: RawClip = serde_json::from_str(s)?;
        for track in &raw.tracks {
            track.validate()?;
        }
        let duration = match raw.duration {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            _ => raw
                .tracks
                .iter()
                .filter_map(|t| t.times.last().copied())
                .fold(0.0, f32::max),
        };
        Ok(Self {
            name: raw.name,
            duration,
            tracks: raw.tracks,
        })
    }

    pub fn to_json(&self) -> Result<String, ClipError> {
        serde_json::to_string(self).map_err(ClipError::from)
    }
}
