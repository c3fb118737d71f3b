//! Phoneme-driven lip sync.
//!
//! Symbols map to a three-weight [`MouthShape`]. The mapper plays a timeline
//! against the engine clock, easing the mouth toward whichever event covers
//! the current time and releasing it a short grace period after the last one.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::Smoothing;
use crate::skeleton::ExpressionSink;

pub const JAW_OPEN: &str = "jawOpen";
pub const MOUTH_PUCKER: &str = "mouthPucker";
pub const MOUTH_SMILE: &str = "mouthSmile";

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouthShape {
    pub jaw_open: f32,
    pub mouth_pucker: f32,
    pub mouth_smile: f32,
}

impl MouthShape {
    pub const CLOSED: MouthShape = MouthShape::new(0.0, 0.0, 0.0);
    /// Shape for symbols missing from the table.
    pub const FALLBACK: MouthShape = MouthShape::new(0.2, 0.0, 0.0);

    pub const fn new(jaw_open: f32, mouth_pucker: f32, mouth_smile: f32) -> Self {
        Self {
            jaw_open,
            mouth_pucker,
            mouth_smile,
        }
    }

    fn approach(&mut self, target: MouthShape, k: f32) {
        self.jaw_open += (target.jaw_open - self.jaw_open) * k;
        self.mouth_pucker += (target.mouth_pucker - self.mouth_pucker) * k;
        self.mouth_smile += (target.mouth_smile - self.mouth_smile) * k;
    }

    fn write(&self, sink: &mut dyn ExpressionSink) {
        sink.set_expression(JAW_OPEN, self.jaw_open);
        sink.set_expression(MOUTH_PUCKER, self.mouth_pucker);
        sink.set_expression(MOUTH_SMILE, self.mouth_smile);
    }
}

/// Mouth shape for an ARPAbet symbol. Case-insensitive; stress digits
/// (`AH0`, `IY1`) are ignored.
pub fn phoneme_to_blendshapes(symbol: &str) -> MouthShape {
    let upper = symbol
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .to_ascii_uppercase();
    let m = MouthShape::new;
    match upper.as_str() {
        "SIL" | "SP" | "" => MouthShape::CLOSED,
        "M" | "B" | "P" => m(0.0, 0.5, 0.0),
        "F" | "V" => m(0.1, 0.3, 0.0),
        "TH" | "DH" => m(0.2, 0.0, 0.0),
        "T" | "D" => m(0.3, 0.0, 0.0),
        "K" | "G" | "NG" => m(0.4, 0.0, 0.0),
        "CH" | "JH" | "SH" | "ZH" => m(0.3, 0.3, 0.0),
        "S" | "Z" => m(0.15, 0.2, 0.0),
        "N" | "L" => m(0.25, 0.0, 0.0),
        "R" | "ER" => m(0.3, 0.2, 0.0),
        "W" => m(0.2, 0.7, 0.0),
        "Y" => m(0.3, 0.0, 0.3),
        "HH" => m(0.3, 0.0, 0.0),
        "AA" | "A" | "AH" => m(0.8, 0.0, 0.0),
        "AE" | "AY" => m(0.7, 0.0, 0.2),
        "AW" => m(0.7, 0.3, 0.0),
        "AO" | "OY" => m(0.6, 0.5, 0.0),
        "OW" | "O" => m(0.6, 0.6, 0.0),
        "EH" | "EY" | "E" => m(0.5, 0.0, 0.3),
        "IH" | "IY" | "I" => m(0.3, 0.0, 0.5),
        "UH" => m(0.3, 0.6, 0.0),
        "UW" | "U" => m(0.3, 0.8, 0.0),
        _ => MouthShape::FALLBACK,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhonemeEvent {
    #[serde(alias = "phoneme")]
    pub symbol: String,
    pub start: f32,
    pub end: f32,
}

impl PhonemeEvent {
    pub fn new(symbol: impl Into<String>, start: f32, end: f32) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, t: f32) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Keyframe form of a timeline event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MouthKeyframe {
    pub start: f32,
    pub end: f32,
    pub shape: MouthShape,
}

/// Events ordered by start time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhonemeTimeline {
    events: Vec<PhonemeEvent>,
}

impl PhonemeTimeline {
    pub fn new(mut events: Vec<PhonemeEvent>) -> Self {
        events.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { events }
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(s)?))
    }

    /// First event whose `[start, end]` covers `t`.
    pub fn active_at(&self, t: f32) -> Option<&PhonemeEvent> {
        self.events
            .iter()
            .take_while(|e| e.start <= t)
            .find(|e| e.contains(t))
    }

    /// Latest event end.
    pub fn end_time(&self) -> f32 {
        self.events.iter().map(|e| e.end).fold(0.0, f32::max)
    }

    pub fn events(&self) -> &[PhonemeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_keyframes(&self) -> Vec<MouthKeyframe> {
        self.events
            .iter()
            .map(|e| MouthKeyframe {
                start: e.start,
                end: e.end,
                shape: phoneme_to_blendshapes(&e.symbol),
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct PhonemeMapper {
    timeline: Option<PhonemeTimeline>,
    start_time: f64,
    current: MouthShape,
    smoothing: Smoothing,
    grace: f32,
}

impl Default for PhonemeMapper {
    fn default() -> Self {
        Self::new(Smoothing::default(), 0.5)
    }
}

impl PhonemeMapper {
    pub fn new(smoothing: Smoothing, grace_secs: f32) -> Self {
        Self {
            timeline: None,
            start_time: 0.0,
            current: MouthShape::CLOSED,
            smoothing,
            grace: grace_secs.max(0.0),
        }
    }

    /// Start playing `timeline`; event times are relative to `start_time` on
    /// the caller's clock.
    pub fn load(&mut self, timeline: PhonemeTimeline, start_time: f64) {
        debug!("phonemes: loaded {} events at t={start_time:.3}", timeline.len());
        self.timeline = if timeline.is_empty() { None } else { Some(timeline) };
        self.start_time = start_time;
    }

    /// Advance to clock time `now` and write the mouth weights.
    pub fn update(&mut self, now: f64, dt: f32, sink: &mut dyn ExpressionSink) {
        let Some(timeline) = self.timeline.as_ref() else {
            return;
        };
        let elapsed = (now - self.start_time) as f32;
        if elapsed > timeline.end_time() + self.grace {
            debug!("phonemes: timeline finished");
            self.stop(sink);
            return;
        }
        let target = timeline
            .active_at(elapsed)
            .map_or(MouthShape::CLOSED, |e| phoneme_to_blendshapes(&e.symbol));
        self.current.approach(target, self.smoothing.factor(dt));
        self.current.write(sink);
    }

    /// Drop the timeline and close the mouth.
    pub fn stop(&mut self, sink: &mut dyn ExpressionSink) {
        let was_playing = self.timeline.take().is_some();
        self.current = MouthShape::CLOSED;
        if was_playing {
            self.current.write(sink);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.timeline.is_some()
    }

    pub fn current(&self) -> MouthShape {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::PoseBuffer;

    #[test]
    fn bilabials_close_the_jaw() {
        assert_eq!(phoneme_to_blendshapes("M"), MouthShape::new(0.0, 0.5, 0.0));
        assert_eq!(phoneme_to_blendshapes("b"), phoneme_to_blendshapes("M"));
        assert_eq!(phoneme_to_blendshapes("XQ"), MouthShape::FALLBACK);
        assert_eq!(phoneme_to_blendshapes("AH1"), phoneme_to_blendshapes("AA"));
    }

    #[test]
    fn active_event_lookup_and_gaps() {
        let tl = PhonemeTimeline::new(vec![
            PhonemeEvent::new("S", 0.3, 0.4),
            PhonemeEvent::new("AA", 0.0, 0.2),
        ]);
        assert_eq!(tl.events()[0].symbol, "AA");
        assert_eq!(tl.active_at(0.1).map(|e| e.symbol.as_str()), Some("AA"));
        assert_eq!(tl.active_at(0.25), None);
        assert_eq!(tl.active_at(0.35).map(|e| e.symbol.as_str()), Some("S"));
        assert_eq!(tl.end_time(), 0.4);
    }

    #[test]
    fn per_update_smoothing_moves_thirty_percent() {
        let mut pose = PoseBuffer::humanoid();
        let mut mapper = PhonemeMapper::default();
        mapper.load(PhonemeTimeline::new(vec![PhonemeEvent::new("AA", 0.0, 1.0)]), 10.0);
        mapper.update(10.1, 0.016, &mut pose);
        assert!((mapper.current().jaw_open - 0.24).abs() < 1e-6);
        mapper.update(10.2, 0.5, &mut pose);
        assert!((mapper.current().jaw_open - 0.408).abs() < 1e-5);
    }

    #[test]
    fn releases_after_grace_window() {
        let mut pose = PoseBuffer::humanoid();
        let mut mapper = PhonemeMapper::default();
        mapper.load(PhonemeTimeline::new(vec![PhonemeEvent::new("O", 0.0, 0.2)]), 0.0);
        mapper.update(0.1, 0.016, &mut pose);
        mapper.update(0.6, 0.016, &mut pose);
        assert!(mapper.is_playing());
        mapper.update(0.71, 0.016, &mut pose);
        assert!(!mapper.is_playing());
        assert_eq!(pose.expressions().get(JAW_OPEN), Some(&0.0));
        assert_eq!(pose.expressions().get(MOUTH_PUCKER), Some(&0.0));
    }

    #[test]
    fn keyframes_carry_shapes() {
        let tl = PhonemeTimeline::from_json(
            r#"[{ "phoneme": "M", "start": 0.0, "end": 0.1 }, { "symbol": "UW", "start": 0.1, "end": 0.3 }]"#,
        )
        .unwrap();
        let keys = tl.to_keyframes();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].shape, MouthShape::new(0.3, 0.8, 0.0));
    }
}
