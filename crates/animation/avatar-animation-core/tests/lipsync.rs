use avatar_animation_core::phoneme::{JAW_OPEN, MOUTH_PUCKER};
use avatar_animation_core::{
    phoneme_to_blendshapes, MouthShape, PhonemeEvent, PhonemeMapper, PhonemeTimeline, PoseBuffer,
    Smoothing,
};
use avatar_test_fixtures::phonemes;

#[test]
fn bilabial_and_fallback_shapes() {
    let m = phoneme_to_blendshapes("M");
    assert_eq!(m.jaw_open, 0.0);
    assert_eq!(m.mouth_pucker, 0.5);
    assert_eq!(phoneme_to_blendshapes("zz"), MouthShape::new(0.2, 0.0, 0.0));
}

#[test]
fn fixture_timeline_drives_the_mouth() {
    let events: Vec<PhonemeEvent> = phonemes::load("hello").expect("hello timeline");
    let timeline = PhonemeTimeline::new(events);
    assert_eq!(timeline.len(), 7);
    assert_eq!(timeline.active_at(0.5).map(|e| e.symbol.as_str()), Some("sil"));
    assert!(timeline.active_at(0.72).is_none());

    let keys = timeline.to_keyframes();
    assert_eq!(keys[5].shape, phoneme_to_blendshapes("M"));
    assert_eq!(keys[6].shape, MouthShape::FALLBACK);

    let mut rig = PoseBuffer::humanoid();
    let mut mapper = PhonemeMapper::new(Smoothing::PerUpdate { factor: 1.0 }, 0.5);
    mapper.load(timeline, 0.0);
    mapper.update(0.3, 0.016, &mut rig);
    assert_eq!(rig.expressions().get(JAW_OPEN), Some(&0.6));
    assert_eq!(rig.expressions().get(MOUTH_PUCKER), Some(&0.6));

    mapper.update(0.65, 0.016, &mut rig);
    assert_eq!(rig.expressions().get(JAW_OPEN), Some(&0.0));
    assert_eq!(rig.expressions().get(MOUTH_PUCKER), Some(&0.5));

    mapper.update(1.31, 0.016, &mut rig);
    assert!(!mapper.is_playing());
}

#[test]
fn exponential_smoothing_depends_on_dt() {
    let timeline = || PhonemeTimeline::new(vec![PhonemeEvent::new("AA", 0.0, 1.0)]);
    let mut rig = PoseBuffer::humanoid();
    let mut mapper = PhonemeMapper::new(Smoothing::Exponential { rate: 10.0 }, 0.5);

    mapper.load(timeline(), 0.0);
    mapper.update(0.1, 0.01, &mut rig);
    let small_step = mapper.current().jaw_open;

    mapper.stop(&mut rig);
    mapper.load(timeline(), 0.0);
    mapper.update(0.1, 0.1, &mut rig);
    let large_step = mapper.current().jaw_open;

    assert!(small_step > 0.0);
    assert!(large_step > small_step);
}
