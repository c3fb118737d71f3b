use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use avatar_animation_core::{
    ActionKind, ActionParams, Admission, AnimationLayer, PoseBuffer, ProceduralAnimation, Rig,
    Scheduler,
};

fn counting_end(anim: ProceduralAnimation) -> (ProceduralAnimation, Arc<AtomicUsize>) {
    let ends = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ends);
    let anim = anim.on_end(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (anim, ends)
}

fn still(_: &mut dyn Rig, _: f32, _: f32) {}

#[test]
fn wave_finishes_after_two_seconds_and_ends_once() {
    let mut rig = PoseBuffer::humanoid();
    let mut sched = Scheduler::new();
    let wave = ActionKind::Wave.build(&ActionParams::default());
    assert_eq!(wave.priority(), 20);
    assert_eq!(wave.duration(), 2.0);
    let (wave, ends) = counting_end(wave);

    assert_eq!(sched.add_animation(wave, false, &mut rig), Admission::Started);
    for _ in 0..19 {
        sched.update(0.1, &mut rig);
    }
    assert!(sched.is_animation_active("wave_right"));

    for _ in 0..6 {
        sched.update(0.1, &mut rig);
    }
    assert!(sched.is_layer_empty(AnimationLayer::Gesture));
    assert_eq!(ends.load(Ordering::SeqCst), 1);
}

#[test]
fn nod_cannot_preempt_wave() {
    let mut rig = PoseBuffer::humanoid();
    let mut sched = Scheduler::new();
    let params = ActionParams::default();
    sched.add_animation(ActionKind::Wave.build(&params), false, &mut rig);
    let outcome = sched.add_animation(ActionKind::Nod.build(&params), false, &mut rig);
    assert_eq!(
        outcome,
        Admission::Rejected {
            occupant: "wave_right".into()
        }
    );
    assert!(sched.is_animation_active("wave_right"));
    assert!(!sched.is_animation_active("nod"));
}

#[test]
fn interrupting_a_jump_restores_root_height() {
    let mut rig = PoseBuffer::humanoid();
    let mut sched = Scheduler::new();
    let params = ActionParams::default();
    sched.add_animation(ActionKind::Jump.build(&params), false, &mut rig);
    for _ in 0..30 {
        sched.update(1.0 / 60.0, &mut rig);
    }
    assert!(rig.root_position()[1] > 0.0);

    sched.clear_all_except_base(&mut rig);
    assert_eq!(rig.root_position()[1], 0.0);
    assert!(sched.active_animation_names().is_empty());
}

#[test]
fn equal_priority_never_replaces() {
    let mut rig = PoseBuffer::humanoid();
    let mut sched = Scheduler::new();
    let first = ProceduralAnimation::from_fn("first", AnimationLayer::Override, 7, still);
    let second = ProceduralAnimation::from_fn("second", AnimationLayer::Override, 7, still);
    let third = ProceduralAnimation::from_fn("third", AnimationLayer::Override, 8, still);

    sched.add_animation(first, false, &mut rig);
    assert!(!sched.add_animation(second, false, &mut rig).is_admitted());
    assert_eq!(
        sched.add_animation(third, false, &mut rig),
        Admission::Replaced {
            evicted: "first".into()
        }
    );
}

#[test]
fn looping_animation_is_never_removed() {
    let mut rig = PoseBuffer::humanoid();
    let mut sched = Scheduler::new();
    let starts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&starts);
    let anim = ProceduralAnimation::from_fn("spin", AnimationLayer::Locomotion, 1, still)
        .with_duration(0.5)
        .looping(true)
        .on_start(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    let (anim, ends) = counting_end(anim);
    sched.add_animation(anim, false, &mut rig);

    for _ in 0..40 {
        sched.update(0.1, &mut rig);
        assert!(sched.is_animation_active("spin"));
    }
    assert!(starts.load(Ordering::SeqCst) >= 8);
    assert_eq!(ends.load(Ordering::SeqCst), 0);
    assert!(sched.elapsed_on(AnimationLayer::Locomotion).unwrap_or(1.0) < 0.5);
}

#[test]
fn layers_compose_in_fixed_order() {
    use avatar_animation_core::{HumanoidBone, Skeleton};

    fn base(rig: &mut dyn Rig, _: f32, _: f32) {
        if let Some(b) = rig.bone_mut(HumanoidBone::Head) {
            b.rotation[0] = 0.1;
        }
    }
    fn top(rig: &mut dyn Rig, _: f32, _: f32) {
        if let Some(b) = rig.bone_mut(HumanoidBone::Head) {
            b.rotation[0] = 0.4;
        }
    }

    let mut rig = PoseBuffer::humanoid();
    let mut sched = Scheduler::new();
    sched.add_animation(
        ProceduralAnimation::from_fn("top", AnimationLayer::Override, 1, top),
        false,
        &mut rig,
    );
    sched.add_animation(
        ProceduralAnimation::from_fn("base", AnimationLayer::Base, 1, base),
        false,
        &mut rig,
    );
    sched.update(0.016, &mut rig);
    assert_eq!(rig.rotation(HumanoidBone::Head).map(|r| r[0]), Some(0.4));

    sched.remove_animation(AnimationLayer::Override, &mut rig);
    sched.update(0.016, &mut rig);
    assert_eq!(rig.rotation(HumanoidBone::Head).map(|r| r[0]), Some(0.1));
    assert_eq!(sched.active_animation_names(), vec!["base".to_string()]);
}
