use avatar_animation_core::{
    AnimationEngine, EngineConfig, PhonemeEvent, PoseBuffer, Scheduler, ViewState,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn engine() -> AnimationEngine<PoseBuffer> {
    let config = EngineConfig {
        seed: Some(1),
        ..EngineConfig::default()
    };
    AnimationEngine::new(PoseBuffer::humanoid(), config).with_view(ViewState::default())
}

fn bench_ambient_frame(c: &mut Criterion) {
    let mut e = engine();
    c.bench_function("engine_step_ambient", |b| {
        b.iter(|| e.update(black_box(1.0 / 60.0)))
    });
}

fn bench_busy_frame(c: &mut Criterion) {
    let mut e = engine();
    e.set_emotion("excited", 1.0).ok();
    e.play_action("dance").ok();
    e.set_view_mode("cinematic").ok();
    let events: Vec<PhonemeEvent> = (0..600)
        .map(|i| {
            let t = i as f32 * 0.1;
            PhonemeEvent::new(["AA", "M", "S", "OW"][i % 4], t, t + 0.1)
        })
        .collect();
    e.apply_phoneme_timeline(events, None);
    c.bench_function("engine_step_busy", |b| {
        b.iter(|| e.update(black_box(1.0 / 60.0)))
    });
}

fn bench_empty_scheduler(c: &mut Criterion) {
    let mut rig = PoseBuffer::humanoid();
    let mut sched = Scheduler::new();
    c.bench_function("scheduler_reset_to_rest", |b| {
        b.iter(|| sched.update(black_box(1.0 / 60.0), &mut rig))
    });
}

criterion_group!(benches, bench_ambient_frame, bench_busy_frame, bench_empty_scheduler);
criterion_main!(benches);
