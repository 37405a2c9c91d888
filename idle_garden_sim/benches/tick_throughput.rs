// Tick throughput of a busy garden: all three automation kinds working a
// well-stocked field. Run with `cargo bench -p idle_garden_sim`.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use idle_garden_sim::command::SimAction;
use idle_garden_sim::config::GameConfig;
use idle_garden_sim::input::TickInput;
use idle_garden_sim::sim::SimState;
use idle_garden_sim::types::AutomationKind;

fn busy_garden() -> SimState {
    let config = GameConfig {
        starting_cash: 10_000,
        starting_seeds: 500,
        ..GameConfig::default()
    };
    let mut sim = SimState::with_config(0xC0FFEE, config);
    let buy: Vec<SimAction> = [AutomationKind::Planter, AutomationKind::Harvester, AutomationKind::Seller]
        .into_iter()
        .cycle()
        .take(12)
        .map(|kind| SimAction::BuyAutomation { kind })
        .collect();
    sim.tick(&TickInput::idle(), &buy);
    // Let the planters fill the field before measuring.
    sim.step(&[], 5_000);
    sim
}

fn bench_ticks(c: &mut Criterion) {
    let base = busy_garden();
    c.bench_function("busy_garden_1000_ticks", |b| {
        b.iter_batched(
            || base.clone(),
            |mut sim| {
                let target = sim.tick + 1_000;
                black_box(sim.step(&[], target));
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
