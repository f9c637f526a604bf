//! Fight simulation throughput: fights per second at different lengths and loadouts.
//!
//! Run with: `cargo bench --bench simulator`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dps_sim::combat::{simulate_fight_with_seed, Archetype, FightConfig, Weapon};

fn warrior(duration_sec: f64) -> FightConfig {
    let mut config = FightConfig::new(Weapon::new(10, 28));
    config.attacker.double_attack_skill = 252;
    config.duration_sec = duration_sec;
    config
}

fn dual_wielding_rogue() -> FightConfig {
    let mut config = FightConfig::new(Weapon {
        proc_spell: Some("Poison".to_string()),
        proc_spell_damage: Some(85),
        ..Weapon::new(13, 22)
    });
    config.off_hand = Some(Weapon::new(10, 20));
    config.attacker.archetype = Archetype::Rogue;
    config.attacker.double_attack_skill = 240;
    config.attacker.dual_wield_skill = 245;
    config.scenario.special_attacks = true;
    config.scenario.from_behind = true;
    config
}

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");
    group.sample_size(100);
    group.throughput(Throughput::Elements(1));

    for (name, config) in [
        ("warrior_60s", warrior(60.0)),
        ("warrior_600s", warrior(600.0)),
        ("rogue_dual_wield_600s", dual_wielding_rogue()),
    ] {
        let mut seed = 0u64;
        group.bench_function(name, |b| {
            b.iter(|| {
                seed = seed.wrapping_add(1);
                black_box(simulate_fight_with_seed(&config, seed))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_simulator);
criterion_main!(benches);
