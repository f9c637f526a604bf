pub mod archetype;
pub mod config;
pub mod engine;
pub mod formulas;
pub mod rng;
pub mod special;

pub use archetype::Archetype;
pub use config::{
    AttackerConfig, ConfigError, DefenderConfig, FightConfig, OffenseSource, ScenarioConfig,
    ValidationIssue, Weapon,
};
pub use engine::{
    resolve_special_strike, resolve_swing, simulate_fight, simulate_fight_with_seed,
    CombatContext, SwingOutcome, SwingSpec,
};
pub use rng::{FightStreams, RandomSource, Rng, ScriptedRng};
pub use special::{special_attack_for, SpecialAttack, SpecialKind};
