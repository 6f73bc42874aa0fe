use crate::state::Tick;

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Time cost of a turn for actors without their own speed, and the retry
    /// delay applied to non-player actors whose action failed or who idled.
    pub standard_action_cost: Tick,

    /// Damage dealt by the reference [`crate::FixedDamage`] policy.
    pub attack_damage: i32,

    /// Upper bound on dispatch iterations per [`crate::GameEngine::process_turns`] call.
    /// Reaching it is logged as an anomaly.
    pub max_loop_iterations: usize,

    /// Operations between schedule rebuilds for a mid-sized world.
    /// The effective threshold is halved for large worlds and doubled for small ones.
    pub cleanup_base_threshold: u32,

    /// Delay before a freshly spawned monster takes its first turn.
    pub monster_spawn_delay: Tick,
}

impl GameConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ACTION_COST: Tick = Tick(100);
    pub const DEFAULT_ATTACK_DAMAGE: i32 = 1;
    pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 100;
    pub const DEFAULT_CLEANUP_THRESHOLD: u32 = 100;

    pub fn new() -> Self {
        Self {
            standard_action_cost: Self::DEFAULT_ACTION_COST,
            attack_damage: Self::DEFAULT_ATTACK_DAMAGE,
            max_loop_iterations: Self::DEFAULT_MAX_LOOP_ITERATIONS,
            cleanup_base_threshold: Self::DEFAULT_CLEANUP_THRESHOLD,
            monster_spawn_delay: Self::DEFAULT_ACTION_COST,
        }
    }

    pub fn with_attack_damage(mut self, attack_damage: i32) -> Self {
        self.attack_damage = attack_damage;
        self
    }

    pub fn with_max_loop_iterations(mut self, max_loop_iterations: usize) -> Self {
        self.max_loop_iterations = max_loop_iterations.max(1);
        self
    }

    pub fn with_cleanup_base_threshold(mut self, threshold: u32) -> Self {
        self.cleanup_base_threshold = threshold;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
