/// All game entity types — pure data, no logic.

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// What a transient bubble marker commemorates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BubbleKind {
    /// Ball rebounded off the floor or a wall.
    Bounce,
    /// Laser connected with a ball.
    Pop,
    /// A ball broke apart (with or without children).
    Split,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub is_moving: bool,
    pub width: f32,
    pub height: f32,
    /// Timestamp (ms) of the last laser shot, for the cooldown gate.
    pub last_shoot_time: u64,
    pub is_invisible: bool,
    /// Timestamp (ms) invisibility was last activated.
    pub invisibility_start: u64,
    pub remaining_invisibility_uses: u32,
    /// Facing for the renderer: +1.0 after moving left, -1.0 after right.
    pub direction: f32,
}

// ── Projectiles & hazards ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    /// Score awarded when this ball is split.
    pub points: u32,
}

/// The single player projectile. At most one in flight at a time;
/// `origin_x` stays fixed for the whole flight while `y` climbs.
#[derive(Clone, Debug)]
pub struct Laser {
    pub origin_x: f32,
    pub y: f32,
    pub is_active: bool,
}

#[derive(Clone, Debug)]
pub struct Meteor {
    pub x: f32,
    pub y: f32,
    pub is_active: bool,
    pub has_exploded: bool,
    /// Timestamp (ms) of the explosion; meaningful only once `has_exploded`.
    pub explosion_start: u64,
}

/// Short-lived visual marker. Spawned by simulation events (bounce, pop,
/// split) so it lives in the data model, but the simulation never reads
/// it back.
#[derive(Clone, Debug)]
pub struct BubbleEffect {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub kind: BubbleKind,
    pub start_time: u64,
    /// 1.0 at creation, fades linearly to 0.0 over the effect lifetime.
    pub alpha: f32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub balls: Vec<Ball>,
    pub meteors: Vec<Meteor>,
    /// Transient bubble markers, removed after their lifetime elapses.
    pub effects: Vec<BubbleEffect>,
    pub laser: Laser,
    pub score: u32,
    /// The highest score seen so far (synced to disk by the caller).
    pub high_score: u32,
    pub status: GameStatus,
    /// Timestamp (ms) of the last +10 score tick.
    pub last_score_increment: u64,
    /// Score at which the last random ball was spawned.
    pub last_ball_spawn_score: u32,
    /// Exact reward-interval multiple the invisibility ledger has paid out to.
    pub last_invisibility_reward_score: u32,
    /// Timestamp (ms) of the last meteor drop. Survives restart.
    pub last_meteor_drop: u64,
}

/// Boolean input intents, sampled once per frame before the simulation runs.
/// `move_*` and `shoot` are level-triggered (held keys); `activate_invisibility`
/// is edge-triggered and consumed by a single frame.
#[derive(Clone, Debug, Default)]
pub struct InputIntents {
    pub move_left: bool,
    pub move_right: bool,
    pub shoot: bool,
    pub activate_invisibility: bool,
}
