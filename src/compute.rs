/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (plus the sampled elapsed-ms clock and, where needed, an RNG
/// handle) and returns a brand-new `GameState`.  Side effects are limited to
/// the injected RNG; the clock is never read here, only received.

use rand::Rng;

use crate::entities::{
    Ball, BubbleEffect, BubbleKind, GameState, GameStatus, InputIntents, Laser, Meteor, Player,
};

// ── World & tuning constants ─────────────────────────────────────────────────
//
// Speeds and gravity are applied per tick invocation, not per elapsed
// millisecond: effective speed tracks the achieved frame rate, and the
// wall-clock only drives the score/cooldown/duration timers.

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;
/// Thickness of the ground strip; the floor line sits this far above the
/// bottom edge.
pub const GROUND_HEIGHT: f32 = 10.0;

pub const PLAYER_SPEED: f32 = 8.0;
pub const PLAYER_WIDTH: f32 = 80.0;
pub const PLAYER_HEIGHT: f32 = 130.0;

pub const LASER_SPEED: f32 = 15.0;
pub const SHOOT_COOLDOWN_MS: u64 = 400;

pub const GRAVITY: f32 = 0.5;
pub const BALL_BOUNCE_FACTOR: f32 = 1.0;
/// Balls at or below this radius vanish when split instead of producing
/// children.
pub const MIN_SPLIT_RADIUS: f32 = 20.0;
/// Extra horizontal velocity handed to each split child.
pub const SPLIT_KICK: f32 = 1.5;
pub const BALL_SPAWN_Y: f32 = 100.0;
pub const SEED_BALL_RADIUS: f32 = 30.0;

pub const MAX_INVISIBILITY_USES: u32 = 3;
pub const INVISIBILITY_DURATION_MS: u64 = 10_000;
pub const INVISIBILITY_REWARD_INTERVAL: u32 = 1_000;
pub const BALL_SPAWN_SCORE_INTERVAL: u32 = 500;

pub const METEOR_DROP_INTERVAL_MS: u64 = 10_000;
pub const METEOR_FALL_SPEED: f32 = 3.0;
pub const METEOR_EXPLOSION_RADIUS: f32 = 100.0;
/// Exploded meteors linger (and stay lethal) this long before removal.
pub const METEOR_LINGER_MS: u64 = 1_000;

pub const EFFECT_LIFETIME_MS: u64 = 500;

pub const SCORE_TICK_MS: u64 = 1_000;
pub const SCORE_TICK_POINTS: u32 = 10;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Bigger balls are worth less: 100 points per 10 units of radius, rounded.
pub fn ball_points(radius: f32) -> u32 {
    (100.0 / (radius / 10.0)).round() as u32
}

/// Build a ball at the given position.  Horizontal speed scales with radius
/// and gets a random ±direction and a random 0–30% boost; the initial
/// vertical drift is a gentle upward float.
pub fn make_ball(x: f32, y: f32, radius: f32, rng: &mut impl Rng) -> Ball {
    let speed = 1.0 + rng.gen::<f32>() * 0.3;
    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Ball {
        x,
        y,
        vx: direction * (2.0 + radius / 15.0) * speed,
        vy: -1.5,
        radius,
        points: ball_points(radius),
    }
}

fn make_random_ball(rng: &mut impl Rng) -> Ball {
    let x = rng.gen_range(100.0..WORLD_WIDTH - 100.0);
    let radius = rng.gen_range(20.0..=60.0);
    make_ball(x, BALL_SPAWN_Y, radius, rng)
}

fn bubble(x: f32, y: f32, radius: f32, kind: BubbleKind, now: u64) -> BubbleEffect {
    BubbleEffect {
        x,
        y,
        radius,
        kind,
        start_time: now,
        alpha: 1.0,
    }
}

fn initial_player() -> Player {
    Player {
        x: WORLD_WIDTH / 2.0,
        y: WORLD_HEIGHT - 50.0,
        is_moving: false,
        width: PLAYER_WIDTH,
        height: PLAYER_HEIGHT,
        last_shoot_time: 0,
        is_invisible: false,
        invisibility_start: 0,
        remaining_invisibility_uses: MAX_INVISIBILITY_USES,
        direction: 1.0,
    }
}

/// Build the initial game state: one seed ball, full invisibility charges,
/// all watermarks at `now` / zero.
pub fn init_state(high_score: u32, now: u64, rng: &mut impl Rng) -> GameState {
    GameState {
        player: initial_player(),
        balls: vec![make_ball(WORLD_WIDTH / 2.0, BALL_SPAWN_Y, SEED_BALL_RADIUS, rng)],
        meteors: Vec::new(),
        effects: Vec::new(),
        laser: Laser {
            origin_x: 0.0,
            y: 0.0,
            is_active: false,
        },
        score: 0,
        high_score,
        status: GameStatus::Playing,
        last_score_increment: now,
        last_ball_spawn_score: 0,
        last_invisibility_reward_score: 0,
        last_meteor_drop: now,
    }
}

/// Reset for a fresh run after game over.  The high score and the meteor-drop
/// timer carry over; everything else returns to its initial value.
pub fn restart(state: &GameState, now: u64, rng: &mut impl Rng) -> GameState {
    GameState {
        last_meteor_drop: state.last_meteor_drop,
        ..init_state(state.high_score, now, rng)
    }
}

// ── Input application (pure) ─────────────────────────────────────────────────

/// Apply one frame of sampled input intents.  Ignored wholesale after game
/// over; restart is a separate command handled by the caller.
pub fn apply_input(state: &GameState, input: &InputIntents, now: u64) -> GameState {
    if state.status == GameStatus::GameOver {
        return state.clone();
    }

    let mut player = state.player.clone();
    let mut laser = state.laser.clone();

    player.is_moving = false;
    if input.move_left {
        player.x -= PLAYER_SPEED;
        player.is_moving = true;
        player.direction = 1.0;
    }
    if input.move_right {
        player.x += PLAYER_SPEED;
        player.is_moving = true;
        player.direction = -1.0;
    }
    player.x = player
        .x
        .clamp(player.width / 2.0, WORLD_WIDTH - player.width / 2.0);

    // One laser in flight at a time, and a cooldown between shots.
    if input.shoot
        && !laser.is_active
        && now.saturating_sub(player.last_shoot_time) >= SHOOT_COOLDOWN_MS
    {
        laser = Laser {
            origin_x: player.x,
            y: player.y,
            is_active: true,
        };
        player.last_shoot_time = now;
    }

    if input.activate_invisibility
        && player.remaining_invisibility_uses > 0
        && !player.is_invisible
    {
        player.is_invisible = true;
        player.invisibility_start = now;
        player.remaining_invisibility_uses -= 1;
    }

    GameState {
        player,
        laser,
        ..state.clone()
    }
}

// ── Spawn policy helpers ─────────────────────────────────────────────────────

/// A new ball is due when a full spawn interval has been crossed since the
/// watermark, or when the field is empty and any score has accrued since the
/// last spawn.  At most one ball per check, no matter how many intervals
/// were crossed.
fn should_spawn_ball(balls: &[Ball], score: u32, last_spawn_score: u32) -> bool {
    score / BALL_SPAWN_SCORE_INTERVAL > last_spawn_score / BALL_SPAWN_SCORE_INTERVAL
        || (balls.is_empty() && score > last_spawn_score)
}

/// Child balls produced by a split: half the radius, double the points,
/// vertical velocity mirrored and a horizontal kick outward in both
/// directions.  Empty when the parent is already at minimum size.
pub fn split_children(parent: &Ball) -> Vec<Ball> {
    if parent.radius <= MIN_SPLIT_RADIUS {
        return Vec::new();
    }
    let radius = parent.radius / 2.0;
    let points = parent.points * 2;
    vec![
        Ball {
            radius,
            points,
            vx: parent.vx + SPLIT_KICK,
            vy: -parent.vy,
            ..parent.clone()
        },
        Ball {
            radius,
            points,
            vx: -parent.vx - SPLIT_KICK,
            vy: -parent.vy,
            ..parent.clone()
        },
    ]
}

// ── Per-frame tick (nearly pure — RNG is injected) ───────────────────────────

/// Advance the simulation by one frame.  `now` is the sampled elapsed-ms
/// clock; all randomness comes through `rng` so callers control determinism
/// (tests use a seeded RNG).
pub fn tick(state: &GameState, now: u64, rng: &mut impl Rng) -> GameState {
    // ── 1. Invisibility timeout — checked every frame, game over included ────
    let mut player = state.player.clone();
    if player.is_invisible
        && now.saturating_sub(player.invisibility_start) >= INVISIBILITY_DURATION_MS
    {
        player.is_invisible = false;
    }

    // ── 2. Fade and expire bubble effects — also runs after game over ────────
    let mut effects: Vec<BubbleEffect> = state
        .effects
        .iter()
        .filter_map(|e| {
            let elapsed = now.saturating_sub(e.start_time);
            if elapsed > EFFECT_LIFETIME_MS {
                None
            } else {
                Some(BubbleEffect {
                    alpha: 1.0 - elapsed as f32 / EFFECT_LIFETIME_MS as f32,
                    ..e.clone()
                })
            }
        })
        .collect();

    // Everything below is frozen once the run has ended.
    if state.status == GameStatus::GameOver {
        return GameState {
            player,
            effects,
            ..state.clone()
        };
    }

    let mut balls = state.balls.clone();
    let mut meteors = state.meteors.clone();
    let mut laser = state.laser.clone();
    let mut score = state.score;
    let mut high_score = state.high_score;
    let mut status = GameStatus::Playing;
    let mut last_score_increment = state.last_score_increment;
    let mut last_ball_spawn_score = state.last_ball_spawn_score;
    let mut last_invisibility_reward_score = state.last_invisibility_reward_score;
    let mut last_meteor_drop = state.last_meteor_drop;

    // ── 3. Score tick: one +10 per elapsed second, delayed but never batched ─
    if now.saturating_sub(last_score_increment) >= SCORE_TICK_MS {
        score += SCORE_TICK_POINTS;
        last_score_increment = now;

        if should_spawn_ball(&balls, score, last_ball_spawn_score) {
            balls.push(make_random_ball(rng));
            last_ball_spawn_score = score;
        }

        // One charge per full reward interval crossed.  The watermark lands
        // on the exact multiple reached so fractional progress carries over.
        let paid = last_invisibility_reward_score / INVISIBILITY_REWARD_INTERVAL;
        let earned = score / INVISIBILITY_REWARD_INTERVAL;
        if earned > paid {
            player.remaining_invisibility_uses += earned - paid;
            last_invisibility_reward_score = earned * INVISIBILITY_REWARD_INTERVAL;
        }
    }

    // ── 4. Meteor drop on its own wall-clock interval, independent of score ──
    if now.saturating_sub(last_meteor_drop) > METEOR_DROP_INTERVAL_MS {
        meteors.push(Meteor {
            x: rng.gen_range(50.0..WORLD_WIDTH - 50.0),
            y: 0.0,
            is_active: true,
            has_exploded: false,
            explosion_start: 0,
        });
        last_meteor_drop = now;
    }

    // ── 5. Meteors: fall, explode at the ground, kill inside the blast ───────
    for meteor in &mut meteors {
        if !meteor.has_exploded {
            meteor.y += METEOR_FALL_SPEED;
            if meteor.y >= WORLD_HEIGHT - GROUND_HEIGHT {
                meteor.has_exploded = true;
                meteor.explosion_start = now;
            }
        }
        // Lethal on every frame of the linger window, not just the transition.
        if meteor.has_exploded && !player.is_invisible {
            let dist = ((player.x - meteor.x).powi(2) + (player.y - meteor.y).powi(2)).sqrt();
            if dist < METEOR_EXPLOSION_RADIUS {
                status = GameStatus::GameOver;
                high_score = high_score.max(score);
            }
        }
    }
    meteors.retain(|m| {
        !(m.has_exploded && now.saturating_sub(m.explosion_start) > METEOR_LINGER_MS)
    });

    // ── 6. Ball physics, in collection order ─────────────────────────────────
    for i in 0..balls.len() {
        let was_moving_down = balls[i].vy > 0.0;
        balls[i].vy += GRAVITY;
        balls[i].x += balls[i].vx;
        balls[i].y += balls[i].vy;

        let radius = balls[i].radius;

        // Floor
        if balls[i].y + radius > WORLD_HEIGHT - GROUND_HEIGHT {
            balls[i].y = WORLD_HEIGHT - GROUND_HEIGHT - radius;
            balls[i].vy *= -BALL_BOUNCE_FACTOR;
            if was_moving_down {
                effects.push(bubble(
                    balls[i].x,
                    balls[i].y,
                    radius * 0.8,
                    BubbleKind::Bounce,
                    now,
                ));
            }
        }

        // Walls — the marker sits on the wall-side edge of the ball
        if balls[i].x - radius < 0.0 {
            balls[i].x = radius;
            balls[i].vx *= -1.0;
            effects.push(bubble(
                balls[i].x - radius,
                balls[i].y,
                radius * 0.5,
                BubbleKind::Bounce,
                now,
            ));
        }
        if balls[i].x + radius > WORLD_WIDTH {
            balls[i].x = WORLD_WIDTH - radius;
            balls[i].vx *= -1.0;
            effects.push(bubble(
                balls[i].x + radius,
                balls[i].y,
                radius * 0.5,
                BubbleKind::Bounce,
                now,
            ));
        }

        // Player contact ends the run; remaining balls keep their state
        // this frame.
        if !player.is_invisible {
            let dist = ((balls[i].x - player.x).powi(2) + (balls[i].y - player.y).powi(2)).sqrt();
            if dist < radius + player.width / 2.0 {
                status = GameStatus::GameOver;
                high_score = high_score.max(score);
                break;
            }
        }
    }

    // ── 7. Laser flight and first-hit split ──────────────────────────────────
    if laser.is_active {
        laser.y -= LASER_SPEED;
        if laser.y < 0.0 {
            laser.is_active = false;
        }

        // First ball (in collection order) inside the beam column and between
        // the beam tip and the player.  One hit per activation.
        let hit = if laser.is_active {
            balls.iter().position(|b| {
                (b.x - laser.origin_x).abs() <= b.radius && b.y >= laser.y && b.y <= player.y
            })
        } else {
            None
        };
        if let Some(idx) = hit {
            let parent = balls.remove(idx);
            score += parent.points;
            effects.push(bubble(parent.x, parent.y, parent.radius, BubbleKind::Pop, now));
            effects.push(bubble(parent.x, parent.y, parent.radius, BubbleKind::Split, now));
            balls.extend(split_children(&parent));
            laser.is_active = false;

            // Splitting can empty the field, which forces a fresh spawn.
            if should_spawn_ball(&balls, score, last_ball_spawn_score) {
                balls.push(make_random_ball(rng));
                last_ball_spawn_score = score;
            }
        }
    }

    GameState {
        player,
        balls,
        meteors,
        effects,
        laser,
        score,
        high_score,
        status,
        last_score_increment,
        last_ball_spawn_score,
        last_invisibility_reward_score,
        last_meteor_drop,
    }
}
