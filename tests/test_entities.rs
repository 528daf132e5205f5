use ufo_strike::entities::*;

#[test]
fn entity_clone_and_eq() {
    // Enums derive PartialEq — equality comparisons must work
    assert_eq!(GameStatus::Playing, GameStatus::Playing);
    assert_ne!(GameStatus::Playing, GameStatus::GameOver);
    assert_eq!(BubbleKind::Bounce, BubbleKind::Bounce);
    assert_ne!(BubbleKind::Pop, BubbleKind::Split);

    // Clone must produce an equal value
    let kind = BubbleKind::Split;
    assert_eq!(kind.clone(), BubbleKind::Split);
}

#[test]
fn intents_default_to_all_clear() {
    let intents = InputIntents::default();
    assert!(!intents.move_left);
    assert!(!intents.move_right);
    assert!(!intents.shoot);
    assert!(!intents.activate_invisibility);
}

#[test]
fn game_state_clone_is_independent() {
    let original = GameState {
        player: Player {
            x: 400.0,
            y: 550.0,
            is_moving: false,
            width: 80.0,
            height: 130.0,
            last_shoot_time: 0,
            is_invisible: false,
            invisibility_start: 0,
            remaining_invisibility_uses: 3,
            direction: 1.0,
        },
        balls: Vec::new(),
        meteors: Vec::new(),
        effects: Vec::new(),
        laser: Laser {
            origin_x: 0.0,
            y: 0.0,
            is_active: false,
        },
        score: 0,
        high_score: 0,
        status: GameStatus::Playing,
        last_score_increment: 0,
        last_ball_spawn_score: 0,
        last_invisibility_reward_score: 0,
        last_meteor_drop: 0,
    };
    let mut cloned = original.clone();

    // Mutating the clone must not affect the original
    cloned.player.x = 99.0;
    cloned.score = 999;
    cloned.balls.push(Ball {
        x: 5.0,
        y: 5.0,
        vx: 0.0,
        vy: 0.0,
        radius: 20.0,
        points: 50,
    });

    assert_eq!(original.player.x, 400.0);
    assert_eq!(original.score, 0);
    assert!(original.balls.is_empty());
}
