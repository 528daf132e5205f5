/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.  World coordinates (800×600, y-down) are
/// scaled to the terminal cell grid here and nowhere else.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use ufo_strike::compute::{
    BALL_SPAWN_SCORE_INTERVAL, GROUND_HEIGHT, INVISIBILITY_DURATION_MS,
    INVISIBILITY_REWARD_INTERVAL, METEOR_EXPLOSION_RADIUS, METEOR_LINGER_MS, WORLD_HEIGHT,
    WORLD_WIDTH,
};
use ufo_strike::entities::{
    Ball, BubbleEffect, BubbleKind, GameState, GameStatus, Laser, Meteor, Player,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_CHARGES: Color = Color::Cyan;
const C_HUD_PROGRESS: Color = Color::DarkGrey;
const C_INVIS_ACTIVE: Color = Color::Cyan;
const C_GROUND: Color = Color::DarkGreen;
const C_PLAYER: Color = Color::White;
const C_PLAYER_INVIS: Color = Color::DarkGrey;
const C_BALL: Color = Color::Green;
const C_METEOR: Color = Color::DarkYellow;
const C_EXPLOSION: Color = Color::Red;
const C_LASER: Color = Color::Green;
const C_EFFECT: Color = Color::Cyan;
const C_EFFECT_FADED: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;

// ── World → cell mapping ──────────────────────────────────────────────────────

/// Play area inside the border rows/columns, with the scale factors for
/// world-to-cell projection.
struct Viewport {
    left: u16,
    top: u16,
    right: u16,
    bottom: u16,
}

impl Viewport {
    fn of(width: u16, height: u16) -> Self {
        Self {
            left: 1,
            top: 2,
            right: width.saturating_sub(2).max(2),
            bottom: height.saturating_sub(3).max(3),
        }
    }

    fn col(&self, wx: f32) -> u16 {
        let span = (self.right - self.left) as f32;
        let c = self.left as f32 + (wx / WORLD_WIDTH) * span;
        (c.round() as i64).clamp(self.left as i64, self.right as i64) as u16
    }

    fn row(&self, wy: f32) -> u16 {
        let span = (self.bottom - self.top) as f32;
        let r = self.top as f32 + (wy / WORLD_HEIGHT) * span;
        (r.round() as i64).clamp(self.top as i64, self.bottom as i64) as u16
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.  `now` is the same sampled clock handed to the
/// simulation; it only drives cosmetic countdowns here.
pub fn render<W: Write>(out: &mut W, state: &GameState, now: u64) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let vp = Viewport::of(width, height);

    draw_border(out, width, height)?;
    draw_hud(out, state, now, width)?;
    draw_ground(out, &vp, width)?;

    for effect in &state.effects {
        draw_effect(out, &vp, effect)?;
    }
    for ball in &state.balls {
        draw_ball(out, &vp, ball)?;
    }
    for meteor in &state.meteors {
        draw_meteor(out, &vp, meteor, now)?;
    }

    draw_laser(out, &vp, &state.laser, &state.player)?;
    draw_player(out, &vp, &state.player)?;
    draw_controls_hint(out, height)?;

    if state.status == GameStatus::GameOver {
        draw_game_over(out, state, width, height)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    now: u64,
    width: u16,
) -> std::io::Result<()> {
    // Score and high score — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if state.high_score > 0 {
        out.queue(Print(format!(
            "Score:{:>6}  Hi:{:>6}",
            state.score, state.high_score
        )))?;
    } else {
        out.queue(Print(format!("Score:{:>6}", state.score)))?;
    }

    // Points until the next ball spawn / invisibility reward — centre
    let to_ball = (state.score / BALL_SPAWN_SCORE_INTERVAL + 1) * BALL_SPAWN_SCORE_INTERVAL
        - state.score;
    let to_power = (state.score / INVISIBILITY_REWARD_INTERVAL + 1) * INVISIBILITY_REWARD_INTERVAL
        - state.score;
    let progress = format!("ball in {:>3}   power in {:>3}", to_ball, to_power);
    let px = (width / 2).saturating_sub(progress.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(px, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_PROGRESS))?;
    out.queue(Print(&progress))?;

    // Invisibility countdown tag + remaining charges — right side
    let invis_tag = if state.player.is_invisible {
        let left_ms =
            INVISIBILITY_DURATION_MS.saturating_sub(now - state.player.invisibility_start);
        format!("[◈ INVIS {:>2}s] ", left_ms / 1000 + 1)
    } else {
        String::new()
    };
    let charges = format!("◈:{}", state.player.remaining_invisibility_uses);
    let right_str = format!("{}{}", invis_tag, charges);

    let rx = width.saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    if !invis_tag.is_empty() {
        out.queue(style::SetForegroundColor(C_INVIS_ACTIVE))?;
        out.queue(Print(&invis_tag))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_CHARGES))?;
    out.queue(Print(&charges))?;

    Ok(())
}

// ── Scene ─────────────────────────────────────────────────────────────────────

fn draw_ground<W: Write>(out: &mut W, vp: &Viewport, width: u16) -> std::io::Result<()> {
    let row = vp.row(WORLD_HEIGHT - GROUND_HEIGHT);
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(style::SetForegroundColor(C_GROUND))?;
    out.queue(Print("▓".repeat(width.saturating_sub(2) as usize)))?;
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, vp: &Viewport, player: &Player) -> std::io::Result<()> {
    let col = vp.col(player.x);
    let row = vp.row(player.y);

    // Saucer with a facing marker; dimmed while invisible.
    let sprite = if player.direction < 0.0 { "▪◙►" } else { "◄◙▪" };
    let color = if player.is_invisible {
        C_PLAYER_INVIS
    } else {
        C_PLAYER
    };
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(vp.left), row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(sprite))?;
    Ok(())
}

fn draw_ball<W: Write>(out: &mut W, vp: &Viewport, ball: &Ball) -> std::io::Result<()> {
    let col = vp.col(ball.x);
    let row = vp.row(ball.y);
    out.queue(style::SetForegroundColor(C_BALL))?;
    // Three size classes; the large one spans three cells
    if ball.radius >= 40.0 {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(vp.left), row))?;
        out.queue(Print("(◯)"))?;
    } else if ball.radius >= 20.0 {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("O"))?;
    } else {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("o"))?;
    }
    Ok(())
}

fn draw_meteor<W: Write>(
    out: &mut W,
    vp: &Viewport,
    meteor: &Meteor,
    now: u64,
) -> std::io::Result<()> {
    if !meteor.is_active {
        return Ok(());
    }
    let col = vp.col(meteor.x);
    let row = vp.row(meteor.y);

    if !meteor.has_exploded {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_METEOR))?;
        out.queue(Print("▼"))?;
        return Ok(());
    }

    // Expanding blast ring, derived from the linger progress at draw time
    let progress =
        (now.saturating_sub(meteor.explosion_start) as f32 / METEOR_LINGER_MS as f32).min(1.0);
    let blast = METEOR_EXPLOSION_RADIUS * progress;
    out.queue(style::SetForegroundColor(C_EXPLOSION))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("✹"))?;
    for (dx, dy) in [(blast, 0.0), (-blast, 0.0), (0.0, blast), (0.0, -blast)] {
        let bx = meteor.x + dx;
        let by = meteor.y + dy;
        if bx >= 0.0 && bx <= WORLD_WIDTH && by >= 0.0 && by <= WORLD_HEIGHT {
            out.queue(cursor::MoveTo(vp.col(bx), vp.row(by)))?;
            out.queue(Print("✶"))?;
        }
    }
    Ok(())
}

fn draw_laser<W: Write>(
    out: &mut W,
    vp: &Viewport,
    laser: &Laser,
    player: &Player,
) -> std::io::Result<()> {
    if !laser.is_active {
        return Ok(());
    }
    let col = vp.col(laser.origin_x);
    let top = vp.row(laser.y);
    let bottom = vp.row(player.y);
    out.queue(style::SetForegroundColor(C_LASER))?;
    for row in top..bottom {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_effect<W: Write>(out: &mut W, vp: &Viewport, effect: &BubbleEffect) -> std::io::Result<()> {
    let glyph = match effect.kind {
        BubbleKind::Bounce => "◌",
        BubbleKind::Pop => "✺",
        BubbleKind::Split => "✧",
    };
    let color = if effect.alpha > 0.5 {
        C_EFFECT
    } else {
        C_EFFECT_FADED
    };
    out.queue(cursor::MoveTo(vp.col(effect.x), vp.row(effect.y)))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "← → / A D : Move   SPACE : Shoot   I : Invisibility   R : Restart   Q : Quit",
    ))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", state.score);
    let is_new_best = state.score >= state.high_score && state.score > 0;
    let best_line = if is_new_best {
        format!("★ NEW BEST: {:>6} ★", state.high_score)
    } else {
        format!("Best Score:  {:>6}", state.high_score)
    };

    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];
    let best_color = if is_new_best {
        Color::Yellow
    } else {
        Color::DarkGrey
    };

    let cx = width / 2;
    let total_rows = lines.len() + 3; // 3 box lines + score + best + hint
    let start_row = (height / 2).saturating_sub(total_rows as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    let score_row = start_row + lines.len() as u16;
    let col = cx.saturating_sub(score_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, score_row))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(&score_line))?;

    let best_row = score_row + 1;
    let col = cx.saturating_sub(best_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, best_row))?;
    out.queue(style::SetForegroundColor(best_color))?;
    out.queue(Print(&best_line))?;

    let hint = "R - Play Again  Q - Quit";
    let hint_row = best_row + 1;
    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, hint_row))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(hint))?;

    Ok(())
}
