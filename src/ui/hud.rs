use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::game::{Engine, GameEvent};

const VALUE_FLASH_HOLD_DURATION: Duration = Duration::from_millis(400);
const VALUE_FLASH_FADE_DURATION: Duration = Duration::from_millis(800);
const SEPARATOR: &str = " │ ";

const VALUE_COLOR: Color = Color::White;
const MUTED_COLOR: Color = Color::DarkGray;
const ACCENT_COLOR: Color = Color::Yellow;

/// Last-change timestamps for HUD values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudValueFlash {
    pub score_changed_at: Option<Instant>,
    pub level_changed_at: Option<Instant>,
    pub speed_changed_at: Option<Instant>,
    pub high_score_changed_at: Option<Instant>,
}

impl HudValueFlash {
    /// Starts a flash for every value touched by `event`. Resets to zero
    /// (run start) do not flash.
    pub fn observe(&mut self, event: GameEvent, now: Instant) {
        match event {
            GameEvent::FoodEaten { .. } => self.score_changed_at = Some(now),
            GameEvent::LevelUp { .. } => self.level_changed_at = Some(now),
            GameEvent::SpeedUp { .. } => self.speed_changed_at = Some(now),
            GameEvent::NewHighScore(_) => self.high_score_changed_at = Some(now),
            GameEvent::ScoreChanged(_)
            | GameEvent::LevelChanged(_)
            | GameEvent::GameOver { .. } => {}
        }
    }
}

/// Supplemental values displayed by the HUD row.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub high_score: u32,
    /// Wall-clock instant of this frame render.
    pub now: Instant,
    pub value_flash: HudValueFlash,
}

/// Renders the one-line HUD below `area` and returns the remaining play area.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, engine: &Engine, info: &HudInfo) -> Rect {
    let [play_area, hud_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    let settings = format!("{} · {} ms", engine.difficulty(), engine.interval_ms());
    let settings_color = flash_color(
        MUTED_COLOR,
        ACCENT_COLOR,
        info.value_flash.speed_changed_at,
        info.now,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(settings, Style::default().fg(settings_color)))
            .alignment(Alignment::Left),
        hud_area,
    );

    frame.render_widget(
        Paragraph::new(score_line(
            engine.score,
            engine.level,
            info.high_score,
            usize::from(hud_area.width / 2),
            info.value_flash,
            info.now,
        ))
        .alignment(Alignment::Right)
        .style(Style::default().fg(MUTED_COLOR)),
        hud_area,
    );

    play_area
}

fn labels(compact: bool) -> [&'static str; 3] {
    if compact {
        ["S", "L", "B"]
    } else {
        ["Score", "Level", "Best"]
    }
}

fn score_line(
    score: u32,
    level: u32,
    high_score: u32,
    available_width: usize,
    value_flash: HudValueFlash,
    now: Instant,
) -> Line<'static> {
    let compact = score_line_width(score, level, high_score, false) > available_width;
    let [score_label, level_label, best_label] = labels(compact);

    let value = |changed_at| {
        Style::default().fg(flash_color(VALUE_COLOR, ACCENT_COLOR, changed_at, now))
    };

    Line::from(vec![
        Span::raw(format!("{score_label}: ")),
        Span::styled(score.to_string(), value(value_flash.score_changed_at)),
        Span::raw(SEPARATOR),
        Span::raw(format!("{level_label}: ")),
        Span::styled(level.to_string(), value(value_flash.level_changed_at)),
        Span::raw(SEPARATOR),
        Span::raw(format!("{best_label}: ")),
        Span::styled(
            high_score.to_string(),
            value(value_flash.high_score_changed_at),
        ),
    ])
}

fn score_line_width(score: u32, level: u32, high_score: u32, compact: bool) -> usize {
    let [score_label, level_label, best_label] = labels(compact);
    let text = format!(
        "{score_label}: {score}{SEPARATOR}{level_label}: {level}{SEPARATOR}{best_label}: {high_score}"
    );
    text.width()
}

fn flash_color(base: Color, accent: Color, changed_at: Option<Instant>, now: Instant) -> Color {
    let Some(changed_at) = changed_at else {
        return base;
    };
    let elapsed = now.saturating_duration_since(changed_at);
    if elapsed <= VALUE_FLASH_HOLD_DURATION {
        return accent;
    }
    if elapsed >= VALUE_FLASH_HOLD_DURATION + VALUE_FLASH_FADE_DURATION {
        return base;
    }

    let fade_elapsed = elapsed - VALUE_FLASH_HOLD_DURATION;
    let t = fade_elapsed.as_secs_f32() / VALUE_FLASH_FADE_DURATION.as_secs_f32();
    blend_color(accent, base, t)
}

fn blend_color(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    match (color_to_rgb(from), color_to_rgb(to)) {
        (Some((fr, fg, fb)), Some((tr, tg, tb))) => {
            Color::Rgb(lerp_u8(fr, tr, t), lerp_u8(fg, tg, t), lerp_u8(fb, tb, t))
        }
        _ if t < 1.0 => from,
        _ => to,
    }
}

fn lerp_u8(from: u8, to: u8, t: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round() as u8
}

fn color_to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    match color {
        Color::Black => Some((0, 0, 0)),
        Color::Yellow => Some((229, 229, 16)),
        Color::DarkGray => Some((102, 102, 102)),
        Color::White => Some((255, 255, 255)),
        Color::Rgb(r, g, b) => Some((r, g, b)),
        _ => None,
    }
}
