use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;

use crate::config::GridSize;
use crate::game::{Engine, RunState};
use crate::snake::Position;
use crate::ui::hud::{HudInfo, render_hud};
use crate::ui::menu::{render_game_over_menu, render_pause_menu, render_start_menu};

/// Terminal columns used per grid cell, keeping cells roughly square.
pub const CELL_WIDTH: u16 = 2;

const GLYPH_SNAKE_HEAD: &str = "██";
const GLYPH_SNAKE_BODY: &str = "▓▓";
const GLYPH_FOOD: &str = "●";

const SNAKE_HEAD_COLOR: Color = Color::LightGreen;
const SNAKE_BODY_COLOR: Color = Color::Green;
const FOOD_COLOR: Color = Color::Red;
const BORDER_COLOR: Color = Color::DarkGray;

/// Values the frame needs beyond the engine itself.
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub hud: HudInfo,
    /// Best score before the current run ended; compared against the final
    /// score on the game-over screen.
    pub previous_high_score: u32,
}

/// Renders the full game frame from immutable state.
pub fn render(frame: &mut Frame<'_>, engine: &Engine, info: &FrameInfo) {
    let board = board_area(frame.area(), engine.bounds());
    let play_area = render_hud(frame, board, engine, &info.hud);

    let block = Block::bordered().border_style(Style::new().fg(BORDER_COLOR));
    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_food(frame, inner, engine);
    render_snake(frame, inner, engine);

    match engine.state() {
        RunState::Idle => {
            render_start_menu(frame, play_area, info.hud.high_score, engine.difficulty());
        }
        RunState::Paused => render_pause_menu(frame, play_area),
        RunState::GameOver => render_game_over_menu(
            frame,
            play_area,
            engine.score,
            info.previous_high_score,
            engine.death_reason(),
        ),
        RunState::Running => {}
    }
}

/// Centers the bordered board plus its HUD row inside `area`, clipped to fit.
fn board_area(area: Rect, bounds: GridSize) -> Rect {
    let width = bounds.width.saturating_mul(CELL_WIDTH).saturating_add(2);
    // Border rows plus the HUD row.
    let height = bounds.height.saturating_add(3);

    let [column] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [board] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(column);
    board
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, engine: &Engine) {
    let Some((x, y)) = logical_to_terminal(inner, engine.bounds(), engine.food.position) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, GLYPH_FOOD, Style::new().fg(FOOD_COLOR));
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, engine: &Engine) {
    let buffer = frame.buffer_mut();
    for (index, segment) in engine.snake.segments().enumerate() {
        let Some((x, y)) = logical_to_terminal(inner, engine.bounds(), *segment) else {
            continue;
        };

        if index == 0 {
            buffer.set_string(
                x,
                y,
                GLYPH_SNAKE_HEAD,
                Style::new()
                    .fg(SNAKE_HEAD_COLOR)
                    .add_modifier(Modifier::BOLD),
            );
        } else {
            buffer.set_string(
                x,
                y,
                GLYPH_SNAKE_BODY,
                Style::new().fg(SNAKE_BODY_COLOR),
            );
        }
    }
}

/// Maps a grid cell to the terminal coordinate of its left column, or
/// `None` when the cell falls outside the visible area.
fn logical_to_terminal(inner: Rect, bounds: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?.checked_mul(CELL_WIDTH)?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x.saturating_add(CELL_WIDTH) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
