// SPDX-License-Identifier: MIT
//
// Whole-frame scenarios against the in-memory terminal.

use std::time::Duration;

use pretty_assertions::assert_eq;

use tc_term::backend::Op;
use tc_term::color::{self, Color};
use tc_term::{Cell, Engine, EngineConfig, Error, HeadlessTerminal, KeyCode, Size};

fn open(cols: u16, rows: u16) -> Engine<HeadlessTerminal> {
    let mut engine = Engine::new(HeadlessTerminal::new(cols, rows));
    engine.try_open(cols.into(), rows.into(), "scenario").unwrap();
    engine
}

fn at_sign_frame(engine: &mut Engine<HeadlessTerminal>) {
    engine.begin_frame();
    engine.clear_background(color::BLACK);
    engine.draw_text("@", 2, 2, color::WHITE, color::BLANK);
    engine.end_frame();
}

// ── Drawing ─────────────────────────────────────────────────────────────

#[test]
fn single_glyph_frame_reaches_the_screen() {
    let mut engine = open(6, 4);
    at_sign_frame(&mut engine);

    let term = engine.backend();
    for y in 0..4 {
        for x in 0..6 {
            let expected = if (x, y) == (2, 2) {
                Cell::new('@', color::WHITE, color::BLACK)
            } else {
                Cell::blank(color::BLACK)
            };
            assert_eq!(term.screen_cell(x, y), Some(expected), "cell ({x}, {y})");
        }
    }
    assert!(!term.cursor_visible());
    assert_eq!(term.title(), "scenario");
}

#[test]
fn identical_second_frame_writes_nothing() {
    let mut engine = open(6, 4);
    at_sign_frame(&mut engine);
    engine.backend_mut().take_ops();

    at_sign_frame(&mut engine);
    assert_eq!(engine.backend().chars_written(), 0);
    assert_eq!(engine.backend().ops(), &[Op::Flush]);
}

#[test]
fn output_is_proportional_to_change() {
    let mut engine = open(20, 10);
    let mut x = 0;
    engine.begin_frame();
    engine.clear_background(color::DARKBLUE);
    engine.end_frame();

    for _ in 0..5 {
        engine.backend_mut().take_ops();
        engine.begin_frame();
        engine.draw_text("@", x, 3, color::YELLOW, color::BLANK);
        let stats = engine.end_frame();
        assert!(stats.cells_rendered <= 2, "rendered {}", stats.cells_rendered);
        x += 1;
    }
    assert_eq!(engine.backend().screen_row(3), "    @               ");
}

#[test]
fn shapes_compose() {
    let mut engine = open(8, 5);
    engine.begin_frame();
    engine.clear_background(color::BLACK);
    engine.draw_rect_filled(1, 1, 3, 2, color::WHITE, color::RED);
    engine.draw_rect_outline(0, 0, 8, 5, color::GREEN, color::BLANK);
    engine.draw_text("hi", 5, 2, color::WHITE, color::BLANK);
    engine.end_frame();

    let term = engine.backend();
    assert_eq!(term.screen_row(0), "########");
    assert_eq!(term.screen_row(2), "#    hi#");
    assert_eq!(term.screen_row(4), "########");
    assert_eq!(term.screen_cell(2, 1), Some(Cell::new(' ', color::WHITE, color::RED)));
}

#[test]
fn off_screen_drawing_is_clipped() {
    let mut engine = open(4, 2);
    engine.begin_frame();
    engine.draw_text("abcdef", -2, 0, color::WHITE, color::BLANK);
    engine.draw_rect_filled(3, 1, 10, 10, color::RED, color::RED);
    engine.draw_pixel(100, 100, color::BLUE);
    engine.end_frame();

    assert_eq!(engine.backend().screen_row(0), "cdef");
    assert_eq!(engine.backend().screen_cell(3, 1), Some(Cell::blank(color::RED)));
}

#[test]
fn alpha_never_forces_a_redraw() {
    let mut engine = open(3, 1);
    engine.begin_frame();
    engine.draw_text("x", 0, 0, Color::rgba(200, 10, 10, 255), color::BLANK);
    engine.end_frame();
    engine.backend_mut().take_ops();

    engine.begin_frame();
    engine.draw_text("x", 0, 0, Color::rgba(200, 10, 10, 3), color::BLANK);
    let stats = engine.end_frame();
    assert_eq!(stats.cells_rendered, 0);
}

// ── Pacing ──────────────────────────────────────────────────────────────

#[test]
fn ten_fps_sleeps_a_tenth_of_a_second() {
    let mut engine = open(4, 2);
    engine.set_target_fps(10);
    engine.backend_mut().take_ops();
    at_sign_frame(&mut engine);
    assert_eq!(engine.backend().slept(), Duration::from_millis(100));
}

#[test]
fn pacing_accounts_for_frame_work() {
    let config = EngineConfig::default().with_target_fps(25);
    let mut engine = Engine::with_config(HeadlessTerminal::new(4, 2), config);
    engine.try_open(0, 0, "").unwrap();

    engine.begin_frame();
    engine.backend_mut().advance(Duration::from_millis(30));
    engine.end_frame();
    assert_eq!(engine.backend().slept(), Duration::from_millis(10));
}

#[test]
fn removing_the_limit_stops_sleeping() {
    let mut engine = open(4, 2);
    engine.set_target_fps(30);
    engine.set_target_fps(0);
    at_sign_frame(&mut engine);
    assert_eq!(engine.backend().slept(), Duration::ZERO);
}

// ── Input ───────────────────────────────────────────────────────────────

#[test]
fn keys_arrive_one_per_frame() {
    let mut engine = open(4, 2);
    engine.backend_mut().push_key(KeyCode::Left);
    engine.backend_mut().push_input(b"w");

    engine.begin_frame();
    assert_eq!(engine.get_key(), Some(KeyCode::Left));
    engine.end_frame();

    engine.begin_frame();
    assert!(engine.is_key(KeyCode::Char(b'w')));
    assert_eq!(engine.get_key().map(KeyCode::code), Some(119));
    engine.end_frame();

    engine.begin_frame();
    assert_eq!(engine.get_key(), None);
}

#[test]
fn only_first_key_of_a_read_counts() {
    let mut engine = open(4, 2);
    engine.backend_mut().push_input(b"ab");
    engine.begin_frame();
    assert_eq!(engine.get_key(), Some(KeyCode::Char(b'a')));
    engine.begin_frame();
    assert_eq!(engine.get_key(), None);
}

#[test]
fn unknown_escape_sequence_is_no_key() {
    let mut engine = open(4, 2);
    engine.backend_mut().push_input(b"\x1b[");
    engine.begin_frame();
    assert_eq!(engine.get_key(), None);
    assert!(!engine.should_quit());
}

#[test]
fn quit_loop_ends_on_q() {
    let mut engine = open(4, 2);
    engine.backend_mut().push_key(KeyCode::Char(b'x'));
    engine.backend_mut().push_key(KeyCode::Up);
    engine.backend_mut().push_key(KeyCode::Char(b'q'));

    let mut frames = 0;
    loop {
        engine.begin_frame();
        if engine.should_quit() {
            break;
        }
        engine.end_frame();
        frames += 1;
        assert!(frames < 10, "quit key never seen");
    }
    assert_eq!(frames, 2);
}

// ── Failure paths ───────────────────────────────────────────────────────

#[test]
fn resize_restores_terminal_and_reports() {
    let mut engine = open(10, 4);
    at_sign_frame(&mut engine);
    engine.backend_mut().set_size(Some(Size::new(12, 4)));

    let err = engine.try_begin_frame().unwrap_err();
    match err {
        Error::Resized { from, to } => {
            assert_eq!(from, Size::new(10, 4));
            assert_eq!(to, Size::new(12, 4));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!engine.is_open());
    assert!(!engine.backend().is_raw());
    assert!(engine.backend().cursor_visible());
    assert_eq!(engine.backend().screen_row(2), "          ");
}

#[test]
fn unavailable_size_fails_open() {
    let mut term = HeadlessTerminal::new(10, 4);
    term.set_size(None);
    let mut engine = Engine::new(term);
    let err = engine.try_open(80, 24, "x").unwrap_err();
    assert_eq!(err.to_string(), "could not determine terminal size");
    assert!(!engine.backend().is_raw());
}

#[test]
fn closed_engine_is_inert() {
    let mut engine = open(4, 2);
    engine.close();
    engine.backend_mut().take_ops();

    engine.begin_frame();
    engine.clear_background(color::RED);
    engine.draw_rect_outline(0, 0, 4, 2, color::WHITE, color::BLANK);
    let stats = engine.end_frame();

    assert_eq!(stats.total_cells(), 0);
    assert_eq!(engine.screen_width(), 0);
    assert_eq!(engine.screen_height(), 0);
    assert!(engine.backend().ops().is_empty());
}

#[test]
fn drop_restores_the_terminal() {
    let mut term = HeadlessTerminal::new(4, 2);
    {
        let mut engine = Engine::new(&mut term);
        engine.try_open(0, 0, "").unwrap();
        at_sign_frame_ref(&mut engine);
    }
    assert!(!term.is_raw());
    assert_eq!(term.ops().last(), Some(&Op::RestoreMode));
}

fn at_sign_frame_ref(engine: &mut Engine<&mut HeadlessTerminal>) {
    engine.begin_frame();
    engine.draw_text("@", 0, 0, color::WHITE, color::BLANK);
    engine.end_frame();
}
