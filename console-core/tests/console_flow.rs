//! End-to-end console tests
//!
//! Drive the console through edit actions the way a host loop does and check
//! the resulting state and geometry.

use std::cell::RefCell;
use std::rc::Rc;

use console_core::{
    Console, ConsoleConfig, EditAction, FixedAtlas, GeometrySink, Signal, StyleTable, VertexBuffer,
    Viewport, MAX_INPUT_LENGTH,
};
use proptest::prelude::*;

fn type_text(console: &mut Console, text: &str) {
    for c in text.chars() {
        console.process(EditAction::Type(c));
    }
}

#[test]
fn test_capacity_limit() {
    let mut console = Console::default();
    type_text(&mut console, &"x".repeat(MAX_INPUT_LENGTH));
    assert_eq!(console.input().len(), MAX_INPUT_LENGTH);
    assert_eq!(console.cursor(), MAX_INPUT_LENGTH);

    // 512th character is refused
    console.process(EditAction::Type('y'));
    assert_eq!(console.input(), "x".repeat(MAX_INPUT_LENGTH));
    assert_eq!(console.cursor(), MAX_INPUT_LENGTH);
}

#[test]
fn test_kill_yank_round_trip() {
    let mut console = Console::default();
    type_text(&mut console, "hello world");
    console.set_cursor(5);

    console.process(EditAction::Kill);
    assert_eq!(console.input(), "hello");
    assert_eq!(console.kill_ring().line(), "hello world");

    console.process(EditAction::Yank);
    assert_eq!(console.input(), "hello world");
    assert_eq!(console.cursor(), 11);
}

#[test]
fn test_home_end_idempotent() {
    let mut console = Console::default();
    type_text(&mut console, "abc");
    for _ in 0..3 {
        console.process(EditAction::Home);
        assert_eq!(console.cursor(), 0);
    }
    for _ in 0..3 {
        console.process(EditAction::End);
        assert_eq!(console.cursor(), 3);
    }
}

#[test]
fn test_print_line_splitting() {
    let mut console = Console::default();
    console.print("a\nb\n");
    assert_eq!(
        console.scrollback().text().split('\n').collect::<Vec<_>>(),
        vec!["a", "b", ""]
    );
}

#[test]
fn test_signals_receive_live_input() {
    let mut console = Console::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    for signal in Signal::ALL {
        let log = Rc::clone(&log);
        console.connect(signal, move |_, input| {
            log.borrow_mut().push(format!("{}:{}", signal, input));
        });
    }

    type_text(&mut console, "ab");
    console.process(EditAction::Complete);
    console.process(EditAction::HistoryPrev);
    console.process(EditAction::Backspace);
    console.process(EditAction::HistoryNext);
    console.process(EditAction::Enter);

    assert_eq!(
        *log.borrow(),
        vec!["complete:ab", "history-prev:ab", "history-next:a", "activate:a"]
    );
}

#[test]
fn test_handler_breaking_cursor_is_repaired() {
    let mut console = Console::default();
    console.connect(Signal::Complete, |console, _| {
        console.set_input("").ok();
    });
    type_text(&mut console, "abc");
    console.process(EditAction::Complete);
    assert_eq!(console.cursor(), 0);
}

#[test]
fn test_frame_geometry_upload() {
    let mut console = Console::with_config(
        StyleTable::dark(Default::default()),
        ConsoleConfig {
            prompt: "> ".to_string(),
            ..Default::default()
        },
    );
    let mut atlas = FixedAtlas::new(10.0, 20.0);
    let mut sink = VertexBuffer::new();
    console.print("Glyph console\n \n");
    type_text(&mut console, "help");

    let frame = console.render(&mut atlas, &mut sink, Viewport::new(800.0, 600.0));

    // "Glyph console" + " " + "> " + "help" + caret
    assert_eq!(frame.quads, 13 + 1 + 2 + 4 + 1);
    assert_eq!(sink.indices().len(), frame.quads * 6);
    assert_eq!(sink.vertex_bytes().len(), frame.quads * 4 * 9 * 4);
    assert_eq!(*sink.indices().last().unwrap(), (frame.quads * 4 - 1) as u32);

    // Third row: 600 - 20 - 2 * 20
    assert_eq!(frame.caret.y, 540.0);
    assert_eq!(frame.caret.x, 60.0);

    let bounds = frame.bounds.unwrap();
    assert_eq!(bounds.x, 0.0);
    assert_eq!(bounds.width, 130.0);

    sink.clear();
    assert!(sink.is_empty());
}

fn arb_action() -> impl Strategy<Value = EditAction> {
    prop_oneof![
        4 => prop::char::range(' ', '~').prop_map(EditAction::Type),
        1 => any::<char>().prop_map(EditAction::Type),
        1 => Just(EditAction::Enter),
        1 => Just(EditAction::Left),
        1 => Just(EditAction::Right),
        1 => Just(EditAction::Backspace),
        1 => Just(EditAction::Delete),
        1 => Just(EditAction::Kill),
        1 => Just(EditAction::Yank),
        1 => Just(EditAction::Home),
        1 => Just(EditAction::End),
        1 => Just(EditAction::Clear),
        1 => Just(EditAction::HistoryPrev),
        1 => Just(EditAction::HistoryNext),
        1 => Just(EditAction::Complete),
    ]
}

proptest! {
    /// Cursor and length stay within bounds after any action sequence
    #[test]
    fn prop_cursor_within_line(
        capacity in 1..24usize,
        actions in prop::collection::vec(arb_action(), 0..200)
    ) {
        let config = ConsoleConfig {
            max_input_length: capacity,
            ..Default::default()
        };
        let mut console = Console::with_config(StyleTable::default(), config);
        for action in actions {
            console.process(action);
            prop_assert!(console.cursor() <= console.input().len());
            prop_assert!(console.input().len() <= capacity);
            prop_assert!(console.input().is_ascii());
        }
    }

    /// Moving the cursor right never moves the caret left
    #[test]
    fn prop_caret_monotonic(input in "[ -~]{0,40}") {
        let mut console = Console::default();
        let mut atlas = FixedAtlas::default().with_kerning('A', 'V', -2.0);
        let mut sink = VertexBuffer::new();
        type_text(&mut console, &input);

        let mut previous = f32::MIN;
        for cursor in 0..=input.len() {
            console.set_cursor(cursor);
            let frame = console.render(&mut atlas, &mut sink, Viewport::new(640.0, 480.0));
            prop_assert!(frame.caret.x >= previous);
            previous = frame.caret.x;
        }
    }
}
