//! Console composition root
//!
//! Owns the scrollback, the input editor, the signal handlers and the style
//! table. The host feeds it edit actions and asks it to render once per
//! frame.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::atlas::GlyphAtlas;
use crate::editor::{Edit, EditAction, InputEditor, KillRing};
use crate::error::Result;
use crate::geometry::{GeometrySink, Primitive};
use crate::layout::{extend, BoundingBox, Pen, TextLayout};
use crate::line_buffer::MAX_INPUT_LENGTH;
use crate::scrollback::Scrollback;
use crate::signal::{Signal, SignalDispatcher};
use crate::snapshot::ConsoleSnapshot;
use crate::style::{StyleKind, StyleTable};

/// Signal handler; receives the console and a copy of the input line
pub type Handler = Box<dyn FnMut(&mut Console, &str)>;

/// Console settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Text drawn in front of the input line
    pub prompt: String,
    /// Capacity of the input line
    pub max_input_length: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".to_string(),
            max_input_length: MAX_INPUT_LENGTH,
        }
    }
}

/// Drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Caret position from the last frame: pen x at the cursor and the input
/// baseline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Caret {
    pub x: f32,
    pub y: f32,
}

/// Summary of one render pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub caret: Caret,
    /// Quads pushed, caret included
    pub quads: usize,
    /// Extent of all text glyphs, `None` if nothing was drawn
    pub bounds: Option<BoundingBox>,
}

/// Single-line text console
pub struct Console {
    config: ConsoleConfig,
    scrollback: Scrollback,
    editor: InputEditor,
    handlers: SignalDispatcher<Handler>,
    styles: StyleTable,
    caret: Caret,
}

impl Console {
    pub fn new(styles: StyleTable) -> Self {
        Self::with_config(styles, ConsoleConfig::default())
    }

    pub fn with_config(styles: StyleTable, config: ConsoleConfig) -> Self {
        Self {
            editor: InputEditor::with_capacity(config.max_input_length),
            config,
            scrollback: Scrollback::new(),
            handlers: SignalDispatcher::new(),
            styles,
            caret: Caret::default(),
        }
    }

    /// Append text to the scrollback
    pub fn print(&mut self, text: &str) {
        self.scrollback.print(text);
    }

    /// Apply one edit action, dispatching signals as needed.
    ///
    /// Rejected edits are logged and leave the input untouched.
    pub fn process(&mut self, action: EditAction) {
        match self.editor.apply(action) {
            Edit::Rejected(err) => log::warn!("{}", err),
            Edit::Activate => self.activate(),
            Edit::Signal(signal) => self.invoke(signal),
            Edit::ClearScrollback => self.scrollback.clear(),
            Edit::Edited | Edit::Moved | Edit::Ignored => {}
        }
    }

    fn activate(&mut self) {
        self.invoke(Signal::Activate);

        let line = format!("{}{}\n", self.config.prompt, self.editor.input());
        self.print(&line);
        self.editor.take_input();
    }

    /// Install a handler, replacing any previous one for `signal`
    pub fn connect<F>(&mut self, signal: Signal, handler: F)
    where
        F: FnMut(&mut Console, &str) + 'static,
    {
        self.handlers.connect(signal, Box::new(handler));
    }

    /// Install a handler by signal name. Unknown names are ignored; returns
    /// whether the name was recognized.
    pub fn connect_named<F>(&mut self, name: &str, handler: F) -> bool
    where
        F: FnMut(&mut Console, &str) + 'static,
    {
        match Signal::from_name(name) {
            Some(signal) => {
                self.connect(signal, handler);
                true
            }
            None => {
                log::debug!("Ignoring handler for unknown signal {:?}", name);
                false
            }
        }
    }

    pub fn disconnect(&mut self, signal: Signal) {
        self.handlers.disconnect(signal);
    }

    pub fn is_connected(&self, signal: Signal) -> bool {
        self.handlers.is_connected(signal)
    }

    fn invoke(&mut self, signal: Signal) {
        let Some(mut handler) = self.handlers.take(signal) else {
            log::trace!("No handler for {}", signal);
            return;
        };

        let input = self.editor.input().to_owned();
        handler(self, &input);
        self.handlers.restore(signal, handler);
        self.editor.clamp_cursor();
    }

    /// Lay out the scrollback, prompt, input and caret into `sink` and draw
    pub fn render<A, S>(&mut self, atlas: &mut A, sink: &mut S, viewport: Viewport) -> FrameInfo
    where
        A: GlyphAtlas + ?Sized,
        S: GeometrySink + ?Sized,
    {
        sink.clear();

        let faint = &self.styles[StyleKind::Faint];
        let bold = &self.styles[StyleKind::Bold];
        let normal = &self.styles[StyleKind::Normal];

        let faint_metrics = atlas.metrics(faint.font);
        let mut layout = TextLayout::new(Pen::new(0.0, viewport.height - faint_metrics.height));
        let mut bounds = None;

        for line in self.scrollback.lines() {
            let before = layout.quad_count();
            let run = layout.add_text(atlas, sink, faint, line.text());
            if layout.quad_count() > before {
                extend(&mut bounds, run);
            }
            layout.pen.y -= faint_metrics.line_height();
            layout.pen.x = 0.0;
        }

        let before = layout.quad_count();
        let run = layout.add_text(atlas, sink, bold, &self.config.prompt);
        if layout.quad_count() > before {
            extend(&mut bounds, run);
        }

        let cursor = self.editor.cursor();
        let baseline = layout.pen.y;
        let mut caret_x = layout.pen.x;
        let before = layout.quad_count();
        let run = layout.add_run(atlas, sink, normal, self.editor.input(), |index, pen| {
            if index < cursor {
                caret_x = pen.x;
            }
        });
        if layout.quad_count() > before {
            extend(&mut bounds, run);
        }

        let metrics = atlas.metrics(normal.font);
        let bottom = baseline + metrics.descender;
        let top = bottom + metrics.line_height();
        let tex = atlas.caret_cell(normal.font);
        layout.add_rect(sink, caret_x + 1.0, top, caret_x + 2.0, bottom, tex, normal.foreground);

        sink.render(Primitive::Triangles);

        self.caret = Caret {
            x: caret_x,
            y: baseline,
        };
        FrameInfo {
            caret: self.caret,
            quads: layout.quad_count(),
            bounds,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.config.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.config.prompt = prompt.into();
    }

    pub fn input(&self) -> &str {
        self.editor.input()
    }

    /// Replace the input line and move the cursor to its end
    pub fn set_input(&mut self, text: &str) -> Result<()> {
        self.editor.set_input(text)
    }

    pub fn cursor(&self) -> usize {
        self.editor.cursor()
    }

    /// Move the cursor, clamped to the input line
    pub fn set_cursor(&mut self, pos: usize) {
        self.editor.set_cursor(pos);
    }

    pub fn kill_ring(&self) -> &KillRing {
        self.editor.kill_ring()
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn clear_scrollback(&mut self) {
        self.scrollback.clear();
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleTable {
        &mut self.styles
    }

    /// Caret computed by the last [`render`](Self::render)
    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Serializable copy of the console state
    pub fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot::from_console(self)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(StyleTable::default())
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("prompt", &self.config.prompt)
            .field("input", &self.editor.input())
            .field("cursor", &self.editor.cursor())
            .field("lines", &self.scrollback.len())
            .field("handlers", &self.handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::atlas::FixedAtlas;
    use crate::geometry::VertexBuffer;

    fn type_text(console: &mut Console, text: &str) {
        for c in text.chars() {
            console.process(EditAction::Type(c));
        }
    }

    fn lines(console: &Console) -> Vec<&str> {
        console
            .scrollback()
            .lines()
            .iter()
            .map(|line| line.as_str())
            .collect()
    }

    #[test]
    fn test_activation_flow() {
        let mut console = Console::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&calls);
        console.connect(Signal::Activate, move |_, input| {
            seen.borrow_mut().push(input.to_string());
        });

        type_text(&mut console, "test");
        console.process(EditAction::Enter);

        assert_eq!(*calls.borrow(), vec!["test".to_string()]);
        assert_eq!(lines(&console), vec![">>> test\n"]);
        assert_eq!(console.input(), "");
        assert_eq!(console.cursor(), 0);
    }

    #[test]
    fn test_enter_without_handler() {
        let mut console = Console::default();
        console.set_prompt("$ ");
        type_text(&mut console, "ls");
        console.process(EditAction::Enter);
        console.process(EditAction::Enter);
        assert_eq!(lines(&console), vec!["$ ls\n", "$ \n"]);
    }

    #[test]
    fn test_handler_may_print() {
        let mut console = Console::default();
        console.connect(Signal::Activate, |console, input| {
            console.print(&format!("ran {}\n", input));
        });
        type_text(&mut console, "x");
        console.process(EditAction::Enter);
        assert_eq!(lines(&console), vec!["ran x\n", ">>> x\n"]);
    }

    #[test]
    fn test_handler_rewrites_input() {
        let mut console = Console::default();
        console.connect(Signal::Complete, |console, input| {
            if "help".starts_with(input) {
                console.set_input("help").unwrap();
            }
        });
        type_text(&mut console, "he");
        console.process(EditAction::Complete);
        assert_eq!(console.input(), "help");
        assert_eq!(console.cursor(), 4);
    }

    #[test]
    fn test_handler_reconnects_itself() {
        let mut console = Console::default();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let outer = Rc::clone(&hits);
        console.connect(Signal::HistoryPrev, move |console, _| {
            outer.borrow_mut().push("first");
            let inner = Rc::clone(&outer);
            console.connect(Signal::HistoryPrev, move |_, _| inner.borrow_mut().push("second"));
        });

        console.process(EditAction::HistoryPrev);
        console.process(EditAction::HistoryPrev);
        assert_eq!(*hits.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_connect_named() {
        let mut console = Console::default();
        assert!(console.connect_named("history-next", |_, _| {}));
        assert!(console.is_connected(Signal::HistoryNext));
        assert!(!console.connect_named("escape", |_, _| {}));

        console.disconnect(Signal::HistoryNext);
        assert!(!console.is_connected(Signal::HistoryNext));
    }

    #[test]
    fn test_full_line_rejects_typing() {
        let config = ConsoleConfig {
            max_input_length: 3,
            ..Default::default()
        };
        let mut console = Console::with_config(StyleTable::default(), config);
        type_text(&mut console, "abcd");
        assert_eq!(console.input(), "abc");
        assert_eq!(console.cursor(), 3);
    }

    #[test]
    fn test_clear_action_empties_scrollback() {
        let mut console = Console::default();
        console.print("banner\n");
        type_text(&mut console, "keep");
        console.process(EditAction::Left);
        console.process(EditAction::Clear);
        assert!(console.scrollback().is_empty());
        assert_eq!(console.input(), "keep");
        assert_eq!(console.cursor(), 3);
    }

    #[test]
    fn test_render_layout() {
        let mut console = Console::default();
        let mut atlas = FixedAtlas::new(8.0, 16.0);
        let mut sink = VertexBuffer::new();
        console.print("hi\n");
        type_text(&mut console, "ab");
        console.process(EditAction::Left);

        let frame = console.render(&mut atlas, &mut sink, Viewport::new(640.0, 480.0));

        // "hi" + ">>> " + "ab" + caret
        assert_eq!(frame.quads, 9);
        assert_eq!(sink.quad_count(), 9);
        assert_eq!(sink.draw_count(), 1);

        // First baseline one row below the top, input on the next row
        assert_eq!(sink.vertices()[0].y, 464.0 + 13.0);
        assert_eq!(frame.caret, Caret { x: 40.0, y: 448.0 });
        assert_eq!(console.caret(), frame.caret);

        let caret = sink.quads().last().unwrap();
        assert_eq!((caret[0].x, caret[0].y), (41.0, 461.0));
        assert_eq!((caret[2].x, caret[2].y), (42.0, 445.0));
    }

    #[test]
    fn test_render_styles() {
        let mut console = Console::default();
        let mut atlas = FixedAtlas::default();
        let mut sink = VertexBuffer::new();
        console.print("old\n");
        type_text(&mut console, "new");
        console.render(&mut atlas, &mut sink, Viewport::new(320.0, 240.0));

        let colors: Vec<_> = sink.quads().map(|quad| quad[0].color()).collect();
        let styles = console.styles();
        assert_eq!(colors[0], styles[StyleKind::Faint].foreground);
        assert_eq!(colors[3], styles[StyleKind::Bold].foreground);
        assert_eq!(colors[7], styles[StyleKind::Normal].foreground);
    }

    #[test]
    fn test_render_skips_missing_glyphs() {
        let mut console = Console::default();
        let mut atlas = FixedAtlas::default().without_glyph('x');
        let mut sink = VertexBuffer::new();
        console.set_prompt("");
        type_text(&mut console, "axb");

        let frame = console.render(&mut atlas, &mut sink, Viewport::new(100.0, 100.0));
        assert_eq!(frame.quads, 3);
        assert_eq!(frame.caret.x, 16.0);
    }

    #[test]
    fn test_render_empty_console() {
        let mut console = Console::default();
        console.set_prompt("");
        let mut atlas = FixedAtlas::default();
        let mut sink = VertexBuffer::new();

        let frame = console.render(&mut atlas, &mut sink, Viewport::new(100.0, 100.0));
        assert_eq!(frame.quads, 1);
        assert_eq!(frame.bounds, None);
        assert_eq!(frame.caret, Caret { x: 0.0, y: 84.0 });
    }

    #[test]
    fn test_render_clears_previous_frame() {
        let mut console = Console::default();
        let mut atlas = FixedAtlas::default();
        let mut sink = VertexBuffer::new();
        console.render(&mut atlas, &mut sink, Viewport::new(100.0, 100.0));
        let frame = console.render(&mut atlas, &mut sink, Viewport::new(100.0, 100.0));
        assert_eq!(sink.quad_count(), frame.quads);
        assert_eq!(sink.draw_count(), 2);
    }
}
