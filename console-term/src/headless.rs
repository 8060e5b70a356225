//! Headless mode
//!
//! Feeds lines from a reader through the console session, lays out one
//! frame with a fixed-cell atlas and writes the resulting snapshot as JSON.

use std::error::Error;
use std::io::{BufRead, Write};

use console_core::{Console, FixedAtlas, FontSet, Viewport, VertexBuffer};

use crate::config::Config;
use crate::session::Session;

pub fn run<R: BufRead, W: Write>(config: &Config, reader: R, mut writer: W) -> Result<(), Box<dyn Error>> {
    let mut console = Console::with_config(config.theme.styles(FontSet::default()), config.console_config());
    console.print(&config.banner);
    let session = Session::attach(&mut console, config.history_size);

    for line in reader.lines() {
        let line = line?;
        log::debug!("Headless input: {:?}", line);
        session.submit(&mut console, &line);
    }

    let mut atlas = FixedAtlas::default();
    let mut sink = VertexBuffer::new();
    let viewport = Viewport::new(config.window.width as f32, config.window.height as f32);
    let frame = console.render(&mut atlas, &mut sink, viewport);
    log::debug!("Headless frame: {} quads", frame.quads);

    writeln!(writer, "{}", console.snapshot().to_json()?)?;
    Ok(())
}
