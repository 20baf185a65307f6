use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;

use super::{execute, parse_command, tokenize};
use crate::pages::App;

/// Interactive interpreter. Command errors are printed and the loop continues.
pub fn run_repl(rt: &Runtime, app: &mut App) -> Result<()> {
    let mut rl = DefaultEditor::new().context("Failed to initialise line editor")?;
    println!("storefront-admin interpreter. Type 'help' for commands.");
    loop {
        let line = match rl.readline("> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let line = line.trim();
        if line.is_empty() { continue; }
        let _ = rl.add_history_entry(line);
        let cmd = match tokenize(line).and_then(|toks| parse_command(&toks)) {
            Ok(c) => c,
            Err(e) => { eprintln!("error: {}", e.notice_text()); continue; }
        };
        match rt.block_on(execute(app, cmd)) {
            Ok(Some(text)) => println!("{}", text),
            Ok(None) => break,
            Err(e) => eprintln!("error: {}", e.notice_text()),
        }
    }
    Ok(())
}
