use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use schemette::engine::Engine;

fn main() {
    println!("Schemette interactive interpreter");
    println!("Enter one expression per line, e.g. (+ 1 2)");
    println!("Type quit or exit to leave.");
    println!();

    let mut editor = DefaultEditor::new().expect("could not initialize the line editor");
    let mut engine = Engine::new();
    engine.init();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                if line == "quit" || line == "exit" {
                    break;
                }

                match engine.interpret(line) {
                    Ok(result) => println!("{result}"),
                    // Display carries the Syntax/Name/Runtime error tag
                    Err(error) => println!("{error}"),
                }
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(error) => {
                eprintln!("Error: {error:?}");
                break;
            }
        }
    }
}
