use super::interpreter::{Interpreter, Outcome};
use failure::{format_err, ResultExt};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

fn show(outcome: &Outcome) {
    if let Some(text) = outcome.render() {
        println!("{}", text);
    }
}

/// Feeds every line of `path` to the interpreter. Failed lines are reported
/// and skipped; an `exit`/`quit` line stops the run.
pub fn run_file(interp: &mut Interpreter, path: &Path) -> Result<(), failure::Error> {
    let contents = fs::read_to_string(path)
        .with_context(|_| format!("could not read {}", path.display()))?;
    info!(path = %path.display(), "running file");

    for (i, line) in contents.lines().enumerate() {
        match interp.submit(line) {
            Ok(Outcome::Exit) => break,
            Ok(outcome) => show(&outcome),
            Err(e) => println!("Error (line {}): {}", i + 1, e),
        }
    }
    Ok(())
}

pub fn main_loop(interp: &mut Interpreter) -> Result<(), failure::Error> {
    let mut rl = DefaultEditor::new().map_err(|e| format_err!("could not open terminal: {}", e))?;

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = rl.add_history_entry(line.as_str()) {
                        debug!(error = %e, "could not add history entry");
                    }
                }
                match interp.submit(&line) {
                    Ok(Outcome::Exit) => break,
                    Ok(outcome) => show(&outcome),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(format_err!("failed to read line: {}", e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_file_continues_after_errors() {
        let path = std::env::temp_dir().join(format!("dcalc-run-file-{}.txt", std::process::id()));
        {
            let mut f = fs::File::create(&path).unwrap();
            writeln!(f, "x = 2\ny + 1\nf(t) = t * x\nz = f(4)\nquit\nw = 1").unwrap();
        }

        let mut interp = Interpreter::new();
        run_file(&mut interp, &path).unwrap();
        fs::remove_file(&path).unwrap();

        let env = interp.environment();
        assert_eq!(env.variable("x"), Some(2.0));
        assert_eq!(env.variable("z"), Some(8.0));
        assert_eq!(env.variable("w"), None);
    }

    #[test]
    fn test_run_file_missing() {
        let mut interp = Interpreter::new();
        let err = run_file(&mut interp, Path::new("/nonexistent/dcalc/input.txt")).unwrap_err();
        assert!(err.to_string().starts_with("could not read"));
    }
}
