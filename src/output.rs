use crate::error::UpsqlError;
use std::io::Write;

/// Print rendered result text to stdout. Flushed so pages appear as they
/// arrive rather than when the last one does.
pub fn print_result(text: &str) -> Result<(), UpsqlError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Print a one-line status message to stdout.
pub fn print_message(message: &str) {
    println!("{}", message);
}

/// Print error to stderr in the contract format: error: <category>: <message>
pub fn print_error(err: &UpsqlError) {
    eprintln!("error: {}", err);
}
