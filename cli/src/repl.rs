use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line reader over stdin with a prompt
pub struct Repl {
    lines: Lines<BufReader<Stdin>>,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prompt and read one line. Returns `None` at end of input.
    pub async fn readline(&mut self) -> Result<Option<String>, String> {
        write!(std::io::stdout(), "> ").map_err(|e| e.to_string())?;
        std::io::stdout().flush().map_err(|e| e.to_string())?;
        self.lines.next_line().await.map_err(|e| e.to_string())
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}
