use std::io::{BufRead, Cursor, Stderr, StdinLock, Stdout, Write};

/// Abstracts stdin/stdout/stderr for dependency injection and testability.
pub trait ConsoleIO<IN: BufRead, OUT: Write, ERR: Write> {
    fn stdin(&mut self) -> &mut IN;
    fn stdout(&mut self) -> &mut OUT;
    fn stderr(&mut self) -> &mut ERR;
}

/// Real implementation bound to the process stdin/stdout/stderr.
pub struct StdIO {
    stdin: StdinLock<'static>,
    stdout: Stdout,
    stderr: Stderr,
}

impl StdIO {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: std::io::stdin().lock(),
            stdout: std::io::stdout(),
            stderr: std::io::stderr(),
        }
    }
}

impl Default for StdIO {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleIO<StdinLock<'static>, Stdout, Stderr> for StdIO {
    fn stdin(&mut self) -> &mut StdinLock<'static> {
        &mut self.stdin
    }

    fn stdout(&mut self) -> &mut Stdout {
        &mut self.stdout
    }

    fn stderr(&mut self) -> &mut Stderr {
        &mut self.stderr
    }
}

/// Test implementation that replays scripted input and captures output.
#[derive(Default)]
pub struct BufferedIO {
    stdin: Cursor<Vec<u8>>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl BufferedIO {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffered console whose stdin yields `input`.
    #[must_use]
    pub fn with_input(input: &str) -> Self {
        Self {
            stdin: Cursor::new(input.as_bytes().to_vec()),
            ..Self::default()
        }
    }

    /// Returns the captured stdout content as a string.
    pub fn stdout_to_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Returns the captured stderr content as a string.
    pub fn stderr_to_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl ConsoleIO<Cursor<Vec<u8>>, Vec<u8>, Vec<u8>> for BufferedIO {
    fn stdin(&mut self) -> &mut Cursor<Vec<u8>> {
        &mut self.stdin
    }

    fn stdout(&mut self) -> &mut Vec<u8> {
        &mut self.stdout
    }

    fn stderr(&mut self) -> &mut Vec<u8> {
        &mut self.stderr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_io_captures_stdout() {
        let mut io = BufferedIO::new();
        writeln!(io.stdout(), "hello").unwrap();
        assert_eq!(io.stdout_to_string(), "hello\n");
    }

    #[test]
    fn buffered_io_captures_stderr() {
        let mut io = BufferedIO::new();
        writeln!(io.stderr(), "error").unwrap();
        assert_eq!(io.stderr_to_string(), "error\n");
    }

    #[test]
    fn buffered_io_replays_input_lines() {
        let mut io = BufferedIO::with_input("first\nsecond\n");
        let mut line = String::new();
        io.stdin().read_line(&mut line).unwrap();
        assert_eq!(line, "first\n");
        line.clear();
        io.stdin().read_line(&mut line).unwrap();
        assert_eq!(line, "second\n");
        line.clear();
        assert_eq!(io.stdin().read_line(&mut line).unwrap(), 0);
    }

    #[test]
    fn buffered_io_starts_empty() {
        let io = BufferedIO::new();
        assert!(io.stdout_to_string().is_empty());
        assert!(io.stderr_to_string().is_empty());
    }
}
