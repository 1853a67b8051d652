//! Line-oriented console prompts
//!
//! Wraps any `BufRead`/`Write` pair so interactive flows run the same against
//! a terminal or a scripted buffer.

use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

use crate::error::{NotasError, NotasResult};
use crate::models::Folio;

/// Prompt/response channel
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<StdinLock<'static>, Stdout> {
    /// Prompt bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line
    pub fn say(&mut self, text: impl AsRef<str>) -> NotasResult<()> {
        writeln!(self.output, "{}", text.as_ref())?;
        Ok(())
    }

    /// Print `label` and read one line; `None` once input is exhausted.
    ///
    /// A line that is not valid UTF-8 is rejected and asked for again.
    pub fn read_line(&mut self, label: &str) -> NotasResult<Option<String>> {
        loop {
            write!(self.output, "{}", label)?;
            self.output.flush()?;

            let mut raw = Vec::new();
            if self.input.read_until(b'\n', &mut raw)? == 0 {
                return Ok(None);
            }
            match String::from_utf8(raw) {
                Ok(line) => return Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
                Err(_) => self.say("Input is not valid UTF-8 text, please type it again.")?,
            }
        }
    }

    /// Like `read_line`, but running out of input aborts the current flow
    pub fn ask(&mut self, label: &str) -> NotasResult<String> {
        self.read_line(label)?
            .ok_or_else(|| NotasError::Aborted("input closed".into()))
    }

    /// Yes/no question; blank means no. Unrecognised answers ask again.
    pub fn confirm(&mut self, label: &str) -> NotasResult<bool> {
        loop {
            let answer = self.ask(&format!("{} (s/n): ", label))?;
            match answer.trim().to_lowercase().as_str() {
                "s" | "si" | "sí" | "y" | "yes" => return Ok(true),
                "n" | "no" | "" => return Ok(false),
                _ => self.say("Please answer 's' or 'n'.")?,
            }
        }
    }

    /// Ask for a folio until one parses. Blank input returns `None`.
    pub fn ask_folio(&mut self, label: &str) -> NotasResult<Option<Folio>> {
        loop {
            let answer = self.ask(label)?;
            if answer.trim().is_empty() {
                return Ok(None);
            }
            match answer.parse::<Folio>() {
                Ok(folio) => return Ok(Some(folio)),
                Err(e) => self.say(e.to_string())?,
            }
        }
    }

    /// Consume the prompt and hand back the output sink
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_read_line_strips_newline() {
        let mut p = prompt("hola\r\nadios\n");
        assert_eq!(p.read_line("> ").unwrap().as_deref(), Some("hola"));
        assert_eq!(p.read_line("> ").unwrap().as_deref(), Some("adios"));
        assert_eq!(p.read_line("> ").unwrap(), None);

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output, "> > > ");
    }

    #[test]
    fn test_invalid_utf8_is_asked_again() {
        let mut p = Prompt::new(Cursor::new(b"\xD1\nse\xC3\xB1or\n".to_vec()), Vec::new());
        assert_eq!(p.read_line("> ").unwrap().as_deref(), Some("señor"));

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("not valid UTF-8"));
        assert_eq!(output.matches("> ").count(), 2);
    }

    #[test]
    fn test_ask_aborts_on_eof() {
        let err = prompt("").ask("> ").unwrap_err();
        assert!(matches!(err, NotasError::Aborted(_)));
    }

    #[test]
    fn test_confirm_reasks_on_garbage() {
        let mut p = prompt("quizas\nS\n");
        assert!(p.confirm("Continue?").unwrap());

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("Please answer"));
    }

    #[test]
    fn test_confirm_blank_is_no() {
        assert!(!prompt("\n").confirm("Continue?").unwrap());
    }

    #[test]
    fn test_ask_folio_reprompts() {
        let mut p = prompt("abc\n0\n#3\n");
        assert_eq!(p.ask_folio("Folio: ").unwrap(), Folio::new(3));

        let mut blank = prompt("\n");
        assert_eq!(blank.ask_folio("Folio: ").unwrap(), None);
    }
}
