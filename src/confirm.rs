//! Operator confirmation before any filesystem mutation.

use std::io::{BufRead, Write};

use crate::error::GrouperError;

/// `y` or `yes`, any case, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Ask `question` on `output` and read one line from `input`.
///
/// End of input counts as a decline.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<bool, GrouperError> {
    let prompt_failed = |e: std::io::Error| GrouperError::PromptFailed {
        detail: e.to_string(),
    };

    write!(output, "{question} [y/N] ").map_err(prompt_failed)?;
    output.flush().map_err(prompt_failed)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(prompt_failed)?;
    if read == 0 {
        return Ok(false);
    }
    Ok(is_affirmative(&line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn accepts_y_and_yes_in_any_case() {
        for answer in ["y", "Y", "yes", "YES", " y\n", "Yes\r\n"] {
            assert!(is_affirmative(answer), "{answer:?} should confirm");
        }
    }

    #[test]
    fn everything_else_declines() {
        for answer in ["", "n", "no", "yep", "sure", "y y", "1"] {
            assert!(!is_affirmative(answer), "{answer:?} should decline");
        }
    }

    #[test]
    fn confirm_writes_prompt_and_reads_answer() {
        let mut input = Cursor::new(b"y\n".to_vec());
        let mut output = Vec::new();
        assert!(confirm(&mut input, &mut output, "Proceed?").unwrap());
        assert_eq!(String::from_utf8(output).unwrap(), "Proceed? [y/N] ");
    }

    #[test]
    fn confirm_treats_eof_as_decline() {
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        assert!(!confirm(&mut input, &mut output, "Proceed?").unwrap());
    }
}
