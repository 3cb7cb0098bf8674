//! Line-oriented prompts on stdin/stdout.

use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
}

/// Accepts y/yes and n/no in any case; an empty answer means no.
pub fn parse_confirmation(input: &str) -> Result<ConfirmationChoice, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(ConfirmationChoice::Yes),
        "" | "n" | "no" => Ok(ConfirmationChoice::No),
        other => Err(format!("Please answer y or n (got '{other}')")),
    }
}

/// Writes `question` and reads one trimmed line. End of input reads as an
/// empty answer.
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Like [`ask`], showing `current` and returning it when the answer is
/// empty.
pub fn ask_with_default<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    current: &str,
) -> io::Result<String> {
    let answer = if current.is_empty() {
        ask(input, output, &format!("{question}: "))?
    } else {
        ask(input, output, &format!("{question} [{current}]: "))?
    };
    Ok(if answer.is_empty() {
        current.to_string()
    } else {
        answer
    })
}

/// Asks a yes/no question until the answer parses.
pub fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default_yes: bool,
) -> io::Result<bool> {
    let hint = if default_yes { "(Y/n)" } else { "(y/N)" };
    loop {
        let answer = ask(input, output, &format!("{question} {hint}: "))?;
        if answer.is_empty() {
            return Ok(default_yes);
        }
        match parse_confirmation(&answer) {
            Ok(choice) => return Ok(choice == ConfirmationChoice::Yes),
            Err(message) => writeln!(output, "{message}")?,
        }
    }
}

/// Deletion confirmation on the real terminal. Read errors count as "no".
pub fn confirm_on_terminal(question: &str) -> bool {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    ask_yes_no(&mut input, &mut output, question, false).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn confirmation_parsing() {
        assert_eq!(parse_confirmation(" YES\n"), Ok(ConfirmationChoice::Yes));
        assert_eq!(parse_confirmation("n"), Ok(ConfirmationChoice::No));
        assert_eq!(parse_confirmation(""), Ok(ConfirmationChoice::No));
        assert!(parse_confirmation("maybe").is_err());
    }

    #[test]
    fn yes_no_repeats_until_understood() {
        let mut input = Cursor::new("perhaps\ny\n");
        let mut output = Vec::new();
        assert!(ask_yes_no(&mut input, &mut output, "Delete?", false).unwrap());
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Delete? (y/N): ").count(), 2);
    }

    #[test]
    fn empty_answer_uses_the_default() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        assert!(!ask_yes_no(&mut input, &mut output, "Delete?", false).unwrap());

        let mut input = Cursor::new("\n");
        let value = ask_with_default(&mut input, &mut output, "Model ID", "gpt-4o").unwrap();
        assert_eq!(value, "gpt-4o");
    }
}
