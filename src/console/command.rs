//! Parsing of the line-oriented commands typed into the console.

use crate::pipeline::Stage;

/// One instruction from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a new run for this video reference.
    Submit(String),
    /// Re-run a single stage of the current run.
    Retry(Stage),
    /// Fetch and print the raw transcript of the current video.
    Transcript,
    /// Print every pane of the current run.
    Status,
    Help,
    Quit,
}

/// Parse one input line.
///
/// Returns `Ok(None)` for blank lines.  Anything that is not a known
/// keyword is treated as a video reference, so pasting a link is enough to
/// start a run.
///
/// ```
/// use video_digest::console::{parse_command, ConsoleCommand};
/// use video_digest::pipeline::Stage;
///
/// assert_eq!(
///     parse_command("https://youtu.be/abc"),
///     Ok(Some(ConsoleCommand::Submit("https://youtu.be/abc".into())))
/// );
/// assert_eq!(parse_command("retry format"), Ok(Some(ConsoleCommand::Retry(Stage::Format))));
/// assert_eq!(parse_command("  "), Ok(None));
/// assert!(parse_command("retry summary").is_err());
/// ```
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let command = match keyword.to_ascii_lowercase().as_str() {
        "submit" => ConsoleCommand::Submit(rest.to_string()),
        "retry" => {
            let stage = Stage::from_name(rest).ok_or_else(|| {
                format!("unknown stage {rest:?}; expected analyze, format or translate")
            })?;
            ConsoleCommand::Retry(stage)
        }
        "transcript" if rest.is_empty() => ConsoleCommand::Transcript,
        "status" if rest.is_empty() => ConsoleCommand::Status,
        "help" | "?" if rest.is_empty() => ConsoleCommand::Help,
        "quit" | "exit" if rest.is_empty() => ConsoleCommand::Quit,
        _ => ConsoleCommand::Submit(line.to_string()),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_link_submits() {
        assert_eq!(
            parse_command("  https://www.youtube.com/watch?v=dQw4w9WgXcQ \n"),
            Ok(Some(ConsoleCommand::Submit(
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into()
            )))
        );
    }

    #[test]
    fn explicit_submit_keeps_argument() {
        assert_eq!(
            parse_command("submit dQw4w9WgXcQ"),
            Ok(Some(ConsoleCommand::Submit("dQw4w9WgXcQ".into())))
        );
        assert_eq!(parse_command("submit"), Ok(Some(ConsoleCommand::Submit(String::new()))));
    }

    #[test]
    fn retry_each_stage() {
        for stage in Stage::ALL {
            assert_eq!(
                parse_command(&format!("RETRY {}", stage.name())),
                Ok(Some(ConsoleCommand::Retry(stage)))
            );
        }
    }

    #[test]
    fn retry_without_stage_is_an_error() {
        assert!(parse_command("retry").is_err());
    }

    #[test]
    fn keywords() {
        assert_eq!(parse_command("status"), Ok(Some(ConsoleCommand::Status)));
        assert_eq!(parse_command("transcript"), Ok(Some(ConsoleCommand::Transcript)));
        assert_eq!(parse_command("?"), Ok(Some(ConsoleCommand::Help)));
        assert_eq!(parse_command("exit"), Ok(Some(ConsoleCommand::Quit)));
    }

    #[test]
    fn keyword_with_trailing_text_is_a_reference() {
        assert_eq!(
            parse_command("status quo"),
            Ok(Some(ConsoleCommand::Submit("status quo".into())))
        );
    }
}
