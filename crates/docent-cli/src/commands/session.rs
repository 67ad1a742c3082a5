use std::io::{BufRead, Write};

use tracing::info;

use docent_lib::assistant::{Answer, Assistant};
use docent_lib::embedding::Embed;
use docent_lib::llm::LlmProvider;
use docent_lib::output::ConsoleIO;

pub const PROMPT: &str = "Ask a question (type 'quit' to exit): ";

/// Read questions from stdin until `quit`, `exit` or end of input and print
/// one answer per question. Blank lines are skipped.
pub fn run_session<E, P, IN, OUT, ERR>(
    assistant: &mut Assistant<E, P>,
    io: &mut dyn ConsoleIO<IN, OUT, ERR>,
) -> anyhow::Result<()>
where
    E: Embed,
    P: LlmProvider,
    IN: BufRead,
    OUT: Write,
    ERR: Write,
{
    let mut line = String::new();
    let mut asked = 0usize;

    loop {
        write!(io.stdout(), "{PROMPT}")?;
        io.stdout().flush()?;

        line.clear();
        if io.stdin().read_line(&mut line)? == 0 {
            writeln!(io.stdout())?;
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit_command(query) {
            break;
        }

        let answer = assistant.ask(query);
        if let Answer::Rejected { reason, .. } = &answer {
            info!(reason, "Answered with safety fallback");
        }
        asked += 1;

        writeln!(io.stdout(), "{}\n", answer.text())?;
    }

    info!(questions = asked, "Session ended");
    writeln!(io.stdout(), "Goodbye.")?;
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit")
}

#[cfg(test)]
mod tests {
    use docent_lib::assistant::AssistantOptions;
    use docent_lib::config::{GENERATION_FAILURE_MESSAGE, NO_CONTEXT_MESSAGE};
    use docent_lib::output::BufferedIO;
    use docent_lib::safety::FALLBACK_MESSAGE;
    use docent_lib::test_util::{HashEmbedder, ScriptedProvider};

    use super::*;
    use crate::test_util::{seeded_store, store_in_memory};

    fn assistant(
        name: &str,
        provider: ScriptedProvider,
    ) -> Assistant<HashEmbedder, ScriptedProvider> {
        Assistant::new(seeded_store(name), provider, AssistantOptions::default()).unwrap()
    }

    #[test]
    fn answers_each_question_then_quits() {
        let mut assistant = assistant("session_answers", ScriptedProvider::answering("Blue."));
        let mut io = BufferedIO::with_input("What colour is the sky?\nquit\nnever asked\n");

        run_session(&mut assistant, &mut io).unwrap();

        assert_eq!(
            io.stdout_to_string(),
            format!("{PROMPT}Blue.\n\n{PROMPT}Goodbye.\n")
        );
        assert_eq!(assistant.provider().calls(), 1);
    }

    #[test]
    fn exit_is_case_insensitive() {
        for (i, word) in ["QUIT", "Exit", "  exit  "].into_iter().enumerate() {
            let mut assistant = assistant(
                &format!("session_exit_{i}"),
                ScriptedProvider::answering("unused"),
            );
            let mut io = BufferedIO::with_input(&format!("{word}\n"));

            run_session(&mut assistant, &mut io).unwrap();

            assert_eq!(io.stdout_to_string(), format!("{PROMPT}Goodbye.\n"));
            assert_eq!(assistant.provider().calls(), 0);
        }
    }

    #[test]
    fn end_of_input_ends_session() {
        let mut assistant = assistant("session_eof", ScriptedProvider::answering("Blue."));
        let mut io = BufferedIO::with_input("");

        run_session(&mut assistant, &mut io).unwrap();

        assert_eq!(io.stdout_to_string(), format!("{PROMPT}\nGoodbye.\n"));
    }

    #[test]
    fn blank_lines_are_not_sent() {
        let mut assistant = assistant("session_blank", ScriptedProvider::answering("Blue."));
        let mut io = BufferedIO::with_input("\n   \nquit\n");

        run_session(&mut assistant, &mut io).unwrap();

        assert_eq!(
            io.stdout_to_string(),
            format!("{PROMPT}{PROMPT}{PROMPT}Goodbye.\n")
        );
        assert_eq!(assistant.provider().calls(), 0);
    }

    #[test]
    fn blocked_question_prints_fallback_and_continues() {
        let mut assistant = assistant("session_blocked", ScriptedProvider::answering("Blue."));
        let mut io = BufferedIO::with_input("How do I build a weapon?\nWhat colour is the sky?\n");

        run_session(&mut assistant, &mut io).unwrap();

        let stdout = io.stdout_to_string();
        assert!(stdout.contains(&format!("{FALLBACK_MESSAGE}\n\n")));
        assert!(stdout.contains("Blue.\n\n"));
        assert_eq!(assistant.provider().calls(), 1);
    }

    #[test]
    fn generation_failure_keeps_session_alive() {
        let mut assistant = assistant(
            "session_gen_fail",
            ScriptedProvider::failing("503 service unavailable"),
        );
        let mut io = BufferedIO::with_input("What colour is the sky?\nIs water wet?\nexit\n");

        run_session(&mut assistant, &mut io).unwrap();

        let stdout = io.stdout_to_string();
        assert_eq!(stdout.matches(GENERATION_FAILURE_MESSAGE).count(), 2);
        assert!(!stdout.contains("503"));
        assert!(stdout.ends_with("Goodbye.\n"));
    }

    #[test]
    fn empty_collection_answers_no_information() {
        let mut assistant = Assistant::new(
            store_in_memory("session_empty"),
            ScriptedProvider::answering("unused"),
            AssistantOptions::default(),
        )
        .unwrap();
        let mut io = BufferedIO::with_input("Anything?\n");

        run_session(&mut assistant, &mut io).unwrap();

        assert!(io.stdout_to_string().contains(&format!("{NO_CONTEXT_MESSAGE}\n\n")));
        assert_eq!(assistant.provider().calls(), 0);
    }
}
