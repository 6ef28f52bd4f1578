//! Interactive HR assistant
//!
//! Reads questions from stdin and prints answers until `quit`, `exit` or `q`.
//! The whole session shares one conversation, so follow-up questions see the
//! earlier turns.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::ConversationState;
use hr_assistant::{Configuration, HrAssistant, HrError};

const EXIT_COMMANDS: &[&str] = &["quit", "exit", "q"];

enum Input<'a> {
    Exit,
    Skip,
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        Input::Skip
    } else if EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd)) {
        Input::Exit
    } else {
        Input::Question(line)
    }
}

/// The assistant for this run, or the reason it could not be built.
///
/// A bad configuration does not end the session; every question is answered
/// with the error until the user leaves.
enum Session {
    Ready {
        assistant: HrAssistant,
        conversation: ConversationState,
    },
    Unavailable(HrError),
}

impl Session {
    fn new(assistant: hr_assistant::Result<HrAssistant>) -> Self {
        match assistant {
            Ok(assistant) => Self::Ready {
                conversation: assistant.new_conversation(),
                assistant,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Assistant unavailable");
                Self::Unavailable(e)
            }
        }
    }

    fn banner(&self) -> String {
        match self {
            Self::Ready { assistant, .. } => format!("HR Assistant ({})", assistant.config().model),
            Self::Unavailable(_) => "HR Assistant (model unavailable)".into(),
        }
    }

    async fn answer(&mut self, question: &str) -> String {
        match self {
            Self::Ready { assistant, conversation } => assistant.chat(conversation, question).await,
            Self::Unavailable(e) => format!("Error: {e}"),
        }
    }
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\nYou: ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with answers
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut session = Session::new(Configuration::from_env().and_then(HrAssistant::from_config));

    println!("{}", session.banner());
    println!("Ask about policies, benefits or procedures. Type 'quit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match classify(&line) {
            Input::Exit => break,
            Input::Skip => {}
            Input::Question(question) => {
                let answer = session.answer(question).await;
                println!("\nAssistant: {answer}");
            }
        }
        prompt()?;
    }

    println!("\nGoodbye!");
    Ok(())
}
