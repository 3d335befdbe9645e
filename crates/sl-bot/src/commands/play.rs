use std::io::{self, BufRead, Write};

use colored::{ColoredString, Colorize};
use sl_core::{
    Audience, LetterStatus, Outbound, ParticipantId, RoomId, SessionEvent, SessionRegistry,
};

use crate::render;

use super::GameArgs;

const HELP: &str = "\
  join <name>          seat a player (two are needed)
  <name> <guess>       submit a guess for a player
  leave <name>         a player leaves; the game ends
  status               show the board so far
  quit                 exit";

/// Two players share one terminal and type guesses for each other.
pub fn run(args: &GameArgs) -> Result<(), String> {
    let mut registry = super::build_registry(args)?;
    let room = RoomId::from("local");

    println!("  {} Slurdle, hot-seat edition", "Starting".bold());
    println!(
        "  {} pairs loaded | {} guesses per game",
        registry.catalog().len(),
        registry.config().attempt_limit
    );
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, Some(rest.trim())),
            None => (input, None),
        };
        let result = match (head, rest) {
            ("quit" | "q", None) => break,
            ("help", None) => {
                println!("{HELP}\n");
                continue;
            }
            ("status", None) => {
                print_status(&registry, &room);
                continue;
            }
            ("join", Some(name)) if is_single_word(name) => {
                registry.join(&room, &ParticipantId::from(name))
            }
            ("leave", Some(name)) if is_single_word(name) => {
                Ok(registry.leave(&room, &ParticipantId::from(name)))
            }
            ("join" | "leave", _) => {
                println!("{}\n", "Usage: join <name> | leave <name>".yellow());
                continue;
            }
            // The whole remainder is the guess, so stray words get rejected
            // by word validation instead of being dropped.
            (name, Some(guess)) => registry.submit_guess(&room, &ParticipantId::from(name), guess),
            _ => {
                println!("{}\n", "Unknown command. Type 'help'.".yellow());
                continue;
            }
        };

        match result {
            Ok(events) => {
                for outbound in &events {
                    println!("{}", format_outbound(outbound));
                }
                if !events.is_empty() {
                    println!();
                }
                if events
                    .iter()
                    .any(|o| matches!(o.event, SessionEvent::RoomFinished { .. }))
                {
                    registry.close(&room);
                    println!("  Seat two players with 'join' to play again.\n");
                }
            }
            Err(e) => println!("{}\n", render::describe(&render::rejection(&e)).yellow()),
        }
    }

    Ok(())
}

fn is_single_word(text: &str) -> bool {
    !text.is_empty() && !text.contains(char::is_whitespace)
}

fn print_status(registry: &SessionRegistry, room: &RoomId) {
    let Some(session) = registry.get(room) else {
        println!("  No game running. Seat two players with 'join'.\n");
        return;
    };
    let players: Vec<&str> = session
        .participants()
        .iter()
        .map(ParticipantId::as_str)
        .collect();
    println!("  Players: {} | {}", players.join(", "), session.status());
    for round in session.resolved_rounds() {
        if let Some(resolved) = round.resolved() {
            println!(
                "  {:>2}. {}",
                round.number(),
                board_row(&resolved.word, &resolved.statuses)
            );
        }
    }
    println!(
        "  {} of {} guesses left\n",
        session.attempts_remaining(),
        registry.config().attempt_limit
    );
}

fn format_outbound(outbound: &Outbound) -> String {
    let prefix = match &outbound.audience {
        Audience::Room => String::new(),
        Audience::Participant(id) => format!("[to {id}] ").dimmed().to_string(),
    };
    let body = match &outbound.event {
        SessionEvent::GameStarted { image_ref, .. } => format!(
            "{}\n  Image: {}",
            render::describe(&outbound.event),
            image_ref.cyan()
        ),
        SessionEvent::RoundFeedback {
            round_number,
            guess,
            statuses,
            attempts_remaining,
        } => format!(
            "{round_number}. {}  ({attempts_remaining} left)",
            board_row(guess, statuses)
        ),
        SessionEvent::GameWon { .. } | SessionEvent::RoomFinished { .. } => {
            render::describe(&outbound.event).green().bold().to_string()
        }
        SessionEvent::GameLost { .. } | SessionEvent::GameAborted { .. } => {
            render::describe(&outbound.event).red().bold().to_string()
        }
        SessionEvent::GuessRejected { .. } => {
            render::describe(&outbound.event).yellow().to_string()
        }
        _ => render::describe(&outbound.event),
    };
    format!("  {prefix}{body}")
}

fn board_row(word: &str, statuses: &[LetterStatus]) -> String {
    word.chars()
        .zip(statuses)
        .map(|(c, status)| tile(c, *status).to_string())
        .collect()
}

fn tile(letter: char, status: LetterStatus) -> ColoredString {
    let text = format!(" {} ", letter.to_ascii_uppercase()).black().bold();
    match status {
        LetterStatus::Correct => text.on_green(),
        LetterStatus::Present => text.on_yellow(),
        LetterStatus::Absent => text.on_bright_black(),
    }
}
