//! REPL session management

use std::io::{self, Write};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::render::{StreamPrinter, format_trip};
use crate::chat::{ChatError, ChatEvent, ChatOrchestrator};
use crate::trip::{MetadataPatch, TripAction, TripMode};

/// Interactive planning session
pub struct ReplSession {
    orchestrator: ChatOrchestrator,
}

impl ReplSession {
    pub fn new(orchestrator: ChatOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_prompt: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(prompt) = initial_prompt {
            println!("{} {}", ">".bright_green(), prompt);
            self.process_user_input(&prompt).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await? {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Buon viaggio!");
        Ok(())
    }

    fn print_welcome(&self) {
        let snapshot = self.orchestrator.store().snapshot();
        println!();
        println!("{}", "Road Trip Planner".bright_cyan().bold());
        if !snapshot.document.stops.is_empty() {
            println!("Resuming trip: {}", snapshot.document.stop_names());
        }
        println!(
            "Type {} for help, {} to quit, Ctrl+C stops a reply",
            "/help".yellow(),
            "/quit".yellow()
        );
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> Result<SlashResult> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        debug!(%cmd, "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return Ok(SlashResult::Quit),
            "/trip" | "/t" => {
                let snapshot = self.orchestrator.store().snapshot();
                println!();
                println!("{}", format_trip(&snapshot.document));
                println!();
            }
            "/mode" => match parts.get(1).map(|m| m.parse::<TripMode>()) {
                Some(Ok(mode)) => {
                    let patch = MetadataPatch {
                        mode: Some(mode),
                        ..Default::default()
                    };
                    self.orchestrator
                        .store()
                        .dispatch(TripAction::UpdateTripMetadata(patch))
                        .await?;
                    info!(?mode, "Trip mode changed");
                    println!("{}", format!("Mode set to {}.", mode_label(mode)).dimmed());
                }
                Some(Err(e)) => println!("{} {}", "?".yellow(), e),
                None => println!("Usage: {} <standard|burger>", "/mode".yellow()),
            },
            "/reset" => {
                self.orchestrator.reset().await;
                self.orchestrator.store().dispatch(TripAction::Reset).await?;
                println!("{}", "Trip and conversation cleared.".dimmed());
            }
            "/clear" | "/c" => {
                self.orchestrator.reset().await;
                println!("{}", "Conversation cleared.".dimmed());
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        Ok(SlashResult::Continue)
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:24} Show this help", "/help".yellow());
        println!("  {:24} Exit", "/quit".yellow());
        println!("  {:24} Show the current itinerary", "/trip".yellow());
        println!("  {:24} Switch planning mode", "/mode <standard|burger>".yellow());
        println!("  {:24} Clear the conversation", "/clear".yellow());
        println!("  {:24} Clear the conversation and the trip", "/reset".yellow());
        println!();
    }

    /// Send one message and stream the reply until the turn ends
    async fn process_user_input(&mut self, input: &str) {
        let mut events = self.orchestrator.subscribe_events();
        let mut printer = StreamPrinter::new();

        let turn = self.orchestrator.send_message(input);
        tokio::pin!(turn);

        let result = loop {
            tokio::select! {
                result = &mut turn => break result,
                event = events.recv() => match event {
                    Ok(event) => print_event(&mut printer, &event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => debug!(%skipped, "process_user_input: events lagged"),
                    Err(broadcast::error::RecvError::Closed) => {}
                },
                _ = tokio::signal::ctrl_c() => self.orchestrator.stop(),
            }
        };

        while let Ok(event) = events.try_recv() {
            print_event(&mut printer, &event);
        }

        match result {
            Ok(_) => {}
            Err(ChatError::Busy) => println!("{}", "Still working on the previous message.".yellow()),
            Err(e) => println!("\n{} {}", "Error:".red(), e),
        }
        println!();
    }
}

fn print_event(printer: &mut StreamPrinter, event: &ChatEvent) {
    if let Some(out) = printer.render(event) {
        print!("{}", out);
        let _ = io::stdout().flush();
    }
}

fn mode_label(mode: TripMode) -> &'static str {
    match mode {
        TripMode::Standard => "standard",
        TripMode::BurgerChallenge => "burger challenge",
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
