//! Interactive prompts for reconciliation decisions
//!
//! Uses dialoguer for terminal-based selection.

use std::io::IsTerminal;

use colored::Colorize;
use dialoguer::Select;
use squad_core::{ChoiceId, Decider, DecisionRequest, DefaultDecider};

/// Asks the user at the terminal.
#[derive(Debug, Default)]
pub struct PromptDecider;

impl Decider for PromptDecider {
    fn decide(&mut self, request: &DecisionRequest) -> squad_core::Result<ChoiceId> {
        println!();
        println!("{} {}", "?".yellow().bold(), request.prompt.bold());
        for detail in &request.details {
            println!("   {}", detail.dimmed());
        }

        let labels: Vec<&str> = request.choices.iter().map(|c| c.label.as_str()).collect();
        let index = Select::new()
            .with_prompt("Choose")
            .items(&labels)
            .default(request.default_index())
            .interact()
            .map_err(|e| squad_core::Error::DecisionFailed {
                prompt: request.prompt.clone(),
                reason: e.to_string(),
            })?;

        Ok(request.choices[index].id)
    }
}

/// Prompt only when asked to and attached to a terminal; otherwise take
/// every default.
pub fn decider(assume_yes: bool) -> Box<dyn Decider> {
    if assume_yes || !std::io::stdin().is_terminal() {
        tracing::debug!("Using default answers for all decisions");
        Box::new(DefaultDecider)
    } else {
        Box::new(PromptDecider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_core::DecisionKind;

    #[test]
    fn assume_yes_takes_defaults() {
        let request = DecisionRequest::new(DecisionKind::MissingDirectory, "Create it?")
            .choice(ChoiceId::CreateDirectory, "Create")
            .choice(ChoiceId::Cancel, "Cancel")
            .default_choice(ChoiceId::CreateDirectory);

        let mut decider = decider(true);
        assert_eq!(decider.decide(&request).unwrap(), ChoiceId::CreateDirectory);
    }
}
