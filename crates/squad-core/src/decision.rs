//! Decision requests: the only point where reconciliation waits on a caller
//!
//! The core never prompts. At each fork it builds a [`DecisionRequest`] with
//! the enumerated choices and a default, hands it to a [`Decider`], and
//! continues with whatever choice comes back.

use std::collections::VecDeque;

use serde::Serialize;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChoiceId {
    CreateDirectory,
    Upgrade,
    Repair,
    Reinstall,
    Downgrade,
    ExpansionsOnly,
    InstallAlongside,
    InstallAnyway,
    BackupAndOverwrite,
    SkipModified,
    Overwrite,
    Skip,
    Proceed,
    KeepCurrent,
    Cancel,
}

impl ChoiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceId::CreateDirectory => "create-directory",
            ChoiceId::Upgrade => "upgrade",
            ChoiceId::Repair => "repair",
            ChoiceId::Reinstall => "reinstall",
            ChoiceId::Downgrade => "downgrade",
            ChoiceId::ExpansionsOnly => "expansions-only",
            ChoiceId::InstallAlongside => "install-alongside",
            ChoiceId::InstallAnyway => "install-anyway",
            ChoiceId::BackupAndOverwrite => "backup-and-overwrite",
            ChoiceId::SkipModified => "skip-modified",
            ChoiceId::Overwrite => "overwrite",
            ChoiceId::Skip => "skip",
            ChoiceId::Proceed => "proceed",
            ChoiceId::KeepCurrent => "keep-current",
            ChoiceId::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which fork in the reconciliation flow is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionKind {
    MissingDirectory,
    ExistingInstall,
    LegacyInstall,
    UnmanagedInstall,
    ModifiedFiles,
    ExistingPack { pack_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRequest {
    pub kind: DecisionKind,
    pub prompt: String,
    /// Context lines shown above the choices, such as modified file paths.
    pub details: Vec<String>,
    pub choices: Vec<Choice>,
    pub default: ChoiceId,
}

impl DecisionRequest {
    pub fn new(kind: DecisionKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            details: Vec::new(),
            choices: Vec::new(),
            default: ChoiceId::Cancel,
        }
    }

    pub fn detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    pub fn choice(mut self, id: ChoiceId, label: impl Into<String>) -> Self {
        self.choices.push(Choice {
            id,
            label: label.into(),
        });
        self
    }

    pub fn default_choice(mut self, id: ChoiceId) -> Self {
        self.default = id;
        self
    }

    pub fn offers(&self, id: ChoiceId) -> bool {
        self.choices.iter().any(|choice| choice.id == id)
    }

    /// Index of the default among the choices, for list prompts.
    pub fn default_index(&self) -> usize {
        self.choices
            .iter()
            .position(|choice| choice.id == self.default)
            .unwrap_or(0)
    }
}

/// Answers decision requests on behalf of a user or a script.
pub trait Decider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<ChoiceId>;
}

impl<D: Decider + ?Sized> Decider for &mut D {
    fn decide(&mut self, request: &DecisionRequest) -> Result<ChoiceId> {
        (**self).decide(request)
    }
}

/// Ask `decider` and reject any answer that was not offered.
pub fn ask(decider: &mut dyn Decider, request: &DecisionRequest) -> Result<ChoiceId> {
    let choice = decider.decide(request)?;
    if !request.offers(choice) {
        return Err(Error::InvalidDecision {
            choice: choice.to_string(),
            prompt: request.prompt.clone(),
        });
    }
    tracing::info!(kind = ?request.kind, %choice, "Decision made");
    Ok(choice)
}

/// Always takes each request's default. Used for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecider;

impl Decider for DefaultDecider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<ChoiceId> {
        Ok(request.default)
    }
}

/// Replays a fixed list of answers and records every request it saw.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecider {
    answers: VecDeque<ChoiceId>,
    seen: Vec<DecisionRequest>,
}

impl ScriptedDecider {
    pub fn new(answers: impl IntoIterator<Item = ChoiceId>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    pub fn seen(&self) -> &[DecisionRequest] {
        &self.seen
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Decider for ScriptedDecider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<ChoiceId> {
        self.seen.push(request.clone());
        self.answers.pop_front().ok_or_else(|| Error::InvalidDecision {
            choice: "<none scripted>".to_string(),
            prompt: request.prompt.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> DecisionRequest {
        DecisionRequest::new(DecisionKind::MissingDirectory, "Directory does not exist")
            .choice(ChoiceId::CreateDirectory, "Create it")
            .choice(ChoiceId::Cancel, "Cancel")
            .default_choice(ChoiceId::CreateDirectory)
    }

    #[test]
    fn default_decider_takes_default() {
        assert_eq!(ask(&mut DefaultDecider, &request()).unwrap(), ChoiceId::CreateDirectory);
        assert_eq!(request().default_index(), 0);
    }

    #[test]
    fn unoffered_choice_is_rejected() {
        let mut decider = ScriptedDecider::new([ChoiceId::Repair]);
        let err = ask(&mut decider, &request()).unwrap_err();
        assert!(matches!(err, Error::InvalidDecision { .. }));
    }

    #[test]
    fn scripted_decider_records_requests() {
        let mut decider = ScriptedDecider::new([ChoiceId::Cancel]);
        assert_eq!(ask(&mut decider, &request()).unwrap(), ChoiceId::Cancel);
        assert_eq!(decider.seen().len(), 1);
        assert!(ask(&mut decider, &request()).is_err());
    }
}
