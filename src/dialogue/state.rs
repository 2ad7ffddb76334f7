//! Estados da entrevista e as fases de pergunta.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::{Category, Tag};
use crate::nlu::question::QuestionPhase;
use crate::nlu::ParseResult;

/// Uma fase de pergunta da entrevista.
///
/// `Primary` é sempre a primeira; as secundárias seguem em ordem fixa e
/// nunca são repetidas depois de respondidas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Culinária e ingrediente principal.
    Primary,
    MealType,
    Dislikes,
    Dietary,
}

impl Phase {
    pub const SECONDARY: [Phase; 3] = [Phase::MealType, Phase::Dislikes, Phase::Dietary];

    /// Categorias perguntadas nesta fase (prioridade do parser).
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Phase::Primary => &[Category::Cuisine, Category::Ingredient],
            Phase::MealType => &[Category::MealType],
            Phase::Dislikes => &[Category::Dislikes],
            Phase::Dietary => &[Category::Dietary],
        }
    }

    /// Como a fase é nomeada nas mensagens ao usuário.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Primary => "cuisine or ingredient",
            Phase::MealType => "category",
            Phase::Dislikes => "dislikes",
            Phase::Dietary => "dietary",
        }
    }

    pub fn question_phase(&self) -> QuestionPhase {
        match self {
            Phase::Primary => QuestionPhase::Initial,
            _ => QuestionPhase::Secondary,
        }
    }

    pub fn is_answered(&self, answered: &BTreeSet<Category>) -> bool {
        self.categories().iter().all(|c| answered.contains(c))
    }

    /// Primeira fase secundária ainda não respondida.
    pub fn next_secondary(answered: &BTreeSet<Category>) -> Option<Phase> {
        Self::SECONDARY.into_iter().find(|p| !p.is_answered(answered))
    }
}

/// Pedido de esclarecimento para uma categoria de valor único que
/// acabou com mais de um tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clarification {
    pub category: Category,
    pub options: BTreeSet<Tag>,
    /// Conjunto antes da mescla, restaurado se o usuário não escolher.
    pub previous: BTreeSet<Tag>,
}

/// Estado do controlador de diálogo.
///
/// ```text
/// Start → FetchingVocabulary → Asking(Primary) ─┬→ Asking(MealType|Dislikes|Dietary) ─→ ReadyToSearch
///                                   │            ├→ Clarify ──────────┘                     │ yes
///                                   └────────────┴→ HandleNegation ───┘                     ▼
///                    Exiting ← ConfirmingChoice ← GettingDetail ← ShowingResults ←── Searching
///                                                                                          │ nada
///                                                                                      NoResults
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogueState {
    Start,
    FetchingVocabulary,
    Asking(Phase),
    Clarify(Clarification),
    /// Guarda o parse que motivou a rejeição.
    HandleNegation(ParseResult),
    ReadyToSearch,
    Searching,
    ShowingResults,
    GettingDetail,
    ConfirmingChoice,
    NoResults,
    Exiting,
    Error(String),
}

impl DialogueState {
    /// Nome estável para logs.
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Start => "start",
            DialogueState::FetchingVocabulary => "fetching_vocabulary",
            DialogueState::Asking(_) => "asking",
            DialogueState::Clarify(_) => "clarify",
            DialogueState::HandleNegation(_) => "handle_negation",
            DialogueState::ReadyToSearch => "ready_to_search",
            DialogueState::Searching => "searching",
            DialogueState::ShowingResults => "showing_results",
            DialogueState::GettingDetail => "getting_detail",
            DialogueState::ConfirmingChoice => "confirming_choice",
            DialogueState::NoResults => "no_results",
            DialogueState::Exiting => "exiting",
            DialogueState::Error(_) => "error",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueState::Asking(phase) => write!(f, "asking({})", phase.label()),
            DialogueState::Clarify(c) => write!(f, "clarify({})", c.category),
            other => f.write_str(other.name()),
        }
    }
}
