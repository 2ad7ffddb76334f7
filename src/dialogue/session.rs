//! Estado explícito de uma conversa.

use std::collections::{BTreeSet, VecDeque};

use uuid::Uuid;

use super::state::{Clarification, DialogueState};
use crate::core::{Category, MealSummary, PreferenceStore, Vocabulary};
use crate::nlu::question::QuestionRecord;

/// Tudo que uma conversa acumula. Pertence a quem chama o controlador.
#[derive(Clone, Debug)]
pub struct Session {
    /// Identificador usado no span de log da sessão.
    pub id: Uuid,
    pub state: DialogueState,
    pub prefs: PreferenceStore,
    /// Categorias já perguntadas nesta entrevista.
    pub answered: BTreeSet<Category>,
    pub vocabulary: Vocabulary,
    /// Resultados filtrados da última busca.
    pub results: Vec<MealSummary>,
    /// Quantos resultados já foram exibidos.
    pub displayed: usize,
    /// Esclarecimentos pendentes além do atual.
    pub clarifications: VecDeque<Clarification>,
    /// Pergunta exibida na fase atual (para o atalho "yes").
    pub prompt: Option<QuestionRecord>,
    /// `true` depois que o prompt do estado atual foi emitido.
    pub(crate) awaiting: bool,
    pub(crate) finished: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: DialogueState::Start,
            prefs: PreferenceStore::new(),
            answered: BTreeSet::new(),
            vocabulary: Vocabulary::default(),
            results: Vec::new(),
            displayed: 0,
            clarifications: VecDeque::new(),
            prompt: None,
            awaiting: false,
            finished: false,
        }
    }

    /// A conversa terminou e a despedida já foi emitida.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `true` quando o estado atual espera uma linha do usuário.
    pub fn is_awaiting_input(&self) -> bool {
        self.awaiting
    }

    /// "start over": esquece preferências e resultados, mantém o vocabulário.
    pub fn restart(&mut self) {
        self.prefs.clear();
        self.answered.clear();
        self.clarifications.clear();
        self.results.clear();
        self.displayed = 0;
        self.prompt = None;
    }

    /// Recuperação de erro: volta ao estado inicial, inclusive o vocabulário.
    pub fn reset(&mut self) {
        self.restart();
        self.vocabulary = Vocabulary::default();
        self.state = DialogueState::Start;
        self.awaiting = false;
    }

    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("session", id = %self.id)
    }
}
