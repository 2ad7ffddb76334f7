//! # Diálogo — A Entrevista de Preferências
//!
//! O [`DialogueController`] conduz a conversa inteira: pergunta, entende
//! a resposta, acumula preferências, busca na fonte e apresenta os
//! resultados. Ele não guarda estado próprio: tudo vive na [`Session`]
//! que quem chama passa a cada turno.
//!
//! ## O Ciclo de um Turno
//!
//! ```text
//! respond(session, "italian please")
//!   │
//!   ├── 1. estado atual consome a linha (handle_input)
//!   │   └── UtteranceParser → PreferenceStore / próximo estado
//!   │
//!   └── 2. estados automáticos rodam até um pedir entrada (run)
//!       └── HandleNegation, ReadyToSearch, Searching, ShowingResults...
//! ```
//!
//! ## Roles das Mensagens
//!
//! | Role | Significado | Exemplo |
//! |------|-------------|---------|
//! | `System` | Confirmações e andamento | "Okay, I noted: cuisine: italian" |
//! | `Question` | Pergunta que espera resposta | "Any dietary restrictions?" |
//! | `Suggestion` | Resultados e detalhes de refeições | "Here are some meal ideas:" |
//! | `Alert` | Avisos e falhas degradadas | "Sorry, couldn't fetch details." |
//!
//! ## Tokens de Controle
//!
//! Comparados após `trim` e em lowercase: `quit`, `skip`, `any`, `no`,
//! `none`, `yes`, `more`, `search again`, `start over`, `retry`.

pub mod session;
pub mod state;

use std::collections::BTreeSet;
use std::mem;

use rand::Rng;
use serde::Serialize;

use crate::config::{EXAMPLES_PER_PROMPT, PAGE_SIZE, RANDOM_ATTEMPTS};
use crate::core::{Category, MealDetail, MealSummary, PreferenceStore, Tag, TagLexicon, Vocabulary, VocabularyKind};
use crate::filter::{CandidateFilter, FilterOptions};
use crate::nlu::question::{sample_examples, title_case, with_examples, QuestionBank, QuestionRecord};
use crate::nlu::{Entities, Intent, UtteranceParser};
use crate::source::{MealSource, SearchCriteria};

pub use session::Session;
pub use state::{Clarification, DialogueState, Phase};

/// Respostas que pulam a pergunta atual.
const SKIP_TOKENS: &[&str] = &["skip", "any", "no", "none", ""];

/// Exemplos fixos da pergunta de categoria (as categorias do TheMealDB).
const MEAL_TYPE_EXAMPLES: &[&str] = &[
    "Beef", "Breakfast", "Chicken", "Dessert", "Goat", "Lamb", "Miscellaneous", "Pasta", "Pork",
    "Seafood", "Side", "Starter", "Vegan", "Vegetarian",
];

const QUESTION_REPLY: &str = "Sorry, I can search for meals, but I can't answer general questions yet.";

/// Mensagem no chat: o resultado de cada turno do controlador.
///
/// A role indica a **origem semântica** da mensagem; o console pode
/// usá-la para estilizar cada tipo de forma diferente.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    /// Texto em inglês, pronto para exibição (pode ter várias linhas).
    pub content: String,
}

/// Role semântica das mensagens do assistente.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Confirmações e andamento da busca.
    System,
    /// Pergunta que aguarda uma linha do usuário.
    Question,
    /// Refeições sugeridas ou detalhadas.
    Suggestion,
    /// Avisos (listas incompletas, falhas da fonte, entrada inválida).
    Alert,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    pub fn question(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Question, content: content.into() }
    }

    pub fn suggestion(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Suggestion, content: content.into() }
    }

    pub fn alert(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Alert, content: content.into() }
    }
}

/// Máquina de estados da entrevista.
///
/// Compartilhável entre sessões: léxico, perguntas, parser e fonte são
/// somente leitura depois da construção.
pub struct DialogueController {
    lexicon: TagLexicon,
    questions: QuestionBank,
    parser: UtteranceParser,
    source: Box<dyn MealSource>,
}

impl DialogueController {
    pub fn new(lexicon: TagLexicon, questions: QuestionBank, source: impl MealSource + 'static) -> Self {
        Self {
            lexicon,
            questions,
            parser: UtteranceParser::default(),
            source: Box::new(source),
        }
    }

    /// Roda os estados automáticos até a primeira pergunta.
    pub fn start(&self, session: &mut Session) -> Vec<ChatMessage> {
        let _span = session.span().entered();
        let mut out = Vec::new();
        self.run(session, &mut out);
        out
    }

    /// Consome uma linha do usuário e avança até a próxima pergunta.
    ///
    /// Depois que a sessão terminou, devolve lista vazia.
    pub fn respond(&self, session: &mut Session, input: &str) -> Vec<ChatMessage> {
        let _span = session.span().entered();
        let mut out = Vec::new();

        if !session.awaiting {
            self.run(session, &mut out);
        }
        if session.finished {
            return out;
        }

        session.awaiting = false;
        let state = mem::replace(&mut session.state, DialogueState::Start);
        tracing::debug!(state = %state, "Entrada recebida");
        session.state = self.handle_input(session, state, input.trim(), &mut out);

        self.run(session, &mut out);
        out
    }

    /// Leva a sessão ao estado de erro (ex: falha de leitura no console)
    /// e roda a recuperação.
    pub fn fail(&self, session: &mut Session, reason: impl Into<String>) -> Vec<ChatMessage> {
        let _span = session.span().entered();
        let mut out = Vec::new();
        session.state = DialogueState::Error(reason.into());
        session.awaiting = false;
        self.run(session, &mut out);
        out
    }

    // ─── Estados automáticos ───

    fn run(&self, session: &mut Session, out: &mut Vec<ChatMessage>) {
        while !session.awaiting && !session.finished {
            let state = mem::replace(&mut session.state, DialogueState::Start);
            tracing::debug!(state = %state, "Transição");
            session.state = self.step(session, state, out);
        }
    }

    /// Executa um estado. Estados que pedem entrada emitem o prompt e
    /// marcam `awaiting`.
    fn step(&self, session: &mut Session, state: DialogueState, out: &mut Vec<ChatMessage>) -> DialogueState {
        match state {
            DialogueState::Start => DialogueState::FetchingVocabulary,

            DialogueState::FetchingVocabulary => {
                self.fetch_vocabulary(session);
                if session.vocabulary.is_incomplete() {
                    out.push(ChatMessage::alert("Warning: Failed to load some essential lists."));
                }
                out.push(ChatMessage::system("Welcome! I'm here to help you decide what to eat."));
                DialogueState::Asking(Phase::Primary)
            }

            DialogueState::Asking(phase) => {
                let mut rng = rand::thread_rng();
                let record = self
                    .questions
                    .pick(phase.question_phase(), phase.categories(), &mut rng)
                    .cloned();
                out.push(ChatMessage::question(self.prompt_text(session, phase, record.as_ref(), &mut rng)));
                session.prompt = record;
                session.awaiting = true;
                DialogueState::Asking(phase)
            }

            DialogueState::Clarify(clarification) => {
                let options: Vec<&str> = clarification.options.iter().map(String::as_str).collect();
                let noun = plural(clarification.category);
                out.push(ChatMessage::question(format!(
                    "You mentioned a few {}: {}.\nWhich one specific {} should I focus on?",
                    noun,
                    options.join(", "),
                    clarification.category
                )));
                session.awaiting = true;
                DialogueState::Clarify(clarification)
            }

            DialogueState::HandleNegation(parsed) => {
                self.apply_negation(session, &parsed.entities, out);
                session.answered.insert(Category::Dislikes);
                next_phase(session)
            }

            DialogueState::ReadyToSearch => self.ready_to_search(session, out),

            DialogueState::Searching => self.search(session, out),

            DialogueState::ShowingResults => {
                let start = session.displayed;
                let batch: Vec<&MealSummary> = session.results.iter().skip(start).take(PAGE_SIZE).collect();
                if batch.is_empty() {
                    let text = if start > 0 { "No more results to show." } else { "No meals found." };
                    out.push(ChatMessage::system(text));
                } else {
                    let mut lines = vec!["Here are some meal ideas:".to_string()];
                    for (offset, meal) in batch.iter().enumerate() {
                        lines.push(format!("  {}. {}", start + offset + 1, meal.name));
                    }
                    session.displayed += batch.len();
                    out.push(ChatMessage::suggestion(lines.join("\n")));
                }
                DialogueState::GettingDetail
            }

            DialogueState::GettingDetail => {
                out.push(ChatMessage::question(format!(
                    "Enter number (1-{}) for details, 'more', 'search again', 'start over', or 'quit':",
                    session.displayed
                )));
                session.awaiting = true;
                DialogueState::GettingDetail
            }

            DialogueState::ConfirmingChoice => {
                out.push(ChatMessage::question("Looks good? ('yes' to finish / 'no' for other options)"));
                session.awaiting = true;
                DialogueState::ConfirmingChoice
            }

            DialogueState::NoResults => {
                out.push(ChatMessage::alert(
                    "Sorry, I couldn't find any meals matching your criteria, even with random suggestions.",
                ));
                out.push(ChatMessage::question("Try again ('retry'), start over ('start over'), or 'quit'?"));
                session.awaiting = true;
                DialogueState::NoResults
            }

            DialogueState::Exiting => {
                out.push(ChatMessage::system("Happy cooking!"));
                session.finished = true;
                tracing::info!("Sessão encerrada");
                DialogueState::Exiting
            }

            DialogueState::Error(reason) => {
                tracing::error!(reason = %reason, "Erro na sessão, reiniciando diálogo");
                out.push(ChatMessage::alert("An unexpected error occurred. Restarting dialogue."));
                session.reset();
                DialogueState::Start
            }
        }
    }

    // ─── Entrada do usuário ───

    fn handle_input(
        &self,
        session: &mut Session,
        state: DialogueState,
        input: &str,
        out: &mut Vec<ChatMessage>,
    ) -> DialogueState {
        let command = input.to_lowercase();

        match state {
            DialogueState::Asking(phase) => self.answer_phase(session, phase, input, &command, out),

            DialogueState::Clarify(clarification) => {
                if command == "quit" {
                    return DialogueState::Exiting;
                }
                self.resolve_clarification(session, clarification, input, out)
            }

            DialogueState::ReadyToSearch => match command.as_str() {
                "yes" => DialogueState::Searching,
                "quit" => DialogueState::Exiting,
                _ => {
                    session.answered.clear();
                    DialogueState::Asking(Phase::Primary)
                }
            },

            DialogueState::GettingDetail => self.choose_result(session, &command, out),

            DialogueState::ConfirmingChoice => match command.as_str() {
                "yes" | "quit" => DialogueState::Exiting,
                _ => DialogueState::GettingDetail,
            },

            DialogueState::NoResults => match command.as_str() {
                "start over" => {
                    session.restart();
                    DialogueState::Asking(Phase::Primary)
                }
                "retry" => {
                    session.answered.clear();
                    DialogueState::Asking(Phase::Primary)
                }
                _ => DialogueState::Exiting,
            },

            // Estados automáticos nunca esperam entrada
            other => {
                tracing::warn!(state = %other, "Entrada em estado automático, ignorando");
                other
            }
        }
    }

    fn answer_phase(
        &self,
        session: &mut Session,
        phase: Phase,
        input: &str,
        command: &str,
        out: &mut Vec<ChatMessage>,
    ) -> DialogueState {
        if command == "quit" {
            return DialogueState::Exiting;
        }
        if SKIP_TOKENS.contains(&command) {
            tracing::debug!(phase = phase.label(), "Fase pulada");
            session.answered.extend(phase.categories().iter().copied());
            return next_phase(session);
        }

        if command == "yes" {
            if let Some(entities) = self.confirmed_prompt(session, phase) {
                return self.apply_preference(session, phase, entities, out);
            }
        }

        let parsed = self.parser.parse(input, &self.lexicon, phase.categories());
        tracing::info!(
            phase = phase.label(),
            intent = ?parsed.intent,
            entities = %serde_json::to_string(&parsed.entities).unwrap_or_default(),
            "Resposta analisada"
        );

        match parsed.intent {
            Intent::Question => {
                out.push(ChatMessage::system(QUESTION_REPLY));
                DialogueState::Asking(phase)
            }
            Intent::Negation | Intent::DislikeStatement => DialogueState::HandleNegation(parsed),
            // Na fase de dislikes tudo que foi reconhecido é rejeição
            _ if phase == Phase::Dislikes => DialogueState::HandleNegation(parsed),
            Intent::Unknown => {
                out.push(ChatMessage::system(format!(
                    "Hmm, I didn't catch a specific {} there.",
                    phase.label()
                )));
                session.answered.extend(phase.categories().iter().copied());
                next_phase(session)
            }
            Intent::Preference => self.apply_preference(session, phase, parsed.entities, out),
        }
    }

    /// "yes" a uma pergunta de sim/não vira o `positive_tag` do registro,
    /// se ele for um tag do léxico numa categoria da fase.
    fn confirmed_prompt(&self, session: &Session, phase: Phase) -> Option<Entities> {
        let record = session.prompt.as_ref()?;
        let category = self.yes_no_category(record, phase)?;

        let mut entities = Entities::default();
        entities.get_mut(category).insert(record.positive_tag.clone());
        Some(entities)
    }

    /// Categoria do registro cujo `positive_tag` é um tag do léxico, ou
    /// `None` para perguntas abertas.
    fn yes_no_category(&self, record: &QuestionRecord, phase: Phase) -> Option<Category> {
        phase
            .categories()
            .iter()
            .copied()
            .filter(|c| record.category.map_or(true, |rc| rc == *c))
            .find(|c| self.lexicon.keywords(*c, &record.positive_tag).is_some())
    }

    /// Mescla as entidades positivas. As da fase confirmam a resposta; as
    /// demais são guardadas também e só mencionadas.
    fn apply_preference(
        &self,
        session: &mut Session,
        phase: Phase,
        entities: Entities,
        out: &mut Vec<ChatMessage>,
    ) -> DialogueState {
        let mut in_phase = Vec::new();
        let mut others = Vec::new();

        for (category, tags) in entities.positive() {
            let outcome = session.prefs.merge(category, tags.iter().cloned());
            if outcome.ambiguous {
                session.clarifications.push_back(Clarification {
                    category,
                    options: outcome.tags.clone(),
                    previous: outcome.previous,
                });
            }
            if phase.categories().contains(&category) {
                in_phase.push((category, outcome.tags));
            } else {
                others.push((category, tags.clone()));
            }
        }
        session.answered.extend(phase.categories().iter().copied());

        let message = if !in_phase.is_empty() {
            in_phase.extend(others);
            format!("Okay, I noted: {}", describe(&in_phase))
        } else if !others.is_empty() {
            format!("Hmm, I didn't catch a specific {}, but noted: {}", phase.label(), describe(&others))
        } else {
            format!("Hmm, I didn't catch a specific {} there.", phase.label())
        };
        out.push(ChatMessage::system(message));

        match session.clarifications.pop_front() {
            Some(clarification) => DialogueState::Clarify(clarification),
            None => next_phase(session),
        }
    }

    fn resolve_clarification(
        &self,
        session: &mut Session,
        clarification: Clarification,
        input: &str,
        out: &mut Vec<ChatMessage>,
    ) -> DialogueState {
        let category = clarification.category;
        let parsed = self.parser.parse(input, &self.lexicon, &[category]);
        let choice = parsed
            .entities
            .get(category)
            .iter()
            .find(|tag| clarification.options.contains(*tag))
            .cloned();

        match choice {
            Some(tag) => {
                out.push(ChatMessage::system(format!("Okay, focusing on {}: {}.", category, tag)));
                session.prefs.replace(category, BTreeSet::from([tag]));
            }
            None => {
                out.push(ChatMessage::system(format!(
                    "Sorry, I didn't match that. Keeping previous {} options.",
                    category
                )));
                session.prefs.replace(category, clarification.previous);
            }
        }
        session.answered.insert(category);

        match session.clarifications.pop_front() {
            Some(next) => DialogueState::Clarify(next),
            None => next_phase(session),
        }
    }

    fn apply_negation(&self, session: &mut Session, entities: &Entities, out: &mut Vec<ChatMessage>) {
        let rejected = entities.rejected();
        if rejected.is_empty() {
            out.push(ChatMessage::system(
                "I understood you want to avoid something, but I'm not sure what specific items.",
            ));
            return;
        }

        let names: Vec<&str> = rejected.iter().map(String::as_str).collect();
        let mut lines = vec![format!("Okay, avoiding items related to: {}.", names.join(", "))];
        for tag in &rejected {
            for category in session.prefs.negate(tag) {
                lines.push(format!("   - '{}' removed from your '{}' preferences.", tag, category));
            }
        }
        tracing::info!(count = rejected.len(), "Itens marcados como dislike");
        out.push(ChatMessage::system(lines.join("\n")));
    }

    fn choose_result(&self, session: &mut Session, command: &str, out: &mut Vec<ChatMessage>) -> DialogueState {
        match command {
            "quit" => return DialogueState::Exiting,
            "more" => return DialogueState::ShowingResults,
            "search again" => return DialogueState::Searching,
            "start over" => {
                session.restart();
                return DialogueState::Asking(Phase::Primary);
            }
            _ => {}
        }

        if command.is_empty() || !command.chars().all(|c| c.is_ascii_digit()) {
            out.push(ChatMessage::alert("Invalid input."));
            return DialogueState::GettingDetail;
        }
        let Ok(number) = command.parse::<usize>() else {
            out.push(ChatMessage::alert("Invalid input."));
            return DialogueState::GettingDetail;
        };
        if number == 0 || number > session.displayed {
            out.push(ChatMessage::alert("Invalid number."));
            return DialogueState::GettingDetail;
        }

        let Some(meal) = session.results.get(number - 1) else {
            out.push(ChatMessage::alert("Invalid number."));
            return DialogueState::GettingDetail;
        };
        match self.fetch_detail(&meal.id) {
            Some(detail) => {
                out.push(ChatMessage::suggestion(render_detail(&detail)));
                DialogueState::ConfirmingChoice
            }
            None => {
                out.push(ChatMessage::alert("Sorry, couldn't fetch details."));
                DialogueState::GettingDetail
            }
        }
    }

    // ─── Busca ───

    fn ready_to_search(&self, session: &mut Session, out: &mut Vec<ChatMessage>) -> DialogueState {
        out.push(ChatMessage::system(summary_text(&session.prefs)));

        if !session.prefs.has_any(&Category::PRIMARY) {
            out.push(ChatMessage::alert(
                "I need a main ingredient, category, or cuisine to search effectively.",
            ));
            // Só dislikes: segue para a confirmação e a busca aleatória
            let dislikes_only =
                !session.prefs.has_any(&Category::POSITIVE) && session.prefs.get(Category::Dislikes).is_some();
            if !dislikes_only {
                for category in Category::PRIMARY {
                    session.answered.remove(&category);
                }
                return DialogueState::Asking(Phase::Primary);
            }
        }

        out.push(ChatMessage::question("Ready to search for meals? (yes/no)"));
        session.awaiting = true;
        DialogueState::ReadyToSearch
    }

    fn search(&self, session: &mut Session, out: &mut Vec<ChatMessage>) -> DialogueState {
        let filter = CandidateFilter::new(&self.lexicon, &session.vocabulary);
        let mut found = Vec::new();

        for category in Category::PRIMARY {
            let Some(tag) = session.prefs.single(category) else {
                continue;
            };
            let value = self.source_value(&session.vocabulary, category, tag);
            let Some(criteria) = SearchCriteria::for_category(category, value) else {
                continue;
            };

            out.push(ChatMessage::system(format!("Searching by {}...", criteria)));
            let candidates = self.source.search(&criteria).unwrap_or_else(|e| {
                tracing::warn!(criteria = %criteria, error = %e, "Busca falhou");
                Vec::new()
            });
            if candidates.is_empty() {
                out.push(ChatMessage::system(format!("No meals found directly by {}.", criteria)));
                continue;
            }

            tracing::info!(criteria = %criteria, count = candidates.len(), "Candidatos da busca");
            let options = FilterOptions { force_detail: false, primary_search: Some(category) };
            let kept = filter.filter(candidates, &session.prefs, |id| self.fetch_detail(id), options);
            if !kept.is_empty() {
                found = kept;
                break;
            }
            out.push(ChatMessage::system(format!(
                "No meals from {} matched all your preferences.",
                criteria
            )));
        }

        if found.is_empty() {
            out.push(ChatMessage::system(
                "Trying to find a random meal suggestion (checking all preferences)...",
            ));
            let details = self.random_details();
            let candidates = details.iter().map(MealDetail::summary).collect();
            let options = FilterOptions { force_detail: true, primary_search: None };
            found = filter.filter(
                candidates,
                &session.prefs,
                |id| details.iter().find(|d| d.id == id).cloned(),
                options,
            );
        }

        if found.is_empty() {
            return DialogueState::NoResults;
        }
        tracing::info!(count = found.len(), "Resultados prontos");
        session.results = found;
        session.displayed = 0;
        DialogueState::ShowingResults
    }

    /// Até [`RANDOM_ATTEMPTS`] sorteios, sem repetir refeições.
    fn random_details(&self) -> Vec<MealDetail> {
        let mut details: Vec<MealDetail> = Vec::new();
        for _ in 0..RANDOM_ATTEMPTS {
            match self.source.random() {
                Ok(Some(detail)) if !details.iter().any(|d| d.id == detail.id) => details.push(detail),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Sorteio de refeição falhou"),
            }
        }
        details
    }

    /// Valor enviado à fonte para um tag: a primeira palavra-chave que a
    /// fonte reconhece, o próprio tag se reconhecido, ou o tag cru.
    fn source_value(&self, vocabulary: &Vocabulary, category: Category, tag: &str) -> String {
        let kind = match category {
            Category::Cuisine => VocabularyKind::Areas,
            Category::Ingredient => VocabularyKind::Ingredients,
            _ => VocabularyKind::Categories,
        };
        let known = vocabulary.get(kind);
        self.lexicon
            .keywords(category, tag)
            .unwrap_or_default()
            .iter()
            .find(|k| known.contains(k.as_str()))
            .cloned()
            .unwrap_or_else(|| tag.to_string())
    }

    fn fetch_detail(&self, id: &str) -> Option<MealDetail> {
        self.source.detail(id).unwrap_or_else(|e| {
            tracing::warn!(id, error = %e, "Detalhe falhou");
            None
        })
    }

    fn fetch_vocabulary(&self, session: &mut Session) {
        for kind in [VocabularyKind::Categories, VocabularyKind::Areas, VocabularyKind::Ingredients] {
            let values = self.source.vocabulary(kind).unwrap_or_else(|e| {
                tracing::warn!(kind = ?kind, error = %e, "Vocabulário indisponível");
                BTreeSet::new()
            });
            tracing::info!(kind = ?kind, count = values.len(), "Vocabulário carregado");
            session.vocabulary.set(kind, values);
        }
    }

    // ─── Prompts ───

    fn prompt_text<R: Rng + ?Sized>(
        &self,
        session: &Session,
        phase: Phase,
        record: Option<&QuestionRecord>,
        rng: &mut R,
    ) -> String {
        let base = record.map(|r| r.text.as_str()).unwrap_or(match phase {
            Phase::Primary => "Do you have a preferred cuisine and/or main ingredient in mind?",
            Phase::MealType => "Any specific category for your meal?",
            Phase::Dislikes => "Are there any ingredients or specific food types you'd like to avoid?",
            Phase::Dietary => "Any dietary restrictions?",
        });

        // Pergunta de sim/não não leva exemplos
        if record.is_some_and(|r| self.yes_no_category(r, phase).is_some()) {
            return base.to_string();
        }

        match phase {
            Phase::Primary => {
                let mut text = base.to_string();
                let cuisines = self.examples(Category::Cuisine, session.vocabulary.get(VocabularyKind::Areas), rng);
                let ingredients =
                    self.examples(Category::Ingredient, session.vocabulary.get(VocabularyKind::Ingredients), rng);
                if !cuisines.is_empty() {
                    text.push_str(&format!("\n(e.g., Cuisines: {})", cuisines.join(", ")));
                }
                if !ingredients.is_empty() {
                    text.push_str(&format!("\n(e.g., Ingredients: {})", ingredients.join(", ")));
                }
                text
            }
            Phase::MealType => {
                let source: Vec<String> = MEAL_TYPE_EXAMPLES.iter().map(|s| s.to_string()).collect();
                with_examples(base, &sample_examples(&source, EXAMPLES_PER_PROMPT, rng))
            }
            Phase::Dietary => {
                let source: Vec<String> = self.lexicon.all_tags(Category::Dietary).into_iter().collect();
                with_examples(base, &sample_examples(&source, EXAMPLES_PER_PROMPT, rng))
            }
            Phase::Dislikes => base.to_string(),
        }
    }

    /// Tags do léxico como exemplos; sem eles, valores do vocabulário.
    fn examples<R: Rng + ?Sized>(&self, category: Category, fallback: &BTreeSet<String>, rng: &mut R) -> Vec<String> {
        let mut source: Vec<String> = self.lexicon.all_tags(category).into_iter().collect();
        if source.is_empty() {
            source = fallback.iter().cloned().collect();
        }
        sample_examples(&source, EXAMPLES_PER_PROMPT, rng)
    }
}

/// Próxima secundária não respondida, ou a confirmação da busca.
fn next_phase(session: &Session) -> DialogueState {
    Phase::next_secondary(&session.answered)
        .map(DialogueState::Asking)
        .unwrap_or(DialogueState::ReadyToSearch)
}

fn plural(category: Category) -> &'static str {
    match category {
        Category::Cuisine => "cuisines",
        Category::Ingredient => "ingredients",
        Category::MealType => "categories",
        Category::Dietary => "dietary options",
        Category::Dislikes => "dislikes",
        Category::Texture => "textures",
    }
}

/// `"cuisine: italian; ingredient: chicken, rice"`
fn describe(entries: &[(Category, BTreeSet<Tag>)]) -> String {
    entries
        .iter()
        .map(|(category, tags)| {
            let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
            format!("{}: {}", category, tags.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn summary_text(prefs: &PreferenceStore) -> String {
    let mut lines = vec!["Okay, I have your preferences:".to_string()];
    for (category, tags) in prefs.summary() {
        if category == Category::Dislikes {
            continue;
        }
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        lines.push(format!("- {}: {}", title_case(category.key()), tags.join(", ")));
    }
    if let Some(dislikes) = prefs.get(Category::Dislikes) {
        let tags: Vec<&str> = dislikes.iter().map(String::as_str).collect();
        lines.push(format!("- Avoiding: {}", tags.join(", ")));
    }
    if prefs.is_empty() {
        lines.push("(No preferences specified yet.)".to_string());
    }
    lines.join("\n")
}

fn render_detail(detail: &MealDetail) -> String {
    let mut lines = vec![
        format!("--- {} ---", detail.name),
        format!("Category: {}, Area: {}", detail.category, detail.area),
    ];
    if !detail.tags.is_empty() {
        lines.push(format!("Tags: {}", detail.tags.join(",")));
    }

    lines.push(String::new());
    lines.push("Ingredients:".to_string());
    for ingredient in &detail.ingredients {
        match &ingredient.measure {
            Some(measure) => lines.push(format!("- {} {}", measure, ingredient.name)),
            None => lines.push(format!("- {}", ingredient.name)),
        }
    }

    lines.push(String::new());
    lines.push("Instructions:".to_string());
    lines.extend(
        detail
            .instructions
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    );

    if let Some(youtube) = &detail.youtube {
        lines.push(String::new());
        lines.push(format!("YouTube: {}", youtube));
    }
    if let Some(source) = &detail.source {
        lines.push(format!("Source: {}", source));
    }
    lines.join("\n")
}
