//! # Intenção (Intent) de uma Resposta
//!
//! | Intent | Significado | Exemplo |
//! |--------|-------------|---------|
//! | [`Preference`](Intent::Preference) | Usuário declara o que quer | "pasta please" |
//! | [`Negation`](Intent::Negation) | Usuário rejeita algo que reconhecemos | "I don't want italian" |
//! | [`DislikeStatement`](Intent::DislikeStatement) | Menciona algo do mapa de dislikes | "I hate spicy food" |
//! | [`Question`](Intent::Question) | Usuário faz uma pergunta | "what is tagine?" |
//! | [`Unknown`](Intent::Unknown) | Nada a analisar (léxico vazio) | — |
//!
//! A pergunta é detectada **antes** de qualquer matching e encerra o parse.
//! As demais intenções são derivadas das entidades no final (ver
//! [`Intent::from_entities`]).

use serde::Serialize;

use super::entities::Entities;

/// Palavras que, como primeiro token, marcam uma pergunta.
pub const QUESTION_WORDS: &[&str] = &[
    "what", "who", "where", "when", "why", "how", "is", "are", "do", "does", "can", "could",
    "should", "would", "which",
];

/// Intenção classificada de uma resposta do usuário.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Preference,
    Negation,
    DislikeStatement,
    Question,
    Unknown,
}

impl Intent {
    /// Intenção implicada pelas entidades extraídas.
    ///
    /// `dislikes` tem precedência sobre `negated`; sem nenhum dos dois a
    /// resposta é uma preferência (mesmo sem entidades).
    pub fn from_entities(entities: &Entities) -> Self {
        if !entities.dislikes.is_empty() {
            Intent::DislikeStatement
        } else if !entities.negated.is_empty() {
            Intent::Negation
        } else {
            Intent::Preference
        }
    }
}

/// `true` se o texto (já em lowercase) termina com `?` ou começa com uma
/// palavra interrogativa.
pub fn is_question(text: &str, first_token: Option<&str>) -> bool {
    text.trim_end().ends_with('?') || first_token.is_some_and(|t| QUESTION_WORDS.contains(&t))
}
