//! # Banco de Perguntas — O Texto de Cada Fase da Entrevista
//!
//! O [`QuestionBank`] guarda os registros carregados do arquivo de
//! perguntas e escolhe qual texto exibir em cada fase:
//!
//! ```text
//! Fase Primary   → registros "initial"   com category ∈ {cuisine, ingredient}
//! Fase MealType  → registros "secondary" com category = "category"
//! Fase Dislikes  → registros "secondary" com category = "dislikes"
//! Fase Dietary   → registros "secondary" com category = "dietary"
//! ```
//!
//! Havendo vários registros para a mesma fase, um é sorteado a cada
//! pergunta. Sem nenhum, o controlador usa um texto embutido.
//!
//! ## `positive_tag`
//!
//! Um registro do tipo sim/não ("Are you in the mood for a dessert?")
//! carrega o tag implicado por um "yes". O controlador só o aplica se o
//! tag existir no léxico, na categoria do registro.
//!
//! ## Carga Tolerante
//!
//! Um registro malformado (campo obrigatório ausente, fase desconhecida)
//! é descartado com `warn`; só um documento que não seja lista é fatal.

use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::core::Category;
use crate::error::ConfigError;

/// Momento da entrevista em que a pergunta é feita.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPhase {
    Initial,
    Secondary,
}

/// Um registro do arquivo de perguntas.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct QuestionRecord {
    pub text: String,
    pub positive_tag: String,
    #[serde(default)]
    pub negative_tag: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    pub phase: QuestionPhase,
}

/// Perguntas carregadas, na ordem do arquivo.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
    records: Vec<QuestionRecord>,
}

impl QuestionBank {
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        Self { records }
    }

    /// Constrói o banco a partir do documento JSON.
    ///
    /// # Erros
    ///
    /// [`ConfigError::Shape`] se o documento não for uma lista.
    pub fn from_value(value: Value, origin: &Path) -> Result<Self, ConfigError> {
        let Value::Array(items) = value else {
            return Err(ConfigError::Shape {
                path: origin.to_path_buf(),
                detail: "esperada uma lista de perguntas".to_string(),
            });
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<QuestionRecord>(item) {
                Ok(record) if record.text.trim().is_empty() || record.positive_tag.trim().is_empty() => {
                    tracing::warn!(index, "Pergunta com texto ou positive_tag vazio, ignorando");
                }
                Ok(mut record) => {
                    record.positive_tag = record.positive_tag.trim().to_lowercase();
                    record.negative_tag = record.negative_tag.map(|t| t.trim().to_lowercase());
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Pergunta malformada, ignorando");
                }
            }
        }

        tracing::debug!(count = records.len(), "Perguntas carregadas");
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registros de uma fase cuja categoria está em `categories`.
    pub fn matching(&self, phase: QuestionPhase, categories: &[Category]) -> Vec<&QuestionRecord> {
        self.records
            .iter()
            .filter(|r| r.phase == phase)
            .filter(|r| r.category.is_some_and(|c| categories.contains(&c)))
            .collect()
    }

    /// Sorteia um registro para a fase, se houver algum.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        phase: QuestionPhase,
        categories: &[Category],
        rng: &mut R,
    ) -> Option<&QuestionRecord> {
        self.matching(phase, categories).choose(rng).copied()
    }
}

/// Até `limit` exemplos sorteados, formatados para exibição
/// (`"gluten_free"` → `"Gluten Free"`).
pub fn sample_examples<R: Rng + ?Sized>(source: &[String], limit: usize, rng: &mut R) -> Vec<String> {
    source
        .choose_multiple(rng, limit.min(source.len()))
        .map(|e| title_case(&e.replace('_', " ")))
        .collect()
}

/// Acrescenta `" (e.g., A, B)"` ao texto base quando há exemplos.
pub fn with_examples(base: &str, examples: &[String]) -> String {
    if examples.is_empty() {
        base.to_string()
    } else {
        format!("{} (e.g., {})", base, examples.join(", "))
    }
}

pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn origin() -> &'static Path {
        Path::new("questions.json")
    }

    #[test]
    fn skips_malformed_records() {
        let bank = QuestionBank::from_value(
            json!([
                { "text": "Any dietary restrictions?", "positive_tag": "dietary",
                  "category": "dietary", "phase": "secondary" },
                { "text": "Missing tag", "phase": "secondary" },
                { "text": "Bad phase", "positive_tag": "x", "phase": "later" },
                { "text": "Craving dessert?", "positive_tag": "Dessert",
                  "category": "category", "phase": "secondary" }
            ]),
            origin(),
        )
        .unwrap();

        assert_eq!(bank.len(), 2);
        let meal_type = bank.matching(QuestionPhase::Secondary, &[Category::MealType]);
        assert_eq!(meal_type.len(), 1);
        assert_eq!(meal_type[0].positive_tag, "dessert");
    }

    #[test]
    fn non_array_document_is_fatal() {
        let err = QuestionBank::from_value(json!({ "text": "hi" }), origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Shape { .. }));
    }

    #[test]
    fn pick_respects_phase_and_category() {
        let bank = QuestionBank::from_value(
            json!([
                { "text": "Cuisine?", "positive_tag": "cuisine", "category": "cuisine", "phase": "initial" },
                { "text": "Dietary?", "positive_tag": "dietary", "category": "dietary", "phase": "secondary" }
            ]),
            origin(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let record = bank
            .pick(QuestionPhase::Initial, &[Category::Cuisine, Category::Ingredient], &mut rng)
            .unwrap();
        assert_eq!(record.text, "Cuisine?");
        assert!(bank.pick(QuestionPhase::Initial, &[Category::Dietary], &mut rng).is_none());
    }

    #[test]
    fn examples_are_title_cased_and_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let source = vec!["gluten_free".to_string(), "vegan".to_string()];
        let mut examples = sample_examples(&source, 5, &mut rng);
        examples.sort();
        assert_eq!(examples, vec!["Gluten Free", "Vegan"]);
        assert_eq!(with_examples("Any?", &[]), "Any?");
        assert_eq!(with_examples("Any?", &["Vegan".into()]), "Any? (e.g., Vegan)");
    }
}
