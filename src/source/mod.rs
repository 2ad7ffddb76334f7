//! # Fonte de Refeições
//!
//! O [`MealSource`] é a fronteira com o serviço externo de receitas. O
//! diálogo só conhece este trait; o [`MealDbClient`] é a implementação
//! HTTP e os testes usam fontes roteirizadas em memória.
//!
//! | Operação | Retorna | Vazio quando |
//! |----------|---------|--------------|
//! | [`search`](MealSource::search) | resumos | nenhum resultado para o critério |
//! | [`detail`](MealSource::detail) | registro completo | id desconhecido |
//! | [`random`](MealSource::random) | registro completo | — |
//! | [`vocabulary`](MealSource::vocabulary) | valores reconhecidos | lista indisponível |
//!
//! Toda falha é um [`SourceError`]; quem chama decide degradá-la para
//! "sem resultados".

pub mod mealdb;

use std::collections::BTreeSet;
use std::fmt;

use crate::core::{Category, MealDetail, MealSummary, VocabularyKind};
use crate::error::SourceError;

pub use mealdb::MealDbClient;

/// Critério único de busca aceito pela fonte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchCriteria {
    Area(String),
    Ingredient(String),
    Category(String),
}

impl SearchCriteria {
    /// Critério correspondente a uma categoria primária de preferência.
    pub fn for_category(category: Category, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        match category {
            Category::Cuisine => Some(Self::Area(value)),
            Category::Ingredient => Some(Self::Ingredient(value)),
            Category::MealType => Some(Self::Category(value)),
            _ => None,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Area(v) | Self::Ingredient(v) | Self::Category(v) => v,
        }
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Area(v) => write!(f, "cuisine '{}'", v),
            Self::Ingredient(v) => write!(f, "ingredient '{}'", v),
            Self::Category(v) => write!(f, "category '{}'", v),
        }
    }
}

/// Serviço externo de refeições.
pub trait MealSource {
    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<MealSummary>, SourceError>;

    fn detail(&self, id: &str) -> Result<Option<MealDetail>, SourceError>;

    fn random(&self) -> Result<Option<MealDetail>, SourceError>;

    fn vocabulary(&self, kind: VocabularyKind) -> Result<BTreeSet<String>, SourceError>;
}
