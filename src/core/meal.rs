//! # Refeições — Candidatos, Detalhes e Vocabulário da Fonte
//!
//! Dois níveis de informação sobre uma refeição:
//!
//! - [`MealSummary`]: resultado barato de uma busca (id + nome)
//! - [`MealDetail`]: registro completo (ingredientes, área, categoria...),
//!   buscado sob demanda pelo [`CandidateFilter`](crate::filter::CandidateFilter)
//!
//! Resumos são descartados após cada filtragem; detalhes vivem só no cache
//! de uma chamada de filtro.

use std::collections::BTreeSet;

/// Resultado grosseiro de uma busca.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MealSummary {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
}

/// Um ingrediente e sua medida (ex: `"chicken broth"`, `"1 cup"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub measure: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), measure: None }
    }
}

/// Registro completo de uma refeição.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MealDetail {
    pub id: String,
    pub name: String,
    pub category: String,
    pub area: String,
    pub tags: Vec<String>,
    pub instructions: String,
    pub ingredients: Vec<Ingredient>,
    pub youtube: Option<String>,
    pub source: Option<String>,
}

impl MealDetail {
    /// Nomes dos ingredientes em lowercase, sem linhas vazias.
    ///
    /// São as "linhas de ingrediente" que os predicados do filtro varrem.
    pub fn ingredient_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.ingredients
            .iter()
            .map(|i| i.name.trim().to_lowercase())
            .filter(|line| !line.is_empty())
    }

    /// Resumo equivalente, usado quando o candidato veio de `random`.
    pub fn summary(&self) -> MealSummary {
        MealSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            thumbnail: None,
        }
    }
}

/// Qual lista de valores reconhecidos pela fonte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VocabularyKind {
    Categories,
    Areas,
    Ingredients,
}

/// Valores que a fonte externa realmente reconhece, em lowercase.
///
/// Usado para traduzir tags em valores de busca e para validar os
/// filtros secundários de área/categoria.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    pub categories: BTreeSet<String>,
    pub areas: BTreeSet<String>,
    pub ingredients: BTreeSet<String>,
}

impl Vocabulary {
    pub fn get(&self, kind: VocabularyKind) -> &BTreeSet<String> {
        match kind {
            VocabularyKind::Categories => &self.categories,
            VocabularyKind::Areas => &self.areas,
            VocabularyKind::Ingredients => &self.ingredients,
        }
    }

    pub fn set(&mut self, kind: VocabularyKind, values: BTreeSet<String>) {
        let values = values.into_iter().map(|v| v.trim().to_lowercase()).collect();
        match kind {
            VocabularyKind::Categories => self.categories = values,
            VocabularyKind::Areas => self.areas = values,
            VocabularyKind::Ingredients => self.ingredients = values,
        }
    }

    /// `true` se alguma das três listas está vazia (carga parcial).
    pub fn is_incomplete(&self) -> bool {
        self.categories.is_empty() || self.areas.is_empty() || self.ingredients.is_empty()
    }
}
