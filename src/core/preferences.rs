//! # PreferenceStore — As Preferências Acumuladas da Sessão
//!
//! O [`PreferenceStore`] guarda, por categoria, os tags que o usuário
//! já expressou. Só o [`DialogueController`](crate::dialogue::DialogueController)
//! o modifica, sempre em resposta a um [`ParseResult`](crate::nlu::ParseResult).
//!
//! ## Invariante
//!
//! Um tag **nunca** está ao mesmo tempo em `dislikes` e numa categoria
//! positiva:
//!
//! ```text
//! negate("mushroom")          merge(Ingredient, {"mushroom"})
//!   dislikes   += mushroom      ingredient += mushroom
//!   ingredient -= mushroom      dislikes   -= mushroom
//! ```
//!
//! A última declaração do usuário vence.

use std::collections::{BTreeMap, BTreeSet};

use super::category::{Category, Tag};

/// Resultado de um [`PreferenceStore::merge`].
///
/// `ambiguous` é o sinal de "preferência ambígua": a categoria é de valor
/// único e agora tem mais de um tag. Não é um erro: o diálogo consome o
/// sinal entrando no estado de esclarecimento.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Conjunto resultante na categoria após a união.
    pub tags: BTreeSet<Tag>,
    /// Conjunto anterior, usado para desfazer um esclarecimento sem sucesso.
    pub previous: BTreeSet<Tag>,
    pub ambiguous: bool,
}

/// Registro mutável das preferências de uma sessão.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreferenceStore {
    tags: BTreeMap<Category, BTreeSet<Tag>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Une `incoming` aos tags da categoria.
    ///
    /// - Tags positivos que estavam em `dislikes` saem de lá.
    /// - Mesclar em [`Category::Dislikes`] equivale a chamar [`negate`](Self::negate)
    ///   para cada tag.
    pub fn merge<I>(&mut self, category: Category, incoming: I) -> MergeOutcome
    where
        I: IntoIterator<Item = Tag>,
    {
        let previous = self.tags.get(&category).cloned().unwrap_or_default();

        if category == Category::Dislikes {
            for tag in incoming {
                self.negate(&tag);
            }
            let tags = self.tags.get(&category).cloned().unwrap_or_default();
            return MergeOutcome { tags, previous, ambiguous: false };
        }

        let mut added = Vec::new();
        let entry = self.tags.entry(category).or_default();
        for tag in incoming {
            if entry.insert(tag.clone()) {
                added.push(tag);
            }
        }
        let tags = entry.clone();

        if let Some(dislikes) = self.tags.get_mut(&Category::Dislikes) {
            for tag in &added {
                if dislikes.remove(tag) {
                    tracing::debug!(tag = %tag, "Tag saiu de dislikes após preferência positiva");
                }
            }
        }

        let ambiguous = category.is_single_valued() && tags.len() > 1;
        MergeOutcome { tags, previous, ambiguous }
    }

    /// Remove um tag de uma categoria. Retorna `true` se ele estava lá.
    pub fn remove(&mut self, category: Category, tag: &str) -> bool {
        self.tags
            .get_mut(&category)
            .map(|tags| tags.remove(tag))
            .unwrap_or(false)
    }

    /// Substitui o conteúdo de uma categoria (usado pelo esclarecimento).
    pub fn replace(&mut self, category: Category, tags: BTreeSet<Tag>) {
        self.tags.insert(category, tags);
    }

    /// Marca `tag` como rejeitado.
    ///
    /// Adiciona a `dislikes` e remove de toda categoria positiva que o
    /// contenha. Retorna as categorias afetadas, para a mensagem de
    /// confirmação ao usuário. Idempotente: a segunda chamada não afeta nada.
    pub fn negate(&mut self, tag: &str) -> Vec<Category> {
        let mut affected = Vec::new();
        for category in Category::POSITIVE {
            if self.remove(category, tag) {
                affected.push(category);
            }
        }
        self.tags
            .entry(Category::Dislikes)
            .or_default()
            .insert(tag.to_string());
        affected
    }

    /// Tags de uma categoria, se houver algum.
    pub fn get(&self, category: Category) -> Option<&BTreeSet<Tag>> {
        self.tags.get(&category).filter(|tags| !tags.is_empty())
    }

    /// O tag da categoria quando ela tem **exatamente** um.
    pub fn single(&self, category: Category) -> Option<&Tag> {
        match self.get(category) {
            Some(tags) if tags.len() == 1 => tags.iter().next(),
            _ => None,
        }
    }

    pub fn contains(&self, category: Category, tag: &str) -> bool {
        self.get(category).is_some_and(|tags| tags.contains(tag))
    }

    /// `true` se alguma das categorias tem ao menos um tag.
    pub fn has_any(&self, categories: &[Category]) -> bool {
        categories.iter().any(|c| self.get(*c).is_some())
    }

    /// Só as categorias não vazias, em ordem, para exibição.
    pub fn summary(&self) -> Vec<(Category, &BTreeSet<Tag>)> {
        self.tags
            .iter()
            .filter(|(_, tags)| !tags.is_empty())
            .map(|(category, tags)| (*category, tags))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.summary().is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<Tag> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_single_tag_is_never_ambiguous() {
        let mut store = PreferenceStore::new();
        let outcome = store.merge(Category::Cuisine, tags(&["italian"]));
        assert!(!outcome.ambiguous);
        // Mesmo tag de novo continua com um só valor
        let outcome = store.merge(Category::Cuisine, tags(&["italian"]));
        assert!(!outcome.ambiguous);
        assert_eq!(outcome.tags.len(), 1);
    }

    #[test]
    fn merge_two_tags_on_single_valued_is_ambiguous() {
        let mut store = PreferenceStore::new();
        let outcome = store.merge(Category::Cuisine, tags(&["italian", "mexican"]));
        assert!(outcome.ambiguous);
        assert!(outcome.previous.is_empty());
    }

    #[test]
    fn merge_on_multi_valued_is_not_ambiguous() {
        let mut store = PreferenceStore::new();
        let outcome = store.merge(Category::Dietary, tags(&["vegan", "gluten_free"]));
        assert!(!outcome.ambiguous);
        assert_eq!(outcome.tags.len(), 2);
    }

    #[test]
    fn negate_removes_from_positive_and_is_idempotent() {
        let mut store = PreferenceStore::new();
        store.merge(Category::Ingredient, tags(&["mushroom"]));
        store.merge(Category::Texture, tags(&["mushroom"]));

        let affected = store.negate("mushroom");
        assert_eq!(affected, vec![Category::Ingredient, Category::Texture]);
        let after_once = store.clone();

        let affected = store.negate("mushroom");
        assert!(affected.is_empty());
        assert_eq!(store, after_once);
        assert!(store.contains(Category::Dislikes, "mushroom"));
        assert!(store.get(Category::Ingredient).is_none());
    }

    #[test]
    fn positive_merge_clears_dislike() {
        let mut store = PreferenceStore::new();
        store.negate("chicken");
        store.merge(Category::Ingredient, tags(&["chicken"]));
        assert!(!store.contains(Category::Dislikes, "chicken"));
        assert!(store.contains(Category::Ingredient, "chicken"));
    }

    #[test]
    fn merge_into_dislikes_negates() {
        let mut store = PreferenceStore::new();
        store.merge(Category::Cuisine, tags(&["italian"]));
        let outcome = store.merge(Category::Dislikes, tags(&["italian"]));
        assert!(outcome.tags.contains("italian"));
        assert!(store.get(Category::Cuisine).is_none());
    }

    #[test]
    fn summary_skips_empty_categories() {
        let mut store = PreferenceStore::new();
        store.merge(Category::Cuisine, tags(&["italian"]));
        store.remove(Category::Cuisine, "italian");
        store.merge(Category::Dietary, tags(&["vegan"]));
        let summary = store.summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].0, Category::Dietary);
        assert_eq!(store.single(Category::Dietary).map(String::as_str), Some("vegan"));
    }
}
