//! # CandidateFilter — Refinando os Resultados da Busca
//!
//! A fonte externa só busca por **um** critério de cada vez (área,
//! ingrediente ou categoria). Todo o resto das preferências é aplicado
//! aqui, inspecionando o registro completo de cada candidato.
//!
//! ## Quando Inspecionar?
//!
//! Buscar o detalhe custa uma requisição por candidato, então só
//! inspecionamos quando alguma condição exige:
//!
//! ```text
//! force_detail?                               → inspeciona
//! dislikes ou dietary não vazios?             → inspeciona
//! cuisine/category/ingredient com tag, mas
//!   não foi o critério da busca (secundário)? → inspeciona
//! nenhum dos anteriores                       → devolve a lista intacta
//! ```
//!
//! ## Inspeção
//!
//! Para cada candidato (detalhe em cache por id, só durante a chamada):
//!
//! 1. detalhe indisponível → exclui
//! 2. [`check_dislikes`] → exclui
//! 3. [`DietaryRuleSet::check_dietary_restrictions`] → exclui
//! 4. cuisine/category secundário: área/categoria fora dos valores esperados → exclui
//! 5. ingredient secundário: nenhuma linha menciona o ingrediente → exclui
//!
//! Os valores esperados de um tag secundário são suas palavras-chave que a
//! fonte reconhece (o [`Vocabulary`]); sem nenhuma, o próprio texto do tag.

pub mod rules;

use std::collections::{BTreeSet, HashMap};

use crate::core::{Category, MealDetail, MealSummary, PreferenceStore, TagLexicon, Vocabulary, VocabularyKind};

pub use rules::{check_dislikes, dislike_set, DietaryRuleSet, KeywordSet};

/// Como a lista de candidatos foi obtida.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Inspeciona mesmo sem preferências que exijam (sugestões aleatórias).
    pub force_detail: bool,
    /// Categoria usada na busca; esta não é re-verificada.
    pub primary_search: Option<Category>,
}

/// Filtro de candidatos sobre um léxico e o vocabulário da fonte.
pub struct CandidateFilter<'a> {
    lexicon: &'a TagLexicon,
    vocabulary: &'a Vocabulary,
    dietary: DietaryRuleSet,
}

/// Verificações montadas uma vez por chamada a partir das preferências.
struct Checks<'p> {
    dislikes: KeywordSet,
    cuisine: Option<BTreeSet<String>>,
    category: Option<BTreeSet<String>>,
    ingredient: Option<(&'p str, KeywordSet)>,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(lexicon: &'a TagLexicon, vocabulary: &'a Vocabulary) -> Self {
        Self { lexicon, vocabulary, dietary: DietaryRuleSet::new(lexicon) }
    }

    /// Alguma preferência exige olhar o registro completo?
    pub fn needs_inspection(&self, prefs: &PreferenceStore, options: FilterOptions) -> bool {
        options.force_detail
            || prefs.has_any(&[Category::Dislikes, Category::Dietary])
            || Category::PRIMARY
                .iter()
                .any(|c| prefs.get(*c).is_some() && options.primary_search != Some(*c))
    }

    /// Mantém apenas os candidatos compatíveis com as preferências.
    ///
    /// `fetch_detail` devolve `None` quando o detalhe não pôde ser obtido;
    /// o candidato é então excluído. A ordem de entrada é preservada.
    pub fn filter<F>(
        &self,
        candidates: Vec<MealSummary>,
        prefs: &PreferenceStore,
        mut fetch_detail: F,
        options: FilterOptions,
    ) -> Vec<MealSummary>
    where
        F: FnMut(&str) -> Option<MealDetail>,
    {
        if candidates.is_empty() || !self.needs_inspection(prefs, options) {
            return candidates;
        }

        tracing::info!(count = candidates.len(), "Filtrando candidatos (inspecionando detalhes)");
        let total = candidates.len();
        let checks = self.checks(prefs, options);
        let mut cache: HashMap<String, MealDetail> = HashMap::new();
        let mut kept = Vec::new();

        for candidate in candidates {
            if !cache.contains_key(&candidate.id) {
                match fetch_detail(&candidate.id) {
                    Some(detail) => {
                        cache.insert(candidate.id.clone(), detail);
                    }
                    None => {
                        tracing::warn!(id = %candidate.id, "Detalhe indisponível, excluindo candidato");
                        continue;
                    }
                }
            }
            let Some(detail) = cache.get(&candidate.id) else {
                continue;
            };

            if self.passes(detail, prefs, &checks) {
                kept.push(candidate);
            }
        }

        tracing::info!(total, kept = kept.len(), "Filtragem concluída");
        kept
    }

    /// O candidato passa por todas as verificações?
    pub fn admits(&self, detail: &MealDetail, prefs: &PreferenceStore, options: FilterOptions) -> bool {
        self.passes(detail, prefs, &self.checks(prefs, options))
    }

    fn checks<'p>(&self, prefs: &'p PreferenceStore, options: FilterOptions) -> Checks<'p> {
        let secondary = move |category: Category| {
            (options.primary_search != Some(category))
                .then(|| prefs.single(category))
                .flatten()
        };

        Checks {
            dislikes: dislike_set(prefs, self.lexicon),
            cuisine: secondary(Category::Cuisine)
                .map(|tag| self.expected_values(Category::Cuisine, tag, VocabularyKind::Areas)),
            category: secondary(Category::MealType)
                .map(|tag| self.expected_values(Category::MealType, tag, VocabularyKind::Categories)),
            ingredient: secondary(Category::Ingredient).map(|tag| {
                let keywords = self
                    .lexicon
                    .keywords(Category::Ingredient, tag)
                    .map(|k| k.to_vec())
                    .unwrap_or_else(|| vec![tag.to_lowercase()]);
                (tag.as_str(), KeywordSet::new(keywords.iter().map(String::as_str)))
            }),
        }
    }

    fn passes(&self, detail: &MealDetail, prefs: &PreferenceStore, checks: &Checks<'_>) -> bool {
        if check_dislikes(detail, &checks.dislikes) {
            return false;
        }
        if self.dietary.check_dietary_restrictions(detail, prefs) {
            return false;
        }

        if let Some(expected) = &checks.cuisine {
            if !expected.contains(&detail.area.trim().to_lowercase()) {
                tracing::debug!(meal = %detail.name, area = %detail.area, "Área não corresponde");
                return false;
            }
        }

        if let Some(expected) = &checks.category {
            if !expected.contains(&detail.category.trim().to_lowercase()) {
                tracing::debug!(meal = %detail.name, category = %detail.category, "Categoria não corresponde");
                return false;
            }
        }

        if let Some((tag, set)) = &checks.ingredient {
            if !detail.ingredient_lines().any(|line| set.matches(&line)) {
                tracing::debug!(meal = %detail.name, ingredient = %tag, "Ingrediente ausente");
                return false;
            }
        }

        true
    }

    /// Palavras-chave do tag reconhecidas pela fonte, ou o próprio tag.
    pub fn expected_values(&self, category: Category, tag: &str, kind: VocabularyKind) -> BTreeSet<String> {
        let known = self.vocabulary.get(kind);
        let mut expected: BTreeSet<String> = self
            .lexicon
            .keywords(category, tag)
            .unwrap_or_default()
            .iter()
            .filter(|k| known.contains(k.as_str()))
            .cloned()
            .collect();
        if expected.is_empty() {
            expected.insert(tag.to_lowercase());
        }
        expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ingredient;
    use serde_json::json;
    use std::cell::Cell;
    use std::path::Path;

    fn lexicon() -> TagLexicon {
        TagLexicon::from_value(
            json!({
                "cuisine": { "italian": ["italian", "pasta"], "british": ["english", "uk"] },
                "ingredient": { "chicken": ["chicken"], "eggs": ["egg", "eggs"] },
                "category": { "dessert": ["dessert", "sweet"] },
                "dietary": { "vegetarian": ["vegetarian"] },
                "known_meats": { "poultry": ["chicken", "turkey"] }
            }),
            Path::new("test.json"),
        )
        .unwrap()
    }

    fn vocabulary() -> Vocabulary {
        let mut vocab = Vocabulary::default();
        vocab.set(VocabularyKind::Areas, ["Italian", "British"].map(String::from).into());
        vocab.set(VocabularyKind::Categories, ["Dessert", "Chicken"].map(String::from).into());
        vocab.set(VocabularyKind::Ingredients, ["Chicken"].map(String::from).into());
        vocab
    }

    fn summary(id: &str) -> MealSummary {
        MealSummary { id: id.into(), name: format!("Meal {id}"), thumbnail: None }
    }

    fn detail(id: &str, area: &str, category: &str, lines: &[&str]) -> MealDetail {
        MealDetail {
            id: id.into(),
            name: format!("Meal {id}"),
            category: category.into(),
            area: area.into(),
            tags: vec![],
            instructions: String::new(),
            ingredients: lines.iter().map(|l| Ingredient::new(*l)).collect(),
            youtube: None,
            source: None,
        }
    }

    #[test]
    fn no_condition_returns_input_without_fetching() {
        let lex = lexicon();
        let vocab = vocabulary();
        let filter = CandidateFilter::new(&lex, &vocab);
        let mut prefs = PreferenceStore::new();
        prefs.merge(Category::Cuisine, vec!["italian".to_string()]);

        let calls = Cell::new(0);
        let input = vec![summary("1"), summary("2")];
        let output = filter.filter(
            input.clone(),
            &prefs,
            |_| {
                calls.set(calls.get() + 1);
                None
            },
            FilterOptions { force_detail: false, primary_search: Some(Category::Cuisine) },
        );
        assert_eq!(output, input);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn vegetarian_excludes_chicken_broth_keeps_vegetable_broth() {
        let lex = lexicon();
        let vocab = vocabulary();
        let filter = CandidateFilter::new(&lex, &vocab);
        let mut prefs = PreferenceStore::new();
        prefs.merge(Category::Dietary, vec!["vegetarian".to_string()]);

        let output = filter.filter(
            vec![summary("1"), summary("2")],
            &prefs,
            |id| match id {
                "1" => Some(detail("1", "British", "Side", &["2 cups vegetable broth", "1 onion"])),
                _ => Some(detail("2", "British", "Side", &["1 cup chicken broth"])),
            },
            FilterOptions::default(),
        );
        assert_eq!(output, vec![summary("1")]);
    }

    #[test]
    fn unavailable_detail_excludes_and_cache_avoids_refetch() {
        let lex = lexicon();
        let vocab = vocabulary();
        let filter = CandidateFilter::new(&lex, &vocab);
        let prefs = PreferenceStore::new();

        let calls = Cell::new(0);
        let output = filter.filter(
            vec![summary("1"), summary("1"), summary("2")],
            &prefs,
            |id| {
                calls.set(calls.get() + 1);
                (id == "1").then(|| detail("1", "British", "Side", &["potato"]))
            },
            FilterOptions { force_detail: true, primary_search: None },
        );
        assert_eq!(output, vec![summary("1"), summary("1")]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn secondary_cuisine_uses_vocabulary_keywords() {
        let lex = lexicon();
        let vocab = vocabulary();
        let filter = CandidateFilter::new(&lex, &vocab);
        let mut prefs = PreferenceStore::new();
        prefs.merge(Category::Cuisine, vec!["italian".to_string()]);
        let options = FilterOptions { force_detail: false, primary_search: Some(Category::Ingredient) };

        assert!(filter.admits(&detail("1", "Italian", "Pasta", &[]), &prefs, options));
        assert!(!filter.admits(&detail("2", "French", "Pasta", &[]), &prefs, options));
    }

    #[test]
    fn secondary_tag_outside_vocabulary_falls_back_to_raw_text() {
        let lex = lexicon();
        let vocab = vocabulary();
        let filter = CandidateFilter::new(&lex, &vocab);

        // "english"/"uk" não estão nas áreas: o esperado é o próprio tag
        assert_eq!(
            filter.expected_values(Category::Cuisine, "british", VocabularyKind::Areas),
            BTreeSet::from(["british".to_string()])
        );
        assert_eq!(
            filter.expected_values(Category::MealType, "dessert", VocabularyKind::Categories),
            BTreeSet::from(["dessert".to_string()])
        );
    }

    #[test]
    fn secondary_ingredient_must_appear_in_lines() {
        let lex = lexicon();
        let vocab = vocabulary();
        let filter = CandidateFilter::new(&lex, &vocab);
        let mut prefs = PreferenceStore::new();
        prefs.merge(Category::Ingredient, vec!["chicken".to_string()]);
        let options = FilterOptions { force_detail: false, primary_search: Some(Category::Cuisine) };

        assert!(filter.needs_inspection(&prefs, options));
        assert!(filter.admits(&detail("1", "Italian", "Chicken", &["Chicken Thighs"]), &prefs, options));
        assert!(!filter.admits(&detail("2", "Italian", "Pasta", &["penne"]), &prefs, options));
    }

    #[test]
    fn ambiguous_primary_category_is_not_a_secondary_check() {
        let lex = lexicon();
        let vocab = vocabulary();
        let filter = CandidateFilter::new(&lex, &vocab);
        let mut prefs = PreferenceStore::new();
        prefs.merge(Category::Cuisine, vec!["italian".to_string(), "british".to_string()]);
        let options = FilterOptions { force_detail: true, primary_search: None };

        // Dois tags: nenhum é "o" tag secundário, então a área não filtra
        assert!(filter.admits(&detail("1", "French", "Side", &[]), &prefs, options));
    }
}
