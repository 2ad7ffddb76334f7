//! # Regras de Exclusão — Dieta e Aversões
//!
//! Os predicados que decidem se um candidato **viola** as preferências.
//! Ambos devolvem `true` para "excluir".
//!
//! ## Tabela de Regras Dietéticas
//!
//! Cada restrição é uma [`DietaryRule`] nomeada, avaliada em ordem:
//!
//! | Regra | Disparada por | Palavras-chave | Exceções |
//! |-------|---------------|----------------|----------|
//! | `meat` | vegetarian, vegan | `known_meats` | `vegetable_broth` |
//! | `dairy` | vegan, dairy_free | `known_dairy` | `dairy_free_qualifier` |
//! | `eggs` | vegan | tag `eggs` de `ingredient` | — |
//! | `gluten` | gluten_free | `known_gluten` | `gluten_free_qualifier`, `tamari`, `certified_oats` |
//!
//! ## Avaliação por Linha de Ingrediente
//!
//! ```text
//! "1 cup chicken broth"      + vegetarian
//!   ├── "chicken" ∈ known_meats (fronteira de palavra)  → candidato a violação
//!   └── vegetable_broth casa?  não                      → VIOLA
//!
//! "2 cups vegetable broth"   + vegetarian
//!   ├── "broth"? só se estiver em known_meats
//!   └── vegetable_broth casa?  sim                      → ok
//! ```
//!
//! Uma exceção com `scope` só vale para linhas que casam o escopo:
//! `tamari` só perdoa linhas com "soy sauce", `certified_oats` só perdoa
//! linhas com aveia. Entre as com escopo, vale a primeira que casa, na
//! ordem da tabela.
//!
//! As regex são compiladas uma vez por léxico em [`DietaryRuleSet::new`].

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::core::{Category, KnownGroup, MealDetail, PreferenceStore, TagLexicon};

/// De onde vêm as palavras-chave que violam uma regra.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordSource {
    Known(KnownGroup),
    /// Palavras-chave de um tag da categoria `ingredient`.
    IngredientTag(&'static str),
}

/// Contexto em que uma linha **não** viola, apesar da palavra-chave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exception {
    pub name: &'static str,
    /// Só avaliada em linhas que casam este padrão.
    pub scope: Option<&'static str>,
    pub pattern: &'static str,
}

/// Uma restrição dietética nomeada.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DietaryRule {
    pub name: &'static str,
    pub triggered_by: &'static [&'static str],
    pub keywords: KeywordSource,
    pub exceptions: &'static [Exception],
}

pub const VEGETABLE_BROTH: Exception = Exception {
    name: "vegetable_broth",
    scope: None,
    pattern: r"\b(vegetarian|vegetable|veggie)\s+(broth|stock|bouillon)\b",
};

pub const DAIRY_FREE_QUALIFIER: Exception = Exception {
    name: "dairy_free_qualifier",
    scope: None,
    pattern: r"\b(dairy[- ]?free|lactose[- ]?free)\b",
};

pub const GLUTEN_FREE_QUALIFIER: Exception = Exception {
    name: "gluten_free_qualifier",
    scope: None,
    pattern: r"\bgluten[- ]?free\b",
};

pub const TAMARI: Exception = Exception {
    name: "tamari",
    scope: Some(r"soy sauce"),
    pattern: r"\b(tamari|gluten[- ]?free soy sauce)\b",
};

pub const CERTIFIED_OATS: Exception = Exception {
    name: "certified_oats",
    scope: Some(r"\b(oat|oats)\b"),
    pattern: r"\b(gluten[- ]?free oat|certified gluten[- ]?free)\b",
};

/// Tabela ordenada de regras dietéticas.
pub const DIETARY_RULES: &[DietaryRule] = &[
    DietaryRule {
        name: "meat",
        triggered_by: &["vegetarian", "vegan"],
        keywords: KeywordSource::Known(KnownGroup::Meats),
        exceptions: &[VEGETABLE_BROTH],
    },
    DietaryRule {
        name: "dairy",
        triggered_by: &["vegan", "dairy_free"],
        keywords: KeywordSource::Known(KnownGroup::Dairy),
        exceptions: &[DAIRY_FREE_QUALIFIER],
    },
    DietaryRule {
        name: "eggs",
        triggered_by: &["vegan"],
        keywords: KeywordSource::IngredientTag("eggs"),
        exceptions: &[],
    },
    DietaryRule {
        name: "gluten",
        triggered_by: &["gluten_free"],
        keywords: KeywordSource::Known(KnownGroup::Gluten),
        exceptions: &[GLUTEN_FREE_QUALIFIER, TAMARI, CERTIFIED_OATS],
    },
];

/// Conjunto de palavras-chave compilado em uma única regex com
/// fronteiras de palavra: `\b(?:chicken broth|chicken|beef)\b`.
#[derive(Debug)]
pub struct KeywordSet {
    re: Option<Regex>,
}

impl KeywordSet {
    pub fn new<'k, I>(keywords: I) -> Self
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut words: Vec<&str> = keywords
            .into_iter()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if words.is_empty() {
            return Self { re: None };
        }
        // Mais longas primeiro para a alternação preferir a frase inteira
        words.sort_by_key(|w| std::cmp::Reverse(w.len()));

        let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
        let re = case_insensitive(&format!(r"\b(?:{})\b", alternation));
        Self { re }
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_none()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(text))
    }
}

fn case_insensitive(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(error = %e, "Padrão de filtro inválido, ignorando");
            None
        }
    }
}

/// Exceção com os padrões já compilados.
#[derive(Debug)]
struct CompiledException {
    name: &'static str,
    scope: Option<Regex>,
    pattern: Regex,
}

impl CompiledException {
    fn compile(exception: &Exception) -> Option<Self> {
        let scope = match exception.scope {
            Some(scope) => Some(case_insensitive(scope)?),
            None => None,
        };
        Some(Self { name: exception.name, scope, pattern: case_insensitive(exception.pattern)? })
    }

    fn in_scope(&self, line: &str) -> bool {
        self.scope.as_ref().map_or(true, |re| re.is_match(line))
    }
}

/// Regra com palavras-chave e exceções compiladas para um léxico.
#[derive(Debug)]
struct CompiledRule {
    rule: &'static DietaryRule,
    keywords: KeywordSet,
    exceptions: Vec<CompiledException>,
}

impl CompiledRule {
    /// A linha viola a regra? Palavra-chave presente e nenhuma exceção.
    ///
    /// Exceções sem escopo valem para qualquer linha. Das com escopo, só a
    /// primeira cujo escopo casa é consultada: uma linha com "soy sauce" e
    /// aveia precisa de tamari, o certificado da aveia não basta.
    fn violated_by(&self, line: &str) -> bool {
        if !self.keywords.matches(line) {
            return false;
        }
        let (unscoped, scoped): (Vec<_>, Vec<_>) = self.exceptions.iter().partition(|e| e.scope.is_none());
        let forgiven = unscoped
            .into_iter()
            .find(|e| e.pattern.is_match(line))
            .or_else(|| scoped.into_iter().find(|e| e.in_scope(line)).filter(|e| e.pattern.is_match(line)));

        match forgiven {
            Some(exception) => {
                tracing::trace!(rule = self.rule.name, exception = exception.name, line, "Exceção aplicada");
                false
            }
            None => true,
        }
    }
}

impl DietaryRule {
    pub fn is_triggered(&self, prefs: &PreferenceStore) -> bool {
        self.triggered_by.iter().any(|tag| prefs.contains(Category::Dietary, tag))
    }

    pub fn keyword_set(&self, lexicon: &TagLexicon) -> KeywordSet {
        match self.keywords {
            KeywordSource::Known(group) => {
                let words = lexicon.known_keywords(group);
                KeywordSet::new(words.iter().map(String::as_str))
            }
            KeywordSource::IngredientTag(tag) => KeywordSet::new(
                lexicon
                    .keywords(Category::Ingredient, tag)
                    .unwrap_or_default()
                    .iter()
                    .map(String::as_str),
            ),
        }
    }
}

/// [`DIETARY_RULES`] compiladas uma vez para um léxico.
#[derive(Debug)]
pub struct DietaryRuleSet {
    rules: Vec<CompiledRule>,
}

impl DietaryRuleSet {
    pub fn new(lexicon: &TagLexicon) -> Self {
        let rules = DIETARY_RULES
            .iter()
            .map(|rule| CompiledRule {
                rule,
                keywords: rule.keyword_set(lexicon),
                exceptions: rule.exceptions.iter().filter_map(CompiledException::compile).collect(),
            })
            .filter(|compiled| !compiled.keywords.is_empty())
            .collect();
        Self { rules }
    }

    /// `true` se algum ingrediente viola uma restrição dietética ativa.
    pub fn check_dietary_restrictions(&self, detail: &MealDetail, prefs: &PreferenceStore) -> bool {
        let active: Vec<&CompiledRule> = self.rules.iter().filter(|r| r.rule.is_triggered(prefs)).collect();
        if active.is_empty() {
            return false;
        }

        for line in detail.ingredient_lines() {
            if let Some(compiled) = active.iter().find(|r| r.violated_by(&line)) {
                tracing::debug!(meal = %detail.name, rule = compiled.rule.name, line = %line, "Restrição dietética violada");
                return true;
            }
        }
        false
    }
}

/// Palavras-chave de todos os tags em `dislikes`: do mapa `dislikes` e dos
/// mapas `ingredient`/`category`/`cuisine` (o próprio tag quando ausente).
pub fn dislike_keywords(prefs: &PreferenceStore, lexicon: &TagLexicon) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();
    let Some(disliked) = prefs.get(Category::Dislikes) else {
        return keywords;
    };

    for tag in disliked {
        if let Some(words) = lexicon.keywords(Category::Dislikes, tag) {
            keywords.extend(words.iter().cloned());
        }
        for category in [Category::Ingredient, Category::MealType, Category::Cuisine] {
            match lexicon.keywords(category, tag) {
                Some(words) => keywords.extend(words.iter().cloned()),
                None => {
                    keywords.insert(tag.to_lowercase());
                }
            }
        }
    }
    keywords
}

/// [`dislike_keywords`] compiladas em um único [`KeywordSet`].
pub fn dislike_set(prefs: &PreferenceStore, lexicon: &TagLexicon) -> KeywordSet {
    let keywords = dislike_keywords(prefs, lexicon);
    KeywordSet::new(keywords.iter().map(String::as_str))
}

/// `true` se um ingrediente, o nome ou a categoria da refeição menciona
/// algo que o usuário rejeitou (`dislikes` vem de [`dislike_set`]).
pub fn check_dislikes(detail: &MealDetail, dislikes: &KeywordSet) -> bool {
    if dislikes.is_empty() {
        return false;
    }

    let hit = detail.ingredient_lines().any(|line| dislikes.matches(&line))
        || dislikes.matches(&detail.name.to_lowercase())
        || dislikes.matches(&detail.category.to_lowercase());
    if hit {
        tracing::debug!(meal = %detail.name, "Refeição contém item rejeitado");
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ingredient;
    use serde_json::json;
    use std::path::Path;

    fn lexicon() -> TagLexicon {
        TagLexicon::from_value(
            json!({
                "ingredient": { "eggs": ["egg", "eggs"], "mushroom": ["mushroom", "mushrooms"] },
                "dislikes": { "spicy": ["chili", "cayenne"] },
                "known_meats": { "poultry": ["chicken", "turkey"], "beef": ["beef"] },
                "known_dairy": { "milk": ["milk", "butter"] },
                "known_gluten": { "wheat": ["flour", "soy sauce", "oats", "bread"] }
            }),
            Path::new("test.json"),
        )
        .unwrap()
    }

    fn meal(name: &str, lines: &[&str]) -> MealDetail {
        MealDetail {
            id: "1".into(),
            name: name.into(),
            category: "Miscellaneous".into(),
            area: "British".into(),
            tags: vec![],
            instructions: String::new(),
            ingredients: lines.iter().map(|l| Ingredient::new(*l)).collect(),
            youtube: None,
            source: None,
        }
    }

    fn violates(detail: &MealDetail, prefs: &PreferenceStore, lexicon: &TagLexicon) -> bool {
        DietaryRuleSet::new(lexicon).check_dietary_restrictions(detail, prefs)
    }

    fn prefs(dietary: &[&str]) -> PreferenceStore {
        let mut store = PreferenceStore::new();
        store.merge(Category::Dietary, dietary.iter().map(|s| s.to_string()));
        store
    }

    #[test]
    fn vegetable_broth_is_admitted_under_vegetarian() {
        let lex = lexicon();
        let vegetarian = prefs(&["vegetarian"]);
        assert!(!violates(
            &meal("Soup", &["2 cups vegetable broth", "1 onion"]),
            &vegetarian,
            &lex
        ));
        assert!(violates(&meal("Soup", &["1 cup chicken broth"]), &vegetarian, &lex));
    }

    #[test]
    fn vegetable_broth_exception_survives_meat_keyword_on_same_line() {
        let lex = TagLexicon::from_value(
            json!({ "known_meats": { "stock": ["broth", "chicken"] } }),
            Path::new("t.json"),
        )
        .unwrap();
        let vegetarian = prefs(&["vegetarian"]);
        assert!(!violates(&meal("Soup", &["veggie stock"]), &vegetarian, &lex));
        assert!(!violates(&meal("Soup", &["vegetable broth"]), &vegetarian, &lex));
        assert!(violates(&meal("Soup", &["beef broth"]), &vegetarian, &lex));
    }

    #[test]
    fn word_boundaries_prevent_partial_hits() {
        let lex = lexicon();
        // "beefsteak tomato" não contém a palavra "beef"
        assert!(!violates(&meal("Salad", &["beefsteak tomato"]), &prefs(&["vegan"]), &lex));
    }

    #[test]
    fn vegan_triggers_dairy_and_eggs() {
        let lex = lexicon();
        let vegan = prefs(&["vegan"]);
        assert!(violates(&meal("Cake", &["2 eggs"]), &vegan, &lex));
        assert!(violates(&meal("Cake", &["butter"]), &vegan, &lex));
        assert!(!violates(&meal("Cake", &["dairy-free butter"]), &vegan, &lex));
        // vegetariano não se importa com ovos
        assert!(!violates(&meal("Cake", &["2 eggs"]), &prefs(&["vegetarian"]), &lex));
    }

    #[test]
    fn gluten_exceptions_are_scoped() {
        let lex = lexicon();
        let gf = prefs(&["gluten_free"]);
        assert!(violates(&meal("Stir fry", &["soy sauce"]), &gf, &lex));
        assert!(!violates(&meal("Stir fry", &["soy sauce (tamari)"]), &gf, &lex));
        assert!(violates(&meal("Porridge", &["rolled oats"]), &gf, &lex));
        assert!(!violates(
            &meal("Porridge", &["certified gluten free rolled oats"]),
            &gf,
            &lex
        ));
        assert!(!violates(&meal("Bread", &["gluten-free flour"]), &gf, &lex));
        // tamari não perdoa farinha
        assert!(violates(&meal("Bread", &["flour", "tamari"]), &gf, &lex));
    }

    #[test]
    fn soy_sauce_scope_is_checked_before_oats() {
        let lex = lexicon();
        let gf = prefs(&["gluten_free"]);
        // Linha com molho de soja e aveia: o escopo de soy sauce decide
        assert!(violates(&meal("Granola", &["soy sauce glazed oats"]), &gf, &lex));
        assert!(!violates(&meal("Granola", &["tamari soy sauce glazed oats"]), &gf, &lex));
        // o qualificador geral vale antes de qualquer escopo
        assert!(!violates(&meal("Granola", &["soy sauce glazed oats, certified gluten free"]), &gf, &lex));
    }

    #[test]
    fn rule_set_skips_rules_without_keywords() {
        let lex = TagLexicon::from_value(json!({ "known_dairy": { "milk": ["milk"] } }), Path::new("t.json")).unwrap();
        let rules = DietaryRuleSet::new(&lex);
        assert_eq!(rules.rules.iter().map(|r| r.rule.name).collect::<Vec<_>>(), vec!["dairy"]);
        assert!(rules.check_dietary_restrictions(&meal("Latte", &["milk"]), &prefs(&["vegan"])));
        assert!(!rules.check_dietary_restrictions(&meal("Latte", &["milk"]), &prefs(&["vegetarian"])));
    }

    #[test]
    fn no_dietary_preference_never_excludes() {
        let lex = lexicon();
        assert!(!violates(&meal("Steak", &["beef"]), &PreferenceStore::new(), &lex));
    }

    #[test]
    fn dislikes_match_ingredients_name_and_category() {
        let lex = lexicon();
        let mut store = PreferenceStore::new();
        store.negate("spicy");
        store.negate("mushroom");

        assert!(check_dislikes(&meal("Curry", &["1 tsp cayenne pepper"]), &dislike_set(&store, &lex)));
        assert!(check_dislikes(&meal("Mushroom Risotto", &["rice"]), &dislike_set(&store, &lex)));
        assert!(!check_dislikes(&meal("Plain Rice", &["rice", "water"]), &dislike_set(&store, &lex)));

        let mut seafood = meal("Paella", &["rice"]);
        seafood.category = "Seafood".into();
        let mut store = PreferenceStore::new();
        store.negate("seafood");
        assert!(check_dislikes(&seafood, &dislike_set(&store, &lex)));
    }

    #[test]
    fn dislike_keywords_fall_back_to_raw_tag() {
        let lex = lexicon();
        let mut store = PreferenceStore::new();
        store.negate("olives");
        let keywords = dislike_keywords(&store, &lex);
        assert_eq!(keywords, BTreeSet::from(["olives".to_string()]));
    }
}
