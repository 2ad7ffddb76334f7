//! # TagLexicon — O Vocabulário de Preferências
//!
//! O [`TagLexicon`] mapeia **categoria → tag → frases-chave**. É a única
//! fonte de conhecimento linguístico do parser: adicionar um sinônimo é
//! uma edição no JSON, não uma mudança de código.
//!
//! ## Formato de Origem
//!
//! ```json
//! {
//!   "cuisine":     { "italian": ["italian", "pasta", "italy"] },
//!   "ingredient":  { "chicken": ["chicken", "poultry"] },
//!   "known_meats": { "beef":    ["beef", "steak", "mince"] }
//! }
//! ```
//!
//! Qualquer outra forma (lista no topo, string no lugar da lista...) é
//! um [`ConfigError::Shape`], fatal na inicialização.
//!
//! ## Normalização na Carga
//!
//! - tags e palavras-chave em lowercase, sem espaços nas bordas
//! - palavras-chave vazias descartadas, duplicatas removidas (ordem preservada)
//! - chaves desconhecidas (ex: `flavor`) ignoradas com `warn`
//!
//! Depois de construído o léxico é **imutável**: o parser depende disso
//! para que o matching seja determinístico.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_json::Value;

use super::category::{Category, KnownGroup, Tag};
use crate::error::ConfigError;

/// Tags de uma categoria e suas frases-chave.
///
/// `BTreeMap` garante iteração em ordem alfabética de tag: a ordem de
/// matching não depende da ordem de inserção.
pub type TagMap = BTreeMap<Tag, Vec<String>>;

/// Léxico imutável de preferências.
#[derive(Clone, Debug, Default)]
pub struct TagLexicon {
    categories: BTreeMap<Category, TagMap>,
    known: BTreeMap<KnownGroup, TagMap>,
}

impl TagLexicon {
    /// Constrói o léxico a partir de um documento JSON já desserializado.
    ///
    /// `origin` aparece apenas nas mensagens de erro.
    ///
    /// # Erros
    ///
    /// [`ConfigError::Shape`] se o documento não for um mapa de mapas de
    /// listas de strings.
    pub fn from_value(value: Value, origin: &Path) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, BTreeMap<String, Vec<String>>> = serde_json::from_value(value)
            .map_err(|e| ConfigError::Shape {
                path: origin.to_path_buf(),
                detail: format!("esperado mapa categoria → tag → [palavras-chave]: {}", e),
            })?;

        let mut lexicon = TagLexicon::default();
        for (key, tags) in raw {
            let key = key.trim().to_lowercase();
            let tags = normalize_tags(tags);
            if let Some(category) = Category::from_key(&key) {
                lexicon.categories.insert(category, tags);
            } else if let Some(group) = KnownGroup::from_key(&key) {
                lexicon.known.insert(group, tags);
            } else {
                tracing::warn!(category = %key, "Categoria desconhecida no léxico, ignorando");
            }
        }

        tracing::debug!(
            categories = lexicon.categories.len(),
            known_groups = lexicon.known.len(),
            "Léxico construído"
        );
        Ok(lexicon)
    }

    /// Atalho para construir a partir de texto JSON.
    pub fn from_json_str(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::from_value(value, origin)
    }

    /// `true` quando não há nenhuma categoria de preferência carregada.
    ///
    /// Grupos conhecidos sozinhos não contam: sem categorias o parser
    /// não tem o que reconhecer.
    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|tags| tags.is_empty())
    }

    /// Mapa tag → palavras-chave de uma categoria.
    pub fn lookup(&self, category: Category) -> Option<&TagMap> {
        self.categories.get(&category)
    }

    /// Todos os tags de uma categoria (vazio se a categoria não existe).
    pub fn all_tags(&self, category: Category) -> BTreeSet<Tag> {
        self.lookup(category)
            .map(|tags| tags.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Categorias de preferência presentes no léxico, sem os grupos conhecidos.
    pub fn categories(&self) -> BTreeSet<Category> {
        self.categories.keys().copied().collect()
    }

    /// Palavras-chave de um tag específico.
    pub fn keywords(&self, category: Category, tag: &str) -> Option<&[String]> {
        self.lookup(category)
            .and_then(|tags| tags.get(tag))
            .map(Vec::as_slice)
    }

    /// Primeiro tag da categoria cuja lista contém exatamente `word`.
    pub fn tag_for_keyword(&self, category: Category, word: &str) -> Option<&Tag> {
        self.lookup(category)?
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| k == word))
            .map(|(tag, _)| tag)
    }

    /// Mapa de um grupo conhecido (filtro dietético).
    pub fn known_group(&self, group: KnownGroup) -> Option<&TagMap> {
        self.known.get(&group)
    }

    /// Todas as palavras-chave de um grupo conhecido, achatadas.
    pub fn known_keywords(&self, group: KnownGroup) -> BTreeSet<String> {
        self.known_group(group)
            .map(|tags| tags.values().flatten().cloned().collect())
            .unwrap_or_default()
    }
}

fn normalize_tags(tags: BTreeMap<String, Vec<String>>) -> TagMap {
    tags.into_iter()
        .map(|(tag, keywords)| {
            let mut seen = BTreeSet::new();
            let keywords = keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty() && seen.insert(k.clone()))
                .collect();
            (tag.trim().to_lowercase(), keywords)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn origin() -> &'static Path {
        Path::new("test.json")
    }

    #[test]
    fn loads_categories_and_known_groups() {
        let lex = TagLexicon::from_value(
            json!({
                "cuisine": { "Italian": ["Italian", " pasta ", "italian"] },
                "known_meats": { "beef": ["beef", "steak"], "pork": ["bacon"] },
                "flavor": { "sweet": ["sweet"] }
            }),
            origin(),
        )
        .unwrap();

        assert_eq!(
            lex.keywords(Category::Cuisine, "italian").unwrap(),
            &["italian".to_string(), "pasta".to_string()]
        );
        assert_eq!(lex.categories(), BTreeSet::from([Category::Cuisine]));
        assert!(lex.known_keywords(KnownGroup::Meats).contains("bacon"));
        assert!(lex.known_keywords(KnownGroup::Dairy).is_empty());
    }

    #[test]
    fn rejects_wrong_shape() {
        let err = TagLexicon::from_value(json!({ "cuisine": ["italian"] }), origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Shape { .. }));

        let err = TagLexicon::from_value(json!([1, 2, 3]), origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Shape { .. }));
    }

    #[test]
    fn rejects_invalid_json_text() {
        let err = TagLexicon::from_json_str("{ not json", origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn known_groups_alone_are_empty() {
        let lex = TagLexicon::from_value(json!({ "known_dairy": { "milk": ["milk"] } }), origin())
            .unwrap();
        assert!(lex.is_empty());
    }

    #[test]
    fn tag_for_keyword_finds_first_tag() {
        let lex = TagLexicon::from_value(
            json!({ "texture": { "crispy": ["crispy", "crunchy"], "soft": ["soft"] } }),
            origin(),
        )
        .unwrap();
        assert_eq!(lex.tag_for_keyword(Category::Texture, "crunchy").map(String::as_str), Some("crispy"));
        assert_eq!(lex.tag_for_keyword(Category::Texture, "chewy"), None);
        assert_eq!(lex.all_tags(Category::Texture).len(), 2);
    }
}
