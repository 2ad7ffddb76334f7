//! # Pipeline NLU — De Uma Frase a Preferências Estruturadas
//!
//! O [`UtteranceParser`] transforma uma resposta livre em um
//! [`ParseResult`]: a intenção do usuário e os tags que ele mencionou,
//! sempre contra o [`TagLexicon`] configurado.
//!
//! ## Fluxo de Processamento
//!
//! ```text
//! Resposta do usuário
//!   ├── 1. NFC normalize + lowercase
//!   ├── 2. Analyzer → tokens (lema, POS, dependências)
//!   ├── 3. Pergunta? ("?" no fim ou palavra interrogativa) → Question, fim
//!   ├── 4. Frases multi-palavra (categorias prioritárias primeiro)
//!   │   └── tokens cobertos ficam "consumidos"
//!   ├── 5. Tokens isolados: prioritárias, depois as demais
//!   ├── 6. Atributos: textura (amod) → ingrediente (noun)
//!   └── 7. Intent recalculada a partir das entidades
//! ```
//!
//! ## Negação
//!
//! Uma menção negada vai para `negated` em vez da categoria de origem.
//! Menções da categoria `dislikes` vão **sempre** para `dislikes`, negadas
//! ou não: "no spicy" e "spicy" expressam a mesma aversão.
//!
//! ## Sub-módulos
//!
//! | Módulo | Responsabilidade |
//! |--------|-----------------|
//! | [`analyzer`] | Tokens anotados (trait + heurística embutida) |
//! | [`entities`] | Registro de entidades de forma fixa |
//! | [`intent`] | Intenções e detecção de pergunta |
//! | [`question`] | Banco de perguntas e exemplos por fase |

/// Sub-módulo do analisador linguístico.
pub mod analyzer;

/// Sub-módulo das entidades extraídas.
pub mod entities;

/// Sub-módulo de classificação de intenção.
pub mod intent;

/// Sub-módulo do banco de perguntas.
pub mod question;

use std::cmp::Reverse;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::core::{Category, Tag, TagLexicon};

use analyzer::{Analyzer, Dep, Doc, HeuristicAnalyzer, Pos, Token};
pub use entities::Entities;
pub use intent::Intent;

/// Lemas de preposição que negam o seu objeto.
const EXCLUDING_PREPOSITIONS: &[&str] = &["without", "except", "excluding"];

/// Lemas que negam a frase imediatamente seguinte.
const NEGATING_LEMMAS: &[&str] = &["not", "no", "without"];

/// Resultado do parse de uma resposta.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub intent: Intent,
    pub entities: Entities,
}

impl ParseResult {
    pub fn question() -> Self {
        Self { intent: Intent::Question, entities: Entities::default() }
    }

    pub fn unknown() -> Self {
        Self { intent: Intent::Unknown, entities: Entities::default() }
    }
}

/// Parser de respostas livres.
///
/// Não guarda estado entre chamadas: o mesmo texto com o mesmo léxico e a
/// mesma prioridade sempre produz o mesmo resultado.
pub struct UtteranceParser {
    analyzer: Box<dyn Analyzer>,
}

impl Default for UtteranceParser {
    fn default() -> Self {
        Self::new(HeuristicAnalyzer::new())
    }
}

impl UtteranceParser {
    pub fn new(analyzer: impl Analyzer + 'static) -> Self {
        Self { analyzer: Box::new(analyzer) }
    }

    /// Extrai intenção e entidades de `text`.
    ///
    /// `priority` são as categorias da pergunta atual: são tentadas
    /// primeiro em cada passo, então `"pasta"` perguntado como culinária
    /// vira `cuisine: italian` mesmo que também seja um ingrediente.
    pub fn parse(&self, text: &str, lexicon: &TagLexicon, priority: &[Category]) -> ParseResult {
        if lexicon.is_empty() {
            tracing::debug!("Léxico vazio, nada a reconhecer");
            return ParseResult::unknown();
        }

        let lower = text.nfc().collect::<String>().trim().to_lowercase();
        let doc = self.analyzer.analyze(&lower);

        if intent::is_question(&lower, doc.first().map(|t| t.text.as_str())) {
            return ParseResult::question();
        }
        if doc.is_empty() {
            return ParseResult { intent: Intent::Preference, entities: Entities::default() };
        }

        let (first, rest) = category_order(lexicon, priority);
        let mut pass = MatchPass {
            doc: &doc,
            text: &lower,
            lexicon,
            entities: Entities::default(),
            consumed: vec![false; doc.len()],
        };

        // ─── Fase 1: Frases multi-palavra ────────────────────────
        for category in first.iter().chain(&rest) {
            pass.match_phrases(*category);
        }

        // ─── Fase 2: Tokens isolados + atributos ─────────────────
        for token in &doc.tokens {
            if pass.consumed[token.index] {
                continue;
            }
            if !pass.match_token(token, &first) {
                pass.match_token(token, &rest);
            }
            pass.attach_attributes(token);
        }

        let entities = pass.entities;
        let intent = Intent::from_entities(&entities);
        tracing::debug!(?intent, text = %lower, "Resposta analisada");
        ParseResult { intent, entities }
    }
}

/// Categorias do léxico: as prioritárias (na ordem dada), depois as demais.
fn category_order(lexicon: &TagLexicon, priority: &[Category]) -> (Vec<Category>, Vec<Category>) {
    let present = lexicon.categories();
    let mut first: Vec<Category> = Vec::new();
    for category in priority {
        if present.contains(category) && !first.contains(category) {
            first.push(*category);
        }
    }
    let rest = present.into_iter().filter(|c| !first.contains(c)).collect();
    (first, rest)
}

/// Estado de uma passada de matching sobre um documento.
struct MatchPass<'a> {
    doc: &'a Doc,
    text: &'a str,
    lexicon: &'a TagLexicon,
    entities: Entities,
    consumed: Vec<bool>,
}

impl MatchPass<'_> {
    fn record(&mut self, category: Category, tag: &Tag, negated: bool) {
        let bucket = if category == Category::Dislikes {
            &mut self.entities.dislikes
        } else if negated {
            &mut self.entities.negated
        } else {
            self.entities.get_mut(category)
        };
        bucket.insert(tag.clone());
    }

    /// Frases multi-palavra de uma categoria, mais longas primeiro.
    fn match_phrases(&mut self, category: Category) {
        let lexicon = self.lexicon;
        let Some(tags) = lexicon.lookup(category) else {
            return;
        };
        let mut phrases: Vec<(&Tag, &str)> = tags
            .iter()
            .flat_map(|(tag, keywords)| {
                keywords
                    .iter()
                    .filter(|k| k.contains(' '))
                    .map(move |k| (tag, k.as_str()))
            })
            .collect();
        phrases.sort_by_key(|(_, phrase)| Reverse(phrase.split_whitespace().count()));

        for (tag, phrase) in phrases {
            let spans: Vec<(usize, usize)> = self
                .text
                .match_indices(phrase)
                .map(|(start, m)| (start, start + m.len()))
                .collect();

            for (start, end) in spans {
                let Some(span) = self.doc.char_span(start, end) else {
                    continue;
                };
                if span.clone().any(|i| self.consumed[i]) {
                    continue;
                }

                let negated = self.phrase_negated(span.clone(), phrase, end);
                self.record(category, tag, negated);
                for i in span {
                    self.consumed[i] = true;
                }
            }
        }
    }

    fn phrase_negated(&self, span: std::ops::Range<usize>, phrase: &str, end: usize) -> bool {
        let before = span
            .start
            .checked_sub(1)
            .and_then(|i| self.doc.get(i))
            .is_some_and(|t| t.dep == Dep::Neg || NEGATING_LEMMAS.contains(&t.lemma.as_str()));

        before
            || self.text[..end].contains(&format!("without {}", phrase))
            || span.clone().any(|i| {
                self.doc
                    .children(i)
                    .any(|c| c.dep == Dep::Neg && !span.contains(&c.index))
            })
            || span.clone().filter_map(|i| self.doc.get(i)).any(|t| {
                t.dep == Dep::Amod
                    && t.head.is_some_and(|h| {
                        !span.contains(&h)
                            && self
                                .doc
                                .children(h)
                                .any(|c| c.dep == Dep::Neg && !span.contains(&c.index))
                    })
            })
    }

    fn has_neg_child(&self, index: usize) -> bool {
        self.doc.children(index).any(|c| c.dep == Dep::Neg)
    }

    fn token_negated(&self, token: &Token) -> bool {
        let excluded_object = token.dep == Dep::Pobj
            && self
                .doc
                .head_of(token)
                .is_some_and(|h| EXCLUDING_PREPOSITIONS.contains(&h.lemma.as_str()));
        excluded_object || self.in_negated_chunk(token)
    }

    /// Negação do próprio token, do núcleo que ele modifica ou do núcleo
    /// ao qual o seu `of` se liga (`"not a big fan of chicken"`).
    fn in_negated_chunk(&self, token: &Token) -> bool {
        if self.has_neg_child(token.index) {
            return true;
        }
        match token.dep {
            Dep::Amod => self.doc.head_of(token).is_some_and(|h| self.in_negated_chunk(h)),
            Dep::Pobj => self
                .doc
                .head_of(token)
                .filter(|prep| prep.lemma == "of")
                .and_then(|prep| self.doc.head_of(prep))
                .is_some_and(|noun| noun.pos == Pos::Noun && self.in_negated_chunk(noun)),
            _ => false,
        }
    }

    /// Primeiro tag (em ordem de categoria, depois de tag) cuja lista de
    /// palavras únicas contém a forma ou o lema do token.
    fn match_token(&mut self, token: &Token, categories: &[Category]) -> bool {
        let lexicon = self.lexicon;
        for category in categories {
            let Some(tags) = lexicon.lookup(*category) else {
                continue;
            };
            let hit = tags.iter().find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|k| !k.contains(' ') && (*k == token.text || *k == token.lemma))
            });
            if let Some((tag, _)) = hit {
                let negated = self.token_negated(token);
                self.record(*category, tag, negated);
                return true;
            }
        }
        false
    }

    /// `"crispy chicken"` → `attributes[chicken] += crispy`.
    fn attach_attributes(&mut self, token: &Token) {
        if token.pos != Pos::Noun {
            return;
        }
        let lexicon = self.lexicon;
        let Some(ingredient) = lexicon
            .tag_for_keyword(Category::Ingredient, &token.lemma)
            .or_else(|| lexicon.tag_for_keyword(Category::Ingredient, &token.text))
        else {
            return;
        };

        let textures: Vec<Tag> = self
            .doc
            .children(token.index)
            .filter(|c| c.dep == Dep::Amod)
            .filter_map(|c| {
                lexicon
                    .tag_for_keyword(Category::Texture, &c.lemma)
                    .or_else(|| lexicon.tag_for_keyword(Category::Texture, &c.text))
            })
            .cloned()
            .collect();

        if !textures.is_empty() {
            self.entities
                .attributes
                .entry(ingredient.clone())
                .or_default()
                .extend(textures);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::Path;

    use serde_json::json;

    fn lexicon() -> TagLexicon {
        TagLexicon::from_value(
            json!({
                "cuisine": {
                    "italian": ["italian", "pasta", "italy"],
                    "mexican": ["mexican", "tacos"]
                },
                "ingredient": {
                    "chicken": ["chicken", "poultry"],
                    "mushroom": ["mushroom"],
                    "pasta": ["pasta", "spaghetti"],
                    "chicken_broth": ["chicken broth"]
                },
                "category": { "dessert": ["dessert", "sweet treat"] },
                "dietary": { "vegetarian": ["vegetarian", "no meat"] },
                "dislikes": { "spicy": ["spicy", "hot sauce"] },
                "texture": { "crispy": ["crispy", "crunchy"] }
            }),
            Path::new("test.json"),
        )
        .unwrap()
    }

    fn parse(text: &str, priority: &[Category]) -> ParseResult {
        UtteranceParser::default().parse(text, &lexicon(), priority)
    }

    fn set(items: &[&str]) -> BTreeSet<Tag> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn negated_cuisine_goes_to_negated() {
        let result = parse("I don't want italian food", &[]);
        assert_eq!(result.intent, Intent::Negation);
        assert_eq!(result.entities.negated, set(&["italian"]));
        assert!(result.entities.cuisine.is_empty());
    }

    #[test]
    fn negation_reaches_modified_noun() {
        let result = parse("I don't want fresh chicken", &[Category::Ingredient]);
        assert_eq!(result.intent, Intent::Negation);
        assert_eq!(result.entities.negated, set(&["chicken"]));
        assert!(result.entities.ingredient.is_empty());
    }

    #[test]
    fn negation_reaches_object_of_of() {
        let result = parse("I'm not a big fan of chicken", &[Category::Ingredient]);
        assert_eq!(result.intent, Intent::Negation);
        assert_eq!(result.entities.negated, set(&["chicken"]));
        assert!(result.entities.ingredient.is_empty());

        // Sem negação o mesmo "of" não muda nada
        let result = parse("a big plate of chicken", &[Category::Ingredient]);
        assert_eq!(result.intent, Intent::Preference);
        assert_eq!(result.entities.ingredient, set(&["chicken"]));
    }

    #[test]
    fn negation_before_modifier_covers_phrase_in_chunk() {
        let result = parse("no spicy chicken broth", &[]);
        assert_eq!(result.entities.negated, set(&["chicken_broth"]));
        assert_eq!(result.entities.dislikes, set(&["spicy"]));
    }

    #[test]
    fn priority_category_wins_shared_keyword() {
        let result = parse("pasta please", &[Category::Cuisine]);
        assert_eq!(result.intent, Intent::Preference);
        assert_eq!(result.entities.cuisine, set(&["italian"]));
        assert!(result.entities.ingredient.is_empty());

        // Com ingredient como prioridade o mesmo token vira ingrediente
        let result = parse("pasta please", &[Category::Ingredient]);
        assert_eq!(result.entities.ingredient, set(&["pasta"]));
    }

    #[test]
    fn question_short_circuits() {
        let result = parse("what is tagine?", &[]);
        assert_eq!(result, ParseResult::question());

        let result = parse("can you make tacos", &[]);
        assert_eq!(result.intent, Intent::Question);
        assert!(result.entities.is_empty());
    }

    #[test]
    fn phrase_beats_constituent_word() {
        let result = parse("something with chicken broth", &[]);
        assert_eq!(result.entities.ingredient, set(&["chicken_broth"]));
    }

    #[test]
    fn negated_phrase_goes_to_negated() {
        let result = parse("pasta without chicken broth", &[Category::Cuisine]);
        assert_eq!(result.intent, Intent::Negation);
        assert_eq!(result.entities.negated, set(&["chicken_broth"]));
        assert!(!result.entities.ingredient.contains("chicken_broth"));
        assert_eq!(result.entities.cuisine, set(&["italian"]));
    }

    #[test]
    fn dislike_phrase_is_dislike_even_when_negated() {
        let result = parse("no hot sauce please", &[]);
        assert_eq!(result.intent, Intent::DislikeStatement);
        assert_eq!(result.entities.dislikes, set(&["spicy"]));
        assert!(result.entities.negated.is_empty());
    }

    #[test]
    fn object_of_without_is_negated() {
        let result = parse("chicken without mushrooms", &[]);
        assert_eq!(result.intent, Intent::Negation);
        assert_eq!(result.entities.ingredient, set(&["chicken"]));
        assert_eq!(result.entities.negated, set(&["mushroom"]));
    }

    #[test]
    fn dislikes_override_negation_intent() {
        let result = parse("not mexican, and nothing spicy", &[]);
        assert_eq!(result.intent, Intent::DislikeStatement);
        assert_eq!(result.entities.negated, set(&["mexican"]));
        assert_eq!(result.entities.dislikes, set(&["spicy"]));
    }

    #[test]
    fn texture_attaches_to_ingredient() {
        let result = parse("crispy chicken", &[]);
        assert_eq!(result.intent, Intent::Preference);
        assert_eq!(result.entities.ingredient, set(&["chicken"]));
        assert_eq!(result.entities.texture, set(&["crispy"]));
        assert_eq!(
            result.entities.attributes,
            BTreeMap::from([("chicken".to_string(), set(&["crispy"]))])
        );
    }

    #[test]
    fn dietary_phrase_and_nfc_input() {
        let result = parse("  NO MEAT for me ", &[Category::Dietary]);
        // O "no" faz parte da frase, não a nega
        assert_eq!(result.entities.dietary, set(&["vegetarian"]));

        let result = parse("Cafe\u{301} style dessert", &[]);
        assert_eq!(result.entities.meal_type, set(&["dessert"]));
    }

    #[test]
    fn empty_lexicon_is_unknown() {
        let empty = TagLexicon::default();
        let result = UtteranceParser::default().parse("pasta", &empty, &[]);
        assert_eq!(result, ParseResult::unknown());
    }

    #[test]
    fn blank_answer_has_no_entities() {
        let result = parse("   ", &[]);
        assert_eq!(result.intent, Intent::Preference);
        assert!(result.entities.is_empty());
    }

    #[test]
    fn plural_matches_through_lemma() {
        let result = parse("tacos with mushrooms", &[]);
        assert_eq!(result.entities.cuisine, set(&["mexican"]));
        assert_eq!(result.entities.ingredient, set(&["mushroom"]));
    }
}
