//! # Analisador Linguístico — Tokens, Lemas e Dependências
//!
//! O parser de preferências não faz análise sintática: ele **consome**
//! tokens já anotados através do trait [`Analyzer`]. Cada [`Token`] traz:
//!
//! | Campo | Exemplo (`"don't want crispy chicken"`) |
//! |-------|------------------------------------------|
//! | `text` | `n't` |
//! | `lemma` | `not` |
//! | `pos` | [`Pos::Part`] |
//! | `dep` | [`Dep::Neg`] |
//! | `head` | índice de `chicken` |
//!
//! ## HeuristicAnalyzer
//!
//! A implementação embutida usa heurísticas locais, suficientes para
//! frases curtas de preferência:
//!
//! ```text
//! "i do n't want crispy chicken without mushrooms"
//!        │            └─amod─┘ │         └─pobj─→ without
//!        └──── neg ──────────→ chicken
//!                              └─ núcleo do chunk (NOUN)
//! ```
//!
//! 1. **Tokenização** por regex, separando contrações (`don't` → `do` + `n't`)
//! 2. **Lematização** por sufixos (plural → singular) e tabela de irregulares
//! 3. **POS** por listas fechadas (determinantes, preposições, auxiliares...)
//! 4. **Chunks**: sequências de palavras de conteúdo; a última é o núcleo
//!    (`Noun`), as anteriores são `Adj` ligadas por `Amod`
//! 5. **Dependências locais**: núcleo após preposição → `Pobj`; marcador de
//!    negação → `Neg` do núcleo do primeiro chunk seguinte na oração;
//!    `of` após um núcleo se liga a ele (`fan of chicken`)

use std::ops::Range;

use regex::Regex;

/// Classe gramatical simplificada.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pos {
    Noun,
    Adj,
    Verb,
    Aux,
    Adp,
    Adv,
    Det,
    Pron,
    Part,
    Cconj,
    Intj,
    Num,
    Punct,
}

/// Rótulo da relação de dependência com o `head`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dep {
    Root,
    Neg,
    Amod,
    Pobj,
    Dobj,
    Prep,
    Other,
}

/// Token anotado. `start`/`end` são offsets em bytes no texto analisado.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    pub dep: Dep,
    pub head: Option<usize>,
    pub start: usize,
    pub end: usize,
}

/// Sequência de tokens de uma frase, com navegação pela árvore.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doc {
    pub tokens: Vec<Token>,
}

impl Doc {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// Filhos sintáticos diretos de `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter(move |t| t.head == Some(index))
    }

    /// Head sintático de um token, se houver.
    pub fn head_of(&self, token: &Token) -> Option<&Token> {
        token.head.and_then(|h| self.tokens.get(h))
    }

    /// Índices dos tokens que cobrem exatamente `[start, end)`.
    ///
    /// Retorna `None` se o trecho não começa e termina em fronteiras de
    /// token: `"chicken broth"` não casa dentro de `"chicken brothers"`.
    pub fn char_span(&self, start: usize, end: usize) -> Option<Range<usize>> {
        let first = self.tokens.iter().position(|t| t.start == start)?;
        let last = self.tokens.iter().rposition(|t| t.end == end)?;
        (last >= first).then(|| first..last + 1)
    }
}

/// Produtor de tokens anotados: o colaborador linguístico do parser.
pub trait Analyzer {
    /// Analisa um texto (já em lowercase) e devolve seus tokens.
    fn analyze(&self, text: &str) -> Doc;
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "some", "any", "this", "that", "these", "those", "my", "your", "our",
    "their", "his", "her", "its", "every", "each", "all", "another",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "you", "we", "us", "they", "them", "he", "she", "it", "him", "something",
    "anything", "nothing", "everything", "myself", "one",
];

const PREPOSITIONS: &[&str] = &[
    "with", "without", "except", "excluding", "of", "in", "on", "for", "from", "to", "at", "by",
    "about", "into", "than", "instead", "minus", "besides",
];

const AUXILIARIES: &[&str] = &[
    "do", "does", "did", "is", "am", "are", "was", "were", "be", "been", "can", "could", "would",
    "should", "will", "shall", "may", "might", "must", "have", "has", "had", "ca", "wo", "'m",
    "'re", "'ll", "'ve", "'d", "'s",
];

const ADVERBS: &[&str] = &[
    "really", "very", "just", "maybe", "perhaps", "also", "too", "so", "more", "less", "much",
    "quite", "rather", "especially", "definitely", "probably", "only", "kind", "sort", "actually",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "plus", "&"];

const INTERJECTIONS: &[&str] = &[
    "please", "thanks", "thank", "hi", "hello", "hey", "yes", "ok", "okay", "um", "uh", "well",
    "sure", "hmm",
];

const VERBS: &[&str] = &[
    "want", "like", "love", "eat", "prefer", "need", "hate", "avoid", "dislike", "make", "cook",
    "try", "give", "feel", "crave", "craving", "fancy", "think", "get", "see", "show", "find",
    "go", "enjoy", "stand", "skip", "include", "contain", "suggest", "recommend", "mind",
    "allow", "keep", "serve", "looking", "look",
];

/// Marcadores de negação (comparados pelo lema).
const NEGATIONS: &[&str] = &["not", "never", "no"];

/// Plurais irregulares e formas que as regras de sufixo estragariam.
const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("n't", "not"),
    ("ca", "can"),
    ("wo", "will"),
    ("'m", "be"),
    ("'re", "be"),
    ("is", "be"),
    ("am", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("'ll", "will"),
    ("'ve", "have"),
    ("'d", "would"),
    ("has", "have"),
    ("does", "do"),
    ("did", "do"),
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("knives", "knife"),
    ("children", "child"),
    ("geese", "goose"),
    ("cheeses", "cheese"),
    ("sausages", "sausage"),
    ("chives", "chive"),
    ("olives", "olive"),
    ("anchovies", "anchovy"),
];

/// Analisador heurístico embutido.
///
/// A regex é compilada uma vez em [`new()`](HeuristicAnalyzer::new) e
/// reutilizada em todas as chamadas.
pub struct HeuristicAnalyzer {
    word_re: Regex,
}

impl Default for HeuristicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self {
            // Palavras (com hífen/apóstrofo internos) ou um símbolo isolado
            word_re: Regex::new(r"[\p{L}\p{N}]+(?:[-'’][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
                .expect("regex de tokenização é estática"),
        }
    }

    /// Quebra o texto em `(início, fim)` já com contrações separadas.
    fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        for m in self.word_re.find_iter(text) {
            let word = m.as_str();
            let (start, end) = (m.start(), m.end());

            // "don't" → "do" + "n't"; "can't" → "ca" + "n't"
            let neg_suffix = ["n't", "n’t"].into_iter().find(|s| word.ends_with(s));
            if let Some(suffix) = neg_suffix {
                let split = end - suffix.len();
                if split > start {
                    spans.push((start, split));
                }
                spans.push((split, end));
                continue;
            }

            // "i'm" → "i" + "'m"
            if let Some(pos) = word.find(['\'', '’']) {
                if pos > 0 {
                    spans.push((start, start + pos));
                    spans.push((start + pos, end));
                    continue;
                }
            }

            spans.push((start, end));
        }
        spans
    }
}

impl Analyzer for HeuristicAnalyzer {
    fn analyze(&self, text: &str) -> Doc {
        let mut tokens: Vec<Token> = self
            .spans(text)
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| {
                let surface = text[start..end].replace('’', "'");
                let pos = part_of_speech(&surface);
                let lemma = lemmatize(&surface, pos);
                Token {
                    index,
                    text: surface,
                    lemma,
                    pos,
                    dep: Dep::Other,
                    head: None,
                    start,
                    end,
                }
            })
            .collect();

        attach_chunks(&mut tokens);
        attach_negations(&mut tokens);
        attach_verbs(&mut tokens);

        Doc { tokens }
    }
}

/// POS inicial. Palavras fora das listas fechadas viram `Noun` e são
/// refinadas por [`attach_chunks`].
fn part_of_speech(word: &str) -> Pos {
    let lemma_guess = IRREGULAR_LEMMAS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, l)| *l)
        .unwrap_or(word);

    if !word.chars().any(char::is_alphanumeric) {
        Pos::Punct
    } else if word.chars().all(|c| c.is_ascii_digit()) {
        Pos::Num
    } else if NEGATIONS.contains(&lemma_guess) {
        Pos::Part
    } else if DETERMINERS.contains(&word) {
        Pos::Det
    } else if PRONOUNS.contains(&word) {
        Pos::Pron
    } else if PREPOSITIONS.contains(&word) {
        Pos::Adp
    } else if AUXILIARIES.contains(&word) {
        Pos::Aux
    } else if CONJUNCTIONS.contains(&word) {
        Pos::Cconj
    } else if INTERJECTIONS.contains(&word) {
        Pos::Intj
    } else if ADVERBS.contains(&word) {
        Pos::Adv
    } else if VERBS.contains(&word) || VERBS.contains(&strip_plural(word).as_str()) {
        Pos::Verb
    } else {
        Pos::Noun
    }
}

fn lemmatize(word: &str, pos: Pos) -> String {
    if let Some((_, lemma)) = IRREGULAR_LEMMAS.iter().find(|(w, _)| *w == word) {
        return lemma.to_string();
    }
    match pos {
        Pos::Noun | Pos::Verb => strip_plural(word),
        _ => word.to_string(),
    }
}

/// Regras de sufixo para singularizar (e para a 3ª pessoa de verbos).
fn strip_plural(word: &str) -> String {
    if word.len() <= 3 || !word.chars().all(char::is_alphabetic) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if word.len() > 4 {
            return format!("{}y", stem);
        }
    }
    for suffix in ["oes", "sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !["ss", "us", "is", "ous"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn is_content(pos: Pos) -> bool {
    matches!(pos, Pos::Noun | Pos::Adj)
}

/// Agrupa palavras de conteúdo consecutivas: última = núcleo, demais = `Amod`.
/// O núcleo recebe `Pobj` (após preposição), `Dobj` (após verbo) ou `Root`.
fn attach_chunks(tokens: &mut [Token]) {
    let mut i = 0;
    while i < tokens.len() {
        if !is_content(tokens[i].pos) {
            i += 1;
            continue;
        }
        let start = i;
        while i < tokens.len() && is_content(tokens[i].pos) {
            i += 1;
        }
        let head = i - 1;

        for modifier in &mut tokens[start..head] {
            modifier.pos = Pos::Adj;
            modifier.dep = Dep::Amod;
            modifier.head = Some(head);
        }
        tokens[head].pos = Pos::Noun;

        // Olha para trás pulando determinantes, advérbios e negações
        let governor = tokens[..start]
            .iter()
            .rev()
            .find(|t| !matches!(t.pos, Pos::Det | Pos::Adv | Pos::Part))
            .map(|t| (t.index, t.pos));

        match governor {
            Some((adp, Pos::Adp)) => {
                tokens[head].dep = Dep::Pobj;
                tokens[head].head = Some(adp);
            }
            Some((verb, Pos::Verb)) => {
                tokens[head].dep = Dep::Dobj;
                tokens[head].head = Some(verb);
            }
            _ => tokens[head].dep = Dep::Root,
        }
    }
}

/// Liga cada marcador de negação ao núcleo do primeiro chunk seguinte na
/// mesma oração; sem ele, ao verbo mais próximo antes do marcador.
fn attach_negations(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        if tokens[i].pos != Pos::Part {
            continue;
        }
        let target = tokens[i + 1..]
            .iter()
            .take_while(|t| t.pos != Pos::Punct && t.text != "but")
            .find(|t| is_content(t.pos))
            .map(|t| match t.dep {
                Dep::Amod => t.head.unwrap_or(t.index),
                _ => t.index,
            })
            .or_else(|| {
                tokens[..i]
                    .iter()
                    .rev()
                    .find(|t| t.pos == Pos::Verb)
                    .map(|t| t.index)
            });

        tokens[i].dep = Dep::Neg;
        tokens[i].head = target;
    }
}

/// Primeiro verbo é a raiz; preposições se ligam ao verbo anterior.
fn attach_verbs(tokens: &mut [Token]) {
    let root = tokens.iter().find(|t| t.pos == Pos::Verb).map(|t| t.index);
    for i in 0..tokens.len() {
        match tokens[i].pos {
            Pos::Verb if Some(i) == root => tokens[i].dep = Dep::Root,
            Pos::Verb => tokens[i].head = root,
            // "fan of chicken": "of" logo após um núcleo se liga a ele
            Pos::Adp if tokens[i].lemma == "of" && i > 0 && tokens[i - 1].pos == Pos::Noun => {
                tokens[i].dep = Dep::Prep;
                tokens[i].head = Some(i - 1);
            }
            Pos::Adp => {
                tokens[i].dep = Dep::Prep;
                tokens[i].head = tokens[..i]
                    .iter()
                    .rev()
                    .find(|t| t.pos == Pos::Verb)
                    .map(|t| t.index);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Doc {
        HeuristicAnalyzer::new().analyze(text)
    }

    fn find<'a>(doc: &'a Doc, text: &str) -> &'a Token {
        doc.tokens.iter().find(|t| t.text == text).unwrap()
    }

    #[test]
    fn splits_contractions() {
        let doc = analyze("i don't want it");
        let texts: Vec<&str> = doc.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["i", "do", "n't", "want", "it"]);
        assert_eq!(find(&doc, "n't").lemma, "not");
        assert_eq!(find(&doc, "n't").start, 4);
    }

    #[test]
    fn negation_attaches_to_chunk_head() {
        let doc = analyze("i don't want italian food");
        let neg = find(&doc, "n't");
        assert_eq!(neg.dep, Dep::Neg);
        assert_eq!(doc.head_of(neg).map(|t| t.text.as_str()), Some("food"));

        let italian = find(&doc, "italian");
        assert_eq!(italian.dep, Dep::Amod);
        assert_eq!(doc.head_of(italian).map(|t| t.text.as_str()), Some("food"));
    }

    #[test]
    fn object_of_without_is_pobj() {
        let doc = analyze("pasta without any mushrooms");
        let mushrooms = find(&doc, "mushrooms");
        assert_eq!(mushrooms.lemma, "mushroom");
        assert_eq!(mushrooms.dep, Dep::Pobj);
        assert_eq!(doc.head_of(mushrooms).map(|t| t.lemma.as_str()), Some("without"));
    }

    #[test]
    fn modifiers_become_amod_of_noun() {
        let doc = analyze("crispy chicken please");
        let crispy = find(&doc, "crispy");
        assert_eq!(crispy.pos, Pos::Adj);
        assert_eq!(crispy.dep, Dep::Amod);
        let chicken = find(&doc, "chicken");
        assert_eq!(chicken.pos, Pos::Noun);
        assert_eq!(doc.children(chicken.index).count(), 1);
    }

    #[test]
    fn of_attaches_to_preceding_noun() {
        let doc = analyze("i'm not a big fan of chicken");
        let not = find(&doc, "not");
        assert_eq!(doc.head_of(not).map(|t| t.text.as_str()), Some("fan"));
        let of = find(&doc, "of");
        assert_eq!(of.dep, Dep::Prep);
        assert_eq!(doc.head_of(of).map(|t| t.text.as_str()), Some("fan"));
        let chicken = find(&doc, "chicken");
        assert_eq!(chicken.dep, Dep::Pobj);
        assert_eq!(chicken.head, Some(of.index));
    }

    #[test]
    fn negation_stops_at_clause_boundary() {
        let doc = analyze("not now, chicken");
        let not = find(&doc, "not");
        assert_eq!(not.dep, Dep::Neg);
        // "now" é conteúdo antes da vírgula; "chicken" fica fora do escopo
        assert_eq!(doc.head_of(not).map(|t| t.text.as_str()), Some("now"));
    }

    #[test]
    fn char_span_requires_token_boundaries() {
        let doc = analyze("chicken brothers");
        assert!(doc.char_span(0, "chicken broth".len()).is_none());

        let doc = analyze("some chicken broth");
        assert_eq!(doc.char_span(5, 18), Some(1..3));
    }

    #[test]
    fn plural_rules() {
        assert_eq!(strip_plural("berries"), "berry");
        assert_eq!(strip_plural("tomatoes"), "tomato");
        assert_eq!(strip_plural("peaches"), "peach");
        assert_eq!(strip_plural("eggs"), "egg");
        assert_eq!(strip_plural("hummus"), "hummus");
        assert_eq!(strip_plural("pies"), "pie");
    }
}
