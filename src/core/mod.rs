//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Os tipos que todas as outras camadas compartilham:
//!
//! - [`Category`] / [`KnownGroup`]: partições do espaço de tags
//! - [`TagLexicon`]: categoria → tag → palavras-chave (imutável)
//! - [`PreferenceStore`]: preferências acumuladas de uma sessão
//! - [`MealSummary`] / [`MealDetail`] / [`Vocabulary`]: o que a fonte externa devolve
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{Category, PreferenceStore};
//!
//! let mut prefs = PreferenceStore::new();
//! let outcome = prefs.merge(Category::Cuisine, vec!["italian".to_string()]);
//! assert!(!outcome.ambiguous);
//! ```

/// Categorias de preferência e grupos conhecidos.
pub mod category;

/// Léxico de palavras-chave carregado da configuração.
pub mod lexicon;

/// Resumos, detalhes e vocabulário de refeições.
pub mod meal;

/// Armazenamento de preferências por sessão.
pub mod preferences;

pub use category::{Category, KnownGroup, Tag};
pub use lexicon::TagLexicon;
pub use meal::{Ingredient, MealDetail, MealSummary, Vocabulary, VocabularyKind};
pub use preferences::PreferenceStore;
