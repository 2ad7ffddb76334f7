//! Configuração lida do ambiente, com padrões para rodar a partir da raiz
//! do projeto.
//!
//! | Variável | Padrão |
//! |----------|--------|
//! | `CHEFBOT_LEXICON` | `data/preference_map.json` |
//! | `CHEFBOT_QUESTIONS` | `data/questions.json` |
//! | `MEALDB_BASE_URL` | `https://www.themealdb.com/api/json/v1/1/` |
//! | `RUST_LOG` | `warn` (lido pelo `tracing_subscriber`) |

use std::env;
use std::path::PathBuf;

use crate::persistence::{LEXICON_PATH, QUESTIONS_PATH};
use crate::source::mealdb::DEFAULT_BASE_URL;

/// Resultados exibidos por página.
pub const PAGE_SIZE: usize = 5;

/// Sorteios de refeição aleatória quando nenhuma busca deu certo.
pub const RANDOM_ATTEMPTS: usize = 5;

/// Exemplos mostrados junto de cada pergunta.
pub const EXAMPLES_PER_PROMPT: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub lexicon_path: PathBuf,
    pub questions_path: PathBuf,
    pub mealdb_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lexicon_path: PathBuf::from(LEXICON_PATH),
            questions_path: PathBuf::from(QUESTIONS_PATH),
            mealdb_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Variáveis vazias contam como ausentes.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            lexicon_path: get("CHEFBOT_LEXICON").map(PathBuf::from).unwrap_or(defaults.lexicon_path),
            questions_path: get("CHEFBOT_QUESTIONS")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_path),
            mealdb_base_url: get("MEALDB_BASE_URL").unwrap_or(defaults.mealdb_base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_and_defaults() {
        let vars = HashMap::from([
            ("CHEFBOT_LEXICON", "/etc/chefbot/lexicon.json"),
            ("MEALDB_BASE_URL", "  "),
        ]);
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.lexicon_path, PathBuf::from("/etc/chefbot/lexicon.json"));
        assert_eq!(config.questions_path, PathBuf::from(QUESTIONS_PATH));
        assert_eq!(config.mealdb_base_url, DEFAULT_BASE_URL);
    }
}
