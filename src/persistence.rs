//! # Persistência — Carregamento da Configuração em Disco
//!
//! Dois arquivos JSON são lidos **uma vez**, na inicialização:
//!
//! | Arquivo | Tipo | Forma |
//! |---------|------|-------|
//! | `data/preference_map.json` | [`TagLexicon`] | `{categoria: {tag: [palavras-chave]}}` |
//! | `data/questions.json` | [`QuestionBank`] | `[{text, positive_tag, phase, ...}]` |
//!
//! Qualquer falha aqui é um [`ConfigError`] e encerra o programa: não há
//! como conduzir a entrevista sem léxico.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::core::TagLexicon;
use crate::error::ConfigError;
use crate::nlu::question::QuestionBank;

/// Caminho padrão do léxico (relativo à raiz do projeto).
pub const LEXICON_PATH: &str = "data/preference_map.json";

/// Caminho padrão das perguntas.
pub const QUESTIONS_PATH: &str = "data/questions.json";

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Carrega e normaliza o léxico de preferências.
///
/// # Erros
///
/// Arquivo ausente, JSON inválido ou forma diferente de mapa de mapas de
/// listas de strings.
pub fn load_lexicon(path: &Path) -> Result<TagLexicon, ConfigError> {
    let lexicon = TagLexicon::from_value(read_json(path)?, path)?;
    tracing::info!(
        path = %path.display(),
        categories = lexicon.categories().len(),
        "Léxico carregado"
    );
    Ok(lexicon)
}

/// Carrega a lista de perguntas, descartando registros malformados.
///
/// # Erros
///
/// Arquivo ausente, JSON inválido ou documento que não seja lista.
pub fn load_questions(path: &Path) -> Result<QuestionBank, ConfigError> {
    let bank = QuestionBank::from_value(read_json(path)?, path)?;
    tracing::info!(path = %path.display(), count = bank.len(), "Perguntas carregadas");
    Ok(bank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_lexicon_from_disk() {
        let file = file_with(r#"{ "cuisine": { "thai": ["thai", "pad thai"] } }"#);
        let lexicon = load_lexicon(file.path()).unwrap();
        assert!(lexicon.keywords(Category::Cuisine, "thai").is_some());
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_lexicon(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let file = file_with("[1, 2");
        let err = load_questions(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn questions_skip_bad_records() {
        let file = file_with(
            r#"[
                { "text": "Any dietary restrictions?", "positive_tag": "dietary",
                  "category": "dietary", "phase": "secondary" },
                { "positive_tag": "orphan", "phase": "initial" }
            ]"#,
        );
        let bank = load_questions(file.path()).unwrap();
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn bundled_configuration_loads() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let lexicon = load_lexicon(&root.join(LEXICON_PATH)).unwrap();
        assert!(!lexicon.is_empty());
        assert!(lexicon.keywords(Category::Ingredient, "eggs").is_some());

        let questions = load_questions(&root.join(QUESTIONS_PATH)).unwrap();
        assert!(!questions.is_empty());
    }
}
