//! # Erros — Taxonomia de Falhas do Assistente
//!
//! Só existem duas famílias de erro "de verdade" no sistema:
//!
//! | Erro | Quando | Fatal? |
//! |------|--------|--------|
//! | [`ConfigError`] | Léxico ou lista de perguntas ausente/malformada | Sim, só na inicialização |
//! | [`SourceError`] | Rede, HTTP ou JSON da fonte de refeições | Não, vira "nenhum resultado" |
//!
//! Ambiguidade de preferência e entrada não reconhecida **não** são erros:
//! são sinais de controle de fluxo consumidos pelo
//! [`DialogueController`](crate::dialogue::DialogueController)
//! (veja [`MergeOutcome`](crate::core::preferences::MergeOutcome) e
//! [`Intent::Unknown`](crate::nlu::intent::Intent::Unknown)).

use std::path::PathBuf;

use thiserror::Error;

/// Falha ao carregar a configuração (léxico ou perguntas).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// O arquivo não pôde ser lido.
    #[error("falha ao ler {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// O arquivo não é JSON válido.
    #[error("JSON inválido em {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// O JSON é válido mas não tem o formato esperado.
    #[error("formato inesperado em {}: {detail}", path.display())]
    Shape { path: PathBuf, detail: String },
}

/// Falha ao consultar a fonte externa de refeições.
///
/// Nunca interrompe a sessão: o controlador registra o erro em `warn`
/// e segue com uma lista vazia.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("erro HTTP: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 persistiu mesmo após a nova tentativa.
    #[error("limite de requisições atingido em {endpoint}")]
    RateLimited { endpoint: String },

    #[error("resposta malformada de {endpoint}: {detail}")]
    Malformed { endpoint: String, detail: String },
}
