//! # ChefBot — Assistente de Escolha de Refeições
//!
//! **Ponto de entrada** do assistente de console.
//!
//! O programa entrevista o usuário em linguagem natural (inglês), extrai
//! preferências de cada resposta e busca refeições compatíveis no
//! TheMealDB, filtrando restrições alimentares e rejeições.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (stderr)
//!   ├── Lê AppConfig do ambiente
//!   ├── Carrega léxico e perguntas (falha aqui encerra o processo)
//!   ├── Cria MealDbClient
//!   └── Roda o console dentro do span da sessão
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Logs só de avisos (padrão)
//! cargo run
//!
//! # Acompanhar parse, buscas e filtragem
//! RUST_LOG=chefbot=debug cargo run
//! ```

/// Módulo `config`: variáveis de ambiente e constantes de operação.
mod config;

/// Módulo `console`: laço de leitura e impressão no terminal.
mod console;

/// Módulo `core`: categorias, léxico, preferências e refeições.
mod core;

/// Módulo `dialogue`: máquina de estados da entrevista.
mod dialogue;

/// Módulo `error`: erros de configuração e da fonte externa.
mod error;

/// Módulo `filter`: exclusão de candidatos por preferências.
mod filter;

/// Módulo `nlu`: análise das respostas do usuário.
mod nlu;

/// Módulo `persistence`: carga dos arquivos JSON de configuração.
mod persistence;

/// Módulo `source`: fonte externa de refeições (TheMealDB).
mod source;

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::dialogue::{DialogueController, Session};
use crate::source::MealDbClient;

fn main() -> Result<()> {
    // Logs em stderr para não se misturarem ao chat em stdout.
    // Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env();
    tracing::info!(?config, "Configuração carregada");

    let lexicon = persistence::load_lexicon(&config.lexicon_path)
        .with_context(|| format!("Não foi possível carregar o léxico de {}", config.lexicon_path.display()))?;
    let questions = persistence::load_questions(&config.questions_path).with_context(|| {
        format!("Não foi possível carregar as perguntas de {}", config.questions_path.display())
    })?;
    if questions.is_empty() {
        tracing::warn!("Nenhuma pergunta carregada, usando textos embutidos");
    }

    let client = MealDbClient::new(config.mealdb_base_url.clone()).context("Falha ao criar o cliente HTTP")?;
    let controller = DialogueController::new(lexicon, questions, client);

    // Cada chamada ao controlador roda dentro do span da sessão
    let mut session = Session::new();
    tracing::info!(session = %session.id, "Sessão iniciada");

    let stdin = io::stdin();
    console::run(&controller, &mut session, stdin.lock(), io::stdout().lock()).context("Falha no console")?;
    Ok(())
}
