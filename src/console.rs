//! Console de linha: imprime as mensagens do controlador em stdout e lê
//! uma resposta por linha. Fim da entrada equivale a `quit`.

use std::io::{self, BufRead, Write};

use crate::dialogue::{ChatMessage, DialogueController, MessageRole, Session};

/// Falhas de leitura seguidas antes de desistir.
const MAX_READ_ERRORS: usize = 3;

/// Conduz a sessão até o fim.
///
/// Uma falha de leitura reinicia o diálogo via [`DialogueController::fail`];
/// depois de [`MAX_READ_ERRORS`] seguidas, o erro é devolvido.
pub fn run<R, W>(controller: &DialogueController, session: &mut Session, mut input: R, mut output: W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    print_all(&mut output, &controller.start(session))?;

    let mut errors = 0;
    let mut line = String::new();
    while !session.is_finished() {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        let messages = match input.read_line(&mut line) {
            Ok(0) => {
                writeln!(output)?;
                controller.respond(session, "quit")
            }
            Ok(_) => {
                errors = 0;
                controller.respond(session, &line)
            }
            Err(e) => {
                errors += 1;
                tracing::warn!(error = %e, errors, "Falha ao ler entrada");
                if errors >= MAX_READ_ERRORS {
                    return Err(e);
                }
                controller.fail(session, e.to_string())
            }
        };
        print_all(&mut output, &messages)?;
    }
    Ok(())
}

fn print_all<W: Write>(output: &mut W, messages: &[ChatMessage]) -> io::Result<()> {
    for message in messages {
        match message.role {
            MessageRole::Question | MessageRole::Suggestion => writeln!(output, "\n{}", message.content)?,
            MessageRole::System | MessageRole::Alert => writeln!(output, "{}", message.content)?,
        }
    }
    output.flush()
}
