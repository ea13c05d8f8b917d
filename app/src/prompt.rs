//! Delete confirmation on the terminal.

use std::sync::Arc;
use todo_pubsub_components::{AutoConfirm, Confirm, ConfirmFuture};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::Mutex;

use crate::config::ConfirmPolicy;

/// Line reader shared by the REPL and [`PromptConfirm`]
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// Output shared by the REPL and [`PromptConfirm`]
pub type SharedOutput<W> = Arc<Mutex<W>>;

/// Asks `[y/N]` and reads the answer from the REPL's own line reader.
///
/// Anything but `y` or `yes` (including end of input) declines.
pub struct PromptConfirm<R, W> {
    input: SharedLines<R>,
    output: SharedOutput<W>,
}

impl<R, W> PromptConfirm<R, W> {
    /// Ask on `output`, read from `input`
    #[must_use]
    pub const fn new(input: SharedLines<R>, output: SharedOutput<W>) -> Self {
        Self { input, output }
    }
}

impl<R, W> std::fmt::Debug for PromptConfirm<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptConfirm").finish_non_exhaustive()
    }
}

impl<R, W> Confirm for PromptConfirm<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn confirm<'a>(&'a self, message: &'a str) -> ConfirmFuture<'a> {
        Box::pin(async move {
            {
                let mut output = self.output.lock().await;
                let asked = async {
                    output.write_all(format!("{message} [y/N] ").as_bytes()).await?;
                    output.flush().await
                }
                .await;
                if let Err(error) = asked {
                    tracing::warn!(%error, "Could not ask for confirmation");
                    return false;
                }
            }

            let answer = match self.input.lock().await.next_line().await {
                Ok(line) => line.unwrap_or_default(),
                Err(error) => {
                    tracing::warn!(%error, "Could not read confirmation");
                    return false;
                }
            };
            let confirmed = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
            tracing::debug!(confirmed, "Confirmation answered");
            confirmed
        })
    }
}

/// The [`Confirm`] matching `policy`; only [`ConfirmPolicy::Prompt`] touches the terminal
pub fn confirm_for<R, W>(
    policy: ConfirmPolicy,
    input: SharedLines<R>,
    output: SharedOutput<W>,
) -> Arc<dyn Confirm>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    match policy {
        ConfirmPolicy::Prompt => Arc::new(PromptConfirm::new(input, output)),
        ConfirmPolicy::Always => Arc::new(AutoConfirm::YES),
        ConfirmPolicy::Never => Arc::new(AutoConfirm::NO),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    fn prompt(input: &'static [u8]) -> (PromptConfirm<BufReader<&'static [u8]>, Vec<u8>>, SharedOutput<Vec<u8>>) {
        let output = Arc::new(Mutex::new(Vec::new()));
        let lines = Arc::new(Mutex::new(BufReader::new(input).lines()));
        (PromptConfirm::new(lines, Arc::clone(&output)), output)
    }

    #[tokio::test]
    async fn yes_confirms_and_prints_the_question() {
        let (confirm, output) = prompt(b"Y\n");
        assert!(confirm.confirm("Delete it?").await);
        assert_eq!(output.lock().await.as_slice(), b"Delete it? [y/N] ");
    }

    #[tokio::test]
    async fn anything_else_declines() {
        let (confirm, _) = prompt(b"nope\n\n");
        assert!(!confirm.confirm("Delete it?").await);
        assert!(!confirm.confirm("Delete it?").await);
        // End of input
        assert!(!confirm.confirm("Delete it?").await);
    }

    #[tokio::test]
    async fn answers_are_consumed_in_order() {
        let (confirm, _) = prompt(b"yes\nno\n");
        assert!(confirm.confirm("first?").await);
        assert!(!confirm.confirm("second?").await);
    }
}
