//! Confirmation capability for destructive actions.
//!
//! Whether a delete asks the user, always proceeds or never proceeds is the
//! bootstrap's choice, made by picking the [`Confirm`] it injects.

use std::future::Future;
use std::pin::Pin;

/// Future returned by [`Confirm::confirm`]
pub type ConfirmFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// Asks whether to go ahead with an action.
pub trait Confirm: Send + Sync {
    /// Resolves to `true` when the action described by `message` should proceed
    fn confirm<'a>(&'a self, message: &'a str) -> ConfirmFuture<'a>;
}

/// Answers every question the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl AutoConfirm {
    /// Always proceed
    pub const YES: Self = Self(true);
    /// Never proceed
    pub const NO: Self = Self(false);
}

impl Confirm for AutoConfirm {
    fn confirm<'a>(&'a self, message: &'a str) -> ConfirmFuture<'a> {
        let answer = self.0;
        tracing::debug!(message, answer, "Auto-answered confirmation");
        Box::pin(async move { answer })
    }
}
