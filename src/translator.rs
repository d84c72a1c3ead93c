//! The translation capability the aligner is handed.
//!
//! Implementations own transport, authentication, retries and timeouts. The
//! aligner only sees a blocking `translate` call that either returns text or one
//! of the [`TranslateError`] variants.

use std::sync::Arc;

use thiserror::Error;

mod command;

pub use command::CommandTranslator;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("translator rejected credentials")]
    Unauthenticated,

    #[error("translator unreachable: {0}")]
    Network(String),

    #[error("translator vendor error {code}: {message}")]
    Vendor { code: i32, message: String },
}

pub trait Translator {
    fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Adapts a closure into a [`Translator`].
pub fn from_fn<F>(f: F) -> FnTranslator<F>
where
    F: Fn(&str) -> Result<String, TranslateError>,
{
    FnTranslator(f)
}

#[derive(Clone, Copy)]
pub struct FnTranslator<F>(F);

impl<F> Translator for FnTranslator<F>
where
    F: Fn(&str) -> Result<String, TranslateError>,
{
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (self.0)(text)
    }
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (**self).translate(text)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (**self).translate(text)
    }
}

impl<T: Translator + ?Sized> Translator for Arc<T> {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (**self).translate(text)
    }
}

/// Returns its input unchanged. Used for dry runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}
