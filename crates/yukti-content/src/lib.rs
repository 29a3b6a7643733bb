//! Campaign copy generation for every catalog platform.
//!
//! A [`ContentGenerator`] turns a topic into platform-tailored copy through a
//! hosted [`TextModel`], a [`Translator`] localizes it on a best-effort basis,
//! and [`ContentPipeline::generate_all`] fans both out across the catalog.

pub mod error;
pub mod fanout;
pub mod generator;
pub mod model;
pub mod translator;

pub use error::{GenerateError, ModelError, TranslateError};
pub use fanout::{ContentPipeline, GeneratedPost};
pub use generator::ContentGenerator;
pub use model::{BedrockClient, SamplingParams, TextModel};
pub use translator::{
    needs_translation, TranslateClient, Translation, TranslationBackend, Translator,
};
