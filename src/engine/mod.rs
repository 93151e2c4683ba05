// Answer engine boundary.
//
// The pipeline treats answer generation as an opaque capability: a
// question, a document set and an engine identifier go in, answer text
// comes out. Retrieval, chunking and similarity search live behind this
// trait.

pub mod openai;

use async_trait::async_trait;

use crate::types::PipelineResult;

pub use openai::OpenAiEngine;

#[async_trait]
pub trait AnswerEngine: Send + Sync {
    /// Generate an answer for `question` against `document_ids` using the
    /// engine identified by `model`. Runs to completion; there is no
    /// mid-flight cancellation.
    async fn generate(
        &self,
        question: &str,
        document_ids: &[String],
        model: &str,
    ) -> PipelineResult<String>;
}
