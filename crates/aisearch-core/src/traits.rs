use crate::error::Result;

/// Turns text into fixed-length vectors.
///
/// Implementations return one vector per input, in input order, each of
/// length `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.embed_batch(&[text.to_string()])?;
        out.pop().ok_or(crate::error::Error::EmbeddingCount { expected: 1, got: 0 })
    }
}
