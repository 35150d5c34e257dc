//! Source material → front/back pairs.
//!
//! The AI backend that turns notes into cards lives outside this workspace;
//! anything implementing [`CardGenerator`] can feed `DeckService`.

use async_trait::async_trait;
use studydeck_core::model::GeneratedCard;

use crate::error::GeneratorError;

#[async_trait]
pub trait CardGenerator: Send + Sync {
    /// Produce card pairs for the given source text.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` if the backend cannot produce cards.
    async fn generate(&self, source: &str) -> Result<Vec<GeneratedCard>, GeneratorError>;
}

/// Reads pre-written cards, one `front<TAB>back` pair per line.
///
/// Blank lines and lines starting with `#` are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabSeparatedGenerator;

impl TabSeparatedGenerator {
    /// # Errors
    ///
    /// Returns `GeneratorError::Malformed` for a line without a tab.
    pub fn parse(source: &str) -> Result<Vec<GeneratedCard>, GeneratorError> {
        let mut cards = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((front, back)) = line.split_once('\t') else {
                return Err(GeneratorError::Malformed {
                    line: idx + 1,
                    reason: "expected front and back separated by a tab".into(),
                });
            };
            cards.push(GeneratedCard::new(front.trim(), back.trim()));
        }
        Ok(cards)
    }
}

#[async_trait]
impl CardGenerator for TabSeparatedGenerator {
    async fn generate(&self, source: &str) -> Result<Vec<GeneratedCard>, GeneratorError> {
        if source.trim().is_empty() {
            return Err(GeneratorError::EmptySource);
        }
        Self::parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_comments() {
        let source = "# biology\nmitochondria\tpowerhouse of the cell\n\n ribosome \t protein synthesis \n";
        let cards = TabSeparatedGenerator::parse(source).unwrap();
        assert_eq!(
            cards,
            vec![
                GeneratedCard::new("mitochondria", "powerhouse of the cell"),
                GeneratedCard::new("ribosome", "protein synthesis"),
            ]
        );
    }

    #[test]
    fn reports_line_without_tab() {
        let err = TabSeparatedGenerator::parse("a\tb\nno tab here").unwrap_err();
        assert!(matches!(err, GeneratorError::Malformed { line: 2, .. }));
    }

    #[tokio::test]
    async fn empty_source_is_rejected() {
        let err = TabSeparatedGenerator.generate("  \n ").await.unwrap_err();
        assert!(matches!(err, GeneratorError::EmptySource));
    }
}
