//! Turns fetched articles into the two texts the rest of the pipeline consumes.
//!
//! - The **corpus** feeds keyword extraction: `title description` for every
//!   article that has a description, space separated, in fetch order.
//! - The **prompt block** feeds the summarizer: one entry per article, with
//!   a placeholder standing in for a missing description.

use crate::models::Article;

/// Stands in for an absent description inside the prompt block.
pub const MISSING_DESCRIPTION: &str = "(sem descrição)";

/// Aggregated texts for one batch of articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub corpus: String,
    pub prompt_block: String,
}

impl Aggregate {
    /// Whether there is any text worth summarizing or extracting from.
    ///
    /// When this is false, neither the summarizer nor the extractor may be
    /// called.
    pub fn has_corpus(&self) -> bool {
        !self.corpus.trim().is_empty()
    }
}

pub fn aggregate(articles: &[Article]) -> Aggregate {
    if articles.is_empty() {
        return Aggregate::default();
    }
    Aggregate {
        corpus: build_corpus(articles),
        prompt_block: build_prompt_block(articles),
    }
}

pub fn build_corpus(articles: &[Article]) -> String {
    articles
        .iter()
        .filter(|a| a.has_description())
        .map(|a| format!("{} {}", a.title, a.description))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_prompt_block(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| {
            let description = if a.has_description() {
                a.description.as_str()
            } else {
                MISSING_DESCRIPTION
            };
            format!("- Título: {}\n  Descrição: {}", a.title, description)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: &str) -> Article {
        Article {
            title: title.to_string(),
            description: description.to_string(),
            ..Article::default()
        }
    }

    #[test]
    fn test_corpus_skips_missing_descriptions() {
        let articles = vec![
            article("Lira discursa", "Fala sobre economia"),
            article("Sem descrição", ""),
            article("Votação adiada", "Plenário adia votação"),
        ];
        let agg = aggregate(&articles);
        assert_eq!(
            agg.corpus,
            "Lira discursa Fala sobre economia Votação adiada Plenário adia votação"
        );
        assert!(agg.has_corpus());
    }

    #[test]
    fn test_prompt_block_includes_every_article() {
        let articles = vec![article("Lira discursa", "Fala sobre economia"), article("Sem descrição", "")];
        let agg = aggregate(&articles);
        assert_eq!(
            agg.prompt_block,
            "- Título: Lira discursa\n  Descrição: Fala sobre economia\n- Título: Sem descrição\n  Descrição: (sem descrição)"
        );
    }

    #[test]
    fn test_all_descriptions_empty_yields_empty_corpus() {
        let articles = vec![article("Um", ""), article("Dois", "   ")];
        let agg = aggregate(&articles);
        assert_eq!(agg.corpus, "");
        assert!(!agg.has_corpus());
        assert!(!agg.prompt_block.is_empty());
    }

    #[test]
    fn test_no_articles() {
        let agg = aggregate(&[]);
        assert_eq!(agg, Aggregate::default());
        assert!(!agg.has_corpus());
    }
}
