//! News search for a legislator.
//!
//! The pipeline only depends on the [`NewsFetcher`] seam: give it a query,
//! get back an ordered list of [`Article`]s (possibly empty). The production
//! implementation is [`google::GoogleNews`], which reads the Google News RSS
//! search feed restricted to Portuguese/Brazil.
//!
//! # Query styles
//!
//! | Style | Query sent |
//! |-------|------------|
//! | [`QueryStyle::Deputado`] | `deputado {name}` |
//! | [`QueryStyle::Federal`] | `"{name}" deputado federal` |

pub mod google;

use crate::error::NewsError;
use crate::models::Article;
use serde::{Deserialize, Serialize};

/// Async news search.
pub trait NewsFetcher {
    /// Run `query` and return the matching articles in feed order.
    async fn fetch(&self, query: &str) -> Result<Vec<Article>, NewsError>;
}

/// How the subject's name is turned into a search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryStyle {
    /// `deputado {name}`
    #[default]
    Deputado,
    /// `"{name}" deputado federal` (exact-phrase match on the name)
    Federal,
}

impl QueryStyle {
    pub fn query_for(self, name: &str) -> String {
        let name = name.trim();
        match self {
            Self::Deputado => format!("deputado {name}"),
            Self::Federal => format!("\"{name}\" deputado federal"),
        }
    }
}
