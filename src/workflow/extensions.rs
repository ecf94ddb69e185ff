//! Optional translation context: terminology and retrieval
//!
//! No implementation ships with the crate. Callers plug providers into the
//! workflow builder; naming a module in configuration without plugging its
//! provider is rejected before any run starts.

use super::WorkflowError;
use crate::oracle::{LanguagePair, OracleResult};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supplies a terminology string for a unit's source text.
#[async_trait]
pub trait TerminologyProvider: Send + Sync {
    async fn terminology(&self, source_text: &str, languages: &LanguagePair) -> OracleResult<String>;
}

/// Supplies retrieved reference context for a unit's source text.
#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    async fn retrieve(&self, source_text: &str, languages: &LanguagePair) -> OracleResult<String>;
}

/// A capability that is either plugged in or not.
pub enum Extension<T: ?Sized> {
    Absent,
    Present(Arc<T>),
}

impl<T: ?Sized> Extension<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn provider(&self) -> Option<&Arc<T>> {
        match self {
            Self::Absent => None,
            Self::Present(provider) => Some(provider),
        }
    }
}

impl<T: ?Sized> Default for Extension<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T: ?Sized> Clone for Extension<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Present(provider) => Self::Present(Arc::clone(provider)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Extension<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Present(_) => f.write_str("Present"),
        }
    }
}

/// Optional modules that can be named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Terminology,
    Retrieval,
}

impl ModuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Terminology => "terminology",
            Self::Retrieval => "rag",
        }
    }
}

impl FromStr for ModuleKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminology" => Ok(Self::Terminology),
            "rag" | "retrieval" => Ok(Self::Retrieval),
            _ => Err(WorkflowError::UnsupportedModule(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Glossary;

    #[async_trait]
    impl TerminologyProvider for Glossary {
        async fn terminology(&self, _source_text: &str, _languages: &LanguagePair) -> OracleResult<String> {
            Ok("Rat -> council".into())
        }
    }

    #[test]
    fn module_names_parse() {
        assert_eq!("terminology".parse::<ModuleKind>().unwrap(), ModuleKind::Terminology);
        assert_eq!("RAG".parse::<ModuleKind>().unwrap(), ModuleKind::Retrieval);
        assert_eq!(ModuleKind::Retrieval.name(), "rag");
    }

    #[test]
    fn unknown_module_is_unsupported() {
        match "ocr".parse::<ModuleKind>() {
            Err(WorkflowError::UnsupportedModule(name)) => assert_eq!(name, "ocr"),
            other => panic!("expected UnsupportedModule, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn present_extension_exposes_provider() {
        let absent: Extension<dyn TerminologyProvider> = Extension::default();
        assert!(!absent.is_present());
        assert!(absent.provider().is_none());

        let present: Extension<dyn TerminologyProvider> = Extension::Present(Arc::new(Glossary));
        let provider = present.clone().provider().cloned().unwrap();
        let languages = LanguagePair::new("German", "English");
        assert_eq!(provider.terminology("Rat", &languages).await.unwrap(), "Rat -> council");
        assert_eq!(format!("{:?}", present), "Present");
    }
}
