use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use ui_benefits::config::RetrievalConfig;
use ui_benefits::error::AppError;
use ui_benefits::workflows::eligibility::assessment::SectionMetadata;
use ui_benefits::workflows::eligibility::{
    ClaimantFacts, CollaboratorError, EligibilityService, HandbookRetriever, HandbookSection,
    Language, QualitativeAssessor, RetrievalOptions, RuleStore, StateCode,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ServiceHandle =
    Arc<EligibilityService<KeywordHandbookRetriever, UnconfiguredAssessor>>;

/// Loads rules from `path`, or the dataset compiled into the library.
pub(crate) fn load_rule_store(path: Option<&Path>) -> Result<Arc<RuleStore>, AppError> {
    let store = match path {
        Some(path) => RuleStore::from_path(path)?,
        None => RuleStore::embedded()?,
    };
    let source = path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "embedded".to_string());
    info!(
        states = store.len(),
        effective_year = store.metadata().effective_year,
        %source,
        "state rules loaded"
    );
    Ok(Arc::new(store))
}

pub(crate) fn build_service(
    store: Arc<RuleStore>,
    retriever: KeywordHandbookRetriever,
    retrieval: &RetrievalConfig,
) -> ServiceHandle {
    Arc::new(
        EligibilityService::new(store, Arc::new(retriever), Arc::new(UnconfiguredAssessor))
            .with_retrieval_options(RetrievalOptions::new(
                retrieval.match_count,
                retrieval.match_threshold,
            )),
    )
}

#[derive(Debug, Clone)]
pub(crate) struct HandbookExcerpt {
    pub(crate) section_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
}

/// In-process retriever scoring excerpts by the share of query terms they contain.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeywordHandbookRetriever {
    excerpts: HashMap<StateCode, Vec<HandbookExcerpt>>,
}

impl KeywordHandbookRetriever {
    pub(crate) fn with_excerpts<I>(mut self, state: StateCode, excerpts: I) -> Self
    where
        I: IntoIterator<Item = HandbookExcerpt>,
    {
        self.excerpts.entry(state).or_default().extend(excerpts);
        self
    }
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

impl HandbookRetriever for KeywordHandbookRetriever {
    fn retrieve(
        &self,
        query: &str,
        state: &StateCode,
        options: &RetrievalOptions,
    ) -> Result<Vec<HandbookSection>, CollaboratorError> {
        let query_terms = terms(query);
        let Some(excerpts) = self.excerpts.get(state) else {
            return Ok(Vec::new());
        };
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut sections: Vec<HandbookSection> = excerpts
            .iter()
            .filter_map(|excerpt| {
                let content_terms = terms(&format!("{} {}", excerpt.title, excerpt.content));
                let matched = query_terms.intersection(&content_terms).count();
                let similarity = matched as f32 / query_terms.len() as f32;
                (similarity >= options.match_threshold).then(|| HandbookSection {
                    section_id: excerpt.section_id.clone(),
                    content: excerpt.content.clone(),
                    similarity,
                    metadata: SectionMetadata {
                        section_title: Some(excerpt.title.clone()),
                        ..SectionMetadata::default()
                    },
                })
            })
            .collect();

        sections.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.section_id.cmp(&b.section_id))
        });
        sections.truncate(options.match_count);
        Ok(sections)
    }
}

/// Stand-in used until a model-backed assessor is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct UnconfiguredAssessor;

impl QualitativeAssessor for UnconfiguredAssessor {
    fn assess(
        &self,
        _facts: &ClaimantFacts,
        _sections: &[HandbookSection],
    ) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "no qualitative assessor is configured".to_string(),
        ))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_language(raw: &str) -> Result<Language, String> {
    Language::from_tag(raw).ok_or_else(|| format!("unsupported language '{raw}' (use en or es)"))
}
