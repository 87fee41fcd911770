use std::collections::HashSet;
use std::sync::Arc;

use actnotes_types::notes::source_token;
use actnotes_types::{NoteRule, RawNote, RawNoteRule};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::AppConfig;
use crate::error::LoadError;

/// Format of the files an index lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Flat list of steps, fetched as `/{path}`; one ungated rule per file
    Helper,
    /// List of gated rules, fetched as `{path}`
    Notes,
}

/// An index resource and the format of the files it lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSource {
    pub index: String,
    pub kind: SourceKind,
}

impl RuleSource {
    pub fn helper(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            kind: SourceKind::Helper,
        }
    }

    pub fn notes(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            kind: SourceKind::Notes,
        }
    }

    fn resource_path(&self, listed: &str) -> String {
        match self.kind {
            SourceKind::Helper => format!("/{}", listed.trim_start_matches('/')),
            SourceKind::Notes => listed.to_string(),
        }
    }

    fn token(&self, listed: &str) -> String {
        match self.kind {
            SourceKind::Helper => format!("helper-{}", source_token(listed)),
            SourceKind::Notes => source_token(listed),
        }
    }
}

/// Immutable, ordered rules from one load. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Arc<[NoteRule]>,
}

impl RuleSet {
    pub fn new(rules: Vec<NoteRule>) -> Self {
        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = rules
            .iter()
            .flat_map(|r| r.notes.iter())
            .filter(|n| !seen.insert(n.id.as_str()))
            .map(|n| n.id.as_str())
            .collect();
        if !duplicates.is_empty() {
            warn!(?duplicates, "Duplicate note ids, a source is probably listed twice");
        }

        Self {
            rules: rules.into(),
        }
    }

    pub fn rules(&self) -> &[NoteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn note_count(&self) -> usize {
        self.rules.iter().map(|r| r.notes.len()).sum()
    }
}

/// Loads the rule set from the backend's index resources
#[derive(Debug, Clone)]
pub struct RuleStore {
    sources: Vec<RuleSource>,
}

impl RuleStore {
    pub fn new(sources: Vec<RuleSource>) -> Self {
        Self { sources }
    }

    /// Helper index (if configured) first, then the note index
    pub fn from_config(config: &AppConfig) -> Self {
        let mut sources = Vec::with_capacity(2);
        if let Some(helper) = &config.helper_index {
            sources.push(RuleSource::helper(helper.clone()));
        }
        sources.push(RuleSource::notes(config.note_index.clone()));
        Self::new(sources)
    }

    pub fn sources(&self) -> &[RuleSource] {
        &self.sources
    }

    /// Fetch every source in order into a fresh rule set.
    ///
    /// Any unreachable or malformed resource fails the whole load.
    pub async fn load(&self, backend: &dyn Backend) -> Result<RuleSet, LoadError> {
        let mut rules = Vec::new();
        let mut tokens = HashSet::new();

        for source in &self.sources {
            let listed: Vec<String> = fetch_json(backend, &source.index).await?;
            debug!(index = %source.index, files = listed.len(), "Fetched note index");

            for path in &listed {
                let resource = source.resource_path(path);
                let token = claim_token(&mut tokens, source.token(path));
                match source.kind {
                    SourceKind::Helper => {
                        let steps: Vec<RawNote> = fetch_json(backend, &resource).await?;
                        rules.push(NoteRule::ungated(steps, &token, 0));
                    }
                    SourceKind::Notes => {
                        let raw: Vec<RawNoteRule> = fetch_json(backend, &resource).await?;
                        rules.extend(
                            raw.into_iter()
                                .enumerate()
                                .map(|(i, rule)| NoteRule::from_raw(rule, &token, i)),
                        );
                    }
                }
            }
        }

        let set = RuleSet::new(rules);
        info!(rules = set.len(), notes = set.note_count(), "Note rules loaded");
        Ok(set)
    }
}

/// Reserve `token` for one file of a load. A token already taken by an earlier
/// file gets the first free `~n` suffix. `source_token` never emits `~`, so a
/// suffixed token cannot clash with a plain one.
fn claim_token(taken: &mut HashSet<String>, token: String) -> String {
    if taken.insert(token.clone()) {
        return token;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{token}~{n}");
        if taken.insert(candidate.clone()) {
            debug!(token = %token, claimed = %candidate, "Source token already taken");
            return candidate;
        }
        n += 1;
    }
}

async fn fetch_json<T: DeserializeOwned>(backend: &dyn Backend, path: &str) -> Result<T, LoadError> {
    let body = backend
        .fetch_text(path)
        .await
        .map_err(|source| LoadError::Unreachable {
            path: path.to_string(),
            source,
        })?;
    serde_json::from_str(&body).map_err(|source| LoadError::Malformed {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use actnotes_types::NoteKind;

    fn note_backend() -> FakeBackend {
        FakeBackend::new()
            .with_resource("/note", r#"["/notes/act1.json", "/notes/act2.json"]"#)
            .with_resource(
                "/notes/act1.json",
                r#"[
                    {"minLevel": 5, "maxLevel": 10, "zones": ["The Coast"], "notes": ["hello"]},
                    {"notes": ["a", {"type": "click", "text": "/oos"}]}
                ]"#,
            )
            .with_resource("/notes/act2.json", r#"[{"zones": ["The Crossroads"], "notes": ["c"]}]"#)
    }

    fn ids(set: &RuleSet) -> Vec<String> {
        set.rules()
            .iter()
            .flat_map(|r| r.notes.iter().map(|n| n.id.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_load_flattens_in_file_then_declaration_order() {
        let backend = note_backend();
        let store = RuleStore::new(vec![RuleSource::notes("/note")]);

        let set = store.load(&backend).await.unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(
            ids(&set),
            ["notes-act1-0-0", "notes-act1-1-0", "notes-act1-1-1", "notes-act2-0-0"]
        );
        assert_eq!(set.rules()[0].min_level, Some(5));
        assert_eq!(set.rules()[1].notes[1].kind, NoteKind::Click);
        assert_eq!(
            backend.fetched(),
            ["/note", "/notes/act1.json", "/notes/act2.json"]
        );
    }

    #[tokio::test]
    async fn test_ids_are_stable_across_loads() {
        let backend = note_backend();
        let store = RuleStore::new(vec![RuleSource::notes("/note")]);

        let first = store.load(&backend).await.unwrap();
        let second = store.load(&backend).await.unwrap();
        assert_eq!(ids(&first), ids(&second));
        // Each load is a fresh set, never appended to
        assert_eq!(second.len(), 3);
    }

    #[tokio::test]
    async fn test_helpers_load_as_ungated_rules_before_notes() {
        let backend = note_backend()
            .with_resource("/helper", r#"["helpers/league-start.json"]"#)
            .with_resource(
                "/helpers/league-start.json",
                r#"["buy a quicksilver", {"type": "click", "text": "/hideout"}]"#,
            );
        let config = AppConfig {
            helper_index: Some("/helper".to_string()),
            ..AppConfig::default()
        };
        let store = RuleStore::from_config(&config);

        let set = store.load(&backend).await.unwrap();

        let helper = &set.rules()[0];
        assert_eq!(helper.min_level, None);
        assert_eq!(helper.max_level, None);
        assert_eq!(helper.zones, None);
        assert_eq!(helper.notes[0].id, "helper-helpers-league-start-0-0");
        assert_eq!(helper.notes[1].kind, NoteKind::Click);
        assert_eq!(set.len(), 4);
        assert!(backend.fetched().contains(&"/helpers/league-start.json".to_string()));
    }

    #[tokio::test]
    async fn test_colliding_paths_get_distinct_ids() {
        let backend = FakeBackend::new()
            .with_resource(
                "/note",
                r#"["/notes/act 1.json", "/notes/act_1.json", "/notes/act.1.json"]"#,
            )
            .with_resource("/notes/act 1.json", r#"[{"notes": ["a"]}]"#)
            .with_resource("/notes/act_1.json", r#"[{"notes": ["b"]}]"#)
            .with_resource("/notes/act.1.json", r#"[{"notes": ["c"]}]"#);
        let store = RuleStore::new(vec![RuleSource::notes("/note")]);

        let set = store.load(&backend).await.unwrap();
        assert_eq!(
            ids(&set),
            ["notes-act_1-0-0", "notes-act_1~1-0-0", "notes-act_1~2-0-0"]
        );
        // Same listing, same ids
        assert_eq!(ids(&store.load(&backend).await.unwrap()), ids(&set));
    }

    #[tokio::test]
    async fn test_note_file_cannot_take_helper_ids() {
        let backend = FakeBackend::new()
            .with_resource("/helper", r#"["steps.json"]"#)
            .with_resource("/steps.json", r#"["x"]"#)
            .with_resource("/note", r#"["/helper-steps.json"]"#)
            .with_resource("/helper-steps.json", r#"[{"notes": ["y"]}]"#);
        let store = RuleStore::new(vec![RuleSource::helper("/helper"), RuleSource::notes("/note")]);

        let set = store.load(&backend).await.unwrap();
        assert_eq!(ids(&set), ["helper-steps-0-0", "helper-steps~1-0-0"]);
    }

    #[test]
    fn test_claim_token() {
        let mut taken = HashSet::new();
        assert_eq!(claim_token(&mut taken, "a".to_string()), "a");
        assert_eq!(claim_token(&mut taken, "a".to_string()), "a~1");
        assert_eq!(claim_token(&mut taken, "a".to_string()), "a~2");
        assert_eq!(claim_token(&mut taken, "b".to_string()), "b");
    }

    #[tokio::test]
    async fn test_unreachable_source_aborts_load() {
        let backend = FakeBackend::new()
            .with_resource("/note", r#"["/notes/act1.json", "/notes/missing.json"]"#)
            .with_resource("/notes/act1.json", r#"[{"notes": ["a"]}]"#);
        let store = RuleStore::new(vec![RuleSource::notes("/note")]);

        let err = store.load(&backend).await.unwrap_err();
        assert!(matches!(err, LoadError::Unreachable { .. }));
        assert_eq!(err.path(), "/notes/missing.json");
    }

    #[tokio::test]
    async fn test_unreachable_index_aborts_load() {
        let backend = FakeBackend::new();
        let store = RuleStore::new(vec![RuleSource::notes("/note")]);

        let err = store.load(&backend).await.unwrap_err();
        assert_eq!(err.path(), "/note");
    }

    #[tokio::test]
    async fn test_malformed_source_aborts_load() {
        let backend = FakeBackend::new()
            .with_resource("/note", r#"["/notes/act1.json", "/notes/bad.json"]"#)
            .with_resource("/notes/act1.json", r#"[{"notes": ["a"]}]"#)
            .with_resource("/notes/bad.json", r#"[{"minLevel": "five", "notes": []}]"#);
        let store = RuleStore::new(vec![RuleSource::notes("/note")]);

        let err = store.load(&backend).await.unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
        assert_eq!(err.path(), "/notes/bad.json");
    }

    #[tokio::test]
    async fn test_malformed_index_aborts_load() {
        let backend = FakeBackend::new().with_resource("/note", r#"{"not": "a list"}"#);
        let store = RuleStore::new(vec![RuleSource::notes("/note")]);

        assert!(matches!(
            store.load(&backend).await,
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_from_config_without_helpers() {
        let store = RuleStore::from_config(&AppConfig::default());
        assert_eq!(store.sources(), [RuleSource::notes("/note")]);
    }
}
