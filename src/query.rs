use serde::Serialize;
use serde_json::{json, Map, Value};

pub const DATE_BROWSE_SIZE: usize = 50;
pub const KEYWORD_SEARCH_SIZE: usize = 20;
pub const SEMANTIC_SEARCH_SIZE: usize = 5;
pub const AGENTIC_CORPUS_SIZE: usize = 100;

pub const SEMANTIC_FIELD: &str = "review_text.semantic";
pub const KEYWORD_FIELDS: [&str; 2] = ["title^2", "review_text"];
pub const PROMPT_SOURCE_FIELDS: [&str; 6] =
    ["date", "username", "title", "review_text", "stars", "product"];

/// Descending sort on one field, serialized as `{"<field>": {"order": "desc"}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SortDesc(pub String);

impl Serialize for SortDesc {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut clause = Map::new();
        clause.insert(self.0.clone(), json!({ "order": "desc" }));
        Value::Object(clause).serialize(serializer)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Query {
    #[serde(rename = "match_all")]
    MatchAll {},
    #[serde(rename = "multi_match")]
    MultiMatch {
        query: String,
        fields: Vec<String>,
        #[serde(rename = "type")]
        match_type: String,
        fuzziness: String,
    },
    #[serde(rename = "semantic")]
    Semantic { field: String, query: String },
}

/// Body of a `_search` request against the review index.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Query,
    pub size: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortDesc>,
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub track_scores: bool,
}

impl SearchRequest {
    fn new(query: Query, size: usize) -> Self {
        Self {
            query,
            size,
            sort: Vec::new(),
            source: None,
            track_scores: false,
        }
    }

    fn sort_desc(mut self, field: &str) -> Self {
        self.sort.push(SortDesc(field.to_string()));
        self
    }

    fn source(mut self, fields: &[&str]) -> Self {
        self.source = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Everything, newest first.
    pub fn date_browse() -> Self {
        Self::new(Query::MatchAll {}, DATE_BROWSE_SIZE).sort_desc("date")
    }

    /// Fuzzy lexical search with title matches weighted double, ordered by
    /// relevance and then by date.
    pub fn keyword(text: &str) -> Self {
        let mut request = Self::new(
            Query::MultiMatch {
                query: text.to_string(),
                fields: KEYWORD_FIELDS.iter().map(|f| f.to_string()).collect(),
                match_type: "best_fields".to_string(),
                fuzziness: "AUTO".to_string(),
            },
            KEYWORD_SEARCH_SIZE,
        )
        .sort_desc("_score")
        .sort_desc("date");
        request.track_scores = true;
        request
    }

    pub fn semantic(text: &str) -> Self {
        Self::new(
            Query::Semantic {
                field: SEMANTIC_FIELD.to_string(),
                query: text.to_string(),
            },
            SEMANTIC_SEARCH_SIZE,
        )
        .source(&PROMPT_SOURCE_FIELDS)
    }

    /// Review corpus handed to the pros/cons generator.
    pub fn agentic_corpus() -> Self {
        Self::new(Query::MatchAll {}, AGENTIC_CORPUS_SIZE).source(&PROMPT_SOURCE_FIELDS)
    }
}
