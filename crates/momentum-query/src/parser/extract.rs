//! Generic extractors applied to every query regardless of pattern match.
//!
//! These recognize entities, timeframes, factors, metrics, filters, and
//! visualization hints anywhere in the text. Pattern-specific captures
//! (see [`patterns`](super::patterns)) override what is found here.

use std::sync::LazyLock;

use regex::Regex;

use momentum_core::types::{ConfidenceLevel, MacroFactor, MicroFactor, SourceKind};

use crate::types::{
    EntityMentions, FactorSelector, KnownEntities, MetricKeyword, QueryFilters, QueryKind,
    Timeframe, VisualizationHint,
};

// =============================================================================
// Compiled regex sets (compiled once, reused across calls)
// =============================================================================

/// Corporate-suffix names in original casing, e.g. "Initech Labs".
static COMPANY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][\w&.-]*(?:\s+[A-Z][\w&.-]*)*\s+(?:Inc|Corp|Corporation|Ltd|LLC|Labs|Technologies|Systems|Group|Holdings))\b",
    )
    .expect("Invalid company suffix regex")
});

/// Titled person names in original casing, e.g. "CEO Jane Doe".
static PERSON_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:Mr|Mrs|Ms|Dr|CEO|CTO|CFO|COO|VP|President|Founder|Chairman)\.?\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
    )
    .expect("Invalid person title regex")
});

/// Double-quoted phrases become verbatim concepts.
static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// Relative-timeframe grammar. The matched phrase is kept as-is and
/// resolved to a concrete window at execution time.
static TIMEFRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(today|yesterday|this\s+week|this\s+month|this\s+year|last\s+\d+\s+(?:days?|weeks?|months?|years?)|last\s+(?:day|week|month|year)|q[1-4]\s+\d{4})\b",
    )
    .expect("Invalid timeframe regex")
});

static HIGH_IMPACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:high[\s-]impact|significant|major|critical|important)\b").unwrap()
});

static MEDIUM_IMPACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:medium[\s-]impact|moderate)\b").unwrap());

static LOW_IMPACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:low[\s-]impact|minor)\b").unwrap());

static HIGH_CONFIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:high[\s-]confidence|confident|certain|verified)\b").unwrap()
});

static MEDIUM_CONFIDENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmedium[\s-]confidence\b").unwrap());

static LOW_CONFIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:low[\s-]confidence|uncertain|unverified|rumored)\b").unwrap()
});

static COMPANY_VOCAB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:company|companies|corporate|firm|firms|startup|startups)\b").unwrap()
});

static TECHNOLOGY_VOCAB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:technology|technologies|tech)\b").unwrap());

// Impact tier thresholds are fixed vocabulary mapping, not configuration.
const HIGH_IMPACT_THRESHOLD: u8 = 70;
const MEDIUM_IMPACT_THRESHOLD: u8 = 40;
const LOW_IMPACT_THRESHOLD: u8 = 20;

// =============================================================================
// Keyword vocabularies
// =============================================================================

static MICRO_KEYWORDS: &[(&str, MicroFactor)] = &[
    ("leadership", MicroFactor::Company),
    ("management", MicroFactor::Company),
    ("internal", MicroFactor::Company),
    ("restructuring", MicroFactor::Company),
    ("product launch", MicroFactor::Company),
    ("competitor", MicroFactor::Competition),
    ("competitors", MicroFactor::Competition),
    ("competition", MicroFactor::Competition),
    ("competitive", MicroFactor::Competition),
    ("rival", MicroFactor::Competition),
    ("rivals", MicroFactor::Competition),
    ("partner", MicroFactor::Partners),
    ("partners", MicroFactor::Partners),
    ("partnership", MicroFactor::Partners),
    ("partnerships", MicroFactor::Partners),
    ("alliance", MicroFactor::Partners),
    ("collaboration", MicroFactor::Partners),
    ("customer", MicroFactor::Customers),
    ("customers", MicroFactor::Customers),
    ("client", MicroFactor::Customers),
    ("clients", MicroFactor::Customers),
    ("churn", MicroFactor::Customers),
];

static MACRO_KEYWORDS: &[(&str, MacroFactor)] = &[
    ("economic", MacroFactor::Economic),
    ("economy", MacroFactor::Economic),
    ("inflation", MacroFactor::Economic),
    ("recession", MacroFactor::Economic),
    ("interest rates", MacroFactor::Economic),
    ("regulation", MacroFactor::Regulation),
    ("regulations", MacroFactor::Regulation),
    ("regulatory", MacroFactor::Regulation),
    ("compliance", MacroFactor::Regulation),
    ("antitrust", MacroFactor::Regulation),
    ("legislation", MacroFactor::Regulation),
    ("innovation", MacroFactor::Technology),
    ("breakthrough", MacroFactor::Technology),
    ("technological", MacroFactor::Technology),
    ("disruption", MacroFactor::Technology),
    ("geopolitical", MacroFactor::GeoPolitical),
    ("geo-political", MacroFactor::GeoPolitical),
    ("tariff", MacroFactor::GeoPolitical),
    ("tariffs", MacroFactor::GeoPolitical),
    ("sanctions", MacroFactor::GeoPolitical),
    ("trade war", MacroFactor::GeoPolitical),
    ("environmental", MacroFactor::Environment),
    ("climate", MacroFactor::Environment),
    ("sustainability", MacroFactor::Environment),
    ("carbon", MacroFactor::Environment),
    ("supply chain", MacroFactor::SupplyChain),
    ("supply-chain", MacroFactor::SupplyChain),
    ("logistics", MacroFactor::SupplyChain),
    ("shortage", MacroFactor::SupplyChain),
    ("shortages", MacroFactor::SupplyChain),
];

static METRIC_KEYWORDS: &[(&str, MetricKeyword)] = &[
    ("impact", MetricKeyword::Impact),
    ("count", MetricKeyword::Count),
    ("average", MetricKeyword::Average),
    ("growth", MetricKeyword::Growth),
    ("confidence", MetricKeyword::Confidence),
];

static VISUALIZATION_KEYWORDS: &[(&str, VisualizationHint)] = &[
    ("timeline", VisualizationHint::Timeline),
    ("chart", VisualizationHint::Chart),
    ("graph", VisualizationHint::Chart),
    ("plot", VisualizationHint::Chart),
    ("network", VisualizationHint::Network),
    ("heatmap", VisualizationHint::Heatmap),
    ("heat map", VisualizationHint::Heatmap),
    ("table", VisualizationHint::Table),
    ("tabular", VisualizationHint::Table),
    ("cards", VisualizationHint::Cards),
    ("list", VisualizationHint::Cards),
];

/// Technology terms recognized without a catalog entry.
static KNOWN_TECH_TERMS: &[&str] = &[
    "AI",
    "artificial intelligence",
    "machine learning",
    "cloud computing",
    "blockchain",
    "quantum computing",
    "robotics",
    "5G",
    "semiconductors",
    "cybersecurity",
    "autonomous vehicles",
    "augmented reality",
    "virtual reality",
    "edge computing",
    "biotech",
];

/// Location names recognized without a catalog entry.
static KNOWN_LOCATIONS: &[&str] = &[
    "New York",
    "San Francisco",
    "Silicon Valley",
    "London",
    "Berlin",
    "Paris",
    "Tokyo",
    "Beijing",
    "Shanghai",
    "Shenzhen",
    "Singapore",
    "Seattle",
    "Austin",
    "Boston",
    "Dublin",
    "Amsterdam",
    "Bangalore",
    "Tel Aviv",
    "Europe",
    "Asia",
    "China",
    "Japan",
    "Germany",
    "India",
    "Taiwan",
    "United States",
];

// Stop words dropped during subject classification: grammatical filler,
// query phrasing, metric/visualization vocabulary (owned by their own
// extractors), and generic corpus nouns
static STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "am", "be", "been", "being", "have", "has",
    "had", "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must", "can",
    "could", "i", "me", "my", "we", "our", "you", "your", "he", "she", "it", "they", "them",
    "his", "her", "its", "their", "what", "which", "who", "whom", "this", "that", "these",
    "those", "of", "in", "to", "for", "with", "on", "at", "from", "by", "about", "as", "into",
    "through", "during", "before", "after", "above", "below", "between", "and", "but", "or",
    "not", "no", "so", "if", "then", "than", "too", "very", "just", "also", "up", "out", "all",
    "any", "some", "how", "when", "where", "why", "there", "here", "more", "most", "many",
    "much", "show", "find", "search", "look", "give", "tell", "see", "get", "happened",
    "happening", "going", "driving", "compare", "compared", "comparison", "versus",
    "difference", "differences", "analysis", "analyze", "analyse", "insight", "insights",
    "summary", "statistics", "only", "filter", "filtered", "narrow", "pattern", "patterns",
    "cluster", "clusters", "sequence", "sequences", "connection", "connections", "correlation",
    "correlations", "relationship", "relationships", "trend", "trends", "trending", "chart",
    "charts", "graph", "graphs", "plot", "plots", "timeline", "timelines", "table", "tables",
    "heatmap", "cards", "network", "visualize", "visualization", "impact", "confidence",
    "average", "count", "counts", "total", "number", "numbers", "growth", "high", "medium",
    "low", "top", "highest", "lowest", "biggest", "largest", "smallest", "maximum", "minimum",
    "max", "min", "moment", "moments", "event", "events", "news", "data", "item", "items",
    "result", "results", "info", "information", "stuff", "things", "everything", "anything",
    "something",
];

// Time-related words stripped from subject classification (the timeframe
// extractor owns these)
static TIME_WORDS: &[&str] = &[
    "today",
    "yesterday",
    "day",
    "days",
    "week",
    "weeks",
    "month",
    "months",
    "year",
    "years",
    "quarter",
    "last",
    "recent",
    "recently",
    "over",
    "time",
    "ago",
    "since",
    "now",
    "currently",
    "q1",
    "q2",
    "q3",
    "q4",
];

// =============================================================================
// Entity extraction
// =============================================================================

/// Extract entity mentions from the raw (original-case) query text.
///
/// Combines the known-entity catalog (canonical casing wins) with
/// category-tagged recognizers: corporate suffixes, personal titles,
/// built-in technology terms, and location names. Double-quoted phrases
/// become concepts.
pub fn extract_entities(text: &str, known: &KnownEntities) -> EntityMentions {
    let mut mentions = EntityMentions::default();

    // Catalog scan, canonical casing from the catalog
    for name in &known.companies {
        if contains_word(text, name) {
            push_unique(&mut mentions.companies, name);
        }
    }
    for name in &known.technologies {
        if contains_word(text, name) {
            push_unique(&mut mentions.technologies, name);
        }
    }
    for name in &known.people {
        if contains_word(text, name) {
            push_unique(&mut mentions.people, name);
        }
    }
    for name in &known.locations {
        if contains_word(text, name) {
            push_unique(&mut mentions.locations, name);
        }
    }

    // Corporate-suffix names ("Initech Labs", "Acme Corp")
    for caps in COMPANY_SUFFIX_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push_unique(&mut mentions.companies, m.as_str());
        }
    }

    // Built-in technology vocabulary
    for term in KNOWN_TECH_TERMS {
        if contains_word(text, term) {
            push_unique(&mut mentions.technologies, term);
        }
    }

    // Titled person names ("CEO Jane Doe")
    for caps in PERSON_TITLE_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push_unique(&mut mentions.people, m.as_str());
        }
    }

    // Built-in location vocabulary
    for location in KNOWN_LOCATIONS {
        if contains_word(text, location) {
            push_unique(&mut mentions.locations, location);
        }
    }

    // Double-quoted phrases are verbatim concepts
    for caps in QUOTED_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            let phrase = m.as_str().trim();
            if !phrase.is_empty() {
                push_unique(&mut mentions.concepts, phrase);
            }
        }
    }

    mentions
}

/// Classify a captured subject phrase (already lowercased) against the
/// known catalog.
///
/// Catalog and built-in vocabulary hits land in their category with
/// canonical casing; leftover tokens of three or more characters that are
/// not query filler become concepts.
pub fn classify_subject(subject: &str, known: &KnownEntities) -> EntityMentions {
    let subject = subject.trim().trim_end_matches(['?', '.', '!']);
    let mut mentions = EntityMentions::default();
    if subject.is_empty() {
        return mentions;
    }

    for name in &known.companies {
        if contains_word(subject, name) {
            push_unique(&mut mentions.companies, name);
        }
    }
    for name in &known.technologies {
        if contains_word(subject, name) {
            push_unique(&mut mentions.technologies, name);
        }
    }
    for name in &known.people {
        if contains_word(subject, name) {
            push_unique(&mut mentions.people, name);
        }
    }
    for name in &known.locations {
        if contains_word(subject, name) {
            push_unique(&mut mentions.locations, name);
        }
    }
    for term in KNOWN_TECH_TERMS {
        if contains_word(subject, term) {
            push_unique(&mut mentions.technologies, term);
        }
    }
    for location in KNOWN_LOCATIONS {
        if contains_word(subject, location) {
            push_unique(&mut mentions.locations, location);
        }
    }

    // Leftover tokens become concepts
    let matched: Vec<String> = mentions
        .all_names()
        .iter()
        .map(|name| name.to_lowercase())
        .collect();
    for word in subject.split_whitespace() {
        let mut clean = word
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '&')
            .to_lowercase();
        if let Some(stripped) = clean.strip_suffix("'s") {
            clean = stripped.to_string();
        }
        if clean.len() < 3 {
            continue;
        }
        // Bare numbers are timeframe years or counts, never topics
        if clean.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if STOP_WORDS.contains(&clean.as_str()) || TIME_WORDS.contains(&clean.as_str()) {
            continue;
        }
        if matched.iter().any(|name| name.contains(&clean)) {
            continue;
        }
        push_unique(&mut mentions.concepts, &clean);
    }

    mentions
}

// =============================================================================
// Timeframe extraction
// =============================================================================

/// Extract a relative-timeframe phrase, if any temporal expression is
/// present. The phrase is normalized (lowercase, single spaces) but not
/// resolved to dates here.
pub fn extract_timeframe(text: &str) -> Option<Timeframe> {
    TIMEFRAME_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| Timeframe::Phrase(normalize_phrase(m.as_str())))
}

// =============================================================================
// Factor extraction
// =============================================================================

/// Map causal keywords onto the closed micro/macro factor enums.
pub fn extract_factors(text: &str) -> Option<FactorSelector> {
    let mut selector = FactorSelector::default();
    for &(keyword, factor) in MICRO_KEYWORDS {
        if contains_word(text, keyword) && !selector.micro.contains(&factor) {
            selector.micro.push(factor);
        }
    }
    for &(keyword, factor) in MACRO_KEYWORDS {
        if contains_word(text, keyword) && !selector.macro_factors.contains(&factor) {
            selector.macro_factors.push(factor);
        }
    }
    if selector.is_empty() {
        None
    } else {
        Some(selector)
    }
}

// =============================================================================
// Metric extraction
// =============================================================================

/// Collect metric keywords in fixed vocabulary order.
pub fn extract_metrics(text: &str) -> Vec<MetricKeyword> {
    let mut metrics = Vec::new();
    for &(keyword, metric) in METRIC_KEYWORDS {
        if contains_word(text, keyword) && !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    metrics
}

// =============================================================================
// Filter extraction
// =============================================================================

/// Extract generic result filters: impact tier, confidence tier, and
/// source kind (only when vocabulary for exactly one kind appears).
pub fn extract_filters(text: &str) -> Option<QueryFilters> {
    let mut filters = QueryFilters::default();

    if HIGH_IMPACT_RE.is_match(text) {
        filters.impact_threshold = Some(HIGH_IMPACT_THRESHOLD);
    } else if MEDIUM_IMPACT_RE.is_match(text) {
        filters.impact_threshold = Some(MEDIUM_IMPACT_THRESHOLD);
    } else if LOW_IMPACT_RE.is_match(text) {
        filters.impact_threshold = Some(LOW_IMPACT_THRESHOLD);
    }

    if HIGH_CONFIDENCE_RE.is_match(text) {
        filters.confidence_level = Some(ConfidenceLevel::High);
    } else if MEDIUM_CONFIDENCE_RE.is_match(text) {
        filters.confidence_level = Some(ConfidenceLevel::Medium);
    } else if LOW_CONFIDENCE_RE.is_match(text) {
        filters.confidence_level = Some(ConfidenceLevel::Low);
    }

    let company_vocab = COMPANY_VOCAB_RE.is_match(text);
    let technology_vocab = TECHNOLOGY_VOCAB_RE.is_match(text);
    filters.source_kind = match (company_vocab, technology_vocab) {
        (true, false) => Some(SourceKind::Company),
        (false, true) => Some(SourceKind::Technology),
        _ => None,
    };

    if filters.is_empty() {
        None
    } else {
        Some(filters)
    }
}

// =============================================================================
// Visualization inference
// =============================================================================

/// An explicit visualization keyword in the text, if any. First vocabulary
/// hit wins.
pub fn extract_visualization(text: &str) -> Option<VisualizationHint> {
    VISUALIZATION_KEYWORDS
        .iter()
        .find(|(keyword, _)| contains_word(text, keyword))
        .map(|&(_, hint)| hint)
}

/// Default hint for an intent kind when the text names no visualization.
pub fn default_visualization(kind: QueryKind) -> VisualizationHint {
    match kind {
        QueryKind::Temporal => VisualizationHint::Timeline,
        QueryKind::Comparison | QueryKind::Aggregate | QueryKind::Trend => VisualizationHint::Chart,
        QueryKind::Pattern => VisualizationHint::Network,
        _ => VisualizationHint::Cards,
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Case-insensitive whole-word containment: "AI" matches "about AI" but
/// not "maintain".
fn contains_word(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(&needle) {
        let start = from + pos;
        let end = start + needle.len();
        let left_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let right_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        from = end;
    }
    false
}

fn push_unique(dest: &mut Vec<String>, name: &str) {
    if !dest.iter().any(|existing| existing.eq_ignore_ascii_case(name)) {
        dest.push(name.to_string());
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
