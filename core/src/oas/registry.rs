#![deny(missing_docs)]

//! # Endpoint Registry
//!
//! Read-only index over a document's endpoints, built once at startup:
//!
//! - exact lookup by `(method, template)`;
//! - matching of concrete request paths against templates;
//! - grouping of templates for route registration;
//! - tag filtering and keyword search for tooling.

use crate::oas::models::{Endpoint, HttpMethod};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

/// Minimum length of a summary/description word to be indexed.
const MIN_WORD_LEN: usize = 3;

/// An endpoint matched against a concrete request path.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    /// The matched endpoint.
    pub endpoint: &'a Endpoint,
    /// Captured path parameters, in template order.
    pub params: IndexMap<String, String>,
}

/// Endpoints sharing one path template.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGroup<'a> {
    /// Template as written in the document.
    pub template: &'a str,
    /// Template in router syntax.
    pub router_path: String,
    /// One endpoint per method.
    pub endpoints: Vec<&'a Endpoint>,
}

/// Index of endpoints by method and template.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
    index: HashMap<(HttpMethod, String), usize>,
    keywords: BTreeMap<String, BTreeSet<usize>>,
}

impl EndpointRegistry {
    /// Builds the registry; the first endpoint wins on a duplicate key.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        let mut index = HashMap::new();
        let mut keywords: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

        for (idx, endpoint) in endpoints.iter().enumerate() {
            index
                .entry((endpoint.method, endpoint.path.clone()))
                .or_insert(idx);
            for keyword in endpoint_keywords(endpoint) {
                keywords.entry(keyword).or_default().insert(idx);
            }
        }

        Self {
            endpoints,
            index,
            keywords,
        }
    }

    /// All endpoints, in document order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// True when the document declares no operations.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Exact lookup by method and path template.
    pub fn lookup(&self, method: HttpMethod, template: &str) -> Option<&Endpoint> {
        self.index
            .get(&(method, template.to_string()))
            .map(|idx| &self.endpoints[*idx])
    }

    /// Matches a concrete request path (`/pets/42`) against the templates
    /// declared for `method`.
    ///
    /// Literal segments beat parameters: `/pets/findByStatus` is preferred over
    /// `/pets/{petId}`. Trailing slashes are ignored.
    pub fn match_request(&self, method: HttpMethod, path: &str) -> Option<RouteMatch<'_>> {
        let request: Vec<&str> = split_segments(path);

        let mut best: Option<(usize, &Endpoint)> = None;
        for endpoint in self.endpoints.iter().filter(|ep| ep.method == method) {
            let Some(score) = match_score(&split_segments(&endpoint.path), &request) else {
                continue;
            };
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, endpoint));
            }
        }

        let (_, endpoint) = best?;
        let params = split_segments(&endpoint.path)
            .into_iter()
            .zip(request)
            .filter_map(|(template_seg, value)| {
                let name = param_name(template_seg)?;
                let decoded = percent_decode_str(value).decode_utf8_lossy().into_owned();
                Some((name.to_string(), decoded))
            })
            .collect();

        Some(RouteMatch { endpoint, params })
    }

    /// Endpoints grouped by template, ordered for route registration:
    /// templates with fewer parameters come first, then document order.
    pub fn templates(&self) -> Vec<RouteGroup<'_>> {
        let mut groups: IndexMap<&str, Vec<&Endpoint>> = IndexMap::new();
        for endpoint in &self.endpoints {
            groups.entry(endpoint.path.as_str()).or_default().push(endpoint);
        }

        let mut out: Vec<RouteGroup<'_>> = groups
            .into_iter()
            .map(|(template, endpoints)| RouteGroup {
                template,
                router_path: to_router_path(template),
                endpoints,
            })
            .collect();
        // Stable sort keeps document order within the same parameter count.
        out.sort_by_key(|group| param_count(group.template));
        out
    }

    /// Endpoints carrying `tag` (case-insensitive).
    pub fn by_tag(&self, tag: &str) -> Vec<&Endpoint> {
        self.endpoints
            .iter()
            .filter(|ep| ep.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Every distinct tag, sorted.
    pub fn tags(&self) -> BTreeSet<&str> {
        self.endpoints
            .iter()
            .flat_map(|ep| ep.tags.iter().map(String::as_str))
            .collect()
    }

    /// Keyword search ranked by the number of query terms hit.
    ///
    /// A term hits an endpoint when one of its keywords starts with the term.
    /// Ties keep document order.
    pub fn search(&self, query: &str) -> Vec<&Endpoint> {
        let mut hits: BTreeMap<usize, usize> = BTreeMap::new();

        for term in tokenize(query) {
            let matched: BTreeSet<usize> = self
                .keywords
                .range(term.clone()..)
                .take_while(|(keyword, _)| keyword.starts_with(&term))
                .flat_map(|(_, endpoints)| endpoints.iter().copied())
                .collect();
            for idx in matched {
                *hits.entry(idx).or_default() += 1;
            }
        }

        let mut ranked: Vec<(usize, usize)> = hits.into_iter().collect();
        ranked.sort_by(|(a_idx, a_hits), (b_idx, b_hits)| b_hits.cmp(a_hits).then(a_idx.cmp(b_idx)));
        ranked
            .into_iter()
            .map(|(idx, _)| &self.endpoints[idx])
            .collect()
    }
}

/// Rewrites `{pet-id}` placeholders into router syntax (`{pet_id}`); names
/// are restricted to `[A-Za-z0-9_]`.
#[allow(clippy::expect_used)]
pub fn to_router_path(template: &str) -> String {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("Invalid regex constant"));

    let path = re.replace_all(template, |caps: &regex::Captures<'_>| {
        let sanitized: String = caps[1]
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if sanitized.is_empty() {
            "{param}".to_string()
        } else {
            format!("{{{}}}", sanitized)
        }
    });

    if path.starts_with('/') {
        path.into_owned()
    } else {
        format!("/{}", path)
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|seg| !seg.is_empty()).collect()
}

fn param_count(template: &str) -> usize {
    split_segments(template)
        .into_iter()
        .filter(|seg| param_name(seg).is_some())
        .count()
}

fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// Number of literal segments matched, or `None` if the template does not fit.
fn match_score(template: &[&str], request: &[&str]) -> Option<usize> {
    if template.len() != request.len() {
        return None;
    }
    let mut literals = 0;
    for (template_seg, request_seg) in template.iter().zip(request) {
        if param_name(template_seg).is_some() {
            continue;
        }
        if template_seg != request_seg {
            return None;
        }
        literals += 1;
    }
    Some(literals)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn endpoint_keywords(endpoint: &Endpoint) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();

    for segment in split_segments(&endpoint.path) {
        if param_name(segment).is_none() {
            keywords.extend(tokenize(segment));
        }
    }
    for tag in &endpoint.tags {
        keywords.insert(tag.to_lowercase());
    }
    for text in [&endpoint.summary, &endpoint.description].into_iter().flatten() {
        keywords.extend(
            tokenize(text)
                .into_iter()
                .filter(|word| word.chars().count() >= MIN_WORD_LEN),
        );
    }
    if let Some(op_id) = &endpoint.operation_id {
        keywords.insert(op_id.to_lowercase());
    }
    keywords.insert(endpoint.method.as_str().to_lowercase());

    keywords
}
