use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::parsers::Document;
use crate::parsers::html;

/// Number of columns in every entity record
pub const FIELD_COUNT: usize = 6;

/// The closed set of entity fields, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Name")]
    Name,
    #[serde(rename = "Contact Information")]
    ContactInformation,
    #[serde(rename = "Occupation")]
    Occupation,
    #[serde(rename = "Family Details")]
    FamilyDetails,
    #[serde(rename = "Political Party Affiliation")]
    PoliticalPartyAffiliation,
    #[serde(rename = "Images")]
    Images,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Name,
        Field::ContactInformation,
        Field::Occupation,
        Field::FamilyDetails,
        Field::PoliticalPartyAffiliation,
        Field::Images,
    ];

    /// Column header used in the output table
    pub fn header(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::ContactInformation => "Contact Information",
            Field::Occupation => "Occupation",
            Field::FamilyDetails => "Family Details",
            Field::PoliticalPartyAffiliation => "Political Party Affiliation",
            Field::Images => "Images",
        }
    }

    /// Column position of this field
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Attribute constraint an element must satisfy to match a rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttrFilter {
    /// Every element with the rule's tag
    #[default]
    Any,
    /// Attribute present and exactly equal to `value`
    AttrEquals { attr: String, value: String },
    /// Attribute present and containing `needle`
    AttrContains { attr: String, needle: String },
    /// Class list contains `class`
    HasClass { class: String },
}

impl AttrFilter {
    fn accepts(&self, el: &scraper::ElementRef<'_>) -> bool {
        match self {
            AttrFilter::Any => true,
            AttrFilter::AttrEquals { attr, value } => {
                html::attr_of(el, attr) == Some(value.as_str())
            }
            AttrFilter::AttrContains { attr, needle } => {
                html::attr_of(el, attr).is_some_and(|v| v.contains(needle.as_str()))
            }
            AttrFilter::HasClass { class } => html::has_class(el, class),
        }
    }
}

/// What to take from a matched element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capture {
    /// Trimmed text content
    #[default]
    Text,
    /// Value of the named attribute; elements without it contribute nothing
    Attr { name: String },
}

/// One candidate selector for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Elements with `tag` that pass `filter`
    Element {
        tag: String,
        #[serde(default)]
        filter: AttrFilter,
        #[serde(default)]
        capture: Capture,
    },
    /// The text node immediately preceding each `tag` element (typically `br`)
    PrecedingText { tag: String },
}

impl Rule {
    /// Element rule capturing text
    pub fn element(tag: &str, filter: AttrFilter) -> Self {
        Rule::Element {
            tag: tag.to_string(),
            filter,
            capture: Capture::Text,
        }
    }

    /// Element rule capturing an attribute value
    pub fn attribute(tag: &str, filter: AttrFilter, name: &str) -> Self {
        Rule::Element {
            tag: tag.to_string(),
            filter,
            capture: Capture::Attr {
                name: name.to_string(),
            },
        }
    }

    pub fn preceding_text(tag: &str) -> Self {
        Rule::PrecedingText {
            tag: tag.to_string(),
        }
    }

    /// Applies this rule to a document.
    ///
    /// Returns `None` when the rule matched nothing, so the next rule for the
    /// field should be tried. `Some(values)` means the rule won, even when
    /// `values` is empty (an element matched but had no capturable attribute).
    pub fn apply(&self, doc: &Document) -> Option<Vec<String>> {
        match self {
            Rule::Element {
                tag,
                filter,
                capture,
            } => {
                let matched: Vec<_> = doc.elements(tag).filter(|el| filter.accepts(el)).collect();
                if matched.is_empty() {
                    return None;
                }
                let values = match capture {
                    Capture::Text => matched.iter().map(html::text_of).collect(),
                    Capture::Attr { name } => matched
                        .iter()
                        .filter_map(|el| html::attr_of(el, name))
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                        .collect(),
                };
                Some(values)
            }
            Rule::PrecedingText { tag } => {
                let values: Vec<String> = doc
                    .elements(tag)
                    .filter_map(|el| html::preceding_text(&el))
                    .map(|text| text.trim().to_string())
                    .collect();
                if values.is_empty() { None } else { Some(values) }
            }
        }
    }
}

/// Ordered candidate rules per field, resolved first-match-wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<Field, Vec<Rule>>,
}

impl RuleSet {
    /// A rule set with no rules for any field
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Replaces the rules for one field
    pub fn with_rules(mut self, field: Field, rules: Vec<Rule>) -> Self {
        self.rules.insert(field, rules);
        self
    }

    /// Rules for a field, in priority order
    pub fn rules_for(&self, field: Field) -> &[Rule] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Overlays `other` on top of this set: fields present in `other` replace
    /// this set's rules, the rest are kept.
    pub fn merged_with(mut self, other: RuleSet) -> Self {
        self.rules.extend(other.rules);
        self
    }

    /// Values for a field from the first rule that matches
    pub fn resolve(&self, field: Field, doc: &Document) -> Vec<String> {
        self.rules_for(field)
            .iter()
            .find_map(|rule| rule.apply(doc))
            .unwrap_or_default()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        let href_contains = |needle: &str| AttrFilter::AttrContains {
            attr: "href".to_string(),
            needle: needle.to_string(),
        };
        let class = |name: &str| AttrFilter::HasClass {
            class: name.to_string(),
        };

        RuleSet::empty()
            .with_rules(
                Field::Name,
                vec![
                    Rule::element("a", href_contains("/profile/")),
                    Rule::element("h2", AttrFilter::Any),
                    Rule::element("span", class("name")),
                    Rule::element("div", class("name-container")),
                ],
            )
            .with_rules(Field::ContactInformation, vec![Rule::preceding_text("br")])
            .with_rules(
                Field::Occupation,
                vec![Rule::element("a", href_contains("/occupation/"))],
            )
            .with_rules(
                Field::FamilyDetails,
                vec![Rule::element("div", class("posts_text"))],
            )
            .with_rules(
                Field::PoliticalPartyAffiliation,
                vec![Rule::element("a", href_contains("/listing/"))],
            )
            .with_rules(
                Field::Images,
                vec![Rule::attribute("img", AttrFilter::Any, "src")],
            )
    }
}
