//! # Cross-Reference Resolution
//!
//! Runs over a finished [`PageSet`] and fills the header and footer regions:
//!
//! - every `paginate-source` in a page's content registers its `data-key`
//!   in that page's reference map, later sources overriding earlier ones;
//! - maps accumulate forward, so a title declared on page 1 is still known
//!   on page 40;
//! - `pageNumber` and `totalPages` are injected into every page's map;
//! - headers are seeded from the `header` source and resolve against what
//!   was already seen before the page (the previous page's map);
//! - footers are seeded from the page's own `footer` source and resolve
//!   against the page's own map only.
//!
//! A target is resolved by replacing its children with a copy of the
//! source's children and marking it `data-status="solved"`. Copies can bring
//! new targets along, so regions are rescanned until nothing is left.

use std::collections::HashMap;

use crate::layout::tree::BoxId;
use crate::layout::PageSet;
use crate::model::{
    FOOTER_KEY, HEADER_KEY, KEY_ATTR, PAGE_NUMBER_KEY, RESERVED_KEYS, SOURCE_TAG, STATUS_ATTR,
    STATUS_SOLVED, TARGET_TAG, TOTAL_PAGES_KEY,
};

/// Key used for targets without a `data-key`.
const EMPTY_KEY: &str = "empty-key";

/// Rescans of one region before giving up on sources that keep producing
/// new targets (two sources that include each other, for instance).
pub const MAX_RESOLUTION_ROUNDS: usize = 64;

/// What a key resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// A source box in some page's content region.
    Source(BoxId),
    /// A computed value.
    Value(String),
}

/// Keys to references for one page.
pub type ReferenceMap = HashMap<String, Reference>;

/// Counts from one [`Decorator::decorate`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecorationSummary {
    /// Targets filled from a source or computed value.
    pub resolved: usize,
    /// Targets left empty because nothing answered to their key.
    pub missing: usize,
    /// Targets skipped because they named their own region.
    pub skipped: usize,
}

/// Resolves header and footer placeholders across a page set.
pub struct Decorator<'s> {
    set: &'s mut PageSet,
    summary: DecorationSummary,
}

impl<'s> Decorator<'s> {
    pub fn new(set: &'s mut PageSet) -> Self {
        Self {
            set,
            summary: DecorationSummary::default(),
        }
    }

    /// Resolve every header and footer. Already solved targets are left
    /// alone, so running this twice gives the same result as running it once.
    pub fn decorate(mut self) -> DecorationSummary {
        let own = self.own_maps();
        let effective = accumulate(&own);

        for i in 0..self.set.pages.len() {
            self.render_header(i, &effective);
        }
        for i in 0..self.set.pages.len() {
            self.render_footer(i, &own);
        }

        log::debug!(
            "decorated {} pages: {} targets resolved, {} missing, {} skipped",
            self.set.pages.len(),
            self.summary.resolved,
            self.summary.missing,
            self.summary.skipped
        );
        self.summary
    }

    /// Sources declared in page `index`'s own content.
    pub fn parse_page(&self, index: usize) -> ReferenceMap {
        let tree = &self.set.tree;
        let mut references = ReferenceMap::new();
        for source in tree.find_by_tag(self.set.pages[index].content, SOURCE_TAG) {
            let Some(key) = tree.get(source).attr(KEY_ATTR) else {
                continue;
            };
            if key.trim().is_empty() || RESERVED_KEYS.contains(&key) {
                continue;
            }
            references.insert(key.to_string(), Reference::Source(source));
        }
        references
    }

    /// Per-page maps of the page's own sources plus the computed keys.
    pub fn own_maps(&self) -> Vec<ReferenceMap> {
        let mut maps: Vec<ReferenceMap> = (0..self.set.pages.len())
            .map(|i| self.parse_page(i))
            .collect();
        insert_page_numbers(&mut maps);
        maps
    }

    /// Per-page maps after forward inheritance, computed keys included.
    pub fn effective_maps(&self) -> Vec<ReferenceMap> {
        accumulate(&self.own_maps())
    }

    /// Seeding replaces the whole header region, so targets meant to
    /// appear next to a `header` source belong inside that source.
    fn render_header(&mut self, index: usize, effective: &[ReferenceMap]) {
        let header = self.set.pages[index].header;
        let seed = if index == 0 {
            self.first_header_source().map(Reference::Source)
        } else {
            effective[index - 1].get(HEADER_KEY).cloned()
        };
        if let Some(seed) = seed {
            self.write_reference(header, &seed);
        }

        // Running headers only show what has been seen before this page;
        // page numbers are always the page's own.
        let pick = |key: &str| {
            if RESERVED_KEYS.contains(&key) {
                &effective[index]
            } else if index == 0 {
                &effective[0]
            } else {
                &effective[index - 1]
            }
        };
        self.resolve_region(header, HEADER_KEY, pick);
    }

    fn render_footer(&mut self, index: usize, own: &[ReferenceMap]) {
        let footer = self.set.pages[index].footer;
        if let Some(seed) = own[index].get(FOOTER_KEY).cloned() {
            self.write_reference(footer, &seed);
        }
        self.resolve_region(footer, FOOTER_KEY, |_| &own[index]);
    }

    /// The first `header` source on page 1, which has no previous page to
    /// inherit from.
    fn first_header_source(&self) -> Option<BoxId> {
        let tree = &self.set.tree;
        let first = self.set.pages.first()?;
        tree.find_by_tag(first.content, SOURCE_TAG)
            .find(|id| tree.get(*id).attr(KEY_ATTR) == Some(HEADER_KEY))
    }

    fn resolve_region<'m>(
        &mut self,
        region: BoxId,
        self_key: &str,
        pick: impl Fn(&str) -> &'m ReferenceMap,
    ) {
        let mut rounds = 0;
        loop {
            let targets = self.unsolved_targets(region);
            if targets.is_empty() {
                break;
            }
            if rounds == MAX_RESOLUTION_ROUNDS {
                log::warn!(
                    "{} placeholders still unresolved after {} rounds, leaving them empty",
                    targets.len(),
                    MAX_RESOLUTION_ROUNDS
                );
                for target in targets {
                    self.set.tree.clear_children(target);
                    self.mark_solved(target);
                    self.summary.missing += 1;
                }
                break;
            }

            for target in targets {
                // An earlier target of this round may have replaced the
                // subtree this one lived in.
                if self.set.tree.is_removed(target) {
                    continue;
                }
                let key = self
                    .set
                    .tree
                    .get(target)
                    .attr(KEY_ATTR)
                    .unwrap_or(EMPTY_KEY)
                    .to_string();

                if key == self_key {
                    self.summary.skipped += 1;
                } else {
                    match pick(&key).get(&key) {
                        Some(reference) => {
                            self.write_reference(target, reference);
                            self.summary.resolved += 1;
                        }
                        None => {
                            self.set.tree.clear_children(target);
                            self.summary.missing += 1;
                        }
                    }
                }
                self.mark_solved(target);
            }
            rounds += 1;
        }
    }

    fn unsolved_targets(&self, region: BoxId) -> Vec<BoxId> {
        let tree = &self.set.tree;
        tree.find_by_tag(region, TARGET_TAG)
            .filter(|id| tree.get(*id).attr(STATUS_ATTR) != Some(STATUS_SOLVED))
            .collect()
    }

    fn write_reference(&mut self, target: BoxId, reference: &Reference) {
        match reference {
            Reference::Source(source) => self.set.tree.replace_children_with_copy(target, *source),
            Reference::Value(value) => self.set.tree.replace_children_with_text(target, value),
        }
    }

    fn mark_solved(&mut self, target: BoxId) {
        self.set
            .tree
            .get_mut(target)
            .attributes
            .insert(STATUS_ATTR.to_string(), STATUS_SOLVED.to_string());
    }
}

/// Page `i`'s map overridden onto everything pages `0..i` declared.
fn accumulate(own: &[ReferenceMap]) -> Vec<ReferenceMap> {
    let mut effective = Vec::with_capacity(own.len());
    let mut previous = ReferenceMap::new();
    for map in own {
        let mut merged = previous;
        merged.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        effective.push(merged.clone());
        previous = merged;
    }
    effective
}

fn insert_page_numbers(maps: &mut [ReferenceMap]) {
    let total = Reference::Value(maps.len().to_string());
    for (i, map) in maps.iter_mut().enumerate() {
        map.insert(PAGE_NUMBER_KEY.to_string(), Reference::Value((i + 1).to_string()));
        map.insert(TOTAL_PAGES_KEY.to_string(), total.clone());
    }
}
