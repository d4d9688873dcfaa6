//! Read-only in-memory store of center records.
//!
//! Browsing follows the region → state → district → branch hierarchy.
//! Path segments are slugs (see [`slugify`]); every lookup is a linear scan,
//! which is plenty for a few thousand records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::centers::{slugify, CenterRecord, Coordinates};
use crate::dataset::Dataset;
use crate::geo::{find_nearest, Nearby};

/// One node of the browse hierarchy with the number of centers below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaSummary {
    pub name: String,
    pub slug: String,
    pub center_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CenterStore {
    centers: Vec<CenterRecord>,
}

impl From<Dataset> for CenterStore {
    fn from(dataset: Dataset) -> Self {
        Self::new(dataset.centers)
    }
}

impl CenterStore {
    #[must_use]
    pub fn new(centers: Vec<CenterRecord>) -> Self {
        Self { centers }
    }

    #[must_use]
    pub fn centers(&self) -> &[CenterRecord] {
        &self.centers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Number of centers with usable coordinates.
    #[must_use]
    pub fn located_count(&self) -> usize {
        self.centers.iter().filter(|c| c.coords.is_some()).count()
    }

    /// Case-insensitive lookup by branch code. Returns the first match.
    #[must_use]
    pub fn get(&self, branch_code: &str) -> Option<&CenterRecord> {
        let wanted = branch_code.trim();
        self.centers
            .iter()
            .find(|c| c.branch_code.eq_ignore_ascii_case(wanted))
    }

    /// Centers nearest to `query`; see [`find_nearest`].
    #[must_use]
    pub fn nearest(&self, query: Coordinates, limit: usize) -> Vec<Nearby<'_, CenterRecord>> {
        find_nearest(query, &self.centers, limit)
    }

    #[must_use]
    pub fn regions(&self) -> Vec<AreaSummary> {
        summarize(self.centers.iter().map(|c| c.region.as_str()))
    }

    /// States within a region, or `None` if the region slug is unknown.
    #[must_use]
    pub fn states(&self, region: &str) -> Option<Vec<AreaSummary>> {
        let in_region: Vec<&CenterRecord> = self.in_region(region).collect();
        if in_region.is_empty() {
            return None;
        }
        Some(summarize(in_region.iter().map(|c| c.state.as_str())))
    }

    /// Districts within a state, or `None` if either slug is unknown.
    #[must_use]
    pub fn districts(&self, region: &str, state: &str) -> Option<Vec<AreaSummary>> {
        let in_state: Vec<&CenterRecord> = self.in_state(region, state).collect();
        if in_state.is_empty() {
            return None;
        }
        Some(summarize(in_state.iter().map(|c| c.district.as_str())))
    }

    /// Centers of one district sorted by name, or `None` if the path is unknown.
    #[must_use]
    pub fn centers_in(
        &self,
        region: &str,
        state: &str,
        district: &str,
    ) -> Option<Vec<&CenterRecord>> {
        let mut centers: Vec<&CenterRecord> = self
            .in_state(region, state)
            .filter(|c| slugify(&c.district) == district)
            .collect();
        if centers.is_empty() {
            return None;
        }
        centers.sort_by(|a, b| a.name.cmp(&b.name).then(a.branch_code.cmp(&b.branch_code)));
        Some(centers)
    }

    /// Free-text search across names, codes, hierarchy and address fields.
    ///
    /// Matches are ranked: name prefix, then name substring, then any other
    /// field; ties are ordered by name. An empty query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CenterRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<(u8, &CenterRecord)> = self
            .centers
            .iter()
            .filter_map(|c| match_rank(c, &needle).map(|rank| (rank, c)))
            .collect();

        hits.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| a.name.cmp(&b.name)));
        hits.into_iter().take(limit).map(|(_, c)| c).collect()
    }

    fn in_region<'a, 's>(
        &'a self,
        region: &'s str,
    ) -> impl Iterator<Item = &'a CenterRecord> + use<'a, 's> {
        self.centers
            .iter()
            .filter(move |c| slugify(&c.region) == region)
    }

    fn in_state<'a, 's>(
        &'a self,
        region: &'s str,
        state: &'s str,
    ) -> impl Iterator<Item = &'a CenterRecord> + use<'a, 's> {
        self.in_region(region)
            .filter(move |c| slugify(&c.state) == state)
    }
}

/// Lower rank sorts first; `None` means no match.
fn match_rank(center: &CenterRecord, needle: &str) -> Option<u8> {
    let name = center.name.to_lowercase();
    if name.starts_with(needle) {
        return Some(0);
    }
    if name.contains(needle) {
        return Some(1);
    }

    let address = center.address.as_ref();
    let others = [
        Some(center.branch_code.as_str()),
        Some(center.district.as_str()),
        Some(center.state.as_str()),
        Some(center.region.as_str()),
        address.and_then(|a| a.city.as_deref()),
        address.and_then(|a| a.pincode.as_deref()),
    ];
    others
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
        .then_some(2)
}

/// Group names by slug, keeping the first spelling seen, sorted by name.
fn summarize<'a>(names: impl Iterator<Item = &'a str>) -> Vec<AreaSummary> {
    let mut groups: BTreeMap<String, AreaSummary> = BTreeMap::new();
    for name in names {
        let slug = slugify(name);
        if slug.is_empty() {
            continue;
        }
        groups
            .entry(slug.clone())
            .or_insert_with(|| AreaSummary {
                name: name.trim().to_string(),
                slug,
                center_count: 0,
            })
            .center_count += 1;
    }

    let mut summaries: Vec<AreaSummary> = groups.into_values().collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
