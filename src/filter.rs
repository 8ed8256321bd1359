// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};

use crate::models::{Dataset, Dimension, SalesRecord};

/// Selected values per dimension. An empty set leaves that dimension
/// unconstrained; it never means "exclude everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    product_lines: BTreeSet<String>,
    area_codes: BTreeSet<String>,
    product_types: BTreeSet<String>,
    states: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSelection::select`].
    pub fn with<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(dimension, values);
        self
    }

    pub fn select<I, S>(&mut self, dimension: Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values_mut(dimension)
            .extend(values.into_iter().map(Into::into));
    }

    pub fn values(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::ProductLine => &self.product_lines,
            Dimension::AreaCode => &self.area_codes,
            Dimension::ProductType => &self.product_types,
            Dimension::State => &self.states,
        }
    }

    fn values_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::ProductLine => &mut self.product_lines,
            Dimension::AreaCode => &mut self.area_codes,
            Dimension::ProductType => &mut self.product_types,
            Dimension::State => &mut self.states,
        }
    }

    /// True when no dimension has a selection.
    pub fn is_empty(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.values(*d).is_empty())
    }

    /// Conjunction over the constrained dimensions.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        Dimension::ALL.iter().all(|d| {
            let selected = self.values(*d);
            selected.is_empty() || selected.contains(d.value(record))
        })
    }
}

/// Apply `selection` to `rows`.
///
/// With nothing selected the input is returned borrowed, without copying.
pub fn apply<'a>(rows: &'a [SalesRecord], selection: &FilterSelection) -> Cow<'a, [SalesRecord]> {
    if selection.is_empty() {
        return Cow::Borrowed(rows);
    }

    Cow::Owned(
        rows.iter()
            .filter(|record| selection.matches(record))
            .cloned()
            .collect(),
    )
}

/// Distinct values of each dimension across the full dataset, in the order
/// they first appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    options: Vec<(Dimension, Vec<String>)>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let options = Dimension::ALL
            .iter()
            .map(|dimension| (*dimension, distinct_values(dataset.records(), *dimension)))
            .collect();
        Self { options }
    }

    pub fn values(&self, dimension: Dimension) -> &[String] {
        self.options
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &[String])> {
        self.options.iter().map(|(d, values)| (*d, values.as_slice()))
    }

    /// Selected values that are not offered for their dimension.
    pub fn unknown_selections<'s>(
        &self,
        selection: &'s FilterSelection,
    ) -> Vec<(Dimension, &'s str)> {
        Dimension::ALL
            .iter()
            .flat_map(|dimension| {
                let offered = self.values(*dimension);
                selection
                    .values(*dimension)
                    .iter()
                    .filter(move |value| !offered.contains(value))
                    .map(move |value| (*dimension, value.as_str()))
            })
            .collect()
    }
}

fn distinct_values(rows: &[SalesRecord], dimension: Dimension) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|record| dimension.value(record))
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{headers, record};

    fn sample_rows() -> Vec<SalesRecord> {
        let mut rows = vec![
            record("Beans", "Columbian", 100.0),
            record("Beans", "Amaretto", 80.0),
            record("Leaves", "Lemon", 50.0),
            record("Leaves", "Green Tea", 40.0),
        ];
        rows[1].state = "Texas".to_string();
        rows[2].product_type = "Herbal Tea".to_string();
        rows[3].area_code = "303".to_string();
        rows[3].product_type = "Tea".to_string();
        rows
    }

    #[test]
    fn test_empty_selection_passes_everything_through() {
        let rows = sample_rows();
        let view = apply(&rows, &FilterSelection::new());
        assert!(matches!(view, Cow::Borrowed(_)));
        assert_eq!(view.as_ref(), rows.as_slice());
    }

    #[test]
    fn test_single_dimension_filter() {
        let rows = sample_rows();
        let selection = FilterSelection::new().with(Dimension::ProductLine, ["Leaves"]);
        let view = apply(&rows, &selection);

        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.product_line == "Leaves"));
    }

    #[test]
    fn test_dimensions_are_combined_with_and() {
        let rows = sample_rows();
        let selection = FilterSelection::new()
            .with(Dimension::ProductLine, ["Beans", "Leaves"])
            .with(Dimension::State, ["Colorado"])
            .with(Dimension::AreaCode, ["719"]);
        let view = apply(&rows, &selection);

        let products: Vec<&str> = view.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(products, vec!["Columbian", "Lemon"]);
        for row in view.iter() {
            for dimension in Dimension::ALL {
                let selected = selection.values(dimension);
                assert!(selected.is_empty() || selected.contains(dimension.value(row)));
            }
        }
    }

    #[test]
    fn test_no_match_is_empty_view() {
        let rows = sample_rows();
        let selection = FilterSelection::new()
            .with(Dimension::ProductLine, ["Beans"])
            .with(Dimension::ProductType, ["Tea"]);
        assert!(apply(&rows, &selection).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = sample_rows();
        let selection = FilterSelection::new()
            .with(Dimension::ProductType, ["Coffee", "Tea"])
            .with(Dimension::AreaCode, ["719", "303"]);

        let once = apply(&rows, &selection);
        let twice = apply(&once, &selection);
        assert_eq!(once.as_ref(), twice.as_ref());
    }

    #[test]
    fn test_options_come_from_full_dataset_in_first_seen_order() {
        let dataset = Dataset::new(headers(true), sample_rows());
        let options = FilterOptions::from_dataset(&dataset);

        assert_eq!(options.values(Dimension::ProductLine), ["Beans", "Leaves"]);
        assert_eq!(options.values(Dimension::AreaCode), ["719", "303"]);
        assert_eq!(
            options.values(Dimension::ProductType),
            ["Coffee", "Herbal Tea", "Tea"]
        );
        assert_eq!(options.values(Dimension::State), ["Colorado", "Texas"]);
    }

    #[test]
    fn test_unknown_selections() {
        let dataset = Dataset::new(headers(true), sample_rows());
        let options = FilterOptions::from_dataset(&dataset);
        let selection = FilterSelection::new()
            .with(Dimension::State, ["Texas", "Utah"])
            .with(Dimension::ProductLine, ["Beans"]);

        assert_eq!(
            options.unknown_selections(&selection),
            vec![(Dimension::State, "Utah")]
        );
    }
}
