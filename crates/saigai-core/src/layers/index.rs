// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

//! Derived views over a layer snapshot.
//!
//! Every function borrows the snapshot and returns fresh collections of
//! references, so it can be called again whenever a new snapshot arrives.
//! Collection order (usually `created_at` descending from the backend) is
//! preserved wherever a result keeps more than one layer.

use super::{Layer, LayerCategory, LayerSource, Visibility};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// source -> category -> layers. Both map levels iterate in priority order
/// and never hold an empty group.
pub type LayerTree<'a> = BTreeMap<LayerSource, BTreeMap<LayerCategory, Vec<&'a Layer>>>;

/// Unique layer dates in ascending calendar order. Private layers count:
/// the date list is shown before anyone logs in.
pub fn distinct_dates<'a, I>(layers: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a Layer>,
{
    layers
        .into_iter()
        .map(|l| l.layer_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn group_by_source_then_category<'a, I>(layers: I) -> LayerTree<'a>
where
    I: IntoIterator<Item = &'a Layer>,
{
    let mut tree: LayerTree<'a> = BTreeMap::new();
    for layer in layers {
        tree.entry(layer.source)
            .or_default()
            .entry(layer.category)
            .or_default()
            .push(layer);
    }
    tree
}

/// All layers on `date`, whatever their visibility or category.
pub fn filter_for_date<'a, I>(layers: I, date: NaiveDate) -> Vec<&'a Layer>
where
    I: IntoIterator<Item = &'a Layer>,
{
    layers
        .into_iter()
        .filter(|l| l.layer_date == date)
        .collect()
}

pub fn filter_by_visibility<'a, I>(layers: I, visibility: Visibility) -> Vec<&'a Layer>
where
    I: IntoIterator<Item = &'a Layer>,
{
    layers
        .into_iter()
        .filter(|l| l.visibility == visibility)
        .collect()
}

/// First public layer with a loadable asset, in collection order.
/// `None` means the map starts empty, which is a valid state.
pub fn default_active_layer<'a, I>(layers: I) -> Option<&'a Layer>
where
    I: IntoIterator<Item = &'a Layer>,
{
    layers.into_iter().find(|l| l.is_displayable())
}

pub fn find_by_id<'a, I>(layers: I, id: &str) -> Option<&'a Layer>
where
    I: IntoIterator<Item = &'a Layer>,
{
    layers.into_iter().find(|l| l.id == id)
}
