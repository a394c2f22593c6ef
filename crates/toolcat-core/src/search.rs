use std::cmp::Ordering;

use crate::models::Tool;
use crate::query::{FilterOptions, SortDirection, SortField, SortOption};

/// Filter and sort the loaded tools for display
///
/// Pure: the same four inputs always give the same output, in the same order.
/// The result is a subset of `tools`; the sort is stable so equal keys keep
/// their dataset order.
pub fn filter_and_sort(
    tools: &[Tool],
    filters: &FilterOptions,
    search_query: &str,
    sort: SortOption,
) -> Vec<Tool> {
    if tools.is_empty() {
        return Vec::new();
    }

    let needle = search_query.trim().to_lowercase();

    let mut filtered: Vec<Tool> = tools
        .iter()
        .filter(|tool| matches_filters(tool, filters))
        .filter(|tool| needle.is_empty() || matches_search(tool, &needle))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort.field);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    filtered
}

/// Every active facet must match; within a facet any selected value will do
pub fn matches_filters(tool: &Tool, filters: &FilterOptions) -> bool {
    if !filters.categories.is_empty()
        && !tool.categories.iter().any(|c| filters.categories.contains(c))
    {
        return false;
    }

    if !filters.platforms.is_empty()
        && !tool.platforms.iter().any(|p| filters.platforms.contains(p))
    {
        return false;
    }

    if !filters.licenses.is_empty() && !filters.licenses.contains(&tool.license) {
        return false;
    }

    if !filters.maturity.is_empty() && !filters.maturity.contains(&tool.maturity) {
        return false;
    }

    true
}

/// `needle` must already be trimmed and lowercased
pub fn matches_search(tool: &Tool, needle: &str) -> bool {
    tool.name.to_lowercase().contains(needle)
        || tool.summary.to_lowercase().contains(needle)
        || tool.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

pub fn compare_by(a: &Tool, b: &Tool, field: SortField) -> Ordering {
    match field {
        SortField::Stars => a.stars.unwrap_or(0).cmp(&b.stars.unwrap_or(0)),
        SortField::Name => collate(&a.name, &b.name),
        SortField::AddedAt => a
            .added_at_millis()
            .unwrap_or(i64::MIN)
            .cmp(&b.added_at_millis().unwrap_or(i64::MIN)),
    }
}

/// Dictionary order: letters compare without case or accents first, then
/// unaccented before accented, then lowercase before uppercase.
fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

fn primary_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase).map(strip_accent)
}

/// Base letter for the accented Latin letters; anything else is returned as is.
/// Expects lowercase input.
fn strip_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}
