use std::ops::Range;

/// Byte ranges of `text` matching `query` case-insensitively, left to right
/// and non-overlapping. Ranges always fall on char boundaries of `text`.
#[must_use]
pub fn match_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() || text.is_empty() {
        return Vec::new();
    }

    // Lowercasing may change byte lengths, so keep for every folded byte the
    // offset of the original char it came from.
    let mut folded = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (offset, ch) in text.char_indices() {
        for lower in ch.to_lowercase() {
            let before = folded.len();
            folded.push(lower);
            origin.extend(std::iter::repeat(offset).take(folded.len() - before));
        }
    }

    folded
        .match_indices(needle.as_str())
        .filter_map(|(start, matched)| {
            let first = *origin.get(start)?;
            let last = *origin.get(start + matched.len() - 1)?;
            let end = last + text[last..].chars().next()?.len_utf8();
            Some(first..end)
        })
        .fold(Vec::new(), |mut ranges: Vec<Range<usize>>, range| {
            if ranges.last().map_or(true, |prev| range.start >= prev.end) {
                ranges.push(range);
            }
            ranges
        })
}

/// Case-insensitive substring test used by the index.
#[must_use]
pub fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}
