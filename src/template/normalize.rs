//! Run normalization.
//!
//! Word splits typed text across runs freely, so a placeholder such as
//! `{name}` can arrive as `<w:t>{na</w:t>` ... `<w:t>me}</w:t>`. Before
//! expansion every brace span is moved whole into the fragment where it
//! starts. Text outside spans stays in its original fragment, so run
//! formatting of ordinary text survives.

use super::token::BraceSpans;
use super::wml::text_elements;
use smallvec::SmallVec;
use std::ops::Range;

/// Index of the fragment containing logical offset `pos`.
///
/// Empty fragments share their start with the next fragment, so the last
/// fragment starting at or before `pos` is the one that holds it.
#[inline]
fn fragment_at(starts: &[usize], pos: usize) -> usize {
    starts.partition_point(|&s| s <= pos).saturating_sub(1)
}

/// Consolidate brace spans split across `fragments`.
///
/// Returns, per fragment, whether its content changed. Applying this twice
/// changes nothing the second time.
pub fn normalize_fragments(fragments: &mut [String], max_len: usize) -> Vec<bool> {
    let mut changed = vec![false; fragments.len()];

    let mut starts = Vec::with_capacity(fragments.len());
    let mut logical = String::with_capacity(fragments.iter().map(String::len).sum());
    for fragment in fragments.iter() {
        starts.push(logical.len());
        logical.push_str(fragment);
    }

    // Only spans that cross a fragment boundary need work
    let spans: Vec<(Range<usize>, usize)> = BraceSpans::new(&logical, max_len)
        .filter_map(|span| {
            let owner = fragment_at(&starts, span.start);
            let last = fragment_at(&starts, span.end - 1);
            (owner != last).then_some((span, owner))
        })
        .collect();
    if spans.is_empty() {
        return changed;
    }

    let mut touching: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); fragments.len()];
    for (index, (span, owner)) in spans.iter().enumerate() {
        let last = fragment_at(&starts, span.end - 1);
        for slot in touching.iter_mut().take(last + 1).skip(*owner) {
            slot.push(index);
        }
    }

    for (i, span_indices) in touching.iter().enumerate() {
        if span_indices.is_empty() || fragments[i].is_empty() {
            continue;
        }
        let frag_start = starts[i];
        let frag_end = frag_start + fragments[i].len();

        let mut rebuilt = String::with_capacity(fragments[i].len());
        let mut cursor = frag_start;
        for &index in span_indices {
            let (span, owner) = &spans[index];
            if span.start > cursor {
                rebuilt.push_str(&logical[cursor..span.start.min(frag_end)]);
            }
            if *owner == i {
                rebuilt.push_str(&logical[span.clone()]);
            }
            cursor = cursor.max(span.end);
        }
        if cursor < frag_end {
            rebuilt.push_str(&logical[cursor..frag_end]);
        }

        if rebuilt != fragments[i] {
            fragments[i] = rebuilt;
            changed[i] = true;
        }
    }

    changed
}

/// Normalize every `<w:t>` fragment of a part.
///
/// Rewritten fragments gain `xml:space="preserve"` so moved whitespace is
/// kept. Returns the input unchanged when no span crosses a run boundary.
pub fn normalize_part(xml: &str, max_len: usize) -> String {
    let elements = text_elements(xml);
    let mut fragments: Vec<String> =
        elements.iter().map(|e| xml[e.content.clone()].to_string()).collect();

    let changed = normalize_fragments(&mut fragments, max_len);
    if !changed.contains(&true) {
        return xml.to_string();
    }

    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    for ((element, fragment), changed) in elements.iter().zip(&fragments).zip(&changed) {
        if !changed {
            continue;
        }
        if element.has_space_attr(xml) {
            out.push_str(&xml[cursor..element.content.start]);
        } else {
            // Drop the closing `>` and re-add it after the attribute
            out.push_str(&xml[cursor..element.open.end - 1]);
            out.push_str(" xml:space=\"preserve\">");
        }
        out.push_str(fragment);
        cursor = element.content.end;
    }
    out.push_str(&xml[cursor..]);
    out
}
