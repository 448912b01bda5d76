//! Word counting for the cloud, the way word-cloud renderers count.
//!
//! The renderer does its own light pass over the keyword text before
//! plotting: words are `\w[\w']*` runs, a trailing `'s` is dropped, pure
//! digits are ignored, counting is case-insensitive (the most frequent
//! casing is displayed) and, optionally, a plural `xs` is folded into `x`
//! when both occur. No bigrams are formed.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']*").expect("word pattern is valid"));

/// Count plottable words in `text`, most frequent first.
///
/// Ties keep first-occurrence order.
pub fn process_text(text: &str, normalize_plurals: bool) -> Vec<(String, usize)> {
    let words = WORD_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .map(|w| {
            if w.to_lowercase().ends_with("'s") {
                &w[..w.len() - 2]
            } else {
                w
            }
        })
        .filter(|w| !w.is_empty())
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()));

    // lowercase key -> (first position, casing counts)
    let mut order: Vec<String> = Vec::new();
    let mut casings: HashMap<String, HashMap<String, usize>> = HashMap::new();
    for word in words {
        let key = word.to_lowercase();
        let entry = casings.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            HashMap::new()
        });
        *entry.entry(word.to_string()).or_default() += 1;
    }

    let mut counts: Vec<(String, String, usize)> = order
        .iter()
        .map(|key| {
            let forms = &casings[key];
            let display = forms
                .iter()
                .max_by(|(fa, ca), (fb, cb)| ca.cmp(cb).then_with(|| fb.cmp(fa)))
                .map(|(form, _)| form.clone())
                .unwrap_or_else(|| key.clone());
            (key.clone(), display, forms.values().sum())
        })
        .collect();

    if normalize_plurals {
        let singulars: HashMap<String, usize> = counts
            .iter()
            .enumerate()
            .map(|(i, (key, _, _))| (key.clone(), i))
            .collect();
        let mut merged = vec![false; counts.len()];
        for i in 0..counts.len() {
            let key = &counts[i].0;
            if !key.ends_with('s') || key.ends_with("ss") {
                continue;
            }
            if let Some(&j) = singulars.get(&key[..key.len() - 1]) {
                let plural_count = counts[i].2;
                counts[j].2 += plural_count;
                merged[i] = true;
            }
        }
        counts = counts
            .into_iter()
            .zip(merged)
            .filter(|(_, gone)| !gone)
            .map(|(c, _)| c)
            .collect();
    }

    counts
        .into_iter()
        .enumerate()
        .sorted_by(|(ia, (_, _, ca)), (ib, (_, _, cb))| cb.cmp(ca).then(ia.cmp(ib)))
        .map(|(_, (_, display, count))| (display, count))
        .collect()
}
