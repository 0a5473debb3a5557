// File: src/partition.rs
//! Batch word-list filters used to prepare allow-lists per word length.

use std::collections::{HashMap, HashSet};

/// Lowercased alphabetic words of exactly `length` characters, first occurrence kept, order preserved.
pub fn extract_fixed_length<I, S>(words: I, length: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| w.chars().count() == length && w.chars().all(char::is_alphabetic))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Sorted-letter key shared by every anagram of a word.
fn signature(word: &str) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

/// Keeps only words with no anagram elsewhere in the input. Duplicates of the same word are not anagrams of it.
pub fn anagram_unique(words: &[String]) -> Vec<String> {
    let mut groups: HashMap<String, HashSet<&str>> = HashMap::new();
    for word in words {
        groups.entry(signature(word)).or_default().insert(word.as_str());
    }
    words
        .iter()
        .filter(|w| groups.get(&signature(w)).map_or(true, |g| g.len() == 1))
        .cloned()
        .collect()
}
