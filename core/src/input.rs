use std::collections::HashMap;
use anyhow::{anyhow, Result};

pub const ACTIVITY_KEYS: [&str; 3] = ["budget", "goal", "name"];
pub const ENTRY_KEYS: [&str; 3] = ["date", "note", "hours"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    /// Bare words, in order.
    pub positional: Vec<String>,
    /// `key:value` pairs with keys expanded to their full names.
    pub metadata: HashMap<String, String>,
}

impl ParsedInput {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Split command words into positional words and `key:value` metadata.
/// Keys may be abbreviated to any unique prefix of `known_keys`. Words
/// following `note:` without a key of their own are folded into the note.
pub fn parse_args(args: &[String], known_keys: &[&str]) -> Result<ParsedInput> {
    let mut positional = Vec::new();
    let mut metadata: HashMap<String, String> = HashMap::new();
    let mut in_note = false;

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic()) {
                let full_key = expand_key(key, known_keys)?;
                in_note = full_key == "note";
                metadata.insert(full_key, value.to_string());
                continue;
            }
        }
        if in_note {
            if let Some(note) = metadata.get_mut("note") {
                if !note.is_empty() {
                    note.push(' ');
                }
                note.push_str(arg);
                continue;
            }
        }
        positional.push(arg.clone());
    }

    Ok(ParsedInput { positional, metadata })
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    let key = key.to_lowercase();
    if candidates.contains(&key.as_str()) {
        return Ok(key);
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key.as_str()))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}' (expected one of {:?})", key, candidates)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}
