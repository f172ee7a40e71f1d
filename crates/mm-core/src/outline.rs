//! Structure inference: flat document text → hierarchical outline.
//!
//! A best-effort heuristic, not a grammar. Each line is classified as a
//! potential header by a small set of `winnow` parsers (numbered outline,
//! all-caps line, `Chapter/Section/Part N:`), and headers are inserted into
//! a tree by level. Text without recognizable headers falls back to a flat
//! list of key sentences, then to fixed placeholders, so the result is never
//! empty.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use winnow::ascii::{Caseless, digit1, space0, space1};
use winnow::combinator::{alt, opt, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{literal, rest, take_while};

/// Lines at or above this many characters never become the title.
const MAX_TITLE_CHARS: usize = 100;
/// Lines and header texts shorter than this are ignored.
const MIN_HEADER_CHARS: usize = 3;
/// Minimum letters for an all-caps line to count as a header.
const MIN_CAPS_LETTERS: usize = 6;
/// Minimum length of a fallback sentence (and of the line it comes from).
const MIN_SENTENCE_CHARS: usize = 15;
/// Maximum number of fallback sentences.
const MAX_KEY_SENTENCES: usize = 5;
/// Headers never nest deeper than this below the root; a header that would
/// go deeper becomes a sibling of the deepest open header instead.
pub const MAX_OUTLINE_DEPTH: usize = 256;

const PLACEHOLDERS: [&str; 3] = ["Key Concepts", "Main Points", "Summary"];
const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// One node of an inferred outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub title: String,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// Depth of the subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

// Iterative, so dropping a deeply nested outline uses constant stack.
impl Drop for OutlineNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Infer an outline from extracted document text.
///
/// `file_name` supplies the title when the first line is too long (or the
/// text is empty). Never fails and never returns a childless root.
pub fn infer_outline(text: &str, file_name: &str) -> OutlineNode {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = pick_title(&lines, file_name);
    let mut root = build_tree(OutlineNode::new(title), &lines);

    if root.children.is_empty() {
        log::debug!("no headers detected, falling back to key sentences");
        root.children = key_sentences(&lines);
    }
    if root.children.is_empty() {
        root.children = PLACEHOLDERS.iter().map(|t| OutlineNode::new(*t)).collect();
    }

    log::info!(
        "inferred outline \"{}\": {} node(s), depth {}",
        root.title,
        root.node_count(),
        root.depth()
    );
    root
}

/// Like [`infer_outline`], but only accepts text with detectable headers.
/// Returns `Conversion` instead of using the sentence/placeholder fallback.
pub fn infer_outline_strict(text: &str, file_name: &str) -> Result<OutlineNode> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let root = build_tree(OutlineNode::new(pick_title(&lines, file_name)), &lines);
    if root.children.is_empty() {
        return Err(Error::Conversion(format!(
            "no section headers found in \"{file_name}\""
        )));
    }
    Ok(root)
}

fn pick_title(lines: &[&str], file_name: &str) -> String {
    if let Some(first) = lines.first() {
        if first.chars().count() < MAX_TITLE_CHARS {
            return (*first).to_string();
        }
    }
    let stem = strip_document_extension(file_name.trim());
    if stem.is_empty() {
        UNTITLED_DOCUMENT.to_string()
    } else {
        stem.to_string()
    }
}

fn strip_document_extension(name: &str) -> &str {
    for ext in [".pdf", ".txt", ".md"] {
        let cut = name.len().saturating_sub(ext.len());
        if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(ext) {
            return &name[..cut];
        }
    }
    name
}

// ─── Tree insertion ──────────────────────────────────────────────────────

/// Insert every detected header under the root by level.
///
/// The path stack owns the open nodes with their levels (root is level 0);
/// popping a node attaches it to the node below it, so the stack folds back
/// into the root at the end. A deeper or equal header attaches under the
/// current top without popping. A shallower one first pops every open node
/// at its level or deeper. Nesting stops at [`MAX_OUTLINE_DEPTH`].
fn build_tree(root: OutlineNode, lines: &[&str]) -> OutlineNode {
    let mut path: SmallVec<[(usize, OutlineNode); 8]> = SmallVec::new();
    path.push((0, root));

    for line in lines {
        if line.chars().count() < MIN_HEADER_CHARS {
            continue;
        }
        let Some(header) = classify_line(line) else {
            continue;
        };

        let current_level = path.last().map_or(0, |(level, _)| *level);
        if header.level < current_level {
            while path.len() > 1 && path.last().is_some_and(|(level, _)| *level >= header.level) {
                close_top(&mut path);
            }
        }
        if path.len() > MAX_OUTLINE_DEPTH {
            close_top(&mut path);
        }
        path.push((header.level, OutlineNode::new(header.text)));
    }

    while path.len() > 1 {
        close_top(&mut path);
    }
    path.pop()
        .map_or_else(|| OutlineNode::new(UNTITLED_DOCUMENT), |(_, node)| node)
}

fn close_top(path: &mut SmallVec<[(usize, OutlineNode); 8]>) {
    if let Some((_, node)) = path.pop() {
        if let Some((_, parent)) = path.last_mut() {
            parent.children.push(node);
        }
    }
}

// ─── Header classification ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    level: usize,
    text: String,
}

/// Test the header patterns in priority order; the first match decides.
/// A match whose text looks like a page number is discarded outright.
fn classify_line(line: &str) -> Option<Header> {
    let (level, text) = if let Some(found) = parse_whole(numbered_header, line) {
        found
    } else if is_caps_header(line) {
        (1, line)
    } else if let Some(text) = parse_whole(division_header, line) {
        (1, text)
    } else {
        return None;
    };

    let text = text.trim();
    if text.chars().count() < MIN_HEADER_CHARS || text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(Header {
        level,
        text: text.to_string(),
    })
}

fn parse_whole<'a, O>(
    mut parser: impl FnMut(&mut &'a str) -> ModalResult<O>,
    line: &'a str,
) -> Option<O> {
    let mut input = line;
    parser(&mut input).ok()
}

/// `1 Intro`, `1. Intro`, `2.3.1 Details` → (component count, text).
fn numbered_header<'a>(input: &mut &'a str) -> ModalResult<(usize, &'a str)> {
    let _ = space0.parse_next(input)?;
    let _ = digit1.parse_next(input)?;
    let deeper: Vec<&str> = repeat(0.., preceded('.', digit1)).parse_next(input)?;
    let _ = opt('.').parse_next(input)?;
    let _ = space1.parse_next(input)?;
    let text = rest.parse_next(input)?;
    Ok((1 + deeper.len(), text))
}

/// `Chapter 3: Results`, `section 2. Scope`, `PART 1 Basics` → text.
fn division_header<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let _ = space0.parse_next(input)?;
    let _ = alt((
        literal(Caseless("chapter")),
        literal(Caseless("section")),
        literal(Caseless("part")),
    ))
    .parse_next(input)?;
    let _ = space1.parse_next(input)?;
    let _ = digit1.parse_next(input)?;
    let _ = take_while(1.., |c: char| c.is_whitespace() || c == ':' || c == '.')
        .parse_next(input)?;
    rest.parse_next(input)
}

/// An all-caps line: starts with a letter, only uppercase ASCII letters
/// and whitespace, at least [`MIN_CAPS_LETTERS`] letters.
fn is_caps_header(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_uppercase())
        && line
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_whitespace())
        && line.chars().filter(char::is_ascii_uppercase).count() >= MIN_CAPS_LETTERS
}

// ─── Fallback ────────────────────────────────────────────────────────────

/// Up to [`MAX_KEY_SENTENCES`] distinct sentences of reasonable length.
fn key_sentences(lines: &[&str]) -> Vec<OutlineNode> {
    let mut seen = HashSet::new();
    let mut picked = Vec::new();

    let long_lines = lines
        .iter()
        .filter(|l| l.chars().count() >= MIN_SENTENCE_CHARS);
    for line in long_lines {
        for sentence in line.split(['.', '!', '?']).map(str::trim) {
            if sentence.chars().count() < MIN_SENTENCE_CHARS || !seen.insert(sentence) {
                continue;
            }
            picked.push(OutlineNode::new(sentence));
            if picked.len() >= MAX_KEY_SENTENCES {
                return picked;
            }
        }
    }
    picked
}
