/*!
# Text Mapper

Projects an accepted edit batch onto the document the tree was parsed
from. Every edit becomes a splice over the original text; characters no
splice covers are copied through unchanged, comments and whitespace
included.

Replacement text comes from the fragment: copied nodes are reproduced
verbatim from the document, synthetic nodes are pretty-printed.
*/

use thiserror::Error;

use crate::ast::printer::{self, required_precedence};
use crate::ast::{Fragment, NodeId, NodeKind, Origin, Slot, SyntaxTree, TextRange};

use super::batch::{Edit, EditBatch, EditRejection};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("edits overlap at {start}..{end}")]
    Overlap { start: usize, end: usize },

    #[error(transparent)]
    Rejected(#[from] EditRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

impl Splice {
    fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    fn delete(start: usize, end: usize) -> Self {
        Self::new(start, end, String::new())
    }

    fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }
}

/// Renders the document that results from applying `batch` to `tree`.
pub fn render(tree: &SyntaxTree, batch: &EditBatch) -> Result<String, ProjectionError> {
    let mut splices = Vec::with_capacity(batch.len());
    let removed = |id: NodeId| {
        batch
            .get(id)
            .is_some_and(|accepted| matches!(accepted.edit, Edit::Remove { .. }))
    };
    for accepted in batch.iter() {
        project(tree, &accepted.edit, &removed, &mut splices)?;
    }
    apply(tree.source(), splices)
}

/// Rejects edits the mapper has no textual form for.
pub(crate) fn check_supported(tree: &SyntaxTree, edit: &Edit) -> Result<(), EditRejection> {
    match edit {
        Edit::Replace { .. } => Ok(()),
        Edit::Remove { target } => removal(tree, *target, &|_: NodeId| false).map(|_| ()),
        Edit::InsertBefore { anchor, .. } | Edit::InsertAfter { anchor, .. } => {
            match tree.slot_of(*anchor) {
                Some(slot) if slot.is_statement_list() || matches!(slot, Slot::Arguments(_)) => {
                    Ok(())
                }
                slot => Err(unsupported(edit, *anchor, slot)),
            }
        }
        Edit::Move {
            target,
            new_parent,
            index,
        } => {
            let slot = tree.slot_of(*target);
            let position = slot
                .filter(|s| s.is_statement_list())
                .and_then(Slot::list_index);
            let supported = match (position, statement_list(tree.kind(*new_parent))) {
                (Some(position), Some(list)) => {
                    let same_place = tree.parent(*target) == Some(*new_parent)
                        && (*index == position || *index == position + 1);
                    *index <= list.len()
                        && *new_parent != *target
                        && !tree.is_ancestor(*target, *new_parent)
                        && !same_place
                }
                _ => false,
            };
            if supported {
                Ok(())
            } else {
                Err(unsupported(edit, *target, slot))
            }
        }
    }
}

fn unsupported(edit: &Edit, node: NodeId, slot: Option<Slot>) -> EditRejection {
    EditRejection::UnsupportedSlot {
        node,
        edit: edit.kind_name().to_string(),
        slot,
    }
}

fn statement_list(kind: &NodeKind) -> Option<&[NodeId]> {
    match kind {
        NodeKind::Block { statements } => Some(statements),
        NodeKind::Unit { items, .. } => Some(items),
        NodeKind::ClassDecl { members, .. } => Some(members),
        _ => None,
    }
}

fn project(
    tree: &SyntaxTree,
    edit: &Edit,
    removed: &dyn Fn(NodeId) -> bool,
    splices: &mut Vec<Splice>,
) -> Result<(), EditRejection> {
    let source = tree.source();
    match edit {
        Edit::Replace {
            target,
            replacement,
        } => splices.push(replacement_splice(tree, *target, replacement)),
        Edit::Remove { target } => splices.push(removal(tree, *target, removed)?),
        Edit::InsertBefore { anchor, fragment } | Edit::InsertAfter { anchor, fragment } => {
            let before = matches!(edit, Edit::InsertBefore { .. });
            let range = tree.range(*anchor);
            let text = fragment_text(source, fragment, indent_at(source, range.start));
            let splice = match tree.slot_of(*anchor) {
                Some(Slot::Arguments(_)) if before => Splice::insert(range.start, format!("{text}, ")),
                Some(Slot::Arguments(_)) => Splice::insert(range.end, format!(", {text}")),
                Some(slot) if slot.is_statement_list() => {
                    statement_insertion(source, range, &text, before)
                }
                slot => return Err(unsupported(edit, *anchor, slot)),
            };
            splices.push(splice);
        }
        Edit::Move {
            target,
            new_parent,
            index,
        } => {
            let range = tree.range(*target);
            splices.push(remove_statement(source, range));
            let list = statement_list(tree.kind(*new_parent))
                .ok_or_else(|| unsupported(edit, *target, tree.slot_of(*target)))?;
            let moved = &source[range.start..range.end];
            let from_indent = indent_at(source, range.start);
            let splice = match (list.get(*index), list.last()) {
                (Some(anchor), _) | (None, Some(anchor)) => {
                    let anchor = tree.range(*anchor);
                    let text = reindent(moved, from_indent, indent_at(source, anchor.start));
                    statement_insertion(source, anchor, &text, list.get(*index).is_some())
                }
                (None, None) => {
                    let parent = tree.range(*new_parent);
                    match tree.kind(*new_parent) {
                        NodeKind::Unit { .. } => Splice::insert(parent.end, moved),
                        _ => {
                            let brace = source[parent.start..parent.end]
                                .find('{')
                                .map_or(parent.start, |i| parent.start + i + 1);
                            Splice::insert(brace, format!(" {moved}"))
                        }
                    }
                }
            };
            splices.push(splice);
        }
    }
    Ok(())
}

fn replacement_splice(tree: &SyntaxTree, target: NodeId, replacement: &Fragment) -> Splice {
    let source = tree.source();
    let range = tree.range(target);
    let slot = tree.slot_of(target);
    let indent = indent_at(source, range.start);

    if let (NodeKind::Block { statements }, Some(slot)) = (replacement.root_kind(), slot) {
        if slot.is_statement_list() {
            if statements.is_empty() {
                return remove_statement(source, range);
            }
            if !declares_locals(replacement, statements) {
                let text = inline_block(source, replacement, statements, indent);
                return Splice::new(range.start, range.end, text);
            }
        }
    }

    let mut text = fragment_text(source, replacement, indent);
    if let (Some(parent), Some(slot)) = (tree.parent(target), slot) {
        if !tree.kind(target).is_statement()
            && replacement.root_kind().precedence() < required_precedence(tree.kind(parent), slot)
        {
            text = format!("({text})");
        }
    }
    Splice::new(range.start, range.end, text)
}

/// Whether a block's own statements declare variables, which would leak
/// into the enclosing scope if the braces were dropped.
fn declares_locals(block: &Fragment, statements: &[NodeId]) -> bool {
    statements.iter().any(|id| {
        block
            .node(*id)
            .is_some_and(|node| matches!(node.kind, NodeKind::LocalVariable { .. }))
    })
}

/// Statements of a replacement block, spliced in without their braces.
fn inline_block(source: &str, block: &Fragment, statements: &[NodeId], indent: &str) -> String {
    let copied: Option<Vec<TextRange>> = statements
        .iter()
        .map(|id| match block.node(*id)?.origin {
            Origin::Source(range) | Origin::Copied(range) => Some(range),
            Origin::Synthetic => None,
        })
        .collect();
    match copied {
        Some(ranges) if !ranges.is_empty() => {
            let (first, last) = (ranges[0], ranges[ranges.len() - 1]);
            let span = source.get(first.start..last.end).unwrap_or_default();
            reindent(span, indent_at(source, first.start), indent)
        }
        _ => statements
            .iter()
            .map(|id| printer::render(block, *id, source))
            .collect::<Vec<_>>()
            .join(&format!("\n{indent}")),
    }
}

/// Fragment text, re-indented from its copy origin to `indent`.
fn fragment_text(source: &str, fragment: &Fragment, indent: &str) -> String {
    let text = fragment.to_source(source);
    match fragment.root_node().origin {
        Origin::Copied(range) => reindent(&text, indent_at(source, range.start), indent),
        _ => text,
    }
}

fn statement_insertion(source: &str, anchor: TextRange, text: &str, before: bool) -> Splice {
    let separator = if starts_line(source, anchor.start) {
        format!("\n{}", indent_at(source, anchor.start))
    } else {
        " ".to_string()
    };
    if before {
        Splice::insert(anchor.start, format!("{text}{separator}"))
    } else {
        Splice::insert(anchor.end, format!("{separator}{text}"))
    }
}

/// The splice that deletes `target`, or a rejection when its slot cannot
/// be left empty.
fn removal(
    tree: &SyntaxTree,
    target: NodeId,
    removed: &dyn Fn(NodeId) -> bool,
) -> Result<Splice, EditRejection> {
    let source = tree.source();
    let range = tree.range(target);
    let reject = |slot| EditRejection::UnsupportedSlot {
        node: target,
        edit: "remove".to_string(),
        slot,
    };
    let (Some(parent), Some(slot)) = (tree.parent(target), tree.slot_of(target)) else {
        return Err(reject(None));
    };
    let parent_kind = tree.kind(parent);

    let splice = match (parent_kind, slot) {
        (_, Slot::Imports(_)) => remove_statement(source, range),
        (_, slot) if slot.is_statement_list() => remove_statement(source, range),
        (NodeKind::If { then_branch, .. }, Slot::Else) => {
            keyword_removal(source, tree.range(*then_branch).end, "else", range.end)
                .ok_or_else(|| reject(Some(slot)))?
        }
        (NodeKind::Try { body, catches, .. }, Slot::Finally) => {
            let from = catches.last().unwrap_or(body);
            keyword_removal(source, tree.range(*from).end, "finally", range.end)
                .ok_or_else(|| reject(Some(slot)))?
        }
        (NodeKind::MethodCall { .. }, Slot::Receiver) => {
            let Some(dot) = source[range.end..].find('.') else {
                return Err(reject(Some(slot)));
            };
            let after_dot = range.end + dot + 1;
            let end = after_dot + leading_blank(&source[after_dot..]);
            Splice::delete(range.start, end)
        }
        (_, Slot::Arguments(_) | Slot::Init(_) | Slot::Update(_)) => {
            let siblings: Vec<NodeId> = parent_kind
                .slots()
                .into_iter()
                .filter(|(s, _)| std::mem::discriminant(s) == std::mem::discriminant(&slot))
                .map(|(_, id)| id)
                .collect();
            // Separators are taken relative to the siblings that survive the
            // batch, so removing neighbours never leaves a dangling comma.
            let position = siblings.iter().position(|id| *id == target).unwrap_or(0);
            let kept = |id: &&NodeId| **id != target && !removed(**id);
            let next = siblings[position + 1..].iter().find(kept);
            let previous = siblings[..position].iter().rev().find(kept);
            match (next, previous) {
                (Some(next), _) => Splice::delete(range.start, tree.range(*next).start),
                (None, Some(previous)) => Splice::delete(tree.range(*previous).end, range.end),
                (None, None) => {
                    let first = siblings.first().map_or(range, |id| tree.range(*id));
                    let last = siblings.last().map_or(range, |id| tree.range(*id));
                    Splice::delete(first.start, last.end)
                }
            }
        }
        (NodeKind::Return { .. }, Slot::Value) => {
            Splice::delete(range.start - trailing_blank(&source[..range.start]), range.end)
        }
        (NodeKind::LocalVariable { .. }, Slot::Initializer) => {
            let declaration = tree.range(parent);
            let Some(equals) = source[declaration.start..range.start].rfind('=') else {
                return Err(reject(Some(slot)));
            };
            let equals = declaration.start + equals;
            Splice::delete(equals - trailing_blank(&source[..equals]), range.end)
        }
        (NodeKind::For { .. }, Slot::Condition) => Splice::delete(range.start, range.end),
        (
            NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::DoWhile { .. }
            | NodeKind::For { .. }
            | NodeKind::ForEach { .. }
            | NodeKind::Try { .. }
            | NodeKind::Catch { .. }
            | NodeKind::MethodDecl { .. },
            Slot::Then | Slot::Body,
        ) => Splice::new(range.start, range.end, "{}"),
        _ => return Err(reject(Some(slot))),
    };
    Ok(splice)
}

/// Deletes `keyword` and what follows it up to `end`. Comments between
/// `from` and the keyword are kept.
fn keyword_removal(source: &str, from: usize, keyword: &str, end: usize) -> Option<Splice> {
    let at = skip_trivia(source, from);
    if !source[at..].starts_with(keyword) || at > end {
        return None;
    }
    Some(Splice::delete(at - trailing_blank(&source[..at]), end))
}

/// Offset of the first character at or after `from` that is neither
/// whitespace nor part of a comment.
fn skip_trivia(source: &str, mut from: usize) -> usize {
    loop {
        let rest = &source[from..];
        let trimmed = rest.trim_start();
        from += rest.len() - trimmed.len();
        if trimmed.starts_with("//") {
            from += trimmed.find('\n').unwrap_or(trimmed.len());
        } else if let Some(comment) = trimmed.strip_prefix("/*") {
            from += comment.find("*/").map_or(trimmed.len(), |i| i + 4);
        } else {
            return from;
        }
    }
}

/// Deletes a statement-list member, taking its whole line when it is alone
/// on it.
fn remove_statement(source: &str, range: TextRange) -> Splice {
    let line_start = line_start(source, range.start);
    let line_end = line_end(source, range.end);
    let alone_before = source[line_start..range.start].trim().is_empty();
    let alone_after = source[range.end..line_end].trim().is_empty();

    match (alone_before, alone_after) {
        (true, true) if line_end < source.len() => Splice::delete(line_start, line_end + 1),
        (true, true) if line_start > 0 => Splice::delete(line_start - 1, line_end),
        (true, true) => Splice::delete(0, source.len()),
        (false, _) => Splice::delete(
            range.start - trailing_blank(&source[..range.start]),
            range.end,
        ),
        (true, false) => Splice::delete(
            range.start,
            range.end + leading_blank(&source[range.end..]),
        ),
    }
}

fn apply(source: &str, mut splices: Vec<Splice>) -> Result<String, ProjectionError> {
    splices.sort_by_key(|s| (s.start, s.end));
    let mut merged: Vec<Splice> = Vec::with_capacity(splices.len());
    for splice in splices {
        if let Some(last) = merged.last_mut() {
            if splice.start < last.end {
                // Neighbouring statement removals may share whitespace.
                if last.text.is_empty() && splice.text.is_empty() {
                    last.end = last.end.max(splice.end);
                    continue;
                }
                return Err(ProjectionError::Overlap {
                    start: splice.start,
                    end: last.end,
                });
            }
        }
        merged.push(splice);
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for splice in merged {
        out.push_str(source.get(cursor..splice.start).unwrap_or_default());
        out.push_str(&splice.text);
        cursor = splice.end;
    }
    out.push_str(source.get(cursor..).unwrap_or_default());
    Ok(out)
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Offset of the newline ending the line that holds `offset`.
fn line_end(source: &str, offset: usize) -> usize {
    source[offset..].find('\n').map_or(source.len(), |i| offset + i)
}

fn starts_line(source: &str, offset: usize) -> bool {
    source[line_start(source, offset)..offset].trim().is_empty()
}

fn indent_at(source: &str, offset: usize) -> &str {
    let line = &source[line_start(source, offset)..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

fn leading_blank(text: &str) -> usize {
    text.len() - text.trim_start_matches([' ', '\t']).len()
}

fn trailing_blank(text: &str) -> usize {
    text.len() - text.trim_end_matches([' ', '\t']).len()
}

fn reindent(text: &str, from: &str, to: &str) -> String {
    if from == to {
        return text.to_string();
    }
    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        match line.strip_prefix(from) {
            Some(rest) => {
                out.push_str(to);
                out.push_str(rest);
            }
            None => out.push_str(line),
        }
    }
    out
}
