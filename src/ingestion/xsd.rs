//! Schema-definition tree builder.
//!
//! Walks an XSD (or plain XML schema) and turns nested `element` declarations
//! into a field tree: a declaration enclosing further declarations becomes a
//! branch, a terminal declaration a leaf. Structural wrappers (`sequence`,
//! `choice`, `complexType`, annotations) are traversed transparently.
//! External entities, imports, and includes are never resolved, so a schema
//! referencing an external definition simply contributes nothing for it.
//!
//! Uploaded schemas arrive in whatever encoding the author's editor used, so
//! the bytes are normalized to UTF-8 first: BOMs are honored, BOM-less UTF-16
//! is detected from the null-byte pattern of the prolog, and junk before the
//! first `<` is skipped.

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ImportResult;
use crate::limits::ImportLimits;
use crate::types::{sanitize_key, SchemaNode};

use super::{split_bom, ByteOrderMark};

/// An `element` declaration whose closing tag has not been seen yet.
struct PendingDecl {
    title: String,
    key: String,
    children: Vec<SchemaNode>,
}

/// Build a field tree from the bytes of an XML schema definition.
///
/// Declarations nested beyond `max_depth` levels are dropped silently, as are
/// leaves beyond `max_leaves`. A schema that declares nothing at all yields
/// the single fallback leaf `schema` / `root`. Malformed XML is a parse
/// failure.
pub fn tree_from_xsd(bytes: &[u8], limits: &ImportLimits) -> ImportResult<Vec<SchemaNode>> {
    let xml = normalize_to_utf8(bytes);
    let mut reader = Reader::from_str(&xml);

    let mut roots: Vec<SchemaNode> = Vec::new();
    let mut decls: Vec<PendingDecl> = Vec::new();
    // One entry per open XML tag: whether it opened a declaration we track.
    let mut is_decl_stack: Vec<bool> = Vec::new();
    // While Some, every tag is skipped until the stack shrinks back to the mark.
    let mut discard_until: Option<usize> = None;
    let mut leaves = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if discard_until.is_some() {
                    is_decl_stack.push(false);
                    continue;
                }
                match declared_name(&start)? {
                    Some(name) if decls.len() + 1 < limits.max_depth && leaves < limits.max_leaves => {
                        let key = declaration_key(&decls, &name);
                        decls.push(PendingDecl {
                            title: name,
                            key,
                            children: Vec::new(),
                        });
                        is_decl_stack.push(true);
                    }
                    Some(_) => {
                        // Over budget: drop this declaration and everything under it.
                        discard_until = Some(is_decl_stack.len());
                        is_decl_stack.push(false);
                    }
                    None => is_decl_stack.push(false),
                }
            }
            Event::Empty(start) => {
                if discard_until.is_some() {
                    continue;
                }
                if let Some(name) = declared_name(&start)? {
                    if decls.len() + 1 < limits.max_depth && leaves < limits.max_leaves {
                        let key = declaration_key(&decls, &name);
                        let sink = match decls.last_mut() {
                            Some(parent) => &mut parent.children,
                            None => &mut roots,
                        };
                        sink.push(SchemaNode::leaf(name, key));
                        leaves += 1;
                    }
                }
            }
            Event::End(_) => {
                let was_decl = is_decl_stack.pop().unwrap_or(false);
                if let Some(mark) = discard_until {
                    if is_decl_stack.len() == mark {
                        discard_until = None;
                    }
                    continue;
                }
                if !was_decl {
                    continue;
                }
                let Some(decl) = decls.pop() else { continue };
                let sink = match decls.last_mut() {
                    Some(parent) => &mut parent.children,
                    None => &mut roots,
                };
                if decl.children.is_empty() {
                    if leaves < limits.max_leaves {
                        sink.push(SchemaNode::leaf(decl.title, decl.key));
                        leaves += 1;
                    }
                } else {
                    sink.push(SchemaNode::branch(decl.title, decl.key, decl.children));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if roots.is_empty() {
        roots.push(SchemaNode::leaf("schema", "root"));
    }
    Ok(roots)
}

/// The declaration name of `tag`, when `tag` is an `element` (any namespace
/// prefix, case-insensitive) carrying a non-empty `name` attribute.
/// `ref`-only elements declare nothing.
fn declared_name(tag: &BytesStart<'_>) -> ImportResult<Option<String>> {
    if !tag.local_name().as_ref().eq_ignore_ascii_case(b"element") {
        return Ok(None);
    }
    let Some(attr) = tag.try_get_attribute("name").map_err(quick_xml::Error::from)? else {
        return Ok(None);
    };
    let name = attr.unescape_value().map_err(quick_xml::Error::from)?;
    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some(name.into_owned()))
}

fn declaration_key(decls: &[PendingDecl], name: &str) -> String {
    match decls.last() {
        Some(parent) => format!("{}.{}", parent.key, sanitize_key(name)),
        None => sanitize_key(name),
    }
}

/// Normalize schema bytes to a UTF-8 string the XML reader can take.
fn normalize_to_utf8(bytes: &[u8]) -> String {
    let (bom, body) = split_bom(bytes);
    match bom {
        Some(ByteOrderMark::Utf16Le) => decode_utf16(body, u16::from_le_bytes),
        Some(ByteOrderMark::Utf16Be) => decode_utf16(body, u16::from_be_bytes),
        None if looks_utf16_le(body) => decode_utf16(body, u16::from_le_bytes),
        None if looks_utf16_be(body) => decode_utf16(body, u16::from_be_bytes),
        Some(ByteOrderMark::Utf8) | None => skip_prolog_junk(&String::from_utf8_lossy(body)).to_string(),
    }
}

// BOM-less UTF-16 leaves a tell-tale null-byte pattern over `<?`.
fn looks_utf16_le(body: &[u8]) -> bool {
    body.len() >= 4 && body[0] == b'<' && body[1] == 0 && body[2] == b'?' && body[3] == 0
}

fn looks_utf16_be(body: &[u8]) -> bool {
    body.len() >= 4 && body[0] == 0 && body[1] == b'<' && body[2] == 0 && body[3] == b'?'
}

fn decode_utf16(body: &[u8], combine: fn([u8; 2]) -> u16) -> String {
    let units = body.chunks_exact(2).map(|pair| combine([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Skip whatever precedes the document: leading whitespace, then anything
/// before `<?xml` (or, failing that, before the first `<`).
fn skip_prolog_junk(text: &str) -> &str {
    let trimmed = text.trim_start_matches([' ', '\t', '\r', '\n']);
    if trimmed.starts_with("<?xml") {
        return trimmed;
    }
    if let Some(idx) = trimmed.find("<?xml") {
        return &trimmed[idx..];
    }
    match trimmed.find('<') {
        Some(idx) => &trimmed[idx..],
        None => trimmed,
    }
}
