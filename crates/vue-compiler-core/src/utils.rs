//! Character classes, tag tables and text helpers shared by the parser.

use crate::runtime_helpers::RuntimeHelper;

/// HTML whitespace: tab, CR, LF, form feed and space.
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\r' | b'\n' | b'\x0c' | b' ')
}

/// Characters that end a tag name or an attribute name.
#[inline]
pub(crate) fn is_tag_terminator(b: u8) -> bool {
    is_whitespace(b) || b == b'/' || b == b'>'
}

/// Whether `s` consists only of HTML whitespace (or is empty).
pub fn is_all_whitespace(s: &str) -> bool {
    s.bytes().all(is_whitespace)
}

/// Collapse every run of HTML whitespace to a single space.
pub fn condense_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_ascii() && is_whitespace(c as u8) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Components built into the runtime core, recognized in either casing.
pub fn is_core_component(tag: &str) -> Option<RuntimeHelper> {
    match tag {
        "Teleport" | "teleport" => Some(RuntimeHelper::Teleport),
        "Suspense" | "suspense" => Some(RuntimeHelper::Suspense),
        "KeepAlive" | "keep-alive" => Some(RuntimeHelper::KeepAlive),
        "BaseTransition" | "base-transition" => Some(RuntimeHelper::BaseTransition),
        _ => None,
    }
}

/// Directives that turn a `<template>` into a structural wrapper.
pub fn is_special_template_directive(name: &str) -> bool {
    matches!(name, "if" | "else" | "else-if" | "for" | "slot")
}

const DEFAULT_ENTITIES: [(&str, char); 5] = [
    ("&gt;", '>'),
    ("&lt;", '<'),
    ("&amp;", '&'),
    ("&apos;", '\''),
    ("&quot;", '"'),
];

/// Decode the five XML entities. Anything else is left untouched.
pub fn decode_entities(raw: &str, _as_attr: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match DEFAULT_ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, decoded)) => {
                out.push(*decoded);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
