//! Canonical text rendering of values.
//!
//! Three modes share one walker:
//!
//! - `Identity`: the canonical literal, cached per value by
//!   [`Value::identity`]. Children contribute their own cached identities;
//!   set and bag members are sorted by identity text. Handles carry their
//!   instance serial.
//! - `Export`: the same literal computed afresh, with handles rendered as an
//!   opaque placeholder.
//! - `Preview`: a debugging view that shows lazy collection structure as-is.
//!   It never collapses a tree and never fills a cache, so it cannot hide a
//!   representation bug.

use std::fmt::Write;
use std::sync::Arc;

use muon_stack::ensure_sufficient_stack;

use crate::discrete::{Discrete, Shape};
use crate::value::{Article, Fraction, Heading, Relational, Repr, Tuple, Value};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Identity,
    Export,
    Preview,
}

const SEPARATOR: &str = ", ";

pub(crate) fn render(value: &Value, mode: Mode) -> String {
    let mut out = String::new();
    write_value(&mut out, value, mode);
    out
}

/// Literal text of a heading, as used in error messages.
pub(crate) fn heading_text(heading: &Heading) -> String {
    let mut out = String::new();
    write_heading(&mut out, heading);
    out
}

fn write_value(out: &mut String, value: &Value, mode: Mode) {
    ensure_sufficient_stack(|| match value.repr() {
        Repr::Boolean(b) => out.push_str(if *b { "0bTRUE" } else { "0bFALSE" }),
        Repr::Integer(n) => {
            let _ = write!(out, "{n}");
        }
        Repr::Fraction(f) => write_fraction(out, f, mode),
        Repr::Bits(bits) => {
            out.push_str("0bb");
            out.extend(bits.as_slice().iter().map(|&b| if b { '1' } else { '0' }));
        }
        Repr::Blob(blob) => {
            out.push_str("0xx");
            for byte in blob.as_slice() {
                let _ = write!(out, "{byte:02X}");
            }
        }
        Repr::Text(text) => write_text(out, text.units()),
        Repr::Array(tree) => write_array(out, tree, mode),
        Repr::Set(tree) => write_unordered(out, "Set", tree, mode, false),
        Repr::Bag(tree) => write_unordered(out, "Bag", tree, mode, true),
        Repr::Heading(heading) => write_heading(out, heading),
        Repr::Tuple(tuple) => write_tuple(out, tuple, mode),
        Repr::TupleArray(rel) => write_relational(out, "Tuple-Array", rel, mode),
        Repr::Relation(rel) => write_relational(out, "Relation", rel, mode),
        Repr::TupleBag(rel) => write_relational(out, "Tuple-Bag", rel, mode),
        Repr::Article(article) => write_article(out, "Article", article, mode),
        Repr::Excuse(article) => write_article(out, "Excuse", article, mode),
        Repr::Variable(v) => write_handle(out, value, v.handle().serial(), mode),
        Repr::Process(h) | Repr::Stream(h) => write_handle(out, value, h.serial(), mode),
        Repr::External(e) => write_handle(out, value, e.handle().serial(), mode),
    });
}

/// A nested value: its cached identity in `Identity` mode, a fresh
/// rendering otherwise.
fn write_child(out: &mut String, value: &Value, mode: Mode) {
    match mode {
        Mode::Identity => out.push_str(&value.identity()),
        Mode::Export | Mode::Preview => write_value(out, value, mode),
    }
}

fn child_text(value: &Value, mode: Mode) -> Arc<str> {
    match mode {
        Mode::Identity => value.identity(),
        Mode::Export | Mode::Preview => render(value, mode).into(),
    }
}

fn write_fraction(out: &mut String, fraction: &Fraction, mode: Mode) {
    if mode == Mode::Preview {
        // The supplied form, without reducing.
        let _ = match fraction.decimal() {
            Some(d) => write!(out, "{d}"),
            None => write!(out, "{}", fraction.ratio()),
        };
        return;
    }
    let _ = match fraction.to_decimal() {
        Some(d) => write!(out, "{d}"),
        None => write!(out, "{}", fraction.ensure_coprime()),
    };
}

fn write_text(out: &mut String, units: &[u16]) {
    if muon_text::is_identifier(units) {
        out.extend(muon_text::code_points(units).filter_map(char::from_u32));
        return;
    }
    let mut points = muon_text::code_points(units);
    if let (Some(only), None) = (points.next(), points.next()) {
        if char::from_u32(only).is_some_and(char::is_control) {
            let _ = write!(out, "0t{only}");
            return;
        }
    }
    out.push('"');
    for cp in muon_text::code_points(units) {
        match cp {
            0x22 => out.push_str("\\\""),
            0x5C => out.push_str("\\\\"),
            0x60 => out.push_str("\\`"),
            0x09 => out.push_str("\\t"),
            0x0A => out.push_str("\\n"),
            0x0D => out.push_str("\\r"),
            0x20..=0x7E => out.extend(char::from_u32(cp)),
            _ => {
                let _ = write!(out, "\\(0t{cp})");
            }
        }
    }
    out.push('"');
}

fn write_name(out: &mut String, name: &str) {
    write_text(out, &muon_text::encode(name));
}

fn write_heading(out: &mut String, heading: &Heading) {
    out.push_str("(Heading:{");
    for (i, name) in heading.names().iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        write_name(out, name);
    }
    out.push_str("})");
}

fn write_tuple(out: &mut String, tuple: &Tuple, mode: Mode) {
    out.push_str("(Tuple:{");
    for (i, (name, value)) in tuple.iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        write_name(out, name);
        out.push_str(" : ");
        write_child(out, value, mode);
    }
    out.push_str("})");
}

fn write_article(out: &mut String, tag: &str, article: &Article, mode: Mode) {
    let _ = write!(out, "({tag}:(");
    write_child(out, article.label(), mode);
    out.push_str(" : ");
    write_child(out, article.attrs_value(), mode);
    out.push_str("))");
}

fn write_relational(out: &mut String, tag: &str, rel: &Relational, mode: Mode) {
    let _ = write!(out, "({tag}:(");
    write_heading(out, rel.heading());
    out.push_str(" : ");
    write_child(out, rel.body_value(), mode);
    out.push_str("))");
}

#[tracing::instrument(level = "trace", skip_all, fields(mode = ?mode))]
fn write_array(out: &mut String, tree: &Discrete, mode: Mode) {
    out.push_str("(Array:");
    if mode == Mode::Preview {
        write_tree_preview(out, tree);
        out.push(')');
        return;
    }
    out.push('[');
    let mut first = true;
    for (member, n) in tree.members() {
        // Identity text of a repeated member is computed once.
        let text = child_text(&member, mode);
        for _ in 0..n {
            if !first {
                out.push_str(SEPARATOR);
            }
            first = false;
            out.push_str(&text);
        }
    }
    out.push_str("])");
}

#[tracing::instrument(level = "trace", skip_all, fields(tag = %tag, mode = ?mode))]
fn write_unordered(out: &mut String, tag: &str, tree: &Discrete, mode: Mode, counted: bool) {
    let _ = write!(out, "({tag}:");
    if mode == Mode::Preview {
        write_tree_preview(out, tree);
        out.push(')');
        return;
    }
    let mut entries: Vec<(Arc<str>, u64)> = tree
        .members()
        .into_iter()
        .map(|(member, n)| (child_text(&member, mode), n))
        .collect();
    entries.sort_unstable();
    out.push('[');
    for (i, (text, n)) in entries.iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(text);
        if counted {
            let _ = write!(out, " : {n}");
        }
    }
    out.push_str("])");
}

fn write_handle(out: &mut String, value: &Value, serial: u64, mode: Mode) {
    let tag = value.kind().name();
    match mode {
        Mode::Identity | Mode::Preview => {
            let _ = write!(out, "({tag}:#{serial})");
        }
        Mode::Export => {
            let _ = write!(out, "({tag}:<opaque>)");
        }
    }
}

/// Lazy structure as it stands: `~` joins catenated sides, `+` summed
/// sides, and `unique(..)` wraps de-duplication.
fn write_tree_preview(out: &mut String, tree: &Discrete) {
    ensure_sufficient_stack(|| match tree.shape() {
        Shape::None => out.push_str("[]"),
        Shape::Singular {
            member,
            multiplicity,
        } => {
            out.push('[');
            write_value(out, member, Mode::Preview);
            let _ = write!(out, " : {multiplicity}]");
        }
        Shape::Arrayed(members) => {
            out.push('[');
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(SEPARATOR);
                }
                write_value(out, member, Mode::Preview);
            }
            out.push(']');
        }
        Shape::ArrayedCounted(members) => {
            out.push('[');
            for (i, (member, n)) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(SEPARATOR);
                }
                write_value(out, member, Mode::Preview);
                let _ = write!(out, " : {n}");
            }
            out.push(']');
        }
        Shape::Indexed(map) => {
            out.push('{');
            for (i, (member, n)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(SEPARATOR);
                }
                write_value(out, member, Mode::Preview);
                let _ = write!(out, " : {n}");
            }
            out.push('}');
        }
        Shape::Catenated(left, right) => {
            out.push('(');
            write_tree_preview(out, left);
            out.push_str(" ~ ");
            write_tree_preview(out, right);
            out.push(')');
        }
        Shape::Summed(left, right) => {
            out.push('(');
            write_tree_preview(out, left);
            out.push_str(" + ");
            write_tree_preview(out, right);
            out.push(')');
        }
        Shape::Unique(child) => {
            out.push_str("unique(");
            write_tree_preview(out, child);
            out.push(')');
        }
    });
}
