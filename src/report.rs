//! Report rendering (text and JSON) over a diff result
//!
//! Rendering is a pure function of a [`DiffResult`]: it never
//! re-derives a classification and produces byte-identical output for
//! equal results. The summary section comes last so the detail listings
//! above it explain every number in it.

use std::fmt::Write as _;

use crate::archive::{ArchiveEntry, EntryKind};
use crate::diff::{CategoryDiff, DiffKey, DiffResult};
use crate::fmt::{format_bytes, format_delta};
use crate::model::{ClassSummary, FieldDecl, MethodDecl};

/// Render a diff result as deterministic plain text.
pub fn render(result: &DiffResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} diff", result.kind);

    render_body(&mut out, result);

    for module in &result.modules {
        let _ = writeln!(out);
        let _ = writeln!(out, "module {}", module.name);
        render_body(&mut out, &module.diff);
        render_summary(&mut out, &module.diff);
    }

    render_summary(&mut out, result);
    out
}

/// Render a diff result as pretty-printed JSON.
///
/// # Errors
///
/// Returns a serialization error; with the derived serializers in this
/// crate that does not happen in practice.
pub fn render_json(result: &DiffResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

fn render_body(out: &mut String, result: &DiffResult) {
    write_section(out, "entries", &result.entries, entry_line, entry_change);
    if let Some(classes_jar) = &result.classes_jar {
        write_section(out, "classes.jar", classes_jar, entry_line, entry_change);
    }
    write_section(out, "classes", &result.classes, class_line, class_change);
    write_section(out, "methods", &result.methods, method_line, method_change);
    write_section(out, "fields", &result.fields, field_line, |f, _| {
        field_line(f)
    });
}

fn render_summary(out: &mut String, result: &DiffResult) {
    let _ = writeln!(out);
    let _ = writeln!(out, "summary");
    let _ = writeln!(
        out,
        "  download: {} -> {} ({})",
        format_bytes(result.download.old),
        format_bytes(result.download.new),
        format_delta(result.download.delta())
    );
    let _ = writeln!(
        out,
        "  install:  {} -> {} ({})",
        format_bytes(result.install.old),
        format_bytes(result.install.new),
        format_delta(result.install.delta())
    );

    let entry_diffs: Vec<&CategoryDiff<ArchiveEntry>> = if result.modules.is_empty() {
        let mut diffs = vec![&result.entries];
        diffs.extend(result.classes_jar.as_ref());
        diffs
    } else {
        result.modules.iter().map(|m| &m.diff.entries).collect()
    };
    for kind in EntryKind::ALL {
        let delta: i64 = entry_diffs.iter().map(|d| kind_delta(d, kind)).sum();
        if delta != 0 {
            let _ = writeln!(out, "  {:<9} {}", kind.label(), format_delta(delta));
        }
    }

    let member_counts = |pick: fn(&DiffResult) -> (usize, usize)| -> (usize, usize) {
        if result.modules.is_empty() {
            pick(result)
        } else {
            result.modules.iter().fold((0, 0), |(o, n), m| {
                let (mo, mn) = pick(&m.diff);
                (o + mo, n + mn)
            })
        }
    };
    let (classes_old, classes_new) =
        member_counts(|r| (old_count(&r.classes), new_count(&r.classes)));
    let (methods_old, methods_new) =
        member_counts(|r| (old_count(&r.methods), new_count(&r.methods)));
    let (fields_old, fields_new) = member_counts(|r| (old_count(&r.fields), new_count(&r.fields)));
    let _ = writeln!(out, "  classes: {classes_old} -> {classes_new}");
    let _ = writeln!(out, "  methods: {methods_old} -> {methods_new}");
    let _ = writeln!(out, "  fields: {fields_old} -> {fields_new}");
}

fn old_count<T>(diff: &CategoryDiff<T>) -> usize {
    diff.removed.len() + diff.changed.len() + diff.unchanged_count
}

fn new_count<T>(diff: &CategoryDiff<T>) -> usize {
    diff.added.len() + diff.changed.len() + diff.unchanged_count
}

fn kind_delta(diff: &CategoryDiff<ArchiveEntry>, kind: EntryKind) -> i64 {
    let added: i64 = diff
        .added
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.uncompressed_size as i64)
        .sum();
    let removed: i64 = diff
        .removed
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.uncompressed_size as i64)
        .sum();
    let changed: i64 = diff
        .changed
        .iter()
        .filter(|c| c.new.kind == kind)
        .map(|c| c.delta())
        .sum();
    added - removed + changed
}

fn write_section<T: DiffKey>(
    out: &mut String,
    title: &str,
    diff: &CategoryDiff<T>,
    line: impl Fn(&T) -> String,
    change: impl Fn(&T, &T) -> String,
) {
    if diff.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    for item in &diff.removed {
        let _ = writeln!(out, "  - {}", line(item));
    }
    for item in &diff.added {
        let _ = writeln!(out, "  + {}", line(item));
    }
    for item in &diff.changed {
        let _ = writeln!(out, "  ~ {}", change(&item.old, &item.new));
    }
}

fn entry_line(entry: &ArchiveEntry) -> String {
    format!("{} ({})", entry.path, format_bytes(entry.uncompressed_size))
}

fn entry_change(old: &ArchiveEntry, new: &ArchiveEntry) -> String {
    format!(
        "{} ({} -> {}, {})",
        new.path,
        format_bytes(old.uncompressed_size),
        format_bytes(new.uncompressed_size),
        format_delta(new.uncompressed_size as i64 - old.uncompressed_size as i64)
    )
}

fn class_line(class: &ClassSummary) -> String {
    format!(
        "{} ({} methods, {} fields, {})",
        class.name,
        class.method_count,
        class.field_count,
        format_bytes(class.code_size)
    )
}

fn class_change(old: &ClassSummary, new: &ClassSummary) -> String {
    format!(
        "{} ({} -> {}, {})",
        new.name,
        format_bytes(old.code_size),
        format_bytes(new.code_size),
        format_delta(new.code_size as i64 - old.code_size as i64)
    )
}

fn method_line(method: &MethodDecl) -> String {
    format!(
        "{} {}{} ({})",
        method.owner,
        method.name,
        method.descriptor,
        format_bytes(method.code_size)
    )
}

fn method_change(old: &MethodDecl, new: &MethodDecl) -> String {
    format!(
        "{} {}{} ({} -> {}, {})",
        new.owner,
        new.name,
        new.descriptor,
        format_bytes(old.code_size),
        format_bytes(new.code_size),
        format_delta(new.code_size as i64 - old.code_size as i64)
    )
}

fn field_line(field: &FieldDecl) -> String {
    format!("{} {}: {}", field.owner, field.name, field.descriptor)
}
