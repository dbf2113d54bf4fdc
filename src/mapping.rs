//! R8/ProGuard symbol mapping parsing and name translation
//!
//! A `mapping.txt` produced by a code shrinker records original →
//! obfuscated renames. Matching entries across two builds needs the
//! inverse direction, so [`ApiMapping`] stores obfuscated → original
//! tables for classes, methods, and fields. Names that do not appear in
//! the mapping are assumed already canonical (framework and library
//! code is usually not run through the obfuscator) and translate to
//! themselves.
//!
//! The mapping is immutable after construction and safe to share
//! between the two artifact decode paths.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::PakdiffError;

/// Line grammar, e.g. `com.example.Foo -> a.a:`
static CLASS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+) -> (\S+):$").expect("class line regex"));

/// Member grammar, e.g. `    1:5:void run(int,java.lang.String) -> b`
/// or `    int count -> a`. Line-number prefixes and suffixes emitted
/// by R8 are accepted and discarded.
static MEMBER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(?:\d+:\d+:)?(\S+)\s+([^\s(:]+)(?:\(([^)]*)\))?(?::\d+)*\s+->\s+(\S+)$")
        .expect("member line regex")
});

/// Bidirectional rename table built from an R8/ProGuard mapping file
///
/// All lookups are pure; an [`ApiMapping`] with empty tables is the
/// identity mapping.
#[derive(Debug, Default)]
pub struct ApiMapping {
    /// obfuscated binary class name (dotted) → original
    classes: HashMap<String, String>,
    /// (obfuscated class, obfuscated field name) → original name
    fields: HashMap<(String, String), String>,
    /// (obfuscated class, obfuscated method name, arity) → original name
    methods: HashMap<(String, String, usize), String>,
}

impl ApiMapping {
    /// The identity mapping, used when no mapping file is supplied.
    pub fn empty() -> ApiMapping {
        ApiMapping::default()
    }

    /// Whether this mapping holds no renames at all.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }

    /// Parse mapping-file text.
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::MalformedMapping`] when a line matches
    /// neither the class-header nor the member grammar, or when a
    /// member line appears before any class header.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakdiff::mapping::ApiMapping;
    ///
    /// let mapping = ApiMapping::parse(
    ///     "com.example.Foo -> a.a:\n    int count -> a\n",
    /// )?;
    /// assert_eq!(mapping.translate_class("a.a"), "com.example.Foo");
    /// assert_eq!(mapping.translate_class("java.lang.String"), "java.lang.String");
    /// # Ok::<(), pakdiff::error::PakdiffError>(())
    /// ```
    pub fn parse(text: &str) -> Result<ApiMapping, PakdiffError> {
        let mut mapping = ApiMapping::default();
        let mut current_class: Option<String> = None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            if let Some(caps) = CLASS_LINE.captures(line) {
                let original = caps[1].to_string();
                let obfuscated = caps[2].to_string();
                mapping.classes.insert(obfuscated.clone(), original);
                current_class = Some(obfuscated);
                continue;
            }

            if let Some(caps) = MEMBER_LINE.captures(line) {
                let owner = current_class.clone().ok_or_else(|| {
                    PakdiffError::MalformedMapping {
                        line: line_no,
                        reason: "member line before any class header".to_string(),
                    }
                })?;
                let original = caps[2].to_string();
                let obfuscated = caps[4].to_string();
                match caps.get(3) {
                    Some(args) => {
                        let arity = source_arity(args.as_str());
                        mapping.methods.insert((owner, obfuscated, arity), original);
                    }
                    None => {
                        mapping.fields.insert((owner, obfuscated), original);
                    }
                }
                continue;
            }

            return Err(PakdiffError::MalformedMapping {
                line: line_no,
                reason: format!("unrecognized line: {:?}", line.trim_end()),
            });
        }

        Ok(mapping)
    }

    /// Translate an obfuscated dotted class name to its original name.
    ///
    /// Unknown names translate to themselves.
    pub fn translate_class<'a>(&'a self, raw: &'a str) -> &'a str {
        self.classes.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Translate an obfuscated method name, scoped by its enclosing
    /// class and disambiguated by arity taken from the JVM/DEX
    /// descriptor.
    ///
    /// Overloads of equal arity that the shrinker collapsed onto one
    /// obfuscated name cannot be told apart; the stored original wins.
    pub fn translate_method<'a>(
        &'a self,
        owner_raw: &str,
        raw: &'a str,
        descriptor: &str,
    ) -> &'a str {
        let arity = descriptor_arity(descriptor);
        self.methods
            .get(&(owner_raw.to_string(), raw.to_string(), arity))
            .map(String::as_str)
            .unwrap_or(raw)
    }

    /// Translate an obfuscated field name, scoped by its enclosing class.
    pub fn translate_field<'a>(&'a self, owner_raw: &str, raw: &'a str) -> &'a str {
        self.fields
            .get(&(owner_raw.to_string(), raw.to_string()))
            .map(String::as_str)
            .unwrap_or(raw)
    }

    /// Rewrite every class reference inside a JVM/DEX type descriptor
    /// through the class table, e.g. `(La/a;)V` → `(Lcom/example/Foo;)V`.
    pub fn translate_descriptor(&self, raw: &str) -> String {
        if self.classes.is_empty() {
            return raw.to_string();
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('L') {
            match rest[start..].find(';') {
                Some(end_rel) => {
                    let end = start + end_rel;
                    out.push_str(&rest[..=start]);
                    let dotted = rest[start + 1..end].replace('/', ".");
                    out.push_str(&self.translate_class(&dotted).replace('.', "/"));
                    out.push(';');
                    rest = &rest[end + 1..];
                }
                None => break, // unterminated reference; leave as-is
            }
        }
        out.push_str(rest);
        out
    }
}

/// Parameter count of a source-level argument list (`int,java.lang.String`).
fn source_arity(args: &str) -> usize {
    if args.trim().is_empty() {
        0
    } else {
        args.split(',').count()
    }
}

/// Parameter count of a JVM/DEX method descriptor (`(II[Ljava/lang/String;)V`).
fn descriptor_arity(descriptor: &str) -> usize {
    let inner = descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .map(|(params, _)| params)
        .unwrap_or("");
    let mut arity = 0;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '[' => continue, // array dimension, type char follows
            'L' => {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                }
                arity += 1;
            }
            _ => arity += 1,
        }
    }
    arity
}
