//! De-obfuscated compiled member declarations
//!
//! Raw declarations from the bytecode parsers are translated through
//! the symbol mapping exactly once, here, at model construction. The
//! diff engine only ever sees canonical names.

use serde::{Deserialize, Serialize};

use crate::bytecode::RawClass;
use crate::mapping::ApiMapping;

/// A class extracted from compiled code, members sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// De-obfuscated dotted binary name
    pub name: String,
    /// Declared methods, sorted by (name, descriptor)
    pub methods: Vec<MethodDecl>,
    /// Declared fields, sorted by (name, descriptor)
    pub fields: Vec<FieldDecl>,
    /// Total bytecode size of the class's methods
    pub code_size: u64,
}

/// A method declaration with its canonical identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// De-obfuscated name of the enclosing class
    pub owner: String,
    /// De-obfuscated method name
    pub name: String,
    /// Descriptor with class references de-obfuscated
    pub descriptor: String,
    /// Bytecode size in bytes; 0 for abstract and native methods
    pub code_size: u64,
}

/// A field declaration with its canonical identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// De-obfuscated name of the enclosing class
    pub owner: String,
    /// De-obfuscated field name
    pub name: String,
    /// Type descriptor with class references de-obfuscated
    pub descriptor: String,
}

/// Condensed per-class view used for class-level diffing and reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    /// De-obfuscated dotted binary name
    pub name: String,
    /// Number of declared methods
    pub method_count: usize,
    /// Number of declared fields
    pub field_count: usize,
    /// Total bytecode size of the class's methods
    pub code_size: u64,
}

impl From<&ClassDecl> for ClassSummary {
    fn from(class: &ClassDecl) -> ClassSummary {
        ClassSummary {
            name: class.name.clone(),
            method_count: class.methods.len(),
            field_count: class.fields.len(),
            code_size: class.code_size,
        }
    }
}

/// Translate raw classes through the mapping and sort everything by
/// canonical identity.
pub(crate) fn translate_classes(raw: Vec<RawClass>, mapping: &ApiMapping) -> Vec<ClassDecl> {
    let mut classes: Vec<ClassDecl> = raw
        .into_iter()
        .map(|class| {
            let owner_raw = class.name;
            let owner = mapping.translate_class(&owner_raw).to_string();

            let mut methods: Vec<MethodDecl> = class
                .methods
                .into_iter()
                .map(|m| MethodDecl {
                    owner: owner.clone(),
                    name: mapping
                        .translate_method(&owner_raw, &m.name, &m.descriptor)
                        .to_string(),
                    descriptor: mapping.translate_descriptor(&m.descriptor),
                    code_size: m.code_size,
                })
                .collect();
            methods.sort_by(|a, b| (&a.name, &a.descriptor).cmp(&(&b.name, &b.descriptor)));

            let mut fields: Vec<FieldDecl> = class
                .fields
                .into_iter()
                .map(|f| FieldDecl {
                    owner: owner.clone(),
                    name: mapping.translate_field(&owner_raw, &f.name).to_string(),
                    descriptor: mapping.translate_descriptor(&f.descriptor),
                })
                .collect();
            fields.sort_by(|a, b| (&a.name, &a.descriptor).cmp(&(&b.name, &b.descriptor)));

            let code_size = methods.iter().map(|m| m.code_size).sum();
            ClassDecl {
                name: owner,
                methods,
                fields,
                code_size,
            }
        })
        .collect();
    classes.sort_by(|a, b| a.name.cmp(&b.name));
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{RawField, RawMethod};

    fn raw_class() -> RawClass {
        RawClass {
            name: "a.a".to_string(),
            methods: vec![
                RawMethod {
                    name: "b".to_string(),
                    descriptor: "(ILjava/lang/String;)V".to_string(),
                    code_size: 40,
                },
                RawMethod {
                    name: "<init>".to_string(),
                    descriptor: "()V".to_string(),
                    code_size: 10,
                },
            ],
            fields: vec![RawField {
                name: "a".to_string(),
                descriptor: "La/b;".to_string(),
            }],
        }
    }

    #[test]
    fn test_translation_produces_canonical_names() {
        let mapping = ApiMapping::parse(
            "com.example.Foo -> a.a:\n    \
             1:5:void run(int,java.lang.String) -> b\n    \
             com.example.Bar other -> a\ncom.example.Bar -> a.b:\n",
        )
        .unwrap();

        let classes = translate_classes(vec![raw_class()], &mapping);
        assert_eq!(classes.len(), 1);
        let class = &classes[0];
        assert_eq!(class.name, "com.example.Foo");
        assert_eq!(class.code_size, 50);

        // Sorted by name: <init> before run
        assert_eq!(class.methods[0].name, "<init>");
        assert_eq!(class.methods[1].name, "run");
        assert_eq!(class.methods[1].owner, "com.example.Foo");
        assert_eq!(class.fields[0].name, "other");
        assert_eq!(class.fields[0].descriptor, "Lcom/example/Bar;");
    }

    #[test]
    fn test_identity_mapping_keeps_raw_names() {
        let classes = translate_classes(vec![raw_class()], &ApiMapping::empty());
        assert_eq!(classes[0].name, "a.a");
        assert_eq!(classes[0].fields[0].descriptor, "La/b;");
    }

    #[test]
    fn test_classes_sorted_by_name() {
        let mut second = raw_class();
        second.name = "z.z".to_string();
        let mut first = raw_class();
        first.name = "b.b".to_string();
        let classes = translate_classes(vec![second, first], &ApiMapping::empty());
        assert_eq!(classes[0].name, "b.b");
        assert_eq!(classes[1].name, "z.z");
    }

    #[test]
    fn test_summary_from_class() {
        let classes = translate_classes(vec![raw_class()], &ApiMapping::empty());
        let summary = ClassSummary::from(&classes[0]);
        assert_eq!(summary.method_count, 2);
        assert_eq!(summary.field_count, 1);
        assert_eq!(summary.code_size, 50);
    }
}
