//! JVM `.class` file parsing
//!
//! Reads the constant pool, the class name, and field/method
//! declarations. Method bodies are not decoded; only the `Code`
//! attribute's bytecode length is kept as the size metric.

use super::{RawClass, RawField, RawMethod, Reader};
use crate::error::PakdiffError;

const MAGIC: u32 = 0xCAFE_BABE;

/// Constant pool entry; only variants the extractor needs are retained
enum CpEntry {
    Utf8(String),
    Class(u16),
    /// Anything else, kept for slot accounting only
    Opaque,
}

/// Parse one `.class` file into its declared members.
///
/// # Errors
///
/// Returns [`PakdiffError::ArtifactDecode`] on bad magic, a truncated
/// stream, or dangling constant-pool references.
pub fn parse(bytes: &[u8], context: &str) -> Result<RawClass, PakdiffError> {
    let mut r = Reader::new(bytes, context);

    if r.u32_be()? != MAGIC {
        return Err(r.error("not a class file (bad magic)"));
    }
    let _minor = r.u16_be()?;
    let _major = r.u16_be()?;

    let pool = read_constant_pool(&mut r)?;

    let _access_flags = r.u16_be()?;
    let this_class = r.u16_be()?;
    let _super_class = r.u16_be()?;

    let interfaces_count = r.u16_be()?;
    for _ in 0..interfaces_count {
        r.u16_be()?;
    }

    let name = class_name(&pool, this_class, &r)?;

    let fields_count = r.u16_be()?;
    let mut fields = Vec::with_capacity(usize::from(fields_count));
    for _ in 0..fields_count {
        let _access = r.u16_be()?;
        let field_name = utf8(&pool, r.u16_be()?, &r)?;
        let descriptor = utf8(&pool, r.u16_be()?, &r)?;
        skip_attributes(&mut r)?;
        fields.push(RawField {
            name: field_name,
            descriptor,
        });
    }

    let methods_count = r.u16_be()?;
    let mut methods = Vec::with_capacity(usize::from(methods_count));
    for _ in 0..methods_count {
        let _access = r.u16_be()?;
        let method_name = utf8(&pool, r.u16_be()?, &r)?;
        let descriptor = utf8(&pool, r.u16_be()?, &r)?;
        let code_size = read_method_attributes(&mut r, &pool)?;
        methods.push(RawMethod {
            name: method_name,
            descriptor,
            code_size,
        });
    }

    Ok(RawClass {
        name,
        methods,
        fields,
    })
}

fn read_constant_pool(r: &mut Reader<'_>) -> Result<Vec<CpEntry>, PakdiffError> {
    let count = r.u16_be()?;
    // Slot 0 is unused; long/double entries occupy two slots
    let mut pool = Vec::with_capacity(usize::from(count));
    pool.push(CpEntry::Opaque);
    let mut index = 1;
    while index < count {
        let tag = r.u8()?;
        let (entry, slots) = match tag {
            1 => {
                let len = usize::from(r.u16_be()?);
                let raw = r.take(len)?;
                // JVM "modified UTF-8"; lossy decode is fine for names
                (CpEntry::Utf8(String::from_utf8_lossy(raw).into_owned()), 1)
            }
            7 => (CpEntry::Class(r.u16_be()?), 1),
            3 | 4 => {
                r.take(4)?;
                (CpEntry::Opaque, 1)
            }
            5 | 6 => {
                r.take(8)?;
                (CpEntry::Opaque, 2)
            }
            8 | 16 | 19 | 20 => {
                r.take(2)?;
                (CpEntry::Opaque, 1)
            }
            9 | 10 | 11 | 12 | 17 | 18 => {
                r.take(4)?;
                (CpEntry::Opaque, 1)
            }
            15 => {
                r.take(3)?;
                (CpEntry::Opaque, 1)
            }
            other => return Err(r.error(format!("unknown constant pool tag {other}"))),
        };
        pool.push(entry);
        if slots == 2 {
            pool.push(CpEntry::Opaque);
        }
        index += slots;
    }
    Ok(pool)
}

fn utf8(pool: &[CpEntry], index: u16, r: &Reader<'_>) -> Result<String, PakdiffError> {
    match pool.get(usize::from(index)) {
        Some(CpEntry::Utf8(s)) => Ok(s.clone()),
        _ => Err(r.error(format!("constant pool index {index} is not a Utf8 entry"))),
    }
}

fn class_name(pool: &[CpEntry], index: u16, r: &Reader<'_>) -> Result<String, PakdiffError> {
    match pool.get(usize::from(index)) {
        Some(CpEntry::Class(name_index)) => {
            Ok(utf8(pool, *name_index, r)?.replace('/', "."))
        }
        _ => Err(r.error(format!("constant pool index {index} is not a Class entry"))),
    }
}

fn skip_attributes(r: &mut Reader<'_>) -> Result<(), PakdiffError> {
    let count = r.u16_be()?;
    for _ in 0..count {
        let _name_index = r.u16_be()?;
        let length = r.u32_be()? as usize;
        r.take(length)?;
    }
    Ok(())
}

/// Walk a method's attributes, returning its `Code` bytecode length.
fn read_method_attributes(r: &mut Reader<'_>, pool: &[CpEntry]) -> Result<u64, PakdiffError> {
    let count = r.u16_be()?;
    let mut code_size = 0u64;
    for _ in 0..count {
        let name_index = r.u16_be()?;
        let length = r.u32_be()? as usize;
        let body_start = r.position();
        let is_code = matches!(pool.get(usize::from(name_index)), Some(CpEntry::Utf8(s)) if s == "Code");
        if is_code && length >= 8 {
            let _max_stack = r.u16_be()?;
            let _max_locals = r.u16_be()?;
            code_size = u64::from(r.u32_be()?);
        }
        r.seek(body_start + length)?;
    }
    Ok(code_size)
}
