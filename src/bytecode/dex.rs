//! Dalvik executable (`.dex`) parsing
//!
//! Walks the id tables and class definitions of one dex file and
//! produces raw class declarations. Only classes defined in the file
//! are emitted; referenced-but-external types (framework classes,
//! other dex files of a multidex split) are not.
//!
//! The size metric for a method is its `code_item` footprint:
//! the 16-byte header plus the instruction stream.

use super::{descriptor_to_dotted, RawClass, RawField, RawMethod, Reader};
use crate::error::PakdiffError;

const NO_INDEX: u32 = 0xffff_ffff;
const CODE_ITEM_HEADER_SIZE: u64 = 16;

struct FieldId {
    type_idx: u16,
    name_idx: u32,
}

struct MethodId {
    proto_idx: u16,
    name_idx: u32,
}

/// Parse one dex file into the classes it defines.
///
/// # Errors
///
/// Returns [`PakdiffError::ArtifactDecode`] on bad magic, truncated
/// sections, or out-of-range table indices.
pub fn parse(bytes: &[u8], context: &str) -> Result<Vec<RawClass>, PakdiffError> {
    let mut r = Reader::new(bytes, context);

    let magic = r.take(8)?;
    if &magic[0..4] != b"dex\n" || magic[7] != 0 {
        return Err(r.error("not a dex file (bad magic)"));
    }

    r.seek(0x38)?;
    let string_ids_size = r.u32_le()? as usize;
    let string_ids_off = r.u32_le()? as usize;
    let type_ids_size = r.u32_le()? as usize;
    let type_ids_off = r.u32_le()? as usize;
    let proto_ids_size = r.u32_le()? as usize;
    let proto_ids_off = r.u32_le()? as usize;
    let field_ids_size = r.u32_le()? as usize;
    let field_ids_off = r.u32_le()? as usize;
    let method_ids_size = r.u32_le()? as usize;
    let method_ids_off = r.u32_le()? as usize;
    let class_defs_size = r.u32_le()? as usize;
    let class_defs_off = r.u32_le()? as usize;

    let strings = read_strings(&mut r, string_ids_size, string_ids_off)?;
    let types = read_types(&mut r, type_ids_size, type_ids_off, &strings)?;
    let protos = read_protos(&mut r, proto_ids_size, proto_ids_off, &types)?;
    let field_ids = read_field_ids(&mut r, field_ids_size, field_ids_off)?;
    let method_ids = read_method_ids(&mut r, method_ids_size, method_ids_off)?;

    let mut classes = Vec::with_capacity(class_defs_size);
    for index in 0..class_defs_size {
        r.seek(class_defs_off + index * 32)?;
        let class_idx = r.u32_le()? as usize;
        let _access_flags = r.u32_le()?;
        let _superclass_idx = r.u32_le()?;
        let _interfaces_off = r.u32_le()?;
        let _source_file_idx = r.u32_le()?;
        let _annotations_off = r.u32_le()?;
        let class_data_off = r.u32_le()? as usize;
        let _static_values_off = r.u32_le()?;

        let descriptor = types
            .get(class_idx)
            .ok_or_else(|| r.error(format!("class_def {index}: type index out of range")))?;
        let name = descriptor_to_dotted(descriptor);

        let (fields, methods) = if class_data_off == 0 {
            (Vec::new(), Vec::new())
        } else {
            read_class_data(
                &mut r,
                class_data_off,
                &strings,
                &types,
                &protos,
                &field_ids,
                &method_ids,
            )?
        };

        classes.push(RawClass {
            name,
            methods,
            fields,
        });
    }

    Ok(classes)
}

fn read_strings(
    r: &mut Reader<'_>,
    size: usize,
    offset: usize,
) -> Result<Vec<String>, PakdiffError> {
    let mut offsets = Vec::with_capacity(size);
    r.seek(offset)?;
    for _ in 0..size {
        offsets.push(r.u32_le()? as usize);
    }

    let mut strings = Vec::with_capacity(size);
    for data_off in offsets {
        r.seek(data_off)?;
        let _utf16_len = r.uleb128()?;
        let mut raw = Vec::new();
        loop {
            let byte = r.u8()?;
            if byte == 0 {
                break;
            }
            raw.push(byte);
        }
        // MUTF-8 differs from UTF-8 only for NUL and supplementary
        // characters, neither of which occurs in identifiers we match on
        strings.push(String::from_utf8_lossy(&raw).into_owned());
    }
    Ok(strings)
}

fn read_types(
    r: &mut Reader<'_>,
    size: usize,
    offset: usize,
    strings: &[String],
) -> Result<Vec<String>, PakdiffError> {
    r.seek(offset)?;
    let mut types = Vec::with_capacity(size);
    for index in 0..size {
        let descriptor_idx = r.u32_le()? as usize;
        let descriptor = strings
            .get(descriptor_idx)
            .ok_or_else(|| r.error(format!("type_id {index}: string index out of range")))?;
        types.push(descriptor.clone());
    }
    Ok(types)
}

/// Assemble each proto into a JVM-form method descriptor `(params)ret`.
fn read_protos(
    r: &mut Reader<'_>,
    size: usize,
    offset: usize,
    types: &[String],
) -> Result<Vec<String>, PakdiffError> {
    let mut entries = Vec::with_capacity(size);
    r.seek(offset)?;
    for _ in 0..size {
        let _shorty_idx = r.u32_le()?;
        let return_type_idx = r.u32_le()? as usize;
        let parameters_off = r.u32_le()? as usize;
        entries.push((return_type_idx, parameters_off));
    }

    let mut protos = Vec::with_capacity(size);
    for (index, (return_type_idx, parameters_off)) in entries.into_iter().enumerate() {
        let mut descriptor = String::from("(");
        if parameters_off != 0 {
            r.seek(parameters_off)?;
            let count = r.u32_le()? as usize;
            for _ in 0..count {
                let type_idx = r.u16_le()? as usize;
                let param = types.get(type_idx).ok_or_else(|| {
                    r.error(format!("proto {index}: parameter type index out of range"))
                })?;
                descriptor.push_str(param);
            }
        }
        descriptor.push(')');
        let ret = types
            .get(return_type_idx)
            .ok_or_else(|| r.error(format!("proto {index}: return type index out of range")))?;
        descriptor.push_str(ret);
        protos.push(descriptor);
    }
    Ok(protos)
}

fn read_field_ids(
    r: &mut Reader<'_>,
    size: usize,
    offset: usize,
) -> Result<Vec<FieldId>, PakdiffError> {
    r.seek(offset)?;
    let mut ids = Vec::with_capacity(size);
    for _ in 0..size {
        let _class_idx = r.u16_le()?;
        ids.push(FieldId {
            type_idx: r.u16_le()?,
            name_idx: r.u32_le()?,
        });
    }
    Ok(ids)
}

fn read_method_ids(
    r: &mut Reader<'_>,
    size: usize,
    offset: usize,
) -> Result<Vec<MethodId>, PakdiffError> {
    r.seek(offset)?;
    let mut ids = Vec::with_capacity(size);
    for _ in 0..size {
        let _class_idx = r.u16_le()?;
        ids.push(MethodId {
            proto_idx: r.u16_le()?,
            name_idx: r.u32_le()?,
        });
    }
    Ok(ids)
}

#[allow(clippy::too_many_arguments)]
fn read_class_data(
    r: &mut Reader<'_>,
    offset: usize,
    strings: &[String],
    types: &[String],
    protos: &[String],
    field_ids: &[FieldId],
    method_ids: &[MethodId],
) -> Result<(Vec<RawField>, Vec<RawMethod>), PakdiffError> {
    r.seek(offset)?;
    let static_fields = r.uleb128()? as usize;
    let instance_fields = r.uleb128()? as usize;
    let direct_methods = r.uleb128()? as usize;
    let virtual_methods = r.uleb128()? as usize;

    let mut fields = Vec::with_capacity(static_fields + instance_fields);
    for count in [static_fields, instance_fields] {
        // idx values are delta-encoded within each list
        let mut field_idx = 0u32;
        for _ in 0..count {
            field_idx = field_idx.wrapping_add(r.uleb128()?);
            let _access_flags = r.uleb128()?;
            let id = field_ids
                .get(field_idx as usize)
                .ok_or_else(|| r.error(format!("field index {field_idx} out of range")))?;
            let name = strings
                .get(id.name_idx as usize)
                .ok_or_else(|| r.error(format!("field {field_idx}: name index out of range")))?;
            let descriptor = types
                .get(usize::from(id.type_idx))
                .ok_or_else(|| r.error(format!("field {field_idx}: type index out of range")))?;
            fields.push(RawField {
                name: name.clone(),
                descriptor: descriptor.clone(),
            });
        }
    }

    let mut methods = Vec::with_capacity(direct_methods + virtual_methods);
    let mut code_offs = Vec::with_capacity(direct_methods + virtual_methods);
    for count in [direct_methods, virtual_methods] {
        let mut method_idx = 0u32;
        for _ in 0..count {
            method_idx = method_idx.wrapping_add(r.uleb128()?);
            let _access_flags = r.uleb128()?;
            let code_off = r.uleb128()? as usize;
            let id = method_ids
                .get(method_idx as usize)
                .ok_or_else(|| r.error(format!("method index {method_idx} out of range")))?;
            let name = strings
                .get(id.name_idx as usize)
                .ok_or_else(|| r.error(format!("method {method_idx}: name index out of range")))?;
            let descriptor = protos
                .get(usize::from(id.proto_idx))
                .ok_or_else(|| r.error(format!("method {method_idx}: proto index out of range")))?;
            methods.push(RawMethod {
                name: name.clone(),
                descriptor: descriptor.clone(),
                code_size: 0,
            });
            code_offs.push(code_off);
        }
    }

    // Code sizes are read after the class_data walk so the delta
    // decoding above stays linear over the stream
    for (method, code_off) in methods.iter_mut().zip(code_offs) {
        if code_off != 0 {
            r.seek(code_off + 12)?;
            let insns_size = u64::from(r.u32_le()?);
            method.code_size = CODE_ITEM_HEADER_SIZE + insns_size * 2;
        }
    }

    Ok((fields, methods))
}
