//! Shared fixture builders for in-crate tests
//!
//! Hand-assembled ZIP, class-file, and dex payloads small enough to
//! reason about byte by byte.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build an in-memory ZIP archive from (path, content) pairs.
pub(crate) fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Assemble a `.class` file declaring the given fields and methods.
///
/// `name` is the slash-form binary name (`a/A`). Methods are
/// `(name, descriptor, code_length)`; every method gets a `Code`
/// attribute holding `code_length` bytes of return opcodes.
pub(crate) fn class_bytes(
    name: &str,
    fields: &[(&str, &str)],
    methods: &[(&str, &str, u32)],
) -> Vec<u8> {
    let mut strings: Vec<String> = Vec::new();
    let mut intern = |s: &str| -> u16 {
        if let Some(i) = strings.iter().position(|x| x == s) {
            (i + 1) as u16
        } else {
            strings.push(s.to_string());
            strings.len() as u16
        }
    };

    let name_utf8 = intern(name);
    let code_utf8 = intern("Code");
    let field_refs: Vec<(u16, u16)> = fields
        .iter()
        .map(|(n, d)| (intern(n), intern(d)))
        .collect();
    let method_refs: Vec<(u16, u16, u32)> = methods
        .iter()
        .map(|(n, d, len)| (intern(n), intern(d), *len))
        .collect();
    let class_index = (strings.len() + 1) as u16;

    let mut b = Vec::new();
    b.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    b.extend_from_slice(&0u16.to_be_bytes()); // minor
    b.extend_from_slice(&52u16.to_be_bytes()); // major (Java 8)

    b.extend_from_slice(&(class_index + 1).to_be_bytes()); // cp count
    for s in &strings {
        b.push(1);
        b.extend_from_slice(&(s.len() as u16).to_be_bytes());
        b.extend_from_slice(s.as_bytes());
    }
    b.push(7); // Class -> name utf8
    b.extend_from_slice(&name_utf8.to_be_bytes());

    b.extend_from_slice(&0x0021u16.to_be_bytes()); // access
    b.extend_from_slice(&class_index.to_be_bytes()); // this_class
    b.extend_from_slice(&0u16.to_be_bytes()); // super
    b.extend_from_slice(&0u16.to_be_bytes()); // interfaces

    b.extend_from_slice(&(field_refs.len() as u16).to_be_bytes());
    for (name_idx, desc_idx) in field_refs {
        b.extend_from_slice(&0u16.to_be_bytes()); // access
        b.extend_from_slice(&name_idx.to_be_bytes());
        b.extend_from_slice(&desc_idx.to_be_bytes());
        b.extend_from_slice(&0u16.to_be_bytes()); // attrs
    }

    b.extend_from_slice(&(method_refs.len() as u16).to_be_bytes());
    for (name_idx, desc_idx, code_len) in method_refs {
        b.extend_from_slice(&1u16.to_be_bytes()); // access
        b.extend_from_slice(&name_idx.to_be_bytes());
        b.extend_from_slice(&desc_idx.to_be_bytes());
        b.extend_from_slice(&1u16.to_be_bytes()); // attrs count
        b.extend_from_slice(&code_utf8.to_be_bytes());
        b.extend_from_slice(&(12 + code_len).to_be_bytes()); // attr length
        b.extend_from_slice(&1u16.to_be_bytes()); // max_stack
        b.extend_from_slice(&1u16.to_be_bytes()); // max_locals
        b.extend_from_slice(&code_len.to_be_bytes());
        b.extend(std::iter::repeat_n(0xb1u8, code_len as usize)); // return opcodes
        b.extend_from_slice(&0u16.to_be_bytes()); // exception table
        b.extend_from_slice(&0u16.to_be_bytes()); // code attrs
    }

    b.extend_from_slice(&0u16.to_be_bytes()); // class attrs
    b
}

/// Class `a.A` with field `x: I` and method `m()V` (4 bytes of code).
pub(crate) fn minimal_class_bytes() -> Vec<u8> {
    class_bytes("a/A", &[("x", "I")], &[("m", "()V", 4)])
}

/// Hand-assembled dex defining class `a.A` with field `x: I`, a
/// `<init>()V` constructor (insns_size 2), and a method `m(I)V`
/// (insns_size 3).
pub(crate) fn minimal_dex_bytes() -> Vec<u8> {
    const NO_INDEX: u32 = 0xffff_ffff;
    let mut b = vec![0u8; 0x70];

    // string data (all lengths < 128, so uleb128 is one byte)
    let strings = ["La/A;", "I", "V", "x", "<init>", "m", "VI"];
    let mut string_offsets = Vec::new();
    for s in strings {
        string_offsets.push(b.len() as u32);
        b.push(s.len() as u8); // utf16 length
        b.extend_from_slice(s.as_bytes());
        b.push(0);
    }

    let string_ids_off = b.len() as u32;
    for off in &string_offsets {
        b.extend_from_slice(&off.to_le_bytes());
    }

    let type_ids_off = b.len() as u32;
    for descriptor_idx in [0u32, 1, 2] {
        b.extend_from_slice(&descriptor_idx.to_le_bytes());
    }

    // type_list for (I)
    let params_off = b.len() as u32;
    b.extend_from_slice(&1u32.to_le_bytes());
    b.extend_from_slice(&1u16.to_le_bytes());
    b.extend_from_slice(&0u16.to_le_bytes()); // alignment pad

    let proto_ids_off = b.len() as u32;
    for (shorty, ret, params) in [(6u32, 2u32, 0u32), (6, 2, params_off)] {
        b.extend_from_slice(&shorty.to_le_bytes());
        b.extend_from_slice(&ret.to_le_bytes());
        b.extend_from_slice(&params.to_le_bytes());
    }

    let field_ids_off = b.len() as u32;
    b.extend_from_slice(&0u16.to_le_bytes()); // class: a.A
    b.extend_from_slice(&1u16.to_le_bytes()); // type: I
    b.extend_from_slice(&3u32.to_le_bytes()); // name: x

    let method_ids_off = b.len() as u32;
    for (class, proto, name) in [(0u16, 0u16, 4u32), (0, 1, 5)] {
        b.extend_from_slice(&class.to_le_bytes());
        b.extend_from_slice(&proto.to_le_bytes());
        b.extend_from_slice(&name.to_le_bytes());
    }

    let code0_off = b.len() as u32;
    b.extend_from_slice(&[1, 0, 1, 0, 0, 0, 0, 0]); // regs/ins/outs/tries
    b.extend_from_slice(&0u32.to_le_bytes()); // debug_info_off
    b.extend_from_slice(&2u32.to_le_bytes()); // insns_size
    b.extend_from_slice(&[0x0e, 0x00, 0x0e, 0x00]);

    let code1_off = b.len() as u32;
    b.extend_from_slice(&[1, 0, 1, 0, 0, 0, 0, 0]);
    b.extend_from_slice(&0u32.to_le_bytes());
    b.extend_from_slice(&3u32.to_le_bytes());
    b.extend_from_slice(&[0x0e, 0x00, 0x0e, 0x00, 0x0e, 0x00]);

    let class_data_off = b.len() as u32;
    b.extend_from_slice(&[0, 1, 2, 0]); // static/instance/direct/virtual counts
    b.extend_from_slice(&[0, 2]); // field 0, ACC_PRIVATE
    b.push(0); // method 0
    b.push(1); // access
    push_uleb(&mut b, code0_off);
    b.push(1); // method idx diff -> 1
    b.push(1); // access
    push_uleb(&mut b, code1_off);

    let class_defs_off = b.len() as u32;
    b.extend_from_slice(&0u32.to_le_bytes()); // class_idx
    b.extend_from_slice(&1u32.to_le_bytes()); // access
    b.extend_from_slice(&NO_INDEX.to_le_bytes()); // superclass
    b.extend_from_slice(&0u32.to_le_bytes()); // interfaces_off
    b.extend_from_slice(&NO_INDEX.to_le_bytes()); // source_file
    b.extend_from_slice(&0u32.to_le_bytes()); // annotations_off
    b.extend_from_slice(&class_data_off.to_le_bytes());
    b.extend_from_slice(&0u32.to_le_bytes()); // static_values_off

    b[0..8].copy_from_slice(b"dex\n035\0");
    let patch = |b: &mut Vec<u8>, at: usize, v: u32| {
        b[at..at + 4].copy_from_slice(&v.to_le_bytes());
    };
    patch(&mut b, 0x38, strings.len() as u32);
    patch(&mut b, 0x3c, string_ids_off);
    patch(&mut b, 0x40, 3);
    patch(&mut b, 0x44, type_ids_off);
    patch(&mut b, 0x48, 2);
    patch(&mut b, 0x4c, proto_ids_off);
    patch(&mut b, 0x50, 1);
    patch(&mut b, 0x54, field_ids_off);
    patch(&mut b, 0x58, 2);
    patch(&mut b, 0x5c, method_ids_off);
    patch(&mut b, 0x60, 1);
    patch(&mut b, 0x64, class_defs_off);
    b
}

fn push_uleb(b: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            b.push(byte);
            break;
        }
        b.push(byte | 0x80);
    }
}
