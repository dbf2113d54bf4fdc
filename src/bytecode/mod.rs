//! Compiled-code decoding (DEX and JVM class files)
//!
//! Both parsers walk just enough of their format to extract declared
//! program elements: class names, member names and descriptors, and a
//! per-method bytecode size. Decoded names are raw (possibly
//! obfuscated); translation through the symbol mapping happens during
//! model construction.

/// JVM `.class` file parsing
pub mod class_file;
/// Dalvik executable (`.dex`) parsing
pub mod dex;

use crate::error::PakdiffError;

/// A class declaration as read from compiled code, names untranslated
#[derive(Debug, Clone)]
pub struct RawClass {
    /// Dotted binary name, e.g. `a.a` or `com.example.Foo`
    pub name: String,
    /// Declared methods
    pub methods: Vec<RawMethod>,
    /// Declared fields
    pub fields: Vec<RawField>,
}

/// A method declaration as read from compiled code
#[derive(Debug, Clone)]
pub struct RawMethod {
    /// Method name, e.g. `run` or `<init>`
    pub name: String,
    /// JVM-form descriptor, e.g. `(ILjava/lang/String;)V`
    pub descriptor: String,
    /// Bytecode size in bytes; 0 for abstract and native methods
    pub code_size: u64,
}

/// A field declaration as read from compiled code
#[derive(Debug, Clone)]
pub struct RawField {
    /// Field name
    pub name: String,
    /// JVM-form type descriptor, e.g. `I` or `Ljava/lang/String;`
    pub descriptor: String,
}

/// Bounds-checked forward reader over raw bytes
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    context: &'a str,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8], context: &'a str) -> Reader<'a> {
        Reader {
            bytes,
            pos: 0,
            context,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek(&mut self, pos: usize) -> Result<(), PakdiffError> {
        if pos > self.bytes.len() {
            return Err(self.error(format!("seek past end of data: {pos}")));
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], PakdiffError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.error(format!("truncated: needed {n} bytes")))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, PakdiffError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16_be(&mut self) -> Result<u16, PakdiffError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32_be(&mut self) -> Result<u32, PakdiffError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn u16_le(&mut self) -> Result<u16, PakdiffError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32, PakdiffError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Unsigned LEB128, as used throughout the dex format.
    pub(crate) fn uleb128(&mut self) -> Result<u32, PakdiffError> {
        let mut result: u32 = 0;
        for shift in 0..5 {
            let byte = self.u8()?;
            result |= u32::from(byte & 0x7f) << (shift * 7);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(self.error("uleb128 value longer than 5 bytes".to_string()))
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> PakdiffError {
        PakdiffError::ArtifactDecode {
            context: self.context.to_string(),
            reason: format!("at offset {}: {}", self.pos, reason.into()),
        }
    }
}

/// Convert a JVM type descriptor for a class (`La/b/C;`) to its dotted
/// binary name (`a.b.C`). Non-reference descriptors pass through.
pub(crate) fn descriptor_to_dotted(descriptor: &str) -> String {
    descriptor
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .map(|inner| inner.replace('/', "."))
        .unwrap_or_else(|| descriptor.to_string())
}
