//! Deserialization of save files.
//!
//! All multi-byte values are little-endian. Counts come from the file and
//! are untrusted: they are range-checked and initial allocations are capped,
//! so a corrupt header cannot request gigabytes up front.

use std::io::Read;

use crate::error::{AppResult, ReelError};

use super::{
    CircuitStates, Component, ComponentType, ModInfo, PegRef, SaveFile, SaveKind, Wire,
    MAGIC_FOOTER, MAGIC_HEADER, SUPPORTED_VERSION,
};

/// Upper bound on speculative `Vec` pre-allocation from file-declared counts.
const MAX_PREALLOC: usize = 4096;

fn malformed(msg: impl Into<String>) -> ReelError {
    ReelError::Format(msg.into())
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> AppResult<()> {
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            malformed("unexpected end of file")
        } else {
            ReelError::Io(err)
        }
    })
}

fn read_u8<R: Read>(reader: &mut R) -> AppResult<u8> {
    let mut buf = [0u8; 1];
    read_exact(reader, &mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(reader: &mut R) -> AppResult<u16> {
    let mut buf = [0u8; 2];
    read_exact(reader, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> AppResult<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> AppResult<i32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> AppResult<f32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_bool<R: Read>(reader: &mut R) -> AppResult<bool> {
    match read_u8(reader)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(malformed(format!("invalid boolean byte {other}"))),
    }
}

/// Read a non-negative `i32` length prefix.
fn read_len<R: Read>(reader: &mut R, what: &str) -> AppResult<usize> {
    let len = read_i32(reader)?;
    usize::try_from(len).map_err(|_| malformed(format!("negative {what} count {len}")))
}

fn read_string<R: Read>(reader: &mut R) -> AppResult<String> {
    let len = read_len(reader, "string byte")?;
    let bytes = read_bytes(reader, len)?;
    String::from_utf8(bytes).map_err(|_| malformed("invalid UTF-8 in string"))
}

/// Read exactly `len` bytes without trusting `len` for the first allocation.
fn read_bytes<R: Read>(reader: &mut R, len: usize) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOC));
    let mut remaining = len;
    let mut chunk = [0u8; 1024];
    while remaining > 0 {
        let take = remaining.min(chunk.len());
        read_exact(reader, &mut chunk[..take])?;
        bytes.extend_from_slice(&chunk[..take]);
        remaining -= take;
    }
    Ok(bytes)
}

fn read_version<R: Read>(reader: &mut R) -> AppResult<[i32; 4]> {
    let mut version = [0i32; 4];
    for part in &mut version {
        *part = read_i32(reader)?;
    }
    Ok(version)
}

/// Collect `count` items parsed by `parse`, with capped pre-allocation.
fn read_list<R, T, F>(reader: &mut R, count: usize, mut parse: F) -> AppResult<Vec<T>>
where
    R: Read,
    F: FnMut(&mut R) -> AppResult<T>,
{
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        items.push(parse(reader)?);
    }
    Ok(items)
}

fn read_mod_info<R: Read>(reader: &mut R) -> AppResult<ModInfo> {
    Ok(ModInfo {
        id: read_string(reader)?,
        version: read_version(reader)?,
    })
}

fn read_component_type<R: Read>(reader: &mut R) -> AppResult<ComponentType> {
    Ok(ComponentType {
        numeric_id: read_u16(reader)?,
        text_id: read_string(reader)?,
    })
}

fn read_component<R: Read>(reader: &mut R) -> AppResult<Component> {
    let address = read_u32(reader)?;
    let parent = read_u32(reader)?;
    let type_id = read_u16(reader)?;

    let mut position = [0f32; 3];
    for axis in &mut position {
        *axis = read_f32(reader)?;
    }
    let mut rotation = [0f32; 4];
    for axis in &mut rotation {
        *axis = read_f32(reader)?;
    }

    let input_count = read_len(reader, "input peg")?;
    let inputs = read_list(reader, input_count, read_i32)?;
    let output_count = read_len(reader, "output peg")?;
    let outputs = read_list(reader, output_count, read_i32)?;

    let custom_len = read_i32(reader)?;
    let custom_data = match custom_len {
        -1 => None,
        len if len < 0 => {
            return Err(malformed(format!("invalid custom data length {len}")));
        }
        len => Some(read_bytes(reader, len as usize)?),
    };

    Ok(Component {
        address,
        parent,
        type_id,
        position,
        rotation,
        inputs,
        outputs,
        custom_data,
    })
}

fn read_peg_ref<R: Read>(reader: &mut R) -> AppResult<PegRef> {
    Ok(PegRef {
        is_input: read_bool(reader)?,
        component: read_u32(reader)?,
        index: read_i32(reader)?,
    })
}

fn read_wire<R: Read>(reader: &mut R) -> AppResult<Wire> {
    Ok(Wire {
        start: read_peg_ref(reader)?,
        end: read_peg_ref(reader)?,
        state_id: read_i32(reader)?,
        rotation: read_f32(reader)?,
    })
}

impl SaveFile {
    /// Parse a save file from `reader`.
    ///
    /// Returns [`ReelError::Format`] for anything that is not a well-formed
    /// version-6 save: wrong magic, unsupported version, negative counts,
    /// truncation, invalid UTF-8, or a missing footer.
    pub fn read<R: Read>(reader: &mut R) -> AppResult<Self> {
        let mut magic = [0u8; 16];
        read_exact(reader, &mut magic)?;
        if &magic != MAGIC_HEADER {
            return Err(malformed("missing save file magic header"));
        }

        let save_version = read_u8(reader)?;
        if save_version != SUPPORTED_VERSION {
            return Err(malformed(format!(
                "unsupported save version {save_version} (expected {SUPPORTED_VERSION})"
            )));
        }

        let game_version = read_version(reader)?;
        let kind_byte = read_u8(reader)?;
        let kind = SaveKind::from_byte(kind_byte)
            .ok_or_else(|| malformed(format!("unknown save kind {kind_byte}")))?;

        let component_count = read_len(reader, "component")?;
        let wire_count = read_len(reader, "wire")?;

        let mod_count = read_len(reader, "mod")?;
        let mods = read_list(reader, mod_count, read_mod_info)?;

        let type_count = read_len(reader, "component type")?;
        let component_types = read_list(reader, type_count, read_component_type)?;

        let components = read_list(reader, component_count, read_component)?;
        let wires = read_list(reader, wire_count, read_wire)?;

        let circuit_states = match kind {
            SaveKind::World => {
                let byte_count = read_len(reader, "circuit state byte")?;
                CircuitStates::World(read_bytes(reader, byte_count)?)
            }
            SaveKind::Subassembly => {
                let id_count = read_len(reader, "lit state")?;
                CircuitStates::Subassembly(read_list(reader, id_count, read_i32)?)
            }
        };

        let mut footer = [0u8; 16];
        read_exact(reader, &mut footer)?;
        if &footer != MAGIC_FOOTER {
            return Err(malformed("missing save file magic footer"));
        }

        Ok(SaveFile {
            save_version,
            game_version,
            mods,
            component_types,
            components,
            wires,
            circuit_states,
        })
    }
}
