//! Serialization of save files.
//!
//! Mirrors the reader exactly; `write` followed by `read` reproduces the
//! original value. Collection lengths and custom-data sizes are declared as
//! `i32` on disk, so oversized values fail with a range error instead of
//! silently truncating.

use std::io::Write;

use crate::error::AppResult;

use super::{CircuitStates, Component, ModInfo, PegRef, SaveFile, Wire, MAGIC_FOOTER, MAGIC_HEADER};

fn write_u8<W: Write>(writer: &mut W, value: u8) -> AppResult<()> {
    writer.write_all(&[value])?;
    Ok(())
}

fn write_u16<W: Write>(writer: &mut W, value: u16) -> AppResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> AppResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> AppResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32<W: Write>(writer: &mut W, value: f32) -> AppResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_len<W: Write>(writer: &mut W, len: usize) -> AppResult<()> {
    write_i32(writer, i32::try_from(len)?)
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> AppResult<()> {
    write_len(writer, value.len())?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn write_version<W: Write>(writer: &mut W, version: &[i32; 4]) -> AppResult<()> {
    for part in version {
        write_i32(writer, *part)?;
    }
    Ok(())
}

fn write_mod_info<W: Write>(writer: &mut W, info: &ModInfo) -> AppResult<()> {
    write_string(writer, &info.id)?;
    write_version(writer, &info.version)
}

fn write_component<W: Write>(writer: &mut W, component: &Component) -> AppResult<()> {
    write_u32(writer, component.address)?;
    write_u32(writer, component.parent)?;
    write_u16(writer, component.type_id)?;
    for axis in &component.position {
        write_f32(writer, *axis)?;
    }
    for axis in &component.rotation {
        write_f32(writer, *axis)?;
    }
    write_len(writer, component.inputs.len())?;
    for state_id in &component.inputs {
        write_i32(writer, *state_id)?;
    }
    write_len(writer, component.outputs.len())?;
    for state_id in &component.outputs {
        write_i32(writer, *state_id)?;
    }
    match &component.custom_data {
        None => write_i32(writer, -1)?,
        Some(data) => {
            write_len(writer, data.len())?;
            writer.write_all(data)?;
        }
    }
    Ok(())
}

fn write_peg_ref<W: Write>(writer: &mut W, peg: &PegRef) -> AppResult<()> {
    write_u8(writer, u8::from(peg.is_input))?;
    write_u32(writer, peg.component)?;
    write_i32(writer, peg.index)
}

fn write_wire<W: Write>(writer: &mut W, wire: &Wire) -> AppResult<()> {
    write_peg_ref(writer, &wire.start)?;
    write_peg_ref(writer, &wire.end)?;
    write_i32(writer, wire.state_id)?;
    write_f32(writer, wire.rotation)
}

impl SaveFile {
    /// Serialize the save to `writer` in the version-6 binary layout.
    ///
    /// Header counts are recomputed from the collection lengths, so callers
    /// can freely grow `components` and `wires` before writing.
    pub fn write<W: Write>(&self, writer: &mut W) -> AppResult<()> {
        writer.write_all(MAGIC_HEADER)?;
        write_u8(writer, self.save_version)?;
        write_version(writer, &self.game_version)?;
        write_u8(writer, self.kind().to_byte())?;

        write_len(writer, self.components.len())?;
        write_len(writer, self.wires.len())?;

        write_len(writer, self.mods.len())?;
        for info in &self.mods {
            write_mod_info(writer, info)?;
        }

        write_len(writer, self.component_types.len())?;
        for ty in &self.component_types {
            write_u16(writer, ty.numeric_id)?;
            write_string(writer, &ty.text_id)?;
        }

        for component in &self.components {
            write_component(writer, component)?;
        }
        for wire in &self.wires {
            write_wire(writer, wire)?;
        }

        match &self.circuit_states {
            CircuitStates::World(bits) => {
                write_len(writer, bits.len())?;
                writer.write_all(bits)?;
            }
            CircuitStates::Subassembly(lit) => {
                write_len(writer, lit.len())?;
                for state_id in lit {
                    write_i32(writer, *state_id)?;
                }
            }
        }

        writer.write_all(MAGIC_FOOTER)?;
        Ok(())
    }
}
