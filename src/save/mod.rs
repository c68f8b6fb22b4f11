//! In-memory model and binary codec for the game's circuit save format.
//!
//! A save file (`data.logicworld`) holds the full circuit state of a world
//! or subassembly: a table mapping component type names to numeric ids, the
//! component tree (boards, delayers, pegs, sockets, ...), the wires between
//! component pegs, and the on/off state of every circuit net.
//!
//! The binary layout is little-endian throughout, bracketed by a 16-byte
//! magic header and footer. Strings are `i32` byte-length prefixed UTF-8.
//! Only save format version 6 is supported; see [`SUPPORTED_VERSION`].
//!
//! [`SaveFile::read`] is total over arbitrary input: malformed bytes produce
//! a [`crate::error::ReelError::Format`] error, never a panic, and declared
//! counts do not drive unbounded allocations.

mod read;
mod write;

/// Magic bytes opening every save file.
pub const MAGIC_HEADER: &[u8; 16] = b"Logic World save";
/// Magic bytes closing every save file.
pub const MAGIC_FOOTER: &[u8; 16] = b"redstone sux lol";
/// The only save format version this crate reads and writes.
pub const SUPPORTED_VERSION: u8 = 6;

/// Whether a save holds a whole world or a subassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// A full world; circuit states are stored as a bit-packed vector.
    World,
    /// A subassembly; circuit states are stored as a list of lit net ids.
    Subassembly,
}

impl SaveKind {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            SaveKind::World => 1,
            SaveKind::Subassembly => 2,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(SaveKind::World),
            2 => Some(SaveKind::Subassembly),
            _ => None,
        }
    }
}

/// A mod the save depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
    /// Mod identifier, e.g. `MHG.Logic`.
    pub id: String,
    /// Four-part mod version.
    pub version: [i32; 4],
}

/// An entry in the save's component type table.
///
/// Components reference their type by `numeric_id`; the table maps those to
/// the stable text ids mods register, e.g. `MHG.Delayer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    /// Numeric id used by [`Component::type_id`].
    pub numeric_id: u16,
    /// Stable text id of the component type.
    pub text_id: String,
}

/// A placed component.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Unique component address within the save.
    pub address: u32,
    /// Address of the parent component, or 0 for top-level components.
    pub parent: u32,
    /// Numeric component type, resolved through the type table.
    pub type_id: u16,
    /// Position relative to the parent.
    pub position: [f32; 3],
    /// Orientation quaternion (x, y, z, w) relative to the parent.
    pub rotation: [f32; 4],
    /// Circuit-state id of each input peg.
    pub inputs: Vec<i32>,
    /// Circuit-state id of each output peg.
    pub outputs: Vec<i32>,
    /// Opaque per-type payload (board dimensions, delayer timing, ...).
    pub custom_data: Option<Vec<u8>>,
}

/// One end of a wire: a peg on a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PegRef {
    /// Whether the peg is an input peg (false: output peg).
    pub is_input: bool,
    /// Address of the component the peg belongs to.
    pub component: u32,
    /// Index of the peg among the component's inputs or outputs.
    pub index: i32,
}

impl PegRef {
    /// Reference to an input peg.
    pub fn input(component: u32, index: i32) -> Self {
        Self {
            is_input: true,
            component,
            index,
        }
    }

    /// Reference to an output peg.
    pub fn output(component: u32, index: i32) -> Self {
        Self {
            is_input: false,
            component,
            index,
        }
    }
}

/// A wire connecting two pegs on the same circuit net.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wire {
    /// First endpoint.
    pub start: PegRef,
    /// Second endpoint.
    pub end: PegRef,
    /// Circuit-state id of the net this wire belongs to.
    pub state_id: i32,
    /// Visual rotation of the wire around its axis.
    pub rotation: f32,
}

/// On/off state of every circuit net in the save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitStates {
    /// World saves: one bit per net id, packed little-endian within bytes.
    World(Vec<u8>),
    /// Subassembly saves: ids of the nets that are lit.
    Subassembly(Vec<i32>),
}

/// A parsed save file.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFile {
    /// Save format version; always [`SUPPORTED_VERSION`] after a read.
    pub save_version: u8,
    /// Version of the game that wrote the save.
    pub game_version: [i32; 4],
    /// Mods the save depends on.
    pub mods: Vec<ModInfo>,
    /// Component type table.
    pub component_types: Vec<ComponentType>,
    /// All placed components.
    pub components: Vec<Component>,
    /// All wires.
    pub wires: Vec<Wire>,
    /// Net states; the variant decides the save kind.
    pub circuit_states: CircuitStates,
}

impl SaveFile {
    /// An empty world save, useful as a base for generated circuits.
    pub fn empty_world(game_version: [i32; 4]) -> Self {
        Self {
            save_version: SUPPORTED_VERSION,
            game_version,
            mods: Vec::new(),
            component_types: Vec::new(),
            components: Vec::new(),
            wires: Vec::new(),
            circuit_states: CircuitStates::World(Vec::new()),
        }
    }

    /// The save kind, implied by the circuit-state representation.
    pub fn kind(&self) -> SaveKind {
        match self.circuit_states {
            CircuitStates::World(_) => SaveKind::World,
            CircuitStates::Subassembly(_) => SaveKind::Subassembly,
        }
    }

    /// Numeric id for a component type text id, if the table defines it.
    pub fn component_type_id(&self, text_id: &str) -> Option<u16> {
        self.component_types
            .iter()
            .find(|ty| ty.text_id == text_id)
            .map(|ty| ty.numeric_id)
    }

    /// Highest component address in use, or 0 for an empty save.
    pub fn max_component_address(&self) -> u32 {
        self.components
            .iter()
            .map(|comp| comp.address)
            .max()
            .unwrap_or(0)
    }

    /// Highest circuit-state id referenced by any peg, or 0 if none.
    pub fn max_state_id(&self) -> i32 {
        self.components
            .iter()
            .flat_map(|comp| comp.inputs.iter().chain(comp.outputs.iter()).copied())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_circuit_state_variant() {
        let mut save = SaveFile::empty_world([0, 91, 3, 1015]);
        assert_eq!(save.kind(), SaveKind::World);
        save.circuit_states = CircuitStates::Subassembly(vec![3]);
        assert_eq!(save.kind(), SaveKind::Subassembly);
    }

    #[test]
    fn type_table_lookup() {
        let mut save = SaveFile::empty_world([0, 91, 3, 1015]);
        save.component_types.push(ComponentType {
            numeric_id: 7,
            text_id: "MHG.Delayer".into(),
        });
        assert_eq!(save.component_type_id("MHG.Delayer"), Some(7));
        assert_eq!(save.component_type_id("MHG.Inverter"), None);
    }

    #[test]
    fn maxima_default_to_zero_on_empty_save() {
        let save = SaveFile::empty_world([0, 91, 3, 1015]);
        assert_eq!(save.max_component_address(), 0);
        assert_eq!(save.max_state_id(), 0);
    }

    #[test]
    fn maxima_scan_pegs_and_addresses() {
        let mut save = SaveFile::empty_world([0, 91, 3, 1015]);
        save.components.push(Component {
            address: 12,
            parent: 0,
            type_id: 1,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            inputs: vec![4],
            outputs: vec![9, 2],
            custom_data: None,
        });
        save.components.push(Component {
            address: 5,
            parent: 12,
            type_id: 1,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            inputs: vec![],
            outputs: vec![],
            custom_data: Some(vec![1, 2, 3]),
        });
        assert_eq!(save.max_component_address(), 12);
        assert_eq!(save.max_state_id(), 9);
    }

    #[test]
    fn save_kind_byte_mapping_is_stable() {
        assert_eq!(SaveKind::from_byte(1), Some(SaveKind::World));
        assert_eq!(SaveKind::from_byte(2), Some(SaveKind::Subassembly));
        assert_eq!(SaveKind::from_byte(0), None);
        assert_eq!(SaveKind::World.to_byte(), 1);
        assert_eq!(SaveKind::Subassembly.to_byte(), 2);
    }
}
