//! Frame-to-circuit injection.
//!
//! The encoder turns a frame sequence into components and wires inside an
//! existing save. The generated machine plays the video on a W×H screen of
//! output sockets:
//!
//! - Each pixel row lives on its own circuit board, with a **timing chain**
//!   of delayers running along it. A single pulse fed into the chain sweeps
//!   forward one delayer per half-frame (signal rise and fall), so chain
//!   position encodes playback time.
//! - Each pixel has a dedicated **pixel net** ending in its output socket.
//!   Frames are delta-encoded: only when a pixel's 1-bit value changes does
//!   the encoder drop a 1-tick delayer that couples the timing chain into
//!   that pixel's net, toggling it as the pulse passes.
//! - Long videos would otherwise grow each pixel net into one enormous
//!   cluster, which tanks the simulation rate. Every `chunk_interval` frames
//!   the encoder breaks every pixel net with a 1-tick delayer and starts a
//!   fresh net. The timing chain gives the extra tick back by shortening the
//!   matching timing delayer by one.

mod alloc;
mod layout;

pub use alloc::IdAllocator;

use crate::config::EncodeSettings;
use crate::error::{AppResult, ReelError};
use crate::frames::{BitFrame, FrameSequence};
use crate::save::{CircuitStates, Component, PegRef, SaveFile, Wire};

/// Component type id of the row boards.
pub const BOARD_TYPE: &str = "MHG.CircuitBoard";
/// Component type id of the delayers used for timing, toggling and chunking.
pub const DELAYER_TYPE: &str = "MHG.Delayer";
/// Component type id of the pegs anchoring pixel nets.
pub const PEG_TYPE: &str = "MHG.Peg";
/// Component type id of the per-pixel output sockets.
pub const SOCKET_TYPE: &str = "MHG.ChubbySocket";

/// What an injection added to the save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    /// Frames encoded.
    pub frames: usize,
    /// Components appended to the save.
    pub components_added: usize,
    /// Wires appended to the save.
    pub wires_added: usize,
    /// Circuit nets created.
    pub states_added: usize,
}

/// Numeric ids of the component types the encoder instantiates.
struct ComponentIds {
    board: u16,
    delayer: u16,
    peg: u16,
    socket: u16,
}

/// Injects a frame sequence into a save file.
pub struct Encoder {
    frame_ticks: u32,
    chunk_interval: usize,
    board_color: [u8; 3],
}

impl Encoder {
    /// Create an encoder from the encode settings.
    pub fn new(settings: &EncodeSettings) -> Self {
        Self {
            frame_ticks: settings.frame_ticks,
            chunk_interval: settings.chunk_interval,
            board_color: settings.board_color,
        }
    }

    fn resolve_types(&self, save: &SaveFile) -> AppResult<ComponentIds> {
        let lookup = |text_id: &str| {
            save.component_type_id(text_id)
                .ok_or_else(|| ReelError::UnknownComponentType(text_id.to_string()))
        };
        Ok(ComponentIds {
            board: lookup(BOARD_TYPE)?,
            delayer: lookup(DELAYER_TYPE)?,
            peg: lookup(PEG_TYPE)?,
            socket: lookup(SOCKET_TYPE)?,
        })
    }

    /// Build the video player for `frames` inside `save`.
    ///
    /// Frames are loaded one at a time; memory use is bounded by two decoded
    /// frames regardless of video length.
    pub fn inject(&self, save: &mut SaveFile, frames: &FrameSequence) -> AppResult<EncodeReport> {
        let width = frames.width() as usize;
        let height = frames.height() as usize;
        // Two delayers per frame (signal rise + fall), one lead-in step.
        let depth = frames.len() * 2 + 1;

        let types = self.resolve_types(save)?;
        let mut alloc = IdAllocator::seeded_from(save);
        let components_before = save.components.len();
        let wires_before = save.wires.len();
        let states_before = alloc.last_state();

        tracing::info!(
            frames = frames.len(),
            width,
            height,
            depth,
            "Injecting video circuit"
        );

        // One board per pixel row.
        let board_width = 1 + 3 * i32::try_from(width)?;
        let board_depth = 2 * i32::try_from(depth)?;
        let row_boards = alloc.addresses(height);
        for (row, &address) in row_boards.iter().enumerate() {
            save.components.push(Component {
                address,
                parent: 0,
                type_id: types.board,
                position: layout::board_position(row),
                rotation: layout::IDENTITY,
                inputs: vec![],
                outputs: vec![],
                custom_data: Some(layout::board_custom_data(
                    self.board_color,
                    board_width,
                    board_depth,
                )),
            });
        }

        // Per-row timing chains.
        let chunk_steps = self.chunk_interval * 2;
        let mut timing_states: Vec<Vec<i32>> = Vec::with_capacity(height);
        let mut timing_delayers: Vec<Vec<u32>> = Vec::with_capacity(height);
        for row in 0..height {
            let states = alloc.states(depth + 1);
            let delayers = alloc.addresses(depth);
            for step in 0..depth {
                // Timing delayers aligned with chunking delayers run one tick
                // short to compensate for the chunk delay on the pixel nets.
                let compensation = u32::from((step + 1) % chunk_steps == 0);
                save.components.push(Component {
                    address: delayers[step],
                    parent: row_boards[row],
                    type_id: types.delayer,
                    position: layout::timing_delayer_position(step),
                    rotation: layout::IDENTITY,
                    inputs: vec![states[step]],
                    outputs: vec![states[step + 1]],
                    custom_data: Some(layout::delayer_custom_data(
                        0,
                        self.frame_ticks - compensation,
                    )),
                });
            }
            for step in 1..depth {
                save.wires.push(Wire {
                    start: PegRef::output(delayers[step - 1], 0),
                    end: PegRef::input(delayers[step], 0),
                    state_id: states[step],
                    rotation: 0.0,
                });
            }
            timing_states.push(states);
            timing_delayers.push(delayers);
        }

        // Pixel nets and their output sockets. `column_tails` tracks the
        // newest attachment point of every pixel net.
        let mut pixel_states: Vec<Vec<i32>> =
            (0..height).map(|_| alloc.states(width)).collect();
        let mut column_tails: Vec<Vec<u32>> = Vec::with_capacity(height);
        for row in 0..height {
            let sockets = alloc.addresses(width);
            for (column, &address) in sockets.iter().enumerate() {
                save.components.push(Component {
                    address,
                    parent: row_boards[row],
                    type_id: types.socket,
                    position: layout::socket_position(column),
                    rotation: layout::ABOUT_FACE,
                    inputs: vec![pixel_states[row][column]],
                    outputs: vec![],
                    custom_data: None,
                });
            }
            column_tails.push(sockets);
        }

        let mut previous = BitFrame::blank(frames.width(), frames.height());
        for (frame_index, path) in frames.paths().iter().enumerate() {
            let current = frames.load(path)?;
            let step = (frame_index + 1) * 2;
            let at_chunk_boundary = (frame_index + 1) % self.chunk_interval == 0;

            if at_chunk_boundary {
                tracing::debug!(frame = frame_index, "Breaking pixel nets");
                for row in 0..height {
                    for column in 0..width {
                        let chunk_delayer = alloc.address();
                        let fresh_state = alloc.state();
                        save.components.push(Component {
                            address: chunk_delayer,
                            parent: row_boards[row],
                            type_id: types.delayer,
                            position: layout::column_peg_position(column, step),
                            rotation: layout::ABOUT_FACE,
                            inputs: vec![fresh_state],
                            outputs: vec![pixel_states[row][column]],
                            custom_data: Some(layout::delayer_custom_data(0, 1)),
                        });
                        save.wires.push(Wire {
                            start: PegRef::output(chunk_delayer, 0),
                            end: PegRef::input(column_tails[row][column], 0),
                            state_id: pixel_states[row][column],
                            rotation: 0.0,
                        });
                        column_tails[row][column] = chunk_delayer;
                        pixel_states[row][column] = fresh_state;
                    }
                }
            }

            for row in 0..height {
                // Toggle delayers of one row and step hang off each other, so
                // the branch point walks along as pixels are added.
                let mut branch_tail = timing_delayers[row][step];
                for column in 0..width {
                    let (x, y) = (column as u32, row as u32);
                    if current.get(x, y) == previous.get(x, y) {
                        continue;
                    }

                    let pixel_delayer = alloc.address();
                    save.components.push(Component {
                        address: pixel_delayer,
                        parent: row_boards[row],
                        type_id: types.delayer,
                        position: layout::pixel_delayer_position(column, step),
                        rotation: layout::ABOUT_FACE,
                        inputs: vec![timing_states[row][step]],
                        outputs: vec![pixel_states[row][column]],
                        custom_data: Some(layout::delayer_custom_data(0, 1)),
                    });

                    // Chunking delayers replace the peg that would usually
                    // anchor the column at this step.
                    let column_peg = if at_chunk_boundary {
                        column_tails[row][column]
                    } else {
                        let peg = alloc.address();
                        save.components.push(Component {
                            address: peg,
                            parent: row_boards[row],
                            type_id: types.peg,
                            position: layout::column_peg_position(column, step),
                            rotation: layout::IDENTITY,
                            inputs: vec![pixel_states[row][column]],
                            outputs: vec![],
                            custom_data: None,
                        });
                        peg
                    };

                    save.wires.push(Wire {
                        start: PegRef::input(branch_tail, 0),
                        end: PegRef::input(pixel_delayer, 0),
                        state_id: timing_states[row][step],
                        rotation: 0.0,
                    });
                    save.wires.push(Wire {
                        start: PegRef::output(pixel_delayer, 0),
                        end: PegRef::input(column_peg, 0),
                        state_id: pixel_states[row][column],
                        rotation: 0.0,
                    });
                    if !at_chunk_boundary {
                        save.wires.push(Wire {
                            start: PegRef::input(column_peg, 0),
                            end: PegRef::input(column_tails[row][column], 0),
                            state_id: pixel_states[row][column],
                            rotation: 0.0,
                        });
                    }

                    branch_tail = pixel_delayer;
                    column_tails[row][column] = column_peg;
                }
            }

            previous = current;
        }

        // Every net created above starts dark; grow the world bit vector to
        // cover the new ids.
        if let CircuitStates::World(bits) = &mut save.circuit_states {
            let last_state = usize::try_from(alloc.last_state())?;
            bits.resize(last_state / 8 + 1, 0);
        }

        let report = EncodeReport {
            frames: frames.len(),
            components_added: save.components.len() - components_before,
            wires_added: save.wires.len() - wires_before,
            states_added: usize::try_from(alloc.last_state() - states_before)?,
        };
        tracing::info!(
            components = report.components_added,
            wires = report.wires_added,
            states = report.states_added,
            "Injection complete"
        );
        Ok(report)
    }
}
