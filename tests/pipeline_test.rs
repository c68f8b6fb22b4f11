//! End-to-end pipeline test: stage a world from a template, inject a frame
//! sequence and verify the written save.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use image::{GrayImage, Luma};

use logicreel::config::{EncodeSettings, StagingSettings};
use logicreel::encode::{Encoder, BOARD_TYPE, DELAYER_TYPE, PEG_TYPE, SOCKET_TYPE};
use logicreel::frames::FrameSequence;
use logicreel::save::{CircuitStates, ComponentType, SaveFile};
use logicreel::staging::{WorldMetadata, WorldStager, DATA_FILE};

fn template_save() -> SaveFile {
    let mut save = SaveFile::empty_world([0, 91, 3, 1015]);
    for (numeric_id, text_id) in [
        (1u16, BOARD_TYPE),
        (2, DELAYER_TYPE),
        (3, PEG_TYPE),
        (4, SOCKET_TYPE),
    ] {
        save.component_types.push(ComponentType {
            numeric_id,
            text_id: text_id.to_string(),
        });
    }
    save
}

fn write_template(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let mut writer = BufWriter::new(File::create(dir.join(DATA_FILE)).unwrap());
    template_save().write(&mut writer).unwrap();
    writer.flush().unwrap();
}

fn write_frame(dir: &Path, index: usize, lit: &[(u32, u32)]) {
    let mut img = GrayImage::from_pixel(3, 2, Luma([0u8]));
    for &(x, y) in lit {
        img.put_pixel(x, y, Luma([255u8]));
    }
    img.save(dir.join(format!("frame_{index:05}.png"))).unwrap();
}

#[test]
fn staged_world_plays_back_the_frame_sequence() {
    let root = tempfile::tempdir().unwrap();
    let template = root.path().join("template");
    let saves = root.path().join("saves");
    let frames_dir = root.path().join("frames");
    write_template(&template);

    // 3x2 video, three frames, four pixel toggles in total.
    std::fs::create_dir_all(&frames_dir).unwrap();
    write_frame(&frames_dir, 1, &[(0, 0), (2, 1)]);
    write_frame(&frames_dir, 2, &[(0, 0)]);
    write_frame(&frames_dir, 3, &[(0, 0), (1, 0)]);

    let stager = WorldStager::new(&StagingSettings {
        saves_dir: Some(saves.clone()),
        template_dir: template,
        world_name: "ReelTest".to_string(),
    });
    let data_path = stager.stage(&WorldMetadata::new("0.91.3")).unwrap();

    let frames = FrameSequence::scan(&frames_dir, 127).unwrap();
    let mut save = {
        let mut reader = BufReader::new(File::open(&data_path).unwrap());
        SaveFile::read(&mut reader).unwrap()
    };

    let encoder = Encoder::new(&EncodeSettings::default());
    let report = encoder.inject(&mut save, &frames).unwrap();

    {
        let mut writer = BufWriter::new(File::create(&data_path).unwrap());
        save.write(&mut writer).unwrap();
        writer.flush().unwrap();
    }

    // depth = 2*3 + 1 = 7: per row 7 timing delayers; 2 rows of 3 pixels.
    assert_eq!(report.frames, 3);
    assert_eq!(report.components_added, 2 + 14 + 6 + 4 + 4);
    assert_eq!(report.wires_added, 12 + 12);
    assert_eq!(report.states_added, 16 + 6);

    // The written world must be a valid, self-consistent save.
    let reread = {
        let mut reader = BufReader::new(File::open(&data_path).unwrap());
        SaveFile::read(&mut reader).unwrap()
    };
    assert_eq!(reread, save);

    let addresses: HashSet<u32> = reread.components.iter().map(|c| c.address).collect();
    assert_eq!(
        addresses.len(),
        reread.components.len(),
        "component addresses must be unique"
    );
    for wire in &reread.wires {
        assert!(addresses.contains(&wire.start.component));
        assert!(addresses.contains(&wire.end.component));
    }

    // Boards hold everything; parents must resolve.
    for component in &reread.components {
        assert!(component.parent == 0 || addresses.contains(&component.parent));
    }

    let CircuitStates::World(bits) = &reread.circuit_states else {
        panic!("expected a world save");
    };
    assert_eq!(bits.len(), report.states_added / 8 + 1);
}

#[test]
fn re_encoding_into_a_populated_save_keeps_existing_circuitry() {
    let root = tempfile::tempdir().unwrap();
    let frames_dir = root.path().join("frames");
    std::fs::create_dir_all(&frames_dir).unwrap();
    write_frame(&frames_dir, 1, &[(1, 1)]);

    let mut save = template_save();
    // Pretend the template ships a hand-built circuit.
    save.components.push(logicreel::save::Component {
        address: 500,
        parent: 0,
        type_id: 2,
        position: [1.0, 2.0, 3.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        inputs: vec![70],
        outputs: vec![71],
        custom_data: Some(vec![0, 0, 0, 0, 4, 0, 0, 0]),
    });
    let existing = save.components.clone();

    let frames = FrameSequence::scan(&frames_dir, 127).unwrap();
    Encoder::new(&EncodeSettings::default())
        .inject(&mut save, &frames)
        .unwrap();

    // The original component is untouched and nothing collides with it.
    assert_eq!(save.components[0], existing[0]);
    assert!(save.components.iter().skip(1).all(|c| c.address > 500));

    // New nets continue past the existing maximum state id.
    let min_new_state = save
        .components
        .iter()
        .skip(1)
        .flat_map(|c| c.inputs.iter().chain(c.outputs.iter()))
        .copied()
        .min()
        .unwrap();
    assert!(min_new_state > 71, "generated nets must not reuse existing ids");
}
