mod common;

use common::*;
use fluxscribe::{
    device::{regs, AcqControl},
    track_schema::system34::encode_track_cells,
};
use fluxscribe::prelude::*;

#[test]
fn mfm_track_program_structure() {
    init();
    let spec = System34FormatSpec::mfm(DataRate::Rate250Kbps);
    let sectors = patterned_sectors(DiskCh::new(0, 0), 9, 2);

    let program = format_track(TrackEncoding::Mfm, &spec, &sectors).unwrap();
    assert!(program.len() <= WRITER_RAM_BYTES);

    // DC-erase priming: index wait, gate assert, two more index waits.
    let commands = decode_program(program.buffer());
    assert_eq!(commands[0], Command::WaitIndex(1));
    assert_eq!(commands[1], Command::WrGate(true));
    assert_eq!(commands[2], Command::WaitIndex(1));
    assert_eq!(commands[3], Command::WaitIndex(1));

    // The program releases the gate and stops.
    assert_eq!(commands[commands.len() - 2], Command::WrGate(false));
    assert_eq!(*commands.last().unwrap(), Command::Stop);

    // Every set bit cell becomes exactly one transition.
    let cells = encode_track_cells(TrackEncoding::Mfm, &spec, &sectors);
    let set_cells = (0..cells.len()).filter(|&i| cells[i]).count();
    let transitions = commands.iter().filter(|c| matches!(c, Command::Transition)).count();
    assert_eq!(transitions, set_cells);

    // The clock counter agrees with an independent decode of the buffer.
    assert_eq!(program.time(), static_clocks(&commands));

    // A 250Kbps track is written in a bit under one 200ms revolution.
    let millis = program.time() as f64 / REFERENCE_CLOCK_HZ as f64 * 1000.0;
    assert!((190.0..200.0).contains(&millis), "write time {millis:.2}ms");
}

#[test]
fn mfm_track_transitions_are_half_cell_multiples() {
    init();
    let spec = System34FormatSpec::mfm(DataRate::Rate250Kbps);
    let sectors = patterned_sectors(DiskCh::new(4, 1), 9, 2);

    let program = format_track(TrackEncoding::Mfm, &spec, &sectors).unwrap();
    let delays = transition_delays(&decode_program(program.buffer()));

    let half_cell = spec.cell_clocks / 2;
    for delay in delays {
        // Each delay is a whole number of half-cells, possibly precompensated.
        let shifted = delay % half_cell == spec.precomp || delay % half_cell == half_cell - spec.precomp;
        assert!(delay % half_cell == 0 || shifted, "unexpected delay {delay}");
    }
}

#[test]
fn deleted_mark_changes_the_data_field() {
    init();
    let spec = System34FormatSpec::mfm(DataRate::Rate250Kbps);
    let mut sectors = patterned_sectors(DiskCh::new(0, 0), 1, 2);

    let normal = encode_track_cells(TrackEncoding::Mfm, &spec, &sectors);
    sectors[0].mark = DataMark::Deleted;
    let deleted = encode_track_cells(TrackEncoding::Mfm, &spec, &sectors);

    assert_eq!(normal.len(), deleted.len());
    assert!((0..normal.len()).any(|i| normal[i] != deleted[i]));
}

#[test]
fn fm_track_program_structure() {
    init();
    let spec = System34FormatSpec::fm(DataRate::Rate250Kbps);
    let sectors = patterned_sectors(DiskCh::new(0, 0), 26, 1);

    let program = format_track(TrackEncoding::Fm, &spec, &sectors).unwrap();
    let commands = decode_program(program.buffer());
    assert_eq!(*commands.last().unwrap(), Command::Stop);

    // FM spaces transitions by whole half-cells; no precompensation applies.
    let half_cell = spec.cell_clocks / 2;
    for delay in transition_delays(&commands) {
        assert_eq!(delay % half_cell, 0, "unexpected delay {delay}");
    }
}

#[test]
fn oversized_track_is_rejected() {
    init();
    let spec = System34FormatSpec::mfm(DataRate::Rate250Kbps);
    let sectors = patterned_sectors(DiskCh::new(0, 0), 60, 5);

    match format_track(TrackEncoding::Mfm, &spec, &sectors) {
        Err(FluxWriteError::TrackTooLong(len)) => assert!(len > WRITER_RAM_BYTES),
        Err(e) => panic!("expected TrackTooLong, got {e:?}"),
        Ok(_) => panic!("expected TrackTooLong, got a program"),
    }
}

#[derive(Default)]
struct MockHost {
    ram: Vec<u8>,
    ram_addr: u32,
    pokes: Vec<(u8, u8)>,
}

impl WriterHost for MockHost {
    fn load_default_microcode(&mut self) -> Result<(), FluxWriteError> {
        Ok(())
    }
    fn ram_addr_set(&mut self, addr: u32) -> Result<(), FluxWriteError> {
        self.ram_addr = addr;
        Ok(())
    }
    fn ram_write(&mut self, data: &[u8]) -> Result<(), FluxWriteError> {
        let addr = self.ram_addr as usize;
        if self.ram.len() < addr + data.len() {
            self.ram.resize(addr + data.len(), 0);
        }
        self.ram[addr..addr + data.len()].copy_from_slice(data);
        self.ram_addr += data.len() as u32;
        Ok(())
    }
    fn reg_poke(&mut self, reg: u8, value: u8) -> Result<(), FluxWriteError> {
        self.pokes.push((reg, value));
        Ok(())
    }
    fn reg_peek(&mut self, _reg: u8) -> Result<u8, FluxWriteError> {
        Ok(0)
    }
    fn status(&mut self) -> Result<u32, FluxWriteError> {
        Ok(0)
    }
    fn index_frequency(&mut self) -> Result<f64, FluxWriteError> {
        Ok(300.0)
    }
    fn seek_set_rate(&mut self, _step_us: u32) -> Result<(), FluxWriteError> {
        Ok(())
    }
    fn seek_recalibrate(&mut self, _max_tracks: u32) -> Result<(), FluxWriteError> {
        Ok(())
    }
}

#[test]
fn upload_places_program_at_ram_origin() {
    init();
    let spec = System34FormatSpec::mfm(DataRate::Rate250Kbps);
    let sectors = patterned_sectors(DiskCh::new(0, 0), 9, 2);
    let program = format_track(TrackEncoding::Mfm, &spec, &sectors).unwrap();

    let mut host = MockHost::default();
    upload_track(&mut host, &program).unwrap();

    assert_eq!(&host.ram, program.buffer());
    // The upload leaves the RAM pointer rewound for the interpreter.
    assert_eq!(host.ram_addr, 0);
    // An abort is issued before any write can be started.
    assert!(host.pokes.contains(&(regs::ACQCON, AcqControl::ABORT.bits())));

    start_write(&mut host).unwrap();
    assert_eq!(*host.pokes.last().unwrap(), (regs::ACQCON, AcqControl::WRITE.bits()));
}
