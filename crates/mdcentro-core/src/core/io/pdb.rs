use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::topology::Topology;
use crate::core::models::trajectory::{Frame, Trajectory, TrajectoryError};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const MIN_COORDINATE_LINE_LEN: usize = 54;
const MAX_SERIAL: usize = 100_000;
const RESIDUE_NUMBER_RANGE: std::ops::RangeInclusive<isize> = -999..=9999;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Invalid trajectory: {0}")]
    Trajectory(#[from] TrajectoryError),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Accumulates models while a file is being read.
///
/// The first model defines the topology; every later model must list the same
/// atoms in the same order.
#[derive(Default)]
struct ModelCollector {
    topology: Option<Topology>,
    pending_atoms: Vec<Atom>,
    pending_coords: Frame,
    frames: Vec<Frame>,
}

impl ModelCollector {
    fn push_atom(&mut self, atom: Atom, position: Point3<f64>) -> Result<(), PdbError> {
        match &self.topology {
            None => self.pending_atoms.push(atom),
            Some(topology) => {
                let index = self.pending_coords.len();
                let expected = topology.atom(index).ok_or_else(|| {
                    PdbError::Inconsistency(format!(
                        "Model {} has more atoms than the first model ({})",
                        self.frames.len() + 1,
                        topology.len()
                    ))
                })?;
                if expected.name != atom.name {
                    return Err(PdbError::Inconsistency(format!(
                        "Model {} atom {} is '{}' but the first model has '{}'",
                        self.frames.len() + 1,
                        index + 1,
                        atom.name,
                        expected.name
                    )));
                }
            }
        }
        self.pending_coords.push(position);
        Ok(())
    }

    fn finish_model(&mut self) -> Result<(), PdbError> {
        if self.pending_coords.is_empty() {
            return Ok(());
        }
        let coords = std::mem::take(&mut self.pending_coords);
        match &self.topology {
            None => {
                self.topology = Some(Topology::new(std::mem::take(&mut self.pending_atoms)));
            }
            Some(topology) if topology.len() != coords.len() => {
                return Err(PdbError::Inconsistency(format!(
                    "Model {} has {} atoms but the first model has {}",
                    self.frames.len() + 1,
                    coords.len(),
                    topology.len()
                )));
            }
            Some(_) => {}
        }
        self.frames.push(coords);
        Ok(())
    }

    fn into_trajectory(mut self) -> Result<Trajectory, PdbError> {
        self.finish_model()?;
        match self.topology {
            Some(topology) => Ok(Trajectory::new(topology, self.frames)?),
            None => Ok(Trajectory::default()),
        }
    }
}

/// Protein Data Bank format.
///
/// Reading understands `MODEL`/`ENDMDL` blocks, so a multi-model file is a
/// trajectory; a file without `MODEL` records is a single frame and an empty
/// file is a trajectory with no frames.
pub struct PdbFile;

impl PdbFile {
    fn parse_atom_line(
        line: &str,
        line_num: usize,
        fallback_serial: usize,
    ) -> Result<(Atom, Point3<f64>), PdbError> {
        if line.len() < MIN_COORDINATE_LINE_LEN {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort,
            });
        }

        let name = slice_and_trim(line, 12, 16);
        if name.is_empty() {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::MissingRequiredField {
                    columns: "13-16".into(),
                },
            });
        }
        // Large systems overflow the serial field (hybrid-36 or asterisks).
        let serial = slice_and_trim(line, 6, 11)
            .parse()
            .unwrap_or(fallback_serial);
        let residue_name = slice_and_trim(line, 17, 20);
        let chain_id = slice_and_trim(line, 21, 22).chars().next().unwrap_or(' ');
        let res_seq_str = slice_and_trim(line, 22, 26);
        let residue_number: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "23-26".into(),
                value: res_seq_str.into(),
            },
        })?;

        let x = parse_float(line, line_num, 30, 38)?;
        let y = parse_float(line, line_num, 38, 46)?;
        let z = parse_float(line, line_num, 46, 54)?;
        let element = slice_and_trim(line, 76, 78);

        let atom = Atom::new(serial, name, residue_name, residue_number, chain_id)
            .with_element(element);
        Ok((atom, Point3::new(x, y, z)))
    }

    /// Residue numbers that do not fit the four-column field wrap modulo 10000.
    fn wrap_residue_number(number: isize) -> isize {
        if RESIDUE_NUMBER_RANGE.contains(&number) {
            number
        } else {
            number.rem_euclid(10_000)
        }
    }

    fn format_atom_name(name: &str) -> String {
        if name.len() >= 4 {
            name.to_string()
        } else {
            format!(" {}", name)
        }
    }
}

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Trajectory, Self::Error> {
        let mut collector = ModelCollector::default();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" | "HETATM" => {
                    let fallback_serial = collector.pending_coords.len() + 1;
                    let (atom, position) = Self::parse_atom_line(&line, line_num, fallback_serial)?;
                    collector.push_atom(atom, position)?;
                }
                "MODEL" | "ENDMDL" | "END" => collector.finish_model()?,
                _ => {}
            }
        }

        collector.into_trajectory()
    }

    fn write_to(trajectory: &Trajectory, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "REMARK   1 GENERATED BY MDCENTRO")?;
        let multi_model = trajectory.n_frames() > 1;

        for (model_idx, frame) in trajectory.frames().iter().enumerate() {
            if multi_model {
                writeln!(writer, "MODEL     {:>4}", model_idx + 1)?;
            }
            for (atom, position) in trajectory.topology().atoms().iter().zip(frame.iter()) {
                let record_type = if atom.role.is_protein() {
                    "ATOM"
                } else {
                    "HETATM"
                };
                writeln!(
                    writer,
                    "{:<6}{:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                    record_type,
                    atom.serial % MAX_SERIAL,
                    Self::format_atom_name(&atom.name),
                    atom.residue_name,
                    atom.chain_id,
                    Self::wrap_residue_number(atom.residue_number),
                    position.x,
                    position.y,
                    position.z,
                    1.0,
                    0.0,
                    atom.element
                )?;
            }
            if multi_model {
                writeln!(writer, "ENDMDL")?;
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }
}
