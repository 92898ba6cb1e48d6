//! Named unknown/residual entries flattened into one solver vector.

use crate::error::{ConfigError, MissionError, MissionResult};
use nalgebra::DVector;
use std::collections::BTreeMap;

/// Length of an entry relative to the control-point count `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryLength {
    /// One value per control point.
    PerPoint,
    /// Points 1..n (the first point is fixed by the boundary condition).
    Interior,
    Scalar,
}

impl EntryLength {
    pub fn resolve(self, n: usize) -> usize {
        match self {
            EntryLength::PerPoint => n,
            EntryLength::Interior => n.saturating_sub(1),
            EntryLength::Scalar => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnknownSpec {
    pub name: String,
    /// Residual this unknown is solved against.
    pub residual: String,
    pub length: EntryLength,
    /// Initial guess; a single value is broadcast.
    pub initial: Vec<f64>,
}

impl UnknownSpec {
    pub fn uniform(
        name: impl Into<String>,
        residual: impl Into<String>,
        length: EntryLength,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            residual: residual.into(),
            length,
            initial: vec![value],
        }
    }

    pub fn with_values(
        name: impl Into<String>,
        residual: impl Into<String>,
        length: EntryLength,
        values: Vec<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            residual: residual.into(),
            length,
            initial: values,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResidualSpec {
    pub name: String,
    pub length: EntryLength,
}

impl ResidualSpec {
    pub fn new(name: impl Into<String>, length: EntryLength) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    name: String,
    residual: String,
    offset: usize,
    len: usize,
}

/// Validated pairing of unknowns to residuals, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemLayout {
    entries: Vec<Entry>,
    initial: DVector<f64>,
}

impl SystemLayout {
    pub fn pair(
        unknowns: &[UnknownSpec],
        residuals: &[ResidualSpec],
        n: usize,
    ) -> Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(unknowns.len());
        let mut initial = Vec::new();
        let mut offset = 0;

        for u in unknowns {
            let Some(r) = residuals.iter().find(|r| r.name == u.residual) else {
                return Err(ConfigError::UnpairedUnknown {
                    unknown: u.name.clone(),
                    residual: u.residual.clone(),
                });
            };
            let len = u.length.resolve(n);
            let expected = r.length.resolve(n);
            if len != expected {
                return Err(ConfigError::LengthMismatch {
                    unknown: u.name.clone(),
                    expected,
                    found: len,
                });
            }
            match u.initial.len() {
                1 => initial.extend(std::iter::repeat_n(u.initial[0], len)),
                k if k == len => initial.extend_from_slice(&u.initial),
                k => {
                    return Err(ConfigError::LengthMismatch {
                        unknown: u.name.clone(),
                        expected: len,
                        found: k,
                    });
                }
            }
            entries.push(Entry {
                name: u.name.clone(),
                residual: u.residual.clone(),
                offset,
                len,
            });
            offset += len;
        }

        for r in residuals {
            let claimed = unknowns.iter().filter(|u| u.residual == r.name).count();
            if claimed != 1 {
                return Err(ConfigError::UnpairedResidual {
                    residual: r.name.clone(),
                });
            }
        }

        Ok(Self {
            entries,
            initial: DVector::from_vec(initial),
        })
    }

    pub fn size(&self) -> usize {
        self.initial.len()
    }

    pub fn initial(&self) -> DVector<f64> {
        self.initial.clone()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Slice of `x` belonging to unknown `name`.
    pub fn unknown<'x>(&self, x: &'x DVector<f64>, name: &str) -> MissionResult<&'x [f64]> {
        let e = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or(MissionError::InvalidArg {
                what: "unknown not declared",
            })?;
        x.as_slice()
            .get(e.offset..e.offset + e.len)
            .ok_or(MissionError::InvalidArg {
                what: "solver vector shorter than layout",
            })
    }

    /// Flatten named residuals in unknown order.
    pub fn assemble(&self, residuals: &BTreeMap<String, Vec<f64>>) -> MissionResult<DVector<f64>> {
        let mut out = Vec::with_capacity(self.size());
        for e in &self.entries {
            let values = residuals.get(&e.residual).ok_or(MissionError::InvalidArg {
                what: "residual not computed",
            })?;
            if values.len() != e.len {
                return Err(ConfigError::LengthMismatch {
                    unknown: e.name.clone(),
                    expected: e.len,
                    found: values.len(),
                }
                .into());
            }
            out.extend_from_slice(values);
        }
        Ok(DVector::from_vec(out))
    }
}
