//! Canonicalization: grouping block instances into unique modules.
//!
//! Each instance is first compared against existing representatives for an
//! exact structural match (a mirror). Failing that, and if enabled, against
//! representatives of the same shape for a rotation. An instance matching
//! nothing becomes a new representative. Candidates are bucketed by the
//! XXH3-128 hash of their `bincode` encoding; a bucket hit is always
//! confirmed by a full comparison.

use crate::error::RrgError;
use crate::ids::ModuleId;
use crate::signature::{Rotation, RotationSearch, Signature};
use loom_common::{ContentHash, Coord};
use loom_config::BuildOptions;
use loom_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Location};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The rotation search gave up on an instance.
pub const W_ROTATION_BUDGET: DiagnosticCode = DiagnosticCode::new(Category::Warning, 302);
/// Per-structure canonicalization summary.
pub const N_CANON_SUMMARY: DiagnosticCode = DiagnosticCode::new(Category::Note, 401);

/// How an instance relates to its module's representative.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Equivalence {
    /// The instance is the representative.
    Representative,
    /// Structurally identical to the representative at `of`.
    Mirror {
        /// Representative coordinate.
        of: Coord,
    },
    /// Identical to the representative at `of` after `rotation`.
    Rotatable {
        /// Representative coordinate.
        of: Coord,
        /// Maps the representative onto this instance.
        rotation: Rotation,
    },
}

impl Equivalence {
    /// Coordinate of the representative, or `None` for a representative.
    pub fn of(&self) -> Option<Coord> {
        match self {
            Equivalence::Representative => None,
            Equivalence::Mirror { of } | Equivalence::Rotatable { of, .. } => Some(*of),
        }
    }
}

/// Module membership of one instance.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Assignment {
    /// The unique module.
    pub module: ModuleId,
    /// Relation to the module's representative.
    pub equivalence: Equivalence,
}

/// Unique modules of one structure kind across a device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleTable {
    entries: BTreeMap<Coord, Assignment>,
    representatives: Vec<Coord>,
}

impl ModuleTable {
    /// Assignment of the instance at `c`.
    pub fn assignment(&self, c: Coord) -> Option<&Assignment> {
        self.entries.get(&c)
    }

    /// Module of the instance at `c`.
    pub fn module_of(&self, c: Coord) -> Option<ModuleId> {
        self.entries.get(&c).map(|a| a.module)
    }

    /// Representative instance of module `m`.
    pub fn representative(&self, m: ModuleId) -> Option<Coord> {
        self.representatives.get(m.index()).copied()
    }

    /// Representative of the module containing `c`.
    pub fn representative_of(&self, c: Coord) -> Option<Coord> {
        self.representative(self.module_of(c)?)
    }

    /// Number of unique modules.
    pub fn num_modules(&self) -> usize {
        self.representatives.len()
    }

    /// Number of classified instances.
    pub fn num_instances(&self) -> usize {
        self.entries.len()
    }

    /// Instances in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Assignment)> {
        self.entries.iter().map(|(&c, a)| (c, a))
    }

    /// Instances of module `m`, in coordinate order.
    pub fn members(&self, m: ModuleId) -> impl Iterator<Item = Coord> + '_ {
        self.entries
            .iter()
            .filter(move |(_, a)| a.module == m)
            .map(|(&c, _)| c)
    }

    fn add_representative(&mut self, c: Coord) -> ModuleId {
        let module = ModuleId::from_raw(self.representatives.len() as u32);
        self.representatives.push(c);
        self.entries.insert(
            c,
            Assignment {
                module,
                equivalence: Equivalence::Representative,
            },
        );
        module
    }
}

fn content_hash<T: Serialize>(value: &T) -> Result<ContentHash, RrgError> {
    ContentHash::of(value).map_err(|e| RrgError::Encoding { reason: e.to_string() })
}

fn hashes<S: Signature>(sig: &S) -> Result<(ContentHash, ContentHash), RrgError> {
    Ok((content_hash(sig)?, content_hash(&sig.shape())?))
}

fn module_of_representative(
    table: &ModuleTable,
    structure: &'static str,
    coord: Coord,
    of: Coord,
) -> Result<ModuleId, RrgError> {
    table.module_of(of).ok_or_else(|| RrgError::InconsistentBlock {
        structure,
        coord,
        reason: format!("matched representative {of} has no module"),
    })
}

/// Classifies `instances` of one structure kind into unique modules.
///
/// Instances are visited in slice order, so the first instance of each class
/// becomes its representative. With `canonicalize` off every instance is its
/// own module.
pub fn classify<S: Signature>(
    structure: &'static str,
    instances: &[(Coord, S)],
    options: &BuildOptions,
    sink: &DiagnosticSink,
) -> Result<ModuleTable, RrgError> {
    let mut table = ModuleTable::default();
    if !options.canonicalize {
        for (c, _) in instances {
            table.add_representative(*c);
        }
        return Ok(table);
    }

    let keys: Vec<(ContentHash, ContentHash)> = if options.parallel {
        instances
            .par_iter()
            .map(|(_, sig)| hashes(sig))
            .collect::<Result<_, _>>()?
    } else {
        instances
            .iter()
            .map(|(_, sig)| hashes(sig))
            .collect::<Result<_, _>>()?
    };

    // Buckets hold indices into `instances` of representatives.
    let mut exact: HashMap<ContentHash, Vec<usize>> = HashMap::new();
    let mut shapes: HashMap<ContentHash, Vec<usize>> = HashMap::new();
    let (mut mirrors, mut rotatables, mut exhausted) = (0usize, 0usize, 0usize);

    for (i, (coord, sig)) in instances.iter().enumerate() {
        let (exact_key, shape_key) = keys[i];

        let mut matches = exact
            .get(&exact_key)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&r| instances[r].1 == *sig);
        if let Some(first) = matches.next() {
            if let Some(second) = matches.next() {
                return Err(RrgError::CanonicalizationConflict {
                    structure,
                    coord: *coord,
                    first: instances[first].0,
                    second: instances[second].0,
                });
            }
            let of = instances[first].0;
            let module = module_of_representative(&table, structure, *coord, of)?;
            table.entries.insert(
                *coord,
                Assignment {
                    module,
                    equivalence: Equivalence::Mirror { of },
                },
            );
            mirrors += 1;
            continue;
        }

        if options.detect_rotation {
            let mut found = None;
            let mut gave_up = false;
            for &r in shapes.get(&shape_key).into_iter().flatten() {
                match S::search_rotation(&instances[r].1, sig, options.rotation_search_budget) {
                    RotationSearch::Found(rotation) => {
                        found = Some((instances[r].0, rotation));
                        break;
                    }
                    RotationSearch::NotFound => {}
                    RotationSearch::Exhausted => gave_up = true,
                }
            }
            if let Some((of, rotation)) = found {
                let module = module_of_representative(&table, structure, *coord, of)?;
                table.entries.insert(
                    *coord,
                    Assignment {
                        module,
                        equivalence: Equivalence::Rotatable { of, rotation },
                    },
                );
                rotatables += 1;
                continue;
            }
            if gave_up {
                exhausted += 1;
                sink.emit(
                    Diagnostic::warning(
                        W_ROTATION_BUDGET,
                        format!(
                            "rotation search gave up after {} candidates",
                            options.rotation_search_budget
                        ),
                        Location::at(*coord, structure),
                    )
                    .with_note("the instance becomes its own module")
                    .with_help("raise build.rotation_search_budget"),
                );
            }
        }

        table.add_representative(*coord);
        exact.entry(exact_key).or_default().push(i);
        shapes.entry(shape_key).or_default().push(i);
    }

    let mut summary = Diagnostic::note(
        N_CANON_SUMMARY,
        format!(
            "{structure}: {} instances in {} unique modules",
            table.num_instances(),
            table.num_modules()
        ),
        Location::named(structure),
    )
    .with_note(format!("{mirrors} mirrors, {rotatables} rotatable"));
    if exhausted > 0 {
        summary = summary.with_note(format!("{exhausted} rotation searches exhausted"));
    }
    sink.emit(summary);
    Ok(table)
}
