//! Persistence for precalculated nearest-neighbor sets.
//!
//! Neighborhoods are expensive to compute (all-pairs elastic distances
//! over the full dataset), so they are saved once and reloaded by later
//! runs. The format is one line per primary signature:
//!
//! ```text
//! primary n1 n2 .. nk d1 d2 .. dk
//! ```
//!
//! with neighbor ids followed by their distances, closest first.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ductus_verify::SignatureId;
use tracing::{info, instrument};

use crate::IoError;

/// A primary signature id with its nearest neighbors and distances,
/// closest first. Neighborhoods are not symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureNeighborhood {
    pub primary: SignatureId,
    pub neighbors: Vec<(SignatureId, f64)>,
}

/// Reads and writes neighborhood files.
pub struct NeighborhoodStore {
    path: PathBuf,
}

impl NeighborhoodStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write all neighborhoods, one line each, in input order.
    ///
    /// Distances use shortest round-trip float formatting so a reload
    /// reproduces bit-equivalent values.
    #[instrument(skip_all, fields(path = %self.path.display(), n = neighborhoods.len()))]
    pub fn save(&self, neighborhoods: &[SignatureNeighborhood]) -> Result<(), IoError> {
        let mut content = String::new();
        for hood in neighborhoods {
            content.push_str(hood.primary.as_str());
            for (id, _) in &hood.neighbors {
                content.push(' ');
                content.push_str(id.as_str());
            }
            for (_, distance) in &hood.neighbors {
                // write! to a String cannot fail
                let _ = write!(content, " {distance}");
            }
            content.push('\n');
        }
        std::fs::write(&self.path, content).map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        info!("neighborhoods written");
        Ok(())
    }

    /// Read all neighborhoods in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Vec<SignatureNeighborhood>, IoError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut neighborhoods = Vec::new();
        for (line_index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            // primary + k ids + k distances: an odd field count of at least 3
            if fields.len() < 3 || fields.len() % 2 == 0 {
                return Err(IoError::MalformedLine {
                    path: self.path.clone(),
                    line_index,
                    expected: "primary n1..nk d1..dk",
                    line: line.to_owned(),
                });
            }
            let k = (fields.len() - 1) / 2;
            let ids = &fields[1..1 + k];
            let distances = &fields[1 + k..];

            let mut neighbors = Vec::with_capacity(k);
            for (id, raw) in ids.iter().zip(distances) {
                let distance: f64 = raw.parse().map_err(|_| IoError::InvalidValue {
                    path: self.path.clone(),
                    line_index,
                    column: "distance".to_owned(),
                    raw: (*raw).to_owned(),
                })?;
                if !distance.is_finite() || distance < 0.0 {
                    return Err(IoError::InvalidValue {
                        path: self.path.clone(),
                        line_index,
                        column: "distance".to_owned(),
                        raw: (*raw).to_owned(),
                    });
                }
                neighbors.push((SignatureId::new(*id), distance));
            }
            neighborhoods.push(SignatureNeighborhood {
                primary: SignatureId::new(fields[0]),
                neighbors,
            });
        }

        if neighborhoods.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        info!(n = neighborhoods.len(), "neighborhoods loaded");
        Ok(neighborhoods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn hood(primary: &str, neighbors: &[(&str, f64)]) -> SignatureNeighborhood {
        SignatureNeighborhood {
            primary: SignatureId::new(primary),
            neighbors: neighbors
                .iter()
                .map(|(id, d)| (SignatureId::new(*id), *d))
                .collect(),
        }
    }

    #[test]
    fn save_load_round_trip_is_bit_equivalent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("neighbors.txt");
        let original = vec![
            hood("u1_r1", &[("u3_r2", 0.1), ("u7_r4", 1.0 / 3.0), ("u2_r9", 42.25)]),
            hood("u2_r1", &[("u1_r1", 7.5)]),
        ];

        let store = NeighborhoodStore::new(&path);
        store.save(&original).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn error_mismatched_field_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("neighbors.txt");
        std::fs::write(&path, "u1_r1 u2_r1 0.5 0.7\n").unwrap();
        let result = NeighborhoodStore::new(&path).load();
        assert!(matches!(result, Err(IoError::MalformedLine { .. })));
    }

    #[test]
    fn error_negative_distance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("neighbors.txt");
        std::fs::write(&path, "u1_r1 u2_r1 -0.5\n").unwrap();
        let result = NeighborhoodStore::new(&path).load();
        assert!(matches!(result, Err(IoError::InvalidValue { .. })));
    }
}
