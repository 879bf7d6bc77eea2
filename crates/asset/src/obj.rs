//! Minimal OBJ reader: `v x y z` and triangular `f a//na b//nb c//nc` records.
//!
//! Everything else (texture coordinates, normals, materials, groups) is skipped.
//! Face corners are stored in reverse file order; the renderer culls with that
//! winding.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{LoadError, MalformedRecord, RecordTag},
    mesh::{Geometry, IndexPolicy, Mesh, MeshDesc},
};

/// Loader settings shared by every asset in a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub index_policy: IndexPolicy,
}

/// Geometry read from one source and the diagnostics raised while reading it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedObj {
    pub geometry: Geometry,
    /// Short `v` records, patched from the previous vertex and kept.
    pub repaired: Vec<MalformedRecord>,
    /// The face record that stopped the scan early.
    pub malformed: Option<MalformedRecord>,
}

/// A loaded mesh together with the diagnostics raised while reading it.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadReport {
    pub mesh: Mesh,
    pub repaired: Vec<MalformedRecord>,
    pub malformed: Option<MalformedRecord>,
}

impl LoadReport {
    /// Treat any malformed record as a hard error.
    pub fn strict(self) -> Result<Mesh, LoadError> {
        match self.malformed.or_else(|| self.repaired.into_iter().next()) {
            Some(record) => Err(record.into()),
            None => Ok(self.mesh),
        }
    }
}

/// Load a mesh, logging every problem and never failing.
///
/// An unreadable file or an index overflow yields an empty mesh; a malformed
/// face yields whatever was read up to and including it.
pub fn load_mesh(path: impl AsRef<Path>, desc: &MeshDesc, options: &LoadOptions) -> Mesh {
    let path = path.as_ref();
    match try_load_mesh(path, desc, options) {
        Ok(report) => {
            for record in &report.repaired {
                log::warn!("{}: {}", path.display(), record);
            }
            if let Some(record) = &report.malformed {
                log::error!("{}: {}", path.display(), record);
            }
            report.mesh
        }
        Err(err) => {
            log::error!("{err}");
            Mesh::empty(desc)
        }
    }
}

/// Load a mesh from a file path.
pub fn try_load_mesh(
    path: impl AsRef<Path>,
    desc: &MeshDesc,
    options: &LoadOptions,
) -> Result<LoadReport, LoadError> {
    let path = path.as_ref();
    let unavailable = |source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unavailable)?;
    log::info!("Parsing OBJ file {}", path.display());
    let parsed = parse_obj_reader(BufReader::new(file)).map_err(unavailable)?;

    let mesh = Mesh::from_geometry(desc, parsed.geometry, options.index_policy)?;
    log::debug!(
        "Finished {}: {} vertices, {} face indices ({})",
        path.display(),
        mesh.vertex_count(),
        mesh.face_indices.len(),
        mesh.face_indices.width()
    );

    Ok(LoadReport {
        mesh,
        repaired: parsed.repaired,
        malformed: parsed.malformed,
    })
}

/// Parse OBJ records from a [`BufRead`] implementation.
///
/// Lines are decoded lossily, so stray non-UTF-8 bytes in names and comments
/// don't matter. Only I/O errors are returned as `Err`; a malformed face ends
/// the scan and is reported in [`ParsedObj::malformed`].
pub fn parse_obj_reader<R: BufRead>(reader: R) -> io::Result<ParsedObj> {
    let mut parsed = ParsedObj::default();

    for (line_no, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        match parse_line(&line, line_no + 1, &mut parsed.geometry) {
            LineOutcome::Done => {}
            LineOutcome::Repaired(record) => parsed.repaired.push(record),
            LineOutcome::Stop(record) => {
                parsed.malformed = Some(record);
                break;
            }
        }
    }

    Ok(parsed)
}

/// Convenience helper to parse an OBJ string literal.
pub fn parse_obj_str(contents: &str) -> io::Result<ParsedObj> {
    parse_obj_reader(io::Cursor::new(contents))
}

enum LineOutcome {
    Done,
    /// Kept after filling in what was missing; scanning goes on.
    Repaired(MalformedRecord),
    /// Kept as read; scanning ends here.
    Stop(MalformedRecord),
}

/// Apply one line to `geometry`.
fn parse_line(line: &str, line_no: usize, geometry: &mut Geometry) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return LineOutcome::Done;
    }

    let mut parts = trimmed.split_whitespace();
    match parts.next() {
        Some("v") => {
            let previous = match geometry.vertices.as_slice() {
                [.., x, y, z] => [*x, *y, *z],
                _ => [0.0; 3],
            };
            let scan = scan_vertex(parts, previous);
            geometry.vertices.extend_from_slice(&scan.position);
            scan.into_malformed(line_no).map_or(LineOutcome::Done, LineOutcome::Repaired)
        }
        Some("f") => {
            let scan = scan_face(parts);
            let [a, b, c] = scan.vertex;
            geometry.face_indices.extend([
                c.saturating_sub(1),
                b.saturating_sub(1),
                a.saturating_sub(1),
            ]);
            let [na, nb, nc] = scan.normal;
            geometry.normal_indices.extend([nc, nb, na]);
            scan.into_malformed(line_no).map_or(LineOutcome::Done, LineOutcome::Stop)
        }
        _ => {
            // Ignore other directives (vt/vn/o/g/s/usemtl/mtllib/etc.)
            LineOutcome::Done
        }
    }
}

/// Result of matching `x y z`; unread components keep the previous vertex's value.
struct VertexScan {
    position: [f32; 3],
    scanned: usize,
    values: Vec<String>,
}

impl VertexScan {
    fn into_malformed(self, line: usize) -> Option<MalformedRecord> {
        (self.scanned < RecordTag::Vertex.expected_fields()).then(|| MalformedRecord {
            line,
            tag: RecordTag::Vertex,
            scanned: self.scanned,
            values: self.values,
        })
    }
}

fn scan_vertex<'a>(mut parts: impl Iterator<Item = &'a str>, previous: [f32; 3]) -> VertexScan {
    let mut scan = VertexScan {
        position: previous,
        scanned: 0,
        values: Vec::new(),
    };
    for slot in &mut scan.position {
        let Some(token) = parts.next() else {
            break;
        };
        let Ok(value) = token.parse::<f32>() else {
            break;
        };
        *slot = value;
        scan.scanned += 1;
        scan.values.push(token.to_owned());
    }
    scan
}

/// Result of matching `a//na b//nb c//nc` left to right, stopping at the
/// first field that doesn't match. Unread fields stay zero.
struct FaceScan {
    vertex: [u32; 3],
    normal: [u32; 3],
    scanned: usize,
    values: Vec<String>,
}

impl FaceScan {
    fn into_malformed(self, line: usize) -> Option<MalformedRecord> {
        (self.scanned < RecordTag::Face.expected_fields()).then(|| MalformedRecord {
            line,
            tag: RecordTag::Face,
            scanned: self.scanned,
            values: self.values,
        })
    }

    fn push(&mut self, field: &str, value: u32) {
        let corner = self.scanned / 2;
        if self.scanned % 2 == 0 {
            self.vertex[corner] = value;
        } else {
            self.normal[corner] = value;
        }
        self.scanned += 1;
        self.values.push(field.to_owned());
    }
}

fn scan_face<'a>(mut parts: impl Iterator<Item = &'a str>) -> FaceScan {
    let mut scan = FaceScan {
        vertex: [0; 3],
        normal: [0; 3],
        scanned: 0,
        values: Vec::new(),
    };

    for _ in 0..3 {
        let Some(token) = parts.next() else {
            break;
        };
        let (vertex, rest) = match token.split_once('/') {
            Some((vertex, rest)) => (vertex, Some(rest)),
            None => (token, None),
        };

        let Some(vi) = parse_index(vertex) else {
            break;
        };
        scan.push(vertex, vi);

        // `a//n`: the texture slot between the slashes must be empty.
        let Some(normal) = rest.and_then(|r| r.strip_prefix('/')) else {
            break;
        };
        let Some(ni) = parse_index(normal) else {
            break;
        };
        scan.push(normal, ni);
    }

    scan
}

/// OBJ indices are 1-based; zero and negatives don't match.
fn parse_index(token: &str) -> Option<u32> {
    token.parse::<u32>().ok().filter(|&i| i != 0)
}
