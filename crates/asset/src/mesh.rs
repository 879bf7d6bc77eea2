//! CPU-side mesh container handed to the renderer.

use std::{fmt, str::FromStr};

use corelib::{Placement, Rgb8};

use crate::error::LoadError;

/// Integer width of a packed index buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
}

impl IndexWidth {
    /// Largest value an index of this width can hold.
    pub const fn max_value(self) -> u32 {
        match self {
            IndexWidth::U8 => u8::MAX as u32,
            IndexWidth::U16 => u16::MAX as u32,
            IndexWidth::U32 => u32::MAX,
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            IndexWidth::U8 => 1,
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }

    /// Narrowest width that can hold `max`.
    pub fn smallest_for(max: u32) -> Self {
        if max <= IndexWidth::U8.max_value() {
            IndexWidth::U8
        } else if max <= IndexWidth::U16.max_value() {
            IndexWidth::U16
        } else {
            IndexWidth::U32
        }
    }
}

impl fmt::Display for IndexWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexWidth::U8 => f.write_str("u8"),
            IndexWidth::U16 => f.write_str("u16"),
            IndexWidth::U32 => f.write_str("u32"),
        }
    }
}

/// How the loader picks index widths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexPolicy {
    /// Narrowest width that fits the mesh.
    #[default]
    Auto,
    /// Always this width; data that doesn't fit is a capacity overflow.
    Fixed(IndexWidth),
}

impl FromStr for IndexPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(IndexPolicy::Auto),
            "u8" | "8" => Ok(IndexPolicy::Fixed(IndexWidth::U8)),
            "u16" | "16" => Ok(IndexPolicy::Fixed(IndexWidth::U16)),
            "u32" | "32" => Ok(IndexPolicy::Fixed(IndexWidth::U32)),
            other => Err(format!("unknown index width '{other}'")),
        }
    }
}

/// Packed index buffer of a single width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Default for IndexBuffer {
    fn default() -> Self {
        IndexBuffer::U8(Vec::new())
    }
}

impl IndexBuffer {
    /// Pack `values` whose largest entry is at least `floor`.
    ///
    /// `floor` lets the caller reserve room for values not present yet
    /// (e.g. the last vertex of a mesh no face references).
    pub fn pack(
        buffer: &'static str,
        values: &[u32],
        floor: u64,
        policy: IndexPolicy,
    ) -> Result<Self, LoadError> {
        let required = values
            .iter()
            .copied()
            .map(u64::from)
            .max()
            .unwrap_or(0)
            .max(floor);

        let width = match policy {
            IndexPolicy::Auto => match u32::try_from(required) {
                Ok(max) => IndexWidth::smallest_for(max),
                Err(_) => {
                    return Err(LoadError::CapacityOverflow {
                        buffer,
                        width: IndexWidth::U32,
                        required,
                    });
                }
            },
            IndexPolicy::Fixed(width) => width,
        };
        if required > u64::from(width.max_value()) {
            return Err(LoadError::CapacityOverflow {
                buffer,
                width,
                required,
            });
        }

        // Every value is <= required <= width.max_value(), so the casts are exact.
        Ok(match width {
            IndexWidth::U8 => IndexBuffer::U8(values.iter().map(|&v| v as u8).collect()),
            IndexWidth::U16 => IndexBuffer::U16(values.iter().map(|&v| v as u16).collect()),
            IndexWidth::U32 => IndexBuffer::U32(values.to_vec()),
        })
    }

    pub fn width(&self) -> IndexWidth {
        match self {
            IndexBuffer::U8(_) => IndexWidth::U8,
            IndexBuffer::U16(_) => IndexWidth::U16,
            IndexBuffer::U32(_) => IndexWidth::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U8(v) => v.len(),
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            IndexBuffer::U8(v) => v.get(i).map(|&x| u32::from(x)),
            IndexBuffer::U16(v) => v.get(i).map(|&x| u32::from(x)),
            IndexBuffer::U32(v) => v.get(i).copied(),
        }
    }

    /// Widened view of the stored indices.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn to_u32_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Raw bytes in native endianness, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U8(v) => v.as_slice(),
            IndexBuffer::U16(v) => bytemuck::cast_slice(v),
            IndexBuffer::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Caller-supplied properties of a mesh that the file doesn't carry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDesc {
    pub name: String,
    pub placement: Placement,
    pub color: Rgb8,
}

impl MeshDesc {
    pub fn new(name: impl Into<String>, placement: Placement, color: Rgb8) -> Self {
        Self {
            name: name.into(),
            placement,
            color,
        }
    }
}

/// Unpacked geometry as the reader accumulates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    /// Flattened `x, y, z` triples.
    pub vertices: Vec<f32>,
    /// 0-based vertex indices, three per triangle.
    pub face_indices: Vec<u32>,
    /// Normal indices exactly as written in the file, parallel to `face_indices`.
    pub normal_indices: Vec<u32>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Whole triples everywhere, and one normal index per face index.
    pub fn is_consistent(&self) -> bool {
        self.vertices.len() % 3 == 0
            && self.face_indices.len() % 3 == 0
            && self.face_indices.len() == self.normal_indices.len()
    }
}

/// One placed, flat-coloured triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub placement: Placement,
    pub color: Rgb8,
    /// Flattened `x, y, z` triples in file order.
    pub vertices: Vec<f32>,
    pub face_indices: IndexBuffer,
    /// Opaque to the loader; the renderer owns their meaning.
    pub normal_indices: IndexBuffer,
}

impl Mesh {
    /// A structurally valid mesh with no geometry.
    pub fn empty(desc: &MeshDesc) -> Self {
        Self {
            name: desc.name.clone(),
            placement: desc.placement,
            color: desc.color,
            ..Self::default()
        }
    }

    /// Pack `geometry` into index buffers chosen by `policy`.
    pub fn from_geometry(
        desc: &MeshDesc,
        geometry: Geometry,
        policy: IndexPolicy,
    ) -> Result<Self, LoadError> {
        if !geometry.is_consistent() {
            return Err(LoadError::InconsistentGeometry {
                vertices: geometry.vertices.len(),
                face_indices: geometry.face_indices.len(),
                normal_indices: geometry.normal_indices.len(),
            });
        }

        let vertex_count = geometry.vertex_count() as u64;
        if let Some(dangling) = geometry
            .face_indices
            .iter()
            .find(|&&i| u64::from(i) >= vertex_count)
        {
            log::warn!(
                "{}: face references vertex {} but only {} vertices were read",
                desc.name,
                dangling,
                vertex_count
            );
        }

        let face_indices = IndexBuffer::pack(
            "face",
            &geometry.face_indices,
            vertex_count.saturating_sub(1),
            policy,
        )?;
        let normal_indices = IndexBuffer::pack("normal", &geometry.normal_indices, 0, policy)?;

        Ok(Self {
            name: desc.name.clone(),
            placement: desc.placement,
            color: desc.color,
            vertices: geometry.vertices,
            face_indices,
            normal_indices,
        })
    }

    /// Ground-plane position `(x, y)`.
    pub fn position(&self) -> (f32, f32) {
        (self.placement.x, self.placement.y)
    }

    /// Yaw in degrees.
    pub fn rotation_z(&self) -> f32 {
        self.placement.rotation_z
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.face_indices.len() / 3
    }

    /// Returns `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.face_indices.is_empty()
    }

    /// Corner triples in stored (already reversed) order.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.triangle_count()).filter_map(move |t| {
            let base = t * 3;
            Some([
                self.face_indices.get(base)?,
                self.face_indices.get(base + 1)?,
                self.face_indices.get(base + 2)?,
            ])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc() -> MeshDesc {
        MeshDesc::new("test.obj", Placement::new(1.0, 2.0, 45.0), Rgb8::new(1, 2, 3))
    }

    fn grid(vertex_count: usize) -> Geometry {
        Geometry {
            vertices: vec![0.0; vertex_count * 3],
            face_indices: vec![2, 1, 0],
            normal_indices: vec![3, 2, 1],
        }
    }

    #[test]
    fn empty_mesh_keeps_caller_properties() {
        let mesh = Mesh::empty(&desc());
        assert!(mesh.is_empty());
        assert_eq!(mesh.name, "test.obj");
        assert_eq!(mesh.position(), (1.0, 2.0));
        assert_eq!(mesh.rotation_z(), 45.0);
        assert_eq!(mesh.color, Rgb8::new(1, 2, 3));
    }

    #[test]
    fn auto_policy_picks_narrowest_width() {
        let small = Mesh::from_geometry(&desc(), grid(256), IndexPolicy::Auto).unwrap();
        assert_eq!(small.face_indices.width(), IndexWidth::U8);

        let medium = Mesh::from_geometry(&desc(), grid(300), IndexPolicy::Auto).unwrap();
        assert_eq!(medium.face_indices.width(), IndexWidth::U16);
        assert_eq!(medium.face_indices.to_u32_vec(), vec![2, 1, 0]);

        let large = Mesh::from_geometry(&desc(), grid(70_000), IndexPolicy::Auto).unwrap();
        assert_eq!(large.face_indices.width(), IndexWidth::U32);
    }

    #[test]
    fn fixed_width_too_narrow_is_reported() {
        let err = Mesh::from_geometry(&desc(), grid(300), IndexPolicy::Fixed(IndexWidth::U8))
            .unwrap_err();
        match err {
            LoadError::CapacityOverflow {
                buffer,
                width,
                required,
            } => {
                assert_eq!(buffer, "face");
                assert_eq!(width, IndexWidth::U8);
                assert_eq!(required, 299);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn referenced_index_beyond_vertex_count_widens_buffer() {
        let geometry = Geometry {
            vertices: vec![0.0; 9],
            face_indices: vec![400, 1, 0],
            normal_indices: vec![1, 1, 1],
        };
        let mesh = Mesh::from_geometry(&desc(), geometry, IndexPolicy::Auto).unwrap();
        assert_eq!(mesh.face_indices.width(), IndexWidth::U16);
        assert_eq!(mesh.face_indices.get(0), Some(400));
    }

    #[test]
    fn normal_buffer_width_is_independent() {
        let geometry = Geometry {
            vertices: vec![0.0; 9],
            face_indices: vec![2, 1, 0],
            normal_indices: vec![1000, 2, 1],
        };
        let mesh = Mesh::from_geometry(&desc(), geometry, IndexPolicy::Auto).unwrap();
        assert_eq!(mesh.face_indices.width(), IndexWidth::U8);
        assert_eq!(mesh.normal_indices.width(), IndexWidth::U16);
    }

    #[test]
    fn inconsistent_geometry_is_rejected() {
        let geometry = Geometry {
            vertices: vec![0.0; 9],
            face_indices: vec![2, 1, 0],
            normal_indices: vec![1],
        };
        let err = Mesh::from_geometry(&desc(), geometry, IndexPolicy::Auto).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InconsistentGeometry {
                vertices: 9,
                face_indices: 3,
                normal_indices: 1,
            }
        ));

        let ragged = Geometry {
            vertices: vec![0.0; 4],
            ..Geometry::default()
        };
        assert!(!ragged.is_consistent());
        assert!(Mesh::from_geometry(&desc(), ragged, IndexPolicy::Auto).is_err());
    }

    #[test]
    fn bytes_follow_width() {
        let buf = IndexBuffer::pack("face", &[1, 2, 3], 0, IndexPolicy::Fixed(IndexWidth::U16))
            .unwrap();
        assert_eq!(buf.as_bytes().len(), 3 * IndexWidth::U16.bytes());
    }

    #[test]
    fn triangles_iterate_corner_triples() {
        let geometry = Geometry {
            vertices: vec![0.0; 12],
            face_indices: vec![2, 1, 0, 3, 2, 0],
            normal_indices: vec![0; 6],
        };
        let mesh = Mesh::from_geometry(&desc(), geometry, IndexPolicy::Auto).unwrap();
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris, vec![[2, 1, 0], [3, 2, 0]]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn index_policy_parses_cli_values() {
        assert_eq!("auto".parse::<IndexPolicy>(), Ok(IndexPolicy::Auto));
        assert_eq!("U16".parse::<IndexPolicy>(), Ok(IndexPolicy::Fixed(IndexWidth::U16)));
        assert!("u64".parse::<IndexPolicy>().is_err());
    }
}
