use naga::{Scalar, TypeInner, VectorSize};

/// Value type of a uniform block member, as far as the setters care.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Float,
    Int,
    Uint,
    Vec2,
    Vec3,
    Vec4,
    /// Arrays, matrices, nested structs. Not addressable through the setters.
    Other,
}

impl UniformKind {
    pub(crate) fn of(inner: &TypeInner) -> Self {
        match inner {
            TypeInner::Scalar(s) if *s == Scalar::F32 => UniformKind::Float,
            TypeInner::Scalar(s) if *s == Scalar::I32 => UniformKind::Int,
            TypeInner::Scalar(s) if *s == Scalar::U32 => UniformKind::Uint,
            TypeInner::Vector { size, scalar } if *scalar == Scalar::F32 => match size {
                VectorSize::Bi => UniformKind::Vec2,
                VectorSize::Tri => UniformKind::Vec3,
                VectorSize::Quad => UniformKind::Vec4,
            },
            _ => UniformKind::Other,
        }
    }
}

/// A named member of a uniform block with its std140 byte offset.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// CPU staging copy of a uniform block.
///
/// Setters look the member up by name on every call and write into the
/// staging bytes; [`crate::shader::ShaderProgram::flush_uniforms`] uploads the
/// bytes once per frame. Unknown names and type mismatches are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlock {
    members: Vec<UniformMember>,
    data: Vec<u8>,
}

impl UniformBlock {
    /// Creates a zero-filled block. `size` is rounded up to 16 bytes.
    pub fn new(members: Vec<UniformMember>, size: u32) -> Self {
        let size = size.max(16).next_multiple_of(16) as usize;
        Self {
            members,
            data: vec![0; size],
        }
    }

    /// Reflects the struct type `ty` of a uniform block declared in `module`.
    ///
    /// Returns `None` when `ty` is not a struct.
    pub(crate) fn reflect(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Option<Self> {
        let TypeInner::Struct { members, span } = &module.types[ty].inner else {
            return None;
        };

        let members = members
            .iter()
            .filter_map(|m| {
                Some(UniformMember {
                    name: m.name.clone()?,
                    offset: m.offset,
                    kind: UniformKind::of(&module.types[m.ty].inner),
                })
            })
            .collect();

        Some(Self::new(members, *span))
    }

    pub fn members(&self) -> &[UniformMember] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Staged bytes, sized for the GPU buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, UniformKind::Float, bytemuck::bytes_of(&value));
    }

    pub fn set_vec2(&mut self, name: &str, value: [f32; 2]) {
        self.write(name, UniformKind::Vec2, bytemuck::cast_slice(&value));
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.write(name, UniformKind::Int, bytemuck::bytes_of(&value));
    }

    /// Reads back a staged float. Mostly useful for diagnostics and tests.
    pub fn get_float(&self, name: &str) -> Option<f32> {
        let m = self.member(name).filter(|m| m.kind == UniformKind::Float)?;
        let start = m.offset as usize;
        let bytes = self.data.get(start..start + 4)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) {
        let Some(member) = self.member(name) else {
            log::trace!("uniform `{name}` not present in block; ignored");
            return;
        };

        if member.kind != kind {
            log::debug!(
                "uniform `{name}` is {:?}, setter expects {:?}; ignored",
                member.kind,
                kind
            );
            return;
        }

        let start = member.offset as usize;
        let Some(dst) = self.data.get_mut(start..start + bytes.len()) else {
            return;
        };
        dst.copy_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> UniformBlock {
        UniformBlock::new(
            vec![
                UniformMember { name: "time".into(), offset: 0, kind: UniformKind::Float },
                UniformMember { name: "frame".into(), offset: 4, kind: UniformKind::Int },
                UniformMember { name: "pan".into(), offset: 8, kind: UniformKind::Vec2 },
                UniformMember { name: "zoom".into(), offset: 16, kind: UniformKind::Float },
            ],
            20,
        )
    }

    #[test]
    fn size_rounds_up_to_sixteen() {
        assert_eq!(block().size(), 32);
        assert_eq!(UniformBlock::new(Vec::new(), 0).size(), 16);
    }

    #[test]
    fn set_float_writes_at_member_offset() {
        let mut b = block();
        b.set_float("zoom", 2.5);
        assert_eq!(&b.bytes()[16..20], &2.5f32.to_ne_bytes());
        assert_eq!(b.get_float("zoom"), Some(2.5));
    }

    #[test]
    fn set_vec2_and_int() {
        let mut b = block();
        b.set_vec2("pan", [1.0, -3.0]);
        b.set_int("frame", 7);
        assert_eq!(&b.bytes()[8..12], &1.0f32.to_ne_bytes());
        assert_eq!(&b.bytes()[12..16], &(-3.0f32).to_ne_bytes());
        assert_eq!(&b.bytes()[4..8], &7i32.to_ne_bytes());
    }

    #[test]
    fn unknown_name_is_a_no_op() {
        let mut b = block();
        let before = b.clone();
        b.set_float("does_not_exist", 1.0);
        b.set_vec2("nope", [1.0, 1.0]);
        b.set_int("", 3);
        assert_eq!(b, before);
    }

    #[test]
    fn type_mismatch_is_a_no_op() {
        let mut b = block();
        b.set_int("time", 3);
        b.set_float("pan", 1.0);
        assert_eq!(b.get_float("time"), Some(0.0));
        assert!(b.bytes().iter().all(|&x| x == 0));
    }

    #[test]
    fn empty_block_accepts_every_setter() {
        let mut b = UniformBlock::default();
        b.set_float("time", 1.0);
        b.set_vec2("pan", [0.0, 0.0]);
        b.set_int("frame", 0);
        assert!(b.bytes().is_empty());
    }
}
