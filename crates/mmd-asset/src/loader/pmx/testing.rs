//! Byte builder for hand-assembled PMX files.

pub const SECTION_COUNT: usize = 9;

pub struct PmxWriter {
    buffer: Vec<u8>,
    text_encoding: u8,
    additional_vec4_count: u8,
    /// Vertex, texture, material, bone, morph and rigid body index sizes.
    index_sizes: [u8; 6],
}

impl Default for PmxWriter {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            text_encoding: 1,
            additional_vec4_count: 0,
            index_sizes: [4; 6],
        }
    }
}

impl PmxWriter {
    pub fn utf16() -> Self {
        Self {
            text_encoding: 0,
            ..Self::default()
        }
    }

    pub fn with_index_sizes(mut self, index_sizes: [u8; 6]) -> Self {
        self.index_sizes = index_sizes;
        self
    }

    pub fn with_additional_vec4(mut self, count: u8) -> Self {
        self.additional_vec4_count = count;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.raw(&value.to_le_bytes())
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.raw(&value.to_le_bytes())
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.raw(&value.to_le_bytes())
    }

    pub fn floats(&mut self, values: &[f32]) -> &mut Self {
        for value in values {
            self.f32(*value);
        }
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        let bytes: Vec<u8> = if self.text_encoding == 0 {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else {
            text.as_bytes().to_vec()
        };
        self.i32(bytes.len() as i32);
        self.raw(&bytes)
    }

    fn index(&mut self, size: u8, value: i64) -> &mut Self {
        let bytes = value.to_le_bytes();
        self.raw(&bytes[..usize::from(size)])
    }

    pub fn vertex_index(&mut self, value: i64) -> &mut Self {
        self.index(self.index_sizes[0], value)
    }

    pub fn texture_index(&mut self, value: i64) -> &mut Self {
        self.index(self.index_sizes[1], value)
    }

    pub fn material_index(&mut self, value: i64) -> &mut Self {
        self.index(self.index_sizes[2], value)
    }

    pub fn bone_index(&mut self, value: i64) -> &mut Self {
        self.index(self.index_sizes[3], value)
    }

    pub fn morph_index(&mut self, value: i64) -> &mut Self {
        self.index(self.index_sizes[4], value)
    }

    pub fn rigidbody_index(&mut self, value: i64) -> &mut Self {
        self.index(self.index_sizes[5], value)
    }

    /// Config bytes following the version.
    pub fn globals(&mut self) -> &mut Self {
        let (text_encoding, additional_vec4_count) =
            (self.text_encoding, self.additional_vec4_count);
        self.u8(8).u8(text_encoding).u8(additional_vec4_count);
        for size in self.index_sizes {
            self.u8(size);
        }
        self
    }

    /// Magic, version, config and model info.
    pub fn header(&mut self) -> &mut Self {
        self.raw(b"PMX ").f32(2.0).globals();
        self.text("model")
            .text("model_en")
            .text("comment")
            .text("comment_en")
    }

    pub fn empty_sections(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.i32(0);
        }
        self
    }

    /// Material with the given textures, toon reference bytes and index count.
    pub fn material(
        &mut self,
        name: &str,
        texture: i64,
        toon: (u8, i64),
        surface_count: i32,
    ) -> &mut Self {
        self.text(name)
            .text("")
            .floats(&[1.0, 1.0, 1.0, 1.0])
            .floats(&[0.5, 0.5, 0.5])
            .f32(5.0)
            .floats(&[0.2, 0.2, 0.2])
            .u8(0b0001_1001)
            .floats(&[0.0, 0.0, 0.0, 1.0])
            .f32(1.0)
            .texture_index(texture)
            .texture_index(-1)
            .u8(0);
        match toon {
            (0, index) => self.u8(0).texture_index(index),
            (tag, slot) => self.u8(tag).u8(slot as u8),
        };
        self.text("").i32(surface_count)
    }

    /// Bone without any optional field.
    pub fn plain_bone(&mut self, name: &str, parent: i64) -> &mut Self {
        self.text(name)
            .text("")
            .floats(&[0.0, 1.0, 0.0])
            .bone_index(parent)
            .i32(0)
            .u16(0x001e)
            .floats(&[0.0, 1.0, 0.0])
    }
}
