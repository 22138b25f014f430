use glam::{Vec2, Vec3, Vec4};

/// How a vertex is bound to the skeleton.
///
/// Bone references are `None` when the file stores a negative index. Weights
/// are kept exactly as authored; they are not normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkinWeight {
    /// Single bone with an implicit weight of 1.0.
    Bdef1 { bone: Option<usize> },
    /// Two bones, the second weight is `1.0 - weight`.
    Bdef2 {
        bones: [Option<usize>; 2],
        weight: f32,
    },
    /// Four bones with explicit weights.
    Bdef4 {
        bones: [Option<usize>; 4],
        weights: [f32; 4],
    },
    /// Spherical deformation: two bones plus the C, R0 and R1 parameters.
    Sdef {
        bones: [Option<usize>; 2],
        weight: f32,
        c: Vec3,
        r0: Vec3,
        r1: Vec3,
    },
    /// Dual quaternion deformation. Same layout as [`SkinWeight::Bdef4`].
    Qdef {
        bones: [Option<usize>; 4],
        weights: [f32; 4],
    },
}

impl SkinWeight {
    /// Bone influences with the implicit weights spelled out.
    pub fn influences(&self) -> Vec<(Option<usize>, f32)> {
        match *self {
            SkinWeight::Bdef1 { bone } => vec![(bone, 1.0)],
            SkinWeight::Bdef2 { bones, weight } | SkinWeight::Sdef { bones, weight, .. } => {
                vec![(bones[0], weight), (bones[1], 1.0 - weight)]
            }
            SkinWeight::Bdef4 { bones, weights } | SkinWeight::Qdef { bones, weights } => {
                bones.into_iter().zip(weights).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub additional_uv: Vec<Vec4>,
    pub skin: SkinWeight,
    pub edge_scale: f32,
}

#[cfg(test)]
mod test {
    use super::SkinWeight;

    #[test]
    fn test_implicit_weights() {
        let bdef1 = SkinWeight::Bdef1 { bone: Some(3) };
        assert_eq!(bdef1.influences(), vec![(Some(3), 1.0)]);

        let bdef2 = SkinWeight::Bdef2 {
            bones: [Some(0), None],
            weight: 0.25,
        };
        assert_eq!(bdef2.influences(), vec![(Some(0), 0.25), (None, 0.75)]);
    }

    #[test]
    fn test_weights_are_not_normalized() {
        let bdef4 = SkinWeight::Bdef4 {
            bones: [Some(0), Some(1), Some(2), Some(3)],
            weights: [0.5, 0.5, 0.5, 0.5],
        };
        let total: f32 = bdef4.influences().iter().map(|(_, weight)| weight).sum();
        assert_eq!(total, 2.0);
    }
}
