use super::Vec3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// 3D affine map stored as a row-major 3×4 matrix `[L | t]`.
///
/// Composition convention:
/// - `a.then(b)` applies `a` first, then `b` (i.e. the matrix product `b · a`).
///   A source-to-screen map is `source_to_world.then(world_to_screen)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine3 {
    pub rows: [[f64; 4]; 3],
}

impl Default for Affine3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine3 {
    pub fn identity() -> Self {
        Self {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    pub fn from_rows(rows: [[f64; 4]; 3]) -> Self {
        Self { rows }
    }

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::identity();
        m.rows[0][3] = t.x;
        m.rows[1][3] = t.y;
        m.rows[2][3] = t.z;
        m
    }

    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            rows: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
            ],
        }
    }

    /// Right-handed rotation by `angle_rad` around `axis`.
    pub fn rotation(axis: Axis, angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        let rows = match axis {
            Axis::X => [[1.0, 0.0, 0.0, 0.0], [0.0, c, -s, 0.0], [0.0, s, c, 0.0]],
            Axis::Y => [[c, 0.0, s, 0.0], [0.0, 1.0, 0.0, 0.0], [-s, 0.0, c, 0.0]],
            Axis::Z => [[c, -s, 0.0, 0.0], [s, c, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
        };
        Self { rows }
    }

    /// Returns the map that applies `self` first and `next` afterwards.
    pub fn then(&self, next: &Affine3) -> Affine3 {
        let a = &next.rows;
        let b = &self.rows;
        let mut out = [[0.0; 4]; 3];
        for (r, out_row) in out.iter_mut().enumerate() {
            for (c, cell) in out_row.iter_mut().enumerate() {
                let mut v = a[r][0] * b[0][c] + a[r][1] * b[1][c] + a[r][2] * b[2][c];
                if c == 3 {
                    v += a[r][3];
                }
                *cell = v;
            }
        }
        Affine3 { rows: out }
    }

    pub fn translated(&self, t: Vec3) -> Affine3 {
        self.then(&Affine3::translation(t))
    }

    pub fn rotated(&self, axis: Axis, angle_rad: f64) -> Affine3 {
        self.then(&Affine3::rotation(axis, angle_rad))
    }

    pub fn scaled(&self, s: f64) -> Affine3 {
        self.then(&Affine3::scaling(s, s, s))
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        let m = &self.rows;
        Vec3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }


    /// Image of the unit basis vector along `axis`.
    pub fn basis(&self, axis: Axis) -> Vec3 {
        let c = axis.index();
        Vec3::new(self.rows[0][c], self.rows[1][c], self.rows[2][c])
    }

    pub fn linear_determinant(&self) -> f64 {
        let x = self.basis(Axis::X);
        let y = self.basis(Axis::Y);
        let z = self.basis(Axis::Z);
        x.cross(y).dot(z)
    }

    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }
}
