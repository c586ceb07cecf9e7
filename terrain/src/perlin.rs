// 2D gradient noise over a reseedable 256-entry permutation table.
// Classic Perlin construction restricted to the four diagonal gradients.

const TABLE_SIZE: usize = 256;

// Ken Perlin's reference ordering; used until the first reseed.
const DEFAULT_PERMUTATIONS: [u8; TABLE_SIZE] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

// Wrap a lattice index into 0..=255. The bitmask also handles negative
// coordinates (two's complement), so this is the single place index
// arithmetic happens.
#[inline]
fn wrap(i: i32) -> usize {
    (i & 255) as usize
}

pub struct PerlinNoise {
    perm: [u8; TABLE_SIZE],
}

impl PerlinNoise {
    pub fn new() -> Self {
        Self {
            perm: DEFAULT_PERMUTATIONS,
        }
    }

    // Reshuffle the current table in place with a Fisher-Yates pass.
    // Shuffling (rather than regenerating entries) keeps the table a true
    // permutation of 0..=255, which the corner hashing relies on.
    pub fn reseed(&mut self, seed: u64) {
        let mut x = seed ^ 0xDEADBEEFCAFEBABE_u64;
        let mut rng = || {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        };
        for i in (1..TABLE_SIZE).rev() {
            let j = (rng() as usize) % (i + 1);
            self.perm.swap(i, j);
        }
    }

    // Fade function as defined by Ken Perlin: 6t^5 - 15t^4 + 10t^3.
    // First and second derivatives are zero at t=0 and t=1, which removes
    // grid-aligned artifacts from the interpolation.
    #[inline]
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + t * (b - a)
    }

    // Pick one of the four diagonal gradients from a corner hash and dot
    // it with the offset from that corner to the sample point.
    #[inline]
    fn grad(hash: u8, x: f64, y: f64) -> f64 {
        match hash % 4 {
            0 => x + y,   // (1, 1)
            1 => -x + y,  // (-1, 1)
            2 => -x - y,  // (-1, -1)
            _ => x - y,   // (1, -1)
        }
    }

    // Double table lookup mixes both lattice coordinates into the hash.
    #[inline]
    fn corner_hash(&self, x: i32, y: i32) -> u8 {
        self.perm[wrap(self.perm[wrap(x)] as i32 + y)]
    }

    // Single sample of gradient noise at (x, y), roughly in [-1, 1].
    // Pure function of the point and the current permutation table.
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        // unit cell containing the point, and the position within it
        let xi = x.floor() as i32;
        let yi = y.floor() as i32;
        let xf = x - x.floor();
        let yf = y - y.floor();

        // hash the four cell corners
        let bl = self.corner_hash(xi, yi);
        let br = self.corner_hash(xi + 1, yi);
        let tl = self.corner_hash(xi, yi + 1);
        let tr = self.corner_hash(xi + 1, yi + 1);

        // gradient influence at each corner
        let bl_val = Self::grad(bl, xf, yf);
        let br_val = Self::grad(br, xf - 1.0, yf);
        let tl_val = Self::grad(tl, xf, yf - 1.0);
        let tr_val = Self::grad(tr, xf - 1.0, yf - 1.0);

        // bilinear blend in faded coordinate space
        let u = Self::fade(xf);
        let v = Self::fade(yf);
        let bottom = Self::lerp(bl_val, br_val, u);
        let top = Self::lerp(tl_val, tr_val, u);
        Self::lerp(bottom, top, v)
    }

    #[cfg(test)]
    fn table(&self) -> &[u8; TABLE_SIZE] {
        &self.perm
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new()
    }
}
