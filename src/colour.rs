//! Deterministic category colours.

/// DJB2 over UTF-16 code units, with the overflow behaviour of the editor's
/// script runtime: the shifted hash wraps to 32 bits, the sum does not.
pub fn insecure_hash(text: &str) -> i64 {
    text.encode_utf16().fold(5381i64, |hash, unit| {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        shifted + hash + unit as i64
    })
}

/// A stable colour for a name, as `#rrggbb`.
///
/// Three salted hashes pick a point in CIE L*a*b*, which keeps colours for
/// different names perceptually apart.
pub fn colour_from_string(name: &str) -> String {
    let l = 20 + insecure_hash(&format!("{}a", name)) % 60;
    let a = insecure_hash(&format!("{}ab", name)) % 160 - 80;
    let b = insecure_hash(&format!("{}abc", name)) % 160 - 80;
    lab_to_hex(l as f64, a as f64, b as f64)
}

/// Converts a CIE L*a*b* colour (D50 white) to an sRGB hex string.
///
/// XYZ is clamped to the D50 gamut, Bradford-adapted to D65 and then
/// encoded as sRGB, clamping out-of-gamut channels.
pub fn lab_to_hex(l: f64, a: f64, b: f64) -> String {
    const WHITE: [f64; 3] = [0.964_22, 1.0, 0.825_21];
    const EPSILON: f64 = 216.0 / 24389.0;
    const KAPPA: f64 = 24389.0 / 27.0;
    const D50_TO_D65: [[f64; 3]; 3] = [
        [0.955_576_6, -0.023_039_3, 0.063_163_6],
        [-0.028_289_5, 1.009_941_6, 0.021_007_7],
        [0.012_298_2, -0.020_483, 1.329_909_8],
    ];
    const XYZ_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
        [3.240_454_2, -1.537_138_5, -0.498_531_4],
        [-0.969_266_0, 1.876_010_8, 0.041_556_0],
        [0.055_643_4, -0.204_025_9, 1.057_225_2],
    ];

    let l = l.clamp(0.0, 100.0);
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let finv = |f: f64| {
        let cubed = f * f * f;
        if cubed > EPSILON {
            cubed
        } else {
            (116.0 * f - 16.0) / KAPPA
        }
    };
    let mut xyz = [finv(fx), finv(fy), finv(fz)];
    for (c, white) in xyz.iter_mut().zip(WHITE) {
        *c = (*c * white).clamp(0.0, white);
    }
    let linear = transform(XYZ_TO_LINEAR_SRGB, transform(D50_TO_D65, xyz));

    let [r, g, b] = linear.map(|c| {
        let c = c.clamp(0.0, 1.0);
        let encoded = if c <= 0.003_130_8 {
            12.92 * c
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        };
        (encoded * 255.0).round() as u8
    });
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn transform(matrix: [[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    matrix.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}
