//! Shortest round-trip decimal formatting for f32.
//!
//! This crate provides the [`ToDecimal`] trait for converting a 32-bit float
//! into the shortest decimal string that parses back to the bit-identical
//! value. The conversion follows the Grisu family of algorithms: the value
//! and its half-ULP neighbours are approximated in 32-bit fixed-point
//! arithmetic, and decimal digits are generated directly from that
//! approximation. The rare inputs the fast path cannot certify are resolved
//! by an exact verification pass.
//!
//! # Examples
//!
//! ```
//! use fdec::ToDecimal;
//!
//! assert_eq!(1.0_f32.to_decimal(), "1");
//! assert_eq!((-2.5_f32).to_decimal(), "-2.5");
//! assert_eq!((1.0_f32 / 3.0).to_decimal(), "0.33333334");
//!
//! // Round-trip
//! let original = std::f32::consts::PI;
//! let roundtrip: f32 = original.to_decimal().parse().unwrap();
//! assert_eq!(original.to_bits(), roundtrip.to_bits());
//! ```
//!
//! # Format
//!
//! Values near one are written in plain positional notation (`1.23`,
//! `100000000`, `0.000001`); magnitudes beyond the documented thresholds
//! (decimal point position above 21 or at or below -6) switch to scientific
//! notation (`1e+21`, `1e-7`). The thresholds only affect readability; every
//! output parses back to the exact input bits either way.
//!
//! Special values:
//! - `0` and `-0` for the two zeros
//! - `Infinity` and `-Infinity`
//! - `NaN` for every NaN bit pattern, sign included
//!
//! # Panics
//!
//! [`ToDecimal::to_decimal`] does not panic for any `f32` input. The internal
//! fixed-point subtraction asserts its exponent-alignment precondition; that
//! assertion firing would indicate a defect in the boundary computation, not
//! a condition a caller can reach.

/// Trait for converting a 32-bit float to its shortest round-trip decimal
/// string.
///
/// # Examples
///
/// ```
/// use fdec::ToDecimal;
///
/// assert_eq!(1.23_f32.to_decimal(), "1.23");
/// assert_eq!(f32::INFINITY.to_decimal(), "Infinity");
/// assert_eq!(f32::NAN.to_decimal(), "NaN");
/// assert_eq!((-0.0_f32).to_decimal(), "-0");
/// ```
pub trait ToDecimal {
    /// Converts the float to the shortest decimal string that parses back to
    /// the bit-identical value.
    ///
    /// The result has the fewest significant digits of any decimal that
    /// round-trips, and among equally short candidates it is the one closest
    /// to the value (ties resolved toward an even last digit).
    ///
    /// # Examples
    ///
    /// ```
    /// use fdec::ToDecimal;
    ///
    /// assert_eq!(100000000.0_f32.to_decimal(), "100000000");
    /// assert_eq!(1.0e-45_f32.to_decimal(), "1e-45"); // smallest subnormal
    /// ```
    #[must_use]
    fn to_decimal(self) -> String;
}

impl ToDecimal for f32 {
    fn to_decimal(self) -> String {
        to_decimal(self.to_bits())
    }
}

// =============================================================================
// IEEE 754 binary32 layout
// =============================================================================

/// Bits in the stored significand.
const SIG_BITS: u32 = 23;
/// Mask to extract the stored significand.
const SIG_MASK: u32 = (1 << SIG_BITS) - 1;
/// The implicit leading bit of a normal number's significand.
const IMPLICIT_BIT: u32 = 1 << SIG_BITS;
/// Folds the exponent bias (127) and the significand width (23): a normal
/// number equals `significand * 2^(biased - 150)`.
const EXPONENT_OFFSET: i32 = 150;
/// Binary exponent shared by every subnormal: `stored_bits * 2^-149`.
const MIN_EXPONENT: i32 = -149;

/// A finite non-zero float unpacked into an integer significand and binary
/// exponent, plus the boundary asymmetry flag.
struct Decomposed {
    significand: u32,
    exponent: i32,
    /// True exactly at the power-of-two boundary (stored significand bits
    /// zero, above the lowest normal binade), where the gap to the next float
    /// below is half the gap to the next float above.
    lower_boundary_is_closer: bool,
}

fn decompose(magnitude: u32) -> Decomposed {
    let biased = magnitude >> SIG_BITS;
    let stored = magnitude & SIG_MASK;
    if biased == 0 {
        Decomposed {
            significand: stored,
            exponent: MIN_EXPONENT,
            lower_boundary_is_closer: false,
        }
    } else {
        Decomposed {
            significand: IMPLICIT_BIT | stored,
            exponent: biased as i32 - EXPONENT_OFFSET,
            lower_boundary_is_closer: stored == 0 && biased > 1,
        }
    }
}

// =============================================================================
// Fixed-point arithmetic
// =============================================================================

/// A 32-bit fixed-point value `f * 2^e`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FixedPoint {
    f: u32,
    e: i32,
}

impl FixedPoint {
    /// Exact subtraction. The operands must share an exponent and the result
    /// must be non-negative; anything else is a defect in the caller's
    /// exponent alignment, not a recoverable condition.
    fn sub(x: FixedPoint, y: FixedPoint) -> FixedPoint {
        assert!(
            x.e == y.e && x.f >= y.f,
            "mismatched exponent or negative result"
        );
        FixedPoint { f: x.f - y.f, e: x.e }
    }

    /// Rounded multiplication: the 64-bit product of the mantissas is formed
    /// from 16-bit halves with explicit carry propagation, and the middle
    /// slice is rounded half away from zero. The result keeps the upper 32
    /// bits, so its exponent gains the fixed scaling term of 32.
    ///
    /// The result is not renormalized, so up to 0.5 ULP of precision may be
    /// lost. The digit generator covers this with an explicit error margin.
    fn mul(x: FixedPoint, y: FixedPoint) -> FixedPoint {
        let xl = x.f & 0xFFFF;
        let xh = x.f >> 16;
        let yl = y.f & 0xFFFF;
        let yh = y.f >> 16;

        let xhyl = xh * yl;
        let yhxl = yh * xl;

        // Third 16-bit quarter of the product, with the carries out of the
        // lowest quarter, rounded into the upper half.
        let mid = ((xl * yl) >> 16) + (xhyl & 0xFFFF) + (yhxl & 0xFFFF);
        let carry = (mid + (1 << 15)) >> 16;

        FixedPoint {
            f: xh * yh + (xhyl >> 16) + (yhxl >> 16) + carry,
            e: x.e + y.e + 32,
        }
    }
}

// =============================================================================
// Boundary computation
// =============================================================================

/// Returns `(value, low, high)` as fixed-point values sharing one exponent,
/// where `[low, high]` is the interval of real numbers that round to the
/// original float under round-to-nearest-even.
fn boundaries(d: &Decomposed) -> (FixedPoint, FixedPoint, FixedPoint) {
    let m = d.significand;
    let e = d.exponent;

    // Half a ULP on either side; at the power-of-two boundary the lower
    // neighbour sits in a finer binade, so its half-gap is half again.
    let mut high = FixedPoint { f: 2 * m + 1, e: e - 1 };
    let low = if d.lower_boundary_is_closer {
        FixedPoint { f: 4 * m - 1, e: e - 2 }
    } else {
        FixedPoint { f: 2 * m - 1, e: e - 1 }
    };

    // Normalize the upper boundary into the full 32-bit mantissa width, then
    // align the others onto its exponent with exact shifts so the later
    // subtractions see matching exponents.
    let shift = high.f.leading_zeros();
    high.f <<= shift;
    high.e -= shift as i32;

    let value = FixedPoint {
        f: m << (e - high.e),
        e: high.e,
    };
    let low = FixedPoint {
        f: low.f << (low.e - high.e),
        e: high.e,
    };
    (value, low, high)
}

// =============================================================================
// Cached powers of ten
// =============================================================================

const CACHED_POW10_FIRST_K: i32 = -44;

/// `10^k` approximated as `g * 2^e` with `g` normalized into `[2^31, 2^32)`,
/// one entry per decimal exponent, covering the full binary32 range. Each
/// mantissa is correctly rounded, so its error is at most half a ULP.
#[rustfmt::skip]
const CACHED_POW10: &[(u32, i16)] = &[
    (0xe45c10c4, -178), // 10^-44
    (0x8eb98a7b, -174), // 10^-43
    (0xb267ed19, -171), // 10^-42
    (0xdf01e860, -168), // 10^-41
    (0x8b61313c, -164), // 10^-40
    (0xae397d8b, -161), // 10^-39
    (0xd9c7dced, -158), // 10^-38
    (0x881cea14, -154), // 10^-37
    (0xaa242499, -151), // 10^-36
    (0xd4ad2dc0, -148), // 10^-35
    (0x84ec3c98, -144), // 10^-34
    (0xa6274bbe, -141), // 10^-33
    (0xcfb11ead, -138), // 10^-32
    (0x81ceb32c, -134), // 10^-31
    (0xa2425ff7, -131), // 10^-30
    (0xcad2f7f5, -128), // 10^-29
    (0xfd87b5f3, -125), // 10^-28
    (0x9e74d1b8, -121), // 10^-27
    (0xc6120625, -118), // 10^-26
    (0xf79687af, -115), // 10^-25
    (0x9abe14cd, -111), // 10^-24
    (0xc16d9a01, -108), // 10^-23
    (0xf1c90081, -105), // 10^-22
    (0x971da050, -101), // 10^-21
    (0xbce50865,  -98), // 10^-20
    (0xec1e4a7e,  -95), // 10^-19
    (0x9392ee8f,  -91), // 10^-18
    (0xb877aa32,  -88), // 10^-17
    (0xe69594bf,  -85), // 10^-16
    (0x901d7cf7,  -81), // 10^-15
    (0xb424dc35,  -78), // 10^-14
    (0xe12e1342,  -75), // 10^-13
    (0x8cbccc09,  -71), // 10^-12
    (0xafebff0c,  -68), // 10^-11
    (0xdbe6fecf,  -65), // 10^-10
    (0x89705f41,  -61), // 10^-9
    (0xabcc7712,  -58), // 10^-8
    (0xd6bf94d6,  -55), // 10^-7
    (0x8637bd06,  -51), // 10^-6
    (0xa7c5ac47,  -48), // 10^-5
    (0xd1b71759,  -45), // 10^-4
    (0x83126e98,  -41), // 10^-3
    (0xa3d70a3d,  -38), // 10^-2
    (0xcccccccd,  -35), // 10^-1
    (0x80000000,  -31), // 10^0
    (0xa0000000,  -28), // 10^1
    (0xc8000000,  -25), // 10^2
    (0xfa000000,  -22), // 10^3
    (0x9c400000,  -18), // 10^4
    (0xc3500000,  -15), // 10^5
    (0xf4240000,  -12), // 10^6
    (0x98968000,   -8), // 10^7
    (0xbebc2000,   -5), // 10^8
    (0xee6b2800,   -2), // 10^9
    (0x9502f900,    2), // 10^10
    (0xba43b740,    5), // 10^11
    (0xe8d4a510,    8), // 10^12
    (0x9184e72a,   12), // 10^13
    (0xb5e620f5,   15), // 10^14
    (0xe35fa932,   18), // 10^15
    (0x8e1bc9bf,   22), // 10^16
    (0xb1a2bc2f,   25), // 10^17
    (0xde0b6b3a,   28), // 10^18
    (0x8ac72305,   32), // 10^19
    (0xad78ebc6,   35), // 10^20
    (0xd8d726b7,   38), // 10^21
    (0x87867832,   42), // 10^22
    (0xa968163f,   45), // 10^23
    (0xd3c21bcf,   48), // 10^24
    (0x84595161,   52), // 10^25
    (0xa56fa5ba,   55), // 10^26
    (0xcecb8f28,   58), // 10^27
    (0x813f3979,   62), // 10^28
    (0xa18f07d7,   65), // 10^29
    (0xc9f2c9cd,   68), // 10^30
    (0xfc6f7c40,   71), // 10^31
    (0x9dc5ada8,   75), // 10^32
    (0xc5371912,   78), // 10^33
    (0xf684df57,   81), // 10^34
    (0x9a130b96,   85), // 10^35
    (0xc097ce7c,   88), // 10^36
    (0xf0bdc21b,   91), // 10^37
    (0x96769951,   95), // 10^38
    (0xbc143fa5,   98), // 10^39
    (0xeb194f8e,  101), // 10^40
    (0x92efd1b9,  105), // 10^41
    (0xb7abc627,  108), // 10^42
    (0xe596b7b1,  111), // 10^43
    (0x8f7e32ce,  115), // 10^44
    (0xb35dbf82,  118), // 10^45
    (0xe0352f63,  121), // 10^46
    (0x8c213d9e,  125), // 10^47
    (0xaf298d05,  128), // 10^48
    (0xdaf3f046,  131), // 10^49
    (0x88d8762c,  135), // 10^50
];

const LOG10_2: f64 = 0.301_029_995_663_981_14;

/// Picks the power of ten whose product with a value of binary exponent `e`
/// lands the scaled exponent in the digit generator's window `[-28, -25]`.
fn cached_power(e: i32) -> (FixedPoint, i32) {
    let k = (f64::from(-29 - e) * LOG10_2).ceil() as i32;
    let (f, ce) = CACHED_POW10[(k - CACHED_POW10_FIRST_K) as usize];
    (FixedPoint { f, e: i32::from(ce) }, k)
}

// =============================================================================
// Digit generation
// =============================================================================

/// A shortest digit sequence: the value equals `0.d1..dlen * 10^n`.
#[derive(Clone, Copy)]
struct Decimal {
    /// ASCII digits, `digits[..len]` valid. Finished results carry no
    /// trailing zeros; fallback candidates keep them while being probed.
    digits: [u8; 9],
    len: usize,
    /// Decimal point position relative to the first digit.
    n: i32,
}

/// Fixed-point error carried by each scaled operand, in units of its last
/// place: at most 0.5 ULP from the rounded multiplication plus at most
/// 0.5 ULP from the cached power's mantissa.
const SCALED_ERROR_ULPS: u64 = 1;

const POW10: [u32; 3] = [1, 10, 100];

/// Generates the shortest digit sequence for the scaled value `wq` with
/// round-trip interval `[loq, hiq]` (all sharing one exponent in
/// `[-28, -25]`), or `None` when a stop or rounding decision falls within
/// the fixed-point error margin and only the exact path can resolve it.
///
/// Digits are taken from the *upper* boundary: its truncation to a given
/// length is the largest candidate of that length inside the interval, so
/// the containment test witnesses every candidate and the first length that
/// passes is minimal. A final rounding step walks the last digit down toward
/// the value.
fn generate_digits(
    wq: FixedPoint,
    loq: FixedPoint,
    hiq: FixedPoint,
    k: i32,
) -> Option<Decimal> {
    let shift = (-hiq.e) as u32;
    let one = 1u32 << shift;
    let fmask = one - 1;

    let delta = u64::from(FixedPoint::sub(hiq, loq).f);
    let wp_w = u64::from(FixedPoint::sub(hiq, wq).f);
    let mut p1 = hiq.f >> shift;
    let mut p2 = u64::from(hiq.f & fmask);

    let mut buf = [0u8; 10];
    let mut len = 0usize;
    let mut kappa: i32 = if p1 >= 100 {
        3
    } else if p1 >= 10 {
        2
    } else {
        1
    };
    let unit = SCALED_ERROR_ULPS;

    // Integer part of the scaled upper boundary, one decimal place at a time.
    while kappa > 0 {
        let div = POW10[(kappa - 1) as usize];
        let d = p1 / div;
        p1 %= div;
        if d != 0 || len != 0 {
            buf[len] = b'0' + d as u8;
            len += 1;
        }
        kappa -= 1;

        let rest = (u64::from(p1) << shift) + p2;
        let ten_kappa = u64::from(div) << shift;
        if rest + unit <= delta {
            if rest < unit {
                // Too close to the upper boundary to certify containment.
                return None;
            }
            let n = k + kappa + len as i32;
            round_digits(&mut buf, len, delta, rest, ten_kappa, wp_w, unit)?;
            return finish(&buf, len, n);
        }
        if rest <= delta + unit {
            // The truncation may or may not reach down into the interval.
            return None;
        }
        if rest + unit >= ten_kappa {
            // The next grid point up may still fall inside the true interval.
            return None;
        }
    }

    // Fractional digits; the error margin scales along with the remainder.
    let mut delta = delta;
    let mut wp_w = wp_w;
    let mut unit = unit;
    loop {
        p2 *= 10;
        delta *= 10;
        wp_w *= 10;
        unit *= 10;
        let d = (p2 >> shift) as u32;
        p2 &= u64::from(fmask);
        if d != 0 || len != 0 {
            if len == buf.len() {
                return None;
            }
            buf[len] = b'0' + d as u8;
            len += 1;
        }
        kappa -= 1;

        if p2 + unit <= delta {
            if p2 < unit {
                return None;
            }
            let n = k + kappa + len as i32;
            round_digits(&mut buf, len, delta, p2, u64::from(one), wp_w, unit)?;
            return finish(&buf, len, n);
        }
        if p2 <= delta + unit {
            return None;
        }
        if p2 + unit >= u64::from(one) {
            return None;
        }
    }
}

/// Walks the last digit down while the next candidate below is certifiably
/// both inside the interval and closer to the value. Returns `None` when a
/// comparison lands inside the error margin; a tie between equally near
/// candidates always does, so tie-to-even resolution is left to the exact
/// path.
fn round_digits(
    buf: &mut [u8; 10],
    len: usize,
    delta: u64,
    mut rest: u64,
    ten_kappa: u64,
    wp_w: u64,
    unit: u64,
) -> Option<()> {
    loop {
        // Doubled distances to the value of the current candidate and the
        // one below it; `wp_w` carries error from two scaled operands.
        let lhs = 2 * wp_w;
        let rhs = 2 * rest + ten_kappa;
        if lhs > rhs + 4 * unit {
            // The candidate below is certainly closer, if it stays inside.
            if rest + ten_kappa + unit <= delta {
                if buf[len - 1] == b'0' {
                    return None;
                }
                buf[len - 1] -= 1;
                rest += ten_kappa;
                continue;
            }
            if rest + ten_kappa <= delta + unit {
                return None;
            }
            // Certainly outside; the current candidate is the closest inside.
            return Some(());
        }
        if lhs + 4 * unit < rhs {
            return Some(());
        }
        return None;
    }
}

fn finish(buf: &[u8; 10], mut len: usize, n: i32) -> Option<Decimal> {
    while len > 1 && buf[len - 1] == b'0' {
        len -= 1;
    }
    if len > 9 {
        return None;
    }
    let mut digits = [0u8; 9];
    digits[..len].copy_from_slice(&buf[..len]);
    Some(Decimal { digits, len, n })
}

/// Fast path: decompose, compute boundaries, scale everything by one cached
/// power of ten, and generate digits. `None` means the 32-bit approximation
/// could not certify shortest-and-closest for this input.
fn grisu_shortest(magnitude: u32) -> Option<Decimal> {
    let d = decompose(magnitude);
    let (value, low, high) = boundaries(&d);
    let (pow, k) = cached_power(high.e);

    let wq = FixedPoint::mul(value, pow);
    let loq = FixedPoint::mul(low, pow);
    let hiq = FixedPoint::mul(high, pow);
    debug_assert!((-28..=-25).contains(&hiq.e));

    generate_digits(wq, loq, hiq, -k)
}

// =============================================================================
// Exact fallback
// =============================================================================

impl Decimal {
    /// Parses the output of `{:e}` formatting (`d[.ddd]e±x`) for a positive
    /// finite value with at most nine significant digits. The formatted
    /// precision is kept as-is: trailing zeros stay significant so that the
    /// neighbour steps move one unit in the last formatted place.
    fn from_scientific(s: &str) -> Decimal {
        let mut digits = [0u8; 9];
        let mut len = 0usize;
        let mut exp = 0i32;
        let mut exp_negative = false;
        let mut in_exp = false;
        for &b in s.as_bytes() {
            match b {
                b'0'..=b'9' if in_exp => exp = exp * 10 + i32::from(b - b'0'),
                b'0'..=b'9' => {
                    if len < digits.len() {
                        digits[len] = b;
                        len += 1;
                    }
                }
                b'e' => in_exp = true,
                b'-' => exp_negative = true,
                _ => {} // '.' and '+'
            }
        }
        if exp_negative {
            exp = -exp;
        }
        Decimal { digits, len, n: exp + 1 }
    }

    fn trim_trailing_zeros(&mut self) {
        while self.len > 1 && self.digits[self.len - 1] == b'0' {
            self.len -= 1;
        }
    }

    /// True when this digit sequence parses back to the exact bit pattern.
    fn round_trips(&self, magnitude: u32) -> bool {
        let mut s = String::with_capacity(16);
        s.push_str("0.");
        for &b in &self.digits[..self.len] {
            s.push(b as char);
        }
        s.push('e');
        s.push_str(&self.n.to_string());
        s.parse::<f32>().map(|v| v.to_bits() == magnitude).unwrap_or(false)
    }

    /// Steps one unit down in the last digit. Returns false when the
    /// sequence would reach zero.
    fn step_down(&mut self) -> bool {
        let mut i = self.len;
        loop {
            if i == 0 {
                return false;
            }
            i -= 1;
            if self.digits[i] > b'0' {
                self.digits[i] -= 1;
                break;
            }
            self.digits[i] = b'9';
        }
        if self.digits[0] == b'0' {
            self.digits.copy_within(1..self.len, 0);
            self.len -= 1;
            self.n -= 1;
            if self.len == 0 {
                return false;
            }
        }
        self.trim_trailing_zeros();
        true
    }

    /// Steps one unit up in the last digit, carrying through the sequence
    /// ("999" becomes "1" with the decimal point moved up one place).
    fn step_up(&mut self) {
        let mut i = self.len;
        loop {
            if i == 0 {
                self.digits[0] = b'1';
                self.len = 1;
                self.n += 1;
                return;
            }
            i -= 1;
            if self.digits[i] < b'9' {
                self.digits[i] += 1;
                break;
            }
            self.digits[i] = b'0';
        }
        self.trim_trailing_zeros();
    }
}

/// Exact path: for each candidate length, the correctly rounded decimal of
/// that length (std's fixed-precision scientific formatting is exactly
/// rounded) and its one-ULP decimal neighbours are tested for a bit-exact
/// round-trip. The first hit is shortest; preferring the correctly rounded
/// candidate makes it closest, with ties already broken toward even.
fn closest_fallback(magnitude: u32) -> Decimal {
    let value = f32::from_bits(magnitude);
    for precision in 1..=9usize {
        // The candidate keeps its full formatted precision through the
        // neighbour steps: a trailing zero trimmed here would move the unit
        // step to the wrong decimal place.
        let mut rounded = Decimal::from_scientific(&format!("{:.*e}", precision - 1, value));
        if rounded.round_trips(magnitude) {
            rounded.trim_trailing_zeros();
            return rounded;
        }
        // At a power-of-two boundary the interval is asymmetric and the
        // nearest candidate of this length can fall just outside it while a
        // neighbour on the other side is inside.
        let mut below = rounded;
        if below.step_down() && below.round_trips(magnitude) {
            return below;
        }
        let mut above = rounded;
        above.step_up();
        if above.round_trips(magnitude) {
            return above;
        }
    }
    unreachable!("nine significant digits always round-trip a binary32")
}

fn shortest_digits(magnitude: u32) -> Decimal {
    grisu_shortest(magnitude).unwrap_or_else(|| closest_fallback(magnitude))
}

// =============================================================================
// Formatting
// =============================================================================

const ABS_MASK: u32 = 0x7FFF_FFFF;
const INF_BITS: u32 = 0x7F80_0000;

fn to_decimal(bits: u32) -> String {
    let negative = bits >> 31 != 0;
    let magnitude = bits & ABS_MASK;

    if magnitude == 0 {
        return if negative { "-0" } else { "0" }.to_string();
    }
    if magnitude >= INF_BITS {
        if magnitude > INF_BITS {
            return "NaN".to_string();
        }
        return if negative { "-Infinity" } else { "Infinity" }.to_string();
    }

    let dec = shortest_digits(magnitude);
    format_decimal(negative, &dec)
}

/// Assembles sign, digits and decimal point position into the final text.
/// Positional notation covers point positions in `(-6, 21]`; anything beyond
/// switches to scientific notation with an explicitly signed exponent.
fn format_decimal(negative: bool, dec: &Decimal) -> String {
    let digits = &dec.digits[..dec.len];
    let len = dec.len as i32;
    let n = dec.n;

    let mut out = String::with_capacity(16);
    if negative {
        out.push('-');
    }
    if len <= n && n <= 21 {
        // Integer: digits followed by zeros up to the point position.
        push_digits(&mut out, digits);
        for _ in 0..n - len {
            out.push('0');
        }
    } else if 0 < n && n <= 21 {
        // Point inside the digit sequence.
        push_digits(&mut out, &digits[..n as usize]);
        out.push('.');
        push_digits(&mut out, &digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        // Leading zeros after the point.
        out.push_str("0.");
        for _ in 0..-n {
            out.push('0');
        }
        push_digits(&mut out, digits);
    } else {
        out.push(digits[0] as char);
        if dec.len > 1 {
            out.push('.');
            push_digits(&mut out, &digits[1..]);
        }
        write_exponent(&mut out, n - 1);
    }
    out
}

fn push_digits(out: &mut String, digits: &[u8]) {
    for &b in digits {
        out.push(b as char);
    }
}

/// Writes the exponent marker and signed exponent (e.g. "e+21", "e-45").
/// Manual digit extraction; binary32 decimal exponents never exceed two
/// digits.
fn write_exponent(out: &mut String, exponent: i32) {
    out.push('e');
    out.push(if exponent < 0 { '-' } else { '+' });
    let exponent = exponent.unsigned_abs();
    if exponent >= 10 {
        out.push((b'0' + (exponent / 10) as u8) as char);
    }
    out.push((b'0' + (exponent % 10) as u8) as char);
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Significant digits of a formatted string: everything outside the
    /// exponent, stripped of sign, point, and outer zeros.
    fn significant_digits(text: &str) -> usize {
        let mantissa = text.split('e').next().unwrap();
        let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.trim_matches('0').len().max(1)
    }

    /// Correctly rounded candidate of the given length for a positive value,
    /// as an integer mantissa and power of ten. Taken straight from std's
    /// exact fixed-precision formatting, independent of the library's digit
    /// helpers.
    fn rounded_candidate(value: f32, len: usize) -> (u64, i32) {
        let s = format!("{:.*e}", len - 1, value);
        let (m, e) = s.split_once('e').unwrap();
        let mantissa = m.replace('.', "").parse().unwrap();
        (mantissa, e.parse::<i32>().unwrap() + 1 - len as i32)
    }

    /// Bit-exact parse-back for `mantissa * 10^pow10`.
    fn mantissa_round_trips(mantissa: u64, pow10: i32, magnitude: u32) -> bool {
        format!("{}e{}", mantissa, pow10)
            .parse::<f32>()
            .map(|v| v.to_bits() == magnitude)
            .unwrap_or(false)
    }

    proptest! {
        /// Parsing the output must reproduce the exact bit pattern.
        #[test]
        fn roundtrips(v in any::<f32>()) {
            let text = v.to_decimal();
            if v.is_nan() {
                prop_assert_eq!(text, "NaN");
            } else {
                let parsed: f32 = text.parse().unwrap();
                prop_assert_eq!(v.to_bits(), parsed.to_bits(),
                    "roundtrip failed: {} -> {}", v, text);
            }
        }

        /// No decimal with fewer significant digits may also round-trip: the
        /// correctly rounded shorter candidate and both its neighbours,
        /// stepped one unit in integer mantissa space, must all miss the bit
        /// pattern.
        #[test]
        fn is_minimal(v in any::<f32>().prop_filter("finite non-zero", |v| v.is_finite() && *v != 0.0)) {
            let magnitude = v.to_bits() & ABS_MASK;
            let len = significant_digits(&v.to_decimal());
            if len > 1 {
                let (mantissa, pow10) = rounded_candidate(f32::from_bits(magnitude), len - 1);
                for m in [mantissa - 1, mantissa, mantissa + 1] {
                    prop_assert!(!mantissa_round_trips(m, pow10, magnitude),
                        "{}e{} also round-trips {:08x}", m, pow10, magnitude);
                }
            }
        }

        /// Subnormals go through the dedicated decomposition branch.
        #[test]
        fn subnormal_roundtrips(bits in 1u32..0x0080_0000) {
            let text = to_decimal(bits);
            let parsed: f32 = text.parse().unwrap();
            prop_assert_eq!(bits, parsed.to_bits(), "{}", text);
        }

        /// The exact path alone must also round-trip everything.
        #[test]
        fn fallback_roundtrips(bits in 1u32..0x7f80_0000) {
            let dec = closest_fallback(bits);
            prop_assert!(dec.round_trips(bits));
        }
    }
}
