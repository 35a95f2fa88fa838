//! Arithmetic over GF(2^8) with the AES reduction polynomial.
//!
//! Addition is XOR, multiplication reduces modulo x⁸ + x⁴ + x³ + x + 1.
//! Every non-zero element has an inverse; callers must never divide by zero.

use std::ops::{Add, Div, Mul};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Gf256(u8);

impl Gf256 {
    pub(crate) const ZERO: Self = Gf256(0);
    pub(crate) const ONE: Self = Gf256(1);

    #[inline]
    pub(crate) fn new(n: u8) -> Self {
        Self(n)
    }

    #[inline]
    pub(crate) fn value(self) -> u8 {
        self.0
    }

    /// a⁻¹ = a²⁵⁴.
    pub(crate) fn invert(self) -> Self {
        debug_assert!(self.0 != 0, "zero has no inverse in GF(256)");

        let mut result = Self::ONE;
        let mut base = self;
        let mut exp = 254u8;
        while exp > 0 {
            if exp & 1 != 0 {
                result = result * base;
            }
            base = base * base;
            exp >>= 1;
        }
        result
    }

    /// Horner evaluation of `coeffs[0] + coeffs[1]·x + ...`.
    pub(crate) fn eval_polynomial(coeffs: &[Self], x: Self) -> Self {
        coeffs
            .iter()
            .rev()
            .fold(Self::ZERO, |acc, &c| acc * x + c)
    }

    /// f(0) from `(x, y)` points with distinct non-zero `x`.
    pub(crate) fn interpolate_at_zero(points: &[(Self, Self)]) -> Self {
        let mut acc = Self::ZERO;

        for (i, &(xi, yi)) in points.iter().enumerate() {
            let mut num = Self::ONE;
            let mut den = Self::ONE;

            for (j, &(xj, _)) in points.iter().enumerate() {
                if i != j {
                    num = num * xj;
                    // subtraction is addition in characteristic 2
                    den = den * (xj + xi);
                }
            }

            acc = acc + (num / den) * yi;
        }

        acc
    }
}

impl Add for Gf256 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for Gf256 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut a = self.0;
        let mut b = rhs.0;
        let mut res = 0u8;

        // Fixed iteration count regardless of operand values.
        for _ in 0..8 {
            let mask = 0u8.wrapping_sub(b & 1);
            res ^= a & mask;

            let carry = 0u8.wrapping_sub(a >> 7);
            a = (a << 1) ^ (0x1B & carry);
            b >>= 1;
        }

        Self(res)
    }
}

impl Div for Gf256 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Self) -> Self {
        self * rhs.invert()
    }
}
