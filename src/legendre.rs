//! Legendre polynomial inner products and endpoint values.
//!
//! Every layer expands its displacement as `u(ξ) = Σ a_n P_n(ξ)` on
//! `ξ ∈ [-1, 1]`. Projecting the wave equation onto `P_m` needs the
//! integrals below, which have exact closed forms:
//!
//! ```text
//! ∫ P_m P_n   dξ = 2/(2n+1)            if m == n
//! ∫ P_m P_n'  dξ = 2                   if n > m and n + m odd
//! ∫ P_m P_n'' dξ = n(n+1) - m(m+1)     if n >= m + 2 and n - m even
//! ```
//!
//! All other combinations vanish.

/// `∫₋₁¹ P_m P_n dξ`.
#[inline]
pub fn pm_pn(m: usize, n: usize) -> f64 {
    if m == n {
        2.0 / (2 * n + 1) as f64
    } else {
        0.0
    }
}

/// `∫₋₁¹ P_m P_n' dξ`.
#[inline]
pub fn pm_dpn(m: usize, n: usize) -> f64 {
    if n > m && (n + m) % 2 == 1 {
        2.0
    } else {
        0.0
    }
}

/// `∫₋₁¹ P_m P_n'' dξ`.
#[inline]
pub fn pm_d2pn(m: usize, n: usize) -> f64 {
    if n >= m + 2 && (n - m) % 2 == 0 {
        (n * (n + 1) - m * (m + 1)) as f64
    } else {
        0.0
    }
}

/// One end of the reference interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `ξ = -1`, the bottom face of a layer.
    Lower,
    /// `ξ = +1`, the top face of a layer.
    Upper,
}

impl Endpoint {
    /// `P_n` evaluated at the endpoint.
    #[inline]
    pub fn value(self, n: usize) -> f64 {
        match self {
            Endpoint::Upper => 1.0,
            Endpoint::Lower => alternating_sign(n),
        }
    }

    /// `dP_n/dξ` evaluated at the endpoint.
    #[inline]
    pub fn slope(self, n: usize) -> f64 {
        let magnitude = (n * (n + 1)) as f64 / 2.0;
        match self {
            Endpoint::Upper => magnitude,
            Endpoint::Lower => -alternating_sign(n) * magnitude,
        }
    }
}

/// `(-1)^n`.
#[inline]
fn alternating_sign(n: usize) -> f64 {
    if n % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}
