// src/noyau/nombre.rs
//
// Nombre du noyau : rationnel exact tant que possible, flottant sinon.
//
// Règles :
// - Exact (+) Exact => Exact pour + - * / % et ^ (exposant entier, ou racine exacte).
// - Dès qu’un résultat est irrationnel, il passe en Real et le reste en remontant.
// - Un Real entier (|x| < 2^53) redevient Exact : pas de dérive sur 2.0, 4^0.5, etc.
//   Exception : le 0.0 d’une puissance en sous-dépassement reste Real.
// - Un Real non fini (NaN, ±∞) est une erreur de domaine, jamais une valeur.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::erreur::EvalError;

/// 2^53 : au-delà, un f64 entier n’est plus forcément exact.
const ENTIER_EXACT_MAX: f64 = 9_007_199_254_740_992.0;

/// Garde-fous de la puissance exacte (au-delà : calcul flottant).
/// L’exposant entier n’est borné que par la taille estimée du résultat.
const RACINE_EXACTE_MAX: u64 = 64;
const BITS_PUISSANCE_MAX: u64 = 1 << 20;

#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Exact(BigRational),
    Real(f64),
}

impl From<BigRational> for Number {
    fn from(r: BigRational) -> Self {
        Number::Exact(r)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Exact(BigRational::from_integer(BigInt::from(n)))
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::from(n as i64)
    }
}

/// Valeur flottante brute : convertie en fraction décimale exacte à l’évaluation.
impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Number::Real(x)
    }
}

impl Number {
    pub fn exact(&self) -> Option<&BigRational> {
        match self {
            Number::Exact(r) => Some(r),
            Number::Real(_) => None,
        }
    }

    pub fn est_exact(&self) -> bool {
        matches!(self, Number::Exact(_))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Exact(r) => r.to_f64().unwrap_or(f64::NAN),
            Number::Real(x) => *x,
        }
    }

    /// Valeur liée à un symbole : un flottant fini devient la fraction de sa forme
    /// décimale la plus courte (0.1 => 1/10). `None` si la valeur n’est pas un nombre.
    pub(crate) fn liee(&self) -> Option<Number> {
        match self {
            Number::Exact(r) => Some(Number::Exact(r.clone())),
            Number::Real(x) => rationnel_decimal(*x).map(Number::Exact),
        }
    }

    /// Résultat flottant d’une fonction nommée `nom`.
    pub(crate) fn depuis_reel(x: f64, nom: &str) -> Result<Number, EvalError> {
        if !x.is_finite() {
            return Err(EvalError::Domain(nom.to_string()));
        }
        Ok(normaliser(x))
    }

    /* ------------------------ Opérations ------------------------ */

    pub fn add(&self, autre: &Number) -> Result<Number, EvalError> {
        match (self, autre) {
            (Number::Exact(a), Number::Exact(b)) => Ok(Number::Exact(a + b)),
            _ => Number::depuis_reel(self.to_f64() + autre.to_f64(), "+"),
        }
    }

    pub fn sub(&self, autre: &Number) -> Result<Number, EvalError> {
        match (self, autre) {
            (Number::Exact(a), Number::Exact(b)) => Ok(Number::Exact(a - b)),
            _ => Number::depuis_reel(self.to_f64() - autre.to_f64(), "-"),
        }
    }

    pub fn mul(&self, autre: &Number) -> Result<Number, EvalError> {
        match (self, autre) {
            (Number::Exact(a), Number::Exact(b)) => Ok(Number::Exact(a * b)),
            _ => Number::depuis_reel(self.to_f64() * autre.to_f64(), "*"),
        }
    }

    pub fn div(&self, autre: &Number) -> Result<Number, EvalError> {
        match (self, autre) {
            (_, Number::Exact(b)) if b.is_zero() => Err(EvalError::DivisionByZero),
            (Number::Exact(a), Number::Exact(b)) => Ok(Number::Exact(a / b)),
            _ => {
                let d = autre.to_f64();
                if d == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Number::depuis_reel(self.to_f64() / d, "/")
            }
        }
    }

    /// Modulo « plancher » : le reste prend le signe du diviseur.
    pub fn rem(&self, autre: &Number) -> Result<Number, EvalError> {
        match (self, autre) {
            (_, Number::Exact(b)) if b.is_zero() => Err(EvalError::DivisionByZero),
            (Number::Exact(a), Number::Exact(b)) => Ok(Number::Exact(a - b * (a / b).floor())),
            _ => {
                let (a, b) = (self.to_f64(), autre.to_f64());
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Number::depuis_reel(a - b * (a / b).floor(), "%")
            }
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Exact(r) => Number::Exact(-r.clone()),
            Number::Real(x) => Number::Real(-x),
        }
    }

    pub fn pow(&self, exposant: &Number) -> Result<Number, EvalError> {
        if let (Number::Exact(b), Number::Exact(e)) = (self, exposant) {
            if let Some(r) = puissance_exacte(b, e)? {
                return Ok(Number::Exact(r));
            }
        }

        let (b, e) = (self.to_f64(), exposant.to_f64());
        if b == 0.0 && e < 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        if b < 0.0 && e.fract() != 0.0 {
            // base négative : seule une racine impaire reste réelle
            return match exposant {
                Number::Exact(r) if est_impair(r.denom()) => {
                    let signe = if est_impair(r.numer()) { -1.0 } else { 1.0 };
                    puissance_flottante(b, signe * (-b).powf(e))
                }
                _ => Err(EvalError::Domain("^".into())),
            };
        }
        puissance_flottante(b, b.powf(e))
    }
}

/// Résultat flottant d’une puissance à base non nulle : un 0.0 de sous-dépassement
/// reste Real (ce n’est pas un zéro exact) ; un dépassement reste une erreur.
fn puissance_flottante(base: f64, v: f64) -> Result<Number, EvalError> {
    if v == 0.0 && base != 0.0 {
        return Ok(Number::Real(v));
    }
    Number::depuis_reel(v, "^")
}

/// Un f64 entier et représentable exactement redevient un rationnel exact.
pub(crate) fn normaliser(x: f64) -> Number {
    if x.fract() == 0.0 && x.abs() < ENTIER_EXACT_MAX {
        Number::Exact(BigRational::from_integer(BigInt::from(x as i64)))
    } else {
        Number::Real(x)
    }
}

/* ------------------------ Lecture décimale exacte ------------------------ */

/// "12.5" => 25/2, ".5" => 1/2, "3." => 3. `None` si le texte n’est pas un décimal.
pub fn parse_decimal(texte: &str) -> Option<BigRational> {
    let (negatif, corps) = match texte.strip_prefix('-') {
        Some(reste) => (true, reste),
        None => (false, texte),
    };
    let (entier, frac) = corps.split_once('.').unwrap_or((corps, ""));
    if entier.is_empty() && frac.is_empty() {
        return None;
    }
    if !entier.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let chiffres = format!("{entier}{frac}");
    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;
    let d = BigInt::from(10).pow(frac.len() as u32);
    let r = BigRational::new(n, d);
    Some(if negatif { -r } else { r })
}

/// Fraction exacte de la forme décimale la plus courte d’un f64 (`{}` de Rust
/// n’utilise jamais la notation scientifique). `None` si non fini.
pub fn rationnel_decimal(x: f64) -> Option<BigRational> {
    if !x.is_finite() {
        return None;
    }
    parse_decimal(&format!("{x}"))
}

/* ------------------------ Outils rationnels ------------------------ */

fn est_impair(n: &BigInt) -> bool {
    !(n % 2u32).is_zero()
}

/// base^(p/q) exact si q est petit, la racine q-ième exacte et le résultat de
/// taille raisonnable. `Ok(None)` => calcul flottant.
fn puissance_exacte(
    base: &BigRational,
    exposant: &BigRational,
) -> Result<Option<BigRational>, EvalError> {
    let q = match exposant.denom().to_u64() {
        Some(q) if q <= RACINE_EXACTE_MAX => q as u32,
        _ => return Ok(None),
    };

    if base.is_zero() {
        if exposant.is_negative() {
            return Err(EvalError::DivisionByZero);
        }
        return Ok(Some(if exposant.is_zero() {
            BigRational::one()
        } else {
            BigRational::zero()
        }));
    }

    let racine = if q == 1 {
        base.clone()
    } else if base.is_negative() {
        if q % 2 == 0 {
            return Err(EvalError::Domain("^".into()));
        }
        match rational_root_exact(&(-base.clone()), q) {
            Some(r) => -r,
            None => return Ok(None),
        }
    } else {
        match rational_root_exact(base, q) {
            Some(r) => r,
            None => return Ok(None),
        }
    };

    // ±1 : exact quel que soit l’exposant
    if racine.abs().is_one() {
        let negatif = racine.is_negative() && est_impair(exposant.numer());
        return Ok(Some(if negatif {
            -BigRational::one()
        } else {
            BigRational::one()
        }));
    }

    let p = match exposant.numer().to_i64() {
        Some(p) => p,
        None => return Ok(None),
    };
    let bits = racine.numer().bits() + racine.denom().bits();
    if bits.saturating_mul(p.unsigned_abs()) > BITS_PUISSANCE_MAX {
        return Ok(None);
    }

    let r = rational_pow_int(racine, p.unsigned_abs());
    Ok(Some(if p < 0 { r.recip() } else { r }))
}

fn rational_pow_int(base: BigRational, exp: u64) -> BigRational {
    let mut e = exp;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

/// Racine n-ième exacte d’un rationnel positif, si elle existe.
pub(crate) fn rational_root_exact(r: &BigRational, n: u32) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = int_root_exact(r.numer(), n)?;
    let sd = int_root_exact(r.denom(), n)?;
    Some(BigRational::new(sn, sd))
}

fn int_root_exact(x: &BigInt, n: u32) -> Option<BigInt> {
    if x.is_negative() || n == 0 {
        return None;
    }
    let s = x.nth_root(n);
    if s.pow(n) == *x {
        Some(s)
    } else {
        None
    }
}
