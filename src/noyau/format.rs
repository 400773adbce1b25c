// src/noyau/format.rs

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};

use super::arbre::{Node, ParseTree};
use super::donnees::Operator;
use super::fonction::{Callable, Function};
use super::nombre::Number;

/* ------------------------ Helpers rationnels ------------------------ */

/// "n" si entier, "n/d" sinon.
pub fn format_rationnel(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Exact(r) => f.write_str(&format_rationnel(r)),
            Number::Real(x) => write!(f, "{x}"),
        }
    }
}

/* ------------------------ Arbre ------------------------ */

/// Affichage complètement parenthésé : chaque opération binaire entre (),
/// fractions et négatifs entre () pour rester relisible par le parseur.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Rat(r) if r.is_integer() && !r.is_negative() => write!(f, "{}", r.numer()),
            Node::Rat(r) => write!(f, "({})", format_rationnel(r)),
            Node::Var(c) => write!(f, "{c}"),
            Node::Op { fonction, enfants } => match (fonction, enfants.as_slice()) {
                (Function::Operator(Operator::Neg), [x]) => write!(f, "(-{x})"),
                (Function::Operator(op), [a, b]) => write!(f, "({a}{}{b})", op.symbole()),
                _ => {
                    write!(f, "{}(", fonction.name())?;
                    for (i, e) in enfants.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{e}")?;
                    }
                    f.write_str(")")
                }
            },
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.racine(), f)
    }
}

/* ------------------------ Lecture décimale (scaled -> texte) ------------------------ */

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal.
fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;
    let signe = if neg { "-" } else { "" };

    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }
    format!("{signe}{int_part}.{frac}")
}

/// Lecture décimale tronquée (vers zéro) d’une valeur exacte : 1/3 -> "0.333".
pub fn lecture_decimale(r: &BigRational, digits: usize) -> String {
    let scaled = (r.numer() * pow10(digits)) / r.denom();
    scaled_to_decimal(scaled, digits)
}
